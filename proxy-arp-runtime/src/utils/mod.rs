/// Helpers that put a built pipeline onto a tokio runtime and drive it.
pub mod runner;

/// Stream generators, collectors and a harness for testing links.
pub mod test;
