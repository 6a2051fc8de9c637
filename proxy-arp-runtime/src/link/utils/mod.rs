/// Task Park is a structure for tasks to place their task handles when sleeping, and where they can
/// check for other tasks that need to be awoken. As an example, the ingressor and egressor sides of
/// a `ClassifyLink` both may attempt to sleep when they are unable to work because they are waiting on
/// an action from the other side of the link. Generally, this occurs when the channel joining the `ingressor`
/// and `egressor` encounter a full or empty channel, respectively.
pub mod task_park;

/// A bounded queue whose async ends sleep on a task park instead of polling, for feeding a
/// pipeline from a thread or draining one into a thread.
pub mod handoff;
