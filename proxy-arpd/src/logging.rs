use std::fmt::{self, Debug, Write as _};
use std::io::{self, Write as _};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::event::Event;
use tracing::field::{Field, Visit};
use tracing::{span, Id, Level, Metadata, Subscriber};

/// Writes one line per event to stderr, dropping anything more verbose than `max_level`.
/// Spans are given ids but otherwise ignored.
pub struct StderrSubscriber {
    ids: AtomicUsize,
    max_level: Level,
}

impl StderrSubscriber {
    pub fn new(max_level: Level) -> Self {
        StderrSubscriber {
            ids: AtomicUsize::new(1),
            max_level,
        }
    }
}

/// Installs a `StderrSubscriber` for the whole process.
pub fn init(max_level: Level) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(StderrSubscriber::new(max_level))
}

fn verbosity(level: &Level) -> u8 {
    if *level == Level::ERROR {
        0
    } else if *level == Level::WARN {
        1
    } else if *level == Level::INFO {
        2
    } else if *level == Level::DEBUG {
        3
    } else {
        4
    }
}

impl Subscriber for StderrSubscriber {
    fn enabled(&self, metadata: &Metadata) -> bool {
        verbosity(metadata.level()) <= verbosity(&self.max_level)
    }

    fn new_span(&self, _span: &span::Attributes) -> Id {
        let id = self.ids.fetch_add(1, Ordering::Relaxed);
        Id::from_u64(id as u64)
    }

    fn record(&self, _span: &Id, _values: &span::Record) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event) {
        let line = format_event(event);
        // Nowhere left to report a failed write to stderr.
        let _ = writeln!(io::stderr().lock(), "{}", line);
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// `LEVEL target: message key=value ...`
fn format_event(event: &Event) -> String {
    let metadata = event.metadata();
    let mut visitor = LineVisitor::default();
    event.record(&mut visitor);

    let mut line = format!(
        "{:>5} {}: {}",
        metadata.level().to_string(),
        metadata.target(),
        visitor.message
    );
    line.push_str(&visitor.fields);
    line
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl fmt::Debug for StderrSubscriber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StderrSubscriber")
            .field("max_level", &self.max_level)
            .finish()
    }
}
