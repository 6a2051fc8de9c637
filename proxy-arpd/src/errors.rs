use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};
use tokio::task::JoinError;

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Debug, PartialEq, Eq, Fail)]
pub enum ErrorKind {
    #[fail(display = "invalid {}: {:?}", field, value)]
    InvalidConfig { field: &'static str, value: String },
    #[fail(display = "could not start the runtime")]
    Runtime,
    #[fail(display = "could not set up a socket on {:?}", _0)]
    Socket(String),
    #[fail(display = "a pipeline task failed: {}", _0)]
    Pipeline(String),
    #[fail(display = "could not listen for ctrl-c")]
    Signal,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Error {
        Error { inner }
    }
}

// `JoinError` is not `Sync`, so it cannot be a `Fail` cause; keep its message instead.
impl From<JoinError> for Error {
    fn from(join_error: JoinError) -> Error {
        ErrorKind::Pipeline(join_error.to_string()).into()
    }
}

/// The error and every cause under it, outermost first, joined for a single log line.
pub fn chain(err: &Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.cause();
    while let Some(fail) = cause {
        message.push_str(": ");
        message.push_str(&fail.to_string());
        cause = fail.cause();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use failure::ResultExt;
    use std::io;

    #[test]
    fn kind_survives_context() {
        let result: Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "no such device"));
        let err: Error = result
            .context(ErrorKind::Socket("eth9".to_string()))
            .unwrap_err()
            .into();

        assert_eq!(err.kind(), &ErrorKind::Socket("eth9".to_string()));
        assert_eq!(
            chain(&err),
            "could not set up a socket on \"eth9\": no such device"
        );
    }

    #[test]
    fn failed_task_keeps_its_reason() {
        let mut runtime = tokio::runtime::Runtime::new().unwrap();
        let join_error = runtime
            .block_on(async { tokio::spawn(async { panic!("egress task gave up") }).await })
            .unwrap_err();
        let reason = join_error.to_string();
        assert!(!reason.is_empty());

        let err = Error::from(join_error);
        assert_eq!(err.kind(), &ErrorKind::Pipeline(reason.clone()));
        assert_eq!(chain(&err), format!("a pipeline task failed: {}", reason));
    }

    #[test]
    fn bare_kind_has_no_cause() {
        let err = Error::from(ErrorKind::InvalidConfig {
            field: "reply-as address",
            value: "nope".to_string(),
        });
        assert!(err.cause().is_none());
        assert_eq!(chain(&err), "invalid reply-as address: \"nope\"");
    }
}
