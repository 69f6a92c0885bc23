use thiserror::Error;

/// Catch-all error for glue code that only needs a message and an optional cause.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("{context}: {source}")]
    Wrapped {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn wrap(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Wrapped {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can be built from a plain message string.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Define a `Context` trait in the calling module that adds
/// `.with_context(|| "...")` to any `Result` whose error is `Display`.
///
/// The calling module must have `Error: FromMessage` and a matching `Result`
/// alias in scope. The cause is folded into the message as `"{ctx}: {cause}"`.
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|cause| {
                    let ctx = f().into();
                    <Error as $crate::FromMessage>::from_message(format!("{ctx}: {cause}"))
                })
            }
        }
    };
}
