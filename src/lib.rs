pub mod adapter;
mod future;
#[cfg(feature = "middleware")]
pub mod middleware;
pub mod process;

pub use adapter::{ErrorAdapter, JsonErrorAdapter, ParseError, PlainTextErrorAdapter};
pub use process::{NetworkResponse, Process, Processed, ResponseStreamExt};

/// One completed HTTP exchange, as classified by the transport.
///
/// A body is present iff the exchange succeeded. A failed exchange carries the
/// raw error body, which may be absent and is consumed at most once.
#[derive(Clone, Debug)]
pub enum Response<T, B> {
    Success(T),
    Failure(Option<B>),
}

impl<T, B> Response<T, B> {
    pub fn success(body: T) -> Self {
        Self::Success(body)
    }

    pub fn failure(error_body: B) -> Self {
        Self::Failure(Some(error_body))
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn body(&self) -> Option<&T> {
        match self {
            Self::Success(body) => Some(body),
            Self::Failure(_) => None,
        }
    }

    pub fn error_body(&self) -> Option<&B> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error_body) => error_body.as_ref(),
        }
    }
}

impl<B> From<http::Response<B>> for Response<http::Response<B>, B> {
    fn from(response: http::Response<B>) -> Self {
        if response.status().is_success() {
            Self::Success(response)
        } else {
            Self::Failure(Some(response.into_body()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    #[error(transparent)]
    Network(NetworkError),
    #[error(transparent)]
    Unexpected(UnexpectedError<E>),
}

impl<E> Error<E> {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Unexpected(_))
    }

    pub fn as_network(&self) -> Option<&NetworkError> {
        match self {
            Self::Network(e) => Some(e),
            Self::Unexpected(_) => None,
        }
    }

    /// The server supplied message, if the failure could be interpreted.
    pub fn message(&self) -> Option<&str> {
        self.as_network().map(NetworkError::message)
    }
}

/// A failure reported by the server and understood by the [`ErrorAdapter`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NetworkError {
    message: String,
}

impl NetworkError {
    pub fn new<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A failure raised while handling an already failed response.
#[derive(Debug, thiserror::Error)]
#[error("failed to interpret error response")]
pub struct UnexpectedError<E> {
    #[source]
    cause: Cause<E>,
}

impl<E> UnexpectedError<E> {
    pub fn cause(&self) -> &Cause<E> {
        &self.cause
    }

    pub fn into_cause(self) -> Cause<E> {
        self.cause
    }
}

impl<E> From<Cause<E>> for UnexpectedError<E> {
    fn from(cause: Cause<E>) -> Self {
        Self { cause }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Cause<E> {
    #[error(transparent)]
    Body(E),
    #[error(transparent)]
    Parse(ParseError),
    #[error("error body is missing")]
    MissingBody,
}

pub(crate) fn adapt<A, E>(adapter: &A, text: Result<String, UnexpectedError<E>>) -> Error<E>
where
    A: ErrorAdapter + ?Sized,
{
    match text.map(|text| adapter.adapt(&text)) {
        Ok(Ok(message)) => {
            tracing::debug!(%message, "server reported failure");
            Error::Network(NetworkError { message })
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to parse error body");
            Error::Unexpected(Cause::Parse(e).into())
        }
        Err(e) => Error::Unexpected(e),
    }
}
