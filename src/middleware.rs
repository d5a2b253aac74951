//! Classifies the response of an HTTP service the same way as
//! [`Processed`](super::Processed) classifies a stream item.
//!
//! A failed response keeps its status and headers next to the classified
//! error.

use super::adapter::{ErrorAdapter, JsonErrorAdapter};
use super::future::{read, ReadErrorBody};
use std::future;
use std::mem;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

#[derive(Debug, thiserror::Error)]
pub enum Error<S, B> {
    #[error(transparent)]
    Service(S),
    #[error("server responded with {}", .parts.status)]
    Response {
        parts: http::response::Parts,
        #[source]
        error: super::Error<B>,
    },
}

impl<S, B> Error<S, B> {
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Service(_) => None,
            Self::Response { parts, .. } => Some(parts.status),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Layer<A = JsonErrorAdapter> {
    adapter: A,
}

impl<A> Layer<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }
}

impl<S, A> tower::Layer<S> for Layer<A>
where
    A: Clone,
{
    type Service = Service<S, A>;

    fn layer(&self, inner: S) -> Self::Service {
        Service {
            inner,
            adapter: self.adapter.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Service<S, A = JsonErrorAdapter> {
    inner: S,
    adapter: A,
}

impl<S, A, T, U> tower::Service<http::Request<T>> for Service<S, A>
where
    S: tower::Service<http::Request<T>, Response = http::Response<U>>,
    A: Clone + ErrorAdapter,
    U: http_body::Body,
{
    type Response = http::Response<U>;
    type Error = Error<S::Error, U::Error>;
    type Future = Future<S::Future, A, U>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Error::Service)
    }

    fn call(&mut self, request: http::Request<T>) -> Self::Future {
        Future {
            adapter: self.adapter.clone(),
            state: State::S0(self.inner.call(request)),
        }
    }
}

#[pin_project::pin_project]
pub struct Future<F, A, U>
where
    U: http_body::Body,
{
    adapter: A,
    #[pin]
    state: State<F, U>,
}

#[pin_project::pin_project(project = StateProj)]
enum State<F, U>
where
    U: http_body::Body,
{
    S0(#[pin] F),
    S1(#[pin] ReadErrorBody<U>, http::response::Parts),
}

impl<F, A, U, SE> future::Future for Future<F, A, U>
where
    F: future::Future<Output = Result<http::Response<U>, SE>>,
    A: ErrorAdapter,
    U: http_body::Body,
{
    type Output = Result<http::Response<U>, Error<SE, U::Error>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        loop {
            match this.state.as_mut().project() {
                StateProj::S0(f) => {
                    let response = ready!(f.poll(cx)).map_err(Error::Service)?;
                    if response.status().is_success() {
                        break Poll::Ready(Ok(response));
                    }
                    let (parts, body) = response.into_parts();
                    this.state.set(State::S1(read(Some(body)), parts));
                }
                StateProj::S1(f, parts) => {
                    let text = ready!(f.poll(cx));
                    let error = super::adapt(&*this.adapter, text);
                    let parts = mem::replace(parts, http::Response::new(()).into_parts().0);
                    break Poll::Ready(Err(Error::Response { parts, error }));
                }
            }
        }
    }
}
