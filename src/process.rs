//! Turns a stream of [`Response`]s into a stream of payloads.
//!
//! Every response yields exactly one item, in input order: `Ok` with the
//! success body, or an [`Error`] classifying the failure. A failure never ends
//! the stream.

use super::adapter::{ErrorAdapter, JsonErrorAdapter};
use super::future::{read, ReadErrorBody};
use super::{Error, Response};
use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

#[derive(Clone, Debug, Default)]
pub struct NetworkResponse<A = JsonErrorAdapter> {
    adapter: A,
}

impl NetworkResponse {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A> NetworkResponse<A> {
    pub fn with_adapter(adapter: A) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl<A> NetworkResponse<A>
where
    A: Clone,
{
    /// Returns a transform applicable to any number of response streams.
    pub fn process(&self) -> Process<A> {
        Process {
            adapter: self.adapter.clone(),
        }
    }

    #[cfg(feature = "middleware")]
    pub fn layer(&self) -> super::middleware::Layer<A> {
        super::middleware::Layer::new(self.adapter.clone())
    }
}

#[derive(Clone, Debug)]
pub struct Process<A> {
    adapter: A,
}

impl<A> Process<A> {
    pub fn apply<St, T, B>(self, stream: St) -> Processed<St, A, B>
    where
        St: Stream<Item = Response<T, B>>,
        B: http_body::Body,
    {
        Processed {
            stream,
            adapter: self.adapter,
            state: State::S0,
        }
    }
}

pub trait ResponseStreamExt: Stream + Sized {
    fn process_with<A, T, B>(self, processor: &NetworkResponse<A>) -> Processed<Self, A, B>
    where
        Self: Stream<Item = Response<T, B>>,
        A: Clone,
        B: http_body::Body,
    {
        processor.process().apply(self)
    }
}

impl<St> ResponseStreamExt for St where St: Stream {}

#[pin_project::pin_project]
pub struct Processed<St, A, B>
where
    B: http_body::Body,
{
    #[pin]
    stream: St,
    adapter: A,
    #[pin]
    state: State<B>,
}

#[pin_project::pin_project(project = StateProj)]
enum State<B>
where
    B: http_body::Body,
{
    S0,
    S1(#[pin] ReadErrorBody<B>),
}

impl<St, A, T, B> Stream for Processed<St, A, B>
where
    St: Stream<Item = Response<T, B>>,
    A: ErrorAdapter,
    B: http_body::Body,
{
    type Item = Result<T, Error<B::Error>>;
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            match this.state.as_mut().project() {
                StateProj::S0 => match ready!(this.stream.as_mut().poll_next(cx)) {
                    Some(Response::Success(body)) => {
                        tracing::trace!("passing through successful response");
                        break Poll::Ready(Some(Ok(body)));
                    }
                    Some(Response::Failure(error_body)) => {
                        this.state.set(State::S1(read(error_body)));
                    }
                    None => break Poll::Ready(None),
                },
                StateProj::S1(f) => {
                    let text = ready!(f.poll(cx));
                    this.state.set(State::S0);
                    break Poll::Ready(Some(Err(super::adapt(&*this.adapter, text))));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = usize::from(matches!(self.state, State::S1(_)));
        let (lower, upper) = self.stream.size_hint();
        (
            lower.saturating_add(pending),
            upper.and_then(|upper| upper.checked_add(pending)),
        )
    }
}
