use super::{Cause, UnexpectedError};
use bytes::Bytes;
use http_body_util::BodyExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

pub(crate) fn read<B>(error_body: Option<B>) -> ReadErrorBody<B>
where
    B: http_body::Body,
{
    match error_body {
        Some(body) => ReadErrorBody::S0(body.collect()),
        None => ReadErrorBody::S1,
    }
}

// Collects an error body once and decodes it as text.
#[pin_project::pin_project(project = ReadErrorBodyProj)]
pub(crate) enum ReadErrorBody<B>
where
    B: http_body::Body,
{
    S0(#[pin] http_body_util::combinators::Collect<B>),
    S1,
}
impl<B> Future for ReadErrorBody<B>
where
    B: http_body::Body,
{
    type Output = Result<String, UnexpectedError<B::Error>>;
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ReadErrorBodyProj::S0(f) => {
                let body: Bytes = match ready!(f.poll(cx)) {
                    Ok(collected) => collected.to_bytes(),
                    Err(e) => {
                        tracing::warn!("failed to read error body");
                        return Poll::Ready(Err(Cause::Body(e).into()));
                    }
                };
                Poll::Ready(Ok(String::from_utf8_lossy(&body).into_owned()))
            }
            ReadErrorBodyProj::S1 => {
                tracing::warn!("error body is missing");
                Poll::Ready(Err(Cause::MissingBody.into()))
            }
        }
    }
}
