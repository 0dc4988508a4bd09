//! Progress tracking for `PutObject` bodies.
//!
//! hook function: (chunk size (diff), total written, data size)

use std::convert::Infallible;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::operation::put_object::PutObjectOutput;
use aws_sdk_s3::primitives::SdkBody;
use aws_smithy_http::body::BoxBody;
use bytes::Bytes;
use http::HeaderMap;
use http_body::{Body, SizeHint};
use pin_project::pin_project;

/// One progress notification as seen by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 0 to 100. A zero-byte total reports 100.
    pub percent: u8,
    pub transferred: u64,
    pub total: u64,
}

impl ProgressEvent {
    pub fn new(transferred: u64, total: u64) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (u128::from(transferred) * 100 / u128::from(total)).min(100) as u8
        };
        Self {
            percent,
            transferred,
            total,
        }
    }
}

/// Receives progress notifications. May be invoked from any SDK task.
pub type ProgressHook = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

#[pin_project]
struct ProgressBody<T, F> {
    #[pin]
    inner: T,
    hook: Arc<F>,
    written: u64,
    length: u64,
}

impl<T, F> ProgressBody<T, F>
where
    F: 'static,
{
    fn new(inner: T, hook: Arc<F>, length: u64) -> Self {
        ProgressBody {
            inner,
            hook,
            written: 0,
            length,
        }
    }
}

impl<T, F> Body for ProgressBody<T, F>
where
    T: Body<Data = Bytes, Error = aws_smithy_http::body::Error>,
    F: Fn(usize, u64, u64) + Send + Sync + 'static,
{
    type Data = Bytes;
    type Error = aws_smithy_http::body::Error;

    fn poll_data(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
        let this = self.project();
        match this.inner.poll_data(cx) {
            Poll::Ready(Some(Ok(data))) => {
                *this.written += data.len() as u64;
                let hook: &F = this.hook;
                hook(data.len(), *this.written, *this.length);
                Poll::Ready(Some(Ok(data)))
            }
            other => other,
        }
    }

    fn poll_trailers(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<HeaderMap>, Self::Error>> {
        self.project().inner.poll_trailers(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.length)
    }
}

#[async_trait::async_trait]
pub trait TrackableRequest<R> {
    /// Send the request, calling `hook` for every chunk of the body the SDK writes.
    ///
    /// A retried attempt rebuilds the body and starts counting from zero again.
    async fn send_tracked<F>(self, hook: F) -> Result<R, aws_sdk_s3::Error>
    where
        F: Fn(usize, u64, u64) + Send + Sync + 'static;
}

#[async_trait::async_trait]
impl TrackableRequest<PutObjectOutput> for PutObjectFluentBuilder {
    async fn send_tracked<F>(self, hook: F) -> Result<PutObjectOutput, aws_sdk_s3::Error>
    where
        F: Fn(usize, u64, u64) + Send + Sync + 'static,
    {
        let hook = Arc::new(hook);
        Ok(self
            .customize()
            .await?
            .map_request::<_, Infallible>(move |mut req| {
                let hook = Arc::clone(&hook);
                let body = mem::replace(req.body_mut(), SdkBody::taken()).map(move |body| {
                    let len = body.content_length().unwrap_or(0);
                    let body = ProgressBody::new(body, Arc::clone(&hook), len);
                    SdkBody::from_dyn(BoxBody::new(body))
                });
                *req.body_mut() = body;

                Ok(req)
            })
            .send()
            .await?)
    }
}
