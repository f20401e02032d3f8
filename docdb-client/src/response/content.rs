//! Response content payloads.
//!
//! This module provides [`Content`], the body of a [`ResponseMessage`]. Content
//! is either an in-memory buffer, whose length is known without any I/O, or an
//! opaque stream of unknown length.
//!
//! [`ResponseMessage`]: crate::ResponseMessage

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use http_body::{Body, Frame, SizeHint};
use http_body_util::BodyExt;
use pin_project_lite::pin_project;

use crate::ClientError;

/// A boxed stream of content chunks.
pub type ContentStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

pin_project! {
    /// The payload of a response.
    ///
    /// Dropping a `Content` releases it; for streamed content this drops the
    /// underlying stream and with it any connection resources.
    #[project = ContentProj]
    pub enum Content {
        /// Fully buffered payload.
        Buffered {
            data: Option<Bytes>,
            len: usize,
        },
        /// Payload delivered as a stream of chunks.
        Streaming {
            #[pin]
            stream: ContentStream,
        },
    }
}

impl Content {
    /// Create buffered content.
    pub fn buffered(data: Bytes) -> Self {
        let len = data.len();
        Content::Buffered {
            data: Some(data),
            len,
        }
    }

    /// Create streamed content from the given stream.
    pub fn streaming<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, ClientError>> + Send + 'static,
    {
        Content::Streaming {
            stream: Box::pin(stream),
        }
    }

    /// Length of buffered content, available without reading.
    ///
    /// Returns `None` for streamed content.
    pub fn buffered_len(&self) -> Option<usize> {
        match self {
            Content::Buffered { len, .. } => Some(*len),
            Content::Streaming { .. } => None,
        }
    }

    /// Returns true if the content is held in memory.
    pub fn is_buffered(&self) -> bool {
        matches!(self, Content::Buffered { .. })
    }

    /// Read the remaining content into a single buffer.
    pub async fn into_bytes(self) -> Result<Bytes, ClientError> {
        Ok(self.collect().await?.to_bytes())
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Content::Buffered { len, .. } => f.debug_struct("Buffered").field("len", len).finish(),
            Content::Streaming { .. } => f.debug_struct("Streaming").finish_non_exhaustive(),
        }
    }
}

impl Body for Content {
    type Data = Bytes;
    type Error = ClientError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            ContentProj::Buffered { data, .. } => {
                let result = data.take().map(|d| Ok(Frame::data(d)));
                Poll::Ready(result)
            }
            ContentProj::Streaming { stream } => match stream.poll_next(cx) {
                Poll::Ready(Some(Ok(data))) => Poll::Ready(Some(Ok(Frame::data(data)))),
                Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            },
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Content::Buffered { data, .. } => data.is_none(),
            Content::Streaming { .. } => false,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Content::Buffered { data, .. } => {
                SizeHint::with_exact(data.as_ref().map_or(0, |d| d.len() as u64))
            }
            Content::Streaming { .. } => SizeHint::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    #[test]
    fn test_buffered_len() {
        let content = Content::buffered(Bytes::from_static(b"hello"));
        assert_eq!(content.buffered_len(), Some(5));
        assert!(content.is_buffered());
        assert_eq!(content.size_hint().exact(), Some(5));
    }

    #[test]
    fn test_streaming_has_no_len() {
        let content = Content::streaming(stream::iter(vec![Ok(Bytes::from_static(b"a"))]));
        assert_eq!(content.buffered_len(), None);
        assert!(!content.is_buffered());
        assert_eq!(content.size_hint().exact(), None);
    }

    #[tokio::test]
    async fn test_into_bytes_buffered() {
        let content = Content::buffered(Bytes::from_static(b"payload"));
        assert_eq!(content.into_bytes().await.unwrap(), Bytes::from_static(b"payload"));
    }

    #[tokio::test]
    async fn test_into_bytes_streaming() {
        let content = Content::streaming(stream::iter(vec![
            Ok(Bytes::from_static(b"pay")),
            Ok(Bytes::from_static(b"load")),
        ]));
        assert_eq!(content.into_bytes().await.unwrap(), Bytes::from_static(b"payload"));
    }

    #[tokio::test]
    async fn test_into_bytes_stream_error() {
        let content = Content::streaming(stream::iter(vec![
            Ok(Bytes::from_static(b"pay")),
            Err(ClientError::Transport("connection reset".into())),
        ]));
        let err = content.into_bytes().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
