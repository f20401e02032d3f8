use crate::{Content, ResponseMessage};

/// Size of a response payload in bytes, computed without reading the body.
///
/// | response | result |
/// |---|---|
/// | absent | 0 |
/// | buffered content | buffer length |
/// | `content-length` present and parseable | its value |
/// | otherwise | 0 |
///
/// Streamed content is never read just to measure it.
pub fn payload_size(response: Option<&ResponseMessage>) -> u64 {
    let Some(response) = response else {
        return 0;
    };

    if let Some(len) = response.content().and_then(Content::buffered_len) {
        return len as u64;
    }

    match response.headers().content_length() {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(len) => len,
            Err(_) => {
                tracing::warn!(content_length = value, "ignoring unparseable content-length");
                0
            }
        },
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::stream;
    use http::StatusCode;

    use super::*;
    use crate::Headers;

    fn streaming() -> Content {
        Content::streaming(stream::iter(vec![Ok(Bytes::from_static(b"unread"))]))
    }

    #[test]
    fn test_absent_response() {
        assert_eq!(payload_size(None), 0);
    }

    #[test]
    fn test_buffered_content_wins_over_header() {
        let response = ResponseMessage::new(StatusCode::OK)
            .with_headers(Headers::empty().with_content_length("999"))
            .with_content(Content::buffered(Bytes::from_static(b"12345")));
        assert_eq!(payload_size(Some(&response)), 5);
    }

    #[test]
    fn test_streamed_content_uses_header() {
        let response = ResponseMessage::new(StatusCode::OK)
            .with_headers(Headers::empty().with_content_length("2048"))
            .with_content(streaming());
        assert_eq!(payload_size(Some(&response)), 2048);
    }

    #[test]
    fn test_streamed_content_without_header() {
        let response = ResponseMessage::new(StatusCode::OK).with_content(streaming());
        assert_eq!(payload_size(Some(&response)), 0);
    }

    #[test]
    fn test_unparseable_header() {
        let response = ResponseMessage::new(StatusCode::OK)
            .with_headers(Headers::empty().with_content_length("lots"));
        assert_eq!(payload_size(Some(&response)), 0);
    }

    #[test]
    fn test_no_content_no_header() {
        assert_eq!(payload_size(Some(&ResponseMessage::new(StatusCode::NO_CONTENT))), 0);
    }
}
