//! `POST /stream` adapter
//!
//! Implements [`StreamGateway`] over `reqwest`. The response body is handed
//! to the session chunk by chunk, exactly as it arrives.

use super::client::{BackendClient, error_body};
use async_trait::async_trait;
use chatline_application::ports::stream_gateway::{
    ByteStream, GatewayError, StreamGateway, StreamRequest,
};
use futures::StreamExt;
use tracing::{debug, warn};

pub struct HttpStreamGateway {
    backend: BackendClient,
}

impl HttpStreamGateway {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

/// Map a failure of the request itself (before any status line).
fn send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Connection(e.to_string())
    }
}

/// Map a failure while reading the body.
fn body_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Body(e.to_string())
    }
}

#[async_trait]
impl StreamGateway for HttpStreamGateway {
    async fn open_stream(&self, request: StreamRequest) -> Result<ByteStream, GatewayError> {
        let url = self.backend.endpoint(&["stream"]);
        debug!("POST {} ({} messages)", url, request.messages.len());

        let response = self
            .backend
            .http()
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            warn!("Stream request rejected: HTTP {}", status.as_u16());
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(body_error));
        Ok(Box::pin(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatline_domain::Message;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(base_url: &str, request_timeout: Option<Duration>) -> HttpStreamGateway {
        let backend =
            BackendClient::with_timeouts(base_url, Duration::from_secs(2), request_timeout)
                .unwrap();
        HttpStreamGateway::new(backend)
    }

    async fn collect(mut body: ByteStream) -> Result<Vec<u8>, GatewayError> {
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            bytes.extend(chunk?);
        }
        Ok(bytes)
    }

    #[tokio::test]
    async fn test_streams_plain_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .and(body_json(serde_json::json!({
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("Hi there \u{1F980}".as_bytes(), "text/plain; charset=utf-8"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = gateway(&server.uri(), None)
            .open_stream(StreamRequest::new(vec![Message::user("Hello")]))
            .await
            .unwrap();

        assert_eq!(collect(body).await.unwrap(), "Hi there \u{1F980}".as_bytes());
    }

    #[tokio::test]
    async fn test_error_status_is_reported_before_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed\n"))
            .mount(&server)
            .await;

        let err = gateway(&server.uri(), None)
            .open_stream(StreamRequest::new(vec![Message::user("Hello")]))
            .await
            .err()
            .unwrap();

        assert_eq!(
            err,
            GatewayError::Status {
                status: 500,
                body: "model crashed".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let err = gateway(&server.uri(), Some(Duration::from_millis(100)))
            .open_stream(StreamRequest::new(vec![Message::user("Hello")]))
            .await
            .err()
            .unwrap();

        assert_eq!(err, GatewayError::Timeout);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_error() {
        // Bind and release a port so nothing is listening on it
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = gateway(&format!("http://127.0.0.1:{port}"), None)
            .open_stream(StreamRequest::new(vec![Message::user("Hello")]))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, GatewayError::Connection(_)), "{err:?}");
    }
}
