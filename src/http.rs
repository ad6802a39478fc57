//! Minimal HTTP/1.1 framing over tokio streams.
//!
//! Only what the API needs: one request per connection, `Content-Length`
//! bodies, JSON responses.

use crate::error::{Result, SqlGenError};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lower-cased header names.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpRequest {
    pub fn new(method: &str, path: &str, body: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            query: None,
            headers: HashMap::new(),
            body: body.to_string(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            body: value.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Serialize with CORS headers for `allowed_origin`.
    pub fn to_wire(&self, allowed_origin: &str) -> String {
        let content_type = if self.body.is_empty() {
            String::new()
        } else {
            "Content-Type: application/json\r\n".to_string()
        };
        format!(
            "HTTP/1.1 {} {}\r\n\
             {}\
             Access-Control-Allow-Origin: {}\r\n\
             Access-Control-Allow-Credentials: true\r\n\
             Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
             Access-Control-Allow-Headers: Content-Type\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            self.status,
            status_text(self.status),
            content_type,
            allowed_origin,
            self.body.len(),
            self.body
        )
    }
}

pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn content_length(head: &str) -> Option<usize> {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
}

fn too_large(bytes: usize) -> SqlGenError {
    SqlGenError::PayloadTooLarge(format!(
        "{} bytes exceeds the {} byte limit",
        bytes, MAX_REQUEST_BYTES
    ))
}

/// Parse a complete request buffer.
pub fn parse_request(raw: &[u8]) -> Result<HttpRequest> {
    let split = header_end(raw)
        .ok_or_else(|| SqlGenError::Input("Incomplete HTTP request headers".to_string()))?;
    let head = std::str::from_utf8(&raw[..split])
        .map_err(|e| SqlGenError::Input(format!("Request headers are not UTF-8: {}", e)))?;
    let body = std::str::from_utf8(&raw[split..])
        .map_err(|e| SqlGenError::Input(format!("Request body is not UTF-8: {}", e)))?;

    let mut lines = head.lines();
    let request_line = lines
        .next()
        .ok_or_else(|| SqlGenError::Input("Empty request".to_string()))?;
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(m), Some(t)) => (m.to_ascii_uppercase(), t),
        _ => return Err(SqlGenError::Input(format!("Bad request line: {}", request_line))),
    };

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, Some(q.to_string())),
        None => (target, None),
    };
    let mut path = path.trim_end_matches('/').to_string();
    if path.is_empty() {
        path = "/".to_string();
    }

    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let body = match content_length(head) {
        Some(len) => body.get(..len).unwrap_or(body),
        None => body,
    };

    Ok(HttpRequest {
        method,
        path,
        query,
        headers,
        body: body.to_string(),
    })
}

/// Read one request from `stream`. `Ok(None)` means the peer closed without
/// sending anything.
pub async fn read_request<S>(stream: &mut S) -> Result<Option<HttpRequest>>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    let read = tokio::time::timeout(READ_TIMEOUT, async {
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
            if buffer.len() > MAX_REQUEST_BYTES {
                return Err(too_large(buffer.len()));
            }
            if let Some(end) = header_end(&buffer) {
                let head = String::from_utf8_lossy(&buffer[..end]);
                let wanted = content_length(&head).unwrap_or(0);
                if wanted > MAX_REQUEST_BYTES {
                    return Err(too_large(wanted));
                }
                if buffer.len() >= end.saturating_add(wanted) {
                    break;
                }
            }
        }
        Ok::<(), SqlGenError>(())
    })
    .await;

    match read {
        Err(_) => return Err(SqlGenError::Input("Request read timeout".to_string())),
        Ok(Err(e)) => return Err(e),
        Ok(Ok(())) => {}
    }

    if buffer.is_empty() {
        return Ok(None);
    }
    parse_request(&buffer).map(Some)
}

pub async fn write_response<S>(stream: &mut S, response: &HttpResponse, allowed_origin: &str) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(response.to_wire(allowed_origin).as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_with_body() {
        let raw = b"POST /api/sql/generate/ HTTP/1.1\r\nHost: x\r\nContent-Type: application/json\r\nContent-Length: 17\r\n\r\n{\"description\":1}";
        let req = parse_request(raw).unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/api/sql/generate");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body, "{\"description\":1}");
    }

    #[test]
    fn test_parse_splits_query_and_normalizes_root() {
        let req = parse_request(b"GET /?verbose=1 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path, "/");
        assert_eq!(req.query.as_deref(), Some("verbose=1"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_request(b"hello").is_err());
        assert!(parse_request(b"GET\r\n\r\n").is_err());
    }

    #[test]
    fn test_wire_format_has_cors_and_length() {
        let resp = HttpResponse::json(200, &serde_json::json!({"ok": true}));
        let wire = resp.to_wire("http://localhost:3000");
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("Access-Control-Allow-Origin: http://localhost:3000\r\n"));
        assert!(wire.contains("Content-Length: 11\r\n"));
        assert!(wire.ends_with("\r\n\r\n{\"ok\":true}"));
    }

    #[tokio::test]
    async fn test_read_request_waits_for_full_body() {
        let (mut client, mut server) = tokio::io::duplex(64);
        tokio::spawn(async move {
            client
                .write_all(b"POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\n01234")
                .await
                .unwrap();
            client.write_all(b"56789").await.unwrap();
        });
        let req = read_request(&mut server).await.unwrap().unwrap();
        assert_eq!(req.body, "0123456789");
    }

    #[tokio::test]
    async fn test_oversized_content_length_rejected_before_body() {
        for length in ["18446744073709551615", "10485761"] {
            let (mut client, mut server) = tokio::io::duplex(256);
            let head = format!("POST /api/sql/generate HTTP/1.1\r\nContent-Length: {}\r\n\r\n{{}}", length);
            client.write_all(head.as_bytes()).await.unwrap();
            let err = read_request(&mut server).await.unwrap_err();
            assert!(matches!(err, SqlGenError::PayloadTooLarge(_)), "{}: {:?}", length, err);
        }
    }

    #[tokio::test]
    async fn test_read_request_empty_stream() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);
        assert!(read_request(&mut server).await.unwrap().is_none());
    }
}
