//! InfluxDB 1.x HTTP write client.
//!
//! | Operation | Method | Path                                   |
//! |-----------|--------|----------------------------------------|
//! | Write     | POST   | `/write?db={database}&precision={p}`   |
//!
//! The body is line protocol. Credentials, when configured, are sent as HTTP
//! basic auth. A successful write answers `204 No Content`; failures carry a
//! JSON body `{"error": "..."}`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use trend_core::config::InfluxConfig;
use trend_core::{Batch, Result, TrendError};
use url::Url;

use crate::PointSink;
use crate::line_protocol::encode_batch;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Write client bound to one server and credential set.
pub struct InfluxClient {
    http: reqwest::Client,
    addr: Url,
    username: String,
    password: String,
}

impl InfluxClient {
    /// Build a client. Fails when the address is not a usable base URL.
    pub fn new(config: &InfluxConfig) -> Result<Self> {
        let addr = Url::parse(&config.addr)
            .map_err(|e| TrendError::Config(format!("invalid influx address '{}': {e}", config.addr)))?;
        if addr.cannot_be_a_base() {
            return Err(TrendError::Config(format!("influx address '{}' cannot be a base URL", config.addr)));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, addr, username: config.username.clone(), password: config.password.clone() })
    }

    /// Write endpoint for `batch`, keeping any path prefix of the address.
    pub fn write_url(&self, batch: &Batch) -> Url {
        let mut url = self.addr.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("write");
        }
        url.query_pairs_mut()
            .append_pair("db", batch.database())
            .append_pair("precision", batch.precision().as_str());
        url
    }
}

#[async_trait]
impl PointSink for InfluxClient {
    async fn write(&self, batch: &Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let body = encode_batch(batch)?;
        let url = self.write_url(batch);
        debug!("POST {url} ({} point(s))", batch.len());

        let mut req = self.http.post(url).body(body);
        if !self.username.is_empty() {
            req = req.basic_auth(&self.username, Some(&self.password));
        }
        let resp = req.send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error,
            Err(_) => text.trim().to_string(),
        };
        Err(TrendError::Sink { status: status.as_u16(), message })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use trend_core::{BatchConfig, Point, Precision};

    use super::*;

    /// Answer one HTTP request; resolves to the raw request (head and body).
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let task = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let head_end = loop {
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                let n = sock.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            while buf.len() < head_end + content_length {
                let n = sock.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before body");
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(response.as_bytes()).await.unwrap();
            sock.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf).to_string()
        });
        (base, task)
    }

    fn config(addr: &str, username: &str) -> InfluxConfig {
        InfluxConfig {
            addr: addr.into(),
            database: "crypto".into(),
            username: username.into(),
            password: if username.is_empty() { String::new() } else { "pass".into() },
            precision: Precision::Seconds,
        }
    }

    fn batch() -> Batch {
        let mut b = Batch::new(&BatchConfig { database: "crypto".into(), precision: Precision::Seconds }).unwrap();
        let mut p = Point::new("bitcoin", Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()).with_tag("symbol", "BTC");
        p.add_field("price_usd", 50_000.0);
        b.add_point(p);
        b
    }

    #[test]
    fn write_url_keeps_path_prefix() {
        let c = InfluxClient::new(&config("https://db.example.com/influx/", "")).unwrap();
        assert_eq!(c.write_url(&batch()).as_str(), "https://db.example.com/influx/write?db=crypto&precision=s");

        let c = InfluxClient::new(&config("http://localhost:8086", "")).unwrap();
        assert_eq!(c.write_url(&batch()).as_str(), "http://localhost:8086/write?db=crypto&precision=s");
    }

    #[test]
    fn invalid_address_is_config_error() {
        assert!(matches!(InfluxClient::new(&config("localhost 8086", "")), Err(TrendError::Config(_))));
        assert!(matches!(InfluxClient::new(&config("mailto:db@example.com", "")), Err(TrendError::Config(_))));
    }

    #[tokio::test]
    async fn write_posts_line_protocol_with_auth() {
        let (base, server) = serve_once("204 No Content", "").await;
        let c = InfluxClient::new(&config(&base, "user")).unwrap();
        c.write(&batch()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /write?db=crypto&precision=s HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: basic dxnlcjpwyxnz"));
        assert!(request.ends_with("bitcoin,symbol=BTC price_usd=50000 1609459200"));
    }

    #[tokio::test]
    async fn write_without_credentials_sends_no_auth() {
        let (base, server) = serve_once("204 No Content", "").await;
        let c = InfluxClient::new(&config(&base, "")).unwrap();
        c.write(&batch()).await.unwrap();
        assert!(!server.await.unwrap().to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let (base, server) = serve_once("404 Not Found", r#"{"error":"database not found: \"crypto\""}"#).await;
        let c = InfluxClient::new(&config(&base, "")).unwrap();
        let err = c.write(&batch()).await.unwrap_err();
        match err {
            TrendError::Sink { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, r#"database not found: "crypto""#);
            }
            other => panic!("expected Sink error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn empty_batch_is_not_sent() {
        let c = InfluxClient::new(&config("http://127.0.0.1:1", "")).unwrap();
        let empty = Batch::new(&BatchConfig { database: "crypto".into(), precision: Precision::Seconds }).unwrap();
        c.write(&empty).await.unwrap();
    }
}
