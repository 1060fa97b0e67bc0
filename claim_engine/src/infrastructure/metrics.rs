use std::sync::Arc;

use prometheus::{HistogramVec, IntCounterVec, Registry, TextEncoder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Process-wide metrics registry. Spec.md names no metrics Non-goal, so this
/// is carried as ambient infrastructure the way the teacher crate carries
/// its own `infrastructure/metrics.rs`.
pub struct PipelineMetrics {
    pub registry: Registry,
    /// Documents processed, labeled by `stage` and resulting `status`.
    pub documents_processed: IntCounterVec,
    /// ERP lock-retry attempts consumed per reconciliation, labeled by
    /// `transaction` (QM/ZQM/DMS).
    pub erp_retry_attempts: HistogramVec,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let documents_processed = IntCounterVec::new(
            prometheus::Opts::new("claimpipe_documents_processed_total", "Documents processed per stage/status"),
            &["stage", "status"],
        )
        .expect("metric names and label names are valid");

        let erp_retry_attempts = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "claimpipe_erp_retry_attempts",
                "Lock-retry attempts consumed per reconciliation",
            ),
            &["transaction"],
        )
        .expect("metric names and label names are valid");

        registry
            .register(Box::new(documents_processed.clone()))
            .expect("single registration per process");
        registry
            .register(Box::new(erp_retry_attempts.clone()))
            .expect("single registration per process");

        Self {
            registry,
            documents_processed,
            erp_retry_attempts,
        }
    }

    /// Renders the registry in Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        encoder.encode_to_string(&self.registry.gather())
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal HTTP server exposing `/metrics` (Prometheus text format) and
/// `/health` (plain "OK") on `127.0.0.1`. One task per connection, no
/// framework — the teacher's `infrastructure/metrics/endpoint.rs` does the
/// same rather than pull in a full HTTP server dependency for two routes.
pub struct MetricsEndpoint {
    metrics: Arc<PipelineMetrics>,
}

impl MetricsEndpoint {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }

    /// Runs until cancelled. Intended to be raced against the process's
    /// shutdown signal via `tokio::select!`, not awaited to completion.
    pub async fn serve(&self, port: u16) -> std::io::Result<()> {
        let addr = format!("127.0.0.1:{port}");
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(%addr, "metrics endpoint listening");

        loop {
            let (mut stream, _) = listener.accept().await?;
            let metrics = self.metrics.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_request(&mut stream, &metrics).await {
                    tracing::warn!(error = %e, "error serving metrics request");
                }
            });
        }
    }
}

async fn handle_request(
    stream: &mut tokio::net::TcpStream,
    metrics: &PipelineMetrics,
) -> std::io::Result<()> {
    let mut buf = [0u8; 1024];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);

    if request.starts_with("GET /metrics") {
        match metrics.render() {
            Ok(body) => {
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4; charset=utf-8\r\nContent-Length: {}\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await?;
            }
            Err(e) => {
                let body = format!("error generating metrics: {e}");
                let response = format!(
                    "HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await?;
            }
        }
    } else if request.starts_with("GET /health") {
        stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nOK").await?;
    } else {
        stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 9\r\n\r\nNot Found").await?;
    }

    stream.flush().await
}
