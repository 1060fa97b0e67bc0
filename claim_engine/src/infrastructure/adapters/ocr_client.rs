use async_trait::async_trait;
use claim_domain::error::ClaimError;
use tracing::{debug, warn};

/// PDF-to-text OCR microservice boundary (spec.md §6). Implementations
/// model only the wire contract: `POST {base}/{route}` with a multipart
/// `pdf` part and an `access_token` header.
#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn extract_text(&self, pdf_bytes: &[u8], route: &str) -> Result<String, ClaimError>;
}

/// `reqwest`-backed implementation. Retries on `502` up to `retry_attempts`
/// times with a short sleep; any other non-2xx status is permanent.
pub struct ReqwestOcrClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    retry_attempts: u32,
}

impl ReqwestOcrClient {
    pub fn new(base_url: String, access_token: String, retry_attempts: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            access_token,
            retry_attempts,
        }
    }

    fn pdf_form(&self, pdf_bytes: &[u8]) -> Result<reqwest::multipart::Form, ClaimError> {
        let part = reqwest::multipart::Part::bytes(pdf_bytes.to_vec())
            .file_name("document.pdf")
            .mime_str("application/pdf")
            .map_err(|e| ClaimError::InvalidConfiguration(format!("bad multipart mime: {e}")))?;
        Ok(reqwest::multipart::Form::new().part("pdf", part))
    }
}

#[async_trait]
impl OcrClient for ReqwestOcrClient {
    async fn extract_text(&self, pdf_bytes: &[u8], route: &str) -> Result<String, ClaimError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), route);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let response = self
                .client
                .post(&url)
                .header("access_token", &self.access_token)
                .multipart(self.pdf_form(pdf_bytes)?)
                .send()
                .await
                .map_err(|_| ClaimError::OcrServer { status: 0 })?;

            let status = response.status();
            if status.as_u16() == 502 && attempt <= self.retry_attempts {
                warn!(attempt, "OCR returned 502, retrying");
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                continue;
            }
            if !status.is_success() {
                return Err(ClaimError::OcrServer { status: status.as_u16() });
            }

            let text = response
                .text()
                .await
                .map_err(|_| ClaimError::OcrServer { status: status.as_u16() })?;
            debug!(len = text.len(), "OCR extraction succeeded");
            // form-feed characters are a paging artifact, not content.
            return Ok(text.replace('\u{000C}', ""));
        }
    }
}
