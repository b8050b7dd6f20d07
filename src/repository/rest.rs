//! REST backend adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{Invoice, InvoiceId};

use super::{CancelPayload, InvoicePayload, InvoiceRepository, InvoiceResponse, RepositoryError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Connection settings for [`RestRepository`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestConfig {
    /// API root, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as `Authorization: Bearer ...`. Obtaining and refreshing the
    /// token is the host application's job.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            bearer_token: None,
        }
    }

    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

/// [`InvoiceRepository`] backed by the invoice REST API.
///
/// | Call | Request |
/// |------|---------|
/// | create | `POST {base}/invoices` |
/// | update | `PUT {base}/invoices/{id}` |
/// | cancel | `POST {base}/invoices/{id}/cancel` |
/// | find | `GET {base}/invoices/{id}` |
#[derive(Debug, Clone)]
pub struct RestRepository {
    client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl RestRepository {
    pub fn new(config: RestConfig) -> Result<Self, RepositoryError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RepositoryError::Unavailable(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RepositoryError::Unavailable(format!(
                "base url {base_url} cannot have path segments"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            bearer_token: config.bearer_token,
        })
    }

    /// `{base}/invoices/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("invoices").extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "invoice api request");
        let request = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), RepositoryError> {
        let resp = request
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;
        Ok((status, body))
    }
}

fn ensure_success(status: StatusCode, body: String) -> Result<String, RepositoryError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(RepositoryError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

fn parse_invoice(body: &str) -> Result<Invoice, RepositoryError> {
    let record: InvoiceResponse =
        serde_json::from_str(body).map_err(|e| RepositoryError::Parse(e.to_string()))?;
    Invoice::try_from(record)
}

#[async_trait]
impl InvoiceRepository for RestRepository {
    async fn create(&self, payload: &InvoicePayload) -> Result<Invoice, RepositoryError> {
        let request = self.request(Method::POST, self.endpoint(&[])).json(payload);
        let (status, body) = self.send(request).await?;
        let invoice = parse_invoice(&ensure_success(status, body)?)?;
        info!(invoice_id = %invoice.id(), "invoice created");
        Ok(invoice)
    }

    async fn update(
        &self,
        id: &InvoiceId,
        payload: &InvoicePayload,
    ) -> Result<Invoice, RepositoryError> {
        let request = self
            .request(Method::PUT, self.endpoint(&[id.as_str()]))
            .json(payload);
        let (status, body) = self.send(request).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        let invoice = parse_invoice(&ensure_success(status, body)?)?;
        info!(invoice_id = %id, "invoice updated");
        Ok(invoice)
    }

    async fn cancel(&self, id: &InvoiceId, payload: &CancelPayload) -> Result<(), RepositoryError> {
        let request = self
            .request(Method::POST, self.endpoint(&[id.as_str(), "cancel"]))
            .json(payload);
        let (status, body) = self.send(request).await?;
        match status {
            StatusCode::NOT_FOUND => Err(RepositoryError::NotFound(id.clone())),
            StatusCode::CONFLICT => Err(RepositoryError::Conflict(body)),
            _ => {
                ensure_success(status, body)?;
                info!(invoice_id = %id, "invoice cancellation persisted");
                Ok(())
            }
        }
    }

    async fn find(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let request = self.request(Method::GET, self.endpoint(&[id.as_str()]));
        let (status, body) = self.send(request).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_invoice(&ensure_success(status, body)?).map(Some)
    }
}
