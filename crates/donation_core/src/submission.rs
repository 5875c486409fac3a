use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::{TransportError, ValidationError},
    protocol::{DonationPayload, ReceiptDetails},
};
use tracing::{debug, info};
use url::Url;

use crate::view::FormField;

pub const DEFAULT_SUBMIT_ENDPOINT: &str = "https://cyberdevs.tech/api/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &DonationPayload) -> Result<(), TransportError>;
    fn describe(&self) -> String;
}

/// Posts the payload as JSON; any 2xx status counts as success.
pub struct HttpSubmitter {
    http: Client,
    endpoint: Url,
}

impl HttpSubmitter {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn with_timeout(endpoint: Url, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &DonationPayload) -> Result<(), TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        info!(endpoint = %self.endpoint, status = status.as_u16(), "donation submitted");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remote ({})", self.endpoint)
    }
}

/// Accepts every submission without performing I/O.
pub struct NoopSubmitter;

#[async_trait]
impl Submitter for NoopSubmitter {
    async fn submit(&self, payload: &DonationPayload) -> Result<(), TransportError> {
        debug!(church = %payload.entity, "local submission accepted");
        Ok(())
    }

    fn describe(&self) -> String {
        "local (no network)".to_string()
    }
}

/// Every field of the receipt form is required.
pub fn validate_receipt_form(form: &[FormField]) -> Result<ReceiptDetails, ValidationError> {
    if let Some(blank) = form.iter().find(|field| field.is_blank()) {
        return Err(ValidationError::MissingRequiredField {
            field: blank.key.clone(),
        });
    }

    let value_of = |key: &str| {
        form.iter()
            .find(|field| field.key == key)
            .map(|field| field.value.clone())
            .ok_or_else(|| ValidationError::MissingRequiredField {
                field: key.to_string(),
            })
    };

    Ok(ReceiptDetails {
        full_name: value_of(ReceiptDetails::FULL_NAME)?,
        church_member: value_of(ReceiptDetails::CHURCH_MEMBER)?,
        mpesa_number: value_of(ReceiptDetails::MPESA_NUMBER)?,
    })
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
