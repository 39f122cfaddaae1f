use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use spin_shared::validation::ValidLead;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::SinkMode;

const SINK_TIMEOUT: Duration = Duration::from_secs(10);

/// What the spreadsheet endpoint receives for each lead.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LeadSubmission {
    pub email: String,
    pub phone: String,
    pub timestamp: String,
}

impl LeadSubmission {
    pub fn from_lead(lead: ValidLead) -> Self {
        Self {
            email: lead.email,
            phone: lead.phone,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Forwards leads to the external spreadsheet endpoint. Responses are never
/// inspected; delivery problems only show up in the logs.
#[derive(Debug, Clone)]
pub struct LeadSink {
    client: reqwest::Client,
    endpoint: String,
    mode: SinkMode,
}

impl LeadSink {
    pub fn new(endpoint: impl Into<String>, mode: SinkMode) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(SINK_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            mode,
        })
    }

    pub async fn submit(&self, submission: &LeadSubmission) -> Result<(), reqwest::Error> {
        let request = match self.mode {
            SinkMode::Json => self.client.post(&self.endpoint).json(submission),
            SinkMode::Query => self
                .client
                .get(&self.endpoint)
                .query(&[("email", &submission.email), ("phone", &submission.phone)]),
        };
        request.send().await?;
        Ok(())
    }

    /// Sends in the background and returns immediately.
    pub fn dispatch(self: &Arc<Self>, submission: LeadSubmission) -> tokio::task::JoinHandle<()> {
        let sink = Arc::clone(self);
        tokio::spawn(async move {
            match sink.submit(&submission).await {
                Ok(()) => info!(email = %submission.email, "lead forwarded to sheet"),
                Err(e) => error!(email = %submission.email, "failed to forward lead: {}", e),
            }
        })
    }
}
