//! PushPlus client - delivers the briefing to WeChat via pushplus.plus
//!
//! PushPlus answers HTTP 200 even for rejected messages; the outcome is in
//! the body's `code` field (200 = accepted).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{NotifyError, PushSink};
use crate::config::defaults::PUSH_HTTP_TIMEOUT_SECS;
use crate::config::PushConfig;

/// PushPlus success code.
const ACCEPTED: i64 = 200;

#[derive(Serialize)]
struct SendRequest<'a> {
    token: &'a str,
    topic: &'a str,
    title: &'a str,
    content: &'a str,
    template: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    code: i64,
    #[serde(default)]
    msg: String,
}

/// HTTP client for the PushPlus send API
#[derive(Clone)]
pub struct PushPlusClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    topic: String,
    template: String,
}

impl PushPlusClient {
    pub fn new(config: &PushConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PUSH_HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            topic: config.topic.clone(),
            template: config.template.clone(),
        })
    }

    /// Get endpoint for logging
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PushSink for PushPlusClient {
    async fn push(&self, title: &str, content: &str) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&SendRequest {
                token: &self.token,
                topic: &self.topic,
                title,
                content,
                template: &self.template,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NotifyError::ServerError(resp.status()));
        }

        let body: SendResponse = resp.json().await?;
        if body.code == ACCEPTED {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                code: body.code,
                message: body.msg,
            })
        }
    }

    fn sink_name(&self) -> &str {
        "PushPlus"
    }
}
