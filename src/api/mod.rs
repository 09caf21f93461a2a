//! The user lookup request.
//!
//! One GET per call, no retries and no client-side timeout. Whatever goes
//! wrong is reported back as a [`FetchError`] whose display text becomes the
//! error code shown in the form.

use reqwest::{Client, StatusCode};

use crate::config::AppConfig;
use crate::session::Action;

/// Errors from a single lookup
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered with anything other than 200
    #[error("{0}")]
    Status(u16),

    /// No usable response (connect, DNS, TLS, bad URL, body read)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// 200 with a body that is not JSON
    #[error("{0}")]
    Body(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct UserApi {
    http: Client,
    base_url: String,
    delay_secs: u32,
}

impl UserApi {
    pub fn new(base_url: impl Into<String>, delay_secs: u32) -> Self {
        Self::with_client(Client::new(), base_url, delay_secs)
    }

    /// Use a preconfigured client (proxy settings, tests against local servers)
    pub fn with_client(http: Client, base_url: impl Into<String>, delay_secs: u32) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            delay_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.base_url.clone(), config.delay_secs)
    }

    pub fn delay_secs(&self) -> u32 {
        self.delay_secs
    }

    /// Endpoint for a user; the ID goes in as typed
    pub fn user_url(&self, user_id: &str) -> String {
        format!(
            "{}/api/users/{}?delay={}",
            self.base_url, user_id, self.delay_secs
        )
    }

    /// Fetch a user and return the body re-serialized with 2-space indentation
    pub async fn fetch_user(&self, user_id: &str) -> Result<String, FetchError> {
        let url = self.user_url(user_id);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            tracing::info!("Lookup for {:?} returned {}", user_id, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        pretty_json(&body)
    }

    /// Run a lookup and turn the outcome into the matching form event
    pub async fn fetch_action(&self, user_id: &str) -> Action {
        match self.fetch_user(user_id).await {
            Ok(payload) => Action::FetchSucceeded(payload),
            Err(e) => {
                tracing::info!("Lookup for {:?} failed: {}", user_id, e);
                Action::FetchFailed(e.to_string())
            }
        }
    }
}

/// Parse a JSON body and print it back out indented
pub fn pretty_json(body: &str) -> Result<String, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
