//! OAuth access tokens for Google APIs.
//!
//! Either a fixed token from the environment (e.g. the output of
//! `gcloud auth print-access-token`) or the default service account of the
//! GCE / Cloud Run metadata server, cached until shortly before it expires.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
/// Refresh this long before the reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Clone)]
enum TokenSource {
    Static(String),
    Metadata {
        client: Client,
        url: String,
        cache: Arc<Mutex<Option<CachedToken>>>,
    },
}

#[derive(Clone)]
pub struct GoogleAuth {
    source: TokenSource,
}

impl GoogleAuth {
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
        }
    }

    pub fn metadata_server(client: Client) -> Self {
        Self {
            source: TokenSource::Metadata {
                client,
                url: METADATA_TOKEN_URL.to_string(),
                cache: Arc::new(Mutex::new(None)),
            },
        }
    }

    /// Static token when one is given, the metadata server otherwise
    pub fn from_config(client: Client, static_token: Option<&str>) -> Self {
        match static_token {
            Some(token) => {
                info!("Using GOOGLE_ACCESS_TOKEN for Google API calls");
                Self::with_static_token(token)
            }
            None => {
                info!("Using the metadata server for Google API tokens");
                Self::metadata_server(client)
            }
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        match &self.source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata { client, url, cache } => {
                let mut cached = cache.lock().await;
                if let Some(token) = cached.as_ref() {
                    if Instant::now() < token.refresh_at {
                        return Ok(token.value.clone());
                    }
                }

                let response = client
                    .get(url.as_str())
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(anyhow!(
                        "Metadata server refused token request: {}",
                        response.status()
                    ));
                }
                let token: MetadataToken = response.json().await?;
                debug!("Fetched access token valid for {}s", token.expires_in);

                let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
                *cached = Some(CachedToken {
                    value: token.access_token.clone(),
                    refresh_at: Instant::now() + lifetime,
                });
                Ok(token.access_token)
            }
        }
    }
}
