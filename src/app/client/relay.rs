//! Fallback relay chain
//!
//! The statistics endpoint cannot always be reached directly, so every
//! request is routed through one of several public relays. Each relay is a
//! pure `target URL -> relay URL` transformation; [`FallbackFetcher`] walks
//! them in order and returns the first body that is a valid JSON document.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};
use url::form_urlencoded;

use super::http::Transport;
use crate::constants::stats::{DEFAULT_RELAYS, ENCODED_PLACEHOLDER, RAW_PLACEHOLDER};
use crate::errors::{FetchError, FetchResult};

type BuildFn = dyn Fn(&str) -> String + Send + Sync;

/// A single relay: a named pure URL transformation
#[derive(Clone)]
pub struct Relay {
    name: String,
    build: Arc<BuildFn>,
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay").field("name", &self.name).finish()
    }
}

impl Relay {
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    /// Relay from a template such as `https://relay.example/raw?url={url}`
    ///
    /// `{url}` is replaced with the URL-encoded target and `{raw}` with the
    /// target verbatim.
    pub fn from_template(template: &str) -> Self {
        let name = template.split('?').next().unwrap_or(template).to_string();
        let template = template.to_string();
        Self::new(name, move |target| {
            template
                .replace(ENCODED_PLACEHOLDER, &encode_component(target))
                .replace(RAW_PLACEHOLDER, target)
        })
    }

    /// Pass-through relay that requests the target itself
    pub fn direct() -> Self {
        Self::new("direct", str::to_string)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the URL to request for `target`
    pub fn proxy_url(&self, target: &str) -> String {
        (self.build)(target)
    }
}

/// The bundled relay chain
pub fn default_relays() -> Vec<Relay> {
    DEFAULT_RELAYS.iter().map(|t| Relay::from_template(t)).collect()
}

fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Try each candidate in order and return the first success
///
/// Failures are logged and the most recent one is returned when every
/// candidate fails. An empty candidate list yields `FetchError::NoRelays`.
pub async fn first_success<I, T, F, Fut>(candidates: I, mut attempt: F) -> (usize, FetchResult<T>)
where
    I: IntoIterator,
    I::Item: fmt::Debug,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let mut attempts = 0;
    let mut last_error = None;

    for candidate in candidates {
        attempts += 1;
        let label = format!("{:?}", candidate);
        match attempt(candidate).await {
            Ok(value) => return (attempts, Ok(value)),
            Err(e) => {
                warn!("Attempt {} via {} failed: {}", attempts, label, e);
                last_error = Some(e);
            }
        }
    }

    (attempts, Err(last_error.unwrap_or(FetchError::NoRelays)))
}

/// Fetches JSON documents through an ordered relay chain
#[derive(Clone)]
pub struct FallbackFetcher {
    transport: Arc<dyn Transport>,
    relays: Vec<Relay>,
}

impl fmt::Debug for FallbackFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackFetcher")
            .field("relays", &self.relays)
            .finish()
    }
}

impl FallbackFetcher {
    pub fn new(transport: Arc<dyn Transport>, relays: Vec<Relay>) -> Self {
        Self { transport, relays }
    }

    pub fn relays(&self) -> &[Relay] {
        &self.relays
    }

    /// Fetch `target_url` and return its raw JSON text
    ///
    /// # Errors
    ///
    /// Returns `FetchError::DataSourceUnavailable` carrying the last relay's
    /// error when every relay fails. An empty chain fails the same way with
    /// zero attempts.
    pub async fn fetch_json(&self, target_url: &str) -> FetchResult<String> {
        let transport = Arc::clone(&self.transport);
        let (attempts, result) = first_success(self.relays.clone(), move |relay| {
            let transport = Arc::clone(&transport);
            let url = relay.proxy_url(target_url);
            async move { validated_json(transport.get_text(&url).await?) }
        })
        .await;

        match result {
            Ok(body) => {
                debug!("Fetched {} after {} relay attempt(s)", target_url, attempts);
                Ok(body)
            }
            Err(e) => Err(FetchError::DataSourceUnavailable {
                attempts,
                last_error: e.to_string(),
            }),
        }
    }
}

/// Accept a body only if it is non-empty, starts with `{` and parses strictly
fn validated_json(body: String) -> FetchResult<String> {
    let trimmed = body.trim_start();
    if trimmed.is_empty() {
        return Err(FetchError::EmptyBody);
    }
    if !trimmed.starts_with('{') {
        return Err(FetchError::NotJson);
    }
    serde_json::from_str::<serde_json::Value>(&body)?;
    Ok(body)
}
