//! JWKS refresher (C5): scheduled fetch → import → publish, with exponential
//! backoff on failure and jittered steady-state polling.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng as _;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::JwksFetchError;
use crate::metrics::Metrics;
use crate::store::{JwksStore, Snapshot};

const MAX_BACKOFF_RETRIES: u32 = 30;
const MAX_BACKOFF_SECS: u64 = 900; // 30^2

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Value>,
}

/// Owns the background task that periodically refreshes the JWKS store.
///
/// Dropping (or cancelling) the handle cancels any in-flight fetch; a
/// cancelled refresher never publishes afterward.
pub struct Refresher {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Refresher {
    /// Start the background task, fetching immediately and then looping per
    /// §4.5. `generation` seeds the snapshot counter.
    pub fn spawn(
        http: reqwest::Client,
        cluster: String,
        path: String,
        refresh_interval: Duration,
        store: Arc<JwksStore>,
        metrics: Arc<dyn Metrics>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let child = cancel.child_token();
        let handle = tokio::spawn(run_loop(http, cluster, path, refresh_interval, store, metrics, child));
        Self {
            cancel,
            handle: Some(handle),
        }
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_loop(
    http: reqwest::Client,
    cluster: String,
    path: String,
    refresh_interval: Duration,
    store: Arc<JwksStore>,
    metrics: Arc<dyn Metrics>,
    cancel: CancellationToken,
) {
    let generation = AtomicU64::new(0);
    let mut retry_count: u32 = 0;

    loop {
        let url = format!("{cluster}{path}");
        let outcome = tokio::select! {
            () = cancel.cancelled() => return,
            res = fetch(&http, &url) => res,
        };

        let delay = match outcome {
            Ok(keys) => {
                let next_generation = generation.fetch_add(1, Ordering::Relaxed) + 1;
                store.publish(Snapshot::new(keys, next_generation));
                metrics.incr_jwks_fetch_success();
                retry_count = 0;
                jittered(refresh_interval)
            }
            Err(err) => {
                tracing::warn!(error = %err, "jwks fetch failed");
                metrics.incr_jwks_fetch_failed();
                if retry_count < MAX_BACKOFF_RETRIES {
                    retry_count += 1;
                    jittered(backoff_delay(retry_count))
                } else {
                    jittered(refresh_interval)
                }
            }
        };

        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(delay) => {}
        }
    }
}

/// `retry_count² seconds`, capped at 900s (`30²`), per §4.5.
fn backoff_delay(retry_count: u32) -> Duration {
    let secs = (retry_count as u64).saturating_mul(retry_count as u64).min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

fn jittered(base: Duration) -> Duration {
    let jitter_fraction: f64 = rand::rng().random_range(0.0..1.0);
    base + base.mul_f64(jitter_fraction)
}

async fn fetch(http: &reqwest::Client, url: &str) -> Result<HashMap<String, crate::jwk::PublicKey>, JwksFetchError> {
    let resp = http
        .get(url)
        .timeout(Duration::from_secs(5))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(JwksFetchError::Status(status));
    }

    let text = resp.text().await.map_err(JwksFetchError::Transport)?;
    let body: JwksDocument = serde_json::from_str(&text)?;

    let mut keys = HashMap::with_capacity(body.keys.len());
    for jwk in &body.keys {
        match crate::jwk::import(jwk) {
            Ok((kid, key)) => {
                keys.insert(kid, key);
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping jwk that failed to import");
            }
        }
    }

    Ok(keys)
}
