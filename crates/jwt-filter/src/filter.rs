//! Filter adapter (C7): the seam the embedding host drives through a
//! header/data/trailer streaming contract.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::clock::{Clock, SystemClock};
use crate::config::{FilterConfig, KeySource};
use crate::metrics::{AtomicCounters, Metrics};
use crate::refresher::Refresher;
use crate::store::{JwksStore, Snapshot};
use crate::verify::{self, VerifyStatus};

/// What the host should do next, mirroring the host's own streaming contract.
#[derive(Debug, Clone)]
pub enum FilterResult {
    Continue,
    StopIteration { response: FilterResponse },
}

/// A synthesized reply the host should send in place of forwarding upstream.
#[derive(Debug, Clone)]
pub struct FilterResponse {
    pub status: u16,
    pub body: &'static str,
}

/// Header map abstraction, intentionally minimal: only the lookup the filter
/// needs. Hosts adapt their own header type to this trait.
pub trait HeaderMap: Send + Sync {
    /// Case-insensitive lookup of a single header value.
    fn get(&self, name: &str) -> Option<&str>;
}

/// The per-request contract a reverse-proxy / request-pipeline host drives
/// this filter through.
#[async_trait]
pub trait RequestFilter: Send + Sync {
    async fn decode_headers(&self, headers: &dyn HeaderMap, end_of_stream: bool) -> FilterResult;
    fn decode_data(&self, _buffer: &[u8], _end_of_stream: bool) -> FilterResult {
        FilterResult::Continue
    }
    fn decode_trailers(&self, _trailers: &dyn HeaderMap) -> FilterResult {
        FilterResult::Continue
    }
}

const AUTH_HEADER: &str = "authenticated-user-jwt";

/// The JWT-authenticating filter.
///
/// Holds a shared reference to configuration and the JWKS store; reads the
/// store's current snapshot at the time of `decode_headers` and does not
/// retain it past the call.
pub struct JwtAuthFilter {
    cfg: FilterConfig,
    store: Arc<JwksStore>,
    metrics: Arc<dyn Metrics>,
    clock: Box<dyn Clock>,
    _refresher: Option<Refresher>,
}

impl JwtAuthFilter {
    /// Build a filter from raw JSON configuration (§6), starting the
    /// background refresher unless static keys are configured.
    ///
    /// Must be called from within a Tokio runtime context (the refresher's
    /// background task is spawned onto it).
    pub fn new(config_json: &str) -> Result<Self, crate::error::ConfigError> {
        let cfg = FilterConfig::from_json(config_json)?;
        Self::from_config(cfg, Arc::new(AtomicCounters::default()))
    }

    /// As [`Self::new`], with an explicit configuration and metrics sink.
    pub fn from_config(cfg: FilterConfig, metrics: Arc<dyn Metrics>) -> Result<Self, crate::error::ConfigError> {
        let store = Arc::new(JwksStore::new());

        let refresher = match &cfg.key_source {
            KeySource::Static(keys) => {
                store.publish(Snapshot::new(keys.clone(), 1));
                None
            }
            KeySource::Jwks { cluster, path } => {
                store.publish(Snapshot::new(std::collections::HashMap::new(), 0));
                let http = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;
                Some(Refresher::spawn(
                    http,
                    cluster.clone(),
                    path.clone(),
                    cfg.refresh_interval,
                    Arc::clone(&store),
                    Arc::clone(&metrics),
                ))
            }
        };

        Ok(Self {
            cfg,
            store,
            metrics,
            clock: Box::new(SystemClock),
            _refresher: refresher,
        })
    }

    fn verdict(&self, headers: &dyn HeaderMap) -> VerifyStatus {
        let snapshot = self.store.current();
        verify::verify(headers.get(AUTH_HEADER), &snapshot, &self.cfg, self.clock.as_ref())
    }
}

#[async_trait]
impl RequestFilter for JwtAuthFilter {
    async fn decode_headers(&self, headers: &dyn HeaderMap, _end_of_stream: bool) -> FilterResult {
        let verdict = self.verdict(headers);

        if verdict.is_success() {
            self.metrics.incr_jwt_accepted();
            return FilterResult::Continue;
        }

        self.metrics.incr_jwt_rejected(verdict);
        FilterResult::StopIteration {
            response: FilterResponse {
                status: 401,
                body: verdict.wire_name(),
            },
        }
    }
}
