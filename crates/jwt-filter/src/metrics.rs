//! Observability counters (§6 "Observability surface").

use std::sync::atomic::{AtomicU64, Ordering};

use crate::verify::VerifyStatus;

/// Sink for the four named counters. Hosts with a richer metrics system can
/// implement this directly against their own sink; `AtomicCounters` below is
/// a reasonable default otherwise.
pub trait Metrics: Send + Sync {
    fn incr_jwks_fetch_success(&self);
    fn incr_jwks_fetch_failed(&self);
    fn incr_jwt_accepted(&self);
    fn incr_jwt_rejected(&self, verdict: VerifyStatus);
}

/// In-memory counters, usable standalone or as a host's default sink.
#[derive(Default)]
pub struct AtomicCounters {
    pub jwks_fetch_success: AtomicU64,
    pub jwks_fetch_failed: AtomicU64,
    pub jwt_accepted: AtomicU64,
    pub jwt_rejected: AtomicU64,
}

impl Metrics for AtomicCounters {
    fn incr_jwks_fetch_success(&self) {
        self.jwks_fetch_success.fetch_add(1, Ordering::Relaxed);
    }

    fn incr_jwks_fetch_failed(&self) {
        self.jwks_fetch_failed.fetch_add(1, Ordering::Relaxed);
    }

    fn incr_jwt_accepted(&self) {
        self.jwt_accepted.fetch_add(1, Ordering::Relaxed);
    }

    fn incr_jwt_rejected(&self, verdict: VerifyStatus) {
        tracing::debug!(?verdict, "jwt_rejected");
        self.jwt_rejected.fetch_add(1, Ordering::Relaxed);
    }
}

/// A `Metrics` sink that discards everything; used where no observability is
/// wired in (e.g. unit tests of the pipeline itself).
#[derive(Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn incr_jwks_fetch_success(&self) {}
    fn incr_jwks_fetch_failed(&self) {}
    fn incr_jwt_accepted(&self) {}
    fn incr_jwt_rejected(&self, _verdict: VerifyStatus) {}
}
