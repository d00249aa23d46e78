//! Per-client dispatch counters.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for dispatch calls on one client.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	enrichments: AtomicU64,
	app_token_provider: AtomicU64,
}
impl DispatchMetrics {
	/// Returns the total number of dispatch calls.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that produced a result.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns how many escaping errors were stamped with a correlation id.
	pub fn enrichments(&self) -> u64 {
		self.enrichments.load(Ordering::Relaxed)
	}

	/// Returns how many client-credential calls were handed to the app token provider.
	pub fn app_token_provider_calls(&self) -> u64 {
		self.app_token_provider.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_enrichment(&self) {
		self.enrichments.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_app_token_provider(&self) {
		self.app_token_provider.fetch_add(1, Ordering::Relaxed);
	}
}
