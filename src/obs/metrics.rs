// self
use crate::obs::{CallKind, CallOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"safetrack_client_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records where a cached read was answered from.
///
/// Reads served from a fresh entry, or from a fetch another reader completed while this one
/// waited, count as `cache`; everything else counts as `network`.
pub fn record_cache_read(served_from_cache: bool) {
	let source = cache_read_source(served_from_cache);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!("safetrack_client_cache_read_total", "source" => source).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = source;
	}
}

/// Records a session that ended because it could not be renewed.
pub fn record_session_expired(cleared: bool) {
	let store = if cleared { "cleared" } else { "clear_failed" };

	#[cfg(feature = "metrics")]
	{
		metrics::counter!("safetrack_client_session_expired_total", "store" => store).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = store;
	}
}

fn cache_read_source(served_from_cache: bool) -> &'static str {
	if served_from_cache { "cache" } else { "network" }
}
