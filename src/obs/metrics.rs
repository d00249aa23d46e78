// self
use crate::{grant::GrantType, obs::FlowOutcome};

/// Records a dispatch outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(grant: GrantType, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_confidential_flow_total",
			"flow" => grant.label(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}
