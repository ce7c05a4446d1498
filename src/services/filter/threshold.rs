//! Threshold evaluation of per-block match records.

use crate::models::{MatchRecord, ThresholdPolicy};

/// Whether `record` meets both the activity and the volume bound of `policy`
///
/// Both bounds are inclusive.
pub fn evaluate(record: &MatchRecord, policy: &ThresholdPolicy) -> bool {
	record.match_count >= policy.min_match_count
		&& record.total_reference_volume >= policy.min_volume
}
