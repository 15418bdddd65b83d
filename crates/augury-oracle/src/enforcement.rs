//! Economic enforcement arithmetic.
//!
//! Outlier accusations are judged against the published consensus with a
//! fixed band:
//!
//! ```text
//! tolerance = floor(consensus * 20 / 100)
//! deviation = |reported - consensus|
//! ```
//!
//! An accusation succeeds (and slashes the accused) only when
//! `deviation > tolerance`. The reported price is taken on the caller's word;
//! it is not matched against anything the accused actually submitted.

use augury_types::OUTLIER_TOLERANCE_PCT;

use crate::{OracleError, Result};

/// `floor(reference * pct / 100)`.
pub fn band(reference: u64, pct: u64) -> u64 {
    let width = u128::from(reference) * u128::from(pct) / 100;
    u64::try_from(width).unwrap_or(u64::MAX)
}

/// Outlier tolerance for a consensus price.
pub fn outlier_tolerance(consensus: u64) -> u64 {
    band(consensus, OUTLIER_TOLERANCE_PCT)
}

/// Judge an outlier accusation, returning the deviation if it stands.
///
/// # Errors
///
/// - [`OracleError::WithinTolerance`] if `reported` lies inside the band
pub fn judge_outlier(consensus: u64, reported: u64) -> Result<u64> {
    let tolerance = outlier_tolerance(consensus);
    let deviation = reported.abs_diff(consensus);
    if deviation <= tolerance {
        return Err(OracleError::WithinTolerance {
            deviation,
            tolerance,
        });
    }
    Ok(deviation)
}

/// Whether `candidate` lies within `tolerance_pct` percent of `reference`.
pub fn within_band(reference: u64, candidate: u64, tolerance_pct: u64) -> bool {
    candidate.abs_diff(reference) <= band(reference, tolerance_pct)
}

/// Per-participant share of the round reward pool; zero for no participants.
pub fn estimate_payout(reward_amount: u64, participants: u64) -> u64 {
    reward_amount.checked_div(participants).unwrap_or(0)
}
