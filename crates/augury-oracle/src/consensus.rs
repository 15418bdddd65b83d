//! Consensus aggregation.
//!
//! The consensus value of a round is the integer mean of its buffered
//! prices:
//!
//! ```text
//! consensus = floor(sum(price_i) / count)
//! ```
//!
//! [`Aggregation::ReputationWeighted`] weights each price by the reporter's
//! reputation instead:
//!
//! ```text
//! consensus = floor(sum(price_i * rep_i) / sum(rep_i))
//! ```
//!
//! falling back to the plain mean when every weight is zero. Sums are
//! accumulated in `u128` so ten `u64` prices can never overflow.

use serde::{Deserialize, Serialize};

use crate::{OracleError, Result};

/// How buffered prices are combined into a consensus value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Unweighted integer mean.
    #[default]
    Mean,
    /// Mean weighted by reporter reputation.
    ReputationWeighted,
}

/// A buffered price together with its reporter's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub price: u64,
    pub weight: u64,
}

impl Aggregation {
    /// Aggregate `samples` according to this strategy.
    ///
    /// Returns `Ok(None)` for an empty round.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Overflow`] if the weighted sum overflows
    pub fn aggregate(self, samples: &[Sample]) -> Result<Option<u64>> {
        match self {
            Self::Mean => Ok(mean(samples.iter().map(|s| s.price))),
            Self::ReputationWeighted => weighted_mean(samples),
        }
    }
}

/// Integer mean of `prices`, truncating toward zero. `None` if empty.
///
/// # Examples
///
/// ```
/// use augury_oracle::consensus::mean;
///
/// assert_eq!(mean([100u64, 110, 90]), Some(100));
/// assert_eq!(mean([1u64, 2]), Some(1));
/// assert_eq!(mean(Vec::<u64>::new()), None);
/// ```
pub fn mean(prices: impl IntoIterator<Item = u64>) -> Option<u64> {
    let mut sum: u128 = 0;
    let mut count: u128 = 0;
    for price in prices {
        sum += u128::from(price);
        count += 1;
    }
    // The mean of u64 values always fits in u64.
    sum.checked_div(count).and_then(|avg| u64::try_from(avg).ok())
}

/// Reputation-weighted integer mean of `samples`. `None` if empty.
///
/// # Errors
///
/// - [`OracleError::Overflow`] if the weighted sum overflows `u128`
pub fn weighted_mean(samples: &[Sample]) -> Result<Option<u64>> {
    let total_weight: u128 = samples.iter().map(|s| u128::from(s.weight)).sum();
    if total_weight == 0 {
        return Ok(mean(samples.iter().map(|s| s.price)));
    }
    let mut weighted_sum: u128 = 0;
    for sample in samples {
        let term = u128::from(sample.price)
            .checked_mul(u128::from(sample.weight))
            .ok_or(OracleError::Overflow("weighted price"))?;
        weighted_sum = weighted_sum
            .checked_add(term)
            .ok_or(OracleError::Overflow("weighted sum"))?;
    }
    u64::try_from(weighted_sum / total_weight)
        .map(Some)
        .map_err(|_| OracleError::Overflow("weighted mean"))
}
