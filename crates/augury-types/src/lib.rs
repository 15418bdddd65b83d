//! # augury-types
//!
//! Shared domain types used across the Augury workspace: identities, asset
//! identifiers, system parameters and the audit event records emitted by the
//! oracle engine.

pub mod events;
pub mod identity;
pub mod params;
pub mod views;

pub use events::{AuditEvent, AuditRecord};
pub use identity::{AssetId, OracleId};
pub use params::SystemParams;
pub use views::{PendingSubmission, RegistryEntry, VerifiedPrice};

/// Maximum number of submissions buffered per asset per round.
pub const MAX_SUBMISSIONS: usize = 10;

/// Maximum length of an asset identifier in bytes.
pub const MAX_ASSET_ID_LEN: usize = 32;

/// Reputation granted on admission (and on re-admission).
pub const INITIAL_REPUTATION: u64 = 100;

/// Width of the outlier tolerance band, as a percentage of consensus.
pub const OUTLIER_TOLERANCE_PCT: u64 = 20;

/// Error types for domain type construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// Asset identifier is empty, too long or contains non-graphic characters.
    #[error("invalid asset id {0:?}: expected 1..={max} ASCII graphic bytes", max = MAX_ASSET_ID_LEN)]
    InvalidAssetId(String),
}

/// Convenience result type for type construction.
pub type Result<T> = std::result::Result<T, TypesError>;
