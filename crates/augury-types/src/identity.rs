//! Oracle identities and asset identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, TypesError, MAX_ASSET_ID_LEN};

/// Opaque principal identifier. Authentication happens upstream; the engine
/// only ever sees an already-verified identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS)]
#[serde(transparent)]
#[ts(export)]
pub struct OracleId(String);

impl OracleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OracleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OracleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Short bounded asset symbol, e.g. `"BTC-USD"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export)]
pub struct AssetId(String);

impl AssetId {
    /// Validate and wrap an asset symbol.
    ///
    /// # Errors
    ///
    /// - [`TypesError::InvalidAssetId`] if the symbol is empty, longer than
    ///   [`MAX_ASSET_ID_LEN`] bytes, or contains anything but ASCII graphic
    ///   characters
    pub fn new(symbol: impl Into<String>) -> Result<Self> {
        let symbol = symbol.into();
        let valid = !symbol.is_empty()
            && symbol.len() <= MAX_ASSET_ID_LEN
            && symbol.bytes().all(|b| b.is_ascii_graphic());
        if !valid {
            return Err(TypesError::InvalidAssetId(symbol));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AssetId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<AssetId> for String {
    fn from(asset: AssetId) -> Self {
        asset.0
    }
}
