//! Block reference types for RPC queries.

use serde::{Deserialize, Serialize};

use super::CryptoHash;

/// Reference to a specific block for RPC queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockReference {
    /// Latest block with the given finality.
    Finality(Finality),
    Height(u64),
    Hash(CryptoHash),
}

impl Default for BlockReference {
    fn default() -> Self {
        Self::Finality(Finality::Final)
    }
}

impl BlockReference {
    pub fn final_() -> Self {
        Self::Finality(Finality::Final)
    }

    pub fn optimistic() -> Self {
        Self::Finality(Finality::Optimistic)
    }

    pub fn at_height(height: u64) -> Self {
        Self::Height(height)
    }

    pub fn at_hash(hash: CryptoHash) -> Self {
        Self::Hash(hash)
    }

    /// Convert to JSON for RPC requests.
    pub fn to_rpc_params(&self) -> serde_json::Value {
        match self {
            BlockReference::Finality(f) => serde_json::json!({ "finality": f.as_str() }),
            BlockReference::Height(h) => serde_json::json!({ "block_id": *h }),
            BlockReference::Hash(h) => serde_json::json!({ "block_id": h.to_string() }),
        }
    }
}

impl From<Finality> for BlockReference {
    fn from(f: Finality) -> Self {
        Self::Finality(f)
    }
}

impl From<u64> for BlockReference {
    fn from(height: u64) -> Self {
        Self::Height(height)
    }
}

impl From<CryptoHash> for BlockReference {
    fn from(hash: CryptoHash) -> Self {
        Self::Hash(hash)
    }
}

/// Finality level for queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    /// Latest optimistic block. Fastest, but may be reorged.
    Optimistic,
    /// Doomslug finality.
    #[serde(rename = "near-final")]
    NearFinal,
    #[default]
    Final,
}

impl Finality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Finality::Optimistic => "optimistic",
            Finality::NearFinal => "near-final",
            Finality::Final => "final",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_reference_rpc_params() {
        let params = BlockReference::final_().to_rpc_params();
        assert_eq!(params["finality"], "final");

        let params = BlockReference::Height(12345).to_rpc_params();
        assert_eq!(params["block_id"], 12345);

        let hash = CryptoHash::hash(b"b");
        let params = BlockReference::at_hash(hash).to_rpc_params();
        assert_eq!(params["block_id"], hash.to_string());
    }

    #[test]
    fn test_finality_as_str() {
        assert_eq!(Finality::Final.as_str(), "final");
        assert_eq!(Finality::Optimistic.as_str(), "optimistic");
        assert_eq!(Finality::NearFinal.as_str(), "near-final");
        assert_eq!(
            serde_json::to_string(&Finality::NearFinal).unwrap(),
            "\"near-final\""
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(BlockReference::from(5u64), BlockReference::at_height(5));
        assert_eq!(
            BlockReference::from(Finality::Optimistic),
            BlockReference::optimistic()
        );
        assert_eq!(BlockReference::default(), BlockReference::final_());
    }
}
