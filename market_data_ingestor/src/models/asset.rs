use serde::{Deserialize, Serialize};

/// Broad class of the requested symbols. Providers may use it to route the
/// request to the right endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    #[default]
    UsEquity,
    /// Market index such as `^GSPC`. Not every vendor serves these.
    Index,
}
