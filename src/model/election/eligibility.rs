use serde::{Deserialize, Serialize};

use crate::model::common::AssetRef;

use super::error::{ElectionError, Result};

/// The policy deciding which identities may register to vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EligibilityPolicy {
    /// Only identities the owner has listed are eligible.
    Whitelist,
    /// Anyone who registers is eligible.
    OpenRegistration,
    /// Registrants must hold at least `threshold` units of `token`.
    TokenBased { token: AssetRef, threshold: u64 },
    /// Registrants must hold at least one item of `collection`.
    NftBased { collection: AssetRef },
}

impl EligibilityPolicy {
    /// Does this policy maintain an owner-curated list?
    pub fn uses_whitelist(&self) -> bool {
        matches!(self, Self::Whitelist)
    }

    /// The asset whose balance must be looked up before a registration can be decided.
    pub fn holdings_asset(&self) -> Option<&AssetRef> {
        match self {
            Self::TokenBased { token, .. } => Some(token),
            Self::NftBased { collection } => Some(collection),
            Self::Whitelist | Self::OpenRegistration => None,
        }
    }

    /// Decide whether a registrant is eligible.
    ///
    /// `listed` says whether the registrant is already on the whitelist, and `holdings`
    /// is the oracle's answer for [`Self::holdings_asset`], if this policy has one.
    pub fn admit(&self, listed: bool, holdings: Option<u64>) -> Result<()> {
        match self {
            Self::Whitelist if listed => Ok(()),
            Self::Whitelist => Err(ElectionError::unauthorized(
                "caller is not on the whitelist",
            )),
            Self::OpenRegistration => Ok(()),
            Self::TokenBased { token, threshold } => match holdings {
                Some(balance) if balance >= *threshold => Ok(()),
                Some(balance) => Err(ElectionError::unauthorized(format!(
                    "balance of {balance} {token} is below the threshold of {threshold}"
                ))),
                None => Err(ElectionError::state(format!(
                    "no balance of {token} was supplied"
                ))),
            },
            Self::NftBased { collection } => match holdings {
                Some(balance) if balance > 0 => Ok(()),
                Some(_) => Err(ElectionError::unauthorized(format!(
                    "caller holds no item of {collection}"
                ))),
                None => Err(ElectionError::state(format!(
                    "no holdings of {collection} were supplied"
                ))),
            },
        }
    }
}

/// Example data for tests.
#[cfg(test)]
pub mod examples {
    use super::*;

    impl EligibilityPolicy {
        pub fn token_example() -> Self {
            Self::TokenBased {
                token: AssetRef("GOV".to_string()),
                threshold: 100,
            }
        }

        pub fn nft_example() -> Self {
            Self::NftBased {
                collection: AssetRef("MEMBER-BADGE".to_string()),
            }
        }
    }
}
