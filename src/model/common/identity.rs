use std::fmt::{Display, Formatter};

use rocket::{
    form::{self, FromFormField, ValueField},
    request::FromParam,
};
use serde::{Deserialize, Serialize};

use crate::model::election::ElectionError;

/// An opaque caller identity, as asserted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Create an identity, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, ElectionError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ElectionError::validation("identity must not be empty"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl TryFrom<String> for Identity {
    type Error = ElectionError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> FromParam<'a> for Identity {
    type Error = ElectionError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Self::new(param)
    }
}

#[rocket::async_trait]
impl<'r> FromFormField<'r> for Identity {
    fn from_value(field: ValueField<'r>) -> form::Result<'r, Self> {
        Self::new(field.value).map_err(|err| form::Error::validation(err.to_string()).into())
    }
}

/// Reference to an external asset (token contract or NFT collection)
/// whose holdings gate eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl Display for AssetRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
