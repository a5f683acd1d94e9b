use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Which login flow an account uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// E-mail based online account.
    Microsoft,
    /// Plain username account.
    Legacy,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Microsoft => "microsoft",
            Self::Legacy => "legacy",
        }
    }

    /// Checks that `identifier` has the shape this flow expects.
    ///
    /// Microsoft identifiers must look like e-mail addresses; legacy
    /// usernames are 3 to 16 characters of `[A-Za-z0-9_]`.
    pub fn validate_identifier(self, identifier: &str) -> Result<(), AuthError> {
        let ok = match self {
            Self::Microsoft => looks_like_email(identifier),
            Self::Legacy => is_valid_username(identifier),
        };
        if ok {
            Ok(())
        } else {
            Err(AuthError::InvalidIdentifier(format!(
                "{identifier:?} is not a valid {self} identifier"
            )))
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "microsoft" => Ok(Self::Microsoft),
            "legacy" => Ok(Self::Legacy),
            _ => Err(AuthError::UnknownAccountType(s.to_owned())),
        }
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

fn is_valid_username(s: &str) -> bool {
    (3..=16).contains(&s.len())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
