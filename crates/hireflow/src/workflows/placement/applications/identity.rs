use std::fmt;

use serde::{Deserialize, Serialize};

const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

/// Lowercased, trimmed e-mail used as the case-insensitive half of the candidate key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let email = raw.trim().to_lowercase();

        let (local, domain) = email
            .split_once('@')
            .ok_or_else(|| IdentityError::InvalidEmail(raw.to_string()))?;

        let well_formed = !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !email.chars().any(char::is_whitespace);
        if !well_formed {
            return Err(IdentityError::InvalidEmail(raw.to_string()));
        }

        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digits-only phone number with its country code, rendered as `+<digits>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Accepts `+<country><number>` or the `00` international prefix. Separators such as
    /// spaces, dashes, dots and parentheses are stripped.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let trimmed = raw.trim();
        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

        let national = if trimmed.starts_with('+') {
            digits.as_str()
        } else if let Some(rest) = digits.strip_prefix("00").filter(|_| trimmed.starts_with("00"))
        {
            rest
        } else {
            return Err(IdentityError::MissingCountryCode(raw.to_string()));
        };

        if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&national.len())
            || national.starts_with('0')
        {
            return Err(IdentityError::InvalidPhone(raw.to_string()));
        }

        Ok(Self(format!("+{national}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized candidate identity; together with the job it forms the uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateIdentity {
    pub email: NormalizedEmail,
    pub phone: NormalizedPhone,
}

impl CandidateIdentity {
    pub fn parse(email: &str, phone: &str) -> Result<Self, IdentityError> {
        Ok(Self {
            email: NormalizedEmail::parse(email)?,
            phone: NormalizedPhone::parse(phone)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("'{0}' is not a valid e-mail address")]
    InvalidEmail(String),
    #[error("phone '{0}' must start with a country code (+ or 00)")]
    MissingCountryCode(String),
    #[error("phone '{0}' must contain 8 to 15 digits after the country prefix")]
    InvalidPhone(String),
}

impl IdentityError {
    pub fn field(&self) -> &'static str {
        match self {
            IdentityError::InvalidEmail(_) => "email",
            IdentityError::MissingCountryCode(_) | IdentityError::InvalidPhone(_) => "phone",
        }
    }
}
