//! Validation of the new owner's email address.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+$").expect("Invalid email regex")
});

/// A syntactically valid email address of the user receiving ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerEmail(String);

impl OwnerEmail {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if EMAIL_REGEX.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DriveError::InvalidEmail(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for OwnerEmail {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
