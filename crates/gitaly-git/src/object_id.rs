//! full object ids as printed by git.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Hex lengths of sha1 and sha256 object ids.
const OBJECT_ID_HEX_LENGTHS: [usize; 2] = [40, 64];

/// A full, lowercase hex object id as printed by git.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parses a full sha1 or sha256 object id.
    pub fn parse(value: impl Into<String>) -> Result<Self, ObjectIdError> {
        let value = value.into();
        if !OBJECT_ID_HEX_LENGTHS.contains(&value.len()) {
            return Err(ObjectIdError::InvalidLength {
                actual: value.len(),
            });
        }

        for (index, character) in value.chars().enumerate() {
            if !matches!(character, '0'..='9' | 'a'..='f') {
                return Err(ObjectIdError::InvalidHexCharacter { index, character });
            }
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    #[error("invalid object id length {actual}: expected 40 (sha1) or 64 (sha256)")]
    InvalidLength { actual: usize },
    #[error("invalid lowercase hex character `{character}` at index {index}")]
    InvalidHexCharacter { index: usize, character: char },
}

#[cfg(test)]
mod tests {
    use super::{ObjectId, ObjectIdError};

    #[test]
    fn parses_sha1_and_sha256_ids() -> Result<(), ObjectIdError> {
        let sha1 = ObjectId::parse("a".repeat(40))?;
        let sha256: ObjectId = "b".repeat(64).parse()?;

        assert_eq!(sha1.to_string(), "a".repeat(40));
        assert_eq!(sha256.as_str(), "b".repeat(64));

        Ok(())
    }

    #[test]
    fn rejects_abbreviated_ids() {
        let err = ObjectId::parse("c7fbe50").expect_err("short ids are not full ids");

        assert_eq!(err, ObjectIdError::InvalidLength { actual: 7 });
    }

    #[test]
    fn rejects_uppercase_and_non_hex() {
        assert!(matches!(
            ObjectId::parse("A".repeat(40)),
            Err(ObjectIdError::InvalidHexCharacter { index: 0, .. })
        ));
        assert!(matches!(
            ObjectId::parse(format!("{}z", "0".repeat(39))),
            Err(ObjectIdError::InvalidHexCharacter { index: 39, .. })
        ));
    }
}
