//! Validated public-key tokens.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of bytes in a public-key token.
pub const TOKEN_LEN: usize = 8;

/// Errors that can occur when parsing a [`PublicKeyToken`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// The hex string does not decode to exactly [`TOKEN_LEN`] bytes.
    #[error("Invalid token length: expected {TOKEN_LEN} bytes, got {0}")]
    InvalidLength(usize),

    /// The string contains non-hex characters.
    #[error("Invalid token hex: {0}")]
    InvalidHex(String),
}

/// An 8-byte public-key fingerprint identifying the signer of an assembly.
///
/// Rendered as 16 lowercase hex characters, two per byte, no separators --
/// the same form the global assembly store embeds in its directory names,
/// which is what makes fingerprint filtering during location possible.
///
/// This newtype ensures every token in the system is validated at
/// construction/deserialization time, so malformed hex never propagates
/// into path matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKeyToken([u8; TOKEN_LEN]);

impl PublicKeyToken {
    /// Create a token from its raw bytes.
    pub fn new(bytes: [u8; TOKEN_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a token from 16 hex characters (any case).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidHex`] if `s` is not valid hex, or
    /// [`TokenError::InvalidLength`] if it decodes to the wrong length.
    pub fn parse(s: &str) -> Result<Self, TokenError> {
        let bytes = hex::decode(s).map_err(|_| TokenError::InvalidHex(s.to_string()))?;
        let arr: [u8; TOKEN_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TokenError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Render as 16 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw token bytes.
    pub fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.0
    }
}

impl std::fmt::Display for PublicKeyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for PublicKeyToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PublicKeyToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKeyToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_hex() {
        let token = PublicKeyToken::parse("b77a5c561934e089").unwrap();
        assert_eq!(token.to_hex(), "b77a5c561934e089");
    }

    #[test]
    fn uppercase_input_renders_lowercase() {
        let token = PublicKeyToken::parse("B77A5C561934E089").unwrap();
        assert_eq!(token.to_hex(), "b77a5c561934e089");
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            PublicKeyToken::parse("b77a5c"),
            Err(TokenError::InvalidLength(3))
        );
    }

    #[test]
    fn rejects_non_hex() {
        assert!(matches!(
            PublicKeyToken::parse("zzzzzzzzzzzzzzzz"),
            Err(TokenError::InvalidHex(_))
        ));
    }
}
