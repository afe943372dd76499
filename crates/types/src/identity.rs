use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur when parsing an identity string.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity must start with '0x'")]
    InvalidPrefix,
    #[error("identity must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("identity payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("identity payload must be exactly 20 bytes")]
    InvalidPayloadLength,
}

/// Number of raw bytes contained in an identity.
pub const IDENTITY_BYTES: usize = 20;
/// Expected string length of an encoded identity (`0x` + 40 hex chars).
pub const IDENTITY_STRING_LENGTH: usize = 2 + IDENTITY_BYTES * 2;

/// Encode a 20-byte principal identifier into its human readable form.
///
/// The encoded identity always begins with `0x` followed by the lowercase
/// hexadecimal representation of the raw bytes.
pub fn encode_identity(bytes: &[u8; IDENTITY_BYTES]) -> String {
    let mut encoded = String::with_capacity(IDENTITY_STRING_LENGTH);
    encoded.push_str("0x");
    encoded.push_str(&hex::encode(bytes));
    encoded
}

/// Attempt to decode an identity string into the raw bytes.
///
/// Hex digits are accepted in either case; the canonical rendering is
/// lowercase.
pub fn decode_identity(identity: &str) -> Result<[u8; IDENTITY_BYTES], IdentityError> {
    if !identity.starts_with("0x") {
        return Err(IdentityError::InvalidPrefix);
    }

    if identity.len() != IDENTITY_STRING_LENGTH {
        return Err(IdentityError::InvalidLength {
            expected: IDENTITY_STRING_LENGTH,
            actual: identity.len(),
        });
    }

    let payload = &identity[2..];
    let decoded = hex::decode(payload)?;

    let bytes: [u8; IDENTITY_BYTES] = decoded
        .try_into()
        .map_err(|_| IdentityError::InvalidPayloadLength)?;

    Ok(bytes)
}

/// Check whether the provided string is a valid identity.
pub fn is_valid_identity(identity: &str) -> bool {
    decode_identity(identity).is_ok()
}

/// Opaque principal identifier, authenticated upstream of the engine.
///
/// The engine compares identities for equality and nothing else; the
/// internal structure is only interpreted at the encoding boundary.
/// Serialises as its string form in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(pub [u8; IDENTITY_BYTES]);

impl Identity {
    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_BYTES] {
        &self.0
    }

    /// Render the canonical string form.
    pub fn encode(&self) -> String {
        encode_identity(&self.0)
    }

    /// Parse from the string form.
    pub fn decode(identity: &str) -> Result<Self, IdentityError> {
        decode_identity(identity).map(Identity)
    }
}

impl From<[u8; IDENTITY_BYTES]> for Identity {
    fn from(value: [u8; IDENTITY_BYTES]) -> Self {
        Identity(value)
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.encode()
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identity::decode(&value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
