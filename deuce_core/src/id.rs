//! Identifier types used by the Deuce client (block digest plus the
//! validated string newtypes for projects, vaults, files and storage
//! locations).
//!
//! Every identifier is checked at construction, so a value of one of these
//! types is always well-formed and no further validation happens at call
//! sites or before network requests.

use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sha1::{Digest, Sha1};

use crate::error::ValidationError;

/// Content identifier of a block (SHA-1, 20 bytes).
///
/// The digest of a block's bytes is its identity: two blocks with the same
/// data always carry the same `BlockId`, which is what the server's
/// deduplication keys on. Rendered as 40 lowercase hex characters.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct BlockId([u8; 20]);

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlockId").field(&self.to_hex()).finish()
    }
}

impl BlockId {
    /// The id of the empty byte range (`b""`).
    pub const EMPTY: BlockId = BlockId::from_bytes([
        218, 57, 163, 238, 94, 107, 75, 13, 50, 85, 191, 239, 149, 96, 24, 144, 175, 216, 7, 9,
    ]);

    /// The size of the digest in bytes.
    pub const SIZE: usize = 20;

    /// Calculate the id of the provided bytes.
    ///
    /// This is the sole mechanism for deriving a block id from data; total
    /// and deterministic, including for empty input.
    pub fn of(buf: impl AsRef<[u8]>) -> Self {
        BlockId(Sha1::digest(buf.as_ref()).into())
    }

    /// Bytes of the digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Create a `BlockId` from its raw bytes representation.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Convert the id to its 40-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for BlockId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for BlockId {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for BlockId {
    fn from(value: [u8; 20]) -> Self {
        Self(value)
    }
}

impl From<BlockId> for [u8; 20] {
    fn from(value: BlockId) -> Self {
        value.0
    }
}

impl PartialOrd for BlockId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for BlockId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40
            || !s
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Err(ValidationError::BlockIdFormat(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| ValidationError::BlockIdFormat(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Tenant scope identifier, as carried in the `X-Project-ID` header.
///
/// Non-empty, at most 128 bytes, graphic ASCII only.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.is_empty() || s.len() > 128 || !s.bytes().all(|b| (0x21..=0x7e).contains(&b)) {
            return Err(ValidationError::ProjectIdFormat(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProjectId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectId> for String {
    fn from(value: ProjectId) -> Self {
        value.0
    }
}

/// Name of a vault on the remote service.
///
/// 1 to 128 characters from `[a-zA-Z0-9_-]`, so it is always safe to splice
/// into a URL path without escaping.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VaultId(String);

impl VaultId {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.is_empty()
            || s.len() > 128
            || !s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(ValidationError::VaultIdFormat(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VaultId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VaultId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VaultId> for String {
    fn from(value: VaultId) -> Self {
        value.0
    }
}

/// Server-assigned file identifier, returned in the `x-file-id` header of a
/// create-file response. A hyphenated UUID string.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileId(uuid::Uuid);

impl FileId {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ValidationError::FileIdFormat(s.to_string()))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for FileId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Server-assigned storage location token for a block.
///
/// Lives in a separate namespace from [`BlockId`]: the block id addresses
/// content, the storage id addresses where the server put it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StorageId(uuid::Uuid);

impl StorageId {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ValidationError::StorageIdFormat(s.to_string()))
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for StorageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_empty() {
        let id = BlockId::of(b"");
        assert_eq!(id, BlockId::EMPTY);
        assert_eq!(id.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_block_id_known_value() {
        // SHA-1 of "hello" is well-known
        let id = BlockId::of(b"hello");
        assert_eq!(id.to_hex(), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn test_block_id_deterministic() {
        assert_eq!(BlockId::of(b"same bytes"), BlockId::of(b"same bytes"));
        assert_ne!(BlockId::of(b"one"), BlockId::of(b"two"));
    }

    #[test]
    fn test_block_id_hex_roundtrip() {
        let id = BlockId::of(b"roundtrip");
        let hex = id.to_hex();
        assert_eq!(hex.len(), 40);
        assert_eq!(hex, hex.to_lowercase());
        let parsed: BlockId = hex.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_block_id_parse_rejects_malformed() {
        assert!("".parse::<BlockId>().is_err());
        assert!("abc".parse::<BlockId>().is_err());
        // uppercase is not a canonical id
        assert!(
            "AAF4C61DDCC5E8A2DABEDE0F3B482CD9AEA9434D"
                .parse::<BlockId>()
                .is_err()
        );
        // right length, non-hex characters
        assert!(
            "zzf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
                .parse::<BlockId>()
                .is_err()
        );
    }

    #[test]
    fn test_block_id_ordering() {
        let a = BlockId::from_bytes([0u8; 20]);
        let b = BlockId::from_bytes([1u8; 20]);
        let c = BlockId::from_bytes([0xff; 20]);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_block_id_serde() {
        let id = BlockId::of(b"wire");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: BlockId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_project_id_rules() {
        assert!(ProjectId::new("project-1").is_ok());
        assert!(ProjectId::new("").is_err());
        assert!(ProjectId::new("has space").is_err());
        assert!(ProjectId::new("x".repeat(128)).is_ok());
        assert!(ProjectId::new("x".repeat(129)).is_err());
    }

    #[test]
    fn test_vault_id_rules() {
        assert!(VaultId::new("backup_vault-01").is_ok());
        assert!(VaultId::new("").is_err());
        assert!(VaultId::new("no/slashes").is_err());
        assert!(VaultId::new("no.dots").is_err());
        assert!(VaultId::new("v".repeat(129)).is_err());
    }

    #[test]
    fn test_file_id_is_uuid() {
        let id = FileId::parse("76598632-0b26-42ae-9f61-f5e7e9e1ca69").unwrap();
        assert_eq!(id.to_string(), "76598632-0b26-42ae-9f61-f5e7e9e1ca69");
        assert!(FileId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_storage_id_is_uuid() {
        assert!(StorageId::parse("00000000-0000-0000-0000-000000000000").is_ok());
        assert!(StorageId::parse("nope").is_err());
    }
}
