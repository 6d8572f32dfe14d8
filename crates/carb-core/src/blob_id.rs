//! `BlobId`: the `(size, sha256)` content identity.

use std::fmt;
use std::str::FromStr;

/// The content identity of a blob: its size and the SHA-256 digest of its
/// bytes. Canonical string form is `"<018-zero-padded-size>_<64-hex-hash>.data"`;
/// the size prefix is both a sort key and a cheap pre-hash collision guard.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobId {
    size: u64,
    hash: [u8; 32],
}

/// Errors parsing a canonical `BlobId` string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseBlobIdError {
    /// The string did not match `<18 digits>_<64 hex chars>.data`.
    #[error("malformed blob id: {0}")]
    Malformed(String),
}

impl BlobId {
    /// Build a `BlobId` from its components.
    #[must_use]
    pub fn new(size: u64, hash: [u8; 32]) -> Self {
        Self { size, hash }
    }

    /// The blob's byte length.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The blob's SHA-256 digest.
    #[must_use]
    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Lowercase hex encoding of the hash alone (used for parity/lock
    /// artifact naming where the size prefix would be redundant).
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// The canonical on-disk file name: `<018-zero-padded-size>_<64-hex-hash>.data`.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        format!("{:018}_{}.data", self.size, self.hash_hex())
    }

    /// The canonical name without the `.data` suffix, used as the shared
    /// prefix for parity set file names (`<BlobId>.par2`, `<BlobId>.volNN+MM.par2`).
    #[must_use]
    pub fn parity_prefix(&self) -> String {
        format!("{:018}_{}", self.size, self.hash_hex())
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", self.canonical_name())
    }
}

impl FromStr for BlobId {
    type Err = ParseBlobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stem = s.strip_suffix(".data").unwrap_or(s);
        let (size_part, hash_part) = stem
            .split_once('_')
            .ok_or_else(|| ParseBlobIdError::Malformed(s.to_string()))?;
        if size_part.len() != 18 || hash_part.len() != 64 {
            return Err(ParseBlobIdError::Malformed(s.to_string()));
        }
        let size: u64 =
            size_part.parse().map_err(|_| ParseBlobIdError::Malformed(s.to_string()))?;
        let hash_vec =
            hex::decode(hash_part).map_err(|_| ParseBlobIdError::Malformed(s.to_string()))?;
        let hash: [u8; 32] = hash_vec
            .try_into()
            .map_err(|_| ParseBlobIdError::Malformed(s.to_string()))?;
        Ok(Self { size, hash })
    }
}
