//! Artifact Hashing
//!
//! SHA-256 digests used to check that a copied install artifact is
//! byte-identical to its source.

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type ArtifactHash = [u8; 32];

/// Incremental hasher with a domain separator.
pub struct ArtifactHasher {
    hasher: Sha256,
}

impl ArtifactHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for accessory install bundles.
    pub fn for_bundle() -> Self {
        Self::new(b"RPS_COMPANION_BUNDLE_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> ArtifactHash {
        self.hasher.finalize().into()
    }
}

/// Digest of a complete bundle.
pub fn hash_bundle(data: &[u8]) -> ArtifactHash {
    let mut hasher = ArtifactHasher::for_bundle();
    hasher.update_bytes(data);
    hasher.finalize()
}

/// Short hex prefix for log lines.
pub fn short_hex(hash: &ArtifactHash) -> String {
    hex::encode(&hash[..8])
}
