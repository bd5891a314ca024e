use std::fmt;
use std::hash::Hash;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Material used to derive an [`Address`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentitySource {
    /// An ed25519-style public key (32 bytes) verified by the environment.
    PublicKey([u8; 32]),
    /// A human-readable account label, for demos and local harnesses.
    Label(String),
}

/// Opaque, comparable account identity for the escrow ledger.
///
/// An `Address` is derived deterministically from [`IdentitySource`]
/// material using BLAKE3; the same material always produces the same
/// address. The ledger never inspects the material itself — caller
/// identity is authenticated by the execution environment before an
/// address ever reaches an operation.
///
/// Serializes as its full hex string, so addresses can key JSON maps.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    hash: [u8; 32],
}

impl Address {
    /// Derive an `Address` from identity material.
    pub fn derive(source: &IdentitySource) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"mel-address-v1:");
        match source {
            IdentitySource::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
            IdentitySource::Label(label) => {
                hasher.update(b"label:");
                hasher.update(label.as_bytes());
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Create an ephemeral (random) address for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::derive(&IdentitySource::PublicKey(bytes))
    }

    /// The raw 32-byte value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("esc:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `esc:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("esc:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { hash: arr })
    }

    /// Create from a raw 32-byte value. Use `derive()` for production code.
    pub fn from_raw(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short_id())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let source = IdentitySource::PublicKey([42u8; 32]);
        let addr1 = Address::derive(&source);
        let addr2 = Address::derive(&source);
        assert_eq!(addr1, addr2);
    }

    #[test]
    fn different_material_produces_different_addresses() {
        let a = Address::derive(&IdentitySource::PublicKey([1; 32]));
        let b = Address::derive(&IdentitySource::PublicKey([2; 32]));
        assert_ne!(a, b);
    }

    #[test]
    fn label_and_pubkey_domains_are_separated() {
        let label = Address::derive(&IdentitySource::Label("owner".into()));
        let pubkey = Address::derive(&IdentitySource::PublicKey([0; 32]));
        assert_ne!(label, pubkey);
    }

    #[test]
    fn ephemeral_addresses_are_unique() {
        let a = Address::ephemeral();
        let b = Address::ephemeral();
        assert_ne!(a, b);
    }

    #[test]
    fn short_id_format() {
        let addr = Address::derive(&IdentitySource::Label("alice".into()));
        let short = addr.short_id();
        assert!(short.starts_with("esc:"));
        assert_eq!(short.len(), 12); // "esc:" + 8 hex chars
    }

    #[test]
    fn hex_roundtrip() {
        let addr = Address::derive(&IdentitySource::Label("bob".into()));
        let parsed = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let addr = Address::derive(&IdentitySource::Label("carol".into()));
        let prefixed = format!("esc:{}", addr.to_hex());
        let parsed = Address::from_hex(&prefixed).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            Address::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
        assert!(matches!(
            Address::from_hex("abcd"),
            Err(TypeError::InvalidLength {
                expected: 32,
                actual: 2
            })
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let addr = Address::derive(&IdentitySource::Label("dave".into()));
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn serde_map_keys_are_hex_strings() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Address::from_raw([3; 32]), 42u64);
        let json = serde_json::to_string(&map).unwrap();
        let parsed: std::collections::BTreeMap<Address, u64> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(map, parsed);
    }

    #[test]
    fn ordering_is_consistent() {
        let a = Address::from_raw([0; 32]);
        let b = Address::from_raw([1; 32]);
        assert!(a < b);
    }

    proptest::proptest! {
        #[test]
        fn hex_roundtrip_holds_for_any_address(raw in proptest::array::uniform32(0u8..)) {
            let addr = Address::from_raw(raw);
            let parsed = Address::from_hex(&addr.to_hex()).unwrap();
            proptest::prop_assert_eq!(addr, parsed);
        }
    }
}
