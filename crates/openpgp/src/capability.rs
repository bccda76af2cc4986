//! Capability derivation for primary keys and subkeys.

use pgp::packet::KeyFlags;
use serde::{Deserialize, Serialize};

/// Position of a key within its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// The primary key of a transferable public key.
    Primary,
    /// A subkey bound to the primary key.
    Subkey,
}

/// Operations the public key algorithm supports at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlgorithmUsage {
    /// The algorithm produces signatures.
    pub sign: bool,
    /// The algorithm encrypts.
    pub encrypt: bool,
}

/// Key flags declared by a self-signature (RFC 9580 §5.2.3.29).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclaredFlags {
    /// May certify other keys.
    pub certify: bool,
    /// May sign data.
    pub sign: bool,
    /// May encrypt communications.
    pub encrypt_comms: bool,
    /// May encrypt storage.
    pub encrypt_storage: bool,
}

impl DeclaredFlags {
    /// Read the usage bits of a key flags subpacket.
    ///
    /// A missing subpacket reads as all-false, so a signature without any
    /// usage bit declares nothing and yields `None`.
    #[must_use]
    pub fn from_key_flags(flags: &KeyFlags) -> Option<Self> {
        let declared = Self {
            certify: flags.certify(),
            sign: flags.sign(),
            encrypt_comms: flags.encrypt_comms(),
            encrypt_storage: flags.encrypt_storage(),
        };
        (declared != Self::default()).then_some(declared)
    }
}

/// What a key may be used for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May sign data.
    pub can_sign: bool,
    /// May encrypt communications.
    pub can_encrypt_comms: bool,
    /// May encrypt storage.
    pub can_encrypt_storage: bool,
    /// May certify other keys.
    pub can_certify: bool,
}

impl Capabilities {
    /// Derive capabilities from the key algorithm and its declared key flags.
    ///
    /// Declared flags can only narrow what the algorithm supports. Without
    /// flags the algorithm decides, and only a primary key certifies.
    #[must_use]
    pub const fn derive(
        algorithm: AlgorithmUsage,
        flags: Option<DeclaredFlags>,
        role: KeyRole,
    ) -> Self {
        let sign = algorithm.sign;
        let encrypt = algorithm.encrypt;

        match flags {
            Some(flags) => Self {
                can_sign: sign && flags.sign,
                can_encrypt_comms: encrypt && flags.encrypt_comms,
                can_encrypt_storage: encrypt && flags.encrypt_storage,
                can_certify: sign && flags.certify,
            },
            None => Self {
                can_sign: sign,
                can_encrypt_comms: encrypt,
                can_encrypt_storage: encrypt,
                can_certify: sign && matches!(role, KeyRole::Primary),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA: AlgorithmUsage = AlgorithmUsage {
        sign: true,
        encrypt: true,
    };
    const ECDH: AlgorithmUsage = AlgorithmUsage {
        sign: false,
        encrypt: true,
    };
    const EDDSA: AlgorithmUsage = AlgorithmUsage {
        sign: true,
        encrypt: false,
    };

    #[test]
    fn test_rsa_without_flags() {
        let primary = Capabilities::derive(RSA, None, KeyRole::Primary);
        assert_eq!(
            primary,
            Capabilities {
                can_sign: true,
                can_encrypt_comms: true,
                can_encrypt_storage: true,
                can_certify: true,
            }
        );

        let subkey = Capabilities::derive(RSA, None, KeyRole::Subkey);
        assert!(subkey.can_sign);
        assert!(!subkey.can_certify);
    }

    #[test]
    fn test_flags_narrow_capabilities() {
        let flags = DeclaredFlags {
            encrypt_comms: true,
            encrypt_storage: true,
            ..DeclaredFlags::default()
        };
        let caps = Capabilities::derive(RSA, Some(flags), KeyRole::Subkey);
        assert!(!caps.can_sign);
        assert!(caps.can_encrypt_comms);
        assert!(caps.can_encrypt_storage);
        assert!(!caps.can_certify);
    }

    #[test]
    fn test_flags_cannot_exceed_algorithm() {
        // An encryption-only algorithm claiming to sign
        let flags = DeclaredFlags {
            certify: true,
            sign: true,
            encrypt_comms: true,
            encrypt_storage: false,
        };
        let caps = Capabilities::derive(ECDH, Some(flags), KeyRole::Primary);
        assert!(!caps.can_sign);
        assert!(!caps.can_certify);
        assert!(caps.can_encrypt_comms);
        assert!(!caps.can_encrypt_storage);
    }

    #[test]
    fn test_signing_only_algorithm() {
        let caps = Capabilities::derive(EDDSA, None, KeyRole::Primary);
        assert!(caps.can_sign);
        assert!(caps.can_certify);
        assert!(!caps.can_encrypt_comms);
        assert!(!caps.can_encrypt_storage);
    }

    #[test]
    fn test_unflagged_encryption_subkey() {
        let caps = Capabilities::derive(ECDH, None, KeyRole::Subkey);
        assert!(caps.can_encrypt_comms && caps.can_encrypt_storage);
        assert!(!caps.can_sign && !caps.can_certify);
    }

    #[test]
    fn test_unusable_algorithm_has_nothing() {
        let all = DeclaredFlags {
            certify: true,
            sign: true,
            encrypt_comms: true,
            encrypt_storage: true,
        };
        for role in [KeyRole::Primary, KeyRole::Subkey] {
            assert_eq!(
                Capabilities::derive(AlgorithmUsage::default(), Some(all), role),
                Capabilities::default()
            );
            assert_eq!(
                Capabilities::derive(AlgorithmUsage::default(), None, role),
                Capabilities::default()
            );
        }
    }

    #[test]
    fn test_declared_flags_from_subpacket() {
        let mut flags = KeyFlags::default();
        assert_eq!(DeclaredFlags::from_key_flags(&flags), None);

        flags.set_sign(true);
        flags.set_certify(true);
        assert_eq!(
            DeclaredFlags::from_key_flags(&flags),
            Some(DeclaredFlags {
                certify: true,
                sign: true,
                ..DeclaredFlags::default()
            })
        );
    }
}
