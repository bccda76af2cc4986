//! OpenPGP public key decoding for keyhold.
//!
//! Armored key blocks are parsed with [`pgp`]; this crate turns the result
//! into what a key registry stores:
//!
//! - **Keys**: key IDs, creation and expiry of the primary key and each subkey
//! - **Identities**: `Name <email>` extraction from User IDs via [`extract_email`]
//! - **Capabilities**: sign/encrypt/certify derivation via [`Capabilities::derive`]
//! - **Content**: the serialized key packet, see [`content_key_id`]
//!
//! No signature is verified here.
//!
//! # Example
//!
//! ```
//! use keyhold_openpgp::decode_armored;
//!
//! let result = decode_armored("not a key");
//! assert!(result.is_err());
//! ```

pub mod capability;
pub mod entity;
pub mod error;
pub mod identity;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use capability::{AlgorithmUsage, Capabilities, DeclaredFlags, KeyRole};
pub use entity::{ParsedKey, PublicEntity, content_key_id, decode_armored, decode_keyring};
pub use error::{DecodeError, DecodeResult};
pub use identity::{Identity, extract_email};
