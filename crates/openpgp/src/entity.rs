//! Transferable public keys.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use pgp::composed::{Deserializable, SignedPublicKey};
use pgp::packet::{Packet, PacketParser, Signature};
use pgp::ser::Serialize as PacketBody;
use pgp::types::{KeyDetails, PublicKeyTrait};

use crate::capability::{AlgorithmUsage, Capabilities, DeclaredFlags, KeyRole};
use crate::error::{DecodeError, DecodeResult};
use crate::identity::Identity;

const TAG_PUBLIC_KEY: u8 = 6;
const TAG_PUBLIC_SUBKEY: u8 = 14;

/// A primary key or subkey with the metadata its self-signature declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    key_id: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    key_flags: Option<DeclaredFlags>,
    capabilities: Capabilities,
    content: String,
}

impl ParsedKey {
    fn new<'a, K>(
        key: &K,
        tag: u8,
        signatures: impl Iterator<Item = &'a Signature>,
        role: KeyRole,
    ) -> DecodeResult<Self>
    where
        K: KeyDetails + PublicKeyTrait + PacketBody,
    {
        let created_at = *key.created_at();
        let self_signature = self_signature(signatures);

        let key_flags = self_signature.and_then(|sig| DeclaredFlags::from_key_flags(&sig.key_flags()));
        let expires_at = match self_signature.and_then(Signature::key_expiration_time) {
            Some(lifetime) if lifetime.is_zero() => None,
            Some(lifetime) => Some(
                created_at
                    .checked_add_signed(*lifetime)
                    .ok_or(DecodeError::ExpiryOutOfRange)?,
            ),
            None => None,
        };

        let usage = AlgorithmUsage {
            sign: key.is_signing_key(),
            encrypt: key.is_encryption_key(),
        };

        Ok(Self {
            key_id: key_id_hex(key),
            created_at,
            expires_at,
            key_flags,
            capabilities: Capabilities::derive(usage, key_flags, role),
            content: STANDARD.encode(frame(tag, &key.to_bytes()?)),
        })
    }

    /// Key ID as 16 upper-case hex digits.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Creation time of the key packet.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Expiry declared by the self-signature; `None` never expires.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Key flags of the self-signature, if it declares any.
    #[must_use]
    pub const fn key_flags(&self) -> Option<DeclaredFlags> {
        self.key_flags
    }

    /// Derived capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Base64 of the key packet with a new-format header.
    #[must_use]
    pub fn content(&self) -> String {
        self.content.clone()
    }
}

/// One primary key with its subkeys and identity claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicEntity {
    /// The primary key.
    pub primary: ParsedKey,
    /// Subkeys in packet order.
    pub subkeys: Vec<ParsedKey>,
    /// User IDs in packet order.
    pub identities: Vec<Identity>,
}

impl PublicEntity {
    fn from_signed(key: &SignedPublicKey) -> DecodeResult<Self> {
        let primary_signatures = key
            .details
            .direct_signatures
            .iter()
            .chain(key.details.users.iter().flat_map(|user| user.signatures.iter()));
        let primary = ParsedKey::new(
            &key.primary_key,
            TAG_PUBLIC_KEY,
            primary_signatures,
            KeyRole::Primary,
        )?;

        let subkeys = key
            .public_subkeys
            .iter()
            .map(|sub| {
                ParsedKey::new(
                    &sub.key,
                    TAG_PUBLIC_SUBKEY,
                    sub.signatures.iter(),
                    KeyRole::Subkey,
                )
            })
            .collect::<DecodeResult<Vec<_>>>()?;

        let identities = key
            .details
            .users
            .iter()
            .map(|user| Identity::parse(&String::from_utf8_lossy(user.id.id())))
            .collect();

        Ok(Self {
            primary,
            subkeys,
            identities,
        })
    }
}

/// Decode the first key of an armored public key block.
///
/// Further keys in the same block are ignored.
pub fn decode_armored(text: &str) -> DecodeResult<PublicEntity> {
    let (mut keys, _headers) = SignedPublicKey::from_armor_many(text.as_bytes())?;
    let key = keys.next().ok_or(DecodeError::NoKeys)??;
    PublicEntity::from_signed(&key)
}

/// Decode every key of an armored public key block.
pub fn decode_keyring(text: &str) -> DecodeResult<Vec<PublicEntity>> {
    let (keys, _headers) = SignedPublicKey::from_armor_many(text.as_bytes())?;
    let entities = keys
        .map(|key| PublicEntity::from_signed(&key?))
        .collect::<DecodeResult<Vec<_>>>()?;

    if entities.is_empty() {
        return Err(DecodeError::NoKeys);
    }
    Ok(entities)
}

/// Key ID of a key stored with [`ParsedKey::content`].
pub fn content_key_id(content: &str) -> DecodeResult<String> {
    let data = STANDARD
        .decode(content.trim())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;

    match PacketParser::new(data.as_slice())
        .next()
        .ok_or(DecodeError::NotAKeyPacket)??
    {
        Packet::PublicKey(key) => Ok(key_id_hex(&key)),
        Packet::PublicSubkey(key) => Ok(key_id_hex(&key)),
        _ => Err(DecodeError::NotAKeyPacket),
    }
}

fn key_id_hex(key: &impl KeyDetails) -> String {
    hex::encode_upper(key.key_id())
}

/// The self-signature that carries usage and expiry. Signatures marking a
/// primary user ID win; otherwise the last one in packet order.
fn self_signature<'a>(signatures: impl Iterator<Item = &'a Signature>) -> Option<&'a Signature> {
    signatures
        .filter(|sig| {
            DeclaredFlags::from_key_flags(&sig.key_flags()).is_some()
                || sig.key_expiration_time().is_some()
        })
        .max_by_key(|sig| sig.is_primary())
}

/// Prefix a packet body with a new-format header.
fn frame(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 6);
    out.push(0xC0 | tag);
    match body.len() {
        len @ 0..=191 => out.push(len as u8),
        len @ 192..=8383 => {
            let len = len - 192;
            out.push(((len >> 8) as u8) + 192);
            out.push((len & 0xFF) as u8);
        }
        len => {
            out.push(0xFF);
            out.extend_from_slice(&(len as u32).to_be_bytes());
        }
    }
    out.extend_from_slice(body);
    out
}
