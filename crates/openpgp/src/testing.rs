//! Keys exported with GnuPG 2.2 for tests.
//!
//! Every key was generated at 2025-03-01 12:00:00 UTC. Files live under
//! `fixtures/` next to this crate's manifest.

/// An exported key and the IDs `gpg --list-keys` reports for it.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    /// `gpg --armor --export` output.
    pub armored: &'static str,
    /// Primary key ID.
    pub key_id: &'static str,
    /// Subkey IDs in packet order.
    pub subkey_ids: &'static [&'static str],
}

/// Creation time of every fixture key.
pub const CREATED: i64 = 1_740_830_400;

/// Expiry of the [`ALICE_LAPTOP`] primary key (2027-03-01).
pub const ALICE_LAPTOP_EXPIRES: i64 = 1_803_902_400;

/// Expiry of the signing and RSA subkeys of [`ALICE_LAPTOP`] (2026-03-01).
pub const SUBKEY_EXPIRES: i64 = 1_772_366_400;

/// `Alice <a@example.com>`: ed25519 sign+certify primary, cv25519
/// encryption subkey.
pub const ALICE: Fixture = Fixture {
    armored: include_str!("../fixtures/alice.asc"),
    key_id: "9505C72EAE4BABCA",
    subkey_ids: &["00BD22A990B3C167"],
};

/// `Alice (laptop) <a@example.com>`: certify-only ed25519 primary; cv25519
/// encrypt subkey, ed25519 sign subkey and RSA-2048 encrypt subkey.
pub const ALICE_LAPTOP: Fixture = Fixture {
    armored: include_str!("../fixtures/alice-laptop.asc"),
    key_id: "64BB0478F573854A",
    subkey_ids: &["706D73ADDB6522DE", "E425B501EA55E2E0", "186C3F669D57A3CF"],
};

/// `Alice (work) <a@example.com>`: RSA-2048 primary, no subkeys.
pub const ALICE_WORK: Fixture = Fixture {
    armored: include_str!("../fixtures/alice-work.asc"),
    key_id: "3DF649CABEC32AD6",
    subkey_ids: &[],
};

/// `Stranger <s@example.com>`: ed25519 primary, no subkeys.
pub const STRANGER: Fixture = Fixture {
    armored: include_str!("../fixtures/stranger.asc"),
    key_id: "4A02697FFA1EA61A",
    subkey_ids: &[],
};

/// User IDs `Alice (pending) <a@example.com>` and `Alice <pending@example.com>`.
pub const PENDING_IDENTITY: Fixture = Fixture {
    armored: include_str!("../fixtures/pending-identity.asc"),
    key_id: "86463BE9148D2F0A",
    subkey_ids: &[],
};

/// User IDs `Alice (nameless) <a@example.com>` and `Alice Only`.
pub const NAMELESS_IDENTITY: Fixture = Fixture {
    armored: include_str!("../fixtures/nameless-identity.asc"),
    key_id: "B093578C25A5C845",
    subkey_ids: &[],
};

/// [`ALICE`] with its subkey and binding signature repeated.
pub const REPEATED_SUBKEY: Fixture = Fixture {
    armored: include_str!("../fixtures/repeated-subkey.asc"),
    key_id: "9505C72EAE4BABCA",
    subkey_ids: &["00BD22A990B3C167", "00BD22A990B3C167"],
};

/// [`ALICE`] followed by [`STRANGER`] in one armored block.
pub const KEYRING: &str = include_str!("../fixtures/keyring.asc");

/// Secret key block of [`STRANGER`], without a passphrase.
pub const STRANGER_SECRET: &str = include_str!("../fixtures/stranger-secret.asc");
