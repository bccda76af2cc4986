//! Business logic services.

#![allow(missing_docs)]

pub mod account_directory;
pub mod gpg_key;
pub mod identity;

pub use account_directory::{AccountDirectory, AccountEmail, DbAccountDirectory};
pub use gpg_key::{GpgKeyEmail, GpgKeyService, GpgKeyView};
pub use identity::bind_identities;
