//! Database entities.

#![allow(missing_docs)]

pub mod email_address;
pub mod gpg_key;
pub mod user;

pub use email_address::Entity as EmailAddress;
pub use gpg_key::Entity as GpgKey;
pub use user::Entity as User;
