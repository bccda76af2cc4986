//! Repository layer for database operations.

mod email_address;
mod gpg_key;
mod user;

pub use email_address::EmailAddressRepository;
pub use gpg_key::GpgKeyRepository;
pub use user::UserRepository;
