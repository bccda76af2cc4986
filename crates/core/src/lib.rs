//! Core business logic for keyhold.

pub mod services;

pub use services::*;
