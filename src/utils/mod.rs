//! Request handling helpers.
//!
//! - [`key_builder`] - Lookup key derivation from requests

pub mod key_builder;
