//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - redb and Redis mapping stores
//! - [`management_client`] - HTTP client for the management API

pub mod management_client;
pub mod persistence;
