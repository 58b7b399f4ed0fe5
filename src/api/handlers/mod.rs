//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod mappings;
pub mod redirect;
pub mod stats;

pub use mappings::{
    create_mappings_handler, delete_all_mappings_handler, delete_mapping_handler,
    get_mapping_handler, list_mappings_handler,
};
pub use redirect::redirect_handler;
pub use stats::{config_handler, stats_handler};
