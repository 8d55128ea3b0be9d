//! # TechTree Tools
//!
//! Command-line tooling around the registration core:
//! - Mod data loader
//! - Data validators
//! - Catalogue summaries

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod loader;
pub mod summary;
pub mod validate;

pub use loader::{
    load_data_directory, load_items, load_mod_file, LoadError, LoadFailure, LoadReport,
    LoaderConfig, ModLoader,
};
pub use summary::CatalogSummary;
