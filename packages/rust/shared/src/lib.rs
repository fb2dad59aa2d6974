//! Shared types, error model, and configuration for pageforge.
//!
//! This crate is the foundation depended on by all other pageforge crates.
//! It provides:
//! - [`PageforgeError`], the unified error type
//! - Domain types ([`Product`], [`Question`], [`ContentSection`], [`PageType`])
//! - Configuration ([`AppConfig`], [`OutputConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OutputConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{PageforgeError, Result};
pub use types::{
    CURRENCY_CODE, CURRENCY_SYMBOL, ContentSection, PageType, Product, ProductDraft, Question,
    QuestionCategory, UNAVAILABLE_MARKER, amount_value, display_amount, format_amount,
};
