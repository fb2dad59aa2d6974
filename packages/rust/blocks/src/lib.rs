//! Content blocks for pageforge.
//!
//! Each block is a pure function from one or two products (or derived
//! comparison sections) to a tagged [`ContentSection`]. Blocks never read run
//! state and never call each other; pages are composed from them by the
//! renderer in `pageforge-core` through the [`BlockRegistry`].
//!
//! [`ContentSection`]: pageforge_shared::ContentSection

pub mod compare;
pub mod competitor;
pub mod faq;
pub mod product;
pub mod registry;
pub mod text;

pub use compare::{compare_benefits, compare_ingredients, compare_price, recommend};
pub use competitor::generate_fictional_competitor;
pub use faq::faq_questions;
pub use product::{
    create_safety_content, extract_benefits, format_ingredients, format_price,
    generate_usage_instructions, product_identity, product_profile, skin_type_matcher,
};
pub use registry::{Block, BlockId, BlockRegistry, registry};
