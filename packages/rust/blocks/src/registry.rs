//! Process-wide, read-only table of content blocks.

use std::sync::LazyLock;

use pageforge_shared::{ContentSection, Product, Question};

use crate::{compare, faq, product};

/// Identifier of a content block, as named in page strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockId {
    ProductIdentity,
    ProductProfile,
    ExtractBenefits,
    FormatIngredients,
    GenerateUsageInstructions,
    CreateSafetyContent,
    FormatPrice,
    SkinTypeMatcher,
    FaqQuestions,
    CompareIngredients,
    CompareBenefits,
    ComparePrice,
    Recommend,
}

impl BlockId {
    pub const ALL: [BlockId; 13] = [
        Self::ProductIdentity,
        Self::ProductProfile,
        Self::ExtractBenefits,
        Self::FormatIngredients,
        Self::GenerateUsageInstructions,
        Self::CreateSafetyContent,
        Self::FormatPrice,
        Self::SkinTypeMatcher,
        Self::FaqQuestions,
        Self::CompareIngredients,
        Self::CompareBenefits,
        Self::ComparePrice,
        Self::Recommend,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductIdentity => "product_identity",
            Self::ProductProfile => "product_profile",
            Self::ExtractBenefits => "extract_benefits",
            Self::FormatIngredients => "format_ingredients",
            Self::GenerateUsageInstructions => "generate_usage_instructions",
            Self::CreateSafetyContent => "create_safety_content",
            Self::FormatPrice => "format_price",
            Self::SkinTypeMatcher => "skin_type_matcher",
            Self::FaqQuestions => "faq_questions",
            Self::CompareIngredients => "compare_ingredients",
            Self::CompareBenefits => "compare_benefits",
            Self::ComparePrice => "compare_price",
            Self::Recommend => "recommend",
        }
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block function, grouped by the inputs it takes.
#[derive(Debug, Clone, Copy)]
pub enum Block {
    /// One product.
    Single(fn(&Product) -> ContentSection),
    /// Source product and competitor.
    Pair(fn(&Product, &Product) -> ContentSection),
    /// Source product and the generated questions.
    WithQuestions(fn(&Product, &[Question]) -> ContentSection),
    /// Price comparison section and benefit comparison section.
    Verdict(fn(&ContentSection, &ContentSection) -> ContentSection),
}

/// Holds registered blocks keyed by id.
#[derive(Debug)]
pub struct BlockRegistry {
    blocks: Vec<(BlockId, Block)>,
}

impl BlockRegistry {
    /// Registry with every built-in block.
    pub fn builtin() -> Self {
        Self {
            blocks: vec![
                (BlockId::ProductIdentity, Block::Single(product::product_identity)),
                (BlockId::ProductProfile, Block::Single(product::product_profile)),
                (BlockId::ExtractBenefits, Block::Single(product::extract_benefits)),
                (BlockId::FormatIngredients, Block::Single(product::format_ingredients)),
                (
                    BlockId::GenerateUsageInstructions,
                    Block::Single(product::generate_usage_instructions),
                ),
                (
                    BlockId::CreateSafetyContent,
                    Block::Single(product::create_safety_content),
                ),
                (BlockId::FormatPrice, Block::Single(product::format_price)),
                (BlockId::SkinTypeMatcher, Block::Single(product::skin_type_matcher)),
                (BlockId::FaqQuestions, Block::WithQuestions(faq::faq_questions)),
                (BlockId::CompareIngredients, Block::Pair(compare::compare_ingredients)),
                (BlockId::CompareBenefits, Block::Pair(compare::compare_benefits)),
                (BlockId::ComparePrice, Block::Pair(compare::compare_price)),
                (BlockId::Recommend, Block::Verdict(compare::recommend)),
            ],
        }
    }

    /// Look up a block by id.
    pub fn get(&self, id: BlockId) -> Option<Block> {
        self.blocks
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, block)| *block)
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().map(|(id, _)| *id)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The shared built-in registry, created on first use and never mutated.
pub fn registry() -> &'static BlockRegistry {
    static REGISTRY: LazyLock<BlockRegistry> = LazyLock::new(BlockRegistry::builtin);
    &REGISTRY
}
