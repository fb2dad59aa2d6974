//! Page strategies: which blocks a page needs and where their output goes.
//!
//! Strategies are a closed, static table keyed by page type. Each [`Slot`]
//! names a document key (dotted for nested objects), the block that fills it,
//! which product the block runs against, and how much of the block's section is
//! placed there. Adding a page type means adding a table row; [`resolve`] does
//! not change.

use tracing::debug;

use pageforge_blocks::BlockId;
use pageforge_shared::{PageType, PageforgeError, Result};

/// Which product a block is invoked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    /// The parsed input product.
    Source,
    /// The competitor from the comparison data.
    Competitor,
}

/// How much of a block's [`ContentSection`] lands in the document.
///
/// [`ContentSection`]: pageforge_shared::ContentSection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The whole tagged section (`section_type` + `data`).
    Section,
    /// Only the data payload.
    Data,
    /// A single top-level field of the data payload.
    Field(&'static str),
}

/// One output key and the block that fills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub key: &'static str,
    pub block: BlockId,
    pub subject: Subject,
    pub placement: Placement,
}

impl Slot {
    const fn new(key: &'static str, block: BlockId, placement: Placement) -> Self {
        Self {
            key,
            block,
            subject: Subject::Source,
            placement,
        }
    }

    const fn section(key: &'static str, block: BlockId) -> Self {
        Self::new(key, block, Placement::Section)
    }

    const fn data(key: &'static str, block: BlockId) -> Self {
        Self::new(key, block, Placement::Data)
    }

    const fn field(key: &'static str, block: BlockId, field: &'static str) -> Self {
        Self::new(key, block, Placement::Field(field))
    }

    const fn of(self, subject: Subject) -> Self {
        Self { subject, ..self }
    }
}

/// Lower bound on the number of items under a document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinItems {
    pub key: &'static str,
    pub min: usize,
}

/// Composition plan for one page type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub page_type: PageType,
    pub slots: &'static [Slot],
    pub min_items: Option<MinItems>,
}

impl Strategy {
    /// Distinct block ids in first-use order.
    pub fn required_blocks(&self) -> Vec<BlockId> {
        let mut blocks = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            if !blocks.contains(&slot.block) {
                blocks.push(slot.block);
            }
        }
        blocks
    }

    /// Output keys in the order they are composed.
    pub fn composition_order(&self) -> Vec<&'static str> {
        self.slots.iter().map(|slot| slot.key).collect()
    }

    /// Whether any slot needs the competitor record.
    pub fn needs_competitor(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.subject == Subject::Competitor)
    }
}

/// Minimum number of questions surfaced on the FAQ page.
pub const MIN_FAQ_QUESTIONS: usize = 5;

// ---------------------------------------------------------------------------
// Strategy table
// ---------------------------------------------------------------------------

const FAQ_SLOTS: &[Slot] = &[
    Slot::field("product_name", BlockId::ProductIdentity, "product_name"),
    Slot::field("total_questions", BlockId::FaqQuestions, "total_questions"),
    Slot::field("questions", BlockId::FaqQuestions, "questions"),
];

const PRODUCT_SLOTS: &[Slot] = &[
    Slot::data("hero", BlockId::ProductIdentity),
    Slot::section("details.benefits", BlockId::ExtractBenefits),
    Slot::section("details.ingredients", BlockId::FormatIngredients),
    Slot::section("details.usage", BlockId::GenerateUsageInstructions),
    Slot::section("details.skin_types", BlockId::SkinTypeMatcher),
    Slot::section("details.price", BlockId::FormatPrice),
    Slot::section("details.safety", BlockId::CreateSafetyContent),
];

const COMPARISON_SLOTS: &[Slot] = &[
    Slot::data("products.product_a", BlockId::ProductProfile),
    Slot::data("products.product_b", BlockId::ProductProfile).of(Subject::Competitor),
    Slot::section("comparison_matrix.ingredients", BlockId::CompareIngredients),
    Slot::section("comparison_matrix.benefits", BlockId::CompareBenefits),
    Slot::section("comparison_matrix.price", BlockId::ComparePrice),
    Slot::data("recommendation", BlockId::Recommend),
];

const STRATEGIES: [Strategy; 3] = [
    Strategy {
        page_type: PageType::Faq,
        slots: FAQ_SLOTS,
        min_items: Some(MinItems {
            key: "questions",
            min: MIN_FAQ_QUESTIONS,
        }),
    },
    Strategy {
        page_type: PageType::Product,
        slots: PRODUCT_SLOTS,
        min_items: None,
    },
    Strategy {
        page_type: PageType::Comparison,
        slots: COMPARISON_SLOTS,
        min_items: None,
    },
];

/// Look up the strategy for a page type identifier (`faq`, `product`,
/// `comparison`, case-insensitive).
pub fn resolve(page_type: &str) -> Result<Strategy> {
    let page_type: PageType = page_type.parse()?;
    let strategy = strategy_for(page_type)?;
    debug!(
        page_type = %page_type,
        blocks = strategy.required_blocks().len(),
        "resolved strategy"
    );
    Ok(strategy)
}

/// The strategy for an already-parsed page type.
pub fn strategy_for(page_type: PageType) -> Result<Strategy> {
    STRATEGIES
        .iter()
        .find(|s| s.page_type == page_type)
        .copied()
        .ok_or_else(|| PageforgeError::UnsupportedPageType {
            page_type: page_type.to_string(),
        })
}
