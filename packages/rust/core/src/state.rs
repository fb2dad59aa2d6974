//! Append-only run state threaded between pipeline steps.

use std::collections::BTreeMap;

use pageforge_shared::{PageType, PageforgeError, Product, Question, Result};

use crate::comparison::ComparisonData;
use crate::renderer::Document;
use crate::strategy::Strategy;

/// Key of one run state entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    Product,
    Questions,
    Comparison,
    Strategy(PageType),
    Document(PageType),
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product => f.write_str("product"),
            Self::Questions => f.write_str("questions"),
            Self::Comparison => f.write_str("comparison"),
            Self::Strategy(page_type) => write!(f, "strategy.{page_type}"),
            Self::Document(page_type) => write!(f, "document.{page_type}"),
        }
    }
}

/// Value a step contributes to the run state.
#[derive(Debug, Clone)]
pub enum StateEntry {
    Product(Product),
    Questions(Vec<Question>),
    Comparison(ComparisonData),
    Strategy(Strategy),
    Document(Document),
}

impl StateEntry {
    /// The key this entry is stored under.
    pub fn key(&self) -> StateKey {
        match self {
            Self::Product(_) => StateKey::Product,
            Self::Questions(_) => StateKey::Questions,
            Self::Comparison(_) => StateKey::Comparison,
            Self::Strategy(strategy) => StateKey::Strategy(strategy.page_type),
            Self::Document(document) => StateKey::Document(document.page_type()),
        }
    }
}

/// Accumulated state of one run. Each key is written at most once.
///
/// Steps only ever see `&RunState`; the pipeline is the single writer.
#[derive(Debug, Default)]
pub struct RunState {
    entries: BTreeMap<StateKey, StateEntry>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, refusing to overwrite one written earlier in the run.
    pub fn insert(&mut self, entry: StateEntry) -> Result<StateKey> {
        let key = entry.key();
        if self.entries.contains_key(&key) {
            return Err(PageforgeError::StateConflict {
                key: key.to_string(),
            });
        }
        self.entries.insert(key, entry);
        Ok(key)
    }

    pub fn contains(&self, key: StateKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Keys written so far.
    pub fn keys(&self) -> impl Iterator<Item = StateKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn product(&self) -> Option<&Product> {
        match self.entries.get(&StateKey::Product) {
            Some(StateEntry::Product(product)) => Some(product),
            _ => None,
        }
    }

    pub fn questions(&self) -> Option<&[Question]> {
        match self.entries.get(&StateKey::Questions) {
            Some(StateEntry::Questions(questions)) => Some(questions),
            _ => None,
        }
    }

    pub fn comparison(&self) -> Option<&ComparisonData> {
        match self.entries.get(&StateKey::Comparison) {
            Some(StateEntry::Comparison(data)) => Some(data),
            _ => None,
        }
    }

    pub fn strategy(&self, page_type: PageType) -> Option<&Strategy> {
        match self.entries.get(&StateKey::Strategy(page_type)) {
            Some(StateEntry::Strategy(strategy)) => Some(strategy),
            _ => None,
        }
    }

    pub fn document(&self, page_type: PageType) -> Option<&Document> {
        match self.entries.get(&StateKey::Document(page_type)) {
            Some(StateEntry::Document(document)) => Some(document),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::strategy_for;
    use serde_json::json;

    fn product() -> Product {
        Product::from_value(&json!({
            "name": "GlowBoost Vitamin C Serum",
            "concentration": "10% Vitamin C",
            "skin_types": ["Oily"],
            "ingredients": ["Vitamin C"],
            "benefits": ["Brightening"],
            "usage": "Apply daily",
            "side_effects": "",
            "price": 699
        }))
        .expect("valid product")
    }

    #[test]
    fn starts_empty() {
        let state = RunState::new();
        assert!(state.is_empty());
        assert!(state.product().is_none());
        assert!(state.comparison().is_none());
    }

    #[test]
    fn insert_is_append_only() {
        let mut state = RunState::new();
        let key = state
            .insert(StateEntry::Product(product()))
            .expect("first write");
        assert_eq!(key, StateKey::Product);

        let err = state
            .insert(StateEntry::Product(product()))
            .expect_err("second write must conflict");
        assert!(matches!(err, PageforgeError::StateConflict { ref key } if key == "product"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn strategies_are_keyed_per_page_type() {
        let mut state = RunState::new();
        for page_type in PageType::ALL {
            let strategy = strategy_for(page_type).expect("strategy");
            state
                .insert(StateEntry::Strategy(strategy))
                .expect("distinct keys");
        }
        assert_eq!(state.len(), 3);
        assert_eq!(
            state.strategy(PageType::Product).map(|s| s.page_type),
            Some(PageType::Product)
        );
        assert!(state.contains(StateKey::Strategy(PageType::Comparison)));
    }

    #[test]
    fn key_display_names() {
        assert_eq!(StateKey::Questions.to_string(), "questions");
        assert_eq!(StateKey::Strategy(PageType::Faq).to_string(), "strategy.faq");
        assert_eq!(
            StateKey::Document(PageType::Comparison).to_string(),
            "document.comparison"
        );
    }
}
