//! Page rendering: run a strategy's blocks and compose their sections.

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use pageforge_blocks::{Block, BlockId, registry};
use pageforge_shared::{ContentSection, PageType, PageforgeError, Product, Question, Result};

use crate::comparison::{ComparisonData, Dimension};
use crate::state::{RunState, StateKey};
use crate::strategy::{Placement, Slot, Strategy, Subject};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A rendered page: `page_type` followed by the composed sections.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    page_type: PageType,
    body: Map<String, Value>,
}

impl Document {
    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    /// Composed sections, in composition order.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Look up a value by dotted path, e.g. `details.ingredients.data`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = self.body.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| value.get(segment))
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.body.len() + 1);
        map.insert("page_type".into(), Value::from(self.page_type.as_str()));
        map.extend(self.body.iter().map(|(k, v)| (k.clone(), v.clone())));
        Value::Object(map)
    }
}

impl Serialize for Document {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.body.len() + 1))?;
        map.serialize_entry("page_type", self.page_type.as_str())?;
        for (key, value) in &self.body {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render `strategy` against the current run state.
///
/// Each distinct (block, subject) pair is invoked once. Fails with
/// `MissingDependency` when the state lacks something a block needs and with
/// `InsufficientContent` when the strategy's minimum is unmet.
#[instrument(skip_all, fields(page_type = %strategy.page_type))]
pub fn render(strategy: &Strategy, state: &RunState) -> Result<Document> {
    let inputs = Inputs {
        page_type: strategy.page_type,
        state,
    };
    let mut sections: Vec<((BlockId, Subject), ContentSection)> = Vec::new();
    let mut body = Map::new();

    for slot in strategy.slots {
        let cache_key = (slot.block, slot.subject);
        let index = match sections.iter().position(|(k, _)| *k == cache_key) {
            Some(index) => index,
            None => {
                let section = inputs.invoke(slot)?;
                debug!(
                    block = %slot.block,
                    section_type = %section.section_type,
                    "invoked block"
                );
                sections.push((cache_key, section));
                sections.len() - 1
            }
        };
        let value = place(&sections[index].1, slot.placement)?;
        insert_path(&mut body, slot.key, value);
    }

    let document = Document {
        page_type: strategy.page_type,
        body,
    };

    if let Some(min) = strategy.min_items {
        let actual = document
            .get(min.key)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        if actual < min.min {
            return Err(PageforgeError::InsufficientContent {
                page_type: strategy.page_type.to_string(),
                key: min.key.to_string(),
                required: min.min,
                actual,
            });
        }
    }

    debug!(sections = sections.len(), "page rendered");
    Ok(document)
}

/// Read-only access to what blocks need, reporting absences as missing
/// dependencies of the page being rendered.
struct Inputs<'a> {
    page_type: PageType,
    state: &'a RunState,
}

impl<'a> Inputs<'a> {
    fn invoke(&self, slot: &Slot) -> Result<ContentSection> {
        let block = registry().get(slot.block).ok_or_else(|| {
            PageforgeError::missing(self.page_type.as_str(), format!("block {}", slot.block))
        })?;

        let section = match block {
            Block::Single(f) => f(self.product(slot.subject)?),
            Block::Pair(f) => f(self.product(Subject::Source)?, self.comparison()?.competitor()),
            Block::WithQuestions(f) => f(self.product(Subject::Source)?, self.questions()?),
            Block::Verdict(f) => f(
                self.delta(Dimension::Price)?,
                self.delta(Dimension::Benefits)?,
            ),
        };
        Ok(section)
    }

    fn product(&self, subject: Subject) -> Result<&'a Product> {
        match subject {
            Subject::Source => self
                .state
                .product()
                .ok_or_else(|| self.missing(StateKey::Product)),
            Subject::Competitor => Ok(self.comparison()?.competitor()),
        }
    }

    fn questions(&self) -> Result<&'a [Question]> {
        self.state
            .questions()
            .ok_or_else(|| self.missing(StateKey::Questions))
    }

    fn comparison(&self) -> Result<&'a ComparisonData> {
        self.state
            .comparison()
            .ok_or_else(|| self.missing(StateKey::Comparison))
    }

    fn delta(&self, dimension: Dimension) -> Result<&'a ContentSection> {
        self.comparison()?.delta(dimension).ok_or_else(|| {
            PageforgeError::missing(
                self.page_type.as_str(),
                format!("{}.{}", StateKey::Comparison, dimension.as_str()),
            )
        })
    }

    fn missing(&self, key: StateKey) -> PageforgeError {
        PageforgeError::missing(self.page_type.as_str(), key.to_string())
    }
}

fn place(section: &ContentSection, placement: Placement) -> Result<Value> {
    Ok(match placement {
        Placement::Section => serde_json::to_value(section)?,
        Placement::Data => section.data.clone(),
        Placement::Field(field) => section.field(field).cloned().unwrap_or(Value::Null),
    })
}

/// Insert `value` at a dotted path, creating intermediate objects.
fn insert_path(body: &mut Map<String, Value>, path: &str, value: Value) {
    let (parents, leaf) = path.rsplit_once('.').unwrap_or(("", path));
    let mut current = body;
    for segment in parents.split('.').filter(|s| !s.is_empty()) {
        let next = current
            .entry(segment)
            .or_insert_with(|| Value::Object(Map::new()));
        if !next.is_object() {
            *next = Value::Object(Map::new());
        }
        let Value::Object(map) = next else {
            return;
        };
        current = map;
    }
    current.insert(leaf.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::generate_comparison;
    use crate::questions::generate_questions;
    use crate::state::StateEntry;
    use crate::strategy::strategy_for;
    use pageforge_blocks::{format_ingredients, format_price};
    use serde_json::json;

    fn product() -> Product {
        Product::from_value(&json!({
            "name": "GlowBoost Vitamin C Serum",
            "concentration": "10% Vitamin C",
            "skin_types": ["Oily", "Combination"],
            "ingredients": ["Vitamin C", "Hyaluronic Acid"],
            "benefits": ["Brightening", "Fades dark spots"],
            "usage": "Apply 2–3 drops in the morning before sunscreen",
            "side_effects": "Mild tingling for sensitive skin",
            "price": 699
        }))
        .expect("valid product")
    }

    fn state_with_product() -> RunState {
        let mut state = RunState::new();
        state
            .insert(StateEntry::Product(product()))
            .expect("insert product");
        state
    }

    #[test]
    fn product_page_has_fixed_shape() {
        let state = state_with_product();
        let strategy = strategy_for(PageType::Product).expect("strategy");
        let doc = render(&strategy, &state).expect("render");

        let keys: Vec<_> = doc.body().keys().map(String::as_str).collect();
        assert_eq!(keys, ["hero", "details"]);
        assert_eq!(
            doc.get("hero.product_name"),
            Some(&json!("GlowBoost Vitamin C Serum"))
        );
        let details: Vec<_> = doc
            .get("details")
            .and_then(Value::as_object)
            .expect("details object")
            .keys()
            .cloned()
            .collect();
        assert_eq!(
            details,
            ["benefits", "ingredients", "usage", "skin_types", "price", "safety"]
        );
    }

    #[test]
    fn product_sections_match_direct_block_calls() {
        let state = state_with_product();
        let doc = render(&strategy_for(PageType::Product).expect("strategy"), &state)
            .expect("render");
        let p = product();
        assert_eq!(
            doc.get("details.ingredients.data"),
            Some(&format_ingredients(&p).data)
        );
        assert_eq!(doc.get("details.price.data"), Some(&format_price(&p).data));
        assert_eq!(
            doc.get("details.price.section_type"),
            Some(&json!("price"))
        );
    }

    #[test]
    fn faq_without_questions_is_missing_dependency() {
        let state = state_with_product();
        let err = render(&strategy_for(PageType::Faq).expect("strategy"), &state)
            .expect_err("questions absent");
        assert!(matches!(
            err,
            PageforgeError::MissingDependency { ref consumer, ref key }
                if consumer == "faq" && key == "questions"
        ));
    }

    #[test]
    fn faq_with_too_few_questions_is_insufficient() {
        let mut state = state_with_product();
        let few: Vec<Question> = generate_questions(&product()).into_iter().take(3).collect();
        state.insert(StateEntry::Questions(few)).expect("insert");

        let err = render(&strategy_for(PageType::Faq).expect("strategy"), &state)
            .expect_err("too few questions");
        assert!(matches!(
            err,
            PageforgeError::InsufficientContent { required: 5, actual, .. } if actual < 5
        ));
    }

    #[test]
    fn faq_counts_agree() {
        let mut state = state_with_product();
        state
            .insert(StateEntry::Questions(generate_questions(&product())))
            .expect("insert");
        let doc = render(&strategy_for(PageType::Faq).expect("strategy"), &state)
            .expect("render");

        let total = doc
            .get("total_questions")
            .and_then(Value::as_u64)
            .expect("total");
        let listed = doc
            .get("questions")
            .and_then(Value::as_array)
            .map(Vec::len)
            .expect("questions");
        assert_eq!(total as usize, listed);
        assert!(total >= 5);
    }

    #[test]
    fn comparison_before_comparison_data_is_missing_dependency() {
        let state = state_with_product();
        let err = render(&strategy_for(PageType::Comparison).expect("strategy"), &state)
            .expect_err("comparison absent");
        assert!(matches!(
            err,
            PageforgeError::MissingDependency { ref key, .. } if key == "comparison"
        ));
    }

    #[test]
    fn comparison_page_composes_both_products() {
        let mut state = state_with_product();
        state
            .insert(StateEntry::Comparison(
                generate_comparison(&product()).expect("comparison"),
            ))
            .expect("insert");
        let doc = render(&strategy_for(PageType::Comparison).expect("strategy"), &state)
            .expect("render");

        assert_eq!(
            doc.get("products.product_a.name"),
            Some(&json!("GlowBoost Vitamin C Serum"))
        );
        assert_eq!(
            doc.get("products.product_b.name"),
            Some(&json!("RadiantGlow Vitamin C Serum"))
        );
        assert_eq!(
            doc.get("comparison_matrix.price.data.label"),
            Some(&json!("cheaper"))
        );
        assert_eq!(doc.get("recommendation.label"), Some(&json!("better value")));
    }

    #[test]
    fn serialized_document_leads_with_page_type() {
        let state = state_with_product();
        let doc = render(&strategy_for(PageType::Product).expect("strategy"), &state)
            .expect("render");
        let text = serde_json::to_string(&doc).expect("serialize");
        assert!(text.starts_with(r#"{"page_type":"product","hero":"#));
        assert_eq!(serde_json::to_value(&doc).expect("value"), doc.to_value());
    }

    #[test]
    fn insert_path_builds_nested_objects() {
        let mut body = Map::new();
        insert_path(&mut body, "a.b.c", json!(1));
        insert_path(&mut body, "a.d", json!(2));
        insert_path(&mut body, "e", json!(3));
        assert_eq!(Value::Object(body), json!({"a": {"b": {"c": 1}, "d": 2}, "e": 3}));
    }
}
