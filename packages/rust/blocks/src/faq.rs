//! FAQ selection block.

use std::collections::HashSet;

use serde_json::json;

use pageforge_shared::{ContentSection, Product, Question};

/// Surface the first question of each category, keeping generation order.
pub fn faq_questions(product: &Product, questions: &[Question]) -> ContentSection {
    if questions.is_empty() {
        return ContentSection::unavailable("faq", "no questions generated");
    }

    let mut seen = HashSet::new();
    let selected: Vec<&Question> = questions
        .iter()
        .filter(|q| seen.insert(q.category))
        .collect();

    ContentSection::new(
        "faq",
        json!({
            "product_name": product.name(),
            "total_questions": selected.len(),
            "questions": selected,
        }),
    )
}
