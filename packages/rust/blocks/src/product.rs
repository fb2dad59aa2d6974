//! Single-product blocks: each turns one [`Product`] into a [`ContentSection`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use pageforge_shared::{CURRENCY_CODE, CURRENCY_SYMBOL, ContentSection, Product, amount_value};

use crate::text::{capitalize, join_natural};

/// Text emitted by the safety block when no side effects are listed.
pub const NO_KNOWN_SIDE_EFFECTS: &str = "No known side effects";

/// Patch-test advice attached to every safety section.
pub const PATCH_TEST_RECOMMENDATION: &str =
    "Patch test on a small area before first use, especially for sensitive skin";

/// Skin-type categories the matcher reports suitability for.
pub const KNOWN_SKIN_TYPES: [&str; 5] = ["Oily", "Dry", "Combination", "Normal", "Sensitive"];

/// Headline identity: product name plus a tagline built from the concentration.
pub fn product_identity(product: &Product) -> ContentSection {
    ContentSection::new(
        "hero",
        json!({
            "product_name": product.name(),
            "tagline": format!(
                "Professional {} formula for visible results",
                product.concentration()
            ),
        }),
    )
}

/// Condensed profile used when products are shown side by side.
pub fn product_profile(product: &Product) -> ContentSection {
    ContentSection::new(
        "profile",
        json!({
            "name": product.name(),
            "concentration": product.concentration(),
            "price": amount_value(product.price()),
            "skin_types": product.skin_types(),
            "ingredients": product.ingredients(),
            "benefits": product.benefits(),
        }),
    )
}

/// Benefits in input order; the first is tier `primary`, the rest `secondary`.
pub fn extract_benefits(product: &Product) -> ContentSection {
    if product.benefits().is_empty() {
        return ContentSection::unavailable("benefits", "no benefits listed");
    }

    let items: Vec<Value> = product
        .benefits()
        .iter()
        .enumerate()
        .map(|(i, benefit)| {
            json!({
                "benefit": benefit,
                "tier": if i == 0 { "primary" } else { "secondary" },
            })
        })
        .collect();

    ContentSection::new(
        "benefits",
        json!({
            "title": "Key Benefits",
            "count": items.len(),
            "items": items,
        }),
    )
}

/// Ingredient list with the first entry flagged as primary.
pub fn format_ingredients(product: &Product) -> ContentSection {
    let Some(primary) = product.primary_ingredient() else {
        return ContentSection::unavailable("ingredients", "no ingredients listed");
    };

    let items: Vec<Value> = product
        .ingredients()
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "name": name, "is_primary": i == 0 }))
        .collect();

    ContentSection::new(
        "ingredients",
        json!({
            "title": "Active Ingredients",
            "primary": primary,
            "concentration": product.concentration(),
            "items": items,
        }),
    )
}

/// Usage text split into discrete steps.
pub fn generate_usage_instructions(product: &Product) -> ContentSection {
    if product.usage().is_empty() {
        return ContentSection::unavailable("usage", "no usage instructions listed");
    }

    let steps = split_usage_steps(product.usage());
    ContentSection::new(
        "usage",
        json!({
            "title": "How to Use",
            "instructions": product.usage(),
            "step_count": steps.len(),
            "steps": steps,
        }),
    )
}

/// Split on sentence-ending punctuation or connector words.
///
/// Text without natural split points comes back as a single step.
pub fn split_usage_steps(usage: &str) -> Vec<String> {
    static STEP_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?i)[.!?;]+(?:\s+|$)|,?\s+(?:and then|then|after that|afterwards|followed by)\s+",
        )
        .expect("valid regex")
    });

    let steps: Vec<String> = STEP_BREAK_RE
        .split(usage)
        .map(|s| s.trim().trim_end_matches([',', '.', ';', '!', '?']).trim())
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect();

    if steps.is_empty() {
        vec![usage.trim().to_string()]
    } else {
        steps
    }
}

/// Side-effect warnings plus the static patch-test recommendation.
pub fn create_safety_content(product: &Product) -> ContentSection {
    let has_side_effects = !product.side_effects().is_empty();
    let side_effects = if has_side_effects {
        product.side_effects()
    } else {
        NO_KNOWN_SIDE_EFFECTS
    };

    ContentSection::new(
        "safety",
        json!({
            "title": "Safety Information",
            "side_effects": side_effects,
            "has_known_side_effects": has_side_effects,
            "recommendation": PATCH_TEST_RECOMMENDATION,
        }),
    )
}

/// Price amount, currency, and a display string.
pub fn format_price(product: &Product) -> ContentSection {
    ContentSection::new(
        "price",
        json!({
            "amount": amount_value(product.price()),
            "currency": CURRENCY_CODE,
            "symbol": CURRENCY_SYMBOL,
            "formatted": product.display_price(),
        }),
    )
}

/// Tags unchanged plus a suitability flag per known skin type.
pub fn skin_type_matcher(product: &Product) -> ContentSection {
    let tags = product.skin_types();
    if tags.is_empty() {
        return ContentSection::unavailable("skin_types", "no skin types listed");
    }

    let universal = tags
        .iter()
        .any(|t| t.to_lowercase().starts_with("all"));

    let mut suitability = Map::new();
    for known in KNOWN_SKIN_TYPES {
        let matched = universal || tags.iter().any(|t| t.eq_ignore_ascii_case(known));
        suitability.insert(known.to_string(), Value::Bool(matched));
    }

    ContentSection::new(
        "skin_types",
        json!({
            "title": "Suitable For",
            "types": tags,
            "suitability": suitability,
            "recommendation": format!("Ideal for {} skin", join_natural(tags)),
        }),
    )
}
