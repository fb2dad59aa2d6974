//! Deterministic fictional competitor derivation.
//!
//! Every rule here is a fixed function of the source record: no randomness,
//! clock, or environment input, so equal inputs give byte-identical output.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use pageforge_shared::{Product, Result};

/// Brand token that replaces the source's leading brand word.
pub const COMPETITOR_BRAND: &str = "RadiantGlow";
/// Brand token used when the source already carries [`COMPETITOR_BRAND`].
pub const FALLBACK_BRAND: &str = "LumaCore";

const ALTERNATE_INGREDIENTS: [&str; 2] = ["Ferulic Acid", "Vitamin E"];
const ALTERNATE_BENEFITS: [&str; 2] = ["Antioxidant protection", "Anti-aging"];
const COMPETITOR_SKIN_TYPE: &str = "Sensitive";
const COMPETITOR_USAGE: &str = "Apply in the evening after cleansing, then follow with moisturizer";
const COMPETITOR_SIDE_EFFECTS: &str = "May cause slight redness initially";
const PRICE_MULTIPLIER: f64 = 1.3;
const CONCENTRATION_STEP: f64 = 5.0;

/// Build the competitor record compared against `product`.
pub fn generate_fictional_competitor(product: &Product) -> Result<Product> {
    let mut draft = product.to_draft();

    draft.name = competitor_name(product.name());
    draft.concentration = competitor_concentration(product.concentration());
    draft.ingredients = competitor_ingredients(product.ingredients());
    draft.benefits = competitor_benefits(product.benefits());
    if !draft
        .skin_types
        .iter()
        .any(|t| t.eq_ignore_ascii_case(COMPETITOR_SKIN_TYPE))
    {
        draft.skin_types.push(COMPETITOR_SKIN_TYPE.to_string());
    }
    draft.usage = COMPETITOR_USAGE.to_string();
    draft.side_effects = COMPETITOR_SIDE_EFFECTS.to_string();
    draft.price = competitor_price(product.price());

    let competitor = Product::try_from(draft)?;
    debug!(
        source = product.name(),
        competitor = competitor.name(),
        "derived fictional competitor"
    );
    Ok(competitor)
}

/// Swap the leading brand word, or prefix the brand for one-word names.
fn competitor_name(name: &str) -> String {
    let brand = if name.split_whitespace().next() == Some(COMPETITOR_BRAND) {
        FALLBACK_BRAND
    } else {
        COMPETITOR_BRAND
    };

    match name.split_once(char::is_whitespace) {
        Some((_, rest)) => format!("{brand} {}", rest.trim_start()),
        None => format!("{brand} {name}"),
    }
}

/// Scale the price up, saturating at the largest finite amount.
fn competitor_price(price: f64) -> f64 {
    let raised = (price * PRICE_MULTIPLIER).round();
    if raised.is_finite() {
        raised
    } else {
        f64::MAX
    }
}

/// Raise the first percentage to the next multiple of five.
fn competitor_concentration(concentration: &str) -> String {
    static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?:^|[^\d.])(\d{1,6}(?:\.\d+)?)\s*%").expect("valid regex")
    });

    let Some(caps) = PERCENT_RE.captures(concentration) else {
        return format!("{concentration} Plus");
    };
    let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
        return format!("{concentration} Plus");
    };

    let current: f64 = number.as_str().parse().unwrap_or(0.0);
    let raised = ((current / CONCENTRATION_STEP).floor() + 1.0) * CONCENTRATION_STEP;

    format!(
        "{}{raised:.0}%{}",
        &concentration[..number.start()],
        &concentration[whole.end()..]
    )
}

/// Keep the primary ingredient; replace the last secondary with an alternate.
fn competitor_ingredients(ingredients: &[String]) -> Vec<String> {
    swap_last(ingredients, &ALTERNATE_INGREDIENTS)
}

/// Drop the last benefit (when more than one) and append an alternate.
fn competitor_benefits(benefits: &[String]) -> Vec<String> {
    swap_last(benefits, &ALTERNATE_BENEFITS)
}

/// Drop the last entry of a multi-item list, then append the first candidate
/// absent from what remains. Nothing is appended when every candidate is
/// already present.
fn swap_last(items: &[String], candidates: &[&str]) -> Vec<String> {
    let mut derived = items.to_vec();
    if derived.len() > 1 {
        derived.pop();
    }
    if let Some(alternate) = candidates
        .iter()
        .find(|c| !derived.iter().any(|e| e.eq_ignore_ascii_case(c)))
    {
        derived.push((*alternate).to_string());
    }
    derived
}
