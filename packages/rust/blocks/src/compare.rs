//! Pair blocks: structured differences between two products.

use serde_json::{Value, json};

use pageforge_shared::{ContentSection, Product, amount_value, display_amount};

/// Label when product A costs less than product B.
pub const CHEAPER: &str = "cheaper";
/// Label when product A costs more than product B.
pub const PRICIER: &str = "pricier";
/// Label when both prices match.
pub const EQUAL: &str = "equal";

/// Shared, A-only and B-only ingredients.
pub fn compare_ingredients(a: &Product, b: &Product) -> ContentSection {
    list_comparison("ingredient_comparison", a, b, a.ingredients(), b.ingredients())
}

/// Shared, A-only and B-only benefits.
pub fn compare_benefits(a: &Product, b: &Product) -> ContentSection {
    list_comparison("benefit_comparison", a, b, a.benefits(), b.benefits())
}

/// Price difference `a - b`, percentage relative to `a`, and a qualitative label.
pub fn compare_price(a: &Product, b: &Product) -> ContentSection {
    let difference = round_cents(a.price() - b.price());
    let percentage = if a.price() > 0.0 {
        amount_value(round_cents(difference / a.price() * 100.0))
    } else {
        Value::Null
    };

    let (label, cheaper_product) = if difference < 0.0 {
        (CHEAPER, Value::from(a.name()))
    } else if difference > 0.0 {
        (PRICIER, Value::from(b.name()))
    } else {
        (EQUAL, Value::Null)
    };

    ContentSection::new(
        "price_comparison",
        json!({
            "product_a": a.name(),
            "product_b": b.name(),
            "product_a_price": amount_value(a.price()),
            "product_b_price": amount_value(b.price()),
            "difference": amount_value(difference),
            "formatted_difference": display_amount(difference.abs()),
            "percentage_difference": percentage,
            "label": label,
            "cheaper_product": cheaper_product,
        }),
    )
}

/// Short verdict derived from a price comparison and a benefit comparison.
pub fn recommend(price: &ContentSection, benefits: &ContentSection) -> ContentSection {
    if price.is_unavailable() || benefits.is_unavailable() {
        return ContentSection::unavailable("recommendation", "comparison data unavailable");
    }

    let name_a = text_field(price, "product_a");
    let name_b = text_field(price, "product_b");
    let price_label = text_field(price, "label");
    let difference = text_field(price, "formatted_difference");
    let extra_a = count_field(benefits, "unique_to_product_a");
    let extra_b = count_field(benefits, "unique_to_product_b");

    let label = match price_label {
        CHEAPER if extra_a >= extra_b => "better value",
        CHEAPER => "budget pick",
        PRICIER if extra_a > extra_b => "premium pick",
        EQUAL if extra_a > extra_b => "better value",
        EQUAL if extra_a == extra_b => "comparable",
        _ => "competitor offers better value",
    };

    let price_clause = match price_label {
        CHEAPER => format!("costs {difference} less than {name_b}"),
        PRICIER => format!("costs {difference} more than {name_b}"),
        _ => format!("costs the same as {name_b}"),
    };

    ContentSection::new(
        "recommendation",
        json!({
            "label": label,
            "summary": format!(
                "{name_a} {price_clause} and offers {extra_a} distinct {} against {extra_b}.",
                if extra_a == 1 { "benefit" } else { "benefits" }
            ),
            "best_for_budget": price.field("cheaper_product").cloned().unwrap_or(Value::Null),
        }),
    )
}

fn list_comparison(
    section_type: &str,
    a: &Product,
    b: &Product,
    left: &[String],
    right: &[String],
) -> ContentSection {
    let common = dedup(left.iter().filter(|item| right.contains(item)));
    let only_a = dedup(left.iter().filter(|item| !right.contains(item)));
    let only_b = dedup(right.iter().filter(|item| !left.contains(item)));

    ContentSection::new(
        section_type,
        json!({
            "product_a": a.name(),
            "product_b": b.name(),
            "common": common,
            "unique_to_product_a": only_a,
            "unique_to_product_b": only_b,
            "overlap": common.len(),
        }),
    )
}

/// Keep first occurrences, preserving order.
fn dedup<'a>(items: impl Iterator<Item = &'a String>) -> Vec<&'a String> {
    let mut seen: Vec<&String> = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

fn text_field<'a>(section: &'a ContentSection, key: &str) -> &'a str {
    section.field(key).and_then(Value::as_str).unwrap_or_default()
}

fn count_field(section: &ContentSection, key: &str) -> usize {
    section
        .field(key)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn product(name: &str, ingredients: &[&str], benefits: &[&str], price: f64) -> Product {
        Product::from_value(&json!({
            "name": name,
            "concentration": "10% Vitamin C",
            "skin_types": ["Oily"],
            "ingredients": ingredients,
            "benefits": benefits,
            "usage": "Apply daily",
            "side_effects": "",
            "price": price
        }))
        .expect("valid product")
    }

    #[test]
    fn ingredients_split_into_common_and_unique() {
        let a = product("A", &["Vitamin C", "Hyaluronic Acid", "Niacinamide"], &["x"], 1.0);
        let b = product("B", &["Ferulic Acid", "Niacinamide", "Vitamin C"], &["x"], 1.0);
        let section = compare_ingredients(&a, &b);

        assert_eq!(section.section_type, "ingredient_comparison");
        assert_eq!(section.data["common"], json!(["Vitamin C", "Niacinamide"]));
        assert_eq!(section.data["unique_to_product_a"], json!(["Hyaluronic Acid"]));
        assert_eq!(section.data["unique_to_product_b"], json!(["Ferulic Acid"]));
        assert_eq!(section.data["overlap"], 2);
    }

    #[test]
    fn benefits_use_same_structure() {
        let a = product("A", &["x"], &["Brightening", "Fades dark spots"], 1.0);
        let b = product("B", &["x"], &["Brightening", "Antioxidant protection"], 1.0);
        let section = compare_benefits(&a, &b);
        assert_eq!(section.data["common"], json!(["Brightening"]));
        assert_eq!(section.data["unique_to_product_b"], json!(["Antioxidant protection"]));
    }

    #[test]
    fn duplicates_are_reported_once() {
        let a = product("A", &["Vitamin C", "Vitamin C"], &["x"], 1.0);
        let b = product("B", &["Zinc"], &["x"], 1.0);
        let section = compare_ingredients(&a, &b);
        assert_eq!(section.data["unique_to_product_a"], json!(["Vitamin C"]));
    }

    #[test]
    fn price_comparison_labels() {
        let a = product("A", &["x"], &["y"], 699.0);
        let b = product("B", &["x"], &["y"], 909.0);

        let ab = compare_price(&a, &b);
        assert_eq!(ab.data["difference"], -210);
        assert_eq!(ab.data["label"], CHEAPER);
        assert_eq!(ab.data["cheaper_product"], "A");
        assert_eq!(ab.data["formatted_difference"], "₹210");
        assert_eq!(ab.data["percentage_difference"], json!(-30.04));

        let ba = compare_price(&b, &a);
        assert_eq!(ba.data["difference"], 210);
        assert_eq!(ba.data["label"], PRICIER);
        assert_eq!(ba.data["cheaper_product"], "A");
    }

    #[test]
    fn equal_prices_and_free_products() {
        let a = product("A", &["x"], &["y"], 0.0);
        let b = product("B", &["x"], &["y"], 0.0);
        let section = compare_price(&a, &b);
        assert_eq!(section.data["label"], EQUAL);
        assert_eq!(section.data["percentage_difference"], Value::Null);
        assert_eq!(section.data["cheaper_product"], Value::Null);
    }

    #[test]
    fn recommendation_from_sections() {
        let a = product("A", &["x"], &["Brightening", "Fades dark spots"], 699.0);
        let b = product("B", &["x"], &["Brightening", "Antioxidant protection"], 909.0);
        let section = recommend(&compare_price(&a, &b), &compare_benefits(&a, &b));

        assert_eq!(section.data["label"], "better value");
        assert_eq!(section.data["best_for_budget"], "A");
        assert_eq!(
            section.data["summary"],
            "A costs ₹210 less than B and offers 1 distinct benefit against 1."
        );
    }

    #[test]
    fn recommendation_when_pricier_with_fewer_benefits() {
        let a = product("A", &["x"], &["Brightening"], 999.0);
        let b = product("B", &["x"], &["Brightening", "Hydration"], 500.0);
        let section = recommend(&compare_price(&a, &b), &compare_benefits(&a, &b));
        assert_eq!(section.data["label"], "competitor offers better value");
    }

    #[test]
    fn recommendation_propagates_unavailable() {
        let a = product("A", &["x"], &["y"], 1.0);
        let missing = ContentSection::unavailable("benefit_comparison", "none");
        assert!(recommend(&compare_price(&a, &a), &missing).is_unavailable());
    }

    fn label_of(section: &ContentSection) -> String {
        section.data["label"].as_str().expect("label").to_string()
    }

    proptest! {
        #[test]
        fn price_comparison_is_antisymmetric(pa in 0u32..1_000_000, pb in 0u32..1_000_000) {
            let a = product("A", &["x"], &["y"], f64::from(pa) / 100.0);
            let b = product("B", &["x"], &["y"], f64::from(pb) / 100.0);
            let ab = compare_price(&a, &b);
            let ba = compare_price(&b, &a);

            let d_ab = ab.data["difference"].as_f64().expect("difference");
            let d_ba = ba.data["difference"].as_f64().expect("difference");
            prop_assert_eq!(d_ab, -d_ba);

            let expected = match label_of(&ab).as_str() {
                CHEAPER => PRICIER,
                PRICIER => CHEAPER,
                _ => EQUAL,
            };
            prop_assert_eq!(label_of(&ba), expected);
            prop_assert_eq!(pa == pb, label_of(&ab) == EQUAL);
        }
    }
}
