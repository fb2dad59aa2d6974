//! Comparison generation: derive a competitor and diff it against the source.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use pageforge_blocks::{
    compare_benefits, compare_ingredients, compare_price, generate_fictional_competitor,
};
use pageforge_shared::{ContentSection, Product, Result};

/// Axis along which the source and competitor are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Ingredients,
    Benefits,
    Price,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Self::Ingredients, Self::Benefits, Self::Price];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ingredients => "ingredients",
            Self::Benefits => "benefits",
            Self::Price => "price",
        }
    }
}

/// The competitor record plus one delta section per [`Dimension`].
#[derive(Debug, Clone)]
pub struct ComparisonData {
    competitor: Product,
    deltas: BTreeMap<Dimension, ContentSection>,
}

impl ComparisonData {
    pub fn competitor(&self) -> &Product {
        &self.competitor
    }

    /// Delta section for `dimension`. Always present for data built by
    /// [`generate_comparison`].
    pub fn delta(&self, dimension: Dimension) -> Option<&ContentSection> {
        self.deltas.get(&dimension)
    }

    pub fn deltas(&self) -> impl Iterator<Item = (Dimension, &ContentSection)> {
        self.deltas.iter().map(|(d, s)| (*d, s))
    }
}

/// Build the competitor for `product` and compute every comparison delta.
#[instrument(skip_all, fields(product = product.name()))]
pub fn generate_comparison(product: &Product) -> Result<ComparisonData> {
    let competitor = generate_fictional_competitor(product)?;

    let deltas = Dimension::ALL
        .into_iter()
        .map(|dimension| {
            let section = match dimension {
                Dimension::Ingredients => compare_ingredients(product, &competitor),
                Dimension::Benefits => compare_benefits(product, &competitor),
                Dimension::Price => compare_price(product, &competitor),
            };
            (dimension, section)
        })
        .collect();

    debug!(competitor = competitor.name(), "comparison data ready");
    Ok(ComparisonData { competitor, deltas })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Product {
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

    #[test]
    fn every_dimension_has_a_delta() {
        let data = generate_comparison(&sample()).expect("comparison");
        for dimension in Dimension::ALL {
            assert!(data.delta(dimension).is_some(), "{} missing", dimension.as_str());
        }
        assert_eq!(data.deltas().count(), 3);
    }

    #[test]
    fn sample_deltas_match_competitor() {
        let data = generate_comparison(&sample()).expect("comparison");
        assert_eq!(data.competitor().name(), "RadiantGlow Vitamin C Serum");

        let price = data.delta(Dimension::Price).expect("price delta");
        assert_eq!(price.section_type, "price_comparison");
        assert_eq!(price.field("difference"), Some(&json!(-210)));
        assert_eq!(price.field("label"), Some(&json!("cheaper")));

        let ingredients = data.delta(Dimension::Ingredients).expect("ingredient delta");
        assert_eq!(ingredients.field("common"), Some(&json!(["Vitamin C"])));
        assert_eq!(
            ingredients.field("unique_to_product_b"),
            Some(&json!(["Ferulic Acid"]))
        );
    }

    #[test]
    fn huge_price_still_compares() {
        let mut raw = serde_json::to_value(sample()).expect("product json");
        raw["price"] = json!(1.5e308);
        let product = Product::from_value(&raw).expect("valid product");

        let data = generate_comparison(&product).expect("comparison");
        assert_eq!(data.competitor().price(), f64::MAX);
        let price = data.delta(Dimension::Price).expect("price delta");
        assert_eq!(price.field("label"), Some(&json!("cheaper")));
        assert!(price.field("difference").and_then(|d| d.as_f64()).is_some());
    }
}
