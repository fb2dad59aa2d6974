//! Core domain types: product records, questions, content sections, page types.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{PageforgeError, Result};

/// Currency symbol used for every displayed price.
pub const CURRENCY_SYMBOL: &str = "₹";

/// ISO currency code matching [`CURRENCY_SYMBOL`].
pub const CURRENCY_CODE: &str = "INR";

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// Unvalidated product fields, e.g. for a derived record.
///
/// Turn it into a [`Product`] with [`Product::try_from`].
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub concentration: String,
    pub skin_types: Vec<String>,
    pub ingredients: Vec<String>,
    pub benefits: Vec<String>,
    pub usage: String,
    pub side_effects: String,
    pub price: f64,
}

/// A validated, immutable product record.
///
/// Every field is non-empty except `side_effects`. The first ingredient is the
/// primary one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    name: String,
    concentration: String,
    skin_types: Vec<String>,
    ingredients: Vec<String>,
    benefits: Vec<String>,
    usage: String,
    side_effects: String,
    #[serde(serialize_with = "serialize_amount")]
    price: f64,
}

impl Product {
    /// Validate an untyped JSON record.
    ///
    /// Fields are checked in a fixed order (name, concentration, skin_types,
    /// ingredients, benefits, usage, side_effects, price) and the first
    /// missing or invalid one is reported. Unknown keys are ignored. Strings
    /// are trimmed; nothing else is coerced.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let record = raw
            .as_object()
            .ok_or_else(|| PageforgeError::malformed("<root>", "must be a JSON object"))?;

        let name = text(record, "name", false)?;
        let concentration = text(record, "concentration", false)?;
        let skin_types = list(record, "skin_types")?;
        let ingredients = list(record, "ingredients")?;
        let benefits = list(record, "benefits")?;
        let usage = text(record, "usage", false)?;
        let side_effects = text(record, "side_effects", true)?;
        let price = price(record)?;

        Ok(Self {
            name,
            concentration,
            skin_types,
            ingredients,
            benefits,
            usage,
            side_effects,
            price,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn concentration(&self) -> &str {
        &self.concentration
    }

    pub fn skin_types(&self) -> &[String] {
        &self.skin_types
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// The first listed ingredient.
    pub fn primary_ingredient(&self) -> Option<&str> {
        self.ingredients.first().map(String::as_str)
    }

    pub fn benefits(&self) -> &[String] {
        &self.benefits
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Side effects text; may be empty.
    pub fn side_effects(&self) -> &str {
        &self.side_effects
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Price with currency symbol, e.g. `₹699` or `₹699.50`.
    pub fn display_price(&self) -> String {
        display_amount(self.price)
    }

    /// Copy the fields back into an editable draft.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            concentration: self.concentration.clone(),
            skin_types: self.skin_types.clone(),
            ingredients: self.ingredients.clone(),
            benefits: self.benefits.clone(),
            usage: self.usage.clone(),
            side_effects: self.side_effects.clone(),
            price: self.price,
        }
    }
}

impl TryFrom<ProductDraft> for Product {
    type Error = PageforgeError;

    fn try_from(draft: ProductDraft) -> Result<Self> {
        Ok(Self {
            name: checked_text("name", draft.name, false)?,
            concentration: checked_text("concentration", draft.concentration, false)?,
            skin_types: checked_list("skin_types", draft.skin_types)?,
            ingredients: checked_list("ingredients", draft.ingredients)?,
            benefits: checked_list("benefits", draft.benefits)?,
            usage: checked_text("usage", draft.usage, false)?,
            side_effects: checked_text("side_effects", draft.side_effects, true)?,
            price: checked_price(draft.price)?,
        })
    }
}

fn text(record: &Map<String, Value>, field: &str, allow_empty: bool) -> Result<String> {
    match record.get(field) {
        None | Some(Value::Null) => Err(PageforgeError::malformed(field, "is missing")),
        Some(Value::String(s)) => checked_text(field, s.clone(), allow_empty),
        Some(_) => Err(PageforgeError::malformed(field, "must be a string")),
    }
}

fn list(record: &Map<String, Value>, field: &str) -> Result<Vec<String>> {
    let items = match record.get(field) {
        None | Some(Value::Null) => return Err(PageforgeError::malformed(field, "is missing")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(PageforgeError::malformed(field, "must be an array of strings")),
    };

    let strings = items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| PageforgeError::malformed(field, "must contain only strings"))
        })
        .collect::<Result<Vec<_>>>()?;

    checked_list(field, strings)
}

fn price(record: &Map<String, Value>) -> Result<f64> {
    match record.get("price") {
        None | Some(Value::Null) => Err(PageforgeError::malformed("price", "is missing")),
        Some(Value::Number(n)) => {
            let value = n
                .as_f64()
                .ok_or_else(|| PageforgeError::malformed("price", "is not representable"))?;
            checked_price(value)
        }
        Some(_) => Err(PageforgeError::malformed("price", "must be a number")),
    }
}

fn checked_text(field: &str, value: String, allow_empty: bool) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() && !allow_empty {
        return Err(PageforgeError::malformed(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn checked_list(field: &str, values: Vec<String>) -> Result<Vec<String>> {
    if values.is_empty() {
        return Err(PageforgeError::malformed(field, "must not be empty"));
    }
    values
        .into_iter()
        .map(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(PageforgeError::malformed(field, "must not contain empty entries"))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

fn checked_price(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(PageforgeError::malformed(
            "price",
            "must be a non-negative number",
        ));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// JSON value for an amount: an integer when whole, a float otherwise.
pub fn amount_value(amount: f64) -> Value {
    if amount.fract() == 0.0 && amount.abs() < 9_007_199_254_740_992.0 {
        Value::from(amount as i64)
    } else {
        serde_json::Number::from_f64(amount)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Amount text without currency: `699` when whole, `699.50` when fractional.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

/// Amount text with the currency symbol.
pub fn display_amount(amount: f64) -> String {
    format!("{CURRENCY_SYMBOL}{}", format_amount(amount))
}

fn serialize_amount<S: Serializer>(
    amount: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    amount_value(*amount).serialize(serializer)
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Question categories, in the order questions are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionCategory {
    Informational,
    Usage,
    Safety,
    Purchase,
    Ingredients,
    #[serde(rename = "Skin Type")]
    SkinType,
    Benefits,
    Comparison,
}

impl QuestionCategory {
    /// Every category, in grouping order.
    pub const ALL: [QuestionCategory; 8] = [
        Self::Informational,
        Self::Usage,
        Self::Safety,
        Self::Purchase,
        Self::Ingredients,
        Self::SkinType,
        Self::Benefits,
        Self::Comparison,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Informational => "Informational",
            Self::Usage => "Usage",
            Self::Safety => "Safety",
            Self::Purchase => "Purchase",
            Self::Ingredients => "Ingredients",
            Self::SkinType => "Skin Type",
            Self::Benefits => "Benefits",
            Self::Comparison => "Comparison",
        }
    }
}

impl std::fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A categorized question with a field-derived answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: QuestionCategory,
    pub question: String,
    pub answer: String,
}

impl Question {
    pub fn new(
        category: QuestionCategory,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            category,
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ContentSection
// ---------------------------------------------------------------------------

/// Key set on the data of a section whose block could not produce content.
pub const UNAVAILABLE_MARKER: &str = "unavailable";

/// Tagged output of a single content block invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    /// Discriminator naming what kind of content `data` holds.
    pub section_type: String,
    /// JSON object payload.
    pub data: Value,
}

impl ContentSection {
    pub fn new(section_type: impl Into<String>, data: Value) -> Self {
        Self {
            section_type: section_type.into(),
            data,
        }
    }

    /// A section explicitly marked as unavailable, carrying the reason.
    pub fn unavailable(section_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            section_type,
            serde_json::json!({ UNAVAILABLE_MARKER: true, "reason": reason.into() }),
        )
    }

    pub fn is_unavailable(&self) -> bool {
        self.data
            .get(UNAVAILABLE_MARKER)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Look up a top-level field of the payload.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

// ---------------------------------------------------------------------------
// PageType
// ---------------------------------------------------------------------------

/// The page documents a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Faq,
    Product,
    Comparison,
}

impl PageType {
    /// All page types, in rendering order.
    pub const ALL: [PageType; 3] = [Self::Faq, Self::Product, Self::Comparison];

    /// Identifier used in documents and strategy lookup.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Faq => "faq",
            Self::Product => "product",
            Self::Comparison => "comparison",
        }
    }
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageType {
    type Err = PageforgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PageforgeError::UnsupportedPageType {
                page_type: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "name": "GlowBoost Vitamin C Serum",
            "concentration": "10% Vitamin C",
            "skin_types": ["Oily", "Combination"],
            "ingredients": ["Vitamin C", "Hyaluronic Acid"],
            "benefits": ["Brightening", "Fades dark spots"],
            "usage": "Apply 2–3 drops in the morning before sunscreen",
            "side_effects": "Mild tingling for sensitive skin",
            "price": 699
        })
    }

    fn malformed_field(raw: &Value) -> String {
        match Product::from_value(raw) {
            Err(PageforgeError::MalformedInput { field, .. }) => field,
            other => panic!("expected malformed input, got {other:?}"),
        }
    }

    #[test]
    fn parses_sample_product() {
        let product = Product::from_value(&sample()).expect("valid product");
        assert_eq!(product.name(), "GlowBoost Vitamin C Serum");
        assert_eq!(product.primary_ingredient(), Some("Vitamin C"));
        assert_eq!(product.price(), 699.0);
        assert_eq!(product.display_price(), "₹699");
    }

    #[test]
    fn trims_strings_and_ignores_unknown_keys() {
        let mut raw = sample();
        raw["name"] = json!("  Padded Name  ");
        raw["skin_types"] = json!([" Dry "]);
        raw["sku"] = json!("X-1");
        let product = Product::from_value(&raw).expect("valid product");
        assert_eq!(product.name(), "Padded Name");
        assert_eq!(product.skin_types(), ["Dry".to_string()]);
    }

    #[test]
    fn missing_price_names_price() {
        let mut raw = sample();
        raw.as_object_mut().expect("object").remove("price");
        assert_eq!(malformed_field(&raw), "price");
    }

    #[test]
    fn reports_first_invalid_field_in_fixed_order() {
        let mut raw = sample();
        raw["usage"] = json!("   ");
        raw["ingredients"] = json!([]);
        raw["price"] = json!(-1);
        assert_eq!(malformed_field(&raw), "ingredients");
    }

    #[test]
    fn rejects_non_numeric_and_negative_price() {
        let mut raw = sample();
        raw["price"] = json!("699");
        assert_eq!(malformed_field(&raw), "price");
        raw["price"] = json!(-0.5);
        assert_eq!(malformed_field(&raw), "price");
    }

    #[test]
    fn side_effects_may_be_empty_but_not_missing() {
        let mut raw = sample();
        raw["side_effects"] = json!("");
        let product = Product::from_value(&raw).expect("empty side effects allowed");
        assert_eq!(product.side_effects(), "");

        raw.as_object_mut().expect("object").remove("side_effects");
        assert_eq!(malformed_field(&raw), "side_effects");
    }

    #[test]
    fn non_object_input_is_malformed() {
        assert_eq!(malformed_field(&json!([1, 2])), "<root>");
    }

    #[test]
    fn draft_validation_uses_same_rules() {
        let product = Product::from_value(&sample()).expect("valid product");
        let mut draft = product.to_draft();
        draft.benefits.clear();
        let err = Product::try_from(draft).expect_err("empty benefits rejected");
        assert!(err.to_string().contains("`benefits`"));
    }

    #[test]
    fn amounts_render_whole_and_fractional() {
        assert_eq!(amount_value(699.0), json!(699));
        assert_eq!(amount_value(699.5), json!(699.5));
        assert_eq!(display_amount(699.5), "₹699.50");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn product_serializes_whole_price_as_integer() {
        let product = Product::from_value(&sample()).expect("valid product");
        let value = serde_json::to_value(&product).expect("serialize");
        assert_eq!(value["price"], json!(699));
        assert_eq!(value["ingredients"][0], json!("Vitamin C"));
    }

    #[test]
    fn page_type_parsing() {
        assert_eq!("faq".parse::<PageType>().expect("faq"), PageType::Faq);
        let err = "blog".parse::<PageType>().expect_err("unknown page type");
        assert!(matches!(err, PageforgeError::UnsupportedPageType { .. }));
    }

    #[test]
    fn category_serializes_with_label() {
        let q = Question::new(QuestionCategory::SkinType, "Q?", "A.");
        let value = serde_json::to_value(&q).expect("serialize");
        assert_eq!(value["category"], json!("Skin Type"));
    }

    #[test]
    fn unavailable_section_is_marked() {
        let section = ContentSection::unavailable("benefits", "no benefits listed");
        assert!(section.is_unavailable());
        assert_eq!(section.field("reason"), Some(&json!("no benefits listed")));
        assert!(!ContentSection::new("x", json!({})).is_unavailable());
    }
}
