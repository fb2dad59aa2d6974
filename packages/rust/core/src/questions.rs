//! Question generation: categorized Q&A pairs derived from product fields.
//!
//! Every question comes from a fixed template with product fields substituted
//! in; answers format the corresponding field. Output is grouped by category in
//! [`QuestionCategory::ALL`] order and stable within a category.

use std::collections::HashSet;

use tracing::{debug, instrument};

use pageforge_blocks::text::{decapitalize, join_natural};
use pageforge_shared::{Product, Question, QuestionCategory};

/// Lower bound on how many questions a generation run yields.
pub const MIN_GENERATED_QUESTIONS: usize = 15;

/// Generate the full question list for `product`.
///
/// Questions with identical text are dropped after their first occurrence
/// (repeated tags or ingredients would otherwise produce duplicates).
#[instrument(skip_all, fields(product = product.name()))]
pub fn generate_questions(product: &Product) -> Vec<Question> {
    let mut seen = HashSet::new();
    let questions: Vec<Question> = QuestionCategory::ALL
        .into_iter()
        .flat_map(|category| questions_for(category, product))
        .filter(|q| seen.insert(q.question.clone()))
        .collect();

    debug!(count = questions.len(), "generated questions");
    questions
}

fn questions_for(category: QuestionCategory, product: &Product) -> Vec<Question> {
    let name = product.name();
    let concentration = product.concentration();
    let skin_types = join_natural(product.skin_types());
    let ingredients = join_natural(product.ingredients());
    let primary = product.primary_ingredient().unwrap_or(name);
    let price = product.display_price();
    let usage = sentence(product.usage());
    let q = |question: String, answer: String| Question::new(category, question, answer);

    match category {
        QuestionCategory::Informational => vec![
            q(
                format!("What is {name}?"),
                format!("{name} is a {concentration} formulation for {skin_types} skin."),
            ),
            q(
                format!("What is the concentration of {name}?"),
                format!("{name} contains {concentration}."),
            ),
            q(
                format!("Who should use {name}?"),
                format!("{name} is designed for {skin_types} skin types."),
            ),
        ],
        QuestionCategory::Usage => vec![
            q(format!("How do I use {name}?"), usage.clone()),
            q(
                format!("When should I apply {name}?"),
                format!("Follow the directions: {usage}"),
            ),
            q(
                format!("Can I use {name} every day?"),
                format!("Use it as directed. {usage} Discontinue use if irritation persists."),
            ),
        ],
        QuestionCategory::Safety => {
            let side_effects = product.side_effects();
            let (known, sensitive) = if side_effects.is_empty() {
                (
                    format!("No known side effects have been reported for {name}."),
                    "No side effects are listed, but a patch test is recommended before first use."
                        .to_string(),
                )
            } else {
                (
                    format!("Possible side effects include: {}", sentence(side_effects)),
                    format!(
                        "Possible side effects include: {} A patch test is recommended before first use.",
                        sentence(side_effects)
                    ),
                )
            };
            vec![
                q(format!("Are there any side effects of {name}?"), known),
                q(format!("Is {name} safe for sensitive skin?"), sensitive),
                q(
                    format!("What precautions should I take when using {name}?"),
                    format!("Patch test before first use and follow the directions: {usage}"),
                ),
            ]
        }
        QuestionCategory::Purchase => vec![
            q(
                format!("How much does {name} cost?"),
                format!("{name} costs {price}."),
            ),
            q(
                format!("Is {name} worth the price?"),
                format!(
                    "At {price}, {name} delivers: {}.",
                    product.benefits().join(", ")
                ),
            ),
            q(
                format!("What do I get for the price of {name}?"),
                format!("{price} buys {concentration} featuring {ingredients}."),
            ),
        ],
        QuestionCategory::Ingredients => {
            let mut out = vec![
                q(
                    format!("What are the key ingredients in {name}?"),
                    format!("{name} contains {ingredients}."),
                ),
                q(
                    format!("What is the primary active ingredient in {name}?"),
                    format!("The primary ingredient is {primary} at {concentration}."),
                ),
            ];
            let benefits: Vec<String> =
                product.benefits().iter().map(|b| decapitalize(b)).collect();
            let benefits = join_natural(&benefits);
            out.extend(product.ingredients().iter().skip(1).map(|ingredient| {
                q(
                    format!("What does {ingredient} do in {name}?"),
                    format!("{ingredient} works alongside {primary} to support {benefits}."),
                )
            }));
            out
        }
        QuestionCategory::SkinType => {
            let mut out = vec![q(
                format!("Which skin types is {name} suitable for?"),
                format!("{name} is suitable for {skin_types} skin."),
            )];
            out.extend(product.skin_types().iter().map(|tag| {
                q(
                    format!("Is {name} suitable for {tag} skin?"),
                    format!("Yes, {name} is formulated for {tag} skin."),
                )
            }));
            out
        }
        QuestionCategory::Benefits => {
            let total = product.benefits().len();
            let mut out = vec![q(
                format!("What are the main benefits of {name}?"),
                format!("Key benefits include: {}.", product.benefits().join(", ")),
            )];
            out.extend(product.benefits().iter().enumerate().map(|(i, benefit)| {
                q(
                    format!("Does {name} list \"{benefit}\" as a benefit?"),
                    format!(
                        "Yes, \"{benefit}\" is listed benefit {} of {total}.",
                        i + 1
                    ),
                )
            }));
            out
        }
        QuestionCategory::Comparison => vec![
            q(
                format!("How does {name} compare to similar products?"),
                format!("{name} pairs {concentration} with {ingredients} at {price}."),
            ),
            q(
                format!("What makes {name} different?"),
                format!(
                    "Its primary ingredient, {primary}, is delivered at {concentration} for {skin_types} skin."
                ),
            ),
        ],
    }
}

/// Terminate text with exactly one period.
fn sentence(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches(['.', '!', '?']);
    format!("{trimmed}.")
}
