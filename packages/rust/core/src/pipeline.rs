//! End-to-end run: raw product JSON → run state → FAQ, product and comparison pages.
//!
//! The plan is a fixed list of named steps with declared dependencies,
//! validated once when a [`Pipeline`] is built and then executed strictly in
//! order. Each step reads a shared borrow of the run state and returns exactly
//! one new entry; the pipeline is the only writer.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{error, info, instrument};

use pageforge_shared::{PageType, PageforgeError, Product, Result};

use crate::comparison::generate_comparison;
use crate::questions::generate_questions;
use crate::renderer::{Document, render};
use crate::state::{RunState, StateEntry, StateKey};
use crate::strategy;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Identifier of a pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    ParseProduct,
    GenerateQuestions,
    ResolveFaqStrategy,
    RenderFaq,
    ResolveProductStrategy,
    RenderProduct,
    GenerateComparison,
    ResolveComparisonStrategy,
    RenderComparison,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParseProduct => "parse_product",
            Self::GenerateQuestions => "generate_questions",
            Self::ResolveFaqStrategy => "resolve_faq_strategy",
            Self::RenderFaq => "render_faq",
            Self::ResolveProductStrategy => "resolve_product_strategy",
            Self::RenderProduct => "render_product",
            Self::GenerateComparison => "generate_comparison",
            Self::ResolveComparisonStrategy => "resolve_comparison_strategy",
            Self::RenderComparison => "render_comparison",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a step sees: the raw input and a read-only view of the state so far.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub raw: &'a Value,
    pub state: &'a RunState,
}

/// A named step, the steps it depends on, and its function.
#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    pub id: StepId,
    pub depends_on: &'static [StepId],
    pub run: fn(&StepInput<'_>) -> Result<StateEntry>,
}

/// The nine steps in execution order.
pub const DEFAULT_PLAN: [StepDef; 9] = [
    StepDef {
        id: StepId::ParseProduct,
        depends_on: &[],
        run: parse_product,
    },
    StepDef {
        id: StepId::GenerateQuestions,
        depends_on: &[StepId::ParseProduct],
        run: questions_step,
    },
    StepDef {
        id: StepId::ResolveFaqStrategy,
        depends_on: &[],
        run: resolve_faq,
    },
    StepDef {
        id: StepId::RenderFaq,
        depends_on: &[
            StepId::ParseProduct,
            StepId::GenerateQuestions,
            StepId::ResolveFaqStrategy,
        ],
        run: render_faq,
    },
    StepDef {
        id: StepId::ResolveProductStrategy,
        depends_on: &[],
        run: resolve_product,
    },
    StepDef {
        id: StepId::RenderProduct,
        depends_on: &[StepId::ParseProduct, StepId::ResolveProductStrategy],
        run: render_product,
    },
    StepDef {
        id: StepId::GenerateComparison,
        depends_on: &[StepId::ParseProduct],
        run: comparison_step,
    },
    StepDef {
        id: StepId::ResolveComparisonStrategy,
        depends_on: &[],
        run: resolve_comparison,
    },
    StepDef {
        id: StepId::RenderComparison,
        depends_on: &[
            StepId::ParseProduct,
            StepId::GenerateComparison,
            StepId::ResolveComparisonStrategy,
        ],
        run: render_comparison,
    },
];

fn parse_product(input: &StepInput<'_>) -> Result<StateEntry> {
    Product::from_value(input.raw).map(StateEntry::Product)
}

fn questions_step(input: &StepInput<'_>) -> Result<StateEntry> {
    let product = require_product(input, StepId::GenerateQuestions)?;
    Ok(StateEntry::Questions(generate_questions(product)))
}

fn comparison_step(input: &StepInput<'_>) -> Result<StateEntry> {
    let product = require_product(input, StepId::GenerateComparison)?;
    generate_comparison(product).map(StateEntry::Comparison)
}

fn resolve_faq(_: &StepInput<'_>) -> Result<StateEntry> {
    resolve_step(PageType::Faq)
}

fn resolve_product(_: &StepInput<'_>) -> Result<StateEntry> {
    resolve_step(PageType::Product)
}

fn resolve_comparison(_: &StepInput<'_>) -> Result<StateEntry> {
    resolve_step(PageType::Comparison)
}

fn resolve_step(page_type: PageType) -> Result<StateEntry> {
    strategy::resolve(page_type.as_str()).map(StateEntry::Strategy)
}

fn render_faq(input: &StepInput<'_>) -> Result<StateEntry> {
    render_step(input, StepId::RenderFaq, PageType::Faq)
}

fn render_product(input: &StepInput<'_>) -> Result<StateEntry> {
    render_step(input, StepId::RenderProduct, PageType::Product)
}

fn render_comparison(input: &StepInput<'_>) -> Result<StateEntry> {
    render_step(input, StepId::RenderComparison, PageType::Comparison)
}

fn render_step(input: &StepInput<'_>, step: StepId, page_type: PageType) -> Result<StateEntry> {
    let strategy = input.state.strategy(page_type).ok_or_else(|| {
        PageforgeError::missing(step.as_str(), StateKey::Strategy(page_type).to_string())
    })?;
    render(strategy, input.state).map(StateEntry::Document)
}

fn require_product<'a>(input: &StepInput<'a>, step: StepId) -> Result<&'a Product> {
    input
        .state
        .product()
        .ok_or_else(|| PageforgeError::missing(step.as_str(), StateKey::Product.to_string()))
}

/// Check that `steps` is a valid execution order: unique ids, no
/// self-dependencies, and every dependency scheduled strictly earlier.
pub fn validate_plan(steps: &[StepDef]) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        if steps[..index].iter().any(|s| s.id == step.id) {
            return Err(PageforgeError::plan(format!("step `{}` appears twice", step.id)));
        }
        for dep in step.depends_on {
            if *dep == step.id {
                return Err(PageforgeError::plan(format!(
                    "step `{}` depends on itself",
                    step.id
                )));
            }
            match steps.iter().position(|s| s.id == *dep) {
                None => {
                    return Err(PageforgeError::plan(format!(
                        "step `{}` depends on unknown step `{dep}`",
                        step.id
                    )));
                }
                Some(position) if position > index => {
                    return Err(PageforgeError::plan(format!(
                        "step `{}` runs before its dependency `{dep}`",
                        step.id
                    )));
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called before step `index` (1-based) of `total` runs.
    fn step(&self, step: StepId, index: usize, total: usize);
    /// Called when a step fails, before the run is aborted.
    fn failed(&self, step: StepId, error: &PageforgeError);
    /// Called when every step has completed.
    fn done(&self, output: &PipelineOutput);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn step(&self, _step: StepId, _index: usize, _total: usize) {}
    fn failed(&self, _step: StepId, _error: &PageforgeError) {}
    fn done(&self, _output: &PipelineOutput) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Timing and output key of one completed step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: StepId,
    pub key: StateKey,
    pub elapsed: Duration,
}

/// The three documents of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub faq: Document,
    pub product: Document,
    pub comparison: Document,
    pub steps: Vec<StepReport>,
    pub elapsed: Duration,
}

impl PipelineOutput {
    /// Documents in page type order.
    pub fn documents(&self) -> [&Document; 3] {
        [&self.faq, &self.product, &self.comparison]
    }
}

/// A validated step plan.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<StepDef>,
}

impl Pipeline {
    /// Pipeline with the default nine-step plan.
    pub fn new() -> Result<Self> {
        Self::with_steps(DEFAULT_PLAN.to_vec())
    }

    /// Pipeline with a custom plan, validated up front.
    pub fn with_steps(steps: Vec<StepDef>) -> Result<Self> {
        validate_plan(&steps)?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[StepDef] {
        &self.steps
    }

    /// Execute every step in order against `raw`.
    ///
    /// The first failing step aborts the run; the returned error names it and
    /// wraps the violated contract.
    #[instrument(skip_all, fields(steps = self.steps.len()))]
    pub fn run(&self, raw: &Value, progress: &dyn ProgressReporter) -> Result<PipelineOutput> {
        let start = Instant::now();
        let mut state = RunState::new();
        let mut reports = Vec::with_capacity(self.steps.len());

        info!("starting pipeline run");

        for (index, step) in self.steps.iter().enumerate() {
            progress.step(step.id, index + 1, self.steps.len());
            let step_start = Instant::now();

            let key = match execute(step, raw, &mut state) {
                Ok(key) => key,
                Err(err) => {
                    error!(step = %step.id, error = %err, "step failed");
                    progress.failed(step.id, &err);
                    return Err(err.in_step(step.id.as_str()));
                }
            };

            let elapsed = step_start.elapsed();
            info!(
                step = %step.id,
                key = %key,
                elapsed_us = elapsed.as_micros(),
                "step complete"
            );
            reports.push(StepReport {
                step: step.id,
                key,
                elapsed,
            });
        }

        let output = PipelineOutput {
            faq: take_document(&state, PageType::Faq)?,
            product: take_document(&state, PageType::Product)?,
            comparison: take_document(&state, PageType::Comparison)?,
            steps: reports,
            elapsed: start.elapsed(),
        };

        progress.done(&output);

        info!(
            steps = output.steps.len(),
            elapsed_ms = output.elapsed.as_millis(),
            "pipeline run complete"
        );

        Ok(output)
    }
}

/// Run the default pipeline without progress reporting.
pub fn run_pipeline(raw: &Value) -> Result<PipelineOutput> {
    Pipeline::new()?.run(raw, &SilentProgress)
}

fn execute(step: &StepDef, raw: &Value, state: &mut RunState) -> Result<StateKey> {
    let entry = (step.run)(&StepInput { raw, state: &*state })?;
    state.insert(entry)
}

fn take_document(state: &RunState, page_type: PageType) -> Result<Document> {
    state
        .document(page_type)
        .cloned()
        .ok_or_else(|| {
            PageforgeError::missing("pipeline", StateKey::Document(page_type).to_string())
        })
}
