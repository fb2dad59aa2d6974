//! Core generation engine for pageforge.
//!
//! Ties the content blocks together into the nine-step pipeline: parse the
//! product, generate questions and comparison data, resolve a strategy per
//! page type, render each page, and write the resulting documents.

pub mod assembler;
pub mod comparison;
pub mod pipeline;
pub mod questions;
pub mod renderer;
pub mod state;
pub mod strategy;

pub use assembler::{WrittenDocument, to_json, write_documents, write_outputs};
pub use comparison::{ComparisonData, Dimension, generate_comparison};
pub use pipeline::{
    DEFAULT_PLAN, Pipeline, PipelineOutput, ProgressReporter, SilentProgress, StepDef, StepId,
    StepInput, StepReport, run_pipeline, validate_plan,
};
pub use questions::{MIN_GENERATED_QUESTIONS, generate_questions};
pub use renderer::{Document, render};
pub use state::{RunState, StateEntry, StateKey};
pub use strategy::{MIN_FAQ_QUESTIONS, Placement, Slot, Strategy, Subject, resolve, strategy_for};
