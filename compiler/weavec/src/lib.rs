//! Driver for the Weave binding generator.
//!
//! Reads a JSON-lines introspection dump, builds the declaration graph and
//! runs the binding stages over it. The result is a [`CreatorTree`]
//! together with the diagnostics produced along the way.
//!
//! ```text
//! dump.jsonl ──▶ parse ──▶ scan ──▶ link ──▶ patch ──▶ generate ──▶ tree
//!                                                 ▲
//!                                   GeneratorConfig (annotations)
//! ```
//!
//! [`CreatorTree`]: weave_bind::CreatorTree

mod config;
mod error;
mod pipeline;
pub mod report;
pub mod tracing_setup;

pub use config::GeneratorConfig;
pub use error::PipelineError;
pub use pipeline::{load_config, Pipeline, PipelineOutput};
