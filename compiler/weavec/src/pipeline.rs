//! The end-to-end run: dump text in, creator tree and diagnostics out.

use std::path::Path;

use weave_bind::{CreatorTree, DependencyManager, FactoryOutput, TypesDatabase};
use weave_diagnostic::Diagnostic;
use weave_ir::DeclarationGraph;
use weave_parse::patcher::{self, PatchReport};
use weave_parse::{linker, parse_records, scanner};

use crate::{GeneratorConfig, PipelineError};

/// Everything one run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    pub graph: DeclarationGraph,
    pub patch: PatchReport,
    pub tree: CreatorTree,
    pub diagnostics: Vec<Diagnostic>,
    pub types_db: TypesDatabase,
    pub dependencies: DependencyManager,
}

impl PipelineOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Runs the stages in order with one configuration.
///
/// A pipeline holds no per-run state; [`Pipeline::run`] can be called any
/// number of times and each call starts from scratch.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: GeneratorConfig,
}

impl Pipeline {
    pub fn new(config: GeneratorConfig) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Parse, scan, link and patch.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build_graph(&self, text: &str) -> Result<(DeclarationGraph, PatchReport), PipelineError> {
        let records = parse_records(text)?;
        let tables = scanner::scan(&records)?;
        let mut graph = linker::link(&tables)?;
        let patch = patcher::patch(&mut graph);
        tracing::debug!(
            records = records.len(),
            decls = graph.decl_count(),
            types = graph.type_count(),
            defaults_rewritten = patch.defaults_rewritten,
            operators_renamed = patch.operators_renamed,
            "built declaration graph"
        );
        Ok((graph, patch))
    }

    /// Build the creator tree for an already built graph.
    #[tracing::instrument(level = "debug", skip_all, fields(module = %self.config.module_name))]
    pub fn generate(&self, graph: &DeclarationGraph) -> Result<FactoryOutput, PipelineError> {
        let annotations = self.config.resolve_annotations(graph)?;
        let output = weave_bind::generate(graph, &annotations, &self.config.factory_config());
        tracing::debug!(
            creators = output.tree.len(),
            diagnostics = output.diagnostics.len(),
            "generated creator tree"
        );
        Ok(output)
    }

    pub fn run(&self, text: &str) -> Result<PipelineOutput, PipelineError> {
        let (graph, patch) = self.build_graph(text)?;
        let FactoryOutput {
            tree,
            diagnostics,
            types_db,
            dependencies,
        } = self.generate(&graph)?;
        Ok(PipelineOutput {
            graph,
            patch,
            tree,
            diagnostics,
            types_db,
            dependencies,
        })
    }

    pub fn run_file(&self, path: &Path) -> Result<PipelineOutput, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.run(&text)
    }
}

/// Read a [`GeneratorConfig`] from a JSON file.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    GeneratorConfig::from_json(&text)
}
