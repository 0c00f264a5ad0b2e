//! Generator configuration.
//!
//! A [`GeneratorConfig`] is either built in code with the `with_*` methods
//! or read from a JSON file. Annotations are keyed by a declaration's full
//! name (`::geo::Point`); every declaration with that name receives them,
//! so one entry covers a whole overload set.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use weave_bind::{Annotations, DeclAnnotations, FactoryConfig};
use weave_ir::{DeclId, DeclarationGraph};

use crate::PipelineError;

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub module_name: String,
    pub smart_ptrs: Vec<String>,
    pub max_arity: usize,
    pub include_vars_in_sort: bool,
    pub exclude_unresolved_policies: bool,
    pub enable_containers: bool,
    /// Maximum diagnostics reported (0 = unlimited).
    pub diagnostic_limit: usize,
    pub annotations: BTreeMap<String, DeclAnnotations>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let factory = FactoryConfig::default();
        GeneratorConfig {
            module_name: factory.module_name,
            smart_ptrs: factory.smart_ptrs,
            max_arity: factory.max_arity,
            include_vars_in_sort: factory.include_vars_in_sort,
            exclude_unresolved_policies: factory.exclude_unresolved_policies,
            enable_containers: factory.enable_containers,
            diagnostic_limit: factory.diagnostic_limit,
            annotations: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    #[must_use]
    pub fn with_smart_ptrs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.smart_ptrs = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_max_arity(mut self, max_arity: usize) -> Self {
        self.max_arity = max_arity;
        self
    }

    #[must_use]
    pub fn with_vars_in_sort(mut self, include: bool) -> Self {
        self.include_vars_in_sort = include;
        self
    }

    #[must_use]
    pub fn with_unresolved_policies_excluded(mut self, exclude: bool) -> Self {
        self.exclude_unresolved_policies = exclude;
        self
    }

    #[must_use]
    pub fn with_containers(mut self, enable: bool) -> Self {
        self.enable_containers = enable;
        self
    }

    #[must_use]
    pub fn with_diagnostic_limit(mut self, limit: usize) -> Self {
        self.diagnostic_limit = limit;
        self
    }

    /// Annotate every declaration named `full_name`.
    #[must_use]
    pub fn annotate(mut self, full_name: impl Into<String>, entry: DeclAnnotations) -> Self {
        self.annotations.insert(full_name.into(), entry);
        self
    }

    pub fn factory_config(&self) -> FactoryConfig {
        FactoryConfig {
            module_name: self.module_name.clone(),
            smart_ptrs: self.smart_ptrs.clone(),
            max_arity: self.max_arity,
            include_vars_in_sort: self.include_vars_in_sort,
            exclude_unresolved_policies: self.exclude_unresolved_policies,
            enable_containers: self.enable_containers,
            diagnostic_limit: self.diagnostic_limit,
        }
    }

    /// Bind the name-keyed annotations to the declarations of `graph`.
    pub fn resolve_annotations(&self, graph: &DeclarationGraph) -> Result<Annotations, PipelineError> {
        let mut annotations = Annotations::new();
        if self.annotations.is_empty() {
            return Ok(annotations);
        }

        let mut by_name: FxHashMap<String, Vec<DeclId>> = FxHashMap::default();
        for id in graph.decl_ids() {
            by_name.entry(graph.full_name(id)).or_default().push(id);
        }
        for (name, entry) in &self.annotations {
            let Some(decls) = by_name.get(name) else {
                return Err(PipelineError::UnknownDeclaration(name.clone()));
            };
            for decl in decls {
                *annotations.annotate(*decl) = entry.clone();
            }
            tracing::debug!(declaration = %name, matched = decls.len(), "applied annotations");
        }
        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests can panic")]

    use pretty_assertions::assert_eq;
    use weave_bind::{CallPolicy, ReturnValueKind};

    use super::*;

    #[test]
    fn test_default_matches_factory() {
        assert_eq!(
            GeneratorConfig::default().factory_config(),
            FactoryConfig::default()
        );
    }

    #[test]
    fn test_builder() {
        let config = GeneratorConfig::default()
            .with_module_name("geometry")
            .with_smart_ptrs(["shared_ptr"])
            .with_max_arity(4)
            .with_containers(false);
        let factory = config.factory_config();
        assert_eq!(factory.module_name, "geometry");
        assert_eq!(factory.smart_ptrs, vec!["shared_ptr".to_owned()]);
        assert_eq!(factory.max_arity, 4);
        assert!(!factory.enable_containers);
    }

    #[test]
    fn test_from_json() {
        let config = GeneratorConfig::from_json(
            r#"{
                "module_name": "shapes",
                "include_vars_in_sort": true,
                "annotations": {
                    "::make": {"call_policies": {"kind": "return_value", "value": "manage_new_object"}},
                    "::Hidden": {"ignore": true}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.module_name, "shapes");
        assert!(config.include_vars_in_sort);
        assert_eq!(config.max_arity, FactoryConfig::default().max_arity);
        assert_eq!(
            config.annotations["::make"].call_policies,
            Some(CallPolicy::return_value(ReturnValueKind::ManageNewObject))
        );
        assert!(config.annotations["::Hidden"].ignore);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let error = GeneratorConfig::from_json(r#"{"module": "shapes"}"#).unwrap_err();
        assert!(matches!(error, PipelineError::Config(_)));
    }

    #[test]
    fn test_resolve_annotations() {
        let graph = weave_parse::build_graph(
            r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "FundamentalType", "id": "_2", "name": "void"}
{"kind": "FundamentalType", "id": "_3", "name": "int"}
{"kind": "Function", "id": "_4", "name": "f", "returns": "_2", "context": "_1"}
{"kind": "Function", "id": "_5", "name": "f", "returns": "_2", "context": "_1"}
{"kind": "Argument", "name": "x", "type": "_3"}
"#,
        )
        .unwrap();
        let ignored = DeclAnnotations {
            ignore: true,
            ..DeclAnnotations::default()
        };
        let config = GeneratorConfig::default().annotate("::f", ignored);
        let annotations = config.resolve_annotations(&graph).unwrap();
        assert!(annotations.is_ignored(graph.lookup("_4").unwrap()));
        assert!(annotations.is_ignored(graph.lookup("_5").unwrap()));

        let config = GeneratorConfig::default().annotate("::g", DeclAnnotations::default());
        assert!(matches!(
            config.resolve_annotations(&graph),
            Err(PipelineError::UnknownDeclaration(name)) if name == "::g"
        ));
    }
}
