use strum::Display;
use tfmodgen_core::ResolverStats;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub variables_generated: usize,
  pub validations_generated: usize,
  pub secrets_detected: usize,
  pub locals_generated: usize,
  pub files_generated: usize,
  pub shapes_resolved: usize,
  pub shape_cache_hits: usize,
  pub schema_nodes: usize,
  pub documents_loaded: usize,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_variable(&mut self, validated: bool) {
    self.variables_generated += 1;
    if validated {
      self.validations_generated += 1;
    }
  }

  pub fn record_secrets(&mut self, count: usize) {
    self.secrets_detected += count;
  }

  pub fn record_local(&mut self) {
    self.locals_generated += 1;
  }

  pub fn record_file(&mut self) {
    self.files_generated += 1;
  }

  pub fn record_resolver(&mut self, stats: ResolverStats) {
    self.shapes_resolved += stats.computed;
    self.shape_cache_hits += stats.cache_hits;
  }

  pub fn record_graph(&mut self, nodes: usize, documents: usize) {
    self.schema_nodes = nodes;
    self.documents_loaded = documents;
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "Could not resolve reference '{reference}'; treating it as untyped")]
  UnresolvedReference { reference: String },
  #[strum(to_string = "Could not load '{source}': {error}")]
  DocumentUnavailable { source: String, error: String },
  #[strum(to_string = "Schema '{schema}' requires '{property}' but never declares it")]
  UndeclaredRequired { schema: String, property: String },
  #[strum(to_string = "Enum constraints on '{variable}' have no common value; skipping enum validation")]
  EmptyEnumIntersection { variable: String },
  #[strum(to_string = "Root path '{path}' is read-only; generating a module without a body")]
  ReadOnlyRoot { path: String },
}

impl GenerationWarning {
  /// Warnings that mean part of the input was ignored rather than just flagged.
  pub fn is_degraded_input(&self) -> bool {
    matches!(
      self,
      Self::UnresolvedReference { .. } | Self::DocumentUnavailable { .. } | Self::ReadOnlyRoot { .. }
    )
  }
}
