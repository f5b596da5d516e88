use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ApplicationConfig;
use crate::types::{ratio, FileMetrics, IntegrationLines};

/// Canonical size of one registered component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMetrics {
    pub name: String,
    pub file: String,
    pub metrics: FileMetrics,
    pub verify_time: f64,
}

/// All registered components, in registry order, with their sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub components: Vec<ComponentMetrics>,
    pub totals: FileMetrics,
    pub verify_time: f64,
}

impl ComponentSummary {
    pub fn from_components(components: Vec<ComponentMetrics>) -> Self {
        let totals = components.iter().map(|c| c.metrics).sum();
        let verify_time = components.iter().map(|c| c.verify_time).sum();
        Self {
            components,
            totals,
            verify_time,
        }
    }

    /// Total lines of the component registered under `name`.
    pub fn total_for(&self, name: &str) -> Option<usize> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.metrics.total_lines)
    }

    pub fn proof_spec_ratio(&self) -> Option<f64> {
        self.totals.proof_spec_ratio()
    }
}

/// Everything measured for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub name: String,
    pub directory: String,
    pub components: Vec<String>,
    /// Sum over the application's own verified files.
    pub dafny: FileMetrics,
    pub files: BTreeMap<String, FileMetrics>,
    pub integration: IntegrationLines,
    /// Sum of the referenced components' totals. Shared components count
    /// once per application that uses them.
    pub component_loc: usize,
    pub domain_loc: usize,
    pub verify_time: f64,
}

impl ApplicationRecord {
    pub fn new(config: &ApplicationConfig) -> Self {
        Self {
            name: config.name.clone(),
            directory: config.directory.clone(),
            components: config.components.clone(),
            dafny: FileMetrics::default(),
            files: BTreeMap::new(),
            integration: IntegrationLines::default(),
            component_loc: 0,
            domain_loc: 0,
            verify_time: 0.0,
        }
    }

    /// Fold one of the application's own files into its totals.
    pub fn add_file(&mut self, file_name: &str, metrics: FileMetrics, verify_secs: f64) {
        self.files.insert(file_name.to_string(), metrics);
        self.dafny += metrics;
        self.domain_loc += metrics.total_lines;
        self.verify_time += verify_secs;
    }

    /// Add the sizes of the declared components, looked up in `summary`.
    /// Names missing from the registry contribute nothing.
    pub fn add_component_loc(&mut self, summary: &ComponentSummary) {
        for name in &self.components {
            match summary.total_for(name) {
                Some(total) => self.component_loc += total,
                None => log::warn!(
                    "{} depends on unregistered component '{name}', counting 0 lines",
                    self.name
                ),
            }
        }
    }

    pub fn uses_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c == name)
    }

    /// Share of counted verified code coming from components, in percent.
    pub fn reuse_percentage(&self) -> Option<f64> {
        reuse_percentage(self.component_loc, self.domain_loc)
    }

    pub fn proof_spec_ratio(&self) -> Option<f64> {
        self.dafny.proof_spec_ratio()
    }
}

/// `component_loc / (component_loc + domain_loc) * 100`, `None` when both are zero.
pub fn reuse_percentage(component_loc: usize, domain_loc: usize) -> Option<f64> {
    ratio(component_loc, component_loc + domain_loc).map(|r| r * 100.0)
}

/// Output of one collection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionResult {
    pub components: ComponentSummary,
    /// Keyed by name, so iteration is alphabetical.
    pub applications: BTreeMap<String, ApplicationRecord>,
    pub usage_matrix: Vec<String>,
    pub verification_ran: bool,
}

impl CollectionResult {
    /// Components plus every application.
    pub fn total_verify_time(&self) -> f64 {
        self.components.verify_time
            + self
                .applications
                .values()
                .map(|a| a.verify_time)
                .sum::<f64>()
    }
}
