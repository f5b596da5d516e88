use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::analyzer::LineClassifier;
use crate::config::{ApplicationConfig, Config};
use crate::integration::IntegrationClassifier;
use crate::metrics::{ApplicationRecord, CollectionResult, ComponentMetrics, ComponentSummary};
use crate::types::FileMetrics;
use crate::verify::{self, Verifier};

/// Sequential collection run: components first, then applications.
///
/// The registries come from `Config`; nothing is read from ambient state.
pub struct MetricsPipeline {
    classifier: Box<dyn LineClassifier>,
    config: Config,
    integration: IntegrationClassifier,
}

impl MetricsPipeline {
    pub fn new(classifier: Box<dyn LineClassifier>, config: Config) -> Self {
        let integration = IntegrationClassifier::new(&config.integration);
        Self {
            classifier,
            config,
            integration,
        }
    }

    /// Run a full collection under `root`. With `verifier` set, every verified
    /// file is also timed.
    pub fn collect(
        &self,
        root: &Path,
        mut verifier: Option<&mut dyn Verifier>,
    ) -> CollectionResult {
        let verification_ran = verifier.is_some();

        log::info!("Analyzing components...");
        let components = self.collect_components(root, &mut verifier);
        log::info!(
            "  Total: {} lines ({} spec, {} proof)",
            components.totals.total_lines,
            components.totals.spec_lines,
            components.totals.proof_lines
        );
        if verification_ran {
            log::info!("  Verification time: {:.1}s", components.verify_time);
        }

        let mut result = CollectionResult {
            components,
            usage_matrix: self.config.usage_matrix_columns(),
            verification_ran,
            ..Default::default()
        };

        for app in &self.config.applications {
            log::info!("Analyzing {}...", app.name);
            let record = self.collect_application(root, app, &result.components, &mut verifier);
            log::info!(
                "  Verified: {} lines ({} spec, {} proof)",
                record.dafny.total_lines,
                record.dafny.spec_lines,
                record.dafny.proof_lines
            );
            log::info!(
                "  Integration: {} lines, generated: {} lines",
                record.integration.handwritten,
                record.integration.generated
            );
            if verification_ran {
                log::info!("  Verification time: {:.1}s", record.verify_time);
            }
            if result
                .applications
                .insert(app.name.clone(), record)
                .is_some()
            {
                log::warn!(
                    "application '{}' is registered twice; keeping the last",
                    app.name
                );
            }
        }

        result
    }

    /// Classify every registered component file once.
    pub fn collect_components(
        &self,
        root: &Path,
        verifier: &mut Option<&mut dyn Verifier>,
    ) -> ComponentSummary {
        let dir = root.join(&self.config.components.directory);
        let components = self
            .config
            .components
            .entries
            .iter()
            .map(|entry| {
                let path = dir.join(&entry.file);
                let metrics = self.classify_file(&path);
                let verify_time = if path.is_file() {
                    time_file(verifier, &path)
                } else {
                    0.0
                };
                ComponentMetrics {
                    name: entry.name(),
                    file: entry.file.clone(),
                    metrics,
                    verify_time,
                }
            })
            .collect();
        ComponentSummary::from_components(components)
    }

    /// Build one application's record from its own files and its component references.
    pub fn collect_application(
        &self,
        root: &Path,
        app: &ApplicationConfig,
        components: &ComponentSummary,
        verifier: &mut Option<&mut dyn Verifier>,
    ) -> ApplicationRecord {
        let app_dir = root.join(&app.directory);
        let mut record = ApplicationRecord::new(app);

        for path in self.source_files(&app_dir) {
            let metrics = self.classify_file(&path);
            let verify_secs = time_file(verifier, &path);
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            record.add_file(&file_name, metrics, verify_secs);
        }

        record.integration = self.integration.count(&app_dir);
        record.add_component_loc(components);
        record
    }

    /// Verified source files directly inside `dir`, sorted by name.
    pub fn source_files(&self, dir: &Path) -> Vec<PathBuf> {
        if !dir.is_dir() {
            log::warn!("directory {} not found, skipping", dir.display());
            return Vec::new();
        }
        let extensions = self.classifier.file_extensions();
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| extensions.iter().any(|x| ext == *x))
            })
            .map(|e| e.into_path())
            .collect()
    }

    /// Classify one file; unreadable files count as empty.
    pub fn classify_file(&self, path: &Path) -> FileMetrics {
        match std::fs::read(path) {
            Ok(bytes) => {
                let metrics = self.classifier.classify(&String::from_utf8_lossy(&bytes));
                log::debug!(
                    "{}: {} lines ({} spec, {} proof)",
                    path.display(),
                    metrics.total_lines,
                    metrics.spec_lines,
                    metrics.proof_lines
                );
                metrics
            }
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
                FileMetrics::default()
            }
        }
    }
}

fn time_file(verifier: &mut Option<&mut dyn Verifier>, path: &Path) -> f64 {
    match verifier {
        Some(v) => verify::sample(&mut **v, path),
        None => 0.0,
    }
}
