use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use crate::config::IntegrationConfig;
use crate::types::{IntegrationKind, IntegrationLines};

/// Buckets integration code (the non-verified glue around generated code)
/// into hand-written and generated files using glob patterns.
pub struct IntegrationClassifier {
    source_dir: String,
    extensions: Vec<String>,
    generated: GlobSet,
    handwritten_overrides: GlobSet,
    extra_generated: GlobSet,
}

fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => log::warn!("ignoring invalid glob '{pattern}': {e}"),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Dependency and hidden directories below the walk root are never descended into.
fn is_pruned(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl IntegrationClassifier {
    pub fn new(config: &IntegrationConfig) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            extensions: config.extensions.clone(),
            generated: build_globset(&config.generated),
            handwritten_overrides: build_globset(&config.handwritten_overrides),
            extra_generated: build_globset(&config.extra_generated),
        }
    }

    /// Classify a path relative to the integration source directory.
    pub fn classify(&self, rel_path: &str) -> IntegrationKind {
        let normalized = rel_path.replace('\\', "/");
        if self.handwritten_overrides.is_match(&normalized) {
            IntegrationKind::Handwritten
        } else if self.generated.is_match(&normalized) {
            IntegrationKind::Generated
        } else {
            IntegrationKind::Handwritten
        }
    }

    fn has_integration_extension(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| ext == e.as_str()))
    }

    /// Count hand-written and generated lines for one application directory.
    pub fn count(&self, app_dir: &Path) -> IntegrationLines {
        let mut lines = IntegrationLines::default();

        let src_dir = app_dir.join(&self.source_dir);
        if src_dir.is_dir() {
            for entry in WalkDir::new(&src_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_pruned(e))
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                if !self.has_integration_extension(path) {
                    continue;
                }
                let rel = normalize(path.strip_prefix(&src_dir).unwrap_or(path));
                let n = count_physical_lines(path);
                let kind = self.classify(&rel);
                log::debug!("{rel}: {n} lines, {kind}");
                match kind {
                    IntegrationKind::Handwritten => lines.handwritten += n,
                    IntegrationKind::Generated => lines.generated += n,
                }
            }
        }

        if app_dir.is_dir() {
            for entry in WalkDir::new(app_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_pruned(e))
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                let rel = normalize(path.strip_prefix(app_dir).unwrap_or(path));
                if self.extra_generated.is_match(&rel) {
                    lines.generated += count_physical_lines(path);
                }
            }
        }

        lines
    }
}

/// Number of physical lines in a file; 0 (with a warning) when unreadable.
pub fn count_physical_lines(path: &Path) -> usize {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).lines().count(),
        Err(e) => {
            log::warn!("could not read {}: {e}", path.display());
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_classifier() -> IntegrationClassifier {
        IntegrationClassifier::new(&IntegrationConfig::default())
    }

    #[test]
    fn test_classify_outside_dafny_dir_is_handwritten() {
        let c = default_classifier();
        assert_eq!(c.classify("App.tsx"), IntegrationKind::Handwritten);
        assert_eq!(c.classify("components/Board.jsx"), IntegrationKind::Handwritten);
    }

    #[test]
    fn test_classify_dafny_dir_is_generated() {
        let c = default_classifier();
        assert_eq!(c.classify("dafny/app.ts"), IntegrationKind::Generated);
        assert_eq!(c.classify("dafny/Counter.cjs"), IntegrationKind::Generated);
        assert_eq!(c.classify("lib/dafny/bundle.js"), IntegrationKind::Generated);
        assert_eq!(c.classify("dafny-bundle.ts"), IntegrationKind::Generated);
    }

    #[test]
    fn test_classify_dafny_suffixed_dir_is_generated() {
        let c = default_classifier();
        assert_eq!(c.classify("xdafny/app.ts"), IntegrationKind::Generated);
        assert_eq!(c.classify("lib/compiled-dafny/Run.js"), IntegrationKind::Generated);
        assert_eq!(c.classify("lib/dafnyish.ts"), IntegrationKind::Handwritten);
    }

    #[test]
    fn test_app_extras_stays_handwritten() {
        let c = default_classifier();
        assert_eq!(
            c.classify("dafny/app-extras.ts"),
            IntegrationKind::Handwritten
        );
    }

    #[test]
    fn test_windows_separators_normalized() {
        let c = default_classifier();
        assert_eq!(c.classify("dafny\\app.ts"), IntegrationKind::Generated);
    }

    #[test]
    fn test_count_application_tree() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path();
        std::fs::create_dir_all(app.join("src/dafny")).unwrap();
        std::fs::create_dir_all(app.join("supabase/functions/dispatch")).unwrap();
        std::fs::write(app.join("src/App.tsx"), "a\nb\nc\n").unwrap();
        std::fs::write(app.join("src/README.md"), "ignored\n").unwrap();
        std::fs::write(app.join("src/dafny/app.ts"), "1\n2\n3\n4\n").unwrap();
        std::fs::write(app.join("src/dafny/app-extras.ts"), "x\n").unwrap();
        std::fs::write(
            app.join("supabase/functions/dispatch/dafny-bundle.ts"),
            "g\ng\n",
        )
        .unwrap();

        let lines = default_classifier().count(app);
        assert_eq!(lines.handwritten, 4);
        assert_eq!(lines.generated, 6);
    }

    #[test]
    fn test_count_skips_node_modules_and_hidden_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path();
        let vendored = app.join("node_modules/pkg/supabase/functions/x");
        std::fs::create_dir_all(&vendored).unwrap();
        std::fs::write(vendored.join("dafny-bundle.ts"), "v\nv\n").unwrap();
        std::fs::create_dir_all(app.join("src/node_modules/lib")).unwrap();
        std::fs::write(app.join("src/node_modules/lib/index.js"), "v\n").unwrap();
        std::fs::create_dir_all(app.join("src/.cache")).unwrap();
        std::fs::write(app.join("src/.cache/chunk.js"), "v\n").unwrap();
        std::fs::write(app.join("src/main.ts"), "m\n").unwrap();

        let lines = default_classifier().count(app);
        assert_eq!(lines.handwritten, 1);
        assert_eq!(lines.generated, 0);
    }

    #[test]
    fn test_count_without_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        let lines = default_classifier().count(dir.path());
        assert_eq!(lines, IntegrationLines::default());
    }

    #[test]
    fn test_count_physical_lines_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(count_physical_lines(&dir.path().join("nope.ts")), 0);
    }
}
