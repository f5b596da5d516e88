use crate::types::{FileMetrics, LineKind};

/// Trait that each verified-language line classifier must implement.
pub trait LineClassifier {
    /// Language name (e.g., "dafny")
    fn language(&self) -> &'static str;

    /// File extensions this classifier handles (e.g., &["dfy"])
    fn file_extensions(&self) -> &[&str];

    /// Tag every physical line of `content` as spec or proof, in order.
    fn classify_lines(&self, content: &str) -> Vec<LineKind>;

    /// Per-file counts derived from [`LineClassifier::classify_lines`].
    fn classify(&self, content: &str) -> FileMetrics {
        let mut metrics = FileMetrics::default();
        for kind in self.classify_lines(content) {
            metrics.record(kind);
        }
        metrics
    }
}
