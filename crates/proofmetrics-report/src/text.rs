use colored::Colorize;

use proofmetrics_core::metrics::{ApplicationRecord, CollectionResult};

use crate::format::{format_count, format_decimal, format_optional};

/// Format a collection run for terminal output.
pub fn format_summary(result: &CollectionResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "Proofmetrics - Verification Metrics".bold()));
    out.push_str(&format!("{}\n", "=".repeat(40)));

    // Kernels
    let kernels = &result.components;
    out.push_str(&format!(
        "\n{} ({} registered)\n{}\n",
        "Kernels".bold(),
        kernels.components.len(),
        "-".repeat(40)
    ));
    for c in &kernels.components {
        out.push_str(&format!(
            "  {:<24} {:>7} lines  spec {:>6}  proof {:>6}\n",
            c.name,
            format_count(c.metrics.total_lines),
            format_count(c.metrics.spec_lines),
            format_count(c.metrics.proof_lines),
        ));
    }
    out.push_str(&format!(
        "  {:<24} {:>7} lines  proof/spec {}\n",
        "Total".bold(),
        format_count(kernels.totals.total_lines),
        format_optional(kernels.proof_spec_ratio(), "n/a"),
    ));

    // Applications
    out.push_str(&format!(
        "\n{} ({})\n{}\n",
        "Applications".bold(),
        result.applications.len(),
        "-".repeat(40)
    ));
    if result.applications.is_empty() {
        out.push_str(&format!("  {}\n", "No applications configured".yellow()));
    }
    for app in result.applications.values() {
        out.push_str(&format_application(app));
    }

    // Timing
    if result.verification_ran {
        out.push_str(&format!(
            "\n{}: {}s total ({}s kernels)\n",
            "Verification".bold(),
            format_decimal(result.total_verify_time()),
            format_decimal(kernels.verify_time),
        ));
    } else {
        out.push_str(&format!("\n{}\n", "Verification skipped".dimmed()));
    }

    out.push('\n');
    out
}

fn format_application(app: &ApplicationRecord) -> String {
    let mut out = String::new();

    let reuse = match app.reuse_percentage() {
        Some(pct) => {
            let s = format!("{}%", format_decimal(pct));
            if pct >= 50.0 {
                s.green()
            } else {
                s.yellow()
            }
        }
        None => "n/a".dimmed(),
    };

    out.push_str(&format!("\n  {}  reuse {}\n", app.name.bold(), reuse));
    out.push_str(&format!(
        "    Dafny: {} lines (spec {}, proof {}, proof/spec {})\n",
        format_count(app.dafny.total_lines),
        format_count(app.dafny.spec_lines),
        format_count(app.dafny.proof_lines),
        format_optional(app.proof_spec_ratio(), "n/a"),
    ));
    out.push_str(&format!(
        "    Kernels: {} lines from {}\n",
        format_count(app.component_loc),
        if app.components.is_empty() {
            "none".to_string()
        } else {
            app.components.join(", ")
        }
    ));
    if app.integration.handwritten > 0 || app.integration.generated > 0 {
        out.push_str(&format!(
            "    Integration: {} hand-written, {} generated\n",
            format_count(app.integration.handwritten),
            format_count(app.integration.generated),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmetrics_core::config::ApplicationConfig;
    use proofmetrics_core::types::FileMetrics;

    fn sample_result(verification_ran: bool) -> CollectionResult {
        let mut app = ApplicationRecord::new(&ApplicationConfig::new(
            "Counter",
            "counter",
            &["Replay"],
        ));
        app.add_file(
            "CounterDomain.dfy",
            FileMetrics {
                total_lines: 1500,
                spec_lines: 1000,
                proof_lines: 500,
            },
            2.0,
        );
        app.component_loc = 500;
        app.integration.handwritten = 42;

        let mut result = CollectionResult {
            verification_ran,
            ..Default::default()
        };
        result.applications.insert("Counter".to_string(), app);
        result
    }

    #[test]
    fn test_summary_contains_application() {
        colored::control::set_override(false);
        let out = format_summary(&sample_result(true));
        assert!(out.contains("Counter  reuse 25.0%"));
        assert!(out.contains("Dafny: 1,500 lines (spec 1,000, proof 500, proof/spec 0.5)"));
        assert!(out.contains("Kernels: 500 lines from Replay"));
        assert!(out.contains("Integration: 42 hand-written, 0 generated"));
        assert!(out.contains("Verification: 2.0s total (0.0s kernels)"));
    }

    #[test]
    fn test_summary_notes_skipped_verification() {
        colored::control::set_override(false);
        let out = format_summary(&sample_result(false));
        assert!(out.contains("Verification skipped"));
        assert!(!out.contains("s total"));
    }
}
