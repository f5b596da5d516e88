use crate::tables::{Align, Markup, Table};

/// GitHub-flavored Markdown cell markup.
pub struct Markdown;

impl Markup for Markdown {
    fn placeholder(&self) -> &'static str {
        "n/a"
    }

    fn checkmark(&self) -> &'static str {
        "✓"
    }

    fn percent(&self, value: &str) -> String {
        format!("{value}%")
    }

    fn bold(&self, value: &str) -> String {
        format!("**{value}**")
    }

    fn escape(&self, value: &str) -> String {
        value.replace('|', "\\|")
    }
}

/// Format a table as a Markdown pipe table under a bold caption.
pub fn format_table(table: &Table) -> String {
    let mut out = String::new();

    out.push_str(&format!("**{}**\n\n", table.caption));
    out.push_str(&format!("| {} |\n", table.header.join(" | ")));

    let rule: Vec<&str> = table
        .align
        .iter()
        .map(|a| match a {
            Align::Left => ":---",
            Align::Right => "---:",
            Align::Center => ":---:",
        })
        .collect();
    out.push_str(&format!("|{}|\n", rule.join("|")));

    for row in table.sections.iter().flatten() {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{proof_table, reuse_table, usage_matrix_table};
    use proofmetrics_core::config::ApplicationConfig;
    use proofmetrics_core::metrics::{ApplicationRecord, CollectionResult};
    use proofmetrics_core::types::FileMetrics;

    fn sample_result() -> CollectionResult {
        let mut kanban = ApplicationRecord::new(&ApplicationConfig::new(
            "Kanban",
            "kanban",
            &["Replay", "EffectStateMachine"],
        ));
        kanban.add_file(
            "KanbanDomain.dfy",
            FileMetrics {
                total_lines: 30,
                spec_lines: 20,
                proof_lines: 10,
            },
            0.0,
        );
        kanban.component_loc = 90;

        let proofs_only = {
            let mut app =
                ApplicationRecord::new(&ApplicationConfig::new("AllProof", "all-proof", &[]));
            app.add_file(
                "Lemmas.dfy",
                FileMetrics {
                    total_lines: 4,
                    spec_lines: 0,
                    proof_lines: 4,
                },
                0.0,
            );
            app
        };

        let mut result = CollectionResult {
            usage_matrix: vec!["Replay".to_string(), "Authority".to_string()],
            ..Default::default()
        };
        result.applications.insert("Kanban".to_string(), kanban);
        result.applications.insert("AllProof".to_string(), proofs_only);
        result
    }

    #[test]
    fn test_reuse_table_markdown() {
        let out = format_table(&reuse_table(&sample_result(), &Markdown));
        let expected = "\
**Kernel Reuse: Generic vs Domain-Specific Code**

| Application | Kernel LOC | Domain LOC | Reuse % |
|:---|---:|---:|---:|
| AllProof | 0 | 4 | 0.0% |
| Kanban | 90 | 30 | 75.0% |
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_proof_ratio_placeholder() {
        let out = format_table(&proof_table(&sample_result(), &Markdown));
        assert!(out.contains("| Kernels | 0 | 0 | 0 | n/a |"));
        assert!(out.contains("| AllProof | 0 | 4 | 4 | n/a |"));
        assert!(out.contains("| Kanban | 20 | 10 | 30 | 0.5 |"));
    }

    #[test]
    fn test_usage_matrix_marks() {
        let out = format_table(&usage_matrix_table(&sample_result(), &Markdown));
        assert!(out.contains("| Application | Replay | Authority |"));
        assert!(out.contains("|:---|:---:|:---:|"));
        assert!(out.contains("| Kanban | ✓ |  |"));
        assert!(out.contains("| AllProof |  |  |"));
    }
}
