use crate::tables::{Align, Markup, Table};

/// LaTeX (booktabs) cell markup.
pub struct Latex;

impl Markup for Latex {
    fn placeholder(&self) -> &'static str {
        "---"
    }

    fn checkmark(&self) -> &'static str {
        r"\checkmark"
    }

    fn percent(&self, value: &str) -> String {
        format!(r"{value}\%")
    }

    fn bold(&self, value: &str) -> String {
        format!(r"\textbf{{{value}}}")
    }

    fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                    out.push('\\');
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
        out
    }
}

/// Render a table as a floating LaTeX `table` environment.
pub fn format_table(table: &Table) -> String {
    let spec: String = table
        .align
        .iter()
        .map(|a| match a {
            Align::Left => 'l',
            Align::Right => 'r',
            Align::Center => 'c',
        })
        .collect();

    let mut lines = vec![
        r"\begin{table}[t]".to_string(),
        r"\centering".to_string(),
        format!(r"\caption{{{}}}", table.caption),
        format!(r"\label{{{}}}", table.label),
        format!(r"\begin{{tabular}}{{{spec}}}"),
        r"\toprule".to_string(),
        format!(r"{} \\", table.header.join(" & ")),
    ];

    for section in &table.sections {
        lines.push(r"\midrule".to_string());
        for row in section {
            lines.push(format!(r"{} \\", row.join(" & ")));
        }
    }

    lines.push(r"\bottomrule".to_string());
    lines.push(r"\end{tabular}".to_string());
    lines.push(r"\end{table}".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{loc_table, reuse_table, timing_table};
    use proofmetrics_core::config::ApplicationConfig;
    use proofmetrics_core::metrics::{
        ApplicationRecord, CollectionResult, ComponentMetrics, ComponentSummary,
    };
    use proofmetrics_core::types::FileMetrics;

    fn sample_result() -> CollectionResult {
        let components = ComponentSummary::from_components(vec![ComponentMetrics {
            name: "Replay".to_string(),
            file: "Replay.dfy".to_string(),
            metrics: FileMetrics {
                total_lines: 1200,
                spec_lines: 700,
                proof_lines: 500,
            },
            verify_time: 12.3,
        }]);
        let mut counter =
            ApplicationRecord::new(&ApplicationConfig::new("Counter", "counter", &["Replay"]));
        counter.add_file(
            "CounterDomain.dfy",
            FileMetrics {
                total_lines: 400,
                spec_lines: 300,
                proof_lines: 100,
            },
            3.0,
        );
        counter.add_component_loc(&components);
        counter.integration.handwritten = 2500;

        let empty = ApplicationRecord::new(&ApplicationConfig::new("Empty_App", "empty", &[]));

        let mut result = CollectionResult {
            components,
            usage_matrix: vec!["Replay".to_string()],
            verification_ran: true,
            ..Default::default()
        };
        result.applications.insert("Counter".to_string(), counter);
        result.applications.insert("Empty_App".to_string(), empty);
        result
    }

    #[test]
    fn test_loc_table_layout() {
        let out = format_table(&loc_table(&sample_result(), &Latex));
        let expected = r"\begin{table}[t]
\centering
\caption{Lines of Code by Component}
\label{tab:loc}
\begin{tabular}{lrrr}
\toprule
Component & Verified (Dafny) & Integration & Generated JS \\
\midrule
Kernels (shared) & 1,200 & --- & --- \\
\midrule
Counter & 400 & 2,500 & --- \\
Empty\_App & 0 & --- & --- \\
\bottomrule
\end{tabular}
\end{table}";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_reuse_table_placeholder() {
        let out = format_table(&reuse_table(&sample_result(), &Latex));
        assert!(out.contains(r"Application & Kernel LOC & Domain LOC & Reuse \% \\"));
        assert!(out.contains(r"Counter & 1,200 & 400 & 75.0\% \\"));
        assert!(out.contains(r"Empty\_App & 0 & 0 & --- \\"));
    }

    #[test]
    fn test_timing_total_row() {
        let out = format_table(&timing_table(&sample_result(), &Latex));
        assert!(out.contains(r"Kernels & 12.3 \\"));
        assert!(out.contains(r"Counter & 3.0 \\"));
        assert!(out.contains(r"\textbf{Total} & \textbf{15.3} \\"));
    }

    #[test]
    fn test_escape_specials() {
        assert_eq!(Latex.escape("R&D_50%"), r"R\&D\_50\%");
    }
}
