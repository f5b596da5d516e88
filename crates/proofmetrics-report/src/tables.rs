use proofmetrics_core::metrics::CollectionResult;

use crate::format::{format_count, format_decimal, format_optional};

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// Format-specific bits of cell text.
pub trait Markup {
    /// Text for an undefined or empty value.
    fn placeholder(&self) -> &'static str;
    fn checkmark(&self) -> &'static str;
    fn percent(&self, value: &str) -> String;
    fn bold(&self, value: &str) -> String;
    /// Escape free text (names) for the target markup.
    fn escape(&self, value: &str) -> String;
}

/// A rendered-agnostic table: header plus row groups separated by rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Output file name without extension.
    pub name: &'static str,
    pub caption: &'static str,
    pub label: &'static str,
    pub align: Vec<Align>,
    pub header: Vec<String>,
    pub sections: Vec<Vec<Vec<String>>>,
}

fn count_or_placeholder(n: usize, m: &dyn Markup) -> String {
    if n > 0 {
        format_count(n)
    } else {
        m.placeholder().to_string()
    }
}

/// Verified vs integration lines per application, with the shared kernels on top.
pub fn loc_table(result: &CollectionResult, m: &dyn Markup) -> Table {
    let kernels = vec![vec![
        "Kernels (shared)".to_string(),
        format_count(result.components.totals.total_lines),
        m.placeholder().to_string(),
        m.placeholder().to_string(),
    ]];
    let apps = result
        .applications
        .values()
        .map(|app| {
            vec![
                m.escape(&app.name),
                format_count(app.dafny.total_lines),
                count_or_placeholder(app.integration.handwritten, m),
                count_or_placeholder(app.integration.generated, m),
            ]
        })
        .collect();

    Table {
        name: "metrics-loc",
        caption: "Lines of Code by Component",
        label: "tab:loc",
        align: vec![Align::Left, Align::Right, Align::Right, Align::Right],
        header: vec![
            "Component".to_string(),
            "Verified (Dafny)".to_string(),
            "Integration".to_string(),
            "Generated JS".to_string(),
        ],
        sections: vec![kernels, apps],
    }
}

/// Kernel LOC vs domain LOC and the reuse percentage.
pub fn reuse_table(result: &CollectionResult, m: &dyn Markup) -> Table {
    let apps = result
        .applications
        .values()
        .map(|app| {
            let reuse = match app.reuse_percentage() {
                Some(pct) => m.percent(&format_decimal(pct)),
                None => m.placeholder().to_string(),
            };
            vec![
                m.escape(&app.name),
                format_count(app.component_loc),
                format_count(app.domain_loc),
                reuse,
            ]
        })
        .collect();

    Table {
        name: "metrics-reuse",
        caption: "Kernel Reuse: Generic vs Domain-Specific Code",
        label: "tab:reuse",
        align: vec![Align::Left, Align::Right, Align::Right, Align::Right],
        header: vec![
            "Application".to_string(),
            "Kernel LOC".to_string(),
            "Domain LOC".to_string(),
            m.percent("Reuse "),
        ],
        sections: vec![apps],
    }
}

/// Spec vs proof lines and their ratio.
pub fn proof_table(result: &CollectionResult, m: &dyn Markup) -> Table {
    let row = |name: String, spec: usize, proof: usize, ratio: Option<f64>| {
        vec![
            name,
            format_count(spec),
            format_count(proof),
            format_count(spec + proof),
            format_optional(ratio, m.placeholder()),
        ]
    };

    let totals = &result.components.totals;
    let kernels = vec![row(
        "Kernels".to_string(),
        totals.spec_lines,
        totals.proof_lines,
        result.components.proof_spec_ratio(),
    )];
    let apps = result
        .applications
        .values()
        .map(|app| {
            row(
                m.escape(&app.name),
                app.dafny.spec_lines,
                app.dafny.proof_lines,
                app.proof_spec_ratio(),
            )
        })
        .collect();

    Table {
        name: "metrics-proof",
        caption: "Proof Overhead: Spec vs Proof Constructs",
        label: "tab:proof",
        align: vec![
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
        ],
        header: vec![
            "Component".to_string(),
            "Spec LOC".to_string(),
            "Proof LOC".to_string(),
            "Total".to_string(),
            "Proof/Spec".to_string(),
        ],
        sections: vec![kernels, apps],
    }
}

/// Verification wall time, kernels first, with a grand total.
pub fn timing_table(result: &CollectionResult, m: &dyn Markup) -> Table {
    let kernels = vec![vec![
        "Kernels".to_string(),
        format_decimal(result.components.verify_time),
    ]];
    let apps = result
        .applications
        .values()
        .map(|app| vec![m.escape(&app.name), format_decimal(app.verify_time)])
        .collect();
    let total = vec![vec![
        m.bold("Total"),
        m.bold(&format_decimal(result.total_verify_time())),
    ]];

    Table {
        name: "metrics-timing",
        caption: "Verification Time",
        label: "tab:timing",
        align: vec![Align::Left, Align::Right],
        header: vec!["Component".to_string(), "Time (s)".to_string()],
        sections: vec![kernels, apps, total],
    }
}

/// Which application uses which kernel.
pub fn usage_matrix_table(result: &CollectionResult, m: &dyn Markup) -> Table {
    let apps = result
        .applications
        .values()
        .map(|app| {
            let mut row = vec![m.escape(&app.name)];
            for kernel in &result.usage_matrix {
                row.push(if app.uses_component(kernel) {
                    m.checkmark().to_string()
                } else {
                    String::new()
                });
            }
            row
        })
        .collect();

    let mut align = vec![Align::Left];
    align.extend(result.usage_matrix.iter().map(|_| Align::Center));
    let mut header = vec!["Application".to_string()];
    header.extend(result.usage_matrix.iter().map(|k| m.escape(k)));

    Table {
        name: "metrics-kernels",
        caption: "Kernel Usage by Application",
        label: "tab:kernels",
        align,
        header,
        sections: vec![apps],
    }
}

/// Every table for `result`. The timing table is only included when
/// verification actually ran.
pub fn all_tables(result: &CollectionResult, m: &dyn Markup) -> Vec<Table> {
    let mut tables = vec![
        loc_table(result, m),
        reuse_table(result, m),
        proof_table(result, m),
        usage_matrix_table(result, m),
    ];
    if result.verification_ran {
        tables.push(timing_table(result, m));
    }
    tables
}
