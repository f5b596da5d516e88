use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Category a single physical line is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Spec,
    Proof,
}

/// Line counts for one source file, or a sum of several.
///
/// Every line lands in exactly one bucket, so `spec_lines + proof_lines`
/// always equals `total_lines`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetrics {
    pub total_lines: usize,
    pub spec_lines: usize,
    pub proof_lines: usize,
}

impl FileMetrics {
    /// Count one line under `kind`.
    pub fn record(&mut self, kind: LineKind) {
        self.total_lines += 1;
        match kind {
            LineKind::Spec => self.spec_lines += 1,
            LineKind::Proof => self.proof_lines += 1,
        }
    }

    /// Proof lines per spec line. `None` when there are no spec lines.
    pub fn proof_spec_ratio(&self) -> Option<f64> {
        ratio(self.proof_lines, self.spec_lines)
    }
}

impl AddAssign for FileMetrics {
    fn add_assign(&mut self, rhs: Self) {
        self.total_lines += rhs.total_lines;
        self.spec_lines += rhs.spec_lines;
        self.proof_lines += rhs.proof_lines;
    }
}

impl Add for FileMetrics {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl std::iter::Sum for FileMetrics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Raw line counts of non-verified integration code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationLines {
    pub handwritten: usize,
    pub generated: usize,
}

/// Where an integration file's lines are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    Handwritten,
    Generated,
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationKind::Handwritten => write!(f, "handwritten"),
            IntegrationKind::Generated => write!(f, "generated"),
        }
    }
}

/// How braces are counted while tracking lemma bodies and calc blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BraceCounting {
    /// Every `{` and `}` character counts, including ones inside strings and comments.
    #[default]
    Lexical,
    /// Braces inside string literals and comments are ignored.
    LiteralAware,
}

impl fmt::Display for BraceCounting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BraceCounting::Lexical => write!(f, "lexical"),
            BraceCounting::LiteralAware => write!(f, "literal-aware"),
        }
    }
}

impl std::str::FromStr for BraceCounting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" => Ok(BraceCounting::Lexical),
            "literal-aware" | "literal_aware" => Ok(BraceCounting::LiteralAware),
            _ => anyhow::bail!("unknown brace counting mode: {s} (expected lexical or literal-aware)"),
        }
    }
}

/// Markup the table files are written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Latex,
    Markdown,
}

impl TableFormat {
    /// File extension of the written tables.
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Latex => "tex",
            TableFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFormat::Latex => write!(f, "latex"),
            TableFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for TableFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latex" | "tex" => Ok(TableFormat::Latex),
            "markdown" | "md" => Ok(TableFormat::Markdown),
            _ => anyhow::bail!("unknown table format: {s} (expected latex or markdown)"),
        }
    }
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}
