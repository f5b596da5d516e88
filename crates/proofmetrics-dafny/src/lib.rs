use anyhow::{Context, Result};
use regex::Regex;

use proofmetrics_core::analyzer::LineClassifier;
use proofmetrics_core::types::{BraceCounting, LineKind};

mod braces;

use braces::{BraceCounts, BraceScanner};

/// Dafny spec/proof line classifier.
///
/// A single pass over the physical lines. Lemma signatures, declarations and
/// contract clauses are spec; lemma bodies, `calc` blocks, `assert`
/// statements and ghost state are proof. Multi-line constructs are tracked
/// by brace depth only, so a lemma nested in another lemma's body is just
/// more body.
pub struct DafnyClassifier {
    brace_counting: BraceCounting,
    lemma: Regex,
    calc: Regex,
    assert: Regex,
    ghost_state: Regex,
    spec_clause: Regex,
}

/// Per-file scan state, reset for every file.
#[derive(Debug, Default)]
struct ScanState {
    in_lemma_signature: bool,
    in_lemma_body: bool,
    in_calc_block: bool,
    depth: i64,
    lemma_entry_depth: i64,
}

impl ScanState {
    fn apply(&mut self, braces: BraceCounts) {
        self.depth += braces.open as i64 - braces.close as i64;
    }
}

impl DafnyClassifier {
    pub fn new() -> Result<Self> {
        Self::with_brace_counting(BraceCounting::default())
    }

    pub fn with_brace_counting(brace_counting: BraceCounting) -> Result<Self> {
        Ok(Self {
            brace_counting,
            lemma: Regex::new(r"^(ghost\s+)?lemma\s+").context("failed to compile lemma pattern")?,
            calc: Regex::new(r"^calc\s*\{").context("failed to compile calc pattern")?,
            assert: Regex::new(r"^assert\s+").context("failed to compile assert pattern")?,
            ghost_state: Regex::new(r"^ghost\s+(var|const)\s+")
                .context("failed to compile ghost state pattern")?,
            spec_clause: Regex::new(r"^(requires|ensures|invariant|decreases|modifies|reads)\s+")
                .context("failed to compile spec clause pattern")?,
        })
    }

    pub fn brace_counting(&self) -> BraceCounting {
        self.brace_counting
    }

    fn classify_line(
        &self,
        state: &mut ScanState,
        stripped: &str,
        braces: BraceCounts,
    ) -> LineKind {
        let opens = braces.open > 0;
        let closes = braces.close > 0;

        // A lemma signature is spec; the body may open on the same line.
        if !state.in_lemma_body && self.lemma.is_match(stripped) {
            state.in_lemma_signature = true;
            state.lemma_entry_depth = state.depth;
            if opens {
                state.in_lemma_signature = false;
                state.in_lemma_body = true;
            }
            state.apply(braces);
            return LineKind::Spec;
        }

        // Continuation of a multi-line signature, up to and including the opening brace.
        if state.in_lemma_signature {
            if opens {
                state.in_lemma_signature = false;
                state.in_lemma_body = true;
            }
            state.apply(braces);
            return LineKind::Spec;
        }

        if self.calc.is_match(stripped) {
            state.in_calc_block = true;
            state.apply(braces);
            return LineKind::Proof;
        }

        state.apply(braces);

        if state.in_lemma_body && state.depth <= state.lemma_entry_depth && closes {
            state.in_lemma_body = false;
            return LineKind::Proof;
        }

        if state.in_calc_block && closes && !opens {
            state.in_calc_block = false;
            return LineKind::Proof;
        }

        if state.in_lemma_body || state.in_calc_block {
            return LineKind::Proof;
        }

        if self.assert.is_match(stripped) || self.ghost_state.is_match(stripped) {
            return LineKind::Proof;
        }

        if self.spec_clause.is_match(stripped) {
            return LineKind::Spec;
        }

        // Declarations, imports, comments, blank lines.
        LineKind::Spec
    }
}

impl LineClassifier for DafnyClassifier {
    fn language(&self) -> &'static str {
        "dafny"
    }

    fn file_extensions(&self) -> &[&str] {
        &["dfy"]
    }

    fn classify_lines(&self, content: &str) -> Vec<LineKind> {
        let mut state = ScanState::default();
        let mut scanner = BraceScanner::new(self.brace_counting);
        content
            .lines()
            .map(|line| {
                let braces = scanner.count(line);
                self.classify_line(&mut state, line.trim(), braces)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmetrics_core::types::FileMetrics;

    use LineKind::{Proof, Spec};

    fn classifier() -> DafnyClassifier {
        DafnyClassifier::new().unwrap()
    }

    fn literal_aware() -> DafnyClassifier {
        DafnyClassifier::with_brace_counting(BraceCounting::LiteralAware).unwrap()
    }

    fn metrics(spec: usize, proof: usize) -> FileMetrics {
        FileMetrics {
            total_lines: spec + proof,
            spec_lines: spec,
            proof_lines: proof,
        }
    }

    #[test]
    fn test_lemma_with_brace_on_next_line() {
        // The `{` line still belongs to the signature, then body and close are proof.
        let content = "lemma Foo()\n{\n  assert true;\n}\n";
        assert_eq!(
            classifier().classify_lines(content),
            vec![Spec, Spec, Proof, Proof]
        );
        assert_eq!(classifier().classify(content), metrics(2, 2));
    }

    #[test]
    fn test_calc_block_is_all_proof() {
        let content = "calc {\n  x == y;\n}\n";
        assert_eq!(classifier().classify(content), metrics(0, 3));
    }

    #[test]
    fn test_multi_line_signature() {
        let content = "\
lemma SumIsMonotone(a: seq<int>, b: seq<int>)
  requires |a| == |b|
  requires forall i :: 0 <= i < |a| ==> a[i] <= b[i]
  ensures Sum(a) <= Sum(b) {
  if |a| > 0 {
    SumIsMonotone(a[1..], b[1..]);
  }
}
function Sum(s: seq<int>): int
";
        assert_eq!(
            classifier().classify_lines(content),
            vec![Spec, Spec, Spec, Spec, Proof, Proof, Proof, Proof, Spec]
        );
    }

    #[test]
    fn test_single_line_lemma_keeps_body_open() {
        let content = "lemma Trivial() {}\ndatatype Color = Red | Green\n";
        // Braces balance on the signature line, so the body is never closed by a
        // later `}`: the datatype line is classified as body content.
        assert_eq!(classifier().classify_lines(content), vec![Spec, Proof]);
    }

    #[test]
    fn test_ghost_lemma_and_nested_braces() {
        let content = "\
module M {
  ghost lemma L(x: nat)
    ensures x >= 0
  {
    if x > 0 {
      L(x - 1);
    }
  }
  method Run() {
  }
}
";
        assert_eq!(
            classifier().classify_lines(content),
            vec![Spec, Spec, Spec, Spec, Proof, Proof, Proof, Proof, Spec, Spec, Spec]
        );
    }

    #[test]
    fn test_nested_lemma_is_body_content() {
        let content = "lemma Outer() {\n  lemma Inner() {}\n}\nconst K := 1\n";
        assert_eq!(
            classifier().classify_lines(content),
            vec![Spec, Proof, Proof, Spec]
        );
    }

    #[test]
    fn test_standalone_proof_constructs() {
        let content = "\
method M(x: int) returns (y: int)
  requires x > 0
  ensures y > 0
  modifies this
{
  ghost var old_x := x;
  assert x > 0;
  y := x;
}
ghost const Limit := 10
";
        assert_eq!(
            classifier().classify_lines(content),
            vec![Spec, Spec, Spec, Spec, Spec, Proof, Proof, Spec, Spec, Proof]
        );
    }

    #[test]
    fn test_keywords_need_trailing_whitespace() {
        let content = "assert(x);\nrequires\nghost var\nlemmas are fun\n";
        assert_eq!(classifier().classify(content), metrics(4, 0));
    }

    #[test]
    fn test_calc_closing_line_with_open_brace_stays_inside() {
        let content = "calc {\n  a;\n} {\n  b;\n}\nfunction F(): int\n";
        assert_eq!(
            classifier().classify_lines(content),
            vec![Proof, Proof, Proof, Proof, Proof, Spec]
        );
    }

    #[test]
    fn test_calc_inside_lemma_body() {
        let content = "\
lemma L()
{
  calc {
    1 + 1;
    == 2;
  }
}
predicate P()
";
        assert_eq!(
            classifier().classify_lines(content),
            vec![Spec, Spec, Proof, Proof, Proof, Proof, Proof, Spec]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_default_to_spec() {
        let content = "\n// a comment\n   \ninclude \"Replay.dfy\"\n";
        assert_eq!(classifier().classify(content), metrics(4, 0));
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let content = "lemma A()\r\n{\r\n  assert true;\r\n}";
        assert_eq!(classifier().classify(content), metrics(2, 2));
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(classifier().classify(""), FileMetrics::default());
    }

    #[test]
    fn test_totals_always_add_up() {
        let content = "\
lemma A() {
  // stray } in a comment
  assert true;
}
calc {
  x;
  \"{\";
}
ghost var g := 0;
";
        for c in [classifier(), literal_aware()] {
            let m = c.classify(content);
            assert_eq!(m.spec_lines + m.proof_lines, m.total_lines);
            assert_eq!(m.total_lines, 9);
        }
    }

    #[test]
    fn test_lexical_counting_keeps_false_brace_behavior() {
        // The `}` inside the comment closes the lemma body early under lexical counting.
        let content = "\
lemma L() {
  // close } here
  assert true;
}
predicate P()
";
        assert_eq!(
            classifier().classify_lines(content),
            vec![Spec, Proof, Proof, Spec, Spec]
        );
    }

    #[test]
    fn test_literal_aware_counting_ignores_comment_braces() {
        let content = "\
lemma L() {
  // close } here
  assert true;
}
predicate P()
";
        assert_eq!(
            literal_aware().classify_lines(content),
            vec![Spec, Proof, Proof, Proof, Spec]
        );
    }

    #[test]
    fn test_literal_aware_counting_ignores_string_and_block_comment_braces() {
        let content = "\
lemma L() {
  var s := \"}}\";
  /* }
     } */
  assert true;
}
method M()
";
        assert_eq!(
            literal_aware().classify_lines(content),
            vec![Spec, Proof, Proof, Proof, Proof, Proof, Spec]
        );
    }

    #[test]
    fn test_classifier_reports_language() {
        let c = classifier();
        assert_eq!(c.language(), "dafny");
        assert_eq!(c.file_extensions(), &["dfy"]);
        assert_eq!(c.brace_counting(), BraceCounting::Lexical);
    }
}
