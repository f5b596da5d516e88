use proofmetrics_core::types::BraceCounting;

/// Opening and closing braces counted on one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BraceCounts {
    pub open: usize,
    pub close: usize,
}

/// Lexer state that survives a line break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Carry {
    #[default]
    Code,
    /// Inside `/* ... */`, which nests in Dafny.
    BlockComment(usize),
    /// Inside a verbatim `@"..."` string, which may span lines.
    VerbatimString,
}

/// Counts braces line by line.
///
/// `Lexical` counts every brace character. `LiteralAware` skips string and
/// character literals and comments, carrying block comment and verbatim
/// string state across lines.
pub(crate) struct BraceScanner {
    mode: BraceCounting,
    carry: Carry,
}

impl BraceScanner {
    pub fn new(mode: BraceCounting) -> Self {
        Self {
            mode,
            carry: Carry::Code,
        }
    }

    pub fn count(&mut self, line: &str) -> BraceCounts {
        match self.mode {
            BraceCounting::Lexical => BraceCounts {
                open: line.matches('{').count(),
                close: line.matches('}').count(),
            },
            BraceCounting::LiteralAware => self.count_code(line),
        }
    }

    fn count_code(&mut self, line: &str) -> BraceCounts {
        let chars: Vec<char> = line.chars().collect();
        let mut counts = BraceCounts::default();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            match self.carry {
                Carry::BlockComment(depth) => {
                    if c == '*' && next == Some('/') {
                        self.carry = if depth > 1 {
                            Carry::BlockComment(depth - 1)
                        } else {
                            Carry::Code
                        };
                        i += 2;
                    } else if c == '/' && next == Some('*') {
                        self.carry = Carry::BlockComment(depth + 1);
                        i += 2;
                    } else {
                        i += 1;
                    }
                    continue;
                }
                Carry::VerbatimString => {
                    if c == '"' {
                        if next == Some('"') {
                            i += 2;
                        } else {
                            self.carry = Carry::Code;
                            i += 1;
                        }
                    } else {
                        i += 1;
                    }
                    continue;
                }
                Carry::Code => {}
            }

            match c {
                '/' if next == Some('/') => break,
                '/' if next == Some('*') => {
                    self.carry = Carry::BlockComment(1);
                    i += 2;
                }
                '@' if next == Some('"') => {
                    self.carry = Carry::VerbatimString;
                    i += 2;
                }
                '"' => i = skip_string(&chars, i + 1),
                '\'' if starts_char_literal(&chars, i) => i = skip_char_literal(&chars, i + 1),
                '{' => {
                    counts.open += 1;
                    i += 1;
                }
                '}' => {
                    counts.close += 1;
                    i += 1;
                }
                _ => i += 1,
            }
        }

        counts
    }
}

/// Index just past the closing quote of a regular string starting at `i`.
/// An unterminated string runs to the end of the line.
fn skip_string(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// A quote opens a char literal only where an identifier cannot continue,
/// since Dafny allows primes in names (`x'`).
fn starts_char_literal(chars: &[char], i: usize) -> bool {
    let after_ident = i > 0 && {
        let prev = chars[i - 1];
        prev.is_alphanumeric() || prev == '_' || prev == '\'' || prev == '?'
    };
    if after_ident {
        return false;
    }
    match (chars.get(i + 1), chars.get(i + 2)) {
        (Some('\\'), _) => true,
        (Some(_), Some('\'')) => true,
        _ => false,
    }
}

fn skip_char_literal(chars: &[char], mut i: usize) -> usize {
    if chars.get(i) == Some(&'\\') {
        i += 2;
    } else {
        i += 1;
    }
    while i < chars.len() {
        if chars[i] == '\'' {
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_all(mode: BraceCounting, lines: &[&str]) -> Vec<(usize, usize)> {
        let mut scanner = BraceScanner::new(mode);
        lines
            .iter()
            .map(|l| {
                let c = scanner.count(l);
                (c.open, c.close)
            })
            .collect()
    }

    #[test]
    fn test_lexical_counts_everything() {
        assert_eq!(
            count_all(BraceCounting::Lexical, &["x := \"{\"; // }", "{{ }"]),
            vec![(1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_line_comment_and_string() {
        assert_eq!(
            count_all(
                BraceCounting::LiteralAware,
                &["if b { // }", "s := \"a\\\"}\"; {"]
            ),
            vec![(1, 0), (1, 0)]
        );
    }

    #[test]
    fn test_nested_block_comment_spans_lines() {
        assert_eq!(
            count_all(
                BraceCounting::LiteralAware,
                &["{ /* outer /* inner } */", "still comment { */ }"]
            ),
            vec![(1, 0), (0, 1)]
        );
    }

    #[test]
    fn test_verbatim_string_spans_lines() {
        assert_eq!(
            count_all(
                BraceCounting::LiteralAware,
                &["var s := @\"{ \"\" ", "} \"; }"]
            ),
            vec![(0, 0), (0, 1)]
        );
    }

    #[test]
    fn test_char_literals_and_primes() {
        assert_eq!(
            count_all(
                BraceCounting::LiteralAware,
                &["c == '{' || c == '\\'' {", "var x' := x; }"]
            ),
            vec![(1, 0), (0, 1)]
        );
    }
}
