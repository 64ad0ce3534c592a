//! Pre-parse bracket balance check.
//!
//! Only the `[` / `]` pair is tracked. Anything between double quotes on a
//! single line is removed before scanning so that string literals such as
//! `"a]b"` never affect the result. Other bracket-like characters are left to
//! the parser.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

pub const OPEN: char = '[';
pub const CLOSE: char = ']';

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(.*?)""#).expect("quoted string pattern is valid"));

/// Outcome of a delimiter scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterScan {
    /// Source text with quoted spans removed.
    pub normalized: String,
    /// `> 0`: closers without an opener. `< 0`: openers never closed.
    pub diff: i64,
}

impl DelimiterScan {
    pub fn is_balanced(&self) -> bool {
        self.diff == 0
    }
}

pub fn scan_delimiters(source: &str) -> DelimiterScan {
    let normalized = QUOTED.replace_all(source, "").into_owned();

    let mut stack = Vec::new();
    let mut mismatches: i64 = 0;
    for ch in normalized.chars() {
        if ch == OPEN {
            stack.push(ch);
        } else if ch == CLOSE && stack.pop() != Some(OPEN) {
            mismatches += 1;
        }
    }

    let diff = mismatches - stack.len() as i64;
    DelimiterScan { normalized, diff }
}

/// Fails with [`CoreError::Unbalanced`] when the source does not balance.
pub fn ensure_balanced(source: &str) -> Result<(), CoreError> {
    let scan = scan_delimiters(source);
    if scan.is_balanced() {
        Ok(())
    } else {
        Err(CoreError::Unbalanced { diff: scan.diff })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn balanced_block_has_zero_diff() {
        let scan = scan_delimiters("[write 1 + 2;]");
        assert_eq!(scan.diff, 0);
        assert!(scan.is_balanced());
    }

    #[test]
    fn closer_inside_string_is_ignored() {
        let scan = scan_delimiters(r#"[write "a]b";]"#);
        assert_eq!(scan.diff, 0);
        assert_eq!(scan.normalized, "[write ;]");
    }

    #[test]
    fn extra_closer_is_positive() {
        assert_eq!(scan_delimiters("[write 1;]]").diff, 1);
    }

    #[test]
    fn unclosed_openers_are_negative() {
        assert_eq!(scan_delimiters("[[[write 1;]").diff, -2);
    }

    #[test]
    fn mismatch_and_unclosed_partially_cancel() {
        // one stray closer up front, two openers left dangling
        assert_eq!(scan_delimiters("][[").diff, -1);
    }

    #[test]
    fn other_brackets_are_not_tracked() {
        assert_eq!(scan_delimiters("(({{ [x] ").diff, 0);
    }

    #[test]
    fn quotes_do_not_span_lines() {
        // the first quote has no partner on its line, so the `]` after it counts
        let scan = scan_delimiters("\"]\n\"");
        assert_eq!(scan.diff, 1);
    }

    #[test]
    fn ensure_balanced_reports_signed_count() {
        let err = ensure_balanced("[write 1;]]").unwrap_err();
        assert!(matches!(err, CoreError::Unbalanced { diff: 1 }));
        assert!(err.to_string().contains("+1"));
        assert!(ensure_balanced("[]").is_ok());
    }

    fn reference_diff(source: &str) -> i64 {
        let mut open = 0i64;
        let mut stray = 0i64;
        for ch in source.chars() {
            match ch {
                '[' => open += 1,
                ']' if open > 0 => open -= 1,
                ']' => stray += 1,
                _ => {}
            }
        }
        stray - open
    }

    proptest! {
        #[test]
        fn diff_counts_stray_closers_minus_unclosed_openers(source in "[\\[\\]a-z ;]{0,64}") {
            prop_assert_eq!(scan_delimiters(&source).diff, reference_diff(&source));
        }

        #[test]
        fn quoted_spans_never_change_diff(
            prefix in "[\\[\\]a-z ]{0,16}",
            inner in "[\\[\\]a-z ]{0,16}",
            suffix in "[\\[\\]a-z ]{0,16}",
        ) {
            let plain = format!("{prefix}{suffix}");
            let quoted = format!("{prefix}\"{inner}\"{suffix}");
            prop_assert_eq!(scan_delimiters(&quoted).diff, scan_delimiters(&plain).diff);
        }
    }
}
