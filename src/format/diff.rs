//! Line diffs between expected and received renderings.

use super::{FormatConfig, ValueFormatter};
use crate::value::Value;

/// One line of a diff.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffLine<'a> {
    /// Present in both.
    Equal(&'a str),
    /// Only in the expected text.
    Delete(&'a str),
    /// Only in the received text.
    Insert(&'a str),
}

/// Line diff of `expected` against `received`.
///
/// LCS table with a backtrack that prefers insertions on ties, so that after
/// reversal a replaced line reads as `-` then `+`.
pub fn diff_lines<'a>(expected: &'a str, received: &'a str) -> Vec<DiffLine<'a>> {
    let left: Vec<&str> = expected.lines().collect();
    let right: Vec<&str> = received.lines().collect();
    let n = left.len();
    let m = right.len();

    if n == 0 {
        return right.into_iter().map(DiffLine::Insert).collect();
    }
    if m == 0 {
        return left.into_iter().map(DiffLine::Delete).collect();
    }

    // dp[i][j] = LCS length of left[0..i] and right[0..j]
    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            if left[i - 1] == right[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    let mut ops = Vec::new();
    let mut i = n;
    let mut j = m;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && left[i - 1] == right[j - 1] {
            ops.push(DiffLine::Equal(left[i - 1]));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            ops.push(DiffLine::Insert(right[j - 1]));
            j -= 1;
        } else {
            ops.push(DiffLine::Delete(left[i - 1]));
            i -= 1;
        }
    }

    ops.reverse();
    ops
}

/// Render a diff with a `- Expected` / `+ Received` header.
pub fn print_diff(expected: &str, received: &str) -> String {
    let mut out = String::from("- Expected\n+ Received\n");
    out.push('\n');
    let lines: Vec<String> = diff_lines(expected, received)
        .into_iter()
        .map(|line| match line {
            DiffLine::Equal(text) => format!("  {}", text),
            DiffLine::Delete(text) => format!("- {}", text),
            DiffLine::Insert(text) => format!("+ {}", text),
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

/// Diff two values, or `None` when both render on a single line (the plain
/// `Expected:` / `Received:` pair reads better there).
pub fn diff_values(expected: &Value, received: &Value) -> Option<String> {
    let formatter = ValueFormatter::new(FormatConfig::default());
    let expected = formatter.format(expected);
    let received = formatter.format(received);
    if !expected.contains('\n') && !received.contains('\n') {
        return None;
    }
    if expected == received {
        return Some("Compared values have no visual difference.".to_string());
    }
    Some(print_diff(&expected, &received))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical() {
        let ops = diff_lines("a\nb", "a\nb");
        assert_eq!(ops, vec![DiffLine::Equal("a"), DiffLine::Equal("b")]);
    }

    #[test]
    fn test_replacement_orders_delete_first() {
        let ops = diff_lines("a\nb\nc", "a\nx\nc");
        assert_eq!(
            ops,
            vec![
                DiffLine::Equal("a"),
                DiffLine::Delete("b"),
                DiffLine::Insert("x"),
                DiffLine::Equal("c"),
            ]
        );
    }

    #[test]
    fn test_one_side_empty() {
        assert_eq!(diff_lines("", "a"), vec![DiffLine::Insert("a")]);
        assert_eq!(diff_lines("a", ""), vec![DiffLine::Delete("a")]);
        assert!(diff_lines("", "").is_empty());
    }

    #[test]
    fn test_value_diff() {
        let expected = Value::from(json!({"a": 1, "b": 2}));
        let received = Value::from(json!({"a": 1, "b": 3}));
        insta::assert_snapshot!(diff_values(&expected, &received).unwrap(), @r###"
        - Expected
        + Received

          {
            "a": 1,
        -   "b": 2,
        +   "b": 3,
          }
        "###);
    }

    #[test]
    fn test_single_line_values_have_no_diff() {
        assert!(diff_values(&Value::from(1), &Value::from(2)).is_none());
    }
}
