//! Building blocks for failure messages.

use unicode_width::UnicodeWidthStr;

use super::diff::diff_values;
use super::stringify;
use crate::value::Value;

/// How the assertion reached the matcher.
#[derive(Debug, Clone, Default)]
pub struct HintOptions {
    pub is_not: bool,
    /// `"resolves"`, `"rejects"` or empty.
    pub promise: String,
    /// Printed as a second argument after the expected placeholder.
    pub second_argument: Option<String>,
}

/// `expect(received)[.resolves][.not].matcherName(expected)`.
///
/// An empty `expected` prints an empty argument list.
pub fn matcher_hint(matcher_name: &str, received: &str, expected: &str, options: &HintOptions) -> String {
    let mut hint = format!("expect({})", received);
    if !options.promise.is_empty() {
        hint.push('.');
        hint.push_str(&options.promise);
    }
    if options.is_not {
        hint.push_str(".not");
    }
    hint.push('.');
    hint.push_str(matcher_name);
    hint.push('(');
    hint.push_str(expected);
    if let Some(second) = &options.second_argument {
        hint.push_str(", ");
        hint.push_str(second);
    }
    hint.push(')');
    hint
}

pub fn print_received(value: &Value) -> String {
    stringify(value)
}

pub fn print_expected(value: &Value) -> String {
    stringify(value)
}

/// Pads labels so their values line up.
///
/// ```
/// use layered_expect::format::message::LabelPrinter;
///
/// let labels = LabelPrinter::new(&["Expected substring", "Received string"]);
/// assert_eq!(labels.label("Received string"), "Received string:    ");
/// ```
pub struct LabelPrinter {
    width: usize,
}

impl LabelPrinter {
    pub fn new(labels: &[&str]) -> Self {
        let width = labels.iter().map(|label| label.width()).max().unwrap_or(0);
        Self { width }
    }

    pub fn label(&self, label: &str) -> String {
        let padding = self.width.saturating_sub(label.width());
        format!("{}: {}", label, " ".repeat(padding))
    }

    /// `label: value` line.
    pub fn line(&self, label: &str, value: &str) -> String {
        format!("{}{}", self.label(label), value)
    }
}

/// The standard `Expected:` / `Received:` pair.
pub fn expected_received(expected: &Value, received: &Value, is_not: bool) -> String {
    let labels = LabelPrinter::new(&["Expected", "Received"]);
    if is_not {
        format!(
            "{}not {}\n{}    {}",
            labels.label("Expected"),
            print_expected(expected),
            labels.label("Received"),
            print_received(received)
        )
    } else {
        format!(
            "{}\n{}",
            labels.line("Expected", &print_expected(expected)),
            labels.line("Received", &print_received(received))
        )
    }
}

/// A diff of the two values when one is useful, otherwise the
/// `Expected:` / `Received:` pair. Negated failures never diff.
pub fn diff_or_values(expected: &Value, received: &Value, is_not: bool) -> String {
    if !is_not {
        if let Some(diff) = diff_values(expected, received) {
            return diff;
        }
    }
    expected_received(expected, received, is_not)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint() {
        let options = HintOptions {
            is_not: true,
            promise: "resolves".to_string(),
            second_argument: None,
        };
        assert_eq!(
            matcher_hint("toBe", "received", "expected", &options),
            "expect(received).resolves.not.toBe(expected)"
        );
        assert_eq!(
            matcher_hint("toBeNull", "received", "", &HintOptions::default()),
            "expect(received).toBeNull()"
        );
    }

    #[test]
    fn test_labels_align() {
        let labels = LabelPrinter::new(&["Expected", "Received"]);
        assert_eq!(labels.line("Expected", "1"), "Expected: 1");
        let labels = LabelPrinter::new(&["Expected length", "Received length"]);
        assert_eq!(labels.line("Expected length", "2"), "Expected length: 2");
    }

    #[test]
    fn test_expected_received() {
        insta::assert_snapshot!(expected_received(&Value::from(1), &Value::from(2), false), @r###"
        Expected: 1
        Received: 2
        "###);
        insta::assert_snapshot!(expected_received(&Value::from(1), &Value::from(1), true), @r###"
        Expected: not 1
        Received:     1
        "###);
    }
}
