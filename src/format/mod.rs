//! Pretty-printing of values.
//!
//! Values are rendered by a [`ValueFormatter`]: every node is first offered
//! to the registered [`Serializer`] plugins (newest first) and falls back to
//! the built-in structural printer. Output is deterministic: record keys are
//! sorted, and a reference that is already being printed further up the
//! tree renders as `[Circular]`.

pub mod diff;
pub mod message;

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::value::{ErrorValue, Value};

/// Printing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Containers nested deeper than this print as `[Object]`, `[Array]`...
    pub max_depth: Option<usize>,
    /// Single-line output.
    pub min: bool,
    /// Prefix plain objects and arrays with `Object` / `Array`.
    pub print_basic_prototype: bool,
    /// Escape `"` and `\` inside strings.
    pub escape_string: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            max_depth: Some(10),
            min: false,
            print_basic_prototype: false,
            escape_string: false,
        }
    }
}

impl FormatConfig {
    /// Options used for stored snapshots: unbounded depth.
    pub fn snapshot() -> Self {
        Self {
            max_depth: None,
            ..Self::default()
        }
    }

    /// Single-line options.
    pub fn min() -> Self {
        Self {
            min: true,
            ..Self::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_basic_prototype(mut self, print: bool) -> Self {
        self.print_basic_prototype = print;
        self
    }

    pub fn with_escape_string(mut self, escape: bool) -> Self {
        self.escape_string = escape;
        self
    }
}

/// Addresses of the references currently being printed, outermost first.
#[derive(Debug, Clone, Default)]
pub struct Refs(Vec<usize>);

impl Refs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, value: &Value) -> bool {
        value.ref_addr().map_or(false, |addr| self.0.contains(&addr))
    }

    /// A copy with `value` pushed as the innermost ancestor.
    pub fn with(&self, value: &Value) -> Refs {
        let mut refs = self.clone();
        if let Some(addr) = value.ref_addr() {
            refs.0.push(addr);
        }
        refs
    }
}

/// Recursive entry point handed to plugins for printing children.
pub trait Printer {
    fn print(
        &self,
        value: &Value,
        config: &FormatConfig,
        indentation: &str,
        depth: usize,
        refs: &Refs,
    ) -> String;
}

/// A snapshot serializer plugin.
pub trait Serializer: Send + Sync {
    /// Whether this plugin handles `value`.
    fn test(&self, value: &Value) -> bool;

    fn serialize(
        &self,
        value: &Value,
        config: &FormatConfig,
        indentation: &str,
        depth: usize,
        refs: &Refs,
        printer: &dyn Printer,
    ) -> String;
}

static SERIALIZERS: Lazy<RwLock<Vec<Arc<dyn Serializer>>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Register a plugin. Plugins added later are consulted first.
pub fn add_snapshot_serializer(plugin: impl Serializer + 'static) {
    let mut plugins = SERIALIZERS.write().unwrap_or_else(|e| e.into_inner());
    plugins.insert(0, Arc::new(plugin));
    debug!("Registered snapshot serializer ({} total)", plugins.len());
}

/// The registered plugins in priority order.
pub fn snapshot_serializers() -> Vec<Arc<dyn Serializer>> {
    SERIALIZERS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Render a value for failure messages.
pub fn stringify(value: &Value) -> String {
    ValueFormatter::new(FormatConfig::default()).format(value)
}

/// Render a value for a stored snapshot.
pub fn serialize(value: &Value, config: &FormatConfig) -> String {
    ValueFormatter::new(config.clone()).format(value)
}

/// Prints values with a fixed plugin list.
pub struct ValueFormatter {
    config: FormatConfig,
    plugins: Vec<Arc<dyn Serializer>>,
}

impl ValueFormatter {
    /// A formatter using the registered plugins.
    pub fn new(config: FormatConfig) -> Self {
        Self {
            config,
            plugins: snapshot_serializers(),
        }
    }

    pub fn with_plugins(config: FormatConfig, plugins: Vec<Arc<dyn Serializer>>) -> Self {
        Self { config, plugins }
    }

    pub fn format(&self, value: &Value) -> String {
        self.print(value, &self.config, "", 0, &Refs::new())
    }

    fn print_complex(
        &self,
        value: &Value,
        config: &FormatConfig,
        indentation: &str,
        depth: usize,
        refs: &Refs,
    ) -> String {
        let refs = refs.with(value);
        let depth = depth + 1;
        let hit_max_depth = config.max_depth.map_or(false, |max| depth > max);
        let inner = indent_next(config, indentation);

        match value {
            Value::Array(items) => {
                if hit_max_depth {
                    return "[Array]".to_string();
                }
                let entries = items
                    .borrow()
                    .iter()
                    .map(|item| self.print(item, config, &inner, depth, &refs))
                    .collect();
                let prefix = if config.min || !config.print_basic_prototype {
                    ""
                } else {
                    "Array "
                };
                format!("{}[{}]", prefix, join_entries(entries, config, indentation, &inner))
            }
            Value::Object(record) => {
                let record = record.borrow();
                let name = record.class.as_deref().unwrap_or("Object");
                if hit_max_depth {
                    return format!("[{}]", name);
                }
                let entries = record
                    .fields
                    .iter()
                    .map(|(key, field)| {
                        format!(
                            "{}: {}",
                            print_string(key, config),
                            self.print(field, config, &inner, depth, &refs)
                        )
                    })
                    .collect();
                let prefix = if config.min || (record.class.is_none() && !config.print_basic_prototype) {
                    String::new()
                } else {
                    format!("{} ", name)
                };
                format!("{}{{{}}}", prefix, join_entries(entries, config, indentation, &inner))
            }
            Value::Map(entries) => {
                if hit_max_depth {
                    return "[Map]".to_string();
                }
                let entries = entries
                    .borrow()
                    .iter()
                    .map(|(key, item)| {
                        format!(
                            "{} => {}",
                            self.print(key, config, &inner, depth, &refs),
                            self.print(item, config, &inner, depth, &refs)
                        )
                    })
                    .collect();
                format!("Map {{{}}}", join_entries(entries, config, indentation, &inner))
            }
            Value::Set(items) => {
                if hit_max_depth {
                    return "[Set]".to_string();
                }
                let entries = items
                    .borrow()
                    .iter()
                    .map(|item| self.print(item, config, &inner, depth, &refs))
                    .collect();
                format!("Set {{{}}}", join_entries(entries, config, indentation, &inner))
            }
            Value::Error(error) => {
                let error = error.borrow();
                let label = error_label(&error);
                if hit_max_depth || error.fields.is_empty() {
                    return label;
                }
                let entries = error
                    .fields
                    .iter()
                    .map(|(key, field)| {
                        format!(
                            "{}: {}",
                            print_string(key, config),
                            self.print(field, config, &inner, depth, &refs)
                        )
                    })
                    .collect();
                format!("{} {{{}}}", label, join_entries(entries, config, indentation, &inner))
            }
            Value::Asymmetric(matcher) => match matcher.sample() {
                Some(sample) => format!(
                    "{} {}",
                    matcher.name(),
                    self.print(&sample, config, indentation, depth, &refs)
                ),
                None => matcher.name(),
            },
            other => print_basic(other, config),
        }
    }
}

impl Printer for ValueFormatter {
    fn print(
        &self,
        value: &Value,
        config: &FormatConfig,
        indentation: &str,
        depth: usize,
        refs: &Refs,
    ) -> String {
        if refs.contains(value) {
            return "[Circular]".to_string();
        }
        if let Some(plugin) = self.plugins.iter().find(|plugin| plugin.test(value)) {
            return plugin.serialize(value, config, indentation, depth, &refs.with(value), self);
        }
        match value {
            Value::Array(_)
            | Value::Object(_)
            | Value::Map(_)
            | Value::Set(_)
            | Value::Error(_)
            | Value::Asymmetric(_) => {
                self.print_complex(value, config, indentation, depth, refs)
            }
            other => print_basic(other, config),
        }
    }
}

fn error_label(error: &ErrorValue) -> String {
    if error.message.is_empty() {
        format!("[{}]", error.name)
    } else {
        format!("[{}: {}]", error.name, error.message)
    }
}

fn print_basic(value: &Value, config: &FormatConfig) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::BigInt(n) => format!("{}n", n),
        Value::String(s) => print_string(s, config),
        Value::Error(error) => error_label(&error.borrow()),
        Value::Function(f) => {
            let name = if f.name().is_empty() { "anonymous" } else { f.name() };
            format!("[Function {}]", name)
        }
        Value::Regex(re) => format!("/{}/", re.as_str()),
        Value::Promise(_) => "Promise {}".to_string(),
        Value::Array(_) | Value::Object(_) | Value::Map(_) | Value::Set(_) | Value::Asymmetric(_) => {
            // Containers are handled by the formatter.
            value.type_name()
        }
    }
}

/// Number in JavaScript notation (`NaN`, `Infinity`, `-0`, `1.5`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".to_string()
    } else {
        n.to_string()
    }
}

fn print_string(s: &str, config: &FormatConfig) -> String {
    if config.escape_string {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        format!("\"{}\"", s)
    }
}

fn indent_next(config: &FormatConfig, indentation: &str) -> String {
    if config.min {
        String::new()
    } else {
        format!("{}{}", indentation, " ".repeat(config.indent))
    }
}

fn join_entries(entries: Vec<String>, config: &FormatConfig, indentation: &str, inner: &str) -> String {
    if entries.is_empty() {
        return String::new();
    }
    if config.min {
        return entries.join(", ");
    }
    let mut out = String::from("\n");
    for entry in entries {
        out.push_str(inner);
        out.push_str(&entry);
        out.push_str(",\n");
    }
    out.push_str(indentation);
    out
}
