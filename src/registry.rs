//! The process-wide matcher registry.
//!
//! Matchers are looked up by name at call time. The registry starts with the
//! built-in catalog and is extended by [`extend`]; registering a name that
//! already exists replaces the previous matcher.
//!
//! ```
//! use layered_expect::{expect, extend, Matchers, MatcherResult, Value};
//!
//! extend(Matchers::new().with("toBeEven", |_ctx, received, _args| {
//!     let pass = received.as_f64().map_or(false, |n| n % 2.0 == 0.0);
//!     let shown = received.clone();
//!     Ok(MatcherResult::new(pass, move || format!("expected {} to be even", shown)))
//! }));
//!
//! expect(4).call("toBeEven", vec![]).unwrap();
//! assert!(expect(3).call("toBeEven", vec![]).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::assertion::AsyncMode;
use crate::config::ExpectConfig;
use crate::equality;
use crate::errors::ExpectResult;
use crate::format::message::{diff_or_values, matcher_hint, HintOptions};
use crate::snapshot::CallSite;
use crate::state::MatcherState;
use crate::value::Value;

/// A named check over a received value and its arguments.
pub trait Matcher: Send + Sync {
    fn check(&self, ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult>;
}

impl<F> Matcher for F
where
    F: Fn(&MatcherContext, &Value, &[Value]) -> ExpectResult<MatcherResult> + Send + Sync,
{
    fn check(&self, ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
        self(ctx, received, args)
    }
}

/// Stored forms compared by a snapshot matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotComparison {
    pub key: String,
    pub expected: String,
    pub received: String,
}

/// A matcher verdict. The message is rendered only when the assertion
/// fails.
pub struct MatcherResult {
    pub pass: bool,
    message: Box<dyn Fn() -> String>,
    pub actual: Option<Value>,
    pub expected: Option<Value>,
    pub snapshot: Option<SnapshotComparison>,
}

impl MatcherResult {
    pub fn new(pass: bool, message: impl Fn() -> String + 'static) -> Self {
        Self {
            pass,
            message: Box::new(message),
            actual: None,
            expected: None,
            snapshot: None,
        }
    }

    pub fn with_actual(mut self, actual: Value) -> Self {
        self.actual = Some(actual);
        self
    }

    pub fn with_expected(mut self, expected: Value) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_snapshot(mut self, snapshot: SnapshotComparison) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn message(&self) -> String {
        (self.message)()
    }
}

impl fmt::Debug for MatcherResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherResult")
            .field("pass", &self.pass)
            .field("actual", &self.actual)
            .field("expected", &self.expected)
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

/// What a matcher can see about the assertion invoking it.
pub struct MatcherContext {
    pub name: String,
    pub is_not: bool,
    pub promise: AsyncMode,
    pub state: MatcherState,
    pub location: &'static Location<'static>,
}

impl MatcherContext {
    pub fn config(&self) -> &ExpectConfig {
        &self.state.config
    }

    pub fn call_site(&self) -> CallSite {
        CallSite::from(self.location)
    }

    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        equality::equals(a, b)
    }

    pub fn strict_equals(&self, a: &Value, b: &Value) -> bool {
        equality::strict_equals(a, b)
    }

    pub fn subset_equals(&self, object: &Value, subset: &Value) -> bool {
        equality::subset_equals(object, subset)
    }

    pub fn hint_options(&self) -> HintOptions {
        HintOptions {
            is_not: self.is_not,
            promise: self.promise.as_str().to_string(),
            second_argument: None,
        }
    }

    /// Hint for this call with custom placeholders.
    pub fn hint(&self, received: &str, expected: &str) -> String {
        matcher_hint(&self.name, received, expected, &self.hint_options())
    }

    /// Hint with a second placeholder, as in `toBeCloseTo(expected, precision)`.
    pub fn hint_with_second(&self, received: &str, expected: &str, second: &str) -> String {
        let options = HintOptions {
            second_argument: Some(second.to_string()),
            ..self.hint_options()
        };
        matcher_hint(&self.name, received, expected, &options)
    }

    /// See [`diff_or_values`].
    pub fn diff_or_values(&self, expected: &Value, received: &Value) -> String {
        diff_or_values(expected, received, self.is_not)
    }
}

/// Name to matcher map.
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    matchers: HashMap<String, Arc<dyn Matcher>>,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.extend(crate::matchers::builtins());
        registry
    }

    /// Register `matcher`, returning the one it replaced.
    pub fn register(&mut self, name: impl Into<String>, matcher: Arc<dyn Matcher>) -> Option<Arc<dyn Matcher>> {
        self.matchers.insert(name.into(), matcher)
    }

    pub fn extend(&mut self, matchers: Matchers) {
        for (name, matcher) in matchers.entries {
            if self.register(name.clone(), matcher).is_some() {
                warn!("Matcher {} was already registered; replacing it", name);
            } else {
                debug!("Registered matcher {}", name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Matcher>> {
        self.matchers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matchers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.matchers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// A batch of matchers for [`extend`].
#[derive(Default)]
pub struct Matchers {
    entries: Vec<(String, Arc<dyn Matcher>)>,
}

impl Matchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a closure matcher.
    pub fn with<F>(self, name: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&MatcherContext, &Value, &[Value]) -> ExpectResult<MatcherResult> + Send + Sync + 'static,
    {
        self.with_matcher(name, matcher)
    }

    pub fn with_matcher(mut self, name: impl Into<String>, matcher: impl Matcher + 'static) -> Self {
        self.entries.push((name.into(), Arc::new(matcher)));
        self
    }

    /// Register the same matcher under another name.
    pub fn alias(mut self, alias: impl Into<String>, target: &str) -> Self {
        if let Some((_, matcher)) = self.entries.iter().find(|(name, _)| name == target) {
            let matcher = Arc::clone(matcher);
            self.entries.push((alias.into(), matcher));
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

static REGISTRY: Lazy<RwLock<MatcherRegistry>> = Lazy::new(|| RwLock::new(MatcherRegistry::with_builtins()));

/// Merge `matchers` into the process-wide registry. Later registrations of
/// a name win.
pub fn extend(matchers: Matchers) {
    REGISTRY.write().unwrap_or_else(|e| e.into_inner()).extend(matchers);
}

pub fn lookup(name: &str) -> Option<Arc<dyn Matcher>> {
    REGISTRY.read().unwrap_or_else(|e| e.into_inner()).get(name)
}

/// Names in the process-wide registry, sorted.
pub fn registered_matchers() -> Vec<String> {
    REGISTRY.read().unwrap_or_else(|e| e.into_inner()).names()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(pass: bool) -> impl Fn(&MatcherContext, &Value, &[Value]) -> ExpectResult<MatcherResult> {
        move |_ctx: &MatcherContext, _received: &Value, _args: &[Value]| {
            Ok(MatcherResult::new(pass, || "always".to_string()))
        }
    }

    fn context() -> MatcherContext {
        MatcherContext {
            name: "checked".to_string(),
            is_not: false,
            promise: AsyncMode::None,
            state: MatcherState::default(),
            location: Location::caller(),
        }
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = MatcherRegistry::new();
        registry.extend(Matchers::new().with("checked", always(false)));
        registry.extend(Matchers::new().with("checked", always(true)));
        assert_eq!(registry.len(), 1);

        let matcher = registry.get("checked").unwrap();
        let result = matcher.check(&context(), &Value::Undefined, &[]).unwrap();
        assert!(result.pass);
    }

    #[test]
    fn test_aliases_share_implementation() {
        let matchers = Matchers::new().with("toBeChecked", always(true)).alias("checked", "toBeChecked");
        assert_eq!(matchers.names().collect::<Vec<_>>(), vec!["toBeChecked", "checked"]);
    }

    #[test]
    fn test_builtins_preloaded() {
        let names = registered_matchers();
        for name in ["toBe", "toEqual", "toMatchSnapshot", "toHaveBeenCalledWith", "toBeCalledWith"] {
            assert!(names.iter().any(|n| n == name), "missing {}", name);
        }
        assert!(lookup("toBeAwesome").is_none());
    }

    #[test]
    fn test_hint_includes_modifiers() {
        let mut ctx = context();
        ctx.is_not = true;
        ctx.promise = AsyncMode::Rejects;
        assert_eq!(ctx.hint("received", ""), "expect(received).rejects.not.checked()");
    }
}
