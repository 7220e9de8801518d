//! Dynamic values under test.
//!
//! [`Value`] models the arbitrary data an assertion wraps. Primitive variants
//! compare by value; reference variants ([`Value::Array`], [`Value::Object`],
//! [`Value::Map`], [`Value::Set`], [`Value::Error`], [`Value::Function`],
//! [`Value::Regex`], [`Value::Promise`]) carry an identity so that `toBe` can
//! tell two structurally equal values apart, and so that self-referential
//! graphs can be built and compared.
//!
//! ```
//! use layered_expect::Value;
//!
//! let list = Value::array(vec![Value::from(1), Value::from("two")]);
//! let copy = list.deep_clone();
//! assert!(!list.same_ref(&copy));
//! assert_eq!(list, copy);
//! ```

mod convert;
mod promise;

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use regex::Regex;

use crate::asymmetric::AsymmetricMatcher;

pub use promise::{Promise, Settled};

/// Interior-mutable reference cell with pointer identity.
///
/// Cloning a `Shared` clones the handle, not the contents.
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the allocation, used as an identity key.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// A record-like value: named fields plus an optional class name.
///
/// `class: None` is a plain object. Fields are kept sorted so that printing
/// is deterministic.
#[derive(Clone, Default)]
pub struct Record {
    pub class: Option<String>,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }
}

/// A thrown-error value.
#[derive(Clone)]
pub struct ErrorValue {
    /// Error class name (`Error`, `TypeError`, ...).
    pub name: String,
    pub message: String,
    /// Additional own properties (e.g. `code`).
    pub fields: BTreeMap<String, Value>,
}

impl ErrorValue {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one recorded call of a spied function.
#[derive(Clone)]
pub enum CallResult {
    Return(Value),
    Throw(Value),
    /// The call has not returned yet.
    Incomplete,
}

/// Call history of a spied function.
///
/// The library only reads this log; recording calls is the job of whatever
/// spy implementation wraps the function.
#[derive(Clone, Default)]
pub struct CallLog {
    pub calls: Vec<Vec<Value>>,
    pub results: Vec<CallResult>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed call.
    pub fn record(&mut self, args: Vec<Value>, result: CallResult) {
        self.calls.push(args);
        self.results.push(result);
    }
}

type NativeFn = dyn Fn(&[Value]) -> Result<Value, Value>;

/// A callable value. An `Err` return means the function threw that value.
pub struct Function {
    name: String,
    body: Box<NativeFn>,
    calls: Option<Shared<CallLog>>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Value> + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
            calls: None,
        }
    }

    /// Attach the call log kept by a spy.
    pub fn with_calls(mut self, calls: Shared<CallLog>) -> Self {
        self.calls = Some(calls);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, Value> {
        (self.body)(args)
    }

    pub fn calls(&self) -> Option<&Shared<CallLog>> {
        self.calls.as_ref()
    }
}

/// A dynamically typed value under test.
#[derive(Clone)]
pub enum Value {
    /// The "absent" marker.
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Array(Shared<Vec<Value>>),
    Object(Shared<Record>),
    Map(Shared<Vec<(Value, Value)>>),
    Set(Shared<Vec<Value>>),
    Error(Shared<ErrorValue>),
    Function(Rc<Function>),
    Regex(Rc<Regex>),
    Promise(Promise),
    /// Wildcard node consumed by structural equality.
    Asymmetric(Rc<dyn AsymmetricMatcher>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Shared::new(items))
    }

    /// Plain object from key/value pairs.
    pub fn object<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::record(Record {
            class: None,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        })
    }

    /// Class instance from key/value pairs.
    pub fn instance<K, V, I>(class: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::record(Record {
            class: Some(class.into()),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        })
    }

    pub fn record(record: Record) -> Self {
        Value::Object(Shared::new(record))
    }

    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map(Shared::new(entries))
    }

    /// Set from items; duplicates (by identity) are dropped.
    pub fn set(items: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|seen| crate::equality::is_identical(seen, &item)) {
                unique.push(item);
            }
        }
        Value::Set(Shared::new(unique))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Value::error_named("Error", message)
    }

    pub fn error_named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Value::Error(Shared::new(ErrorValue::new(name, message)))
    }

    pub fn bigint(value: i128) -> Self {
        Value::BigInt(value)
    }

    pub fn function<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Value> + 'static,
    {
        Value::Function(Rc::new(Function::new(name, body)))
    }

    /// Function whose calls are read from `calls`.
    pub fn spy<F>(name: impl Into<String>, calls: Shared<CallLog>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Value> + 'static,
    {
        Value::Function(Rc::new(Function::new(name, body).with_calls(calls)))
    }

    /// An error class: a function named `name` that builds an error of that
    /// class from its first argument.
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        let class = name.clone();
        Value::function(name, move |args| {
            let message = args.first().map(|arg| arg.to_string()).unwrap_or_default();
            Ok(Value::error_named(class.clone(), message))
        })
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Value::Regex(Rc::new(Regex::new(pattern)?)))
    }

    pub fn asymmetric(matcher: impl AsymmetricMatcher + 'static) -> Self {
        Value::Asymmetric(Rc::new(matcher))
    }

    /// Mirrors `typeof`.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            _ => "object",
        }
    }

    /// Constructor-style type name used by `any()` and `toBeInstanceOf`.
    pub fn type_name(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(_) => "Boolean".to_string(),
            Value::Number(_) => "Number".to_string(),
            Value::BigInt(_) => "BigInt".to_string(),
            Value::String(_) => "String".to_string(),
            Value::Array(_) => "Array".to_string(),
            Value::Object(record) => record
                .borrow()
                .class
                .clone()
                .unwrap_or_else(|| "Object".to_string()),
            Value::Map(_) => "Map".to_string(),
            Value::Set(_) => "Set".to_string(),
            Value::Error(error) => error.borrow().name.clone(),
            Value::Function(_) => "Function".to_string(),
            Value::Regex(_) => "RegExp".to_string(),
            Value::Promise(_) => "Promise".to_string(),
            Value::Asymmetric(matcher) => matcher.name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(n.is_nan() || *n == 0.0),
            Value::BigInt(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::BigInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Identity key for reference variants; `None` for primitives.
    pub fn ref_addr(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.addr()),
            Value::Object(record) => Some(record.addr()),
            Value::Map(entries) => Some(entries.addr()),
            Value::Set(items) => Some(items.addr()),
            Value::Error(error) => Some(error.addr()),
            Value::Function(f) => Some(Rc::as_ptr(f) as *const () as usize),
            Value::Regex(re) => Some(Rc::as_ptr(re) as *const () as usize),
            Value::Promise(p) => Some(p.addr()),
            Value::Asymmetric(m) => Some(Rc::as_ptr(m) as *const () as usize),
            _ => None,
        }
    }

    /// Whether both values are the same reference.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self.ref_addr(), other.ref_addr()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// `length` of strings, arrays, and records that carry a numeric `length`.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.borrow().len()),
            Value::Object(record) => match record.borrow().fields.get("length") {
                Some(Value::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
                _ => None,
            },
            _ => None,
        }
    }

    /// Own property lookup. `Some(Value::Undefined)` means the key exists
    /// with an undefined value.
    pub fn property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(record) => record.borrow().fields.get(key).cloned(),
            Value::Error(error) => {
                let error = error.borrow();
                match key {
                    "name" => Some(Value::String(error.name.clone())),
                    "message" => Some(Value::String(error.message.clone())),
                    _ => error.fields.get(key).cloned(),
                }
            }
            Value::Array(items) => {
                let items = items.borrow();
                if key == "length" {
                    return Some(Value::Number(items.len() as f64));
                }
                key.parse::<usize>().ok().and_then(|i| items.get(i).cloned())
            }
            Value::String(s) if key == "length" => Some(Value::Number(s.chars().count() as f64)),
            Value::Function(f) if key == "name" => Some(Value::String(f.name().to_string())),
            _ => None,
        }
    }

    /// Structurally equal copy with fresh identities. Shared and cyclic
    /// references are preserved in the copy.
    pub fn deep_clone(&self) -> Value {
        let mut copies = HashMap::new();
        deep_clone_with(self, &mut copies)
    }
}

fn deep_clone_with(value: &Value, copies: &mut HashMap<usize, Value>) -> Value {
    if let Some(addr) = value.ref_addr() {
        if let Some(copy) = copies.get(&addr) {
            return copy.clone();
        }
    }
    match value {
        Value::Array(items) => {
            let copy = Shared::new(Vec::new());
            copies.insert(items.addr(), Value::Array(copy.clone()));
            let cloned: Vec<Value> = items.borrow().iter().map(|v| deep_clone_with(v, copies)).collect();
            *copy.borrow_mut() = cloned;
            Value::Array(copy)
        }
        Value::Set(items) => {
            let copy = Shared::new(Vec::new());
            copies.insert(items.addr(), Value::Set(copy.clone()));
            let cloned: Vec<Value> = items.borrow().iter().map(|v| deep_clone_with(v, copies)).collect();
            *copy.borrow_mut() = cloned;
            Value::Set(copy)
        }
        Value::Map(entries) => {
            let copy = Shared::new(Vec::new());
            copies.insert(entries.addr(), Value::Map(copy.clone()));
            let cloned: Vec<(Value, Value)> = entries
                .borrow()
                .iter()
                .map(|(k, v)| (deep_clone_with(k, copies), deep_clone_with(v, copies)))
                .collect();
            *copy.borrow_mut() = cloned;
            Value::Map(copy)
        }
        Value::Object(record) => {
            let class = record.borrow().class.clone();
            let copy = Shared::new(Record {
                class,
                fields: BTreeMap::new(),
            });
            copies.insert(record.addr(), Value::Object(copy.clone()));
            let fields: BTreeMap<String, Value> = record
                .borrow()
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), deep_clone_with(v, copies)))
                .collect();
            copy.borrow_mut().fields = fields;
            Value::Object(copy)
        }
        Value::Error(error) => {
            let (name, message) = {
                let error = error.borrow();
                (error.name.clone(), error.message.clone())
            };
            let copy = Shared::new(ErrorValue::new(name, message));
            copies.insert(error.addr(), Value::Error(copy.clone()));
            let fields: BTreeMap<String, Value> = error
                .borrow()
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), deep_clone_with(v, copies)))
                .collect();
            copy.borrow_mut().fields = fields;
            Value::Error(copy)
        }
        Value::Regex(re) => Value::Regex(Rc::new(re.as_ref().clone())),
        // Functions, promises and asymmetric nodes are shared as-is.
        other => other.clone(),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::stringify(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => f.write_str(&crate::format::stringify(other)),
        }
    }
}

impl PartialEq for Value {
    /// Deep (`toEqual`) equality.
    fn eq(&self, other: &Value) -> bool {
        crate::equality::equals(self, other)
    }
}
