//! Type-directed coercion of attribute values.
//!
//! Every element type owns an [`AttributeSpec`]: for each attribute name an
//! ordered list of [`CoercionRule`]s. Decoding turns the raw XML string into
//! an [`AttrValue`]; encoding renders it back. Rules are tried in order and
//! the first one that matches wins. Values no rule accepts are kept as
//! strings and reported, never dropped.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::config::FALSE_LITERALS;
use crate::diagnostics::{Diagnostic, Diagnostics};

/// A coerced attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// Primitive kind of the value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Boolean,
            Self::Int(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::String,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Integral floats keep a `.0` so they read back as floats.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Primitive kinds a [`CoercionRule::TypeTag`] can coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    String,
}

/// Function used by [`CoercionRule::CustomFn`].
pub type CoercionFn = dyn Fn(&AttrValue) -> std::result::Result<AttrValue, String> + Send + Sync;

/// A named custom coercion function.
#[derive(Clone)]
pub struct CustomCoercion {
    name: &'static str,
    func: Arc<CoercionFn>,
}

impl CustomCoercion {
    pub fn new(
        name: &'static str,
        func: impl Fn(&AttrValue) -> std::result::Result<AttrValue, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, value: &AttrValue) -> std::result::Result<AttrValue, String> {
        (self.func)(value)
    }
}

impl fmt::Debug for CustomCoercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomCoercion").field(&self.name).finish()
    }
}

/// One entry of an attribute's rule list.
#[derive(Debug, Clone)]
pub enum CoercionRule {
    /// Accept exactly this string.
    ExactString(String),
    /// Parse or format as a primitive kind.
    TypeTag(ValueKind),
    /// Apply a custom conversion; an error moves on to the next rule.
    CustomFn(CustomCoercion),
}

impl CoercionRule {
    pub fn exact(value: impl Into<String>) -> Self {
        Self::ExactString(value.into())
    }

    #[must_use]
    pub fn kind(kind: ValueKind) -> Self {
        Self::TypeTag(kind)
    }

    pub fn custom(
        name: &'static str,
        func: impl Fn(&AttrValue) -> std::result::Result<AttrValue, String> + Send + Sync + 'static,
    ) -> Self {
        Self::CustomFn(CustomCoercion::new(name, func))
    }
}

/// Attribute rules of one element type, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct AttributeSpec {
    rules: IndexMap<String, Vec<CoercionRule>>,
}

impl AttributeSpec {
    /// Empty spec: every attribute is accepted as a string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rule list of `key`.
    #[must_use]
    pub fn with(
        mut self,
        key: impl Into<String>,
        rules: impl IntoIterator<Item = CoercionRule>,
    ) -> Self {
        self.rules.insert(key.into(), rules.into_iter().collect());
        self
    }

    /// Allow one of the given literal strings.
    #[must_use]
    pub fn with_choices<'s>(
        self,
        key: impl Into<String>,
        choices: impl IntoIterator<Item = &'s str>,
    ) -> Self {
        self.with(key, choices.into_iter().map(CoercionRule::exact))
    }

    #[must_use]
    pub fn rules(&self, key: &str) -> Option<&[CoercionRule]> {
        self.rules.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

/// No rule in the list accepted the value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no coercion rule matched \"{value}\"")]
pub struct CoercionError {
    pub value: String,
}

impl CoercionError {
    fn new(value: impl fmt::Display) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

fn decode_bool(raw: &str) -> bool {
    if FALSE_LITERALS.contains(&raw) {
        return false;
    }
    !raw.is_empty()
}

fn decode_with_kind(kind: ValueKind, raw: &str) -> Option<AttrValue> {
    match kind {
        ValueKind::Boolean => Some(AttrValue::Bool(decode_bool(raw))),
        ValueKind::Integer => raw.trim().parse::<i64>().ok().map(AttrValue::Int),
        ValueKind::Float => raw.trim().parse::<f64>().ok().map(AttrValue::Float),
        ValueKind::String => Some(AttrValue::Str(raw.to_string())),
    }
}

/// Whole floats inside the `i64` range; anything else would saturate.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral_float(x: f64) -> Option<i64> {
    let range = i64::MIN as f64..i64::MAX as f64;
    (x.fract() == 0.0 && range.contains(&x)).then(|| x as i64)
}

fn encode_with_kind(kind: ValueKind, value: &AttrValue) -> Option<String> {
    match (kind, value) {
        (ValueKind::Boolean, AttrValue::Bool(b)) => Some(b.to_string()),
        (ValueKind::Boolean, AttrValue::Int(i)) => Some((*i != 0).to_string()),
        (ValueKind::Boolean, AttrValue::Str(s)) => Some(decode_bool(s).to_string()),
        (ValueKind::Boolean, AttrValue::Float(_)) => None,
        (ValueKind::Integer, AttrValue::Int(i)) => Some(i.to_string()),
        (ValueKind::Integer, AttrValue::Str(s)) => s.trim().parse::<i64>().ok().map(|i| i.to_string()),
        (ValueKind::Integer, AttrValue::Float(x)) => integral_float(*x).map(|i| i.to_string()),
        (ValueKind::Integer, _) => None,
        (ValueKind::Float, AttrValue::Float(x)) => Some(format_float(*x)),
        #[allow(clippy::cast_precision_loss)]
        (ValueKind::Float, AttrValue::Int(i)) => Some(format_float(*i as f64)),
        (ValueKind::Float, AttrValue::Str(s)) => s.trim().parse::<f64>().ok().map(format_float),
        (ValueKind::Float, AttrValue::Bool(_)) => None,
        (ValueKind::String, value) => Some(value.to_string()),
    }
}

/// Decode a raw attribute string against `rules`.
///
/// # Errors
/// Returns [`CoercionError`] when no rule accepts the value.
pub fn coerce_decode(rules: &[CoercionRule], raw: &str) -> Result<AttrValue, CoercionError> {
    for rule in rules {
        let decoded = match rule {
            CoercionRule::ExactString(expected) => {
                (expected == raw).then(|| AttrValue::Str(raw.to_string()))
            }
            CoercionRule::TypeTag(kind) => decode_with_kind(*kind, raw),
            CoercionRule::CustomFn(custom) => custom.apply(&AttrValue::Str(raw.to_string())).ok(),
        };
        if let Some(value) = decoded {
            return Ok(value);
        }
    }
    Err(CoercionError::new(raw))
}

/// Encode a typed attribute value against `rules`.
///
/// # Errors
/// Returns [`CoercionError`] when no rule accepts the value.
pub fn coerce_encode(rules: &[CoercionRule], value: &AttrValue) -> Result<String, CoercionError> {
    for rule in rules {
        let encoded = match rule {
            CoercionRule::ExactString(expected) => {
                (value.to_string() == *expected).then(|| expected.clone())
            }
            CoercionRule::TypeTag(kind) => encode_with_kind(*kind, value),
            CoercionRule::CustomFn(custom) => custom.apply(value).ok().map(|v| v.to_string()),
        };
        if let Some(encoded) = encoded {
            return Ok(encoded);
        }
    }
    Err(CoercionError::new(value))
}

fn violation(tag: &str, key: &str, value: impl fmt::Display) -> Diagnostic {
    Diagnostic::AttributeSpecViolation {
        tag: tag.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Decode every attribute of an element, in source order.
///
/// Keys missing from a non-empty spec and values no rule accepts are kept
/// as strings and reported as [`Diagnostic::AttributeSpecViolation`].
pub fn decode_attributes(
    tag: &str,
    spec: &AttributeSpec,
    attributes: &IndexMap<String, String>,
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, AttrValue> {
    let mut decoded = IndexMap::with_capacity(attributes.len());
    for (key, raw) in attributes {
        let value = match spec.rules(key) {
            Some(rules) => coerce_decode(rules, raw).unwrap_or_else(|_| {
                diagnostics.push(violation(tag, key, raw));
                AttrValue::Str(raw.clone())
            }),
            None => {
                if !spec.is_empty() {
                    diagnostics.push(violation(tag, key, raw));
                }
                AttrValue::Str(raw.clone())
            }
        };
        decoded.insert(key.clone(), value);
    }
    decoded
}

/// Encode every attribute of an element to strings, in insertion order.
pub fn encode_attributes(
    tag: &str,
    spec: &AttributeSpec,
    attrib: &IndexMap<String, AttrValue>,
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, String> {
    let mut encoded = IndexMap::with_capacity(attrib.len());
    for (key, value) in attrib {
        let text = match spec.rules(key) {
            Some(rules) => coerce_encode(rules, value).unwrap_or_else(|_| {
                diagnostics.push(violation(tag, key, value));
                value.to_string()
            }),
            None => {
                if !spec.is_empty() {
                    diagnostics.push(violation(tag, key, value));
                }
                value.to_string()
            }
        };
        encoded.insert(key.clone(), text);
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bool_rules() -> Vec<CoercionRule> {
        vec![CoercionRule::kind(ValueKind::Boolean)]
    }

    #[test]
    fn test_decode_false_literals() {
        for raw in ["false", "False", "FALSE", ""] {
            assert_eq!(coerce_decode(&bool_rules(), raw), Ok(AttrValue::Bool(false)));
        }
        assert_eq!(coerce_decode(&bool_rules(), "true"), Ok(AttrValue::Bool(true)));
        assert_eq!(coerce_decode(&bool_rules(), "yes"), Ok(AttrValue::Bool(true)));
    }

    #[test]
    fn test_encode_bool_lowercase() {
        assert_eq!(coerce_encode(&bool_rules(), &AttrValue::Bool(false)), Ok("false".to_string()));
        assert_eq!(coerce_encode(&bool_rules(), &AttrValue::Bool(true)), Ok("true".to_string()));
    }

    #[test]
    fn test_exact_then_integer() {
        let rules = vec![CoercionRule::exact("thin"), CoercionRule::kind(ValueKind::Integer)];
        assert_eq!(coerce_decode(&rules, "thin"), Ok(AttrValue::Str("thin".to_string())));
        assert_eq!(coerce_decode(&rules, "4"), Ok(AttrValue::Int(4)));
        assert!(coerce_decode(&rules, "thick").is_err());
    }

    #[test]
    fn test_float_round_trip_keeps_fraction_marker() {
        let rules = vec![CoercionRule::kind(ValueKind::Float)];
        let value = coerce_decode(&rules, "2").unwrap();
        assert_eq!(value, AttrValue::Float(2.0));
        assert_eq!(coerce_encode(&rules, &value), Ok("2.0".to_string()));
        assert_eq!(coerce_encode(&rules, &AttrValue::Float(0.25)), Ok("0.25".to_string()));
    }

    #[test]
    fn test_float_to_integer_range_checked() {
        let rules = [CoercionRule::kind(ValueKind::Integer)];
        assert_eq!(coerce_encode(&rules, &AttrValue::Float(40.0)).unwrap(), "40");
        assert!(coerce_encode(&rules, &AttrValue::Float(1e20)).is_err());
        assert!(coerce_encode(&rules, &AttrValue::Float(-1e20)).is_err());
        assert!(coerce_encode(&rules, &AttrValue::Float(f64::NAN)).is_err());
        assert!(coerce_encode(&rules, &AttrValue::Float(2.5)).is_err());
    }

    #[test]
    fn test_custom_rule_failure_falls_through() {
        let rules = vec![
            CoercionRule::custom("hex", |value| {
                let text = value.to_string();
                let digits = text.strip_prefix('#').ok_or("missing #")?;
                i64::from_str_radix(digits, 16)
                    .map(AttrValue::Int)
                    .map_err(|e| e.to_string())
            }),
            CoercionRule::kind(ValueKind::String),
        ];
        assert_eq!(coerce_decode(&rules, "#ff"), Ok(AttrValue::Int(255)));
        assert_eq!(coerce_decode(&rules, "red"), Ok(AttrValue::Str("red".to_string())));
    }

    #[test]
    fn test_decode_attributes_keeps_violations() {
        let spec = AttributeSpec::new().with("SIZE", [CoercionRule::kind(ValueKind::Integer)]);
        let mut attributes = IndexMap::new();
        attributes.insert("SIZE".to_string(), "big".to_string());
        attributes.insert("EXTRA".to_string(), "1".to_string());

        let mut diagnostics = Diagnostics::new();
        let decoded = decode_attributes("font", &spec, &attributes, &mut diagnostics);

        assert_eq!(decoded["SIZE"], AttrValue::Str("big".to_string()));
        assert_eq!(decoded["EXTRA"], AttrValue::Str("1".to_string()));
        assert_eq!(diagnostics.count_kind("attribute_spec_violation"), 2);
    }

    #[test]
    fn test_empty_spec_accepts_anything() {
        let mut attributes = IndexMap::new();
        attributes.insert("ANY".to_string(), "thing".to_string());

        let mut diagnostics = Diagnostics::new();
        let decoded = decode_attributes("x", &AttributeSpec::new(), &attributes, &mut diagnostics);

        assert_eq!(decoded["ANY"], AttrValue::Str("thing".to_string()));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_encode_attributes_reports_unknown_key() {
        let spec = AttributeSpec::new().with("FOLDED", bool_rules());
        let mut attrib = IndexMap::new();
        attrib.insert("FOLDED".to_string(), AttrValue::Bool(false));
        attrib.insert("WHATEVER".to_string(), AttrValue::Int(3));

        let mut diagnostics = Diagnostics::new();
        let encoded = encode_attributes("node", &spec, &attrib, &mut diagnostics);

        assert_eq!(encoded["FOLDED"], "false");
        assert_eq!(encoded["WHATEVER"], "3");
        assert_eq!(diagnostics.len(), 1);
    }
}
