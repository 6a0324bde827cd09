//! Raw parameter values and the loose conversions applied to them
//!
//! Request bodies carry values of unknown shape. `ParamValue` is the closed
//! set of shapes a parameter can take, including `Absent` for a key that is
//! present but carries no value at all. Nested array/object content stays as
//! plain `serde_json::Value` since coercion only ever touches the top level.
//!
//! Conversion rules follow script-engine semantics:
//! - stringification (`5` -> `"5"`, `[1, 2]` -> `"1,2"`)
//! - numeric parsing (`" 12 "` -> `12`, `""` -> `0`, `"abc"` -> NaN)
//! - truthiness (absent, null, false, 0, NaN and `""` are falsy)

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Key present without a value
    Absent,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Any number, including NaN and infinities produced by coercion
    Number(f64),
    /// UTF-8 string
    String(String),
    /// Array of JSON values
    Array(Vec<Value>),
    /// Object of JSON values
    Object(Map<String, Value>),
}

impl ParamValue {
    /// Returns the shape name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Absent => "undefined",
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Number(_) => "number",
            ParamValue::String(_) => "string",
            ParamValue::Array(_) => "array",
            ParamValue::Object(_) => "object",
        }
    }

    /// Returns true for null or absent values.
    pub fn is_nil(&self) -> bool {
        matches!(self, ParamValue::Absent | ParamValue::Null)
    }

    /// Script-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            ParamValue::Absent | ParamValue::Null => false,
            ParamValue::Bool(b) => *b,
            ParamValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ParamValue::String(s) => !s.is_empty(),
            ParamValue::Array(_) | ParamValue::Object(_) => true,
        }
    }

    /// Returns true if the value holds a finite number.
    pub fn is_finite_number(&self) -> bool {
        matches!(self, ParamValue::Number(n) if n.is_finite())
    }

    /// Script-style string conversion.
    pub fn to_js_string(&self) -> String {
        match self {
            ParamValue::Absent => "undefined".to_string(),
            ParamValue::Null => "null".to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Number(n) => format_number(*n),
            ParamValue::String(s) => s.clone(),
            ParamValue::Array(items) => join_array(items),
            ParamValue::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Script-style numeric conversion.
    pub fn to_number(&self) -> f64 {
        match self {
            ParamValue::Absent => f64::NAN,
            ParamValue::Null => 0.0,
            ParamValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            ParamValue::Number(n) => *n,
            ParamValue::String(s) => parse_number(s),
            ParamValue::Array(items) => parse_number(&join_array(items)),
            ParamValue::Object(_) => f64::NAN,
        }
    }

    /// Parses the stringified value as JSON.
    ///
    /// The error carries the parser message, which ends up verbatim in the
    /// coercion failure reported to the caller.
    ///
    /// A bare number literal too large for `f64` parses to infinity instead
    /// of failing. Out-of-range literals nested in arrays or objects still
    /// fail.
    pub fn parse_json(&self) -> Result<ParamValue, String> {
        let text = self.to_js_string();
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(ParamValue::from(value)),
            Err(e) => match overflowing_literal(&text) {
                Some(n) => Ok(ParamValue::Number(n)),
                None => Err(e.to_string()),
            },
        }
    }
}

/// The emptiness predicate used by boolean/array/object coercion and by the
/// required-field checks.
///
/// Absent, null, false, zero, NaN, the empty string, the empty array and the
/// empty object are empty. Every other number and `true` are not.
pub fn is_empty_like(value: &ParamValue) -> bool {
    match value {
        ParamValue::Absent | ParamValue::Null => true,
        ParamValue::Bool(b) => !*b,
        ParamValue::Number(n) => *n == 0.0 || n.is_nan(),
        ParamValue::String(s) => s.is_empty(),
        ParamValue::Array(items) => items.is_empty(),
        ParamValue::Object(map) => map.is_empty(),
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => ParamValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => ParamValue::String(s),
            Value::Array(items) => ParamValue::Array(items),
            Value::Object(map) => ParamValue::Object(map),
        }
    }
}

impl From<&Value> for ParamValue {
    fn from(value: &Value) -> Self {
        ParamValue::from(value.clone())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Absent | ParamValue::Null => serializer.serialize_unit(),
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::Number(n) => serialize_number(*n, serializer),
            ParamValue::String(s) => serializer.serialize_str(s),
            ParamValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ParamValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

/// Integral values go out as integers so `5` does not turn into `5.0`.
/// Non-finite values serialize as null.
fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !n.is_finite() {
        return serializer.serialize_unit();
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serializer.serialize_i64(n as i64);
    }
    serializer.serialize_f64(n)
}

/// Formats a number the way a script engine prints it for ordinary
/// magnitudes.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        // covers -0
        "0".to_string()
    } else {
        n.to_string()
    }
}

fn json_to_js_string(value: &Value) -> String {
    match value {
        // null and undefined elements print as empty inside arrays
        Value::Null => String::new(),
        other => ParamValue::from(other).to_js_string(),
    }
}

fn join_array(items: &[Value]) -> String {
    items
        .iter()
        .map(json_to_js_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Script-style `Number(string)`.
/// `Some(±inf)` when `text` is a single JSON number literal that overflows.
fn overflowing_literal(text: &str) -> Option<f64> {
    let s = text.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);

    let json_number = digits.starts_with(|c: char| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !json_number {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| n.is_infinite())
}

fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits.chars().try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN);
    }

    // Rust accepts "inf" and "nan" spellings that scripts reject
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}
