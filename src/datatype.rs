// used for the timestamps every record carries
use chrono::{DateTime, NaiveDateTime, Utc};

// used to print out readable forms of a value
use std::fmt;

// timestamps are written with microsecond precision and read back leniently
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_PARSE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

// ------------- Value -------------
/// The value of a single record attribute.
///
/// Lists, objects and nulls arrive through mapping updates and persisted
/// data; they are kept as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Json(serde_json::Value),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Str(_) => ValueType::Str,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::Json(_) => ValueType::Json,
        }
    }
    /// Infers the type of a literal that has no attribute to match against.
    ///
    /// A quoted literal is always a string. Otherwise a literal containing a
    /// period becomes a float if it parses as one, anything else an integer
    /// if it parses as one, and whatever is left stays a string. Integer
    /// literals too large for an i64 become floats.
    pub fn infer(raw: &str, quoted: bool) -> Value {
        if quoted {
            return Value::Str(raw.to_string());
        }
        let inferred = if raw.contains('.') {
            ValueType::Float.construct(raw)
        } else if is_integer_literal(raw) {
            ValueType::Int
                .construct(raw)
                .or_else(|| ValueType::Float.construct(raw))
        } else {
            None
        };
        inferred.unwrap_or_else(|| Value::Str(raw.to_string()))
    }
}

// an optional sign followed by digits only
fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Json(serde_json::Value::Number(n))
                }
            }
            other => Value::Json(other),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            // non-finite floats have no JSON form
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Json(json) => json.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the fraction on whole floats, so 3.0 does not print as an int
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Json(json) => write!(f, "{}", json),
        }
    }
}

// ------------- ValueType -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Str,
    Int,
    Float,
    Bool,
    Json,
}

impl ValueType {
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Json => "json",
        }
    }
    /// Builds a value of this type straight from text, or `None` when the
    /// text is not a valid literal of the type.
    pub fn construct(self, raw: &str) -> Option<Value> {
        match self {
            ValueType::Str => Some(Value::Str(raw.to_string())),
            ValueType::Int => raw.trim().parse::<i64>().ok().map(Value::Int),
            // inf and NaN have no JSON form, so they never make it into a record
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(Value::Float),
            ValueType::Bool => match raw.trim() {
                "true" | "True" => Some(Value::Bool(true)),
                "false" | "False" => Some(Value::Bool(false)),
                _ => None,
            },
            ValueType::Json => serde_json::from_str(raw).ok().map(Value::Json),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
