use serde_json::Value;

use crate::coerce::coerce;

/// Outcome of reading a metric path from one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    Present(f64),
    /// A key on the path is absent, or an intermediate value is not an object.
    Missing,
    /// The terminal value exists but is not numeric ("Not Available", null, ...).
    Malformed,
}

impl Lookup {
    pub fn value(self) -> Option<f64> {
        match self {
            Lookup::Present(v) => Some(v),
            Lookup::Missing | Lookup::Malformed => None,
        }
    }
}

/// Walks `path` key by key into `document`.
pub fn lookup(document: &Value, path: &[String]) -> Lookup {
    let Some((last, parents)) = path.split_last() else {
        return Lookup::Missing;
    };

    let mut current = document;
    for key in parents {
        match current.get(key) {
            Some(next) if next.is_object() => current = next,
            _ => return Lookup::Missing,
        }
    }

    let Some(object) = current.as_object() else {
        return Lookup::Missing;
    };
    match object.get(last) {
        None => Lookup::Missing,
        Some(Value::String(text)) => coerce(text).map_or(Lookup::Malformed, Lookup::Present),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map_or(Lookup::Malformed, Lookup::Present),
        Some(_) => Lookup::Malformed,
    }
}

pub fn resolve(document: &Value, path: &[String]) -> Option<f64> {
    lookup(document, path).value()
}
