//! Cache keys: endpoint name plus a stable serialization of its arguments

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::Result;

/// Identity of one cached query result
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    endpoint: &'static str,
    args: String,
}

impl QueryKey {
    /// Build a key from an endpoint name and its parameters
    pub fn new<P: Serialize + ?Sized>(endpoint: &'static str, params: &P) -> Result<Self> {
        let value = serde_json::to_value(params)?;
        Ok(Self {
            endpoint,
            args: stable_serialize(&value),
        })
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn args(&self) -> &str {
        &self.args
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.endpoint, self.args)
    }
}

/// Serialize with object keys sorted at every depth and nulls dropped
pub fn stable_serialize(value: &Value) -> String {
    let mut out = String::new();
    write_stable(value, &mut out);
    out
}

fn write_stable(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().filter(|(_, v)| !v.is_null()).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_stable(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_stable(v, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"page":1,"limit":10,"search":"ann"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"search":"ann","page":1,"limit":10}"#).unwrap();
        assert_eq!(
            QueryKey::new("getRiders", &a).unwrap(),
            QueryKey::new("getRiders", &b).unwrap()
        );
    }

    #[test]
    fn test_absent_fields_equal_nulls() {
        let a = json!({ "page": 1, "status": null });
        let b = json!({ "page": 1 });
        assert_eq!(stable_serialize(&a), stable_serialize(&b));
    }

    #[test]
    fn test_nested_and_distinct() {
        let a = json!({ "b": { "y": 2, "x": 1 }, "a": [3, { "k": "v" }] });
        assert_eq!(stable_serialize(&a), r#"{"a":[3,{"k":"v"}],"b":{"x":1,"y":2}}"#);

        let k1 = QueryKey::new("getRiders", &json!({ "page": 1 })).unwrap();
        let k2 = QueryKey::new("getRiders", &json!({ "page": 2 })).unwrap();
        let k3 = QueryKey::new("getDrivers", &json!({ "page": 1 })).unwrap();
        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
        assert_eq!(k1.to_string(), r#"getRiders({"page":1})"#);
    }
}
