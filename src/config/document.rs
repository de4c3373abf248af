//! Raw document parsing.
//!
//! The source text is decoded into a [`Node`] tree before any semantic check
//! runs. Unlike `serde_json::Value` or `toml::Value`, tables keep every entry
//! in source order, including repeated keys, so validation can report
//! duplicates instead of silently keeping the last one.

use std::fmt;
use std::path::Path;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

/// Supported document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("toml") {
            Some(Format::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Format::Json)
        } else {
            None
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Toml => f.write_str("toml"),
            Format::Json => f.write_str("json"),
        }
    }
}

/// Decoded document value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Table(Vec<(String, Node)>),
}

impl Node {
    /// Short type name used in validation messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(n) if n.is_f64() => "float",
            Node::Number(_) => "integer",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Table(_) => "table",
        }
    }

    /// Convert into an opaque JSON value. Repeated keys keep the last entry.
    pub(crate) fn into_value(self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(b),
            Node::Number(n) => Value::Number(n),
            Node::String(s) => Value::String(s),
            Node::Array(items) => Value::Array(items.into_iter().map(Node::into_value).collect()),
            Node::Table(entries) => Value::Object(into_map(entries)),
        }
    }
}

pub(crate) fn into_map(entries: Vec<(String, Node)>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, node)| (key, node.into_value()))
        .collect()
}

const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any structured value")
    }

    fn visit_unit<E>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Number::from_f64(v)
            .map(Node::Number)
            .ok_or_else(|| E::custom(format!("non-finite number {v} is not supported")))
    }

    fn visit_str<E>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            // `toml` hands datetimes over as a single-entry map under this key.
            if entries.is_empty() && key == TOML_DATETIME_KEY {
                return Ok(Node::String(map.next_value::<String>()?));
            }
            let value = map.next_value::<Node>()?;
            entries.push((key, value));
        }
        Ok(Node::Table(entries))
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

/// Decode `text` into its top-level table entries.
///
/// Returns a human-readable message on failure; the loader wraps it into a
/// malformed-document error.
pub(crate) fn parse(text: &str, format: Format) -> Result<Vec<(String, Node)>, String> {
    let root: Node = match format {
        Format::Toml => toml::from_str(text).map_err(|e| e.to_string())?,
        Format::Json => serde_json::from_str(text).map_err(|e| e.to_string())?,
    };

    match root {
        Node::Table(entries) => Ok(entries),
        other => Err(format!(
            "top-level value must be a table, found {}",
            other.kind()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/toolchain.toml")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("config.JSON")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("truffle-config.js")), None);
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_json_keeps_duplicate_keys() {
        let entries = parse(
            r#"{"networks": {"dev": {"port": 1}, "dev": {"port": 2}}}"#,
            Format::Json,
        )
        .unwrap();
        let Node::Table(networks) = &entries[0].1 else {
            panic!("networks should be a table");
        };
        assert_eq!(networks.len(), 2);
        assert_eq!(networks[0].0, "dev");
        assert_eq!(networks[1].0, "dev");
    }

    #[test]
    fn test_toml_parses_nested_tables() {
        let entries = parse(
            "[networks.dev]\nhost = \"127.0.0.1\"\nport = 8545\n",
            Format::Toml,
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "networks");
    }

    #[test]
    fn test_non_table_root_rejected() {
        let err = parse("[1, 2, 3]", Format::Json).unwrap_err();
        assert!(err.contains("found array"));
    }

    #[test]
    fn test_invalid_syntax_rejected() {
        assert!(parse("{ networks: ", Format::Json).is_err());
        assert!(parse("networks = [", Format::Toml).is_err());
    }

    #[test]
    fn test_toml_datetime_kept_as_text() {
        let entries = parse(
            "[testRunnerOptions]\nsince = 1979-05-27T07:32:00Z\nday = 1979-05-27\n",
            Format::Toml,
        )
        .unwrap();
        let value = entries.into_iter().next().unwrap().1.into_value();
        assert_eq!(
            value,
            serde_json::json!({ "since": "1979-05-27T07:32:00Z", "day": "1979-05-27" })
        );
    }

    #[test]
    fn test_node_kind_and_conversion() {
        let node = Node::Table(vec![
            ("a".into(), Node::Number(1.into())),
            ("a".into(), Node::Number(2.into())),
        ]);
        assert_eq!(node.kind(), "table");
        assert_eq!(node.into_value(), serde_json::json!({ "a": 2 }));
        assert_eq!(Node::Number(Number::from_f64(1.5).unwrap()).kind(), "float");
    }
}
