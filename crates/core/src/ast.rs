//! Generic AST produced by the parser.
//!
//! The tree is purely syntactic: every value in a `.tdt` document is one of
//! seven shapes. Interpretation of constructor names and keys belongs to the
//! domain mapper.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

// ──────────────────────────────────────────────
// Numbers
// ──────────────────────────────────────────────

/// A numeric literal. Decimals keep their source text so money amounts can
/// be converted without going through binary floating point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(String),
}

impl Number {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(n) => Some(*n),
            Number::Float(s) => Decimal::from_str(s)
                .ok()
                .and_then(|d| i64::try_from(d.trunc()).ok()),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(n) => *n as f64,
            Number::Float(s) => s.parse().unwrap_or(0.0),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Number::Int(n) => Some(Decimal::from(*n)),
            Number::Float(s) => Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok(),
        }
    }
}

// ──────────────────────────────────────────────
// Object entries
// ──────────────────────────────────────────────

/// Ordered key/value entries of an object literal.
///
/// Declaration order is preserved. Re-inserting an existing key replaces the
/// value in place (last wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entries(Vec<(String, Node)>);

impl Entries {
    pub fn new() -> Self {
        Entries(Vec::new())
    }

    pub fn insert(&mut self, key: String, value: Node) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Entries {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ──────────────────────────────────────────────
// Nodes
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Object {
        entries: Entries,
    },
    Array {
        items: Vec<Node>,
    },
    String {
        value: String,
    },
    Number {
        value: Number,
    },
    /// `None` is the `null` sentinel.
    Bool {
        value: Option<bool>,
    },
    /// `new Ctor(arg)`; `ctor` is dot-joined when namespaced.
    New {
        ctor: String,
        arg: Box<Node>,
    },
    /// `object.method(arg)`, e.g. `Map.from([...])`.
    Call {
        object: String,
        method: String,
        arg: Box<Node>,
    },
}

impl Node {
    pub fn as_object(&self) -> Option<&Entries> {
        match self {
            Node::Object { entries } => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array { items } => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String { value } => Some(value),
            _ => None,
        }
    }

    /// If this is a `new` expression, its constructor name and argument.
    pub fn as_new(&self) -> Option<(&str, &Node)> {
        match self {
            Node::New { ctor, arg } => Some((ctor, arg)),
            _ => None,
        }
    }

    /// Short shape name for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Node::Object { .. } => "object",
            Node::Array { .. } => "array",
            Node::String { .. } => "string",
            Node::Number { .. } => "number",
            Node::Bool { .. } => "boolean",
            Node::New { .. } => "new-expression",
            Node::Call { .. } => "call-expression",
        }
    }
}

// ──────────────────────────────────────────────
// Scalars
// ──────────────────────────────────────────────

/// A leaf value extracted from an object entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    Str(&'a str),
    Num(&'a Number),
    Bool(bool),
}

impl Scalar<'_> {
    pub fn as_string(&self) -> String {
        match self {
            Scalar::Str(s) => (*s).to_string(),
            Scalar::Num(Number::Int(n)) => n.to_string(),
            Scalar::Num(Number::Float(s)) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Num(n) => n.as_i64(),
            Scalar::Str(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Scalar::Num(n) => n.as_decimal(),
            Scalar::Str(s) => Decimal::from_str(s.trim()).ok(),
            Scalar::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Num(n) => Some(n.as_f64() != 0.0),
            Scalar::Str(_) => None,
        }
    }
}

/// Look up `key` and return it only if it is a String, Number or non-null
/// Boolean leaf.
pub fn get_scalar<'a>(entries: &'a Entries, key: &str) -> Option<Scalar<'a>> {
    match entries.get(key)? {
        Node::String { value } => Some(Scalar::Str(value)),
        Node::Number { value } => Some(Scalar::Num(value)),
        Node::Bool { value: Some(b) } => Some(Scalar::Bool(*b)),
        _ => None,
    }
}
