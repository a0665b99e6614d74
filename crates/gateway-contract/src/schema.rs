//! Operation schemas.
//!
//! Each operation keeps two views of its request-body schema: the resolved
//! JSON exactly as the contract declares it (returned to callers), and a
//! compiled [`SchemaNode`] tree the validator walks. Compilation happens once,
//! when the contract is loaded.

use gateway_core::{GatewayError, GatewayResult};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Runtime kind of a JSON value, and the vocabulary of declared schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// A number with no fractional part that fits in 64 bits.
    Integer,
    /// Any other number.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl JsonKind {
    /// Kind of a runtime value. Only numbers stored as integers count as
    /// [`JsonKind::Integer`]; `12.0` is a [`JsonKind::Number`].
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Parse a declared schema type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(Self::Null),
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// Whether a value of kind `found` satisfies this declared kind.
    pub fn accepts(self, found: Self) -> bool {
        self == found || (self == Self::Number && found == Self::Integer)
    }

    /// Capitalized name used for the kind that was found.
    pub fn found_label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Number => "Number",
            Self::String => "String",
            Self::Array => "Array",
            Self::Object => "Object",
        }
    }

    /// Name with its indefinite article, used for the kind that was expected.
    pub fn expected_label(self) -> &'static str {
        match self {
            Self::Null => "a null",
            Self::Boolean => "a boolean",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::String => "a string",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.found_label())
    }
}

/// String formats the validator enforces. Anything else (`int64`,
/// `password`, ...) is kept as an annotation and never checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFormat {
    /// RFC 3339 timestamp.
    DateTime,
    /// `YYYY-MM-DD`.
    Date,
    /// Email address.
    Email,
    /// Absolute URI.
    Uri,
    /// Hyphenated UUID.
    Uuid,
    /// Dotted IPv4 address.
    Ipv4,
    /// IPv6 address.
    Ipv6,
    /// Unchecked format name.
    Other(String),
}

impl StringFormat {
    /// Map a declared format name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "date-time" => Self::DateTime,
            "date" => Self::Date,
            "email" => Self::Email,
            "uri" | "url" => Self::Uri,
            "uuid" => Self::Uuid,
            "ipv4" | "ip-address" => Self::Ipv4,
            "ipv6" => Self::Ipv6,
            other => Self::Other(other.to_string()),
        }
    }

    /// Declared name of the format.
    pub fn name(&self) -> &str {
        match self {
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Email => "email",
            Self::Uri => "uri",
            Self::Uuid => "uuid",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Other(name) => name,
        }
    }

    /// Check a string; `Err` carries the human-readable reason.
    pub fn check(&self, value: &str) -> Result<(), String> {
        let ok = match self {
            Self::DateTime => chrono::DateTime::parse_from_rfc3339(value).is_ok(),
            Self::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            Self::Email => is_email(value),
            Self::Uri => url::Url::parse(value).is_ok(),
            Self::Uuid => uuid::Uuid::parse_str(value).is_ok(),
            Self::Ipv4 => value.parse::<Ipv4Addr>().is_ok(),
            Self::Ipv6 => value.parse::<Ipv6Addr>().is_ok(),
            Self::Other(_) => true,
        };

        if ok {
            return Ok(());
        }

        Err(match self {
            Self::DateTime => format!(
                "Invalid date-time {value:?}, expected format YYYY-MM-DDThh:mm:ssZ or YYYY-MM-DDThh:mm:ss+hh:mm"
            ),
            Self::Date => format!("Invalid date {value:?}, expected format YYYY-MM-DD"),
            Self::Email => "Invalid email".to_string(),
            Self::Uri => "Invalid URL format".to_string(),
            Self::Uuid => format!("Invalid UUID {value:?}"),
            Self::Ipv4 => "Invalid IP address".to_string(),
            Self::Ipv6 => "Invalid IPv6 address".to_string(),
            Self::Other(_) => String::new(),
        })
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Compiled constraints for one schema position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// Accepted kinds; empty accepts anything.
    pub types: Vec<JsonKind>,
    /// Format constraint for string values.
    pub format: Option<StringFormat>,
    /// Allowed values, if enumerated.
    pub enumeration: Option<Vec<Value>>,
    /// Required property names, in declaration order.
    pub required: Vec<String>,
    /// Property schemas, in declaration order.
    pub properties: Vec<(String, SchemaNode)>,
    /// Schema for array items.
    pub items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    /// Compile a resolved (ref-free) schema. `pointer` locates the schema in
    /// the contract for error messages.
    pub fn compile(schema: &Value, pointer: &str) -> GatewayResult<Self> {
        let map = match schema {
            Value::Object(map) => map,
            Value::Bool(true) => return Ok(Self::default()),
            _ => {
                return Err(GatewayError::contract_malformed(format!(
                    "schema at {pointer} must be an object"
                )))
            }
        };

        let mut node = Self::default();

        match map.get("type") {
            None => {}
            Some(Value::String(name)) => node.types.push(parse_type(name, pointer)?),
            Some(Value::Array(names)) => {
                for name in names {
                    let name = name.as_str().ok_or_else(|| {
                        GatewayError::contract_malformed(format!(
                            "type list at {pointer} must contain strings"
                        ))
                    })?;
                    node.types.push(parse_type(name, pointer)?);
                }
            }
            Some(_) => {
                return Err(GatewayError::contract_malformed(format!(
                    "type at {pointer} must be a string or a list of strings"
                )))
            }
        }

        if let Some(Value::String(format)) = map.get("format") {
            node.format = Some(StringFormat::from_name(format));
        }

        match map.get("enum") {
            None => {}
            Some(Value::Array(values)) => node.enumeration = Some(values.clone()),
            Some(_) => {
                return Err(GatewayError::contract_malformed(format!(
                    "enum at {pointer} must be a list"
                )))
            }
        }

        // Draft-3 style `required: true` on a property is not a list; ignore it.
        if let Some(Value::Array(names)) = map.get("required") {
            for name in names {
                let name = name.as_str().ok_or_else(|| {
                    GatewayError::contract_malformed(format!(
                        "required list at {pointer} must contain strings"
                    ))
                })?;
                node.required.push(name.to_string());
            }
        }

        if let Some(Value::Object(properties)) = map.get("properties") {
            for (name, property) in properties {
                let child = Self::compile(property, &format!("{pointer}/properties/{name}"))?;
                node.properties.push((name.clone(), child));
            }
        }

        if let Some(items @ Value::Object(_)) = map.get("items") {
            node.items = Some(Box::new(Self::compile(items, &format!("{pointer}/items"))?));
        }

        if let Some(Value::Array(parts)) = map.get("allOf") {
            for (i, part) in parts.iter().enumerate() {
                let part = Self::compile(part, &format!("{pointer}/allOf/{i}"))?;
                node.merge(part);
            }
        }

        Ok(node)
    }

    /// Fold an `allOf` member into this node.
    fn merge(&mut self, other: Self) {
        if self.types.is_empty() {
            self.types = other.types;
        }
        if self.format.is_none() {
            self.format = other.format;
        }
        if self.enumeration.is_none() {
            self.enumeration = other.enumeration;
        }
        for name in other.required {
            if !self.required.contains(&name) {
                self.required.push(name);
            }
        }
        for (name, property) in other.properties {
            if !self.properties.iter().any(|(existing, _)| *existing == name) {
                self.properties.push((name, property));
            }
        }
        if self.items.is_none() {
            self.items = other.items;
        }
    }

    /// Whether a value of kind `found` satisfies the declared type.
    pub fn accepts(&self, found: JsonKind) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t.accepts(found))
    }

    /// Expected-type phrase, e.g. `an integer` or `a string or a null`.
    pub fn expected_label(&self) -> String {
        self.types
            .iter()
            .map(|t| t.expected_label())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

fn parse_type(name: &str, pointer: &str) -> GatewayResult<JsonKind> {
    JsonKind::from_type_name(name).ok_or_else(|| {
        GatewayError::contract_malformed(format!("unsupported type {name:?} at {pointer}"))
    })
}

/// Request-body schema of a single operation.
#[derive(Debug, Clone)]
pub struct OperationSchema {
    raw: Value,
    root: SchemaNode,
    declared: bool,
}

impl OperationSchema {
    /// Build from a resolved schema.
    pub fn new(raw: Value, pointer: &str) -> GatewayResult<Self> {
        let root = SchemaNode::compile(&raw, pointer)?;
        Ok(Self {
            raw,
            root,
            declared: true,
        })
    }

    /// Schema for an operation that declares no request body. It accepts any
    /// value.
    pub fn undeclared() -> Self {
        Self {
            raw: Value::Object(serde_json::Map::new()),
            root: SchemaNode::default(),
            declared: false,
        }
    }

    /// Whether the operation declares a request body.
    pub fn has_body(&self) -> bool {
        self.declared
    }

    /// The schema as the contract declares it, with references inlined.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Compiled constraint tree.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Serialize the schema as compact or pretty-printed JSON.
    pub fn to_json(&self, pretty: bool) -> GatewayResult<String> {
        let text = if pretty {
            serde_json::to_string_pretty(&self.raw)
        } else {
            serde_json::to_string(&self.raw)
        };
        text.map_err(|e| GatewayError::internal(format!("failed to serialize schema: {e}")))
    }
}

impl PartialEq for OperationSchema {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Serialize for OperationSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}
