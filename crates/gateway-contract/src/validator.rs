//! Request-body conformance checks.
//!
//! The body is walked breadth first, so violations come out level by level
//! and, within a level, in the order the schema declares its properties. Every
//! violation is collected; a value with the wrong type is reported once and not
//! descended into.

use crate::schema::{JsonKind, OperationSchema, SchemaNode};
use crate::store::ContractStore;
use gateway_core::{GatewayError, GatewayResult};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One field-level problem with a request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A required property is absent.
    MissingField {
        /// Path of the absent property.
        field: String,
    },
    /// A value has the wrong JSON type.
    TypeMismatch {
        /// Path of the value.
        field: String,
        /// Expected-type phrase, e.g. `an integer`.
        expected: String,
        /// Kind actually found.
        found: JsonKind,
    },
    /// A value is not one of the enumerated values.
    EnumMismatch {
        /// Path of the value.
        field: String,
        /// Allowed values.
        allowed: Vec<Value>,
        /// Value actually found.
        found: Value,
    },
    /// A string does not match its declared format.
    FormatMismatch {
        /// Path of the value.
        field: String,
        /// Declared format name.
        format: String,
        /// Why the string was rejected.
        reason: String,
    },
}

impl Violation {
    /// Dotted path of the offending field; array elements appear as `[i]`.
    /// Empty for the body itself.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field }
            | Self::TypeMismatch { field, .. }
            | Self::EnumMismatch { field, .. }
            | Self::FormatMismatch { field, .. } => field,
        }
    }

    /// Human-readable reason, without the field prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::MissingField { field } => {
                let name = field.rsplit('.').next().unwrap_or(field);
                format!("The property {name} is required")
            }
            Self::TypeMismatch {
                expected, found, ..
            } => format!("{} value found, but {expected} is required", found.found_label()),
            Self::EnumMismatch { allowed, .. } => format!(
                "Does not have a value in the enumeration {}",
                Value::Array(allowed.clone())
            ),
            Self::FormatMismatch { reason, .. } => reason.clone(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field(), self.reason())
    }
}

/// Result of checking one body.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The body conforms.
    Valid,
    /// The body does not conform; never empty.
    Invalid(Vec<Violation>),
}

impl ValidationOutcome {
    /// Whether the body conforms.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violations, empty when valid.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(violations) => violations,
        }
    }
}

/// Render the failure message for a rejected body.
///
/// The body is re-serialized compactly, followed by one `[field] reason` line
/// per violation.
pub fn diagnostic(body: &Value, violations: &[Violation]) -> String {
    let mut out = format!("Failed asserting that {body} is a valid request body.\n");
    for violation in violations {
        out.push_str(&violation.to_string());
        out.push('\n');
    }
    out
}

/// Parse a request body as JSON.
pub fn parse_body(body: &str) -> GatewayResult<Value> {
    serde_json::from_str(body).map_err(|e| GatewayError::malformed_body(e.to_string()))
}

/// Check a parsed body against a schema.
pub fn validate(schema: &OperationSchema, body: &Value) -> ValidationOutcome {
    let mut violations = Vec::new();
    let mut queue: VecDeque<(String, &SchemaNode, &Value)> = VecDeque::new();

    if check_node(String::new(), schema.root(), body, &mut violations) {
        queue.push_back((String::new(), schema.root(), body));
    }

    while let Some((path, node, value)) = queue.pop_front() {
        match value {
            Value::Object(map) => {
                for (name, child) in &node.properties {
                    let child_path = join_field(&path, name);
                    match map.get(name) {
                        Some(child_value) => {
                            if check_node(child_path.clone(), child, child_value, &mut violations) {
                                queue.push_back((child_path, child, child_value));
                            }
                        }
                        None if node.required.contains(name) => {
                            violations.push(Violation::MissingField { field: child_path });
                        }
                        None => {}
                    }
                }
                for name in &node.required {
                    let declared = node.properties.iter().any(|(p, _)| p == name);
                    if !declared && !map.contains_key(name) {
                        violations.push(Violation::MissingField {
                            field: join_field(&path, name),
                        });
                    }
                }
            }
            Value::Array(items) => {
                if let Some(item_node) = &node.items {
                    for (i, item) in items.iter().enumerate() {
                        let item_path = format!("{path}[{i}]");
                        if check_node(item_path.clone(), item_node, item, &mut violations) {
                            queue.push_back((item_path, item_node, item));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if violations.is_empty() {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid(violations)
    }
}

/// Check a value's own type, enumeration and format. Returns whether its
/// children should be visited.
fn check_node(field: String, node: &SchemaNode, value: &Value, out: &mut Vec<Violation>) -> bool {
    let found = JsonKind::of(value);
    if !node.accepts(found) {
        out.push(Violation::TypeMismatch {
            field,
            expected: node.expected_label(),
            found,
        });
        return false;
    }

    if let Some(allowed) = &node.enumeration {
        if !allowed.contains(value) {
            out.push(Violation::EnumMismatch {
                field: field.clone(),
                allowed: allowed.clone(),
                found: value.clone(),
            });
        }
    }

    if let (Some(format), Value::String(text)) = (&node.format, value) {
        if let Err(reason) = format.check(text) {
            out.push(Violation::FormatMismatch {
                field,
                format: format.name().to_string(),
                reason,
            });
        }
    }

    true
}

fn join_field(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Checks request bodies against the operations of a loaded contract.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    store: Arc<ContractStore>,
}

impl RequestValidator {
    /// Create a validator over a shared store.
    pub fn new(store: Arc<ContractStore>) -> Self {
        Self { store }
    }

    /// Check `body` against the operation at `path`/`method`.
    ///
    /// `path` may be concrete (`/pet/42`) or a declared template. Fails with
    /// `OperationNotFound` before the body is looked at, and with
    /// `MalformedRequestBody` if a non-empty body is not JSON. An empty body is
    /// valid for operations that declare none and is checked as `null`
    /// otherwise.
    pub fn check(&self, path: &str, method: &str, body: &str) -> GatewayResult<ValidationOutcome> {
        Ok(self.run(path, method, body)?.0)
    }

    /// Like [`RequestValidator::check`], but an invalid body becomes a
    /// `ValidationFailed` error carrying the full diagnostic.
    pub fn ensure_valid(&self, path: &str, method: &str, body: &str) -> GatewayResult<()> {
        match self.run(path, method, body)? {
            (ValidationOutcome::Invalid(violations), Some(value)) => {
                Err(GatewayError::validation_failed(diagnostic(&value, &violations)))
            }
            _ => Ok(()),
        }
    }

    fn run(
        &self,
        path: &str,
        method: &str,
        body: &str,
    ) -> GatewayResult<(ValidationOutcome, Option<Value>)> {
        let (_, schema) = self.store.resolve(path, method)?;
        let empty = body.trim().is_empty();

        if !schema.has_body() && empty {
            debug!(path, method, "Operation declares no body; nothing to check");
            return Ok((ValidationOutcome::Valid, None));
        }

        // An absent body is checked as `null`.
        let value = if empty { Value::Null } else { parse_body(body)? };
        let outcome = validate(schema, &value);

        debug!(
            path,
            method,
            violations = outcome.violations().len(),
            "Request body checked"
        );

        Ok((outcome, Some(value)))
    }
}
