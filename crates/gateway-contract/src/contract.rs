//! Contract documents.
//!
//! A [`Contract`] is the parsed, fully resolved form of a Swagger 2.0 or
//! OpenAPI 3.x document: its base path plus one [`OperationSchema`] per
//! `(path template, method)` pair. Local `$ref` pointers are inlined at load
//! time; self-referencing schemas are cut off with a permissive schema at the
//! point of recursion.

use crate::schema::OperationSchema;
use gateway_core::{GatewayError, GatewayResult, HttpMethod};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Schema-holding keys whose value is a map of name to schema.
const SCHEMA_MAPS: &[&str] = &["properties", "patternProperties", "definitions"];

/// Schema-holding keys whose value is a single schema.
const SCHEMA_SLOTS: &[&str] = &["items", "additionalProperties", "not"];

/// Schema-holding keys whose value is a list of schemas.
const SCHEMA_LISTS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// Contract dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    /// Swagger 2.0.
    Swagger2,
    /// OpenAPI 3.x.
    OpenApi3,
}

impl fmt::Display for ContractFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swagger2 => f.write_str("Swagger 2.0"),
            Self::OpenApi3 => f.write_str("OpenAPI 3"),
        }
    }
}

/// Identifies one operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    /// Path template exactly as declared, e.g. `/pet/{petId}`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A loaded contract.
#[derive(Debug, Clone)]
pub struct Contract {
    format: ContractFormat,
    title: Option<String>,
    version: Option<String>,
    base_path: String,
    operations: Vec<(OperationKey, OperationSchema)>,
    index: HashMap<OperationKey, usize>,
}

impl Contract {
    /// Parse a contract from raw bytes. JSON is expected; documents that do not
    /// start with `{` are read as YAML.
    pub fn from_slice(bytes: &[u8]) -> GatewayResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| GatewayError::contract_malformed(format!("not valid UTF-8: {e}")))?;

        let document: Value = if text.trim_start().starts_with('{') {
            serde_json::from_str(text)
                .map_err(|e| GatewayError::contract_malformed(format!("not valid JSON: {e}")))?
        } else {
            serde_yaml::from_str(text).map_err(|e| {
                GatewayError::contract_malformed(format!("not valid JSON or YAML: {e}"))
            })?
        };

        Self::from_value(&document)
    }

    /// Build a contract from an already parsed document.
    pub fn from_value(document: &Value) -> GatewayResult<Self> {
        let root = document
            .as_object()
            .ok_or_else(|| GatewayError::contract_malformed("document is not an object"))?;

        let format = detect_format(root)?;
        let base_path = match format {
            ContractFormat::Swagger2 => swagger_base_path(root)?,
            ContractFormat::OpenApi3 => openapi_base_path(root)?,
        };

        let paths = root
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| GatewayError::contract_malformed("missing paths object"))?;

        let resolver = RefResolver::new(document);
        let mut operations = Vec::new();
        let mut index = HashMap::new();

        for (path, item) in paths {
            let Some(item) = item.as_object() else {
                return Err(GatewayError::contract_malformed(format!(
                    "path item {path} is not an object"
                )));
            };
            let shared_parameters = item.get("parameters");

            for (name, operation) in item {
                let Ok(method) = name.parse::<HttpMethod>() else {
                    continue;
                };
                let key = OperationKey {
                    path: path.clone(),
                    method,
                };
                if index.contains_key(&key) {
                    return Err(GatewayError::contract_malformed(format!(
                        "operation {key} is declared more than once"
                    )));
                }

                let pointer = format!("#/paths/{}/{name}", escape_pointer(path));
                let body = match format {
                    ContractFormat::Swagger2 => {
                        swagger_body_schema(&resolver, operation, shared_parameters)?
                    }
                    ContractFormat::OpenApi3 => openapi_body_schema(&resolver, operation)?,
                };
                let schema = match body {
                    Some(raw) => {
                        let resolved = resolver.resolve(&raw)?;
                        OperationSchema::new(resolved, &pointer)?
                    }
                    None => OperationSchema::undeclared(),
                };

                index.insert(key.clone(), operations.len());
                operations.push((key, schema));
            }
        }

        let info = root.get("info");
        let contract = Self {
            format,
            title: info
                .and_then(|i| i.get("title"))
                .and_then(Value::as_str)
                .map(str::to_string),
            version: info
                .and_then(|i| i.get("version"))
                .and_then(Value::as_str)
                .map(str::to_string),
            base_path,
            operations,
            index,
        };

        debug!(
            format = %contract.format,
            base_path = %contract.base_path,
            operations = contract.operations.len(),
            "Contract parsed"
        );

        Ok(contract)
    }

    /// Dialect of the source document.
    pub fn format(&self) -> ContractFormat {
        self.format
    }

    /// `info.title`, if declared.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// `info.version`, if declared.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Path prefix applied to every operation path when building request URLs.
    /// Never ends with `/`; empty when the API is served at the root.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Exact lookup by path template and method.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&OperationSchema> {
        let key = OperationKey {
            path: path.to_string(),
            method,
        };
        self.index.get(&key).map(|&i| &self.operations[i].1)
    }

    /// Look up an operation by path template and a method name in any case.
    pub fn schema_for(&self, path: &str, method: &str) -> GatewayResult<&OperationSchema> {
        method
            .parse::<HttpMethod>()
            .ok()
            .and_then(|m| self.operation(path, m))
            .ok_or_else(|| GatewayError::operation_not_found(path, method))
    }

    /// Resolve a concrete request path such as `/pet/42` to the operation whose
    /// path template matches it, with the method in any case.
    ///
    /// A template identical to `path` wins outright. Otherwise each `{name}`
    /// placeholder stands for one non-empty segment; when several templates
    /// match, the one whose literal segments come first wins, and ties go to
    /// declaration order. Query strings and fragments are ignored.
    pub fn resolve(
        &self,
        path: &str,
        method: &str,
    ) -> GatewayResult<(&OperationKey, &OperationSchema)> {
        let not_found = || GatewayError::operation_not_found(path, method);
        let http_method: HttpMethod = method.parse().map_err(|_| not_found())?;
        let bare = path.split(['?', '#']).next().unwrap_or_default();

        let exact = OperationKey {
            path: bare.to_string(),
            method: http_method,
        };
        if let Some(&i) = self.index.get(&exact) {
            let (key, schema) = &self.operations[i];
            return Ok((key, schema));
        }

        let concrete: Vec<&str> = bare.split('/').collect();
        let mut best: Option<(Vec<bool>, usize)> = None;
        for (i, (key, _)) in self.operations.iter().enumerate() {
            if key.method != http_method {
                continue;
            }
            let Some(rank) = match_template(&key.path, &concrete) else {
                continue;
            };
            if best.as_ref().map_or(true, |(top, _)| rank > *top) {
                best = Some((rank, i));
            }
        }

        let (_, i) = best.ok_or_else(not_found)?;
        let (key, schema) = &self.operations[i];
        debug!(path, template = %key.path, "Resolved request path");
        Ok((key, schema))
    }

    /// All operations in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = (&OperationKey, &OperationSchema)> {
        self.operations.iter().map(|(k, s)| (k, s))
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the contract declares no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Match concrete path segments against a template. On success returns, per
/// segment, whether it matched literally.
fn match_template(template: &str, concrete: &[&str]) -> Option<Vec<bool>> {
    let segments: Vec<&str> = template.split('/').collect();
    if segments.len() != concrete.len() {
        return None;
    }
    segments
        .iter()
        .zip(concrete)
        .map(|(segment, value)| {
            if segment == value {
                Some(true)
            } else if placeholder_matches(segment, value) {
                Some(false)
            } else {
                None
            }
        })
        .collect()
}

/// Whether a segment holding one placeholder (`{id}`, `{id}.json`) matches.
fn placeholder_matches(segment: &str, value: &str) -> bool {
    let Some(open) = segment.find('{') else {
        return false;
    };
    let Some(close) = segment[open..].find('}').map(|i| open + i) else {
        return false;
    };
    let (prefix, suffix) = (&segment[..open], &segment[close + 1..]);
    if suffix.contains('{') {
        return false;
    }
    value.len() > prefix.len() + suffix.len()
        && value.starts_with(prefix)
        && value.ends_with(suffix)
}

fn detect_format(root: &Map<String, Value>) -> GatewayResult<ContractFormat> {
    if let Some(version) = root.get("swagger").and_then(Value::as_str) {
        if version == "2.0" {
            return Ok(ContractFormat::Swagger2);
        }
        return Err(GatewayError::contract_malformed(format!(
            "unsupported swagger version {version:?}"
        )));
    }
    if let Some(version) = root.get("openapi").and_then(Value::as_str) {
        if version.starts_with("3.") {
            return Ok(ContractFormat::OpenApi3);
        }
        return Err(GatewayError::contract_malformed(format!(
            "unsupported openapi version {version:?}"
        )));
    }
    Err(GatewayError::contract_malformed(
        "document declares neither swagger nor openapi version",
    ))
}

fn swagger_base_path(root: &Map<String, Value>) -> GatewayResult<String> {
    let base = root
        .get("basePath")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::contract_malformed("missing basePath"))?;
    Ok(normalize_base_path(base))
}

fn openapi_base_path(root: &Map<String, Value>) -> GatewayResult<String> {
    let Some(server) = root
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
    else {
        return Ok(String::new());
    };

    let url = server
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::contract_malformed("servers[0].url is missing"))?;

    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    Ok(normalize_base_path(&path))
}

fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn swagger_body_schema(
    resolver: &RefResolver<'_>,
    operation: &Value,
    shared_parameters: Option<&Value>,
) -> GatewayResult<Option<Value>> {
    let own = operation.get("parameters").and_then(Value::as_array);
    let shared = shared_parameters.and_then(Value::as_array);

    for parameter in own.into_iter().chain(shared).flatten() {
        let parameter = resolver.follow(parameter)?;
        if parameter.get("in").and_then(Value::as_str) == Some("body") {
            let schema = parameter.get("schema").ok_or_else(|| {
                GatewayError::contract_malformed("body parameter without a schema")
            })?;
            return Ok(Some(schema.clone()));
        }
    }
    Ok(None)
}

fn openapi_body_schema(
    resolver: &RefResolver<'_>,
    operation: &Value,
) -> GatewayResult<Option<Value>> {
    let Some(request_body) = operation.get("requestBody") else {
        return Ok(None);
    };
    let request_body = resolver.follow(request_body)?;
    let Some(content) = request_body.get("content").and_then(Value::as_object) else {
        return Ok(None);
    };

    let media = content.get("application/json").or_else(|| {
        content
            .iter()
            .find(|(media_type, _)| media_type.contains("json"))
            .map(|(_, media)| media)
    });

    match media {
        Some(media) => Ok(Some(
            media
                .get("schema")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        )),
        None => {
            warn!("Request body declares no JSON media type; treating it as undeclared");
            Ok(None)
        }
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Inlines local `$ref` pointers.
struct RefResolver<'a> {
    document: &'a Value,
}

impl<'a> RefResolver<'a> {
    fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// Follow a `$ref` chain on a non-schema object (parameter, request body).
    fn follow<'v>(&self, value: &'v Value) -> GatewayResult<&'v Value>
    where
        'a: 'v,
    {
        let mut current = value;
        let mut seen = Vec::new();
        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            if seen.contains(&reference) {
                return Err(GatewayError::contract_malformed(format!(
                    "circular reference {reference}"
                )));
            }
            seen.push(reference);
            current = self.lookup(reference)?;
        }
        Ok(current)
    }

    /// Return a copy of `schema` with every reference inlined.
    fn resolve(&self, schema: &Value) -> GatewayResult<Value> {
        let mut stack = Vec::new();
        self.resolve_inner(schema, &mut stack)
    }

    fn resolve_inner(&self, schema: &Value, stack: &mut Vec<String>) -> GatewayResult<Value> {
        let Value::Object(map) = schema else {
            return Ok(schema.clone());
        };

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            if stack.iter().any(|seen| seen == reference) {
                debug!(reference, "Recursive schema reference cut off");
                return Ok(Value::Object(Map::new()));
            }
            let target = self.lookup(reference)?;
            stack.push(reference.to_string());
            let resolved = self.resolve_inner(target, stack);
            stack.pop();
            return resolved;
        }

        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            let key_str = key.as_str();
            let resolved = if SCHEMA_MAPS.contains(&key_str) {
                match value {
                    Value::Object(entries) => {
                        let mut resolved = Map::with_capacity(entries.len());
                        for (name, entry) in entries {
                            resolved.insert(name.clone(), self.resolve_inner(entry, stack)?);
                        }
                        Value::Object(resolved)
                    }
                    other => other.clone(),
                }
            } else if SCHEMA_SLOTS.contains(&key_str) {
                self.resolve_inner(value, stack)?
            } else if SCHEMA_LISTS.contains(&key_str) {
                match value {
                    Value::Array(entries) => Value::Array(
                        entries
                            .iter()
                            .map(|entry| self.resolve_inner(entry, stack))
                            .collect::<GatewayResult<_>>()?,
                    ),
                    other => other.clone(),
                }
            } else {
                value.clone()
            };
            out.insert(key.clone(), resolved);
        }
        Ok(Value::Object(out))
    }

    fn lookup(&self, reference: &str) -> GatewayResult<&'a Value> {
        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(GatewayError::contract_malformed(format!(
                "external reference {reference} is not supported"
            )));
        };
        self.document.pointer(pointer).ok_or_else(|| {
            GatewayError::contract_malformed(format!("unresolvable reference {reference}"))
        })
    }
}
