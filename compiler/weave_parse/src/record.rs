//! The JSON-lines record stream.
//!
//! Each non-blank line is one object with a `kind` and flat attributes:
//!
//! ```text
//! {"kind": "Class", "id": "_5", "name": "Base", "context": "_1", "members": "_6 _7"}
//! ```
//!
//! Attribute values may be strings, numbers or booleans. They are kept as
//! text so every attribute is read the same way regardless of how the
//! producing tool chose to encode it.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::SchemaError;

/// Record kinds of the introspection schema.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Deserialize)]
pub enum RecordKind {
    Namespace,
    Class,
    Struct,
    Union,
    Field,
    Variable,
    Constructor,
    Destructor,
    Method,
    Function,
    OperatorMethod,
    OperatorFunction,
    Converter,
    Argument,
    Ellipsis,
    EnumValue,
    Enumeration,
    Typedef,
    FundamentalType,
    PointerType,
    ReferenceType,
    CvQualifiedType,
    ArrayType,
    FunctionType,
    MethodType,
    OffsetType,
    File,
    /// Anything else the producer emits. Skipped by the scanner.
    #[serde(other)]
    Unknown,
}

impl RecordKind {
    /// Records that only add data to the enclosing container.
    pub fn is_attribute_only(self) -> bool {
        matches!(
            self,
            RecordKind::Argument | RecordKind::Ellipsis | RecordKind::EnumValue
        )
    }

    /// Records that open a container for following attribute-only records.
    pub fn is_deep(self) -> bool {
        matches!(
            self,
            RecordKind::Constructor
                | RecordKind::Destructor
                | RecordKind::Method
                | RecordKind::Function
                | RecordKind::OperatorMethod
                | RecordKind::OperatorFunction
                | RecordKind::Converter
                | RecordKind::Enumeration
                | RecordKind::FunctionType
                | RecordKind::MethodType
                | RecordKind::File
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl WireValue {
    fn into_text(self) -> String {
        match self {
            WireValue::Text(text) => text,
            WireValue::Integer(value) => value.to_string(),
            WireValue::Unsigned(value) => value.to_string(),
            WireValue::Float(value) => value.to_string(),
            WireValue::Bool(value) => (if value { "1" } else { "0" }).to_owned(),
        }
    }
}

#[derive(Deserialize)]
struct WireRecord {
    kind: RecordKind,
    #[serde(flatten)]
    attrs: BTreeMap<String, WireValue>,
}

/// One record of the dump.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Record {
    pub kind: RecordKind,
    /// The kind as spelled in the input (meaningful for `Unknown`).
    pub kind_name: String,
    /// 1-based input line.
    pub line: usize,
    attrs: BTreeMap<String, String>,
}

impl Record {
    /// Build a record directly (used by producers that do not go through
    /// JSON).
    pub fn new<'a>(
        kind: RecordKind,
        line: usize,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Record {
            kind,
            kind_name: format!("{kind:?}"),
            line,
            attrs: attrs
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn require(&self, name: &'static str) -> Result<&str, SchemaError> {
        self.attr(name).ok_or_else(|| SchemaError::MissingAttribute {
            line: self.line,
            kind: self.kind_name.clone(),
            attribute: name,
        })
    }

    /// Boolean attribute; absent means `false`.
    pub fn flag(&self, name: &'static str) -> Result<bool, SchemaError> {
        match self.attr(name) {
            None => Ok(false),
            Some("1" | "true") => Ok(true),
            Some("0" | "false" | "") => Ok(false),
            Some(other) => Err(self.invalid(name, other)),
        }
    }

    /// Numeric attribute; absent or empty means `None`.
    pub fn number<T: std::str::FromStr>(
        &self,
        name: &'static str,
    ) -> Result<Option<T>, SchemaError> {
        match self.attr(name) {
            None | Some("") => Ok(None),
            Some(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(name, text)),
        }
    }

    pub fn invalid(&self, attribute: &'static str, value: &str) -> SchemaError {
        SchemaError::InvalidAttribute {
            line: self.line,
            kind: self.kind_name.clone(),
            attribute,
            value: value.to_owned(),
        }
    }
}

/// Parse a JSON-lines dump. Blank lines are skipped.
pub fn parse_records(text: &str) -> Result<Vec<Record>, SchemaError> {
    let mut records = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|err| SchemaError::Malformed {
                line,
                message: err.to_string(),
            })?;
        let kind_name = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let wire: WireRecord =
            serde_json::from_value(value).map_err(|err| SchemaError::Malformed {
                line,
                message: err.to_string(),
            })?;
        records.push(Record {
            kind: wire.kind,
            kind_name,
            line,
            attrs: wire
                .attrs
                .into_iter()
                .map(|(key, value)| (key, value.into_text()))
                .collect(),
        });
    }
    Ok(records)
}
