// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A schema for operations represented as generic JSON records.
//!
//! Older services return a service-specific operation resource, with a status
//! enum instead of a `done` flag, an optional error field, and no standard
//! field for the response. Polling these operations often requires values
//! from the original resource beyond the operation name, such as the zone or
//! region of the operation. [FieldMapping] describes all these fields by
//! name.

use super::{EchoFields, OperationSchema};
use serde_json::{Map, Value};

/// The snapshot type for generic operations.
pub type Record = Map<String, Value>;

const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

/// Describes how to determine if a generic operation is done.
#[derive(Clone, Debug, PartialEq)]
pub enum DoneFlag {
    /// The operation is done when this field is `true`.
    Bool(String),
    /// The operation is done when `field` holds the `terminal` value, or the
    /// literal `true`.
    ///
    /// # Example
    /// ```
    /// # use cloud_lro::schema::DoneFlag;
    /// let flag = DoneFlag::value("status", "DONE");
    /// ```
    Value { field: String, terminal: Value },
}

impl DoneFlag {
    /// Creates a [DoneFlag::Bool] for `field`.
    pub fn boolean<T: Into<String>>(field: T) -> Self {
        Self::Bool(field.into())
    }

    /// Creates a [DoneFlag::Value] for `field` and the `terminal` value.
    pub fn value<T: Into<String>, V: Into<Value>>(field: T, terminal: V) -> Self {
        Self::Value {
            field: field.into(),
            terminal: terminal.into(),
        }
    }

    fn is_done(&self, record: &Record) -> bool {
        match self {
            Self::Bool(field) => record.get(field) == Some(&Value::Bool(true)),
            Self::Value { field, terminal } => record
                .get(field)
                .is_some_and(|v| v == terminal || v == &Value::Bool(true)),
        }
    }
}

/// The [OperationSchema] for generic JSON records.
///
/// # Example
/// ```
/// # use cloud_lro::schema::{DoneFlag, FieldMapping, OperationSchema};
/// # use serde_json::json;
/// let schema = FieldMapping::new("name", DoneFlag::value("status", "DONE"))
///     .with_error_field("error")
///     .with_echo_field("zone");
/// let record = json!({"name": "op-001", "status": "DONE", "zone": "us-central1-a"});
/// let record = record.as_object().unwrap();
/// assert!(schema.is_done(record));
/// assert!(schema.error(record).is_none());
/// assert_eq!(schema.echo_fields(record).get("zone"), Some(&json!("us-central1-a")));
/// ```
#[derive(Clone, Debug)]
pub struct FieldMapping {
    name: String,
    done: DoneFlag,
    error: Option<String>,
    response: Option<String>,
    metadata: Option<String>,
    echo: Vec<String>,
    error_type: Option<String>,
    response_type: Option<String>,
    metadata_type: Option<String>,
}

impl FieldMapping {
    /// Creates a mapping with the name and done fields.
    ///
    /// By default there is no error field, so every completed operation is
    /// successful, and the whole record is the response.
    pub fn new<T: Into<String>>(name: T, done: DoneFlag) -> Self {
        Self {
            name: name.into(),
            done,
            error: None,
            response: None,
            metadata: None,
            echo: Vec::new(),
            error_type: None,
            response_type: None,
            metadata_type: None,
        }
    }

    /// Sets the field holding the error of a failed operation.
    pub fn with_error_field<T: Into<String>>(mut self, v: T) -> Self {
        self.error = Some(v.into());
        self
    }

    /// Sets the field holding the response of a successful operation.
    ///
    /// An object in this field is the payload, as-is. Scalars and arrays are
    /// wrapped as `{"value": <field>}`, and are never decoded.
    pub fn with_response_field<T: Into<String>>(mut self, v: T) -> Self {
        self.response = Some(v.into());
        self
    }

    /// Sets the field holding the metadata of the operation.
    ///
    /// Like the response, scalars and arrays are wrapped as
    /// `{"value": <field>}`, and are never decoded.
    pub fn with_metadata_field<T: Into<String>>(mut self, v: T) -> Self {
        self.metadata = Some(v.into());
        self
    }

    /// Adds a field to copy into every poll request.
    pub fn with_echo_field<T: Into<String>>(mut self, v: T) -> Self {
        self.echo.push(v.into());
        self
    }

    /// Sets the type name for error payloads without a `@type` field.
    pub fn with_error_type<T: Into<String>>(mut self, v: T) -> Self {
        self.error_type = Some(v.into());
        self
    }

    /// Sets the type name for response payloads without a `@type` field.
    pub fn with_response_type<T: Into<String>>(mut self, v: T) -> Self {
        self.response_type = Some(v.into());
        self
    }

    /// Sets the type name for metadata payloads without a `@type` field.
    pub fn with_metadata_type<T: Into<String>>(mut self, v: T) -> Self {
        self.metadata_type = Some(v.into());
        self
    }
}

impl OperationSchema for FieldMapping {
    type Snapshot = Record;
    type Error = Value;

    fn is_done(&self, snapshot: &Record) -> bool {
        self.done.is_done(snapshot)
    }

    fn name<'a>(&self, snapshot: &'a Record) -> Option<&'a str> {
        snapshot.get(&self.name).and_then(Value::as_str)
    }

    fn error(&self, snapshot: &Record) -> Option<Value> {
        let field = self.error.as_ref()?;
        snapshot.get(field).filter(|v| !is_empty(v)).cloned()
    }

    fn error_payload(&self, snapshot: &Record) -> Option<wkt::Any> {
        self.error(snapshot).map(|v| to_any(v, self.error_type.as_deref()))
    }

    fn response(&self, snapshot: &Record) -> Option<wkt::Any> {
        let declared = self.response_type.as_deref();
        match &self.response {
            None => Some(to_any(Value::Object(snapshot.clone()), declared)),
            Some(field) => snapshot
                .get(field)
                .filter(|v| !v.is_null())
                .map(|v| to_any(v.clone(), declared)),
        }
    }

    fn metadata(&self, snapshot: &Record) -> Option<wkt::Any> {
        let field = self.metadata.as_ref()?;
        snapshot
            .get(field)
            .filter(|v| !v.is_null())
            .map(|v| to_any(v.clone(), self.metadata_type.as_deref()))
    }

    fn echo_fields(&self, snapshot: &Record) -> EchoFields {
        self.echo
            .iter()
            .filter_map(|f| snapshot.get(f).map(|v| (f.clone(), v.clone())))
            .collect()
    }
}

/// Returns true for values that represent "no error".
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn to_any(value: Value, declared: Option<&str>) -> wkt::Any {
    let mut map = match value {
        Value::Object(map) => map,
        other => {
            // Scalars and arrays are never decoded, keep them as raw payloads.
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            return wkt::Any::from_map(map);
        }
    };
    if let Some(t) = declared {
        map.entry("@type")
            .or_insert_with(|| Value::String(format!("{TYPE_URL_PREFIX}{t}")));
    }
    wkt::Any::from_map(map)
}
