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

//! Maps the wire representation of an operation to the canonical concepts
//! used by the [Operation][crate::Operation] handle.
//!
//! Different services encode long-running operations in different ways. Some
//! use a `done` boolean, others a status enum. Some report errors in a
//! dedicated field, others have no error field at all. Some pack the response
//! and metadata as type-tagged payloads, others use plain sub-messages. The
//! [OperationSchema] trait captures these differences, so the handle, the
//! callback registry and the wait loop are written once.
//!
//! This crate includes two schemas:
//! * [Aip151] for the `google.longrunning.Operation` message.
//! * [FieldMapping] for generic JSON records, configured by field names.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

mod aip151;
mod generic;
pub use aip151::Aip151;
pub use generic::{DoneFlag, FieldMapping, Record};

/// Values that must be included in every poll request for an operation.
///
/// These are captured from the snapshot that created the operation handle,
/// and are sent unchanged on every reload.
pub type EchoFields = BTreeMap<String, Value>;

/// Defines how to read the canonical fields of an operation snapshot.
///
/// Implementations are pure configuration. They never modify the snapshot and
/// never perform any I/O.
pub trait OperationSchema: Send + Sync + std::fmt::Debug {
    /// The type of snapshot returned by the service.
    type Snapshot: Send + Sync + std::fmt::Debug;

    /// The type used to represent a failed operation.
    type Error: Clone + std::fmt::Debug;

    /// Returns true if the snapshot represents a terminal state.
    fn is_done(&self, snapshot: &Self::Snapshot) -> bool;

    /// Returns the identifier used to poll the operation.
    ///
    /// It may be `None`, in which case the operation cannot be reloaded.
    fn name<'a>(&self, snapshot: &'a Self::Snapshot) -> Option<&'a str>;

    /// Returns the error, if the snapshot carries a non-empty error.
    ///
    /// This ignores the done flag, the handle only calls it for snapshots in a
    /// terminal state.
    fn error(&self, snapshot: &Self::Snapshot) -> Option<Self::Error>;

    /// Returns the response payload, if any.
    fn response(&self, snapshot: &Self::Snapshot) -> Option<wkt::Any>;

    /// Returns the metadata payload, if any.
    fn metadata(&self, snapshot: &Self::Snapshot) -> Option<wkt::Any>;

    /// Returns the error as a type-tagged payload, if the schema supports it.
    ///
    /// The handle consults its error decoders with this payload. Schemas
    /// whose errors are not type-tagged payloads keep the default, and the
    /// error is always the value returned by [error()][Self::error].
    fn error_payload(&self, _snapshot: &Self::Snapshot) -> Option<wkt::Any> {
        None
    }

    /// Returns the values that must be echoed in every poll request.
    fn echo_fields(&self, snapshot: &Self::Snapshot) -> EchoFields;
}

/// A payload decoded to the expected type, or the raw payload.
///
/// The handle decodes response and metadata payloads whose declared type has
/// a registered decoder. Any other payload is returned unchanged, unknown
/// types are not errors.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded<T> {
    /// The payload declared a type with a decoder, and the decoder succeeded.
    Message(T),
    /// The payload declared a different type, no type, or could not be
    /// decoded.
    Raw(wkt::Any),
}

impl<T> Decoded<T> {
    /// Returns the decoded message, if any.
    pub fn message(&self) -> Option<&T> {
        match self {
            Self::Message(m) => Some(m),
            Self::Raw(_) => None,
        }
    }

    /// Returns the raw payload, if the payload was not decoded.
    pub fn raw(&self) -> Option<&wkt::Any> {
        match self {
            Self::Message(_) => None,
            Self::Raw(a) => Some(a),
        }
    }

    /// Consumes the value, returning the decoded message, if any.
    pub fn into_message(self) -> Option<T> {
        match self {
            Self::Message(m) => Some(m),
            Self::Raw(_) => None,
        }
    }
}

/// The disposition of an operation in a terminal state.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<E, R> {
    /// The operation failed.
    Error(E),
    /// The operation completed successfully.
    Response(R),
}

/// A function to decode payloads of one declared type.
pub type DecodeFn<T> = Arc<dyn Fn(&wkt::Any) -> gax::Result<T> + Send + Sync>;

/// Decoders for type-tagged payloads, keyed by the type name they declare.
///
/// The payload's `@type` field selects the decoder. Payloads without a type,
/// or with a type that has no decoder, are returned as [Decoded::Raw]. A
/// failing decoder also yields the raw payload, and logs a warning.
///
/// # Example
/// ```
/// # use cloud_lro::schema::{Decoded, Decoders};
/// # use serde_json::json;
/// let mut decoders = Decoders::<String>::new();
/// decoders.insert("test.v1.Volume", |any| {
///     let name = any.as_map().get("name").and_then(|v| v.as_str());
///     Ok(name.unwrap_or_default().to_string())
/// });
/// let payload = json!({"@type": "type.googleapis.com/test.v1.Volume", "name": "v-001"});
/// let payload = wkt::Any::from_map(payload.as_object().cloned().unwrap());
/// assert_eq!(decoders.decode(payload), Decoded::Message("v-001".to_string()));
/// ```
pub struct Decoders<T> {
    by_type: BTreeMap<String, DecodeFn<T>>,
}

impl<T> Decoders<T> {
    /// Creates an empty registry, where every payload is raw.
    pub fn new() -> Self {
        Self {
            by_type: BTreeMap::new(),
        }
    }

    /// Registers `decoder` for payloads declaring `typename`.
    ///
    /// The `typename` does not include the `type.googleapis.com/` prefix. A
    /// second decoder for the same type replaces the first.
    pub fn insert<N, F>(&mut self, typename: N, decoder: F) -> &mut Self
    where
        N: Into<String>,
        F: Fn(&wkt::Any) -> gax::Result<T> + Send + Sync + 'static,
    {
        self.by_type.insert(typename.into(), Arc::new(decoder));
        self
    }

    /// Returns true if there is a decoder for `typename`.
    pub fn contains(&self, typename: &str) -> bool {
        self.by_type.contains_key(typename)
    }

    /// Decodes `payload` with the decoder for its declared type.
    pub fn decode(&self, payload: wkt::Any) -> Decoded<T> {
        let Some(decoder) = payload.typename().and_then(|t| self.by_type.get(t)) else {
            return Decoded::Raw(payload);
        };
        match decoder(&payload) {
            Ok(m) => Decoded::Message(m),
            Err(e) => {
                tracing::warn!(
                    "cannot decode payload declared as {:?}, returning the raw payload: {e}",
                    payload.typename()
                );
                Decoded::Raw(payload)
            }
        }
    }
}

impl<T> Decoders<T>
where
    T: wkt::message::Message + 'static,
{
    /// Creates a registry with a decoder for `T`.
    ///
    /// When `T` is [wkt::Any] the registry is empty, every payload is
    /// returned raw.
    pub fn for_message() -> Self {
        let mut decoders = Self::new();
        let want = T::typename();
        if want != <wkt::Any as wkt::message::Message>::typename() {
            decoders.insert(want, |any: &wkt::Any| {
                any.to_msg::<T>().map_err(gax::error::Error::deser)
            });
        }
        decoders
    }
}

impl<T> Default for Decoders<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Decoders<T> {
    fn clone(&self) -> Self {
        Self {
            by_type: self.by_type.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Decoders<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.by_type.keys()).finish()
    }
}
