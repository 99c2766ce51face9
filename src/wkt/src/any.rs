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

use crate::message::{Message, TYPE_URL_PREFIX, WELL_KNOWN_PREFIX, type_url};

/// The JSON object holding the contents of an [Any].
pub type Map = serde_json::Map<String, serde_json::Value>;

/// `Any` contains an arbitrary serialized message along with a URL that
/// describes the type of the serialized message.
///
/// # JSON
///
/// The JSON representation of an `Any` value uses the regular
/// representation of the embedded message, with an additional field `@type`
/// which contains the type URL. Example:
///
/// ```norust
///     {
///       "@type": "type.googleapis.com/google.profile.Person",
///       "firstName": <string>,
///       "lastName": <string>
///     }
/// ```
///
/// If the embedded message type is well-known and has a custom JSON
/// representation, that representation is embedded in a field named `value`:
///
/// ```norust
///     {
///       "@type": "type.googleapis.com/google.protobuf.Duration",
///       "value": "1.212s"
///     }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct Any(Map);

/// Indicates a problem trying to use an [Any].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AnyError {
    /// Problem serializing an object into an [Any].
    #[error("cannot serialize object into an Any, source={0}")]
    Serialization(#[source] BoxError),

    /// Problem deserializing an object from an [Any].
    #[error("cannot deserialize from an Any, source={0}")]
    Deserialization(#[source] BoxError),

    /// The [Any] does not contain the desired type.
    #[error(
        "mismatched typenames extracting from Any, the any has {has}, the target type is {want}"
    )]
    TypeMismatch { has: String, want: String },

    /// The [Any] does not declare the type of its contents.
    #[error("the Any has no @type field, or the field is not a string")]
    MissingType,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type Error = AnyError;

impl AnyError {
    pub(crate) fn ser<T: Into<BoxError>>(v: T) -> Self {
        Self::Serialization(v.into())
    }

    pub(crate) fn deser<T: Into<BoxError>>(v: T) -> Self {
        Self::Deserialization(v.into())
    }
}

impl Any {
    /// Packs a message into an [Any].
    ///
    /// # Example
    /// ```
    /// # use cloud_wkt::{Any, AnyError};
    /// # use cloud_wkt::message::Message;
    /// #[derive(serde::Serialize, serde::Deserialize)]
    /// struct Resource { name: String }
    /// impl Message for Resource {
    ///     fn typename() -> &'static str { "example.v1.Resource" }
    /// }
    /// let any = Any::from_msg(&Resource { name: "r-001".into() })?;
    /// assert_eq!(any.type_url(), Some("type.googleapis.com/example.v1.Resource"));
    /// # Ok::<(), AnyError>(())
    /// ```
    pub fn from_msg<T>(message: &T) -> Result<Self, Error>
    where
        T: Message,
    {
        use serde_json::Value;
        let value = serde_json::to_value(message).map_err(Error::ser)?;
        let well_known = T::typename().starts_with(WELL_KNOWN_PREFIX);
        let mut map = match value {
            Value::Object(map) if !well_known => map,
            Value::Array(_) | Value::Null => {
                return Err(Error::ser(
                    "unexpected JSON type, only Object and scalars are supported",
                ));
            }
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        map.insert("@type".to_string(), Value::String(type_url::<T>()));
        Ok(Self(map))
    }

    /// Wraps an existing JSON object, with or without an `@type` field.
    pub fn from_map(map: Map) -> Self {
        Self(map)
    }

    /// The JSON object held by this [Any].
    pub fn as_map(&self) -> &Map {
        &self.0
    }

    /// The type URL declared by the payload, if any.
    pub fn type_url(&self) -> Option<&str> {
        self.0.get("@type").and_then(|v| v.as_str())
    }

    /// The type name declared by the payload, without the type URL prefix.
    pub fn typename(&self) -> Option<&str> {
        self.type_url()
            .map(|url| url.strip_prefix(TYPE_URL_PREFIX).unwrap_or(url))
    }

    /// Extracts (if possible) a `T` value from the [Any].
    ///
    /// Fails with [AnyError::MissingType] if the payload does not declare a
    /// type, and with [AnyError::TypeMismatch] if it declares a type other
    /// than `T`.
    pub fn to_msg<T>(&self) -> Result<T, Error>
    where
        T: Message,
    {
        let has = self.typename().ok_or(Error::MissingType)?;
        if has != T::typename() {
            return Err(Error::TypeMismatch {
                has: has.to_string(),
                want: T::typename().to_string(),
            });
        }
        if T::typename().starts_with(WELL_KNOWN_PREFIX) {
            return self
                .0
                .get("value")
                .map(|v| serde_json::from_value::<T>(v.clone()))
                .ok_or_else(|| Error::deser("value field is missing"))?
                .map_err(Error::deser);
        }
        let mut map = self.0.clone();
        map.remove("@type");
        serde_json::from_value::<T>(serde_json::Value::Object(map)).map_err(Error::deser)
    }
}

impl Message for Any {
    fn typename() -> &'static str {
        "google.protobuf.Any"
    }
}

impl serde::ser::Serialize for Any {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> serde::de::Deserialize<'de> for Any {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Map::deserialize(deserializer)?;
        Ok(Any(value))
    }
}
