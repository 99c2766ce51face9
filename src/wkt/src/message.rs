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

//! Defines the [Message] trait, implemented by all types that can be stored
//! in an [Any][crate::Any].

/// A message with a well-defined type name.
///
/// The type name identifies the message when it is packed into an
/// [Any][crate::Any], and it selects the decode target when the `Any` is
/// unpacked.
pub trait Message: serde::ser::Serialize + serde::de::DeserializeOwned {
    /// The typename of this message, e.g. `google.rpc.Status`.
    fn typename() -> &'static str;
}

/// The prefix used in the `@type` field of [Any][crate::Any] values.
pub(crate) const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

/// Messages in this namespace use a custom JSON representation, stored in
/// the `value` field of the [Any][crate::Any].
pub(crate) const WELL_KNOWN_PREFIX: &str = "google.protobuf.";

pub(crate) fn type_url<T: Message>() -> String {
    format!("{TYPE_URL_PREFIX}{}", T::typename())
}
