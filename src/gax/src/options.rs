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

//! Per request options.
//!
//! The long-running operation helpers use these options on every poll round
//! trip. Applications set defaults when they create an operation handle, and
//! may override them for a single reload or wait.

use http::HeaderMap;
use std::time::Duration;

/// A set of options configuring a single poll (or cancel, or delete) request.
///
/// The options are passed, unmodified, to the polling collaborator.
///
/// # Example
/// ```
/// # use cloud_gax::options::CallOptions;
/// use std::time::Duration;
/// let options = CallOptions::default()
///     .with_timeout(Duration::from_secs(5))
///     .with_metadata("x-goog-request-params", "name=projects/p/operations/o");
/// assert_eq!(options.timeout(), &Some(Duration::from_secs(5)));
/// assert!(options.metadata().contains_key("x-goog-request-params"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallOptions {
    timeout: Option<Duration>,
    metadata: HeaderMap,
}

impl CallOptions {
    /// Sets the timeout for each request.
    pub fn set_timeout<T: Into<Duration>>(&mut self, v: T) {
        self.timeout = Some(v.into());
    }

    /// Gets the current per-request timeout.
    pub fn timeout(&self) -> &Option<Duration> {
        &self.timeout
    }

    /// Adds a metadata (header) entry to each request.
    ///
    /// Entries with names or values that are not valid HTTP headers are
    /// ignored.
    pub fn add_metadata<K, V>(&mut self, key: K, value: V)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (Ok(k), Ok(v)) = (
            http::HeaderName::from_bytes(key.as_ref().as_bytes()),
            http::HeaderValue::from_str(value.as_ref()),
        ) else {
            return;
        };
        self.metadata.append(k, v);
    }

    /// Replaces all the metadata entries.
    pub fn set_metadata(&mut self, v: HeaderMap) {
        self.metadata = v;
    }

    /// Gets the current metadata entries.
    pub fn metadata(&self) -> &HeaderMap {
        &self.metadata
    }

    /// Builder-style version of [set_timeout][Self::set_timeout].
    pub fn with_timeout<T: Into<Duration>>(mut self, v: T) -> Self {
        self.set_timeout(v);
        self
    }

    /// Builder-style version of [add_metadata][Self::add_metadata].
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.add_metadata(key, value);
        self
    }
}
