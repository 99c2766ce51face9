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

//! The polling collaborator.
//!
//! The operation handle never talks to a service directly. It sends every
//! poll, cancel and delete request through an [OperationsStub]. Client
//! libraries implement this trait over their transport. Applications may
//! implement it in tests, to simulate operations without a service.

use crate::schema::EchoFields;
use gax::Result;
use gax::error::Error;
use gax::error::rpc::{Code, Status};
use gax::options::CallOptions;

/// The request sent to poll an operation.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct PollRequest {
    /// The name (or identifier) of the operation.
    pub name: String,

    /// Values captured from the snapshot that created the operation handle.
    pub echo_fields: EchoFields,
}

impl PollRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of [name][PollRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value of [echo_fields][PollRequest::echo_fields].
    pub fn set_echo_fields<T, K, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.echo_fields = v.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }
}

/// Performs the round trips needed by an operation handle.
///
/// A single stub may back many operation handles, possibly on different
/// threads, so implementations must be `Send` and `Sync`.
///
/// # Parameters
/// * `T` - the snapshot type, as returned by the service.
pub trait OperationsStub<T>: Send + Sync + std::fmt::Debug {
    /// Fetches the latest state of an operation.
    ///
    /// This performs exactly one round trip.
    fn get_operation(&self, req: PollRequest, options: &CallOptions) -> Result<T>;

    /// Starts the cancellation of an operation.
    ///
    /// The default implementation returns an error, services without
    /// cancellation support need not implement it.
    fn cancel_operation(&self, _name: &str, _options: &CallOptions) -> Result<()> {
        Err(unimplemented("cancel_operation"))
    }

    /// Deletes an operation.
    ///
    /// The default implementation returns an error, services without
    /// operation deletion need not implement it.
    fn delete_operation(&self, _name: &str, _options: &CallOptions) -> Result<()> {
        Err(unimplemented("delete_operation"))
    }
}

fn unimplemented(method: &str) -> Error {
    Error::service(
        Status::default()
            .set_code(Code::Unimplemented)
            .set_message(format!("{method} is not supported by this stub")),
    )
}
