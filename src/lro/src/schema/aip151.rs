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

//! The schema for [AIP-151] long-running operations.
//!
//! [AIP-151]: https://google.aip.dev/151

use super::{EchoFields, OperationSchema};
use gax::error::rpc::Status;
use longrunning::model::Operation;

/// The [OperationSchema] for `google.longrunning.Operation`.
///
/// The operation is done when its `done` field is `true`. A completed
/// operation holds either an error or a response in its `result` field.
/// Note that an error holding a default [Status] is still an error, the
/// presence of the oneof branch is what matters.
///
/// These operations need no echo fields, their name is enough to poll them.
/// The error is a [Status], not a type-tagged payload, so the handle's error
/// decoders are never consulted.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aip151;

impl OperationSchema for Aip151 {
    type Snapshot = Operation;
    type Error = Status;

    fn is_done(&self, snapshot: &Operation) -> bool {
        snapshot.done
    }

    fn name<'a>(&self, snapshot: &'a Operation) -> Option<&'a str> {
        Some(snapshot.name.as_str()).filter(|n| !n.is_empty())
    }

    fn error(&self, snapshot: &Operation) -> Option<Status> {
        snapshot.error().cloned()
    }

    fn response(&self, snapshot: &Operation) -> Option<wkt::Any> {
        snapshot.response().cloned()
    }

    fn metadata(&self, snapshot: &Operation) -> Option<wkt::Any> {
        snapshot.metadata.clone()
    }

    fn echo_fields(&self, _snapshot: &Operation) -> EchoFields {
        EchoFields::new()
    }
}
