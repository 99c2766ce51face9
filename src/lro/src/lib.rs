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

//! Types and functions to make long-running operations (LROs) easier to use.
//!
//! Some service methods start an operation that takes a long time to complete,
//! like creating a database or training a model. These methods return a
//! snapshot of the operation. The application polls the service, using the
//! operation name, until the operation completes.
//!
//! This crate wraps the snapshot in an [Operation] handle. The handle can:
//! * report whether the operation is done, and its error or response,
//! * [reload][Operation::reload] the operation, with exactly one request,
//! * [wait][Operation::wait_until_done] until the operation completes, using
//!   exponential backoff between reloads,
//! * run [callbacks][Operation::on_done] when the operation completes.
//!
//! All these functions are blocking. They run on the calling thread, and the
//! handle spawns no background tasks. Applications waiting on many operations
//! should drive each handle from its own thread.
//!
//! The handle supports operations with different representations via the
//! [OperationSchema][schema::OperationSchema] trait. See the [schema] module
//! for the schemas included in this crate.

mod operation;
pub mod schema;
mod stub;
mod wait;

pub use operation::{DoneCallback, Operation, OperationBuilder, ReloadCallback};
pub use schema::{Decoded, Decoders, Outcome};
pub use stub::{OperationsStub, PollRequest};
