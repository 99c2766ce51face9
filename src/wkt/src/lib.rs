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

//! Well-known types for the long-running operation helpers.
//!
//! Long-running operations report their results and progress as
//! type-tagged, opaque payloads. This crate defines that payload, [Any], and
//! the [Message][message::Message] trait used to pack and unpack it.

mod any;
pub use crate::any::*;
pub mod message;
