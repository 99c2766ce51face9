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

//! The `google.longrunning.Operation` message.
//!
//! Services following [AIP-151] return this message from any method that
//! starts a long-running operation, and from the `GetOperation` method used
//! to poll it.
//!
//! [AIP-151]: https://google.aip.dev/151

pub mod model;
