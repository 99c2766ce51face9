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

use gax::error::rpc::Status;
use serde::{Deserialize, Serialize};
use wkt::Any;

/// This resource represents a long-running operation that is the result of a
/// network API call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "OperationJson", into = "OperationJson")]
#[non_exhaustive]
pub struct Operation {
    /// The server-assigned name, which is only unique within the same service
    /// that originally returns it.
    pub name: String,

    /// Service-specific metadata associated with the operation. It typically
    /// contains progress information and common metadata such as create time.
    /// Some services might not provide such metadata.
    pub metadata: Option<Any>,

    /// If the value is `false`, it means the operation is still in progress.
    /// If `true`, the operation is completed, and either `error` or `response`
    /// is available.
    pub done: bool,

    /// The operation result, which can be either an `error` or a valid
    /// `response`. If `done` == `false`, neither `error` nor `response` is set.
    pub result: Option<operation::Result>,
}

impl Operation {
    pub fn new() -> Self {
        std::default::Default::default()
    }

    /// Sets the value of [name][Operation::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value of [metadata][Operation::metadata].
    pub fn set_metadata<T: Into<Any>>(mut self, v: T) -> Self {
        self.metadata = Some(v.into());
        self
    }

    /// Sets or clears the value of [metadata][Operation::metadata].
    pub fn set_or_clear_metadata<T: Into<Any>>(mut self, v: Option<T>) -> Self {
        self.metadata = v.map(|x| x.into());
        self
    }

    /// Sets the value of [done][Operation::done].
    pub fn set_done<T: Into<bool>>(mut self, v: T) -> Self {
        self.done = v.into();
        self
    }

    /// Sets the value of [result][Operation::result].
    ///
    /// Note that all the setters affecting `result` are mutually exclusive.
    pub fn set_result<T: Into<Option<operation::Result>>>(mut self, v: T) -> Self {
        self.result = v.into();
        self
    }

    /// The value of [result][Operation::result] if it holds an `Error`,
    /// `None` if the field is not set or holds a different branch.
    pub fn error(&self) -> Option<&Status> {
        match self.result.as_ref()? {
            operation::Result::Error(v) => Some(v.as_ref()),
            operation::Result::Response(_) => None,
        }
    }

    /// Sets the value of [result][Operation::result] to hold an `Error`.
    pub fn set_error<T: Into<Status>>(mut self, v: T) -> Self {
        self.result = Some(operation::Result::Error(Box::new(v.into())));
        self
    }

    /// The value of [result][Operation::result] if it holds a `Response`,
    /// `None` if the field is not set or holds a different branch.
    pub fn response(&self) -> Option<&Any> {
        match self.result.as_ref()? {
            operation::Result::Response(v) => Some(v.as_ref()),
            operation::Result::Error(_) => None,
        }
    }

    /// Sets the value of [result][Operation::result] to hold a `Response`.
    pub fn set_response<T: Into<Any>>(mut self, v: T) -> Self {
        self.result = Some(operation::Result::Response(Box::new(v.into())));
        self
    }
}

impl wkt::message::Message for Operation {
    fn typename() -> &'static str {
        "google.longrunning.Operation"
    }
}

/// Defines additional types related to [Operation].
pub mod operation {
    #[allow(unused_imports)]
    use super::*;

    /// The operation result, which can be either an `error` or a valid
    /// `response`.
    #[derive(Clone, Debug, PartialEq)]
    #[non_exhaustive]
    pub enum Result {
        /// The error result of the operation in case of failure or
        /// cancellation.
        Error(Box<Status>),
        /// The normal, successful response of the operation.
        Response(Box<Any>),
    }
}

/// The JSON representation of [Operation], where the `result` oneof is
/// flattened into the `error` and `response` fields.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OperationJson {
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Any>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Any>,
}

impl From<OperationJson> for Operation {
    fn from(value: OperationJson) -> Self {
        let result = match (value.error, value.response) {
            (Some(e), _) => Some(operation::Result::Error(Box::new(e))),
            (None, Some(r)) => Some(operation::Result::Response(Box::new(r))),
            (None, None) => None,
        };
        Self {
            name: value.name,
            metadata: value.metadata,
            done: value.done,
            result,
        }
    }
}

impl From<Operation> for OperationJson {
    fn from(value: Operation) -> Self {
        let (error, response) = match value.result {
            Some(operation::Result::Error(e)) => (Some(*e), None),
            Some(operation::Result::Response(r)) => (None, Some(*r)),
            None => (None, None),
        };
        Self {
            name: value.name,
            metadata: value.metadata,
            done: value.done,
            error,
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use gax::error::rpc::Code;
    use serde_json::json;

    fn payload() -> Any {
        let map = json!({"@type": "type.googleapis.com/test.Payload", "value": 42});
        Any::from_map(map.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn setters() {
        let op = Operation::new()
            .set_name("projects/p/operations/o")
            .set_done(true)
            .set_metadata(payload());
        assert_eq!(op.name, "projects/p/operations/o");
        assert!(op.done, "{op:?}");
        assert_eq!(op.metadata, Some(payload()));
        assert!(op.result.is_none(), "{op:?}");

        let op = op.set_or_clear_metadata(None::<Any>);
        assert!(op.metadata.is_none(), "{op:?}");
    }

    #[test]
    fn result_branches_are_exclusive() {
        let status = Status::default()
            .set_code(Code::Aborted)
            .set_message("uh-oh");
        let op = Operation::new().set_error(status.clone());
        assert_eq!(op.error(), Some(&status));
        assert!(op.response().is_none(), "{op:?}");

        let op = op.set_response(payload());
        assert!(op.error().is_none(), "{op:?}");
        assert_eq!(op.response(), Some(&payload()));

        let op = op.set_result(None);
        assert!(op.error().is_none(), "{op:?}");
        assert!(op.response().is_none(), "{op:?}");
    }

    #[test]
    fn serialize() -> Result<()> {
        let op = Operation::new()
            .set_name("op-001")
            .set_done(true)
            .set_response(payload());
        let got = serde_json::to_value(&op)?;
        let want = json!({
            "name": "op-001",
            "done": true,
            "response": {"@type": "type.googleapis.com/test.Payload", "value": 42},
        });
        assert_eq!(got, want);

        let got = serde_json::to_value(Operation::new())?;
        assert_eq!(got, json!({}));
        Ok(())
    }

    #[test]
    fn deserialize() -> Result<()> {
        let input = json!({
            "name": "op-001",
            "done": true,
            "error": {"code": 10, "message": "aborted"},
        });
        let got = serde_json::from_value::<Operation>(input)?;
        let status = Status::default()
            .set_code(Code::Aborted)
            .set_message("aborted");
        let want = Operation::new()
            .set_name("op-001")
            .set_done(true)
            .set_error(status);
        assert_eq!(got, want);

        let got = serde_json::from_value::<Operation>(json!({"name": "op-002"}))?;
        assert_eq!(got, Operation::new().set_name("op-002"));
        Ok(())
    }

    #[test]
    fn deserialize_both_branches_prefers_error() -> Result<()> {
        let input = json!({
            "done": true,
            "error": {},
            "response": {"@type": "type.googleapis.com/test.Payload"},
        });
        let got = serde_json::from_value::<Operation>(input)?;
        assert_eq!(got.error(), Some(&Status::default()));
        Ok(())
    }
}
