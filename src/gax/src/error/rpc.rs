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

use serde::{Deserialize, Serialize};

/// The [Status] type defines a logical error model that is suitable for
/// different programming environments, including REST APIs and RPC APIs. Each
/// [Status] message contains three pieces of data: error code, error message,
/// and error details.
///
/// Long-running operations use this type to report a failed completion, and
/// the polling helpers use it to report errors returned by the service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Status {
    /// The status code.
    pub code: Code,

    /// A developer-facing error message, which should be in English.
    pub message: String,

    /// A list of messages that carry the error details.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<wkt::Any>,
}

impl Status {
    /// Sets the value for [code][Status::code].
    pub fn set_code<T: Into<Code>>(mut self, v: T) -> Self {
        self.code = v.into();
        self
    }

    /// Sets the value for [message][Status::message].
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    /// Sets the value for [details][Status::details].
    pub fn set_details<T, I>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: Into<wkt::Any>,
    {
        self.details = v.into_iter().map(|v| v.into()).collect();
        self
    }
}

impl wkt::message::Message for Status {
    fn typename() -> &'static str {
        "google.rpc.Status"
    }
}

/// The canonical error codes, as used in [Status].
///
/// Services report the failure of an operation with one of these codes. Only
/// the numeric value is sent on the wire, see [Code::name] for the symbolic
/// names.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Code {
    /// Not an error.
    Ok = 0,
    /// The operation was cancelled, typically by the caller.
    Cancelled = 1,
    /// An error without a more specific code, or from an unknown error space.
    Unknown = 2,
    /// The request is invalid, regardless of the state of the system.
    InvalidArgument = 3,
    /// The deadline expired before the operation could complete.
    DeadlineExceeded = 4,
    /// A requested resource was not found.
    NotFound = 5,
    /// The resource the request tried to create already exists.
    AlreadyExists = 6,
    /// The caller is not allowed to execute the operation.
    PermissionDenied = 7,
    /// A quota or some other resource is exhausted.
    ResourceExhausted = 8,
    /// The system is not in the state required by the operation.
    FailedPrecondition = 9,
    /// The operation was aborted, typically because of a concurrency issue.
    Aborted = 10,
    /// The operation went past the valid range.
    OutOfRange = 11,
    /// The operation is not implemented or supported.
    Unimplemented = 12,
    /// An invariant of the service is broken.
    Internal = 13,
    /// The service is unavailable, the request may succeed if retried.
    Unavailable = 14,
    /// Unrecoverable data loss or corruption.
    DataLoss = 15,
    /// The request does not have valid credentials.
    Unauthenticated = 16,
}

impl Code {
    /// The symbolic name of the code, e.g. `NOT_FOUND`.
    pub fn name(&self) -> &str {
        match self {
            Code::Ok => "OK",
            Code::Cancelled => "CANCELLED",
            Code::Unknown => "UNKNOWN",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Code::NotFound => "NOT_FOUND",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Aborted => "ABORTED",
            Code::OutOfRange => "OUT_OF_RANGE",
            Code::Unimplemented => "UNIMPLEMENTED",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
            Code::DataLoss => "DATA_LOSS",
            Code::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl Default for Code {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::convert::From<i32> for Code {
    fn from(value: i32) -> Self {
        match value {
            0 => Code::Ok,
            1 => Code::Cancelled,
            2 => Code::Unknown,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => Code::default(),
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Code {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Code::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn status_basic_setters() {
        let got = Status::default()
            .set_code(Code::Unimplemented)
            .set_message("test-message");
        let want = Status {
            code: Code::Unimplemented,
            message: "test-message".into(),
            ..Default::default()
        };
        assert_eq!(got, want);

        let got = Status::default().set_code(Code::Unimplemented as i32);
        assert_eq!(got.code, Code::Unimplemented);
    }

    #[test]
    fn status_details() -> Result<()> {
        let detail = wkt::Any::from_map(
            json!({"@type": "type.googleapis.com/test.Detail", "reason": "quota"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let got = Status::default().set_details([detail.clone()]);
        assert_eq!(got.details, vec![detail]);

        let value = serde_json::to_value(&got)?;
        assert_eq!(value["details"][0]["reason"], "quota", "{value:?}");
        Ok(())
    }

    #[test]
    fn status_json() -> Result<()> {
        let input = json!({"code": 5, "message": "NOT FOUND"});
        let got = serde_json::from_value::<Status>(input)?;
        assert_eq!(got.code, Code::NotFound);
        assert_eq!(got.message, "NOT FOUND");
        assert!(got.details.is_empty(), "{got:?}");

        let value = serde_json::to_value(&got)?;
        assert_eq!(value, json!({"code": 5, "message": "NOT FOUND"}));
        Ok(())
    }

    #[test]
    fn status_in_any() -> Result<()> {
        let status = Status::default()
            .set_code(Code::Aborted)
            .set_message("aborted");
        let any = wkt::Any::from_msg(&status)?;
        assert_eq!(any.typename(), Some("google.rpc.Status"));
        let got = any.to_msg::<Status>()?;
        assert_eq!(got, status);
        Ok(())
    }

    #[test_case(Code::Ok, 0, "OK")]
    #[test_case(Code::Cancelled, 1, "CANCELLED")]
    #[test_case(Code::Unknown, 2, "UNKNOWN")]
    #[test_case(Code::InvalidArgument, 3, "INVALID_ARGUMENT")]
    #[test_case(Code::DeadlineExceeded, 4, "DEADLINE_EXCEEDED")]
    #[test_case(Code::NotFound, 5, "NOT_FOUND")]
    #[test_case(Code::AlreadyExists, 6, "ALREADY_EXISTS")]
    #[test_case(Code::PermissionDenied, 7, "PERMISSION_DENIED")]
    #[test_case(Code::ResourceExhausted, 8, "RESOURCE_EXHAUSTED")]
    #[test_case(Code::FailedPrecondition, 9, "FAILED_PRECONDITION")]
    #[test_case(Code::Aborted, 10, "ABORTED")]
    #[test_case(Code::OutOfRange, 11, "OUT_OF_RANGE")]
    #[test_case(Code::Unimplemented, 12, "UNIMPLEMENTED")]
    #[test_case(Code::Internal, 13, "INTERNAL")]
    #[test_case(Code::Unavailable, 14, "UNAVAILABLE")]
    #[test_case(Code::DataLoss, 15, "DATA_LOSS")]
    #[test_case(Code::Unauthenticated, 16, "UNAUTHENTICATED")]
    fn code_conversions(code: Code, value: i32, name: &str) {
        assert_eq!(Code::from(value), code);
        assert_eq!(code.name(), name);
        assert_eq!(code.to_string(), name);
        assert_eq!(code as i32, value);
    }

    #[test]
    fn code_unknown_values() {
        assert_eq!(Code::from(-1), Code::Unknown);
        assert_eq!(Code::from(17), Code::Unknown);
        assert_eq!(Code::default(), Code::Unknown);
    }
}
