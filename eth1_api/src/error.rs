use log::error;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use types::{nonstandard::Phase, phase0::primitives::ExecutionBlockHash};

/// Failures of calls to the execution client.
///
/// Every failure is classified exactly once, by [`handle_rpc_error`] or by the payload status
/// checks in [`Eth1Api`](crate::Eth1Api). Callers recover the kind with
/// [`anyhow::Error::downcast_ref`].
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error("timeout from HTTP client")]
    HttpTimeout,
    #[error("request to execution client was cancelled")]
    Cancelled,
    #[error("could not authenticate connection to execution client")]
    Unauthorized,
    #[error("invalid JSON was received by the server")]
    Parse,
    #[error("JSON sent is not a valid request object")]
    InvalidRequest,
    #[error("method not found")]
    MethodNotFound,
    #[error("invalid method parameter(s)")]
    InvalidParams,
    #[error("internal JSON-RPC error")]
    Internal,
    #[error("payload does not exist or is not available")]
    UnknownPayload,
    #[error("invalid forkchoice state")]
    InvalidForkchoiceState,
    #[error("payload attributes are invalid or inconsistent")]
    InvalidPayloadAttributes,
    #[error("request too large")]
    RequestTooLarge,
    #[error("client error while processing request: {data}")]
    Server { data: String },
    #[error("unexpected error in JSON-RPC response: {message}")]
    UnexpectedResponse { message: String },
    #[error("payload status is ACCEPTED")]
    AcceptedPayloadStatus,
    #[error("payload status is SYNCING")]
    SyncingPayloadStatus,
    #[error("payload status is INVALID (latest valid hash: {latest_valid_hash:?})")]
    InvalidPayloadStatus {
        latest_valid_hash: Option<ExecutionBlockHash>,
    },
    #[error("payload status is INVALID_BLOCK_HASH")]
    InvalidBlockHashPayloadStatus,
    #[error("unknown payload status")]
    UnknownPayloadStatus,
    #[error("nil response from execution client")]
    NilResponse,
    #[error("payload attributes are required to build a payload")]
    NilAttributes,
    #[error("unknown ExecutionPayload schema for block version {phase}")]
    UnsupportedVersion { phase: Phase },
    #[error("parameters passed with {phase} payload do not match its version")]
    PayloadParamsMismatch { phase: Phase },
}

/// Error object of a JSON-RPC response.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Ways a single request can fail before its result is interpreted.
#[derive(Debug)]
pub enum RequestFailure {
    Timeout,
    Cancelled,
    Unauthorized,
    Transport(reqwest::Error),
    Rpc(RpcError),
    Decode(serde_json::Error),
}

impl From<reqwest::Error> for RequestFailure {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error)
        }
    }
}

/// Classifies a failed request.
///
/// Standard JSON-RPC codes and Engine API codes map to their own kinds. `-32000` is the only code
/// that may carry data. Anything unrecognized is reported as an unexpected response.
#[must_use]
pub fn handle_rpc_error(failure: RequestFailure) -> Error {
    match failure {
        RequestFailure::Timeout => Error::HttpTimeout,
        RequestFailure::Cancelled => Error::Cancelled,
        RequestFailure::Unauthorized => {
            error!(
                "HTTP authentication to the execution client is not working; \
                 ensure that the beacon node and the execution client use the same JWT secret \
                 (check the path passed with --jwt-secret)",
            );

            Error::Unauthorized
        }
        RequestFailure::Transport(error) => Error::UnexpectedResponse {
            message: error.to_string(),
        },
        RequestFailure::Decode(error) => Error::UnexpectedResponse {
            message: error.to_string(),
        },
        RequestFailure::Rpc(RpcError {
            code,
            message,
            data,
        }) => match code {
            -32700 => Error::Parse,
            -32600 => Error::InvalidRequest,
            -32601 => Error::MethodNotFound,
            -32602 => Error::InvalidParams,
            -32603 => Error::Internal,
            -38001 => Error::UnknownPayload,
            -38002 => Error::InvalidForkchoiceState,
            -38003 => Error::InvalidPayloadAttributes,
            -38004 => Error::RequestTooLarge,
            -32000 => match data {
                Some(Value::String(data)) => Error::Server { data },
                Some(data) => Error::Server {
                    data: data.to_string(),
                },
                None => Error::UnexpectedResponse {
                    message: format!("{code}: {message}"),
                },
            },
            _ => Error::UnexpectedResponse {
                message: format!("{code}: {message}"),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test_case(-32700, Error::Parse)]
    #[test_case(-32600, Error::InvalidRequest)]
    #[test_case(-32601, Error::MethodNotFound)]
    #[test_case(-32602, Error::InvalidParams)]
    #[test_case(-32603, Error::Internal)]
    #[test_case(-38001, Error::UnknownPayload)]
    #[test_case(-38002, Error::InvalidForkchoiceState)]
    #[test_case(-38003, Error::InvalidPayloadAttributes)]
    #[test_case(-38004, Error::RequestTooLarge)]
    fn known_codes_are_mapped_to_their_kinds(code: i64, expected: Error) {
        let failure = RequestFailure::Rpc(RpcError {
            code,
            message: "ignored".to_owned(),
            data: None,
        });

        assert_eq!(handle_rpc_error(failure), expected);
    }

    #[test]
    fn server_error_with_data_keeps_data() {
        let failure = RequestFailure::Rpc(RpcError {
            code: -32000,
            message: "execution reverted".to_owned(),
            data: Some(json!("0x08c379a0")),
        });

        assert_eq!(
            handle_rpc_error(failure),
            Error::Server {
                data: "0x08c379a0".to_owned(),
            },
        );
    }

    #[test]
    fn server_error_without_data_is_unexpected() {
        let failure = RequestFailure::Rpc(RpcError {
            code: -32000,
            message: "header not found".to_owned(),
            data: None,
        });

        assert_eq!(
            handle_rpc_error(failure),
            Error::UnexpectedResponse {
                message: "-32000: header not found".to_owned(),
            },
        );
    }

    #[test]
    fn unknown_code_is_unexpected() {
        let failure = RequestFailure::Rpc(RpcError {
            code: -39999,
            message: "something else".to_owned(),
            data: None,
        });

        assert_eq!(
            handle_rpc_error(failure),
            Error::UnexpectedResponse {
                message: "-39999: something else".to_owned(),
            },
        );
    }

    #[test]
    fn unauthorized_is_logged_with_guidance() {
        testing_logger::setup();

        assert_eq!(
            handle_rpc_error(RequestFailure::Unauthorized),
            Error::Unauthorized,
        );

        testing_logger::validate(|captured_logs| {
            let [captured] = captured_logs.as_slice() else {
                panic!("exactly one line should be logged: {:?}", captured_logs.len());
            };

            assert_eq!(captured.level, log::Level::Error);
            assert!(captured.body.contains("JWT secret"));
        });
    }

    #[test_case(RequestFailure::Timeout, Error::HttpTimeout)]
    #[test_case(RequestFailure::Cancelled, Error::Cancelled)]
    fn transport_conditions_are_classified(failure: RequestFailure, expected: Error) {
        assert_eq!(handle_rpc_error(failure), expected);
    }
}
