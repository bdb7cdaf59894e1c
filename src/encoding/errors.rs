use std::io;

use thiserror::Error;

/// Represents the outer-level, user-facing errors of the hyper-execution encoding package.
///
/// Every variant is returned synchronously to the immediate caller. Nothing is retried and no
/// partial payload is ever produced alongside an error.
/// Variants:
/// - `InvalidAddress`, `InvalidCurveParameters`, `InvalidTickRange`, `InvalidDirection`,
///   `InvalidLimit`, `OperandOutOfRange`, `InvalidInput`: the operation parameters are invalid.
///   Supplying corrected input fixes them.
/// - `EmptyBatch`, `BatchTooLarge`: the batch must be restructured.
/// - `NotDeployed`, `AlreadyDeployed`: the client lifecycle does not allow the call.
/// - `UnknownReference`: a pair, curve or pool reference cannot be resolved locally. A reference
///   that does resolve is still only provisional; the interpreter performs the authoritative check.
/// - `MalformedPayload`: bytes handed to the decoder do not follow the wire format.
/// - `FatalError`: There is problem with the application setup.
/// - `RecoverableError`: An external collaborator failed. Retrying at a later time may succeed.
#[derive(Error, Debug, PartialEq)]
pub enum EncodingError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid curve parameters: {0}")]
    InvalidCurveParameters(String),
    #[error("Invalid tick range [{lo}, {hi}]: lo must be below hi and both within tick bounds")]
    InvalidTickRange { lo: i32, hi: i32 },
    #[error("Invalid swap direction {0}, expected 0 or 1")]
    InvalidDirection(u8),
    #[error("Invalid limit: the limit must be positive unless the maximum amount is used")]
    InvalidLimit,
    #[error("Operand {field} does not fit in {bits} bits")]
    OperandOutOfRange { field: &'static str, bits: usize },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Cannot encode an empty batch")]
    EmptyBatch,
    #[error("Batch too large: {0}")]
    BatchTooLarge(String),
    #[error("Hyper not deployed, call deploy()")]
    NotDeployed,
    #[error("Hyper is already deployed")]
    AlreadyDeployed,
    #[error("Unknown reference: {0}")]
    UnknownReference(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Fatal error: {0}")]
    FatalError(String),
    #[error("Recoverable error: {0}")]
    RecoverableError(String),
}

impl From<io::Error> for EncodingError {
    fn from(err: io::Error) -> Self {
        EncodingError::FatalError(err.to_string())
    }
}

impl From<serde_json::Error> for EncodingError {
    fn from(err: serde_json::Error) -> Self {
        EncodingError::FatalError(err.to_string())
    }
}
