//! Codec for request bodies, arguments and responses
//!
//! Thin wrappers over `serde_json` that map failures onto the wire-layer
//! [`Error`] variants the dispatcher reports to callers.
//!
//! # Examples
//!
//! ```rust
//! use wirebind_core::codec;
//!
//! let body = codec::decode_body(br#"{"method":"math.add","args":[3,4]}"#).unwrap();
//! let a: i32 = codec::decode_arg(&body, 0).unwrap();
//! let b: i32 = codec::decode_arg(&body, 1).unwrap();
//! assert_eq!(a + b, 7);
//!
//! // Missing arguments decode from `null`
//! let c: Option<i32> = codec::decode_arg(&body, 2).unwrap();
//! assert_eq!(c, None);
//! ```

use crate::error::{Error, ErrorBody, Result};
use crate::types::RequestBody;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;

/// Decode a raw request body
///
/// # Errors
///
/// Returns `Error::InvalidBody` if the bytes are not a JSON object with a
/// string `method` and an optional `args` array.
pub fn decode_body(bytes: &[u8]) -> Result<RequestBody> {
    serde_json::from_slice(bytes).map_err(|e| Error::InvalidBody(e.to_string()))
}

/// Encode a request body, as a client would send it
pub fn encode_body(body: &RequestBody) -> Result<String> {
    encode_value(body)
}

/// Decode the wire argument at `index`
///
/// An index past the end of `args` decodes from `null`, so optional
/// parameters may be omitted by the caller.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` carrying the decoder message.
pub fn decode_arg<T: DeserializeOwned>(body: &RequestBody, index: usize) -> Result<T> {
    let raw = body.arg(index).map_or("null", RawValue::get);
    serde_json::from_str(raw).map_err(|e| Error::InvalidArgument {
        index,
        message: e.to_string(),
    })
}

/// Encode any serializable value to a JSON string
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Encode an error envelope
pub fn encode_error(body: &ErrorBody) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| {
        r#"{"error":"Internal Error","msg":"failed to encode error"}"#.to_string()
    })
}
