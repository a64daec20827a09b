//! Wire types
//!
//! A call arrives as a [`Request`] (transport metadata that context
//! extractors read) plus a body decoded into a [`RequestBody`]:
//!
//! ```json
//! {"method": "math.add", "args": [3, 4]}
//! ```
//!
//! Arguments are positional and count only the wire arguments of the target
//! procedure; context values and dependencies never travel in `args`.
//!
//! Every call produces exactly one [`WireResponse`]. A success carries the
//! encoded return value as-is (no envelope); a failure carries an
//! [`ErrorBody`].

use crate::codec;
use crate::error::{ErrorBody, Result};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::BTreeMap;

/// Inbound transport metadata
///
/// Header names are case-insensitive and stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    headers: BTreeMap<String, String>,
    /// Address of the caller, when the transport knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    pub fn insert_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Decoded request body
///
/// Arguments stay as raw JSON text until the dispatcher decodes each one
/// into its parameter type, so numbers wider than 64 bits keep every digit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Wire method name, such as `"user.create"`
    pub method: String,
    /// Positional wire arguments, undecoded
    #[serde(default)]
    pub args: Vec<Box<RawValue>>,
}

impl RequestBody {
    pub fn new(method: impl Into<String>, args: Vec<Box<RawValue>>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Build a body from already parsed values, as a client would send it
    pub fn from_values(method: impl Into<String>, values: &[serde_json::Value]) -> Result<Self> {
        let args = values
            .iter()
            .map(serde_json::value::to_raw_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(method, args))
    }

    /// The raw argument at `index`, or `None` when the caller sent fewer
    pub fn arg(&self, index: usize) -> Option<&RawValue> {
        self.args.get(index).map(Box::as_ref)
    }
}

/// The single response produced for a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    status: u16,
    body: String,
}

impl WireResponse {
    pub const OK: u16 = 200;

    /// Success carrying an already encoded body
    pub fn success(body: impl Into<String>) -> Self {
        Self {
            status: Self::OK,
            body: body.into(),
        }
    }

    /// Success carrying `value`
    ///
    /// A value that fails to encode turns into an `Internal Error` response.
    pub fn ok<T: Serialize + ?Sized>(value: &T) -> Self {
        match codec::encode_value(value) {
            Ok(body) => Self::success(body),
            Err(err) => Self::error(ErrorBody::internal(err.detail())),
        }
    }

    /// Success with a `null` body, for procedures without a result
    pub fn null() -> Self {
        Self::success("null")
    }

    pub fn error(body: ErrorBody) -> Self {
        Self {
            status: body.status(),
            body: codec::encode_error(&body),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::OK
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn content_type(&self) -> &'static str {
        "application/json"
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The error envelope, if this is a failure response
    pub fn error_body(&self) -> Option<ErrorBody> {
        if self.is_success() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }
}

impl From<ErrorBody> for WireResponse {
    fn from(body: ErrorBody) -> Self {
        WireResponse::error(body)
    }
}
