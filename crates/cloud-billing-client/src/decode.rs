//! Model decoding.
//!
//! Response bodies are decoded with `serde_json` straight into the typed
//! models. Paged endpoints additionally project their wire envelope into a
//! [`Page`].

use serde::de::{DeserializeOwned, Error as _, Unexpected};
use serde_json::Value;

use crate::error::Result;
use crate::pagination::Page;

/// Decodes one raw page body into a [`Page`] of `T`.
///
/// One function per record type is injected into a
/// [`PagedList`](crate::pagination::PagedList).
pub type DecodeFn<T> = fn(&[u8]) -> Result<Page<T>>;

/// Decode a JSON body into `T`.
///
/// # Errors
///
/// Returns [`ClientError::Decode`](crate::ClientError::Decode) if the body is
/// not valid JSON or does not match `T`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a JSON body as the wire envelope `R` and convert it into a page.
///
/// `decode_page::<InstancesUsage, InstanceUsage>` is a [`DecodeFn`].
///
/// # Errors
///
/// Returns [`ClientError::Decode`](crate::ClientError::Decode) on malformed
/// or mismatched bodies. Page envelopes must be JSON objects; serde would
/// otherwise accept a short array for an envelope whose fields all default.
pub fn decode_page<R, T>(body: &[u8]) -> Result<Page<T>>
where
    R: DeserializeOwned + Into<Page<T>>,
{
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(serde_json::Error::invalid_type(unexpected(&value), &"a JSON object").into());
    }
    Ok(serde_json::from_value::<R>(value)?.into())
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
