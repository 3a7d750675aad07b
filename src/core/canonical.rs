//! Canonical JSON encoding used for hashing.
//!
//! This is not the human-readable serialization (see `Provenance::to_pretty_json`).
//! The rules are fixed so that equal logical values always yield equal bytes:
//!
//! 1. Object keys sorted by UTF-8 byte order (same as code point order).
//! 2. No whitespace: `{"a":1,"b":[2,3]}`.
//! 3. Strings escape `"` and `\`, use `\b \f \n \r \t`, write other control
//!    characters as `\u00xx`, and emit everything else as raw UTF-8.
//! 4. Integers are written in plain decimal with every digit kept, however
//!    large (serde_json's `arbitrary_precision` preserves the literal). Finite
//!    floats are written in shortest round-trip form (`1.5`, `3.0`, `1e20`),
//!    so `3` and `3.0` stay distinct.
//! 5. `null`, `true`, `false` are written literally.

use serde::Serialize;
use serde_json::{Number, Value};
use thiserror::Error;

/// A value could not be represented as canonical JSON
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("value is not representable as JSON: {0}")]
    NotRepresentable(#[from] serde_json::Error),

    #[error("non-finite number is not representable: {raw}")]
    NonFiniteNumber { raw: String },
}

/// Produce canonical bytes for any serializable value
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodingError> {
    let value = serde_json::to_value(value)?;
    canonicalize_value(&value)
}

/// Produce canonical bytes for an already-built JSON value
pub fn canonicalize_value(value: &Value) -> Result<Vec<u8>, EncodingError> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodingError> {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => write_number(buf, n)?,
        Value::String(s) => write_string(buf, s),
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_value(buf, item)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            buf.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_string(buf, key);
                buf.push(b':');
                write_value(buf, item)?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

/// Canonical decimal text of a JSON integer literal, at any magnitude.
///
/// Returns `None` for numbers written with a fraction or exponent.
pub fn integer_text(n: &Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return Some(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Some(u.to_string());
    }
    // Beyond 64 bits: arbitrary_precision keeps the literal exactly as parsed
    let raw = n.to_string();
    let digits = raw.strip_prefix('-').unwrap_or(&raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(raw)
    } else {
        None
    }
}

fn write_number(buf: &mut Vec<u8>, n: &Number) -> Result<(), EncodingError> {
    let text = match integer_text(n) {
        Some(text) => text,
        // Number::from_f64 renders through ryu: shortest round-trip digits
        None => n
            .as_f64()
            .and_then(Number::from_f64)
            .map(|f| f.to_string())
            .ok_or_else(|| EncodingError::NonFiniteNumber { raw: n.to_string() })?,
    };
    buf.extend_from_slice(text.as_bytes());
    Ok(())
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\u{0008}' => buf.extend_from_slice(b"\\b"),
            '\u{000c}' => buf.extend_from_slice(b"\\f"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if c < '\u{0020}' => {
                buf.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    buf.push(b'"');
}
