//! Serde helpers for backend payloads that encode numbers as strings.
//!
//! The lecture backend passes database rows through loosely, so
//! `"30"` and `30` must both decode as a frame index, and embeddings may
//! arrive as a JSON array or as the text form `"[0.1,0.2]"`.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

impl NumberOrString {
    fn into_f64<E: Error>(self) -> Result<f64, E> {
        match self {
            Self::Int(v) => Ok(v as f64),
            Self::Float(v) => Ok(v),
            Self::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a number, got '{s}'"))),
        }
    }

    fn into_i64<E: Error>(self) -> Result<i64, E> {
        match self {
            Self::Int(v) => Ok(v),
            Self::Float(v) if v.fract() == 0.0 && v.is_finite() => Ok(v as i64),
            Self::Float(v) => Err(E::custom(format!("expected an integer, got {v}"))),
            Self::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected an integer, got '{s}'"))),
        }
    }
}

/// Integer given as a number or a numeric string.
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_i64()
}

/// Non-negative 32-bit integer given as a number or a numeric string.
pub fn uint<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = int(deserializer)?;
    u32::try_from(value).map_err(|_| D::Error::custom(format!("expected a u32, got {value}")))
}

/// Float given as a number or a numeric string.
pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_f64()
}

/// Like [`float`], with `null` decoding to `None`.
pub fn opt_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_f64)
        .transpose()
}

/// Like [`int`], with `null` decoding to `None`.
pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_i64)
        .transpose()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VectorOrText {
    Vector(Vec<f32>),
    Text(String),
}

/// Embedding given as a JSON array or as its bracketed text form.
pub fn embedding<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f32>, D::Error> {
    match VectorOrText::deserialize(deserializer)? {
        VectorOrText::Vector(v) => Ok(v),
        VectorOrText::Text(s) => serde_json::from_str(&s)
            .map_err(|e| D::Error::custom(format!("malformed embedding text: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
