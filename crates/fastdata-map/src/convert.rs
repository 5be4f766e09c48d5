//! Scalar coercion.
//!
//! [`Coercer::coerce`] converts a value's runtime representation into a
//! target [`ScalarKind`], or reports why it cannot. Conversions are lossless
//! or range-checked; nothing silently wraps or truncates.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use fastdata_reflect::{ScalarKind, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::MapperConfig;

/// A value that cannot be represented in the requested kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot convert {from} to {to}: {reason}")]
pub struct ConversionError {
    pub from: String,
    pub to: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(from: impl Into<String>, to: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Number {
    Int(i128),
    Float(f64),
}

/// Converts values between scalar kinds.
#[derive(Clone, Debug)]
pub struct Coercer {
    trim_text: bool,
    datetime_formats: Vec<String>,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(&MapperConfig::default())
    }
}

impl Coercer {
    pub fn new(config: &MapperConfig) -> Self {
        Self {
            trim_text: config.trim_text,
            datetime_formats: config.datetime_formats.clone(),
        }
    }

    /// Convert `value` into the representation of `to`.
    ///
    /// Same-kind values pass through untouched. `Null` and records are never
    /// convertible to a scalar.
    pub fn coerce(&self, value: Value, to: ScalarKind) -> Result<Value, ConversionError> {
        if value.scalar_kind() == Some(to) {
            return Ok(value);
        }
        let from = value.kind_name();

        match value {
            Value::Null => Err(ConversionError::new(
                from,
                to.name(),
                "absent value for a required property",
            )),
            Value::Record(_) => Err(ConversionError::new(
                from,
                to.name(),
                "a record has no scalar representation",
            )),
            Value::Text(text) => self.parse_text(&text, to),
            other if to == ScalarKind::Text => format_text(&other)
                .map(Value::Text)
                .ok_or_else(|| ConversionError::new(from, to.name(), "no textual form")),
            Value::DateTime(v) if to == ScalarKind::Date => Ok(Value::Date(v.date_naive())),
            Value::Date(v) if to == ScalarKind::DateTime => {
                Ok(Value::DateTime(v.and_time(NaiveTime::MIN).and_utc()))
            }
            other => convert_number(&other, to),
        }
    }

    fn parse_text(&self, text: &str, to: ScalarKind) -> Result<Value, ConversionError> {
        let raw = if self.trim_text { text.trim() } else { text };
        let fail = |reason: &dyn fmt::Display| {
            ConversionError::new("text", to.name(), format!("{raw:?}: {reason}"))
        };

        match to {
            ScalarKind::Bool => {
                if raw.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(fail(&"expected true or false"))
                }
            }
            ScalarKind::I8 => raw.parse().map(Value::I8).map_err(|e| fail(&e)),
            ScalarKind::I16 => raw.parse().map(Value::I16).map_err(|e| fail(&e)),
            ScalarKind::I32 => raw.parse().map(Value::I32).map_err(|e| fail(&e)),
            ScalarKind::I64 => raw.parse().map(Value::I64).map_err(|e| fail(&e)),
            ScalarKind::U8 => raw.parse().map(Value::U8).map_err(|e| fail(&e)),
            ScalarKind::U16 => raw.parse().map(Value::U16).map_err(|e| fail(&e)),
            ScalarKind::U32 => raw.parse().map(Value::U32).map_err(|e| fail(&e)),
            ScalarKind::U64 => raw.parse().map(Value::U64).map_err(|e| fail(&e)),
            ScalarKind::F32 => match raw.parse::<f32>() {
                Ok(v) if v.is_infinite() && !is_infinity_literal(raw) => {
                    Err(fail(&"out of range for f32"))
                }
                parsed => parsed.map(Value::F32).map_err(|e| fail(&e)),
            },
            ScalarKind::F64 => match raw.parse::<f64>() {
                Ok(v) if v.is_infinite() && !is_infinity_literal(raw) => {
                    Err(fail(&"out of range for f64"))
                }
                parsed => parsed.map(Value::F64).map_err(|e| fail(&e)),
            },
            ScalarKind::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(fail(&"expected exactly one character")),
                }
            }
            ScalarKind::Text => Ok(Value::Text(text.to_string())),
            ScalarKind::DateTime => self
                .parse_datetime(raw)
                .map(Value::DateTime)
                .ok_or_else(|| fail(&"unrecognised date-time format")),
            ScalarKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| fail(&e)),
            ScalarKind::Uuid => Uuid::parse_str(raw).map(Value::Uuid).map_err(|e| fail(&e)),
            ScalarKind::Binary => Ok(Value::Binary(text.as_bytes().to_vec())),
        }
    }

    fn parse_datetime(&self, raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        self.datetime_formats
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }
}

/// Whether `raw` spells infinity itself rather than overflowing to it.
fn is_infinity_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Narrow to `f32`, rejecting finite values beyond its range.
fn narrow_f32(f: f64) -> Option<f32> {
    let narrowed = f as f32;
    (narrowed.is_finite() || !f.is_finite()).then_some(narrowed)
}

fn format_text(value: &Value) -> Option<String> {
    Some(match value {
        Value::Bool(v) => v.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::Char(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        Value::DateTime(v) => v.to_rfc3339(),
        Value::Date(v) => v.format("%Y-%m-%d").to_string(),
        Value::Uuid(v) => v.to_string(),
        Value::Binary(_) | Value::Null | Value::Record(_) => return None,
    })
}

fn number_of(value: &Value) -> Option<Number> {
    Some(match *value {
        Value::Bool(v) => Number::Int(i128::from(v)),
        Value::I8(v) => Number::Int(v.into()),
        Value::I16(v) => Number::Int(v.into()),
        Value::I32(v) => Number::Int(v.into()),
        Value::I64(v) => Number::Int(v.into()),
        Value::U8(v) => Number::Int(v.into()),
        Value::U16(v) => Number::Int(v.into()),
        Value::U32(v) => Number::Int(v.into()),
        Value::U64(v) => Number::Int(v.into()),
        Value::F32(v) => Number::Float(v.into()),
        Value::F64(v) => Number::Float(v),
        Value::Char(v) => Number::Int(u32::from(v).into()),
        _ => return None,
    })
}

fn to_integer(n: i128, to: ScalarKind) -> Option<Value> {
    Some(match to {
        ScalarKind::I8 => Value::I8(i8::try_from(n).ok()?),
        ScalarKind::I16 => Value::I16(i16::try_from(n).ok()?),
        ScalarKind::I32 => Value::I32(i32::try_from(n).ok()?),
        ScalarKind::I64 => Value::I64(i64::try_from(n).ok()?),
        ScalarKind::U8 => Value::U8(u8::try_from(n).ok()?),
        ScalarKind::U16 => Value::U16(u16::try_from(n).ok()?),
        ScalarKind::U32 => Value::U32(u32::try_from(n).ok()?),
        ScalarKind::U64 => Value::U64(u64::try_from(n).ok()?),
        _ => return None,
    })
}

/// Numeric, boolean and character conversions.
///
/// Chars pair only with integer kinds. Floats round half to even when
/// narrowed to an integer.
fn convert_number(value: &Value, to: ScalarKind) -> Result<Value, ConversionError> {
    let from = value.kind_name();
    let err = |reason: String| ConversionError::new(from, to.name(), reason);

    let source_kind = value.scalar_kind();
    let number = number_of(value).ok_or_else(|| err("no numeric representation".into()))?;

    let source_is_char = source_kind == Some(ScalarKind::Char);
    let source_is_integer = source_kind.is_some_and(|k| k.is_integer());
    if (source_is_char && !to.is_integer()) || (to == ScalarKind::Char && !source_is_integer) {
        return Err(err("chars convert only to and from integers".into()));
    }

    match to {
        ScalarKind::Bool => Ok(Value::Bool(match number {
            Number::Int(n) => n != 0,
            Number::Float(f) => f != 0.0,
        })),
        ScalarKind::F32 => {
            let wide = match number {
                Number::Int(n) => n as f64,
                Number::Float(f) => f,
            };
            narrow_f32(wide)
                .map(Value::F32)
                .ok_or_else(|| err(format!("{wide} is out of range for f32")))
        }
        ScalarKind::F64 => Ok(Value::F64(match number {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        })),
        ScalarKind::Char => match number {
            Number::Int(n) => u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| err(format!("{n} is not a valid code point"))),
            Number::Float(f) => Err(err(format!("{f} is not an integer"))),
        },
        kind if kind.is_integer() => {
            let n = match number {
                Number::Int(n) => n,
                Number::Float(f) if !f.is_finite() => {
                    return Err(err(format!("{f} is not finite")));
                }
                Number::Float(f) => {
                    let rounded = f.round_ties_even();
                    if rounded.abs() >= 1.0e38 {
                        return Err(err(format!("{f} is out of range for {kind}")));
                    }
                    rounded as i128
                }
            };
            to_integer(n, kind).ok_or_else(|| err(format!("{n} is out of range for {kind}")))
        }
        _ => Err(err("unsupported conversion".into())),
    }
}
