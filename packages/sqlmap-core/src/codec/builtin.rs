//! Built-in kind codecs and default registration.

use std::num::IntErrorKind;

use sqlmap_types::{Kind, SqlArgument, SqlValue, TypeInfo, Value};

use super::registry::{CodecContext, CodecRegistry};
use super::{spatial, types};
use crate::error::{DecodeError, EncodeError, NoCodecError};
use crate::jsonb;

/// Installs every built-in codec into `registry`.
pub(crate) fn install(registry: &CodecRegistry) {
    registry.register_kind_codec(Kind::String, encode_string, decode_string);
    registry.register_kind_codec(Kind::Bool, encode_bool, decode_bool);
    registry.register_kind_codec(Kind::Int, encode_int, decode_int);
    registry.register_kind_codec(Kind::Uint, encode_uint, decode_uint);
    registry.register_kind_codec(Kind::Float, encode_float, decode_float);
    registry.register_kind_codec(Kind::Option, encode_option, decode_option);
    registry.register_kind_codec(Kind::Struct, encode_json, decode_json);
    registry.register_kind_codec(Kind::Array, encode_json, decode_json);
    registry.register_kind_codec(Kind::Map, encode_json, decode_json);
    types::install(registry);
    spatial::install(registry);
}

pub(crate) fn unsupported<T>(expected: &'static str, got: &Value) -> Result<T, EncodeError> {
    Err(EncodeError::Unsupported {
        expected,
        got: got.variant_name(),
    })
}

pub(crate) fn wire_unsupported<T>(wire: &SqlValue, ty: &TypeInfo) -> Result<T, DecodeError> {
    Err(DecodeError::Unsupported {
        wire: wire.variant_name(),
        target: ty.name(),
    })
}

/// Text content of a wire value, for decoders that parse strings.
pub(crate) fn wire_text<'w>(wire: &'w SqlValue, ty: &TypeInfo) -> Result<&'w str, DecodeError> {
    match wire {
        SqlValue::Text(s) => Ok(s),
        SqlValue::Bytes(b) => std::str::from_utf8(b).map_err(|_| DecodeError::InvalidValue {
            value: String::from_utf8_lossy(b).into_owned(),
            target: ty.name(),
        }),
        other => wire_unsupported(other, ty),
    }
}

/// Checks that `v` fits a signed integer of the type's bit width.
pub(crate) fn fit_signed(v: i128, ty: &TypeInfo) -> Result<i64, DecodeError> {
    let bits = u32::from(ty.bits());
    let (min, max) = if bits == 0 || bits >= 64 {
        (i128::from(i64::MIN), i128::from(i64::MAX))
    } else {
        (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
    };
    if v < min || v > max {
        return Err(DecodeError::Overflow {
            value: v.to_string(),
            target: ty.name(),
        });
    }
    Ok(v as i64)
}

/// Checks that `v` fits an unsigned integer of the type's bit width.
pub(crate) fn fit_unsigned(v: i128, ty: &TypeInfo) -> Result<u64, DecodeError> {
    let bits = u32::from(ty.bits());
    let max = if bits == 0 || bits >= 64 {
        i128::from(u64::MAX)
    } else {
        (1i128 << bits) - 1
    };
    if v < 0 || v > max {
        return Err(DecodeError::Overflow {
            value: v.to_string(),
            target: ty.name(),
        });
    }
    Ok(v as u64)
}

fn parse_integer(text: &str, ty: &TypeInfo) -> Result<i128, DecodeError> {
    text.trim().parse::<i128>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => DecodeError::Overflow {
            value: text.to_string(),
            target: ty.name(),
        },
        _ => DecodeError::InvalidValue {
            value: text.to_string(),
            target: ty.name(),
        },
    })
}

pub(crate) fn parse_signed(text: &str, ty: &TypeInfo) -> Result<i64, DecodeError> {
    fit_signed(parse_integer(text, ty)?, ty)
}

pub(crate) fn parse_unsigned(text: &str, ty: &TypeInfo) -> Result<u64, DecodeError> {
    fit_unsigned(parse_integer(text, ty)?, ty)
}

/// Checks that `v` fits a float of the type's bit width.
pub(crate) fn fit_float(v: f64, ty: &TypeInfo) -> Result<f64, DecodeError> {
    if ty.bits() == 32 && v.is_finite() && v.abs() > f64::from(f32::MAX) {
        return Err(DecodeError::Overflow {
            value: v.to_string(),
            target: ty.name(),
        });
    }
    Ok(v)
}

pub(crate) fn parse_float(text: &str, ty: &TypeInfo) -> Result<f64, DecodeError> {
    let v = text
        .trim()
        .parse::<f64>()
        .map_err(|_| DecodeError::InvalidValue {
            value: text.to_string(),
            target: ty.name(),
        })?;
    fit_float(v, ty)
}

fn encode_string(ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    let s = match value {
        Value::String(s) => s.as_str(),
        Value::Null => return Ok(SqlArgument::null()),
        other => return unsupported("string", other),
    };
    if let Some(members) = ctx.options.enum_members()? {
        if s.is_empty() {
            if let Some(first) = members.first() {
                return Ok(SqlArgument::bind(*first));
            }
        }
        if !members.contains(&s) {
            return Err(EncodeError::InvalidEnum {
                value: s.to_string(),
                members: members.join("|"),
            });
        }
    }
    Ok(SqlArgument::bind(s))
}

fn decode_string(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    let text = match wire {
        SqlValue::Null => return Ok(ctx.ty.zero_value()),
        SqlValue::Text(_) | SqlValue::Bytes(_) => wire_text(wire, ctx.ty)?.to_string(),
        other => other.to_string(),
    };
    Ok(Value::String(text))
}

fn encode_bool(_ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    match value {
        Value::Bool(b) => Ok(SqlArgument::bind(*b)),
        Value::Null => Ok(SqlArgument::null()),
        other => unsupported("bool", other),
    }
}

fn decode_bool(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    let b = match wire {
        SqlValue::Null => false,
        SqlValue::Bool(b) => *b,
        SqlValue::Int(v) => *v != 0,
        SqlValue::Uint(v) => *v != 0,
        SqlValue::Text(_) | SqlValue::Bytes(_) => {
            let text = wire_text(wire, ctx.ty)?.trim();
            if text == "1" || text.eq_ignore_ascii_case("true") {
                true
            } else if text.is_empty() || text == "0" || text.eq_ignore_ascii_case("false") {
                false
            } else {
                return Err(DecodeError::InvalidValue {
                    value: text.to_string(),
                    target: ctx.ty.name(),
                });
            }
        }
        other => return wire_unsupported(other, ctx.ty),
    };
    Ok(Value::Bool(b))
}

fn encode_int(ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    match value {
        Value::Int(v) => Ok(SqlArgument::bind(*v)),
        Value::Uint(v) => i64::try_from(*v)
            .map(SqlArgument::bind)
            .map_err(|_| EncodeError::Overflow {
                value: v.to_string(),
                target: ctx.ty.name().to_string(),
            }),
        Value::Null => Ok(SqlArgument::null()),
        other => unsupported("integer", other),
    }
}

fn decode_int(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    let v = match wire {
        SqlValue::Null => 0,
        SqlValue::Int(v) => fit_signed(i128::from(*v), ctx.ty)?,
        SqlValue::Uint(v) => fit_signed(i128::from(*v), ctx.ty)?,
        SqlValue::Bool(b) => i64::from(*b),
        SqlValue::Float(f) if f.fract() == 0.0 && f.is_finite() => {
            fit_signed(*f as i128, ctx.ty)?
        }
        SqlValue::Text(_) | SqlValue::Bytes(_) => parse_signed(wire_text(wire, ctx.ty)?, ctx.ty)?,
        other => return wire_unsupported(other, ctx.ty),
    };
    Ok(Value::Int(v))
}

fn encode_uint(ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    match value {
        Value::Uint(v) => Ok(SqlArgument::bind(*v)),
        Value::Int(v) => u64::try_from(*v)
            .map(SqlArgument::bind)
            .map_err(|_| EncodeError::Overflow {
                value: v.to_string(),
                target: ctx.ty.name().to_string(),
            }),
        Value::Null => Ok(SqlArgument::null()),
        other => unsupported("unsigned integer", other),
    }
}

fn decode_uint(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    let v = match wire {
        SqlValue::Null => 0,
        SqlValue::Int(v) => fit_unsigned(i128::from(*v), ctx.ty)?,
        SqlValue::Uint(v) => fit_unsigned(i128::from(*v), ctx.ty)?,
        SqlValue::Bool(b) => u64::from(*b),
        SqlValue::Float(f) if f.fract() == 0.0 && f.is_finite() => {
            fit_unsigned(*f as i128, ctx.ty)?
        }
        SqlValue::Text(_) | SqlValue::Bytes(_) => {
            parse_unsigned(wire_text(wire, ctx.ty)?, ctx.ty)?
        }
        other => return wire_unsupported(other, ctx.ty),
    };
    Ok(Value::Uint(v))
}

fn encode_float(_ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    match value {
        Value::Float(v) if !v.is_finite() => Err(EncodeError::NonFinite { value: *v }),
        Value::Float(v) => Ok(SqlArgument::bind(*v)),
        Value::Int(v) => Ok(SqlArgument::bind(*v as f64)),
        Value::Uint(v) => Ok(SqlArgument::bind(*v as f64)),
        Value::Null => Ok(SqlArgument::null()),
        other => unsupported("float", other),
    }
}

fn decode_float(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    let v = match wire {
        SqlValue::Null => 0.0,
        SqlValue::Float(v) => fit_float(*v, ctx.ty)?,
        SqlValue::Int(v) => *v as f64,
        SqlValue::Uint(v) => *v as f64,
        SqlValue::Text(_) | SqlValue::Bytes(_) => parse_float(wire_text(wire, ctx.ty)?, ctx.ty)?,
        other => return wire_unsupported(other, ctx.ty),
    };
    Ok(Value::Float(v))
}

fn inner_type(ty: &TypeInfo) -> Result<TypeInfo, NoCodecError> {
    ty.elem().ok_or_else(|| NoCodecError {
        type_name: ty.name().to_string(),
    })
}

fn encode_option(ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    if value.is_null() {
        return Ok(SqlArgument::null());
    }
    let inner = inner_type(ctx.ty)?;
    ctx.with_type(&inner).encode(value)
}

fn decode_option(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    if wire.is_null() {
        return Ok(Value::Null);
    }
    let inner = inner_type(ctx.ty)?;
    ctx.with_type(&inner).decode(wire)
}

/// Encodes records, sequences and maps as JSON text.
pub(crate) fn encode_json(ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    if value.is_null() {
        return Ok(SqlArgument::null());
    }
    Ok(SqlArgument::bind(jsonb::to_json(ctx, value)?))
}

/// Decodes JSON text into records, sequences and maps.
pub(crate) fn decode_json(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    match wire {
        SqlValue::Null => Ok(ctx.ty.zero_value()),
        SqlValue::Text(s) => jsonb::from_json(ctx, s.as_bytes()),
        SqlValue::Bytes(b) => jsonb::from_json(ctx, b),
        other => wire_unsupported(other, ctx.ty),
    }
}
