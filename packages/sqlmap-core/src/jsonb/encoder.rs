use sqlmap_types::{Kind, Value};

use super::writer::JsonWriter;
use crate::codec::CodecContext;
use crate::error::{EncodeError, NoCodecError};

fn unsupported(expected: &'static str, got: &Value) -> EncodeError {
    EncodeError::Unsupported {
        expected,
        got: got.variant_name(),
    }
}

/// Writes `value` as JSON according to the context's target type.
///
/// Records write one key per property in schema order, sequences write their
/// elements in order, maps write their entries sorted by key. `Null` writes
/// `null` whatever the target type.
pub fn encode_value(
    ctx: &CodecContext<'_>,
    w: &mut JsonWriter,
    value: &Value,
) -> Result<(), EncodeError> {
    if let Some(codec) = ctx.registry.json_codec(ctx.ty) {
        return (codec.writer)(ctx, w, value);
    }
    if value.is_null() {
        w.write_null();
        return Ok(());
    }

    match ctx.ty.kind() {
        Kind::Option => {
            let inner = ctx.ty.elem().ok_or_else(|| NoCodecError {
                type_name: ctx.ty.name().to_string(),
            })?;
            encode_value(&ctx.with_type(&inner), w, value)
        }
        Kind::String => match value {
            Value::String(s) => {
                w.write_string(s);
                Ok(())
            }
            other => Err(unsupported("string", other)),
        },
        Kind::Bool => match value {
            Value::Bool(b) => {
                w.write_bool(*b);
                Ok(())
            }
            other => Err(unsupported("bool", other)),
        },
        Kind::Int | Kind::Uint => match value {
            Value::Int(v) => {
                w.write_int(*v);
                Ok(())
            }
            Value::Uint(v) => {
                w.write_uint(*v);
                Ok(())
            }
            other => Err(unsupported("integer", other)),
        },
        Kind::Float => match value {
            Value::Float(v) => Ok(w.write_float(*v)?),
            Value::Int(v) => {
                w.write_int(*v);
                Ok(())
            }
            Value::Uint(v) => {
                w.write_uint(*v);
                Ok(())
            }
            other => Err(unsupported("float", other)),
        },
        Kind::Struct => encode_record(ctx, w, value),
        Kind::Array => {
            let Value::Array(items) = value else {
                return Err(unsupported("array", value));
            };
            let elem = ctx.ty.elem().ok_or_else(|| NoCodecError {
                type_name: ctx.ty.name().to_string(),
            })?;
            let elem_ctx = ctx.with_type(&elem);
            w.begin_array();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    w.comma();
                }
                encode_value(&elem_ctx, w, item)?;
            }
            w.end_array();
            Ok(())
        }
        Kind::Map => encode_map(ctx, w, value),
    }
}

fn encode_record(
    ctx: &CodecContext<'_>,
    w: &mut JsonWriter,
    value: &Value,
) -> Result<(), EncodeError> {
    if !matches!(value, Value::Record(_)) {
        return Err(unsupported("record", value));
    }
    let schema = ctx.schemas.get_or_build_info(ctx.ty)?;
    w.begin_object();
    for (i, field) in schema.properties().enumerate() {
        if i > 0 {
            w.comma();
        }
        w.write_key(field.name());
        let v = field.value_in(value).unwrap_or(&Value::Null);
        encode_value(&ctx.with_field(field), w, v)?;
    }
    w.end_object();
    Ok(())
}

fn map_key(key: &Value) -> Result<String, EncodeError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Int(v) => Ok(v.to_string()),
        Value::Uint(v) => Ok(v.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(unsupported("map key", other)),
    }
}

fn encode_map(ctx: &CodecContext<'_>, w: &mut JsonWriter, value: &Value) -> Result<(), EncodeError> {
    let Value::Map(entries) = value else {
        return Err(unsupported("map", value));
    };
    let elem = ctx.ty.elem().ok_or_else(|| NoCodecError {
        type_name: ctx.ty.name().to_string(),
    })?;
    let elem_ctx = ctx.with_type(&elem);

    let mut keyed = entries
        .iter()
        .map(|(k, v)| Ok((map_key(k)?, v)))
        .collect::<Result<Vec<_>, EncodeError>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    w.begin_object();
    for (i, (key, v)) in keyed.iter().enumerate() {
        if i > 0 {
            w.comma();
        }
        w.write_key(key);
        encode_value(&elem_ctx, w, v)?;
    }
    w.end_object();
    Ok(())
}
