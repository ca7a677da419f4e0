use sqlmap_types::{Kind, TypeInfo, Value};
use tracing::trace;

use super::reader::JsonReader;
use crate::codec::{parse_float, parse_signed, parse_unsigned, CodecContext};
use crate::error::{DecodeError, NoCodecError};

fn element_type(ty: &TypeInfo) -> Result<TypeInfo, NoCodecError> {
    ty.elem().ok_or_else(|| NoCodecError {
        type_name: ty.name().to_string(),
    })
}

/// Reads one JSON value into the context's target type.
///
/// Record keys are matched against the schema's properties; unknown keys are
/// skipped. `null` yields `Null` for optional targets and the zero value
/// otherwise.
pub fn decode_value(ctx: &CodecContext<'_>, r: &mut JsonReader<'_>) -> Result<Value, DecodeError> {
    if let Some(codec) = ctx.registry.json_codec(ctx.ty) {
        return (codec.reader)(ctx, r);
    }
    if r.is_null() {
        r.read_null()?;
        return Ok(if ctx.ty.is_nullable() {
            Value::Null
        } else {
            ctx.ty.zero_value()
        });
    }

    match ctx.ty.kind() {
        Kind::Option => {
            let inner = element_type(ctx.ty)?;
            decode_value(&ctx.with_type(&inner), r)
        }
        Kind::String => Ok(Value::String(r.read_string()?)),
        Kind::Bool => Ok(Value::Bool(r.read_boolean()?)),
        Kind::Int => Ok(Value::Int(parse_signed(r.read_number()?, ctx.ty)?)),
        Kind::Uint => Ok(Value::Uint(parse_unsigned(r.read_number()?, ctx.ty)?)),
        Kind::Float => Ok(Value::Float(parse_float(r.read_number()?, ctx.ty)?)),
        Kind::Struct => decode_record(ctx, r),
        Kind::Array => {
            let elem = element_type(ctx.ty)?;
            let elem_ctx = ctx.with_type(&elem);
            let mut items = Vec::new();
            r.read_array(|_, sub| {
                items.push(decode_value(&elem_ctx, sub)?);
                Ok::<(), DecodeError>(())
            })?;
            Ok(Value::Array(items))
        }
        Kind::Map => decode_map(ctx, r),
    }
}

fn decode_record(ctx: &CodecContext<'_>, r: &mut JsonReader<'_>) -> Result<Value, DecodeError> {
    let schema = ctx.schemas.get_or_build_info(ctx.ty)?;
    let mut out = ctx.ty.zero_value();
    r.read_object(|key, sub| {
        match schema.property(&key) {
            Some(field) => {
                let v = decode_value(&ctx.with_field(field), sub)?;
                if let Some(slot) = schema.slot_mut(&mut out, field.id()) {
                    *slot = v;
                }
            }
            None => trace!("Skipping unknown key '{}' for {}", key, schema.name()),
        }
        Ok::<(), DecodeError>(())
    })?;
    Ok(out)
}

fn map_key(ty: &TypeInfo, key: String) -> Result<Value, DecodeError> {
    match ty.kind() {
        Kind::String => Ok(Value::String(key)),
        Kind::Int => Ok(Value::Int(parse_signed(&key, ty)?)),
        Kind::Uint => Ok(Value::Uint(parse_unsigned(&key, ty)?)),
        Kind::Bool => match key.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(DecodeError::InvalidValue {
                value: key,
                target: ty.name(),
            }),
        },
        _ => Err(DecodeError::Unsupported {
            wire: "string",
            target: ty.name(),
        }),
    }
}

fn decode_map(ctx: &CodecContext<'_>, r: &mut JsonReader<'_>) -> Result<Value, DecodeError> {
    let key_ty = ctx.ty.key().ok_or_else(|| NoCodecError {
        type_name: ctx.ty.name().to_string(),
    })?;
    let elem = element_type(ctx.ty)?;
    let elem_ctx = ctx.with_type(&elem);
    let mut entries = Vec::new();
    r.read_object(|key, sub| {
        let k = map_key(&key_ty, key)?;
        let v = decode_value(&elem_ctx, sub)?;
        entries.push((k, v));
        Ok::<(), DecodeError>(())
    })?;
    Ok(Value::Map(entries))
}
