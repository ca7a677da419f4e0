//! Codecs for exact host types: bytes, timestamps, identifiers, raw JSON and sets.

use std::any::TypeId;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use sqlmap_types::{RawJson, SqlArgument, SqlValue, TypeInfo, Value};
use uuid::Uuid;

use super::builtin::{decode_json, encode_json, unsupported, wire_text, wire_unsupported};
use super::registry::{CodecContext, CodecRegistry};
use crate::error::{DecodeError, EncodeError, JsonError};
use crate::jsonb::{self, JsonReader, JsonWriter};

/// Token written in place of the zero timestamp.
pub const CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP(6)";

pub(crate) fn install(registry: &CodecRegistry) {
    registry.register::<Vec<u8>, _, _>(encode_bytes, decode_bytes);
    registry.register::<DateTime<Utc>, _, _>(encode_time, decode_time);
    registry.register::<Uuid, _, _>(encode_uuid, decode_uuid);
    registry.register::<RawJson, _, _>(encode_raw_json, decode_raw_json);
    registry.register::<Vec<String>, _, _>(encode_set, decode_set);

    registry.register_json_codec(TypeId::of::<Vec<u8>>(), write_bytes, read_bytes);
    registry.register_json_codec(TypeId::of::<DateTime<Utc>>(), write_time, read_time);
    registry.register_json_codec(TypeId::of::<Uuid>(), write_uuid, read_uuid);
    registry.register_json_codec(TypeId::of::<RawJson>(), write_raw_json, read_raw_json);
}

fn bytes_of(value: &Value) -> Result<Vec<u8>, EncodeError> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Uint(v) => u8::try_from(*v).map_err(|_| EncodeError::Overflow {
                    value: v.to_string(),
                    target: "u8".to_string(),
                }),
                other => unsupported("byte", other),
            })
            .collect(),
        other => unsupported("bytes", other),
    }
}

fn base64_value(text: &str, ty: &TypeInfo) -> Result<Value, DecodeError> {
    STANDARD
        .decode(text.trim())
        .map(Value::Bytes)
        .map_err(|_| DecodeError::InvalidValue {
            value: text.to_string(),
            target: ty.name(),
        })
}

fn encode_bytes(_ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    if value.is_null() {
        return Ok(SqlArgument::null());
    }
    Ok(SqlArgument::bind(STANDARD.encode(bytes_of(value)?)))
}

fn decode_bytes(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    match wire {
        SqlValue::Null => Ok(Value::Bytes(Vec::new())),
        SqlValue::Text(_) | SqlValue::Bytes(_) => base64_value(wire_text(wire, ctx.ty)?, ctx.ty),
        other => wire_unsupported(other, ctx.ty),
    }
}

/// Parses `YYYY-MM-DD HH:MM:SS[.ffffff]`, RFC 3339 or `YYYY-MM-DD` as UTC.
pub(crate) fn parse_time(text: &str, ty: &TypeInfo) -> Result<DateTime<Utc>, DecodeError> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Some(naive) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(DecodeError::InvalidValue {
        value: text.to_string(),
        target: ty.name(),
    })
}

fn encode_time(_ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    match value {
        Value::Time(t) if *t == DateTime::<Utc>::default() => {
            Ok(SqlArgument::Raw(CURRENT_TIMESTAMP.to_string()))
        }
        Value::Time(t) => Ok(SqlArgument::bind(*t)),
        Value::Null => Ok(SqlArgument::null()),
        other => unsupported("time", other),
    }
}

fn decode_time(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    match wire {
        SqlValue::Null => Ok(ctx.ty.zero_value()),
        SqlValue::Time(t) => Ok(Value::Time(*t)),
        SqlValue::Text(_) | SqlValue::Bytes(_) => {
            parse_time(wire_text(wire, ctx.ty)?, ctx.ty).map(Value::Time)
        }
        other => wire_unsupported(other, ctx.ty),
    }
}

fn encode_uuid(_ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    match value {
        Value::Uuid(u) => Ok(SqlArgument::call(
            "UUID_TO_BIN",
            vec![SqlArgument::bind(u.hyphenated().to_string())],
        )),
        Value::Null => Ok(SqlArgument::null()),
        other => unsupported("uuid", other),
    }
}

fn decode_uuid(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    let invalid = |value: String| DecodeError::InvalidValue {
        value,
        target: ctx.ty.name(),
    };
    match wire {
        SqlValue::Null => Ok(Value::Uuid(Uuid::nil())),
        SqlValue::Bytes(b) if b.len() == 16 => Uuid::from_slice(b)
            .map(Value::Uuid)
            .map_err(|_| invalid(format!("{b:?}"))),
        SqlValue::Text(_) | SqlValue::Bytes(_) => {
            let text = wire_text(wire, ctx.ty)?;
            Uuid::parse_str(text.trim())
                .map(Value::Uuid)
                .map_err(|_| invalid(text.to_string()))
        }
        other => wire_unsupported(other, ctx.ty),
    }
}

/// Compacts raw JSON text; empty input becomes `null`.
fn normalize_json(text: &str) -> String {
    let mut buf = text.as_bytes().to_vec();
    jsonb::compact(&mut buf);
    if buf.is_empty() {
        return "null".to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn encode_raw_json(_ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    match value {
        Value::Json(s) | Value::String(s) => Ok(SqlArgument::bind(normalize_json(s))),
        Value::Null => Ok(SqlArgument::null()),
        other => unsupported("json", other),
    }
}

fn decode_raw_json(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    match wire {
        SqlValue::Null => Ok(ctx.ty.zero_value()),
        SqlValue::Text(_) | SqlValue::Bytes(_) => {
            Ok(Value::Json(wire_text(wire, ctx.ty)?.to_string()))
        }
        other => wire_unsupported(other, ctx.ty),
    }
}

/// `Vec<String>` is a SET column when annotated with `set=`, JSON otherwise.
fn encode_set(ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    let Some(members) = ctx.options.set_members()? else {
        return encode_json(ctx, value);
    };
    let items = match value {
        Value::Null => return Ok(SqlArgument::null()),
        Value::Array(items) => items,
        other => return unsupported("set", other),
    };
    let mut out: Vec<&str> = Vec::with_capacity(items.len());
    for item in items {
        let Value::String(s) = item else {
            return unsupported("string", item);
        };
        if !members.contains(&s.as_str()) {
            return Err(EncodeError::InvalidSet {
                value: s.clone(),
                members: members.join("|"),
            });
        }
        out.push(s);
    }
    Ok(SqlArgument::bind(out.join(",")))
}

fn decode_set(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    if ctx.options.set_values.is_none() {
        return decode_json(ctx, wire);
    }
    match wire {
        SqlValue::Null => Ok(Value::Array(Vec::new())),
        SqlValue::Text(_) | SqlValue::Bytes(_) => Ok(Value::Array(
            wire_text(wire, ctx.ty)?
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )),
        other => wire_unsupported(other, ctx.ty),
    }
}

fn write_bytes(
    _ctx: &CodecContext<'_>,
    w: &mut JsonWriter,
    value: &Value,
) -> Result<(), EncodeError> {
    if value.is_null() {
        w.write_null();
        return Ok(());
    }
    w.write_string(&STANDARD.encode(bytes_of(value)?));
    Ok(())
}

fn read_bytes(ctx: &CodecContext<'_>, r: &mut JsonReader<'_>) -> Result<Value, DecodeError> {
    if r.is_null() {
        r.read_null()?;
        return Ok(Value::Bytes(Vec::new()));
    }
    base64_value(&r.read_string()?, ctx.ty)
}

fn write_time(
    _ctx: &CodecContext<'_>,
    w: &mut JsonWriter,
    value: &Value,
) -> Result<(), EncodeError> {
    match value {
        Value::Time(t) => w.write_string(&t.to_rfc3339_opts(SecondsFormat::Micros, true)),
        Value::Null => w.write_null(),
        other => return unsupported("time", other),
    }
    Ok(())
}

fn read_time(ctx: &CodecContext<'_>, r: &mut JsonReader<'_>) -> Result<Value, DecodeError> {
    if r.is_null() {
        r.read_null()?;
        return Ok(ctx.ty.zero_value());
    }
    parse_time(&r.read_string()?, ctx.ty).map(Value::Time)
}

fn write_uuid(
    _ctx: &CodecContext<'_>,
    w: &mut JsonWriter,
    value: &Value,
) -> Result<(), EncodeError> {
    match value {
        Value::Uuid(u) => w.write_string(&u.hyphenated().to_string()),
        Value::Null => w.write_null(),
        other => return unsupported("uuid", other),
    }
    Ok(())
}

fn read_uuid(ctx: &CodecContext<'_>, r: &mut JsonReader<'_>) -> Result<Value, DecodeError> {
    if r.is_null() {
        r.read_null()?;
        return Ok(Value::Uuid(Uuid::nil()));
    }
    let text = r.read_string()?;
    Uuid::parse_str(&text)
        .map(Value::Uuid)
        .map_err(|_| DecodeError::InvalidValue {
            value: text,
            target: ctx.ty.name(),
        })
}

fn write_raw_json(
    _ctx: &CodecContext<'_>,
    w: &mut JsonWriter,
    value: &Value,
) -> Result<(), EncodeError> {
    match value {
        Value::Json(s) => {
            let normalized = normalize_json(s);
            let mut reader = JsonReader::new(normalized.as_bytes());
            reader.read_raw()?;
            reader.finish()?;
            w.write_raw(&normalized);
        }
        Value::Null => w.write_null(),
        other => return unsupported("json", other),
    }
    Ok(())
}

fn read_raw_json(_ctx: &CodecContext<'_>, r: &mut JsonReader<'_>) -> Result<Value, DecodeError> {
    let raw = r.read_raw()?;
    let text = std::str::from_utf8(raw).map_err(|_| JsonError::InvalidUtf8 { offset: 0 })?;
    Ok(Value::Json(text.to_string()))
}
