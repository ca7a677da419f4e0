//! Point and line string codecs.
//!
//! Values are sent as well-known text wrapped in `ST_GeomFromText`. MySQL
//! returns geometry in its internal format: a little-endian SRID followed by
//! well-known binary.

use std::any::TypeId;

use sqlmap_types::{geo::wkt_linestring, LineString, Point, SqlArgument, SqlValue, TypeInfo, Value};

use super::builtin::{unsupported, wire_unsupported};
use super::registry::{CodecContext, CodecRegistry};
use crate::error::{DecodeError, EncodeError};
use crate::jsonb::{JsonReader, JsonWriter};

const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;

pub(crate) fn install(registry: &CodecRegistry) {
    registry.register::<Point, _, _>(encode_geometry, decode_geometry);
    registry.register::<LineString, _, _>(encode_geometry, decode_geometry);
    registry.register_json_codec(TypeId::of::<Point>(), write_geometry, read_geometry);
    registry.register_json_codec(TypeId::of::<LineString>(), write_geometry, read_geometry);
}

fn wkt_of(value: &Value) -> Result<Option<String>, EncodeError> {
    match value {
        Value::Point(p) => Ok(Some(p.to_wkt())),
        Value::LineString(points) => Ok(Some(wkt_linestring(points))),
        Value::Null => Ok(None),
        other => unsupported("geometry", other),
    }
}

fn encode_geometry(ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
    let Some(wkt) = wkt_of(value)? else {
        return Ok(SqlArgument::null());
    };
    let mut args = vec![SqlArgument::bind(wkt)];
    if let Some(srid) = ctx.options.srid()? {
        args.push(SqlArgument::Raw(srid.to_string()));
    }
    Ok(SqlArgument::call("ST_GeomFromText", args))
}

fn decode_geometry(ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
    match wire {
        SqlValue::Null => Ok(ctx.ty.zero_value()),
        SqlValue::Bytes(b) if b.len() >= 9 && !is_wkt(b) => parse_internal(b, ctx.ty),
        SqlValue::Text(_) | SqlValue::Bytes(_) => {
            let text = super::builtin::wire_text(wire, ctx.ty)?;
            parse_wkt(text, ctx.ty)
        }
        other => wire_unsupported(other, ctx.ty),
    }
}

/// Returns `true` when `bytes` start with a geometry tag in any case,
/// after optional leading whitespace.
fn is_wkt(bytes: &[u8]) -> bool {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let text = &bytes[start..];
    [&b"POINT"[..], &b"LINESTRING"[..]]
        .iter()
        .any(|tag| text.get(..tag.len()).is_some_and(|head| head.eq_ignore_ascii_case(tag)))
}

struct WkbCursor<'b> {
    buf: &'b [u8],
    pos: usize,
    little_endian: bool,
}

impl<'b> WkbCursor<'b> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes: [u8; N] = self.buf.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn u32(&mut self) -> Option<u32> {
        let bytes = self.take::<4>()?;
        Some(if self.little_endian {
            u32::from_le_bytes(bytes)
        } else {
            u32::from_be_bytes(bytes)
        })
    }

    fn f64(&mut self) -> Option<f64> {
        let bytes = self.take::<8>()?;
        Some(if self.little_endian {
            f64::from_le_bytes(bytes)
        } else {
            f64::from_be_bytes(bytes)
        })
    }

    fn point(&mut self) -> Option<Point> {
        Some(Point::new(self.f64()?, self.f64()?))
    }
}

fn parse_internal(bytes: &[u8], ty: &TypeInfo) -> Result<Value, DecodeError> {
    let invalid = || DecodeError::InvalidValue {
        value: format!("<{} bytes of geometry>", bytes.len()),
        target: ty.name(),
    };
    // Skip the SRID prefix.
    let wkb = bytes.get(4..).ok_or_else(invalid)?;
    let mut cursor = WkbCursor {
        buf: wkb,
        pos: 1,
        little_endian: wkb.first() == Some(&1),
    };
    let value = match cursor.u32().ok_or_else(invalid)? {
        WKB_POINT => Value::Point(cursor.point().ok_or_else(invalid)?),
        WKB_LINESTRING => {
            let count = cursor.u32().ok_or_else(invalid)?;
            let mut points = Vec::with_capacity(count.min(1024) as usize);
            for _ in 0..count {
                points.push(cursor.point().ok_or_else(invalid)?);
            }
            Value::LineString(points)
        }
        _ => return Err(invalid()),
    };
    check_shape(value, ty)
}

fn parse_wkt(text: &str, ty: &TypeInfo) -> Result<Value, DecodeError> {
    let invalid = || DecodeError::InvalidValue {
        value: text.to_string(),
        target: ty.name(),
    };
    let text = text.trim();
    let open = text.find('(').ok_or_else(invalid)?;
    let body = text[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
    let points = body
        .split(',')
        .map(|pair| {
            let mut coords = pair.split_whitespace().map(str::parse::<f64>);
            match (coords.next(), coords.next(), coords.next()) {
                (Some(Ok(x)), Some(Ok(y)), None) => Ok(Point::new(x, y)),
                _ => Err(invalid()),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let value = match text[..open].trim().to_ascii_uppercase().as_str() {
        "POINT" => match points.as_slice() {
            [p] => Value::Point(*p),
            _ => return Err(invalid()),
        },
        "LINESTRING" => Value::LineString(points),
        _ => return Err(invalid()),
    };
    check_shape(value, ty)
}

fn check_shape(value: Value, ty: &TypeInfo) -> Result<Value, DecodeError> {
    let matches = match &value {
        Value::Point(_) => ty.is::<Point>(),
        Value::LineString(_) => ty.is::<LineString>(),
        _ => false,
    };
    if matches {
        Ok(value)
    } else {
        Err(DecodeError::Unsupported {
            wire: value.variant_name(),
            target: ty.name(),
        })
    }
}

fn write_geometry(
    _ctx: &CodecContext<'_>,
    w: &mut JsonWriter,
    value: &Value,
) -> Result<(), EncodeError> {
    match wkt_of(value)? {
        Some(wkt) => w.write_string(&wkt),
        None => w.write_null(),
    }
    Ok(())
}

fn read_geometry(ctx: &CodecContext<'_>, r: &mut JsonReader<'_>) -> Result<Value, DecodeError> {
    if r.is_null() {
        r.read_null()?;
        return Ok(ctx.ty.zero_value());
    }
    parse_wkt(&r.read_string()?, ctx.ty)
}
