//! JSON column format.
//!
//! Records, sequences and maps stored in a single JSON column are written and
//! read with the streaming [`JsonWriter`] and [`JsonReader`] here. Nested
//! values are resolved through the codec registry's JSON tier first and by
//! kind otherwise.

mod decoder;
mod encoder;
mod reader;
mod writer;

use sqlmap_types::Value;

use crate::codec::CodecContext;
use crate::error::{DecodeError, EncodeError};

pub use decoder::decode_value;
pub use encoder::encode_value;
pub use reader::{compact, JsonReader, Token, MAX_DEPTH};
pub use writer::JsonWriter;

/// Encodes `value` as JSON text for the context's target type.
pub fn to_json(ctx: &CodecContext<'_>, value: &Value) -> Result<String, EncodeError> {
    let mut writer = JsonWriter::with_capacity(64);
    encode_value(ctx, &mut writer, value)?;
    Ok(writer.into_string())
}

/// Decodes JSON text into the context's target type.
///
/// Empty input decodes like `null`.
pub fn from_json(ctx: &CodecContext<'_>, text: &[u8]) -> Result<Value, DecodeError> {
    let mut buf = text.to_vec();
    compact(&mut buf);
    if buf.is_empty() {
        return Ok(ctx.ty.zero_value());
    }
    let mut reader = JsonReader::new(&buf);
    let value = decode_value(ctx, &mut reader)?;
    reader.finish()?;
    Ok(value)
}
