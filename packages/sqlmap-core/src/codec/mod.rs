//! Value codecs.
//!
//! An encoder turns a host [`Value`](sqlmap_types::Value) into a
//! [`SqlArgument`](sqlmap_types::SqlArgument); a decoder turns a wire
//! [`SqlValue`](sqlmap_types::SqlValue) back into a host value. Codecs are
//! registered per exact type or per [`Kind`](sqlmap_types::Kind).

mod builtin;
mod registry;
mod spatial;
mod types;

pub(crate) use builtin::{parse_float, parse_signed, parse_unsigned};
pub use registry::{
    Codec, CodecContext, CodecRegistry, DecodeFn, Decoder, EncodeFn, Encoder, JsonCodec,
    JsonReadFn, JsonWriteFn,
};
pub use types::CURRENT_TIMESTAMP;
