use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use sqlmap_types::{Kind, Reflect, SqlArgument, SqlValue, TypeInfo, Value};
use tracing::debug;

use crate::error::{DecodeError, EncodeError, NoCodecError};
use crate::jsonb::{JsonReader, JsonWriter};
use crate::schema::{FieldDescriptor, FieldOptions, SchemaCache};

/// Converts a host value into a SQL argument.
pub type EncodeFn =
    dyn Fn(&CodecContext<'_>, &Value) -> Result<SqlArgument, EncodeError> + Send + Sync;

/// Converts a wire value into a host value.
pub type DecodeFn = dyn Fn(&CodecContext<'_>, &SqlValue) -> Result<Value, DecodeError> + Send + Sync;

/// Writes a host value nested inside a JSON column.
pub type JsonWriteFn =
    dyn Fn(&CodecContext<'_>, &mut JsonWriter, &Value) -> Result<(), EncodeError> + Send + Sync;

/// Reads a host value nested inside a JSON column.
pub type JsonReadFn =
    dyn Fn(&CodecContext<'_>, &mut JsonReader<'_>) -> Result<Value, DecodeError> + Send + Sync;

/// Shared handle to an encode function.
#[derive(Clone)]
pub struct Encoder(Arc<EncodeFn>);

impl Encoder {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CodecContext<'_>, &Value) -> Result<SqlArgument, EncodeError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn encode(&self, ctx: &CodecContext<'_>, value: &Value) -> Result<SqlArgument, EncodeError> {
        (self.0)(ctx, value)
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder").finish_non_exhaustive()
    }
}

/// Shared handle to a decode function.
#[derive(Clone)]
pub struct Decoder(Arc<DecodeFn>);

impl Decoder {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CodecContext<'_>, &SqlValue) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn decode(&self, ctx: &CodecContext<'_>, wire: &SqlValue) -> Result<Value, DecodeError> {
        (self.0)(ctx, wire)
    }
}

/// An encoder/decoder pair.
#[derive(Clone)]
pub struct Codec {
    pub encoder: Encoder,
    pub decoder: Decoder,
}

/// A writer/reader pair for values nested in JSON columns.
#[derive(Clone)]
pub struct JsonCodec {
    pub writer: Arc<JsonWriteFn>,
    pub reader: Arc<JsonReadFn>,
}

/// Everything a codec needs to know about the value it converts.
#[derive(Clone, Copy)]
pub struct CodecContext<'a> {
    pub registry: &'a CodecRegistry,
    pub schemas: &'a SchemaCache,
    pub ty: &'a TypeInfo,
    pub options: &'a FieldOptions,
}

impl<'a> CodecContext<'a> {
    pub fn new(
        registry: &'a CodecRegistry,
        schemas: &'a SchemaCache,
        ty: &'a TypeInfo,
        options: &'a FieldOptions,
    ) -> Self {
        Self {
            registry,
            schemas,
            ty,
            options,
        }
    }

    /// Same registry and options, different target type.
    pub fn with_type<'b>(&self, ty: &'b TypeInfo) -> CodecContext<'b>
    where
        'a: 'b,
    {
        CodecContext {
            registry: self.registry,
            schemas: self.schemas,
            ty,
            options: self.options,
        }
    }

    /// Context of a record field.
    pub fn with_field<'b>(&self, field: &'b FieldDescriptor) -> CodecContext<'b>
    where
        'a: 'b,
    {
        CodecContext {
            registry: self.registry,
            schemas: self.schemas,
            ty: field.type_info(),
            options: field.options(),
        }
    }

    /// Encodes through the codec resolved for the target type.
    pub fn encode(&self, value: &Value) -> Result<SqlArgument, EncodeError> {
        self.registry.lookup_encoder(self.ty)?.encode(self, value)
    }

    /// Decodes through the codec resolved for the target type.
    pub fn decode(&self, wire: &SqlValue) -> Result<Value, DecodeError> {
        self.registry.lookup_decoder(self.ty)?.decode(self, wire)
    }
}

/// Registry of codecs keyed by exact type and by kind.
///
/// Lookups consult, in order: the type's own marshaler, the exact type
/// registration, the kind registration.
#[derive(Default)]
pub struct CodecRegistry {
    types: RwLock<HashMap<TypeId, Codec>>,
    kinds: RwLock<HashMap<Kind, Codec>>,
    json: RwLock<HashMap<TypeId, JsonCodec>>,
}

impl CodecRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in codecs.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        super::builtin::install(&registry);
        registry
    }

    /// Registers a codec for an exact type, replacing any previous one.
    ///
    /// # Arguments
    /// * `id` - Type identity
    /// * `name` - Type name, for logging
    /// * `encode` - Value to SQL argument conversion
    /// * `decode` - Wire value to value conversion
    pub fn register_type_codec<E, D>(&self, id: TypeId, name: &str, encode: E, decode: D)
    where
        E: Fn(&CodecContext<'_>, &Value) -> Result<SqlArgument, EncodeError> + Send + Sync + 'static,
        D: Fn(&CodecContext<'_>, &SqlValue) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        let codec = Codec {
            encoder: Encoder::new(encode),
            decoder: Decoder::new(decode),
        };
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        if types.insert(id, codec).is_some() {
            debug!("Replaced codec for type {}", name);
        }
    }

    /// Registers a codec for `T`.
    pub fn register<T, E, D>(&self, encode: E, decode: D)
    where
        T: Reflect,
        E: Fn(&CodecContext<'_>, &Value) -> Result<SqlArgument, EncodeError> + Send + Sync + 'static,
        D: Fn(&CodecContext<'_>, &SqlValue) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.register_type_codec(TypeId::of::<T>(), std::any::type_name::<T>(), encode, decode);
    }

    /// Registers the fallback codec for a kind.
    pub fn register_kind_codec<E, D>(&self, kind: Kind, encode: E, decode: D)
    where
        E: Fn(&CodecContext<'_>, &Value) -> Result<SqlArgument, EncodeError> + Send + Sync + 'static,
        D: Fn(&CodecContext<'_>, &SqlValue) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        let codec = Codec {
            encoder: Encoder::new(encode),
            decoder: Decoder::new(decode),
        };
        let mut kinds = self.kinds.write().unwrap_or_else(PoisonError::into_inner);
        if kinds.insert(kind, codec).is_some() {
            debug!("Replaced codec for kind {}", kind);
        }
    }

    /// Registers how an exact type is written and read inside JSON columns.
    pub fn register_json_codec<W, R>(&self, id: TypeId, write: W, read: R)
    where
        W: Fn(&CodecContext<'_>, &mut JsonWriter, &Value) -> Result<(), EncodeError>
            + Send
            + Sync
            + 'static,
        R: Fn(&CodecContext<'_>, &mut JsonReader<'_>) -> Result<Value, DecodeError>
            + Send
            + Sync
            + 'static,
    {
        let codec = JsonCodec {
            writer: Arc::new(write),
            reader: Arc::new(read),
        };
        self.json
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, codec);
    }

    /// Resolves the encoder for a type.
    ///
    /// # Returns
    /// The marshaler, exact-type or kind encoder, or `NoCodecError`.
    pub fn lookup_encoder(&self, ty: &TypeInfo) -> Result<Encoder, NoCodecError> {
        if let Some(marshaler) = ty.marshaler() {
            let encode = marshaler.encode;
            let type_name = ty.name();
            return Ok(Encoder::new(move |_, value| {
                encode(value).map_err(|message| EncodeError::Marshal { type_name, message })
            }));
        }
        self.lookup(ty)
            .map(|codec| codec.encoder)
            .ok_or_else(|| NoCodecError {
                type_name: ty.name().to_string(),
            })
    }

    /// Resolves the decoder for a type.
    ///
    /// # Returns
    /// The marshaler, exact-type or kind decoder, or `NoCodecError`.
    pub fn lookup_decoder(&self, ty: &TypeInfo) -> Result<Decoder, NoCodecError> {
        if let Some(marshaler) = ty.marshaler() {
            let decode = marshaler.decode;
            let type_name = ty.name();
            return Ok(Decoder::new(move |_, wire| {
                decode(wire).map_err(|message| DecodeError::Marshal { type_name, message })
            }));
        }
        self.lookup(ty)
            .map(|codec| codec.decoder)
            .ok_or_else(|| NoCodecError {
                type_name: ty.name().to_string(),
            })
    }

    fn lookup(&self, ty: &TypeInfo) -> Option<Codec> {
        if let Some(codec) = self
            .types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.id())
        {
            return Some(codec.clone());
        }
        self.kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.kind())
            .cloned()
    }

    /// JSON-tier codec of an exact type.
    pub fn json_codec(&self, ty: &TypeInfo) -> Option<JsonCodec> {
        self.json
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.id())
            .cloned()
    }

    /// Checks if an exact-type codec is registered.
    pub fn contains_type(&self, id: TypeId) -> bool {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Checks if a kind codec is registered.
    pub fn contains_kind(&self, kind: Kind) -> bool {
        self.kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&kind)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("types", &self.types.read().map(|m| m.len()).unwrap_or_default())
            .field("kinds", &self.kinds.read().map(|m| m.len()).unwrap_or_default())
            .field("json", &self.json.read().map(|m| m.len()).unwrap_or_default())
            .finish()
    }
}
