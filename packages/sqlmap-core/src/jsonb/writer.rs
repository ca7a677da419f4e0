//! JSON writer.

use std::fmt::Write;

use crate::error::JsonError;

/// Appends JSON tokens to a text buffer.
///
/// The writer does not track nesting; callers emit delimiters explicitly.
#[derive(Debug, Default, Clone)]
pub struct JsonWriter {
    buf: String,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Writes a quoted, escaped string.
    pub fn write_string(&mut self, s: &str) {
        self.buf.reserve(s.len() + 2);
        self.buf.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.buf.push_str("\\\""),
                '\\' => self.buf.push_str("\\\\"),
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                '\u{08}' => self.buf.push_str("\\b"),
                '\u{0c}' => self.buf.push_str("\\f"),
                c if (c as u32) < 0x20 => {
                    let _ = write!(self.buf, "\\u{:04x}", c as u32);
                }
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
    }

    pub fn write_int(&mut self, v: i64) {
        let _ = write!(self.buf, "{v}");
    }

    pub fn write_uint(&mut self, v: u64) {
        let _ = write!(self.buf, "{v}");
    }

    /// Writes a float in its shortest round-tripping form.
    pub fn write_float(&mut self, v: f64) -> Result<(), JsonError> {
        if !v.is_finite() {
            return Err(JsonError::NonFinite { value: v });
        }
        let _ = write!(self.buf, "{v}");
        Ok(())
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push_str(if v { "true" } else { "false" });
    }

    pub fn write_null(&mut self) {
        self.buf.push_str("null");
    }

    /// Appends a pre-encoded JSON fragment verbatim.
    pub fn write_raw(&mut self, fragment: &str) {
        self.buf.push_str(fragment);
    }

    /// Writes `"key":`.
    pub fn write_key(&mut self, key: &str) {
        self.write_string(key);
        self.buf.push(':');
    }

    pub fn begin_object(&mut self) {
        self.buf.push('{');
    }

    pub fn end_object(&mut self) {
        self.buf.push('}');
    }

    pub fn begin_array(&mut self) {
        self.buf.push('[');
    }

    pub fn end_array(&mut self) {
        self.buf.push(']');
    }

    pub fn comma(&mut self) {
        self.buf.push(',');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_escaping() {
        let mut w = JsonWriter::new();
        w.write_string("a\"b\\c\nd\u{01}");
        assert_eq!(w.as_str(), r#""a\"b\\c\nd\u0001""#);
    }

    #[test]
    fn test_floats() {
        let mut w = JsonWriter::new();
        w.write_float(1.5).unwrap();
        w.comma();
        w.write_float(-0.25).unwrap();
        assert_eq!(w.as_str(), "1.5,-0.25");
        assert!(w.write_float(f64::NAN).is_err());
    }
}
