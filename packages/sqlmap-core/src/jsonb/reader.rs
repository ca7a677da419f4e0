//! Streaming JSON reader.

use crate::error::JsonError;

/// Class of the next token in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Colon,
    Comma,
    String,
    Number,
    True,
    False,
    Null,
}

/// Deepest container nesting a reader accepts.
pub const MAX_DEPTH: usize = 128;

/// Cursor over a JSON document.
///
/// Nested values are handed to callbacks as sub-readers scoped to that
/// value's bytes, so a callback can never read past its own value. Sub-readers
/// inherit the nesting depth of their parent.
#[derive(Debug, Clone)]
pub struct JsonReader<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> JsonReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
        }
    }

    /// Reader over one element of the container being read.
    fn nested(&self, buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            depth: self.depth,
        }
    }

    /// Number of containers enclosing the cursor.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn enter(&mut self, op: &'static str) -> Result<(), JsonError> {
        if self.depth >= MAX_DEPTH {
            return Err(JsonError::TooDeep {
                op,
                max: MAX_DEPTH,
                offset: self.pos,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.buf.get(self.pos) {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek_byte(&mut self, op: &'static str) -> Result<u8, JsonError> {
        self.skip_whitespace();
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(JsonError::UnexpectedEof { op })
    }

    fn unexpected(&self, op: &'static str) -> JsonError {
        match self.char_at(self.pos) {
            Some(ch) => JsonError::UnexpectedChar {
                op,
                ch,
                offset: self.pos,
            },
            None => JsonError::UnexpectedEof { op },
        }
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        let tail = self.buf.get(offset..)?;
        let len = tail.len().min(4);
        (1..=len)
            .find_map(|n| std::str::from_utf8(&tail[..n]).ok())
            .and_then(|s| s.chars().next())
            .or_else(|| tail.first().map(|&b| char::from(b)))
    }

    fn expect_byte(&mut self, op: &'static str, expected: u8) -> Result<(), JsonError> {
        if self.peek_byte(op)? == expected {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(op))
        }
    }

    fn expect_literal(&mut self, op: &'static str, literal: &[u8]) -> Result<(), JsonError> {
        self.skip_whitespace();
        for &expected in literal {
            match self.buf.get(self.pos) {
                Some(&b) if b == expected => self.pos += 1,
                Some(_) => return Err(self.unexpected(op)),
                None => return Err(JsonError::UnexpectedEof { op }),
            }
        }
        Ok(())
    }

    /// Classifies the next token without consuming it.
    pub fn next_token(&mut self) -> Result<Token, JsonError> {
        let token = match self.peek_byte("next_token")? {
            b'{' => Token::BeginObject,
            b'}' => Token::EndObject,
            b'[' => Token::BeginArray,
            b']' => Token::EndArray,
            b':' => Token::Colon,
            b',' => Token::Comma,
            b'"' => Token::String,
            b'-' | b'0'..=b'9' => Token::Number,
            b't' => Token::True,
            b'f' => Token::False,
            b'n' => Token::Null,
            _ => return Err(self.unexpected("next_token")),
        };
        Ok(token)
    }

    /// Returns `true` if the next value is `null`.
    pub fn is_null(&mut self) -> bool {
        matches!(self.next_token(), Ok(Token::Null))
    }

    /// Consumes one complete value and returns its bytes.
    pub fn read_raw(&mut self) -> Result<&'a [u8], JsonError> {
        self.skip_whitespace();
        let start = self.pos;
        self.skip_value()?;
        Ok(&self.buf[start..self.pos])
    }

    fn skip_value(&mut self) -> Result<(), JsonError> {
        match self.next_token()? {
            Token::String => self.skip_string(),
            Token::Number => self.read_number().map(|_| ()),
            Token::True | Token::False => self.read_boolean().map(|_| ()),
            Token::Null => self.read_null(),
            Token::BeginArray => self.skip_container("read_array", b'[', b']', false),
            Token::BeginObject => self.skip_container("read_object", b'{', b'}', true),
            _ => Err(self.unexpected("read_raw")),
        }
    }

    fn skip_string(&mut self) -> Result<(), JsonError> {
        self.expect_byte("read_string", b'"')?;
        loop {
            match self.buf.get(self.pos) {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'\\') => self.pos += 2,
                Some(_) => self.pos += 1,
                None => return Err(JsonError::UnexpectedEof { op: "read_string" }),
            }
        }
    }

    fn skip_container(
        &mut self,
        op: &'static str,
        open: u8,
        close: u8,
        keyed: bool,
    ) -> Result<(), JsonError> {
        self.expect_byte(op, open)?;
        self.enter(op)?;
        if self.peek_byte(op)? == close {
            self.pos += 1;
            self.leave();
            return Ok(());
        }
        loop {
            if keyed {
                self.skip_string()?;
                self.expect_byte(op, b':')?;
            }
            self.skip_value()?;
            match self.peek_byte(op)? {
                b',' => self.pos += 1,
                b if b == close => {
                    self.pos += 1;
                    self.leave();
                    return Ok(());
                }
                _ => return Err(self.unexpected(op)),
            }
        }
    }

    /// Reads a string, resolving escape sequences.
    pub fn read_string(&mut self) -> Result<String, JsonError> {
        const OP: &str = "read_string";
        self.expect_byte(OP, b'"')?;
        let start = self.pos;
        let mut out: Vec<u8> = Vec::new();
        loop {
            let Some(&b) = self.buf.get(self.pos) else {
                return Err(JsonError::UnexpectedEof { op: OP });
            };
            match b {
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    let escape_at = self.pos;
                    let Some(&e) = self.buf.get(self.pos + 1) else {
                        return Err(JsonError::UnexpectedEof { op: OP });
                    };
                    self.pos += 2;
                    match e {
                        b'"' => out.push(b'"'),
                        b'\\' => out.push(b'\\'),
                        b'/' => out.push(b'/'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'u' => {
                            let ch = self.read_unicode_escape(escape_at)?;
                            let mut tmp = [0u8; 4];
                            out.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
                        }
                        _ => return Err(JsonError::InvalidEscape { offset: escape_at }),
                    }
                }
                0x00..=0x1f => return Err(self.unexpected(OP)),
                _ => {
                    out.push(b);
                    self.pos += 1;
                }
            }
        }
        String::from_utf8(out).map_err(|_| JsonError::InvalidUtf8 { offset: start })
    }

    fn read_hex4(&mut self, escape_at: usize) -> Result<u32, JsonError> {
        let digits = self
            .buf
            .get(self.pos..self.pos + 4)
            .ok_or(JsonError::InvalidEscape { offset: escape_at })?;
        let text =
            std::str::from_utf8(digits).map_err(|_| JsonError::InvalidEscape { offset: escape_at })?;
        let code = u32::from_str_radix(text, 16)
            .map_err(|_| JsonError::InvalidEscape { offset: escape_at })?;
        self.pos += 4;
        Ok(code)
    }

    fn read_unicode_escape(&mut self, escape_at: usize) -> Result<char, JsonError> {
        let high = self.read_hex4(escape_at)?;
        let code = match high {
            0xD800..=0xDBFF => {
                if self.buf.get(self.pos..self.pos + 2) != Some(b"\\u".as_slice()) {
                    return Err(JsonError::InvalidEscape { offset: escape_at });
                }
                self.pos += 2;
                let low = self.read_hex4(escape_at)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(JsonError::InvalidEscape { offset: escape_at });
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(JsonError::InvalidEscape { offset: escape_at }),
            code => code,
        };
        char::from_u32(code).ok_or(JsonError::InvalidEscape { offset: escape_at })
    }

    /// Lexes a number and returns its text without converting it.
    pub fn read_number(&mut self) -> Result<&'a str, JsonError> {
        const OP: &str = "read_number";
        self.skip_whitespace();
        let start = self.pos;
        let bytes = self.buf;
        let mut end = start;

        if bytes.get(end) == Some(&b'-') {
            end += 1;
        }
        let int_start = end;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if end == int_start {
            self.pos = end;
            return Err(self.unexpected(OP));
        }
        if bytes.get(end) == Some(&b'.') {
            end += 1;
            let frac_start = end;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
            if end == frac_start {
                return Err(invalid_number(&bytes[start..end]));
            }
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            end += 1;
            if matches!(bytes.get(end), Some(b'+' | b'-')) {
                end += 1;
            }
            let exp_start = end;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
            if end == exp_start {
                return Err(invalid_number(&bytes[start..end]));
            }
        }

        self.pos = end;
        // Only ASCII digits, signs, dots and exponents were consumed.
        std::str::from_utf8(&bytes[start..end]).map_err(|_| invalid_number(&bytes[start..end]))
    }

    pub fn read_boolean(&mut self) -> Result<bool, JsonError> {
        const OP: &str = "read_boolean";
        match self.peek_byte(OP)? {
            b't' => self.expect_literal(OP, b"true").map(|_| true),
            b'f' => self.expect_literal(OP, b"false").map(|_| false),
            _ => Err(self.unexpected(OP)),
        }
    }

    pub fn read_null(&mut self) -> Result<(), JsonError> {
        self.expect_literal("read_null", b"null")
    }

    /// Invokes `f` once per array element with a reader scoped to the element.
    pub fn read_array<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        E: From<JsonError>,
        F: FnMut(usize, &mut JsonReader<'a>) -> Result<(), E>,
    {
        const OP: &str = "read_array";
        self.expect_byte(OP, b'[')?;
        self.enter(OP)?;
        if self.peek_byte(OP)? == b']' {
            self.pos += 1;
            self.leave();
            return Ok(());
        }
        let mut i = 0;
        loop {
            let raw = self.read_raw()?;
            f(i, &mut self.nested(raw))?;
            i += 1;
            match self.peek_byte(OP)? {
                b',' => self.pos += 1,
                b']' => {
                    self.pos += 1;
                    self.leave();
                    return Ok(());
                }
                _ => return Err(self.unexpected(OP).into()),
            }
        }
    }

    /// Invokes `f` once per key with a reader scoped to the key's value.
    pub fn read_object<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        E: From<JsonError>,
        F: FnMut(String, &mut JsonReader<'a>) -> Result<(), E>,
    {
        const OP: &str = "read_object";
        self.expect_byte(OP, b'{')?;
        self.enter(OP)?;
        if self.peek_byte(OP)? == b'}' {
            self.pos += 1;
            self.leave();
            return Ok(());
        }
        loop {
            if self.peek_byte(OP)? != b'"' {
                return Err(self.unexpected(OP).into());
            }
            let key = self.read_string()?;
            self.expect_byte(OP, b':')?;
            let raw = self.read_raw()?;
            f(key, &mut self.nested(raw))?;
            match self.peek_byte(OP)? {
                b',' => self.pos += 1,
                b'}' => {
                    self.pos += 1;
                    self.leave();
                    return Ok(());
                }
                _ => return Err(self.unexpected(OP).into()),
            }
        }
    }

    /// Walks nested objects and invokes `f` once per leaf with its dotted path.
    ///
    /// Arrays are leaves.
    pub fn read_flatten_object<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        E: From<JsonError>,
        F: FnMut(&str, &mut JsonReader<'a>) -> Result<(), E>,
    {
        self.flatten_into("", &mut f)
    }

    fn flatten_into<E, F>(&mut self, prefix: &str, f: &mut F) -> Result<(), E>
    where
        E: From<JsonError>,
        F: FnMut(&str, &mut JsonReader<'a>) -> Result<(), E>,
    {
        self.read_object(|key, sub: &mut JsonReader<'a>| {
            let path = if prefix.is_empty() {
                key
            } else {
                format!("{prefix}.{key}")
            };
            if sub.next_token()? == Token::BeginObject {
                sub.flatten_into(&path, f)
            } else {
                f(&path, sub)
            }
        })
    }

    /// Fails unless only whitespace remains.
    pub fn finish(&mut self) -> Result<(), JsonError> {
        self.skip_whitespace();
        if self.pos < self.buf.len() {
            return Err(self.unexpected("finish"));
        }
        Ok(())
    }
}

fn invalid_number(bytes: &[u8]) -> JsonError {
    JsonError::InvalidNumber {
        text: String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Removes insignificant whitespace in place. String contents are kept.
pub fn compact(buf: &mut Vec<u8>) {
    let mut in_string = false;
    let mut escaped = false;
    buf.retain(|&b| {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            return true;
        }
        match b {
            b'"' => {
                in_string = true;
                true
            }
            b' ' | b'\t' | b'\n' | b'\r' => false,
            _ => true,
        }
    });
}
