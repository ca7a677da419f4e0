//! Field annotation options.
//!
//! Tags use the grammar `name,opt,opt=value,...`. The first segment is the
//! column name (empty keeps the field name, `-` hides the field). Options are
//! parsed once when the schema is built. Values are kept as written and only
//! interpreted by the accessors, so a malformed value surfaces as an error
//! when a codec or the DDL compiler needs it.

use crate::error::InvalidOption;

/// Parsed annotation options of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Column name declared by the tag
    pub name: Option<String>,
    /// Field is excluded from mapping
    pub hidden: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique_index: bool,
    pub generated_column: bool,
    pub unsigned: bool,
    pub longtext: bool,
    /// Raw `enum=` value
    pub enum_values: Option<String>,
    /// Raw `set=` value
    pub set_values: Option<String>,
    /// Raw `size=` value
    pub size: Option<String>,
    /// Raw `char=` value
    pub char_size: Option<String>,
    pub charset: Option<String>,
    pub collate: Option<String>,
    pub comment: Option<String>,
    pub default: Option<String>,
    /// `virtual_column[=alias]`, empty when no alias is given
    pub virtual_column: Option<String>,
    /// `stored_column[=alias]`, empty when no alias is given
    pub stored_column: Option<String>,
    /// Raw `foreign_key=` value
    pub foreign_key: Option<String>,
    /// Raw `srid=` value
    pub srid: Option<String>,
    /// Unrecognized options, kept verbatim
    pub extra: Vec<(String, Option<String>)>,
}

/// Options of untagged values such as query literals.
pub static EMPTY_OPTIONS: FieldOptions = FieldOptions {
    name: None,
    hidden: false,
    primary_key: false,
    auto_increment: false,
    unique_index: false,
    generated_column: false,
    unsigned: false,
    longtext: false,
    enum_values: None,
    set_values: None,
    size: None,
    char_size: None,
    charset: None,
    collate: None,
    comment: None,
    default: None,
    virtual_column: None,
    stored_column: None,
    foreign_key: None,
    srid: None,
    extra: Vec::new(),
};

/// Which kind of generated column a field declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generated {
    Virtual,
    Stored,
}

impl Generated {
    pub fn keyword(self) -> &'static str {
        match self {
            Generated::Virtual => "VIRTUAL",
            Generated::Stored => "STORED",
        }
    }
}

impl FieldOptions {
    /// Parses an annotation tag.
    pub fn parse(tag: &str) -> Self {
        let mut options = FieldOptions::default();
        let mut segments = split_segments(tag).into_iter();

        match segments.next().map(str::trim) {
            Some("-") => {
                options.hidden = true;
                return options;
            }
            Some(name) if !name.is_empty() => options.name = Some(name.to_string()),
            _ => {}
        }

        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = match segment.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim().to_string())),
                None => (segment, None),
            };
            match key {
                "primary_key" => options.primary_key = true,
                "auto_increment" => options.auto_increment = true,
                "unique_index" => options.unique_index = true,
                "generated_column" => options.generated_column = true,
                "unsigned" => options.unsigned = true,
                "longtext" => options.longtext = true,
                "enum" => options.enum_values = Some(value.unwrap_or_default()),
                "set" => options.set_values = Some(value.unwrap_or_default()),
                "size" => options.size = Some(value.unwrap_or_default()),
                "char" => options.char_size = Some(value.unwrap_or_default()),
                "charset" => options.charset = value,
                "collate" => options.collate = value,
                "comment" => options.comment = value,
                "default" => options.default = Some(value.unwrap_or_default()),
                "virtual_column" => options.virtual_column = Some(value.unwrap_or_default()),
                "stored_column" => options.stored_column = Some(value.unwrap_or_default()),
                "foreign_key" => options.foreign_key = Some(value.unwrap_or_default()),
                "srid" => options.srid = Some(value.unwrap_or_default()),
                _ => options.extra.push((key.to_string(), value)),
            }
        }
        options
    }

    /// Members of the `enum=` option, if declared.
    pub fn enum_members(&self) -> Result<Option<Vec<&str>>, InvalidOption> {
        members("enum", self.enum_values.as_deref())
    }

    /// Members of the `set=` option, if declared.
    pub fn set_members(&self) -> Result<Option<Vec<&str>>, InvalidOption> {
        members("set", self.set_values.as_deref())
    }

    /// Parsed `size=` value.
    pub fn size(&self) -> Result<Option<u32>, InvalidOption> {
        positive("size", self.size.as_deref())
    }

    /// Parsed `char=` value.
    pub fn char_size(&self) -> Result<Option<u32>, InvalidOption> {
        positive("char", self.char_size.as_deref())
    }

    /// Parsed `srid=` value.
    pub fn srid(&self) -> Result<Option<u32>, InvalidOption> {
        match self.srid.as_deref() {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| InvalidOption {
                option: "srid",
                value: raw.to_string(),
            }),
        }
    }

    /// Parsed `foreign_key=<table>:<column>` value.
    pub fn foreign_key(&self) -> Result<Option<(&str, &str)>, InvalidOption> {
        match self.foreign_key.as_deref() {
            None => Ok(None),
            Some(raw) => match raw.split_once(':') {
                Some((table, column)) if !table.is_empty() && !column.is_empty() => {
                    Ok(Some((table, column)))
                }
                _ => Err(InvalidOption {
                    option: "foreign_key",
                    value: raw.to_string(),
                }),
            },
        }
    }

    /// Generated column declaration with its alias (empty when none).
    pub fn generated(&self) -> Option<(Generated, &str)> {
        if let Some(alias) = self.virtual_column.as_deref() {
            return Some((Generated::Virtual, alias));
        }
        self.stored_column
            .as_deref()
            .map(|alias| (Generated::Stored, alias))
    }

    /// Looks up an unrecognized option.
    pub fn extra(&self, key: &str) -> Option<Option<&str>> {
        self.extra
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }
}

fn members<'a>(
    option: &'static str,
    raw: Option<&'a str>,
) -> Result<Option<Vec<&'a str>>, InvalidOption> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let list: Vec<&str> = raw
        .split('|')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .collect();
    if list.is_empty() {
        return Err(InvalidOption {
            option,
            value: raw.to_string(),
        });
    }
    Ok(Some(list))
}

/// Splits a tag on commas outside brackets and quotes, so a JSON `default=`
/// value can contain commas.
fn split_segments(tag: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, b) in tag.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                segments.push(&tag[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&tag[start..]);
    segments
}

fn positive(option: &'static str, raw: Option<&str>) -> Result<Option<u32>, InvalidOption> {
    match raw {
        None => Ok(None),
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(InvalidOption {
                option,
                value: raw.to_string(),
            }),
        },
    }
}
