//! GVariant text format
//!
//! Covers the subset of the GVariant text syntax that `gsettings get`
//! prints and `gsettings set` accepts for the supported value types:
//! - strings in single or double quotes with backslash escapes
//! - `true` / `false`
//! - integers, optionally prefixed by a width annotation (`uint32 5`)
//! - doubles
//! - string arrays, with `@as []` for the empty array

use crate::error::VariantError;
use crate::value::{Value, ValueType};

/// Integer width annotations `gsettings get` may print before a number.
const INT_ANNOTATIONS: &[&str] = &[
    "byte", "int16", "uint16", "int32", "uint32", "int64", "uint64", "handle",
];

/// Render a value in GVariant text format.
pub fn format(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::StringList(items) if items.is_empty() => "@as []".to_string(),
        Value::StringList(items) => {
            let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
            format!("[{}]", quoted.join(", "))
        }
    }
}

/// Parse GVariant text as the given type.
pub fn parse(text: &str, value_type: ValueType) -> Result<Value, VariantError> {
    let mut reader = Reader::new(text);
    reader.skip_ws();

    let value = match value_type {
        ValueType::String => Value::String(reader.quoted()?),
        ValueType::Bool => Value::Bool(reader.boolean()?),
        ValueType::Int => {
            reader.annotation(INT_ANNOTATIONS);
            Value::Int(reader.integer()?)
        }
        ValueType::Float => {
            reader.annotation(&["double"]);
            Value::Float(reader.float()?)
        }
        ValueType::StringList => {
            reader.annotation(&["@as"]);
            Value::StringList(reader.string_array()?)
        }
    };

    reader.skip_ws();
    reader.finish()?;
    Ok(value)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if f.fract() == 0.0 {
        // A bare integer would be read back as an int, not a double
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

struct Reader<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), VariantError> {
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            Some(found) => Err(VariantError::Unexpected {
                expected,
                found,
                offset: self.pos - found.len_utf8(),
            }),
            None => Err(VariantError::UnexpectedEnd { expected }),
        }
    }

    /// Skip a leading type annotation keyword followed by whitespace.
    fn annotation(&mut self, keywords: &[&str]) {
        for keyword in keywords {
            if let Some(after) = self.rest().strip_prefix(keyword) {
                if after.starts_with(char::is_whitespace) {
                    self.pos += keyword.len();
                    self.skip_ws();
                    return;
                }
            }
        }
    }

    /// Consume a run of characters that can form a bare token.
    fn token(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.' | '_')) {
            self.bump();
        }
        &self.text[start..self.pos]
    }

    fn boolean(&mut self) -> Result<bool, VariantError> {
        match self.token() {
            "true" => Ok(true),
            "false" => Ok(false),
            "" => match self.peek() {
                Some(found) => Err(VariantError::Unexpected {
                    expected: "boolean",
                    found,
                    offset: self.pos,
                }),
                None => Err(VariantError::UnexpectedEnd { expected: "boolean" }),
            },
            other => Err(VariantError::InvalidBoolean(other.to_string())),
        }
    }

    fn integer(&mut self) -> Result<i64, VariantError> {
        let token = self.token();
        let parsed = match token.strip_prefix("0x") {
            Some(hex) => i64::from_str_radix(hex, 16),
            None => token.parse::<i64>(),
        };
        parsed.map_err(|_| VariantError::InvalidNumber(token.to_string()))
    }

    fn float(&mut self) -> Result<f64, VariantError> {
        let token = self.token();
        token
            .parse::<f64>()
            .map_err(|_| VariantError::InvalidNumber(token.to_string()))
    }

    fn quoted(&mut self) -> Result<String, VariantError> {
        let delim = match self.bump() {
            Some(c @ ('\'' | '"')) => c,
            Some(found) => {
                return Err(VariantError::Unexpected {
                    expected: "quoted string",
                    found,
                    offset: self.pos - found.len_utf8(),
                })
            }
            None => {
                return Err(VariantError::UnexpectedEnd {
                    expected: "quoted string",
                })
            }
        };

        let mut out = String::new();
        loop {
            let c = self.bump().ok_or(VariantError::UnexpectedEnd {
                expected: "closing quote",
            })?;
            if c == delim {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let escape_at = self.pos - 1;
            let escaped = self.bump().ok_or(VariantError::InvalidEscape(escape_at))?;
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'v' => out.push('\u{b}'),
                'u' => out.push(self.unicode_escape(4, escape_at)?),
                'U' => out.push(self.unicode_escape(8, escape_at)?),
                other => out.push(other),
            }
        }
    }

    fn unicode_escape(&mut self, digits: usize, escape_at: usize) -> Result<char, VariantError> {
        let hex = self
            .rest()
            .get(..digits)
            .ok_or(VariantError::InvalidEscape(escape_at))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| VariantError::InvalidEscape(escape_at))?;
        self.pos += digits;
        char::from_u32(code).ok_or(VariantError::InvalidEscape(escape_at))
    }

    fn string_array(&mut self) -> Result<Vec<String>, VariantError> {
        self.expect('[', "'['")?;
        let mut items = Vec::new();

        self.skip_ws();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(items);
        }

        loop {
            self.skip_ws();
            items.push(self.quoted()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(items),
                Some(found) => {
                    return Err(VariantError::Unexpected {
                        expected: "',' or ']'",
                        found,
                        offset: self.pos - found.len_utf8(),
                    })
                }
                None => return Err(VariantError::UnexpectedEnd { expected: "']'" }),
            }
        }
    }

    fn finish(&self) -> Result<(), VariantError> {
        if self.pos == self.text.len() {
            Ok(())
        } else {
            Err(VariantError::TrailingInput(self.pos))
        }
    }
}
