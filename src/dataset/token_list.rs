//! Stored token lists.
//!
//! The `Message` cell of a preprocessed table holds the tokens as a list
//! literal, e.g. `['ዋጋ', '300', "ብር's"]`. Quotes may be single or double,
//! backslash escapes follow the usual literal rules and a trailing comma is
//! allowed.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::DatasetError;

/// Parse a list literal of strings into tokens.
pub fn parse_token_list(input: &str) -> Result<Vec<String>, DatasetError> {
    let mut cursor = Cursor::new(input);
    cursor.skip_ws();
    cursor.expect('[')?;

    let mut tokens = Vec::new();
    loop {
        cursor.skip_ws();
        match cursor.peek() {
            Some(']') => {
                cursor.bump();
                break;
            }
            Some('\'') | Some('"') => tokens.push(cursor.string()?),
            Some(c) => return Err(cursor.error(format!("expected string, found '{c}'"))),
            None => return Err(cursor.error("unterminated list")),
        }

        cursor.skip_ws();
        match cursor.bump() {
            Some(',') => continue,
            Some(']') => break,
            Some(c) => return Err(cursor.error(format!("expected ',' or ']', found '{c}'"))),
            None => return Err(cursor.error("unterminated list")),
        }
    }

    cursor.skip_ws();
    if let Some(c) = cursor.peek() {
        return Err(cursor.error(format!("trailing input starting at '{c}'")));
    }
    Ok(tokens)
}

/// Render tokens as a list literal that `parse_token_list` reads back.
pub fn format_token_list<S: AsRef<str>>(tokens: &[S]) -> String {
    let items: Vec<String> = tokens.iter().map(|t| quote(t.as_ref())).collect();
    format!("[{}]", items.join(", "))
}

/// Single quotes unless the token contains one and no double quote.
fn quote(token: &str) -> String {
    let delim = if token.contains('\'') && !token.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(token.len() + 2);
    out.push(delim);
    for ch in token.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

struct Cursor<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.input.len())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<(), DatasetError> {
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{want}', found '{c}'"))),
            None => Err(self.error(format!("expected '{want}', found end of input"))),
        }
    }

    fn error(&mut self, reason: impl Into<String>) -> DatasetError {
        DatasetError::Literal {
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    /// Read one quoted string; the cursor sits on the opening quote.
    fn string(&mut self) -> Result<String, DatasetError> {
        let Some(delim) = self.bump() else {
            return Err(self.error("expected string"));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == delim => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), DatasetError> {
        match self.bump() {
            None => Err(self.error("unterminated escape")),
            Some('n') => {
                out.push('\n');
                Ok(())
            }
            Some('t') => {
                out.push('\t');
                Ok(())
            }
            Some('r') => {
                out.push('\r');
                Ok(())
            }
            Some('0') => {
                out.push('\0');
                Ok(())
            }
            Some(c @ ('\\' | '\'' | '"')) => {
                out.push(c);
                Ok(())
            }
            Some('x') => self.hex_escape(2, out),
            Some('u') => self.hex_escape(4, out),
            Some('U') => self.hex_escape(8, out),
            // Unknown escapes keep the backslash.
            Some(c) => {
                out.push('\\');
                out.push(c);
                Ok(())
            }
        }
    }

    fn hex_escape(&mut self, digits: usize, out: &mut String) -> Result<(), DatasetError> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid hex escape"))?;
            value = value * 16 + digit;
        }
        let ch = char::from_u32(value).ok_or_else(|| self.error("escape is not a valid char"))?;
        out.push(ch);
        Ok(())
    }
}
