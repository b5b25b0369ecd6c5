//! SQL lexer for tokenizing catalog statement text.
//!
//! The lexer is lenient: the input is assumed to have been accepted by
//! SQLite already, so it never fails. Unterminated quoted tokens run to the
//! end of the input and unknown characters become single-character
//! punctuation tokens.

use alloc::string::String;
use alloc::vec::Vec;

/// Bare words reclassified as [`TokenKind::Operator`].
const OPERATOR_KEYWORDS: &[&str] = &[
    "AND", "AS", "BETWEEN", "CASE", "CAST", "COLLATE", "DISTINCT", "ELSE", "ESCAPE", "EXISTS",
    "GLOB", "IN", "IS", "LIKE", "MATCH", "NOT", "OR", "REGEXP",
];

/// Bare words reclassified as [`TokenKind::PostfixKeyword`].
const POSTFIX_KEYWORDS: &[&str] = &["ASC", "DESC", "END", "ISNULL", "NOTNULL"];

/// Two-character operators, matched greedily before single characters.
const DOUBLE_CHAR_OPERATORS: &[&[u8; 2]] = &[
    b"||", b"<<", b"<>", b"<=", b">>", b">=", b"==", b"!=",
];

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// The decoded token text.
    ///
    /// Quotes are stripped and escapes undone for quoted identifiers and
    /// string literals; blob literals keep only their hex digits.
    pub text: String,
    /// The kind of token.
    pub kind: TokenKind,
}

/// The different kinds of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// Bare identifier, including keywords that are not operators.
    Identifier,
    /// `"identifier"`
    QuotedIdentifier,
    /// `[identifier]`
    BracketedIdentifier,
    /// `` `identifier` ``
    BackquotedIdentifier,
    /// `'string'`
    StringLiteral,
    /// `X'hex'`
    BlobLiteral,
    /// Integer, real or hexadecimal number.
    Numeric,
    /// Symbolic or keyword operator.
    Operator,
    /// Keyword applied after its operand (`ASC`, `ISNULL`, ...).
    PostfixKeyword,
    /// Any other single character (`(`, `)`, `,`, `;`, ...).
    Punctuation,
}

impl TokenKind {
    /// Returns `true` for the four identifier forms.
    #[must_use]
    pub fn is_identifier(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::QuotedIdentifier
                | TokenKind::BracketedIdentifier
                | TokenKind::BackquotedIdentifier
        )
    }

    /// Returns `true` for the three quoted identifier forms.
    #[must_use]
    pub fn is_quoted_identifier(self) -> bool {
        self.is_identifier() && self != TokenKind::Identifier
    }

    /// Returns `true` for tokens that can only start an operand.
    #[must_use]
    pub fn is_operand(self) -> bool {
        self.is_identifier()
            || matches!(
                self,
                TokenKind::StringLiteral | TokenKind::BlobLiteral | TokenKind::Numeric
            )
    }
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Whether this is the given keyword, compared case-insensitively.
    ///
    /// Only bare words can be keywords: quoted identifiers never match.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::Operator | TokenKind::PostfixKeyword
        ) && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Whether this is the given single punctuation character.
    #[must_use]
    pub fn is_punct(&self, symbol: char) -> bool {
        self.kind == TokenKind::Punctuation && self.text.len() == 1 && self.text.starts_with(symbol)
    }

    /// Whether this is the given symbolic operator.
    #[must_use]
    pub fn is_operator(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == symbol
    }

    /// Whether this token can name a table, index or column.
    ///
    /// SQLite accepts string literals in name position for compatibility.
    #[must_use]
    pub fn is_name(&self) -> bool {
        self.kind.is_identifier() || self.kind == TokenKind::StringLiteral
    }
}

/// SQL lexer that produces tokens from input.
pub struct Lexer<'input> {
    input: &'input str,
    pos: usize,
}

impl<'input> Lexer<'input> {
    /// Create a new lexer for the given input.
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    /// Skip whitespace and comments.
    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'-' && self.peek_byte(1) == Some(b'-') {
                // Line comment
                self.pos += 2;
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if b == b'/' && self.peek_byte(1) == Some(b'*') {
                // Block comment
                self.pos += 2;
                while self.pos + 1 < bytes.len()
                    && !(bytes[self.pos] == b'*' && bytes[self.pos + 1] == b'/')
                {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(bytes.len());
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();

        let b = self.peek_byte(0)?;
        let token = match b {
            b'\'' => self.read_quoted(b'\'', TokenKind::StringLiteral),
            b'"' => self.read_quoted(b'"', TokenKind::QuotedIdentifier),
            b'`' => self.read_quoted(b'`', TokenKind::BackquotedIdentifier),
            b'[' => self.read_bracketed(),
            b'X' | b'x' if self.peek_byte(1) == Some(b'\'') => self.read_blob(),
            b'0'..=b'9' => self.read_number(),
            b'.' if self.peek_byte(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            _ if is_ident_start(b) => self.read_identifier(),
            _ => self.read_symbol(),
        };
        Some(token)
    }

    /// Read a token delimited by `quote`, where a doubled quote is an escape.
    fn read_quoted(&mut self, quote: u8, kind: TokenKind) -> Token {
        let bytes = self.input.as_bytes();
        self.pos += 1;

        let mut value = String::new();
        let mut chunk_start = self.pos;
        while self.pos < bytes.len() {
            if bytes[self.pos] == quote {
                value.push_str(&self.input[chunk_start..self.pos]);
                if self.peek_byte(1) == Some(quote) {
                    value.push(quote as char);
                    self.pos += 2;
                    chunk_start = self.pos;
                } else {
                    self.pos += 1;
                    return Token::new(value, kind);
                }
            } else {
                self.pos += 1;
            }
        }

        value.push_str(&self.input[chunk_start..]);
        Token::new(value, kind)
    }

    fn read_bracketed(&mut self) -> Token {
        let start = self.pos + 1;
        let end = self.input[start..]
            .find(']')
            .map_or(self.input.len(), |offset| start + offset);
        self.pos = (end + 1).min(self.input.len());
        Token::new(&self.input[start..end], TokenKind::BracketedIdentifier)
    }

    fn read_blob(&mut self) -> Token {
        let start = self.pos + 2; // Skip X'
        let end = self.input[start..]
            .find('\'')
            .map_or(self.input.len(), |offset| start + offset);
        self.pos = (end + 1).min(self.input.len());
        Token::new(&self.input[start..end], TokenKind::BlobLiteral)
    }

    fn read_number(&mut self) -> Token {
        let bytes = self.input.as_bytes();
        let start = self.pos;

        if bytes[self.pos] == b'0'
            && matches!(self.peek_byte(1), Some(b'x' | b'X'))
            && self.peek_byte(2).is_some_and(|c| c.is_ascii_hexdigit())
        {
            self.pos += 2;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_hexdigit() {
                self.pos += 1;
            }
            return Token::new(&self.input[start..self.pos], TokenKind::Numeric);
        }

        // Read integer part
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }

        // Check for decimal point
        if self.peek_byte(0) == Some(b'.') {
            self.pos += 1;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }

        // Check for exponent, only when digits actually follow
        if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
            let digits_at = if matches!(self.peek_byte(1), Some(b'+' | b'-')) {
                2
            } else {
                1
            };
            if self.peek_byte(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += digits_at;
                while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }

        Token::new(&self.input[start..self.pos], TokenKind::Numeric)
    }

    fn read_identifier(&mut self) -> Token {
        let bytes = self.input.as_bytes();
        let start = self.pos;

        while self.pos < bytes.len() && is_ident_cont(bytes[self.pos]) {
            self.pos += 1;
        }

        let ident = &self.input[start..self.pos];
        let kind = if OPERATOR_KEYWORDS
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(ident))
        {
            TokenKind::Operator
        } else if POSTFIX_KEYWORDS
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(ident))
        {
            TokenKind::PostfixKeyword
        } else {
            TokenKind::Identifier
        };

        Token::new(ident, kind)
    }

    fn read_symbol(&mut self) -> Token {
        let bytes = self.input.as_bytes();
        let start = self.pos;

        let is_double = bytes
            .get(self.pos..self.pos + 2)
            .is_some_and(|pair| DOUBLE_CHAR_OPERATORS.iter().any(|op| op.as_slice() == pair));
        if is_double {
            self.pos += 2;
            return Token::new(&self.input[start..self.pos], TokenKind::Operator);
        }

        let kind = match bytes[self.pos] {
            b'(' | b')' | b',' | b';' => TokenKind::Punctuation,
            b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'~' | b'<' | b'>' | b'=' | b'.'
            | b'!' => TokenKind::Operator,
            _ => TokenKind::Punctuation,
        };
        // Unknown input may be any character, not only ASCII.
        let width = self.input[start..].chars().next().map_or(1, char::len_utf8);
        self.pos += width;
        Token::new(&self.input[start..self.pos], kind)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Tokenize the entire input.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

/// Check if a byte can start an identifier.
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Check if a byte can continue an identifier.
fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}
