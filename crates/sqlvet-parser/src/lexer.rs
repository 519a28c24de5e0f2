//! SQL lexer
//!
//! Converts SQL text into a stream of tokens with source spans. Pure
//! function of (text, options): the same input always yields the same
//! token sequence. Line/column tracking is 1-based.

use sqlvet_core::{Diagnostic, LanguageOptions, Span};

use crate::token::{Token, TokenKind};

/// A failure to tokenize the input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexicalError {
    #[error("unterminated string literal starting at {line}:{column}")]
    UnterminatedString { offset: usize, line: u32, column: u32 },

    #[error("unterminated quoted identifier starting at {line}:{column}")]
    UnterminatedIdentifier { offset: usize, line: u32, column: u32 },

    #[error("unterminated block comment starting at {line}:{column}")]
    UnterminatedComment { offset: usize, line: u32, column: u32 },

    #[error("unexpected character {ch:?} at {line}:{column}")]
    InvalidCharacter { ch: char, offset: usize, line: u32, column: u32 },

    #[error("malformed numeric literal {text:?} at {line}:{column}")]
    InvalidNumber { text: String, offset: usize, line: u32, column: u32 },
}

impl LexicalError {
    /// Byte offset of the offending text
    pub fn offset(&self) -> usize {
        match self {
            Self::UnterminatedString { offset, .. }
            | Self::UnterminatedIdentifier { offset, .. }
            | Self::UnterminatedComment { offset, .. }
            | Self::InvalidCharacter { offset, .. }
            | Self::InvalidNumber { offset, .. } => *offset,
        }
    }

    /// Line of the offending text (1-indexed)
    pub fn line(&self) -> u32 {
        match self {
            Self::UnterminatedString { line, .. }
            | Self::UnterminatedIdentifier { line, .. }
            | Self::UnterminatedComment { line, .. }
            | Self::InvalidCharacter { line, .. }
            | Self::InvalidNumber { line, .. } => *line,
        }
    }

    /// Column of the offending text (1-indexed)
    pub fn column(&self) -> u32 {
        match self {
            Self::UnterminatedString { column, .. }
            | Self::UnterminatedIdentifier { column, .. }
            | Self::UnterminatedComment { column, .. }
            | Self::InvalidCharacter { column, .. }
            | Self::InvalidNumber { column, .. } => *column,
        }
    }

    /// Convert into the stable diagnostic shape
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::syntax(self.to_string(), self.line(), self.column())
    }
}

/// SQL lexer producing one token at a time
pub struct Lexer<'a> {
    /// The source bytes (UTF-8)
    src: &'a [u8],
    /// Dialect switches consulted while scanning
    options: &'a LanguageOptions,
    /// Current byte offset into src
    pos: usize,
    /// Current line number (1-based)
    line: u32,
    /// Current column number (1-based)
    col: u32,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over the given SQL source text
    pub fn new(source: &'a str, options: &'a LanguageOptions) -> Self {
        Self {
            src: source.as_bytes(),
            options,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire input, including the trailing Eof marker
    pub fn tokenize(source: &'a str, options: &'a LanguageOptions) -> Result<Vec<Token>, LexicalError> {
        let mut lexer = Self::new(source, options);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = tok.is_eof();
            tokens.push(tok);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    /// Current byte offset into the source
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Produce the next token
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_whitespace_and_comments()?;

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;

        if self.pos >= self.src.len() {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::new(start as u32, start as u32, start_line, start_col),
            ));
        }

        let ch = self.src[self.pos];
        let kind = match ch {
            b'\'' => self.lex_string(start, start_line, start_col)?,
            b'`' => self.lex_backtick_id(start, start_line, start_col)?,
            b'0'..=b'9' => self.lex_number(start, start_line, start_col)?,
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(start, start_line, start_col)?
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_word(),
            b',' => self.single(TokenKind::Comma),
            b'.' => self.single(TokenKind::Dot),
            b';' => self.single(TokenKind::Semicolon),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b'*' => self.single(TokenKind::Star),
            b'+' => self.single(TokenKind::Plus),
            b'-' => self.single(TokenKind::Minus),
            b'/' => self.single(TokenKind::Slash),
            b'%' => self.single(TokenKind::Percent),
            b'=' => self.single(TokenKind::Eq),
            b'<' => {
                self.advance();
                match self.peek() {
                    Some(b'=') => {
                        self.advance();
                        TokenKind::Le
                    }
                    Some(b'>') => {
                        self.advance();
                        TokenKind::Ne
                    }
                    _ => TokenKind::Lt,
                }
            }
            b'>' => {
                self.advance();
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            b'!' => {
                self.advance();
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Ne
                } else {
                    return Err(LexicalError::InvalidCharacter {
                        ch: '!',
                        offset: start,
                        line: start_line,
                        column: start_col,
                    });
                }
            }
            b'|' => {
                self.advance();
                if self.peek() == Some(b'|') {
                    self.advance();
                    TokenKind::Concat
                } else {
                    return Err(LexicalError::InvalidCharacter {
                        ch: '|',
                        offset: start,
                        line: start_line,
                        column: start_col,
                    });
                }
            }
            _ => {
                // Decode the full UTF-8 scalar for the error message
                let tail = String::from_utf8_lossy(&self.src[self.pos..]);
                let ch = tail.chars().next().unwrap_or('\u{fffd}');
                return Err(LexicalError::InvalidCharacter {
                    ch,
                    offset: start,
                    line: start_line,
                    column: start_col,
                });
            }
        };

        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        Ok(Token::new(
            kind,
            text,
            Span::new(start as u32, self.pos as u32, start_line, start_col),
        ))
    }

    fn advance(&mut self) -> u8 {
        let ch = self.src[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Skip whitespace and whichever comment styles the options enable
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexicalError> {
        loop {
            while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
                self.advance();
            }

            if self.pos >= self.src.len() {
                return Ok(());
            }

            // Line comment: `-- ...`
            if self.options.comments.dash_line
                && self.src[self.pos] == b'-'
                && self.peek_at(1) == Some(b'-')
            {
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.advance();
                }
                continue;
            }

            // Line comment: `# ...`
            if self.options.comments.hash_line && self.src[self.pos] == b'#' {
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.advance();
                }
                continue;
            }

            // Block comment: `/* ... */`
            if self.options.comments.block
                && self.src[self.pos] == b'/'
                && self.peek_at(1) == Some(b'*')
            {
                let start = self.pos;
                let start_line = self.line;
                let start_col = self.col;
                self.advance();
                self.advance();
                loop {
                    if self.pos >= self.src.len() {
                        return Err(LexicalError::UnterminatedComment {
                            offset: start,
                            line: start_line,
                            column: start_col,
                        });
                    }
                    if self.src[self.pos] == b'*' && self.peek_at(1) == Some(b'/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
                continue;
            }

            return Ok(());
        }
    }

    /// Lex a single-quoted string literal. `''` escapes a quote.
    fn lex_string(&mut self, start: usize, line: u32, col: u32) -> Result<TokenKind, LexicalError> {
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(LexicalError::UnterminatedString {
                        offset: start,
                        line,
                        column: col,
                    });
                }
                Some(b'\'') => {
                    self.advance();
                    if self.peek() == Some(b'\'') {
                        value.push('\'');
                        self.advance();
                    } else {
                        return Ok(TokenKind::String(value));
                    }
                }
                Some(_) => {
                    let ch_start = self.pos;
                    self.advance();
                    // Keep multi-byte sequences intact
                    while self.pos < self.src.len() && (self.src[self.pos] & 0xC0) == 0x80 {
                        self.advance();
                    }
                    value.push_str(&String::from_utf8_lossy(&self.src[ch_start..self.pos]));
                }
            }
        }
    }

    /// Lex a backtick-quoted identifier, which may contain dots
    fn lex_backtick_id(&mut self, start: usize, line: u32, col: u32) -> Result<TokenKind, LexicalError> {
        self.advance(); // opening backtick

        let name_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(LexicalError::UnterminatedIdentifier {
                        offset: start,
                        line,
                        column: col,
                    });
                }
                Some(b'`') => {
                    let name =
                        String::from_utf8_lossy(&self.src[name_start..self.pos]).into_owned();
                    self.advance();
                    return Ok(TokenKind::QuotedId(name));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Lex an integer or float, honoring the configured literal forms
    fn lex_number(&mut self, start: usize, line: u32, col: u32) -> Result<TokenKind, LexicalError> {
        // Hex integer: 0xFF
        if self.options.literals.hex_integers
            && self.src[self.pos] == b'0'
            && self.peek_at(1).is_some_and(|c| c == b'x' || c == b'X')
        {
            self.advance();
            self.advance();
            let digits_start = self.pos;
            while self.pos < self.src.len() && self.src[self.pos].is_ascii_hexdigit() {
                self.advance();
            }
            let digits = &self.src[digits_start..self.pos];
            if digits.is_empty() {
                return Err(self.number_error(start, line, col));
            }
            let text = String::from_utf8_lossy(digits);
            return i64::from_str_radix(&text, 16)
                .map(TokenKind::Integer)
                .map_err(|_| self.number_error(start, line, col));
        }

        let mut is_float = false;

        while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
            self.advance();
        }

        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
                self.advance();
            }
        }

        if self.options.literals.float_exponents
            && self.peek().is_some_and(|c| c == b'e' || c == b'E')
            && self
                .peek_at(1)
                .is_some_and(|c| c.is_ascii_digit() || c == b'+' || c == b'-')
        {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == b'+' || c == b'-') {
                self.advance();
            }
            let exp_start = self.pos;
            while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
                self.advance();
            }
            if self.pos == exp_start {
                return Err(self.number_error(start, line, col));
            }
        }

        // A trailing identifier character makes the literal malformed (`1abc`)
        if self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
            {
                self.advance();
            }
            return Err(self.number_error(start, line, col));
        }

        let text = String::from_utf8_lossy(&self.src[start..self.pos]);
        if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| self.number_error(start, line, col))
        } else {
            text.parse::<i64>()
                .map(TokenKind::Integer)
                .map_err(|_| self.number_error(start, line, col))
        }
    }

    fn number_error(&self, start: usize, line: u32, col: u32) -> LexicalError {
        LexicalError::InvalidNumber {
            text: String::from_utf8_lossy(&self.src[start..self.pos]).into_owned(),
            offset: start,
            line,
            column: col,
        }
    }

    /// Lex an identifier or keyword
    fn lex_word(&mut self) -> TokenKind {
        let start = self.pos;
        self.advance();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }

        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        TokenKind::lookup_keyword(&text).unwrap_or(TokenKind::Id(text))
    }
}
