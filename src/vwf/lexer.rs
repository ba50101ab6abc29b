//! Lexer (tokenizer) for VWF files.

use crate::error::{Result, VwfError};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text (string contents without quotes)
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in a VWF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A keyword or bare identifier (HEADER, ns, COLLAPSED, ...)
    Identifier,
    /// An integer or decimal number, possibly negative
    Number,
    /// A double-quoted string
    String,
    /// Open brace '{'
    OpenBrace,
    /// Close brace '}'
    CloseBrace,
    /// Open parenthesis '('
    OpenParen,
    /// Close parenthesis ')'
    CloseParen,
    /// Equals sign '='
    Equals,
    /// Semicolon ';'
    Semicolon,
    /// Comma ','
    Comma,
    /// End of file
    Eof,
}

/// Lexer for tokenizing VWF input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;

        let start_line = self.line;
        let start_column = self.column;
        let make = |kind: TokenKind, text: String| Token {
            kind,
            text,
            line: start_line,
            column: start_column,
        };

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(make(TokenKind::Eof, String::new())),
        };

        if !ch.is_ascii() {
            return Err(VwfError::lexer(
                start_line,
                start_column,
                format!("non-ASCII character '{}'", ch),
            ));
        }

        let punct = match ch {
            '{' => Some(TokenKind::OpenBrace),
            '}' => Some(TokenKind::CloseBrace),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '=' => Some(TokenKind::Equals),
            ';' => Some(TokenKind::Semicolon),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = punct {
            self.advance();
            return Ok(make(kind, ch.to_string()));
        }

        match ch {
            '"' => {
                let text = self.read_string(start_line, start_column)?;
                Ok(make(TokenKind::String, text))
            }
            '-' | '0'..='9' => {
                let text = self.read_number(start_line, start_column)?;
                Ok(make(TokenKind::Number, text))
            }
            _ if ch.is_ascii_alphabetic() || ch == '_' => {
                let text = self.read_identifier();
                Ok(make(TokenKind::Identifier, text))
            }
            _ => Err(VwfError::lexer(
                start_line,
                start_column,
                format!("unexpected character '{}'", ch),
            )),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match self.chars.peek().copied() {
                Some(ch) if ch.is_ascii_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    let (line, column) = (self.line, self.column);
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.next() {
                        Some('/') => {
                            while let Some(&c) = self.chars.peek() {
                                if c == '\n' {
                                    break;
                                }
                                self.advance();
                            }
                        }
                        Some('*') => {
                            self.advance();
                            self.advance();
                            let mut closed = false;
                            while let Some(c) = self.advance() {
                                if c == '*' && self.chars.peek() == Some(&'/') {
                                    self.advance();
                                    closed = true;
                                    break;
                                }
                            }
                            if !closed {
                                return Err(VwfError::lexer(line, column, "unterminated comment"));
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_string(&mut self, line: usize, column: usize) -> Result<String> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(text),
                Some(ch) if !ch.is_ascii() => {
                    return Err(VwfError::lexer(
                        self.line,
                        self.column,
                        format!("non-ASCII character '{}' in string", ch),
                    ));
                }
                Some(ch) => text.push(ch),
                None => return Err(VwfError::lexer(line, column, "unterminated string")),
            }
        }
    }

    fn read_number(&mut self, line: usize, column: usize) -> Result<String> {
        let mut text = String::new();

        if self.chars.peek() == Some(&'-') {
            text.push('-');
            self.advance();
        }

        let digits_start = text.len();
        self.read_digits(&mut text);
        if text.len() == digits_start {
            return Err(VwfError::lexer(line, column, "expected digits after '-'"));
        }

        if self.chars.peek() == Some(&'.') {
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        Ok(text)
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            out.push(tok.kind);
            if tok.kind == TokenKind::Eof {
                return out;
            }
        }
    }

    #[test]
    fn test_lexer_assignment() {
        let input = "DATA_DURATION = 1000.0;";
        let mut lexer = Lexer::new(input);

        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Identifier);
        assert_eq!(tok.text, "DATA_DURATION");

        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Equals);

        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.text, "1000.0");
        assert_eq!(tok.column, 17);
    }

    #[test]
    fn test_lexer_section_header() {
        assert_eq!(
            kinds("SIGNAL(\"clk\")\n{\n}"),
            vec![
                TokenKind::Identifier,
                TokenKind::OpenParen,
                TokenKind::String,
                TokenKind::CloseParen,
                TokenKind::OpenBrace,
                TokenKind::CloseBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_skips_comments() {
        let input = "/* Copyright\n * notice */\n// line comment\nLSB_INDEX = -1;";
        let mut lexer = Lexer::new(input);
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.text, "LSB_INDEX");
        assert_eq!(tok.line, 4);
        lexer.next_token().unwrap();
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.text, "-1");
    }

    #[test]
    fn test_lexer_rejects_unterminated_comment() {
        let mut lexer = Lexer::new("/* never closed");
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err, VwfError::LexerError { line: 1, column: 1, .. }));
    }

    #[test]
    fn test_lexer_rejects_non_ascii() {
        let mut lexer = Lexer::new("RADIX = Bin\u{e4}r;");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_lexer_list() {
        assert_eq!(
            kinds("CHILDREN = 2, 3;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }
}
