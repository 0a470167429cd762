// ABOUTME: Single forward-pass lexer: source text to a token stream with locations

use crate::error::{catalog, UmbraError};
use crate::location::Location;
use crate::token::{lookup_keyword, Token, TokenKind};

pub struct Lexer {
    source: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, UmbraError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                let loc = Location::new(self.line, self.column, self.column);
                tokens.push(Token::new(TokenKind::Eof, "", loc));
                break;
            }
            let start_line = self.line;
            let start_col = self.column;
            self.start = self.current;
            let c = self.advance();
            tokens.push(self.scan_token(c, start_line, start_col)?);
        }
        Ok(tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn make(&self, kind: TokenKind, start_line: usize, start_col: usize) -> Token {
        let end_col = if self.column > 1 { self.column - 1 } else { 1 };
        Token::new(kind, self.lexeme(), Location::new(start_line, start_col, end_col))
    }

    fn scan_token(&mut self, c: char, start_line: usize, start_col: usize) -> Result<Token, UmbraError> {
        use TokenKind::*;
        let tok = match c {
            '(' => self.make(LeftParen, start_line, start_col),
            ')' => self.make(RightParen, start_line, start_col),
            '{' => self.make(LeftBrace, start_line, start_col),
            '}' => self.make(RightBrace, start_line, start_col),
            '[' => self.make(LeftBracket, start_line, start_col),
            ']' => self.make(RightBracket, start_line, start_col),
            ',' => self.make(Comma, start_line, start_col),
            ';' => self.make(Semicolon, start_line, start_col),
            '|' => self.make(Pipe, start_line, start_col),
            '*' => self.make(Star, start_line, start_col),
            '/' => self.make(Slash, start_line, start_col),
            '%' => self.make(Percent, start_line, start_col),
            '~' => self.make(Tilde, start_line, start_col),
            '.' => {
                if self.peek() == '.' && self.peek_next() == '.' {
                    self.advance();
                    self.advance();
                    self.make(Variadic, start_line, start_col)
                } else if self.peek() == '.' {
                    return Err(self.syntax_error(
                        "SY001",
                        catalog::SY001_UNEXPECTED_CHAR,
                        &[&self.lexeme()],
                        start_line,
                        start_col,
                    ));
                } else {
                    self.make(Dot, start_line, start_col)
                }
            }
            '-' => {
                if self.match_char('=') {
                    self.make(MinusEqual, start_line, start_col)
                } else {
                    self.make(Minus, start_line, start_col)
                }
            }
            '+' => {
                if self.match_char('=') {
                    self.make(PlusEqual, start_line, start_col)
                } else {
                    self.make(Plus, start_line, start_col)
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make(BangEqual, start_line, start_col)
                } else {
                    self.make(Bang, start_line, start_col)
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.make(EqualEqual, start_line, start_col)
                } else {
                    self.make(Equal, start_line, start_col)
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make(LessEqual, start_line, start_col)
                } else {
                    self.make(Less, start_line, start_col)
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make(GreaterEqual, start_line, start_col)
                } else {
                    self.make(Greater, start_line, start_col)
                }
            }
            ':' => {
                if self.match_char(':') {
                    self.make(DoubleColon, start_line, start_col)
                } else {
                    self.make(Colon, start_line, start_col)
                }
            }
            '"' => self.scan_string(start_line, start_col)?,
            '\'' => self.scan_char(start_line, start_col)?,
            d if d.is_ascii_digit() => self.scan_number(start_line, start_col),
            a if a.is_alphabetic() || a == '_' => self.scan_identifier(start_line, start_col),
            other => {
                return Err(self.syntax_error(
                    "SY001",
                    catalog::SY001_UNEXPECTED_CHAR,
                    &[&other.to_string()],
                    start_line,
                    start_col,
                ))
            }
        };
        Ok(tok)
    }

    fn scan_string(&mut self, start_line: usize, start_col: usize) -> Result<Token, UmbraError> {
        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\\' {
                self.advance();
                if !self.is_at_end() {
                    self.advance();
                }
            } else {
                self.advance();
            }
        }
        if self.is_at_end() {
            return Err(self.syntax_error(
                "SY002",
                catalog::SY002_UNTERMINATED_STRING,
                &[],
                start_line,
                start_col,
            ));
        }
        let body: String = self.source[self.start + 1..self.current].iter().collect();
        self.advance(); // closing quote
        let end_col = self.column - 1;
        Ok(Token::new(
            TokenKind::String,
            body,
            Location::new(start_line, start_col, end_col),
        ))
    }

    fn scan_char(&mut self, start_line: usize, start_col: usize) -> Result<Token, UmbraError> {
        if self.is_at_end() {
            return Err(self.syntax_error(
                "SY003",
                catalog::SY003_UNTERMINATED_CHAR,
                &[],
                start_line,
                start_col,
            ));
        }
        let resolved = if self.peek() == '\\' {
            self.advance();
            if self.is_at_end() {
                return Err(self.syntax_error(
                    "SY003",
                    catalog::SY003_UNTERMINATED_CHAR,
                    &[],
                    start_line,
                    start_col,
                ));
            }
            let escape = self.advance();
            match escape {
                'n' => '\n',
                't' => '\t',
                '\\' => '\\',
                '\'' => '\'',
                '0' => '\0',
                other => {
                    return Err(self.syntax_error(
                        "SY004",
                        catalog::SY004_INVALID_ESCAPE,
                        &[&format!("\\{}", other)],
                        start_line,
                        start_col,
                    ))
                }
            }
        } else {
            self.advance()
        };
        if self.peek() != '\'' {
            return Err(self.syntax_error(
                "SY003",
                catalog::SY003_UNTERMINATED_CHAR,
                &[],
                start_line,
                start_col,
            ));
        }
        self.advance();
        let end_col = self.column - 1;
        Ok(Token::new(
            TokenKind::Char,
            resolved.to_string(),
            Location::new(start_line, start_col, end_col),
        ))
    }

    fn scan_number(&mut self, start_line: usize, start_col: usize) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        self.make(TokenKind::Numeric, start_line, start_col)
    }

    fn scan_identifier(&mut self, start_line: usize, start_col: usize) -> Token {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let word = self.lexeme();
        let kind = lookup_keyword(&word).unwrap_or(TokenKind::Identifier);
        self.make(kind, start_line, start_col)
    }

    fn syntax_error(
        &self,
        code: &'static str,
        template: &str,
        args: &[&str],
        line: usize,
        col: usize,
    ) -> UmbraError {
        UmbraError::syntax(code, template, args, Location::new(line, col, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuators_maximal_munch() {
        assert_eq!(
            kinds("-= += == != <= >= :: ..."),
            vec![
                TokenKind::MinusEqual,
                TokenKind::PlusEqual,
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::DoubleColon,
                TokenKind::Variadic,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_line_comment_skipped() {
        let toks = Lexer::new("# a comment\n1").tokenize().unwrap();
        assert_eq!(toks[0].kind, TokenKind::Numeric);
        assert_eq!(toks[0].lexeme, "1");
    }

    #[test]
    fn test_keyword_vs_identifier() {
        assert_eq!(kinds("if foo"), vec![TokenKind::If, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let toks = Lexer::new(r#""a\"b""#).tokenize().unwrap();
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].lexeme, r#"a\"b"#);
    }

    #[test]
    fn test_unterminated_string_is_syntax_error() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        assert_eq!(err.code(), "SY002");
    }

    #[test]
    fn test_char_literal_escape() {
        let toks = Lexer::new(r"'\n'").tokenize().unwrap();
        assert_eq!(toks[0].kind, TokenKind::Char);
        assert_eq!(toks[0].lexeme, "\n");
    }

    #[test]
    fn test_number_literal() {
        let toks = Lexer::new("3.14").tokenize().unwrap();
        assert_eq!(toks[0].kind, TokenKind::Numeric);
        assert_eq!(toks[0].lexeme, "3.14");
    }

    #[test]
    fn test_eof_always_terminates() {
        let toks = Lexer::new("").tokenize().unwrap();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Eof);
    }
}
