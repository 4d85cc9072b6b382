//! Main lexer implementation.
//!
//! The [`Lexer`] converts interface text into a stream of [`Token`]s,
//! dispatching on the first character of each token. Comments are skipped;
//! an `#include` directive becomes a single token.
//!
//! Lexemes are copied into the arena so tokens outlive any borrowed buffer.

use bumpalo::Bump;

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};
use idlwrap_core::{LexError, Span};

/// Lexer for interface files.
///
/// The `'src` lifetime is the source string being lexed.
/// The `'ast` lifetime is the arena where token lexemes are allocated.
pub struct Lexer<'src, 'ast> {
    /// Low-level character cursor.
    cursor: Cursor<'src>,
    /// Arena for allocating token lexemes.
    arena: &'ast Bump,
    /// Accumulated errors.
    errors: Vec<LexError>,
    /// Set once the EOF token has been produced.
    finished: bool,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Check if any errors occurred.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token.
    ///
    /// Returns `Eof` forever once the input is exhausted.
    pub fn next_token(&mut self) -> Token<'ast> {
        let token = self.scan_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        token
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    /// Scan the next token from source.
    fn scan_token(&mut self) -> Token<'ast> {
        loop {
            self.skip_whitespace();

            let start_line = self.cursor.line();
            let start_col = self.cursor.column();
            let start_offset = self.cursor.offset();

            let Some(c) = self.cursor.peek() else {
                return self.make_eof();
            };

            return match c {
                '/' if self.cursor.check_str("//") => {
                    self.skip_line_comment();
                    continue;
                }
                '/' if self.cursor.check_str("/*") => {
                    match self.skip_block_comment(start_line, start_col, start_offset) {
                        Ok(()) => continue,
                        Err(error) => self.make_error(error),
                    }
                }

                '"' | '\'' => self.scan_string(c, start_line, start_col, start_offset),

                '#' => self.scan_directive(start_line, start_col, start_offset),

                c if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),
                '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.scan_number(start_line, start_col, start_offset)
                }

                c if is_ident_start(c) => self.scan_identifier(start_line, start_col, start_offset),

                _ => self.scan_operator(start_line, start_col, start_offset),
            };
        }
    }

    /// Skip whitespace and BOM.
    fn skip_whitespace(&mut self) {
        self.cursor.eat_str("\u{FEFF}");
        self.cursor.eat_while(|c| c.is_whitespace());
    }

    /// Create an EOF token.
    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.offset(), self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    /// Create a token from start position to current position.
    /// Copies the lexeme into the arena.
    fn make_token(
        &self,
        kind: TokenKind,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let span = self.cursor.span_from(start_offset, start_line, start_col);
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start_offset));
        Token::new(kind, lexeme, span)
    }

    /// Create an error token and record the error.
    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: Comments
    // =========================================

    /// Skip a `//` comment up to (not including) the newline.
    fn skip_line_comment(&mut self) {
        self.cursor.eat_while(|c| c != '\n');
    }

    /// Skip a `/* ... */` comment.
    fn skip_block_comment(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Result<(), LexError> {
        self.cursor.eat_str("/*");
        loop {
            if self.cursor.eat_str("*/") {
                return Ok(());
            }
            if self.cursor.advance().is_none() {
                return Err(LexError::UnterminatedComment {
                    span: self.cursor.span_from(start_offset, start_line, start_col),
                });
            }
        }
    }

    // =========================================
    // Scanning: Strings
    // =========================================

    /// Scan a string or character literal.
    fn scan_string(
        &mut self,
        quote: char,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.advance();

        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let span = self.cursor.span_from(start_offset, start_line, start_col);
                    return self.make_error(LexError::UnterminatedString { span });
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return self.make_token(
                        TokenKind::StringLiteral,
                        start_line,
                        start_col,
                        start_offset,
                    );
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // =========================================
    // Scanning: Directives
    // =========================================

    /// Scan `#include <path>` or `#include "path"` as one token.
    fn scan_directive(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        if !self.cursor.eat_str("#include") {
            self.cursor.advance();
            let span = self.cursor.span_from(start_offset, start_line, start_col);
            return self.make_error(LexError::UnexpectedChar { ch: '#', span });
        }

        self.cursor.eat_while(|c| c == ' ' || c == '\t');
        let close = match self.cursor.peek() {
            Some('<') => '>',
            Some('"') => '"',
            _ => {
                let span = self.cursor.span_from(start_offset, start_line, start_col);
                return self.make_error(LexError::MalformedInclude { span });
            }
        };
        self.cursor.advance();
        let path = self.cursor.eat_while(|c| c != close && c != '\n');
        if path.trim().is_empty() || !self.cursor.eat(close) {
            let span = self.cursor.span_from(start_offset, start_line, start_col);
            return self.make_error(LexError::MalformedInclude { span });
        }

        self.make_token(TokenKind::Include, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    /// Scan an integer or floating-point literal, including suffixes.
    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        if self.cursor.check_str("0x") || self.cursor.check_str("0X") {
            self.cursor.advance();
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_hexdigit());
            self.cursor.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
            return self.make_token(TokenKind::IntLiteral, start_line, start_col, start_offset);
        }

        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_float = true;
        }

        if matches!(self.cursor.peek(), Some('e' | 'E'))
            && self
                .cursor
                .peek_nth(1)
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_float = true;
        }

        if matches!(self.cursor.peek(), Some('f' | 'F')) {
            self.cursor.advance();
            is_float = true;
        } else {
            self.cursor.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Identifiers and keywords
    // =========================================

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let lexeme = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    /// Scan an operator or punctuation token.
    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '@' => TokenKind::At,
            ':' if self.cursor.eat(':') => TokenKind::ColonColon,
            ':' => TokenKind::Colon,
            '<' | '>' => self.scan_angle(c),
            '+' | '-' | '*' | '/' | '%' | '^' | '&' | '|' | '=' | '!' => self.scan_arithmetic(c),
            '.' | '~' | '?' => TokenKind::Punct,
            _ => {
                let span = self.cursor.span_from(start_offset, start_line, start_col);
                return self.make_error(LexError::UnexpectedChar { ch: c, span });
            }
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }

    /// `<`, `>` and their `=`, shift and shift-assign forms.
    fn scan_angle(&mut self, c: char) -> TokenKind {
        let less = c == '<';
        if self.cursor.eat('=') {
            return if less { TokenKind::LessEqual } else { TokenKind::GreaterEqual };
        }
        if !self.cursor.eat(c) {
            return if less { TokenKind::Less } else { TokenKind::Greater };
        }
        match (less, self.cursor.eat('=')) {
            (true, true) => TokenKind::LessLessEqual,
            (true, false) => TokenKind::LessLess,
            (false, true) => TokenKind::GreaterGreaterEqual,
            (false, false) => TokenKind::GreaterGreater,
        }
    }

    /// An arithmetic, bitwise or comparison symbol, optionally followed by `=`.
    fn scan_arithmetic(&mut self, c: char) -> TokenKind {
        if self.cursor.eat('=') {
            return match c {
                '+' => TokenKind::PlusEqual,
                '-' => TokenKind::MinusEqual,
                '*' => TokenKind::StarEqual,
                '/' => TokenKind::SlashEqual,
                '%' => TokenKind::PercentEqual,
                '^' => TokenKind::CaretEqual,
                '&' => TokenKind::AmpEqual,
                '|' => TokenKind::PipeEqual,
                '=' => TokenKind::EqualEqual,
                _ => TokenKind::BangEqual,
            };
        }
        // `&&`, `||`, `++`, `--` and `->` appear only inside default values.
        let doubled = matches!(c, '&' | '|' | '+' | '-') && self.cursor.eat(c);
        if doubled || (c == '-' && self.cursor.eat('>')) {
            return TokenKind::Punct;
        }
        match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '&' => TokenKind::Amp,
            '|' => TokenKind::Pipe,
            '=' => TokenKind::Equal,
            _ => TokenKind::Punct,
        }
    }
}

impl<'src, 'ast> Iterator for Lexer<'src, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to collect all tokens from source.
    fn tokenize(source: &str) -> Vec<(TokenKind, String)> {
        let arena = Bump::new();
        Lexer::new(source, &arena)
            .map(|t| (t.kind, t.lexeme.to_string()))
            .collect()
    }

    /// Helper to get token kinds only.
    fn token_kinds(source: &str) -> Vec<TokenKind> {
        let arena = Bump::new();
        Lexer::new(source, &arena).map(|t| t.kind).collect()
    }

    // =========================================
    // Basic tokens
    // =========================================

    #[test]
    fn empty_source() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn whitespace_and_comments_only() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("  // line\n /* block\n comment */ \t", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert!(!lexer.has_errors());
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            tokenize("virtual class Pose3 This pair"),
            vec![
                (TokenKind::Virtual, "virtual".to_string()),
                (TokenKind::Class, "class".to_string()),
                (TokenKind::Identifier, "Pose3".to_string()),
                (TokenKind::Identifier, "This".to_string()),
                (TokenKind::Identifier, "pair".to_string()),
            ]
        );
    }

    #[test]
    fn basic_type_keywords() {
        assert_eq!(
            token_kinds("void bool unsigned char int size_t double float"),
            vec![
                TokenKind::Void,
                TokenKind::Bool,
                TokenKind::Unsigned,
                TokenKind::Char,
                TokenKind::Int,
                TokenKind::SizeT,
                TokenKind::Double,
                TokenKind::Float,
            ]
        );
    }

    #[test]
    fn qualified_name() {
        assert_eq!(
            token_kinds("gtsam::noiseModel::Base*"),
            vec![
                TokenKind::Identifier,
                TokenKind::ColonColon,
                TokenKind::Identifier,
                TokenKind::ColonColon,
                TokenKind::Identifier,
                TokenKind::Star,
            ]
        );
    }

    // =========================================
    // Literals
    // =========================================

    #[test]
    fn numbers() {
        assert_eq!(
            tokenize("42 9.81 1e-3 2.5f 0xFF 10u"),
            vec![
                (TokenKind::IntLiteral, "42".to_string()),
                (TokenKind::FloatLiteral, "9.81".to_string()),
                (TokenKind::FloatLiteral, "1e-3".to_string()),
                (TokenKind::FloatLiteral, "2.5f".to_string()),
                (TokenKind::IntLiteral, "0xFF".to_string()),
                (TokenKind::IntLiteral, "10u".to_string()),
            ]
        );
    }

    #[test]
    fn strings_with_escapes() {
        assert_eq!(
            tokenize(r#""hello \"world\"" 'c'"#),
            vec![
                (TokenKind::StringLiteral, r#""hello \"world\"""#.to_string()),
                (TokenKind::StringLiteral, "'c'".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("\"oops\n", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        let errors = lexer.take_errors();
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
    }

    #[test]
    fn unterminated_comment() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("/* never closed", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::UnterminatedComment { .. }
        ));
    }

    // =========================================
    // Directives
    // =========================================

    #[test]
    fn include_directive() {
        assert_eq!(
            tokenize("#include <gtsam/geometry/Pose3.h>\nclass"),
            vec![
                (
                    TokenKind::Include,
                    "#include <gtsam/geometry/Pose3.h>".to_string()
                ),
                (TokenKind::Class, "class".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_include() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("#include gtsam.h", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::MalformedInclude { .. }
        ));
    }

    #[test]
    fn stray_hash() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("#pragma once", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::UnexpectedChar { ch: '#', .. }
        ));
    }

    // =========================================
    // Operators
    // =========================================

    #[test]
    fn overloadable_operators() {
        assert_eq!(
            token_kinds("+= -= *= /= %= ^= &= |= << <<= >> >>= == != <= >="),
            vec![
                TokenKind::PlusEqual,
                TokenKind::MinusEqual,
                TokenKind::StarEqual,
                TokenKind::SlashEqual,
                TokenKind::PercentEqual,
                TokenKind::CaretEqual,
                TokenKind::AmpEqual,
                TokenKind::PipeEqual,
                TokenKind::LessLess,
                TokenKind::LessLessEqual,
                TokenKind::GreaterGreater,
                TokenKind::GreaterGreaterEqual,
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
            ]
        );
    }

    #[test]
    fn expression_punctuation_is_opaque() {
        assert_eq!(
            token_kinds("a.b ~c !d e ? f : g && h || i++ j-- k->l"),
            vec![
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
                TokenKind::Punct,
                TokenKind::Identifier,
            ]
        );
        assert_eq!(
            tokenize("x->y")[1],
            (TokenKind::Punct, "->".to_string())
        );
    }

    #[test]
    fn qualifier_symbols() {
        assert_eq!(
            token_kinds("* @ &"),
            vec![TokenKind::Star, TokenKind::At, TokenKind::Amp]
        );
    }

    #[test]
    fn nested_template_close() {
        assert_eq!(
            token_kinds("vector<vector<int>>"),
            vec![
                TokenKind::Identifier,
                TokenKind::Less,
                TokenKind::Identifier,
                TokenKind::Less,
                TokenKind::Int,
                TokenKind::GreaterGreater,
            ]
        );
    }

    #[test]
    fn token_spans() {
        let arena = Bump::new();
        let tokens: Vec<_> = Lexer::new("class\n  Foo", &arena).collect();
        assert_eq!(tokens[0].span, Span::new(0, 5, 1, 1));
        assert_eq!(tokens[1].span, Span::new(8, 3, 2, 3));
    }

    #[test]
    fn unexpected_char_recovers() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("$ Foo", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        assert!(lexer.has_errors());
    }
}
