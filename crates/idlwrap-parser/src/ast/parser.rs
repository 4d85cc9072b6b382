//! Core parser state and token navigation.
//!
//! The grammar itself lives in `type_parser` and `decl_parser`; this module
//! owns the token buffer and the primitive operations they share.

use bumpalo::Bump;
use idlwrap_core::{ParseError, ParseErrorKind, ParseErrors, Span};

use super::decl::Module;
use super::types::Type;
use crate::lexer::{Lexer, Token, TokenKind};

/// Recursive-descent parser for interface files.
///
/// The whole file is lexed up front into `buffer`. Lexer errors are collected
/// together; grammar errors stop the parse at the first one.
pub struct Parser<'src, 'ast> {
    /// Source text, for verbatim slices (default arguments).
    pub(super) source: &'src str,
    /// Lexed tokens; always ends with an `Eof` token.
    pub(super) buffer: Vec<Token<'ast>>,
    /// Index of the next unread token.
    pub(super) position: usize,
    /// Errors reported by the lexer.
    errors: ParseErrors,
    /// Enclosing namespace path of the declaration being parsed.
    pub(super) namespaces: Vec<String>,
}

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Create a parser over `source`, lexing into `arena`.
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::new();
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Error => continue,
                TokenKind::Eof => {
                    buffer.push(token);
                    break;
                }
                _ => buffer.push(token),
            }
        }

        let mut errors = ParseErrors::new();
        for error in lexer.take_errors() {
            errors.push(error.into());
        }

        Self {
            source,
            buffer,
            position: 0,
            errors,
            namespaces: Vec::new(),
        }
    }

    /// Parse a whole interface file.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &'src str, arena: &'ast Bump) -> Result<Module, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        parser.take_lex_errors()?;
        parser
            .parse_module()
            .map_err(ParseErrors::from)
    }

    /// Parse a single type use such as `const gtsam::Pose3&`.
    pub fn type_expr(source: &'src str, arena: &'ast Bump) -> Result<Type, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        parser.take_lex_errors()?;
        let ty = parser.parse_type()?;
        parser.expect_eof()?;
        Ok(ty)
    }

    fn take_lex_errors(&mut self) -> Result<(), ParseErrors> {
        std::mem::take(&mut self.errors).into_result()
    }

    // =========================================
    // Token navigation
    // =========================================

    /// The current token without consuming it.
    pub(super) fn peek(&self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// The token `n` positions ahead (0 = current). Clamps at `Eof`.
    pub(super) fn peek_nth(&self, n: usize) -> Token<'ast> {
        let index = (self.position + n).min(self.buffer.len().saturating_sub(1));
        match self.buffer.get(index) {
            Some(token) => *token,
            None => Token::new(TokenKind::Eof, "", Span::default()),
        }
    }

    /// Consume and return the current token. Never moves past `Eof`.
    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// Whether the current token has the given kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume the current token if it has the given kind.
    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of the given kind or fail.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedEof,
                token.span,
                format!("expected {}, found end of file", kind.description()),
            ));
        }
        Err(ParseError::expected_token(
            token.span,
            kind.description(),
            token.lexeme,
        ))
    }

    /// Consume an identifier or fail.
    pub(super) fn expect_identifier(&mut self) -> Result<Token<'ast>, ParseError> {
        if let Some(token) = self.eat(TokenKind::Identifier) {
            return Ok(token);
        }
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            return Err(ParseError::unexpected_eof(token.span));
        }
        Err(ParseError::expected_identifier(token.span, token.lexeme))
    }

    /// Check for an identifier with specific text.
    pub(super) fn check_contextual(&self, text: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Identifier && token.lexeme == text
    }

    /// Fail unless all input has been consumed.
    pub(super) fn expect_eof(&self) -> Result<(), ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(token.span, token.lexeme))
        }
    }

    /// Whether all tokens have been consumed.
    pub(super) fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        self.buffer
            .get(self.position.saturating_sub(1))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    /// Span from `start` through the most recently consumed token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous_span())
    }
}
