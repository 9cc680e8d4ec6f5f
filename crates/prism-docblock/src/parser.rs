//! Recursive-descent parser for documentation type expressions.
//!
//! Precedence, loosest first:
//!
//! ```text
//! type         := '$param' 'is' ['not'] union '?' type ':' type
//!               | union ['is' ['not'] union '?' type ':' type]
//! union        := intersection ('|' intersection)*
//! intersection := postfix ('&' postfix)*
//! postfix      := primary ('[' ']' | '[' type ']')*
//! primary      := '?' postfix | '(' type ')' | literal | '$this'
//!               | name ['::' const] ['<' args '>'] ['{' shape '}'] ['(' params ')' [':' postfix]]
//! ```
//!
//! Suffixes (`<`, `[`, `{`, `(`, `::`) only attach when written directly
//! after the preceding token, so a description such as `@return Foo (bar)`
//! stops after `Foo`.

use crate::error::DocParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::{CallableParamNode, ShapeItemNode, ShapeKeyNode, SubjectNode, TypeNode};
use prism_common::recursion::{DepthCounter, RecursionProfile};

pub struct TypeParser<'a> {
    text: &'a str,
    lexer: Lexer<'a>,
    tokens: Vec<Token>,
    pos: usize,
    depth: DepthCounter,
}

impl<'a> TypeParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lexer: Lexer::new(text),
            tokens: Vec::new(),
            pos: 0,
            depth: DepthCounter::with_profile(RecursionProfile::TypeParsing),
        }
    }

    /// The unparsed remainder of the input.
    pub fn rest(&self) -> &'a str {
        let offset = match self.tokens.get(self.pos) {
            Some(token) => token.start,
            None => self.lexer.offset(),
        };
        &self.text[offset..]
    }

    // =========================================================================
    // Token access
    // =========================================================================

    fn fill(&mut self, ahead: usize) -> Result<(), DocParseError> {
        while self.tokens.len() <= self.pos + ahead {
            if self
                .tokens
                .last()
                .is_some_and(|token| token.kind == TokenKind::Eof)
            {
                let eof = self.tokens[self.tokens.len() - 1].clone();
                self.tokens.push(eof);
                continue;
            }
            let saved = self.lexer.offset();
            match self.lexer.next_token() {
                Ok(token) => self.tokens.push(token),
                Err(error) => {
                    self.lexer.reset(saved);
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    fn peek(&mut self, ahead: usize) -> Result<&Token, DocParseError> {
        self.fill(ahead)?;
        Ok(&self.tokens[self.pos + ahead])
    }

    /// Peek for an optional continuation. Lexing failures read as "no
    /// continuation" since the text may be a free-form description.
    fn peek_lenient(&mut self, ahead: usize) -> Option<&Token> {
        self.fill(ahead).ok()?;
        self.tokens.get(self.pos + ahead)
    }

    fn peek_kind_is(&mut self, ahead: usize, kind: &TokenKind) -> bool {
        self.peek_lenient(ahead).is_some_and(|token| &token.kind == kind)
    }

    /// Peek a suffix token written directly after the previous one.
    fn peek_adjacent(&mut self, kind: &TokenKind) -> bool {
        self.peek_lenient(0)
            .is_some_and(|token| &token.kind == kind && !token.space_before)
    }

    fn peek_identifier(&mut self, ahead: usize, word: &str) -> bool {
        matches!(
            self.peek_lenient(ahead),
            Some(Token { kind: TokenKind::Identifier(name), .. }) if name.eq_ignore_ascii_case(word)
        )
    }

    fn advance(&mut self) -> Result<Token, DocParseError> {
        self.fill(0)?;
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        Ok(token)
    }

    fn eat(&mut self, kind: &TokenKind) -> Result<bool, DocParseError> {
        if &self.peek(0)?.kind == kind {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, DocParseError> {
        let token = self.advance()?;
        if &token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(&token, &kind.describe()))
        }
    }

    // =========================================================================
    // Parse Methods - Types
    // =========================================================================

    /// Parse one type expression, leaving any trailing text unread.
    pub fn parse_type(&mut self) -> Result<TypeNode, DocParseError> {
        if let Some(Token {
            kind: TokenKind::Variable(name),
            ..
        }) = self.peek_lenient(0)
        {
            let name = name.clone();
            if name != "this" && self.peek_identifier(1, "is") {
                self.pos += 2;
                return self.parse_conditional_tail(SubjectNode::Parameter(name));
            }
        }

        let ty = self.parse_union()?;
        if self.peek_identifier(0, "is") {
            self.pos += 1;
            return self.parse_conditional_tail(SubjectNode::Type(Box::new(ty)));
        }
        Ok(ty)
    }

    /// Parse a type that must span the whole input.
    pub fn parse_complete(&mut self) -> Result<TypeNode, DocParseError> {
        let ty = self.parse_type()?;
        let token = self.advance()?;
        if token.kind != TokenKind::Eof {
            return Err(unexpected(&token, "end of type"));
        }
        Ok(ty)
    }

    fn parse_conditional_tail(&mut self, subject: SubjectNode) -> Result<TypeNode, DocParseError> {
        let negated = if self.peek_identifier(0, "not") {
            self.pos += 1;
            true
        } else {
            false
        };
        let target = self.parse_union()?;
        self.expect(&TokenKind::Question)?;
        let if_true = self.parse_type()?;
        self.expect(&TokenKind::Colon)?;
        let if_false = self.parse_type()?;
        Ok(TypeNode::Conditional {
            subject,
            target: Box::new(target),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            negated,
        })
    }

    fn parse_union(&mut self) -> Result<TypeNode, DocParseError> {
        let first = self.parse_intersection()?;
        if !self.peek_kind_is(0, &TokenKind::Pipe) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.peek_kind_is(0, &TokenKind::Pipe) {
            self.pos += 1;
            members.push(self.parse_intersection()?);
        }
        Ok(TypeNode::Union(members))
    }

    fn parse_intersection(&mut self) -> Result<TypeNode, DocParseError> {
        let first = self.parse_postfix()?;
        let mut members = vec![first];
        // `int &$x` and `int &...$x` in callable signatures are by-reference
        // markers, not intersections.
        while self.peek_kind_is(0, &TokenKind::Ampersand)
            && !matches!(
                self.peek_lenient(1).map(|token| &token.kind),
                Some(TokenKind::Variable(_) | TokenKind::Ellipsis)
            )
        {
            self.pos += 1;
            members.push(self.parse_postfix()?);
        }
        if members.len() == 1 {
            Ok(members.remove(0))
        } else {
            Ok(TypeNode::Intersection(members))
        }
    }

    fn parse_postfix(&mut self) -> Result<TypeNode, DocParseError> {
        let mut ty = self.parse_primary()?;
        while self.peek_adjacent(&TokenKind::OpenBracket) {
            self.pos += 1;
            if self.eat(&TokenKind::CloseBracket)? {
                ty = TypeNode::ArrayOf(Box::new(ty));
            } else {
                let offset = self.parse_type()?;
                self.expect(&TokenKind::CloseBracket)?;
                ty = TypeNode::OffsetAccess {
                    base: Box::new(ty),
                    offset: Box::new(offset),
                };
            }
        }
        Ok(ty)
    }

    fn parse_primary(&mut self) -> Result<TypeNode, DocParseError> {
        if !self.depth.enter() {
            return Err(DocParseError::TooDeep);
        }
        let result = self.parse_primary_inner();
        self.depth.leave();
        result
    }

    fn parse_primary_inner(&mut self) -> Result<TypeNode, DocParseError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Question => Ok(TypeNode::Nullable(Box::new(self.parse_postfix()?))),
            TokenKind::OpenParen => {
                let inner = self.parse_type()?;
                self.expect(&TokenKind::CloseParen)?;
                Ok(inner)
            }
            TokenKind::Variable(ref name) if name == "this" => Ok(TypeNode::This),
            TokenKind::Int(value) => Ok(TypeNode::IntLiteral(value)),
            TokenKind::Float(value) => Ok(TypeNode::FloatLiteral(value)),
            TokenKind::String(value) => Ok(TypeNode::StringLiteral(value)),
            TokenKind::Identifier(name) => self.parse_named(name),
            _ => Err(unexpected(&token, "a type")),
        }
    }

    fn parse_named(&mut self, name: String) -> Result<TypeNode, DocParseError> {
        if self.peek_adjacent(&TokenKind::DoubleColon) {
            self.pos += 1;
            return self.parse_const_fetch(name);
        }
        if self.peek_adjacent(&TokenKind::LessThan) {
            self.pos += 1;
            let args = self.parse_generic_args()?;
            return Ok(TypeNode::Generic { base: name, args });
        }
        if self.peek_adjacent(&TokenKind::OpenBrace) && is_shape_base(&name) {
            self.pos += 1;
            return self.parse_shape(name);
        }
        if self.peek_adjacent(&TokenKind::OpenParen) && is_callable_base(&name) {
            self.pos += 1;
            return self.parse_callable(name);
        }
        Ok(TypeNode::Identifier(name))
    }

    /// After `Name::`: `CONST`, `class`, `PREFIX_*` or `*`.
    fn parse_const_fetch(&mut self, class: String) -> Result<TypeNode, DocParseError> {
        let token = self.advance()?;
        let mut name = match token.kind {
            TokenKind::Identifier(name) => name,
            TokenKind::Star => "*".to_string(),
            _ => return Err(unexpected(&token, "a constant name")),
        };
        if name != "*" && self.peek_adjacent(&TokenKind::Star) {
            self.pos += 1;
            name.push('*');
        }
        Ok(TypeNode::ConstFetch { class, name })
    }

    fn parse_generic_args(&mut self) -> Result<Vec<TypeNode>, DocParseError> {
        let mut args = Vec::new();
        loop {
            // Call-site variance (`Collection<covariant T>`) is accepted and ignored.
            if (self.peek_identifier(0, "covariant") || self.peek_identifier(0, "contravariant"))
                && matches!(
                    self.peek_lenient(1).map(|token| &token.kind),
                    Some(TokenKind::Identifier(_))
                )
            {
                self.pos += 1;
            }
            if self.eat(&TokenKind::Star)? {
                args.push(TypeNode::Identifier("mixed".to_string()));
            } else {
                args.push(self.parse_type()?);
            }
            if self.eat(&TokenKind::Comma)? {
                if self.peek_kind_is(0, &TokenKind::GreaterThan) {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect(&TokenKind::GreaterThan)?;
        Ok(args)
    }

    fn parse_shape(&mut self, base: String) -> Result<TypeNode, DocParseError> {
        let mut items = Vec::new();
        let mut sealed = true;
        loop {
            if self.eat(&TokenKind::CloseBrace)? {
                break;
            }
            if self.eat(&TokenKind::Ellipsis)? {
                sealed = false;
                // `...<int, string>` describes the unsealed part; only the
                // fact that the shape is open is kept.
                if self.peek_adjacent(&TokenKind::LessThan) {
                    self.pos += 1;
                    self.parse_generic_args()?;
                }
                self.eat(&TokenKind::Comma)?;
                self.expect(&TokenKind::CloseBrace)?;
                break;
            }
            items.push(self.parse_shape_item()?);
            if !self.eat(&TokenKind::Comma)? {
                self.expect(&TokenKind::CloseBrace)?;
                break;
            }
        }
        Ok(TypeNode::Shape {
            base,
            items,
            sealed,
        })
    }

    fn parse_shape_item(&mut self) -> Result<ShapeItemNode, DocParseError> {
        let key = match &self.peek(0)?.kind {
            TokenKind::Identifier(name) => Some(ShapeKeyNode::Identifier(name.clone())),
            TokenKind::Int(value) => Some(ShapeKeyNode::Int(*value)),
            TokenKind::String(value) => Some(ShapeKeyNode::String(value.clone())),
            _ => None,
        };
        let is_key = key.is_some()
            && (self.peek(1)?.kind == TokenKind::Colon
                || (self.peek(1)?.kind == TokenKind::Question
                    && self.peek(2)?.kind == TokenKind::Colon));

        if is_key {
            self.pos += 1;
            let optional = self.eat(&TokenKind::Question)?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_type()?;
            return Ok(ShapeItemNode {
                key,
                optional,
                value,
            });
        }
        Ok(ShapeItemNode {
            key: None,
            optional: false,
            value: self.parse_type()?,
        })
    }

    fn parse_callable(&mut self, base: String) -> Result<TypeNode, DocParseError> {
        let mut params = Vec::new();
        if !self.eat(&TokenKind::CloseParen)? {
            loop {
                params.push(self.parse_callable_param()?);
                if self.eat(&TokenKind::Comma)? {
                    if self.eat(&TokenKind::CloseParen)? {
                        break;
                    }
                    continue;
                }
                self.expect(&TokenKind::CloseParen)?;
                break;
            }
        }
        let ret = if self.peek_kind_is(0, &TokenKind::Colon) {
            self.pos += 1;
            Some(Box::new(self.parse_postfix()?))
        } else {
            None
        };
        Ok(TypeNode::Callable { base, params, ret })
    }

    fn parse_callable_param(&mut self) -> Result<CallableParamNode, DocParseError> {
        let ty = self.parse_type()?;
        let by_ref = self.eat(&TokenKind::Ampersand)?;
        let variadic = self.eat(&TokenKind::Ellipsis)?;
        let name = match &self.peek(0)?.kind {
            TokenKind::Variable(name) => {
                let name = name.clone();
                self.pos += 1;
                Some(name)
            }
            _ => None,
        };
        let optional = self.eat(&TokenKind::Equals)?;
        Ok(CallableParamNode {
            ty,
            name,
            by_ref,
            variadic,
            optional,
        })
    }
}

fn unexpected(token: &Token, expected: &str) -> DocParseError {
    DocParseError::Unexpected {
        expected: expected.to_string(),
        found: token.kind.describe(),
        offset: token.start,
    }
}

fn is_shape_base(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "array" | "list" | "object" | "non-empty-array" | "non-empty-list"
    )
}

fn is_callable_base(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "callable" | "closure" | "\\closure" | "pure-callable" | "pure-closure"
    )
}

/// Parse a complete type expression.
pub fn parse_type(text: &str) -> Result<TypeNode, DocParseError> {
    TypeParser::new(text).parse_complete()
}

/// Parse a type at the start of `text`, returning it with the unread rest.
pub fn parse_type_prefix(text: &str) -> Result<(TypeNode, &str), DocParseError> {
    let mut parser = TypeParser::new(text);
    let ty = parser.parse_type()?;
    Ok((ty, parser.rest()))
}

#[cfg(test)]
#[path = "../tests/parser_tests.rs"]
mod tests;
