//! Recursive descent parser for unit files and expressions

use crate::ParseError;
use inspector_ast::*;
use inspector_lexer::{Token, TokenKind};

/// Maximum nesting of parenthesized, unary or lambda expressions
pub const MAX_DEPTH: usize = 64;

/// Maximum height of a parsed expression tree, counting operator chains
pub const MAX_HEIGHT: usize = 256;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // ===== Unit declarations =====

    /// `use`* `namespace` EOF
    pub fn parse_unit_file(&mut self) -> Result<UnitFile, ParseError> {
        let start = self.peek_span();

        let mut imports = Vec::new();
        while self.check(TokenKind::Use) {
            imports.push(self.parse_import()?);
        }

        let namespace = self.parse_namespace()?;
        self.expect(TokenKind::Eof)?;

        Ok(UnitFile {
            imports,
            span: start.merge(namespace.span),
            namespace,
        })
    }

    fn parse_import(&mut self) -> Result<Import, ParseError> {
        let start = self.expect(TokenKind::Use)?.span;
        let path = self.parse_path()?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Import {
            path,
            span: start.merge(end),
        })
    }

    fn parse_path(&mut self) -> Result<Path, ParseError> {
        let first = self.expect(TokenKind::Ident)?;
        let mut span = first.span;
        let mut segments = vec![first.text(self.source).to_string()];

        while self.check(TokenKind::Dot) {
            self.advance();
            let segment = self.expect(TokenKind::Ident)?;
            span = span.merge(segment.span);
            segments.push(segment.text(self.source).to_string());
        }

        Ok(Path::new(segments, span))
    }

    fn parse_namespace(&mut self) -> Result<NamespaceDecl, ParseError> {
        let start = self.expect(TokenKind::Namespace)?.span;
        let name = self.parse_path()?;
        self.expect(TokenKind::LBrace)?;

        let mut units = Vec::new();
        while self.check(TokenKind::Unit) {
            units.push(self.parse_unit_decl()?);
        }

        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(NamespaceDecl {
            name,
            units,
            span: start.merge(end),
        })
    }

    fn parse_unit_decl(&mut self) -> Result<UnitDecl, ParseError> {
        let start = self.expect(TokenKind::Unit)?.span;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut methods = Vec::new();
        while self.check(TokenKind::Fn) {
            methods.push(self.parse_method()?);
        }

        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(UnitDecl {
            name,
            methods,
            span: start.merge(end),
        })
    }

    fn parse_method(&mut self) -> Result<MethodDecl, ParseError> {
        let start = self.expect(TokenKind::Fn)?.span;
        let name = self.expect_ident()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::Arrow)?;
        let ret = self.parse_type()?;

        self.expect(TokenKind::LBrace)?;
        self.expect(TokenKind::Return)?;
        let body = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        let end = self.expect(TokenKind::RBrace)?.span;

        Ok(MethodDecl {
            name,
            params,
            ret,
            body,
            span: start.merge(end),
        })
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let name_token = self.expect(TokenKind::Ident)?;
        let name = name_token.text(self.source).to_string();
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let end = self.previous_span();
        Ok(Param {
            name,
            ty,
            span: name_token.span.merge(end),
        })
    }

    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        if self.check(TokenKind::Any) {
            self.advance();
            return Ok(TypeRef::Any);
        }
        Ok(TypeRef::Named(self.parse_path()?))
    }

    // ===== Expressions =====

    /// Parse a standalone expression followed by end of input
    pub fn parse_standalone_expr(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                span: self.peek_span(),
            });
        }
        let result = if self.at_lambda() {
            self.parse_lambda()
        } else {
            self.parse_conditional()
        };
        self.depth -= 1;
        result
    }

    /// Lookahead for `x =>`, `() =>` and `(a, b) =>`
    fn at_lambda(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Ident => self.peek_kind_at(1) == TokenKind::FatArrow,
            TokenKind::LParen => {
                let mut offset = 1;
                if self.peek_kind_at(offset) == TokenKind::RParen {
                    return self.peek_kind_at(offset + 1) == TokenKind::FatArrow;
                }
                loop {
                    if self.peek_kind_at(offset) != TokenKind::Ident {
                        return false;
                    }
                    offset += 1;
                    match self.peek_kind_at(offset) {
                        TokenKind::Comma => offset += 1,
                        TokenKind::RParen => {
                            return self.peek_kind_at(offset + 1) == TokenKind::FatArrow
                        }
                        _ => return false,
                    }
                }
            }
            _ => false,
        }
    }

    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_span();
        let mut params = Vec::new();

        if self.check(TokenKind::LParen) {
            self.advance();
            while !self.check(TokenKind::RParen) {
                params.push(self.expect_ident()?);
                if self.check(TokenKind::Comma) {
                    self.advance();
                }
            }
            self.expect(TokenKind::RParen)?;
        } else {
            params.push(self.expect_ident()?);
        }

        self.expect(TokenKind::FatArrow)?;
        let body = self.parse_expr()?;
        let span = start.merge(body.span);

        self.node(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
            },
            span,
        )
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_coalesce()?;
        if !self.check(TokenKind::Question) {
            return Ok(cond);
        }
        self.advance();
        let then = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.parse_expr()?;
        let span = cond.span.merge(otherwise.span);

        self.node(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        )
    }

    /// `??` is right associative
    fn parse_coalesce(&mut self) -> Result<Expr, ParseError> {
        let mut operands = vec![self.parse_or()?];
        while self.check(TokenKind::QuestionQuestion) {
            self.advance();
            operands.push(self.parse_or()?);
        }
        let mut right = operands.pop().ok_or_else(|| self.unexpected("expression"))?;
        while let Some(left) = operands.pop() {
            right = self.binary(BinaryOp::Coalesce, left, right)?;
        }
        Ok(right)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = self.binary(BinaryOp::Or, left, right)?;
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::AndAnd) {
            self.advance();
            let right = self.parse_equality()?;
            left = self.binary(BinaryOp::And, left, right)?;
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = self.binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;

        if op == UnaryOp::Neg && self.at_bare_int() {
            return self.parse_negative_int(start);
        }

        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { span: start });
        }
        let operand = self.parse_unary();
        self.depth -= 1;
        let operand = operand?;

        let span = start.merge(operand.span);
        self.node(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    /// An integer literal with no postfix operator applied to it
    fn at_bare_int(&self) -> bool {
        self.check(TokenKind::Int)
            && !matches!(
                self.peek_kind_at(1),
                TokenKind::Dot | TokenKind::LBracket | TokenKind::LParen
            )
    }

    /// `-` folded into the literal so the full `i64` range is writable
    fn parse_negative_int(&mut self, minus: Span) -> Result<Expr, ParseError> {
        let token = self.advance();
        let digits = token.text(self.source);
        let span = minus.merge(token.span);
        let value = format!("-{}", digits)
            .parse::<i64>()
            .map_err(|_| ParseError::IntegerOverflow {
                text: format!("-{}", digits),
                span,
            })?;
        Ok(Expr::new(ExprKind::Literal(Literal::Int(value)), span))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name_token = self.expect_member_name()?;
                    let name = name_token.text(self.source).to_string();
                    if self.check(TokenKind::LParen) {
                        let (args, end) = self.parse_args()?;
                        let span = expr.span.merge(end);
                        expr = self.node(
                            ExprKind::MethodCall {
                                receiver: Box::new(expr),
                                name,
                                name_span: name_token.span,
                                args,
                            },
                            span,
                        )?;
                    } else {
                        let span = expr.span.merge(name_token.span);
                        expr = self.node(
                            ExprKind::Member {
                                target: Box::new(expr),
                                name,
                                name_span: name_token.span,
                            },
                            span,
                        )?;
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let end = self.expect(TokenKind::RBracket)?.span;
                    let span = expr.span.merge(end);
                    expr = self.node(
                        ExprKind::Index {
                            target: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    )?;
                }
                TokenKind::LParen => {
                    let (args, end) = self.parse_args()?;
                    let span = expr.span.merge(end);
                    expr = self.node(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    )?;
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// `(` args `)`, returning the closing paren span
    fn parse_args(&mut self) -> Result<(Vec<Expr>, Span), ParseError> {
        self.expect(TokenKind::LParen)?;
        let args = self.parse_comma_separated(TokenKind::RParen)?;
        let end = self.expect(TokenKind::RParen)?.span;
        Ok((args, end))
    }

    fn parse_comma_separated(&mut self, close: TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        if self.check(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let text = token.text(self.source);

        let kind = match token.kind {
            TokenKind::Int => {
                let value = text.parse::<i64>().map_err(|_| ParseError::IntegerOverflow {
                    text: text.to_string(),
                    span: token.span,
                })?;
                ExprKind::Literal(Literal::Int(value))
            }
            TokenKind::Float => {
                let value = text.parse::<f64>().map_err(|_| ParseError::Unexpected {
                    expected: "float literal".into(),
                    found: format!("`{}`", text),
                    span: token.span,
                })?;
                ExprKind::Literal(Literal::Float(value))
            }
            TokenKind::String => ExprKind::Literal(Literal::String(unescape(text, token.span)?)),
            TokenKind::True => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::False => ExprKind::Literal(Literal::Bool(false)),
            TokenKind::Null => ExprKind::Literal(Literal::Null),
            TokenKind::Ident => ExprKind::Ident(text.to_string()),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let end = self.expect(TokenKind::RParen)?.span;
                return Ok(Expr::new(inner.kind, token.span.merge(end)));
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_comma_separated(TokenKind::RBracket)?;
                let end = self.expect(TokenKind::RBracket)?.span;
                return self.node(ExprKind::List(items), token.span.merge(end));
            }
            TokenKind::Error => {
                return Err(ParseError::InvalidToken {
                    text: text.to_string(),
                    span: token.span,
                })
            }
            _ => return Err(self.unexpected("expression")),
        };

        self.advance();
        Ok(Expr::new(kind, token.span))
    }

    // ===== Node construction =====

    /// Build a node, rejecting trees too tall to walk safely
    fn node(&self, kind: ExprKind, span: Span) -> Result<Expr, ParseError> {
        let expr = Expr::new(kind, span);
        if expr.height() > MAX_HEIGHT {
            return Err(ParseError::TooDeep { span });
        }
        Ok(expr)
    }

    fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, ParseError> {
        let span = left.span.merge(right.span);
        self.node(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    // ===== Token helpers =====

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn peek_span(&self) -> Span {
        self.peek().span
    }

    fn previous_span(&self) -> Span {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    /// Identifier or keyword after `.`, so `xs.any()` is a method call
    fn expect_member_name(&mut self) -> Result<Token, ParseError> {
        if self.peek_kind().is_keyword() {
            Ok(self.advance())
        } else {
            self.expect(TokenKind::Ident)
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(token.text(self.source).to_string())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Error {
            return ParseError::InvalidToken {
                text: token.text(self.source).to_string(),
                span: token.span,
            };
        }
        let found = match token.kind {
            TokenKind::Eof => token.kind.describe().to_string(),
            _ => format!("`{}`", token.text(self.source)),
        };
        ParseError::Unexpected {
            expected: expected.to_string(),
            found,
            span: token.span,
        }
    }
}

/// Strip quotes and resolve escapes of a string literal token
fn unescape(text: &str, span: Span) -> Result<String, ParseError> {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(ParseError::InvalidEscape { ch: other, span }),
            None => return Err(ParseError::InvalidEscape { ch: ' ', span }),
        }
    }

    Ok(out)
}
