// ABOUTME: Recursive-descent, precedence-climbing parser: tokens to a Module AST

use crate::ast::*;
use crate::error::{catalog, UmbraError};
use crate::token::{Token, TokenKind};
use crate::types::TypeTag;
use crate::value::Value;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

type PResult<T> = Result<T, UmbraError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    pub fn parse(mut self) -> PResult<Module> {
        let mut declarations = Vec::new();
        while !self.is_at_eof() {
            declarations.push(self.declaration()?);
        }
        Ok(Module { declarations })
    }

    // -- token-stream primitives, in the shape of a classic recursive-descent parser --

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1].clone()
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_eof() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_eof() && self.peek().kind == kind
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        for &k in kinds {
            if self.check(k) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek().clone();
            Err(UmbraError::syntax(
                "SY006",
                catalog::SY006_EXPECTED_TOKEN,
                &[expected, &found.kind.to_string()],
                found.location,
            ))
        }
    }

    fn expect_expression_error(&self) -> UmbraError {
        let found = self.peek().clone();
        UmbraError::syntax(
            "SY006",
            catalog::SY006_EXPECTED_TOKEN,
            &["expression", &found.kind.to_string()],
            found.location,
        )
    }

    // -- declarations and statements --

    fn declaration(&mut self) -> PResult<Stmt> {
        match self.peek().kind {
            TokenKind::Def => self.function_decl(),
            TokenKind::Const => {
                self.advance();
                if self.check(TokenKind::LeftBracket) {
                    self.array_destructuring(false)
                } else {
                    self.var_decl(false)
                }
            }
            TokenKind::Mut => {
                self.advance();
                if self.check(TokenKind::LeftBracket) {
                    self.array_destructuring(true)
                } else {
                    self.var_decl(true)
                }
            }
            _ => self.statement(),
        }
    }

    fn parse_type_annotation(&mut self) -> PResult<TypeAnnotation> {
        let tok = self.advance();
        if let Some(tag) = TypeTag::from_token(tok.kind) {
            Ok(TypeAnnotation::primitive(tag))
        } else if tok.kind == TokenKind::Identifier {
            Ok(TypeAnnotation::named(tok.lexeme))
        } else {
            Err(UmbraError::syntax(
                "SY006",
                catalog::SY006_EXPECTED_TOKEN,
                &["type", &tok.kind.to_string()],
                tok.location,
            ))
        }
    }

    /// Parses an optional return-type annotation; absent (next token is
    /// `{`) means `void`.
    fn parse_optional_return_type(&mut self) -> PResult<TypeAnnotation> {
        if self.check(TokenKind::LeftBrace) {
            Ok(TypeAnnotation::primitive(TypeTag::Void))
        } else {
            self.parse_type_annotation()
        }
    }

    fn var_decl(&mut self, mutable: bool) -> PResult<Stmt> {
        let name_tok = self.consume(TokenKind::Identifier, "variable name")?;
        let declared_type = if self.check(TokenKind::Equal) {
            TypeAnnotation::primitive(TypeTag::Any)
        } else {
            self.parse_type_annotation()?
        };
        let initializer = if self.match_any(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        let nullable = matches!(
            &initializer,
            Some(Expr::Literal {
                value: Value::Null,
                ..
            })
        );
        Ok(Stmt::Var {
            declarator: VarDeclarator {
                name: name_tok.lexeme,
                declared_type,
                nullable,
                mutable,
            },
            initializer,
        })
    }

    fn array_destructuring(&mut self, mutable: bool) -> PResult<Stmt> {
        self.consume(TokenKind::LeftBracket, "'['")?;
        let mut declarators = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                let name_tok = self.consume(TokenKind::Identifier, "variable name")?;
                declarators.push(VarDeclarator {
                    name: name_tok.lexeme,
                    declared_type: TypeAnnotation::primitive(TypeTag::Any),
                    nullable: false,
                    mutable,
                });
                if !self.match_any(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBracket, "']'")?;
        self.consume(TokenKind::Equal, "'='")?;
        let source = self.expression()?;
        Ok(Stmt::ArrayDestructuring {
            declarators,
            source,
        })
    }

    fn function_decl(&mut self) -> PResult<Stmt> {
        self.advance(); // 'def'
        let name_tok = self.consume(TokenKind::Identifier, "function name")?;
        self.consume(TokenKind::LeftParen, "'('")?;
        let params = self.parse_params(TokenKind::RightParen)?;
        self.consume(TokenKind::RightParen, "')'")?;
        let return_type = self.parse_optional_return_type()?;
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let body = self.block_statements()?;
        let function = Expr::Function {
            name: Some(name_tok.lexeme.clone()),
            params,
            return_type,
            nullable_return: false,
            body,
        };
        Ok(Stmt::FunctionDecl {
            name: name_tok.lexeme,
            function,
        })
    }

    fn parse_params(&mut self, closing: TokenKind) -> PResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(closing) {
            return Ok(params);
        }
        loop {
            let variadic = self.match_any(&[TokenKind::Variadic]);
            let name_tok = self.consume(TokenKind::Identifier, "parameter name")?;
            let type_ann = self.parse_type_annotation()?;
            params.push(Param {
                name: name_tok.lexeme,
                type_ann,
                nullable: false,
                variadic,
            });
            if variadic {
                break;
            }
            if !self.match_any(&[TokenKind::Comma]) {
                break;
            }
        }
        Ok(params)
    }

    fn block_statements(&mut self) -> PResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_eof() {
            statements.push(self.declaration()?);
        }
        self.consume(TokenKind::RightBrace, "'}'")?;
        Ok(statements)
    }

    fn statement(&mut self) -> PResult<Stmt> {
        match self.peek().kind {
            TokenKind::For => self.for_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::Stdout | TokenKind::Stderr => self.print_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Break => {
                let loc = self.advance().location;
                Ok(Stmt::Break(loc))
            }
            TokenKind::Continue => {
                let loc = self.advance().location;
                Ok(Stmt::Continue(loc))
            }
            TokenKind::Pub => self.public_stmt(),
            TokenKind::Import => self.import_stmt(),
            TokenKind::Enum => self.enum_stmt(),
            TokenKind::Match => self.match_stmt(),
            TokenKind::LeftBrace => {
                self.advance();
                Ok(Stmt::Block(self.block_statements()?))
            }
            _ => self.expr_stmt(),
        }
    }

    fn if_stmt(&mut self) -> PResult<Stmt> {
        self.advance(); // 'if'
        let condition = self.expression()?;
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let then_branch = Box::new(Stmt::Block(self.block_statements()?));
        let else_branch = if self.match_any(&[TokenKind::Else]) {
            if self.check(TokenKind::If) {
                Some(Box::new(self.if_stmt()?))
            } else {
                self.consume(TokenKind::LeftBrace, "'{'")?;
                Some(Box::new(Stmt::Block(self.block_statements()?)))
            }
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn for_stmt(&mut self) -> PResult<Stmt> {
        self.advance(); // 'for'
        if self.check(TokenKind::Const) || self.check(TokenKind::Mut) {
            let mutable = self.check(TokenKind::Mut);
            self.advance();
            let name_tok = self.consume(TokenKind::Identifier, "loop variable name")?;
            let declared_type = self.parse_type_annotation()?;
            self.consume(TokenKind::Equal, "'='")?;
            let init_expr = self.expression()?;
            self.consume(TokenKind::Comma, "','")?;
            let stop = self.expression()?;
            let step = if self.match_any(&[TokenKind::Comma]) {
                Some(self.expression()?)
            } else {
                None
            };
            self.consume(TokenKind::LeftBrace, "'{'")?;
            let body = Box::new(Stmt::Block(self.block_statements()?));
            let init = Box::new(Stmt::Var {
                declarator: VarDeclarator {
                    name: name_tok.lexeme,
                    declared_type,
                    nullable: false,
                    mutable,
                },
                initializer: Some(init_expr),
            });
            Ok(Stmt::InitializedFor {
                init,
                stop,
                step,
                body,
            })
        } else {
            let condition = if !self.check(TokenKind::LeftBrace) {
                Some(self.expression()?)
            } else {
                None
            };
            self.consume(TokenKind::LeftBrace, "'{'")?;
            let body = Box::new(Stmt::Block(self.block_statements()?));
            Ok(Stmt::ConditionalFor { condition, body })
        }
    }

    fn print_stmt(&mut self) -> PResult<Stmt> {
        let tok = self.advance();
        let channel = if tok.kind == TokenKind::Stdout {
            Channel::Stdout
        } else {
            Channel::Stderr
        };
        let expr = self.expression()?;
        Ok(Stmt::Print { expr, channel })
    }

    fn return_stmt(&mut self) -> PResult<Stmt> {
        let location = self.advance().location;
        let value = if self.check(TokenKind::RightBrace) || self.is_at_eof() {
            None
        } else {
            Some(self.expression()?)
        };
        Ok(Stmt::Return { value, location })
    }

    fn public_stmt(&mut self) -> PResult<Stmt> {
        let location = self.advance().location;
        let names = if self.match_any(&[TokenKind::LeftBrace]) {
            let mut names = Vec::new();
            if !self.check(TokenKind::RightBrace) {
                loop {
                    names.push(self.consume(TokenKind::Identifier, "identifier")?.lexeme);
                    if !self.match_any(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightBrace, "'}'")?;
            names
        } else {
            vec![self.consume(TokenKind::Identifier, "identifier")?.lexeme]
        };
        Ok(Stmt::Public { names, location })
    }

    fn import_stmt(&mut self) -> PResult<Stmt> {
        let location = self.advance().location;
        let path_tok = self.consume(TokenKind::String, "module path string")?;
        Ok(Stmt::Import {
            path: path_tok.lexeme,
            location,
        })
    }

    fn enum_stmt(&mut self) -> PResult<Stmt> {
        self.advance(); // 'enum'
        let name_tok = self.consume(TokenKind::Identifier, "enum name")?;
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_eof() {
            let member_tok = self.consume(TokenKind::Identifier, "enum member name")?;
            let arg_types = if self.match_any(&[TokenKind::LeftParen]) {
                let mut types = Vec::new();
                if !self.check(TokenKind::RightParen) {
                    loop {
                        types.push(self.parse_type_annotation()?);
                        if !self.match_any(&[TokenKind::Comma]) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RightParen, "')'")?;
                types
            } else {
                Vec::new()
            };
            members.push((member_tok.lexeme, arg_types));
        }
        self.consume(TokenKind::RightBrace, "'}'")?;
        Ok(Stmt::Enum {
            name: name_tok.lexeme,
            members,
        })
    }

    fn match_stmt(&mut self) -> PResult<Stmt> {
        self.advance(); // 'match'
        let scrutinee = self.expression()?;
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let mut cases = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_eof() {
            let pattern = self.call()?;
            let handler = self.primary()?;
            cases.push(MatchCase { pattern, handler });
        }
        self.consume(TokenKind::RightBrace, "'}'")?;
        Ok(Stmt::Match { scrutinee, cases })
    }

    fn expr_stmt(&mut self) -> PResult<Stmt> {
        Ok(Stmt::Expression(self.expression()?))
    }

    // -- expressions, descending precedence --

    fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.or_expr()?;
        if self.match_any(&[TokenKind::Equal, TokenKind::PlusEqual, TokenKind::MinusEqual]) {
            let op_tok = self.previous();
            if !matches!(expr, Expr::Variable { .. } | Expr::Member { .. }) {
                return Err(UmbraError::syntax(
                    "SY007",
                    catalog::SY007_INVALID_LVALUE,
                    &[],
                    op_tok.location,
                ));
            }
            let value = self.assignment()?;
            let desugared = match op_tok.kind {
                TokenKind::Equal => value,
                TokenKind::PlusEqual => Expr::Binary {
                    left: Box::new(expr.clone()),
                    op: BinaryOp::Add,
                    right: Box::new(value),
                    location: op_tok.location,
                },
                TokenKind::MinusEqual => Expr::Binary {
                    left: Box::new(expr.clone()),
                    op: BinaryOp::Sub,
                    right: Box::new(value),
                    location: op_tok.location,
                },
                _ => unreachable!(),
            };
            return Ok(Expr::Assign {
                target: Box::new(expr),
                value: Box::new(desugared),
                location: op_tok.location,
            });
        }
        Ok(expr)
    }

    fn or_expr(&mut self) -> PResult<Expr> {
        let mut expr = self.and_expr()?;
        while self.match_any(&[TokenKind::Or]) {
            let right = self.and_expr()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> PResult<Expr> {
        let mut expr = self.equality()?;
        while self.match_any(&[TokenKind::And]) {
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op: LogicalOp::And,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> PResult<Expr> {
        let mut expr = self.comparison()?;
        while self.match_any(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let op_tok = self.previous();
            let op = if op_tok.kind == TokenKind::BangEqual {
                BinaryOp::NotEq
            } else {
                BinaryOp::Eq
            };
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                location: op_tok.location,
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> PResult<Expr> {
        let mut expr = self.addition()?;
        while self.match_any(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let op_tok = self.previous();
            let op = match op_tok.kind {
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEq,
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEq,
                _ => unreachable!(),
            };
            let right = self.addition()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                location: op_tok.location,
            };
        }
        Ok(expr)
    }

    fn addition(&mut self) -> PResult<Expr> {
        let mut expr = self.multiplication()?;
        while self.match_any(&[TokenKind::Plus, TokenKind::Minus]) {
            let op_tok = self.previous();
            let op = if op_tok.kind == TokenKind::Plus {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            let right = self.multiplication()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                location: op_tok.location,
            };
        }
        Ok(expr)
    }

    fn multiplication(&mut self) -> PResult<Expr> {
        let mut expr = self.is_expr()?;
        while self.match_any(&[
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Enumof,
        ]) {
            let op_tok = self.previous();
            let op = match op_tok.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                TokenKind::Enumof => BinaryOp::EnumOf,
                _ => unreachable!(),
            };
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                location: op_tok.location,
            };
        }
        Ok(expr)
    }

    fn is_expr(&mut self) -> PResult<Expr> {
        let mut expr = self.unary()?;
        while self.match_any(&[TokenKind::Is]) {
            let location = self.previous().location;
            let type_ann = self.parse_type_annotation()?;
            expr = Expr::Is {
                operand: Box::new(expr),
                type_ann,
                location,
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> PResult<Expr> {
        if self.match_any(&[
            TokenKind::Not,
            TokenKind::Minus,
            TokenKind::Tilde,
            TokenKind::Range,
            TokenKind::Typeof,
        ]) {
            let op_tok = self.previous();
            let op = match op_tok.kind {
                TokenKind::Not => UnaryOp::Not,
                TokenKind::Minus => UnaryOp::Neg,
                TokenKind::Tilde => UnaryOp::Length,
                TokenKind::Range => UnaryOp::Range,
                TokenKind::Typeof => UnaryOp::Typeof,
                _ => unreachable!(),
            };
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                location: op_tok.location,
            });
        }
        self.call()
    }

    fn call(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.match_any(&[TokenKind::LeftParen]) {
                let location = self.previous().location;
                let mut args = Vec::new();
                if !self.check(TokenKind::RightParen) {
                    loop {
                        args.push(self.expression()?);
                        if !self.match_any(&[TokenKind::Comma]) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RightParen, "')'")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    location,
                };
            } else if self.match_any(&[TokenKind::Dot]) {
                let location = self.previous().location;
                let ident = self.consume(TokenKind::Identifier, "property name")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: MemberProperty::Name(ident.lexeme),
                    location,
                };
            } else if self.match_any(&[TokenKind::LeftBracket]) {
                let location = self.previous().location;
                let index = self.expression()?;
                self.consume(TokenKind::RightBracket, "']'")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: MemberProperty::Computed(Box::new(index)),
                    location,
                };
            } else if self.match_any(&[TokenKind::DoubleColon]) {
                let location = self.previous().location;
                let ident = self.consume(TokenKind::Identifier, "namespace member name")?;
                match expr {
                    Expr::Variable { name, .. } => {
                        expr = Expr::NamespaceMember {
                            namespace: name,
                            property: ident.lexeme,
                            location,
                        };
                    }
                    _ => {
                        return Err(UmbraError::syntax(
                            "SY006",
                            catalog::SY006_EXPECTED_TOKEN,
                            &["namespace identifier", "expression"],
                            location,
                        ))
                    }
                }
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal {
                    value: Value::Bool(true),
                    lexeme: tok.lexeme,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal {
                    value: Value::Bool(false),
                    lexeme: tok.lexeme,
                })
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal {
                    value: Value::Null,
                    lexeme: tok.lexeme,
                })
            }
            TokenKind::NaN => {
                self.advance();
                Ok(Expr::Literal {
                    value: Value::Number(f64::NAN),
                    lexeme: tok.lexeme,
                })
            }
            TokenKind::Numeric => {
                self.advance();
                let n: f64 = tok.lexeme.parse().map_err(|_| {
                    UmbraError::syntax(
                        "SY005",
                        catalog::SY005_MALFORMED_NUMBER,
                        &[&tok.lexeme],
                        tok.location,
                    )
                })?;
                Ok(Expr::Literal {
                    value: Value::Number(n),
                    lexeme: tok.lexeme,
                })
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Literal {
                    value: Value::Str(tok.lexeme.clone()),
                    lexeme: tok.lexeme,
                })
            }
            TokenKind::Char => {
                self.advance();
                let c = tok.lexeme.chars().next().unwrap_or('\0');
                Ok(Expr::Literal {
                    value: Value::Char(c),
                    lexeme: tok.lexeme,
                })
            }
            TokenKind::Identifier | TokenKind::This => {
                self.advance();
                Ok(Expr::Variable {
                    name: tok.lexeme,
                    location: tok.location,
                })
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "')'")?;
                Ok(Expr::Grouping(Box::new(expr)))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenKind::RightBracket) {
                    loop {
                        elements.push(self.expression()?);
                        if !self.match_any(&[TokenKind::Comma]) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RightBracket, "']'")?;
                Ok(Expr::Array { elements })
            }
            TokenKind::LeftBrace => {
                self.advance();
                let mut pairs = Vec::new();
                if !self.check(TokenKind::RightBrace) {
                    loop {
                        let key_tok = if self.check(TokenKind::Identifier) || self.check(TokenKind::String) {
                            self.advance()
                        } else {
                            return Err(self.expect_expression_error());
                        };
                        let key = Expr::Literal {
                            value: Value::Str(key_tok.lexeme.clone()),
                            lexeme: key_tok.lexeme,
                        };
                        self.consume(TokenKind::Colon, "':'")?;
                        let value = self.expression()?;
                        pairs.push((key, value));
                        if !self.match_any(&[TokenKind::Comma]) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RightBrace, "'}'")?;
                Ok(Expr::Hashmap { pairs })
            }
            TokenKind::Pipe => {
                self.advance();
                let params = self.parse_params(TokenKind::Pipe)?;
                self.consume(TokenKind::Pipe, "'|'")?;
                let return_type = self.parse_optional_return_type()?;
                self.consume(TokenKind::LeftBrace, "'{'")?;
                let body = self.block_statements()?;
                Ok(Expr::Function {
                    name: None,
                    params,
                    return_type,
                    nullable_return: false,
                    body,
                })
            }
            kind if TypeTag::from_token(kind).is_some() => {
                self.advance();
                let target = TypeAnnotation::primitive(TypeTag::from_token(kind).unwrap());
                self.consume(TokenKind::LeftParen, "'('")?;
                let operand = self.expression()?;
                self.consume(TokenKind::RightParen, "')'")?;
                Ok(Expr::TypeConversion {
                    target,
                    operand: Box::new(operand),
                    location: tok.location,
                })
            }
            _ => Err(self.expect_expression_error()),
        }
    }
}

/// Tokenizes and parses a complete source string into a `Module`.
pub fn parse_source(source: &str) -> PResult<Module> {
    let tokens = crate::lexer::Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Module {
        parse_source(src).unwrap()
    }

    #[test]
    fn test_precedence_addition_multiplication() {
        let module = parse("1 + 2 * 3");
        match &module.declarations[0] {
            Stmt::Expression(Expr::Binary { op: BinaryOp::Add, right, .. }) => {
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected ast: {:?}", other),
        }
    }

    #[test]
    fn test_parser_determinism() {
        let a = parse_source("1 + 2").unwrap();
        let b = parse_source("1 + 2").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_var_decl_with_type() {
        let module = parse("const x num = 1");
        match &module.declarations[0] {
            Stmt::Var { declarator, .. } => {
                assert_eq!(declarator.name, "x");
                assert_eq!(declarator.declared_type.tag, TypeTag::Num);
                assert!(!declarator.mutable);
            }
            other => panic!("unexpected ast: {:?}", other),
        }
    }

    #[test]
    fn test_array_destructuring() {
        let module = parse("const [a, b, c] = [10, 20, 30]");
        match &module.declarations[0] {
            Stmt::ArrayDestructuring { declarators, .. } => {
                assert_eq!(declarators.len(), 3);
            }
            other => panic!("unexpected ast: {:?}", other),
        }
    }

    #[test]
    fn test_function_decl_and_call() {
        let module = parse("def fact(n num) num {\n  return n\n}\nfact(5)");
        assert!(matches!(module.declarations[0], Stmt::FunctionDecl { .. }));
        assert!(matches!(
            module.declarations[1],
            Stmt::Expression(Expr::Call { .. })
        ));
    }

    #[test]
    fn test_invalid_assignment_target_is_syntax_error() {
        let err = parse_source("1 = 2").unwrap_err();
        assert_eq!(err.code(), "SY007");
    }

    #[test]
    fn test_plus_equal_desugars_to_binary_add() {
        let module = parse("mut x num = 1\nx += 2");
        match &module.declarations[1] {
            Stmt::Expression(Expr::Assign { value, .. }) => {
                assert!(matches!(**value, Expr::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("unexpected ast: {:?}", other),
        }
    }

    #[test]
    fn test_enum_and_match_statement_shape() {
        let src = "enum Maybe { Some(num) None }\nconst v = Maybe::Some(42)\nmatch v {\n  Maybe::Some |x num| { stdout x }\n  Maybe::None || { stdout \"nothing\" }\n}";
        let module = parse(src);
        assert!(matches!(module.declarations[0], Stmt::Enum { .. }));
        assert!(matches!(module.declarations[2], Stmt::Match { .. }));
    }

    #[test]
    fn test_initialized_for_loop() {
        let module = parse("for const i num = 0, 3 { stdout i }");
        assert!(matches!(module.declarations[0], Stmt::InitializedFor { .. }));
    }
}
