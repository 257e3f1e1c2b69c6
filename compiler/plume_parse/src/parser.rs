//! Parser core and the expression grammar.
//!
//! Precedence ladder, loosest first: cast (`as`), boolean, comparison,
//! addition, multiplication, dispatch (`.`), value. One generic
//! left-associating routine drives every binary level; operators are kept
//! as their spellings, never interpreted — meaning is resolved downstream
//! as a method call.

use std::rc::Rc;

use plume_ir::{Binding, Expr, ExprKind, Name, SharedInterner, Token, TokenKind};
use plume_lexer::Lexer;

use crate::error::{ParseError, SyntaxErrorKind};

/// Result alias for parsing.
pub type ParseResult<T> = Result<T, ParseError>;

const ASSIGNMENT_OPERATORS: &[TokenKind] = &[
    TokenKind::Equal,
    TokenKind::PlusEqual,
    TokenKind::MinusEqual,
    TokenKind::TimesEqual,
    TokenKind::DivEqual,
    TokenKind::ModuloEqual,
];

const UNARY_OPERATORS: &[TokenKind] = &[
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Times,
    TokenKind::Div,
    TokenKind::Modulo,
    TokenKind::Tilde,
    TokenKind::Dollar,
    TokenKind::Caret,
];

/// Recursive-descent parser over a [`Lexer`].
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) current: Token,
    pub(crate) interner: SharedInterner,
}

impl Parser {
    /// Create a parser and pull the first token.
    pub fn new(input: &str, interner: SharedInterner) -> ParseResult<Self> {
        let mut lexer = Lexer::new(input, interner.clone());
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            interner,
        })
    }

    /// Parse one full expression.
    pub fn parse_expression(&mut self) -> ParseResult<Rc<Expr>> {
        self.parse_cast()
    }

    // === Precedence ladder ===

    fn parse_cast(&mut self) -> ParseResult<Rc<Expr>> {
        let mut expression = self.parse_boolean_expression()?;
        while self.accept(TokenKind::As)? {
            self.expect(TokenKind::As)?;
            let class = self.expect(TokenKind::Identifier)?.value;
            let pos = expression.pos;
            expression = Expr::shared(
                ExprKind::Cast {
                    object: expression,
                    class,
                },
                pos,
            );
        }
        Ok(expression)
    }

    fn parse_boolean_expression(&mut self) -> ParseResult<Rc<Expr>> {
        self.parse_binary(
            Parser::accept_boolean_operator,
            Parser::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> ParseResult<Rc<Expr>> {
        self.parse_binary(
            Parser::accept_comparison_operator,
            Parser::parse_addition,
        )
    }

    fn parse_addition(&mut self) -> ParseResult<Rc<Expr>> {
        self.parse_binary(
            Parser::accept_additive_operator,
            Parser::parse_multiplication,
        )
    }

    fn parse_multiplication(&mut self) -> ParseResult<Rc<Expr>> {
        self.parse_binary(
            Parser::accept_multiplicative_operator,
            Parser::parse_dispatch,
        )
    }

    /// One routine for every binary level: `branch (OP branch)*`,
    /// left-associating.
    fn parse_binary(
        &mut self,
        accept_operator: fn(&mut Parser) -> ParseResult<bool>,
        parse_branch: fn(&mut Parser) -> ParseResult<Rc<Expr>>,
    ) -> ParseResult<Rc<Expr>> {
        let mut expression = parse_branch(self)?;
        while accept_operator(self)? {
            let operator = self.current.value;
            self.advance()?;

            let right = parse_branch(self)?;
            let pos = expression.pos;
            expression = Expr::shared(
                ExprKind::Binary {
                    operator,
                    left: expression,
                    right,
                },
                pos,
            );
        }
        Ok(expression)
    }

    /// Method-call chains: `a.b(1).c(2)` wraps the previous expression as
    /// the receiver of the next call.
    fn parse_dispatch(&mut self) -> ParseResult<Rc<Expr>> {
        let mut expression = self.parse_value()?;
        while self.accept(TokenKind::Dot)? {
            self.expect(TokenKind::Dot)?;
            let (function, args, pos) = self.parse_call_parts()?;
            expression = Expr::shared(
                ExprKind::Call {
                    receiver: Some(expression),
                    function,
                    args,
                },
                pos,
            );
        }
        Ok(expression)
    }

    // === Atoms ===

    fn parse_value(&mut self) -> ParseResult<Rc<Expr>> {
        if self.accept(TokenKind::EndOfInput)? {
            return Err(ParseError::syntax(
                SyntaxErrorKind::IncompleteInput,
                self.current.pos,
            ));
        }

        let token = self.current;
        let pos = token.pos;

        if self.accept(TokenKind::Integer)? {
            let value = self.expect(TokenKind::Integer)?.value;
            return Ok(Expr::shared(ExprKind::Integer(value), pos));
        }
        if self.accept(TokenKind::Decimal)? {
            let value = self.expect(TokenKind::Decimal)?.value;
            return Ok(Expr::shared(ExprKind::Decimal(value), pos));
        }
        if self.accept(TokenKind::Str)? {
            let value = self.expect(TokenKind::Str)?.value;
            return Ok(Expr::shared(ExprKind::Str(value), pos));
        }
        if self.accept(TokenKind::Null)? {
            self.expect(TokenKind::Null)?;
            return Ok(Expr::shared(ExprKind::Null, pos));
        }
        if self.accept(TokenKind::True)? || self.accept(TokenKind::False)? {
            let value = self.current.kind == TokenKind::True;
            self.advance()?;
            return Ok(Expr::shared(ExprKind::Boolean(value), pos));
        }
        if self.accept(TokenKind::If)? {
            return self.parse_if_else();
        }
        if self.accept(TokenKind::While)? {
            return self.parse_while();
        }
        if self.accept(TokenKind::Let)? {
            return self.parse_let();
        }
        if self.accept(TokenKind::LeftBrace)? {
            return self.parse_block();
        }
        if self.accept(TokenKind::New)? {
            return self.parse_constructor_call();
        }
        if self.accept(TokenKind::This)? {
            self.expect(TokenKind::This)?;
            return Ok(Expr::shared(ExprKind::This, pos));
        }
        if self.accept(TokenKind::Super)? {
            return self.parse_super_call();
        }
        if self.accept_one_of(UNARY_OPERATORS)? {
            let operator = self.current.value;
            self.advance()?;
            let operand = self.parse_value()?;
            return Ok(Expr::shared(ExprKind::Unary { operator, operand }, pos));
        }
        if self.accept(TokenKind::Not)? {
            let operator = self.current.value;
            self.expect(TokenKind::Not)?;
            let operand = self.parse_expression()?;
            return Ok(Expr::shared(ExprKind::Unary { operator, operand }, pos));
        }
        if self.accept(TokenKind::LeftParen)? {
            self.expect(TokenKind::LeftParen)?;
            let expression = self.parse_expression()?;
            self.expect(TokenKind::RightParen)?;
            return Ok(expression);
        }
        if self.accept(TokenKind::Identifier)? {
            // One-token pushback decides: assignment, call, or reference.
            let lookahead = self.lexer.lookahead()?;
            if ASSIGNMENT_OPERATORS.contains(&lookahead.kind) {
                return self.parse_assignment();
            }
            if lookahead.kind == TokenKind::LeftParen {
                let (function, args, call_pos) = self.parse_call_parts()?;
                return Ok(Expr::shared(
                    ExprKind::Call {
                        receiver: None,
                        function,
                        args,
                    },
                    call_pos,
                ));
            }
            let name = self.expect(TokenKind::Identifier)?.value;
            return Ok(Expr::shared(ExprKind::Reference(name), pos));
        }

        Err(ParseError::syntax(
            SyntaxErrorKind::Unexpected {
                found: token.display_value(&self.interner),
            },
            pos,
        ))
    }

    // === Composite expressions ===

    fn parse_if_else(&mut self) -> ParseResult<Rc<Expr>> {
        let pos = self.current.pos;
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;

        let then_branch = self.parse_expression()?;

        let else_branch = if self.accept(TokenKind::Else)? {
            self.expect(TokenKind::Else)?;
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Expr::shared(
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            },
            pos,
        ))
    }

    fn parse_while(&mut self) -> ParseResult<Rc<Expr>> {
        let pos = self.current.pos;
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_expression()?;
        Ok(Expr::shared(ExprKind::While { condition, body }, pos))
    }

    fn parse_let(&mut self) -> ParseResult<Rc<Expr>> {
        let pos = self.current.pos;
        self.expect(TokenKind::Let)?;
        let bindings = self.parse_initializations()?;
        self.expect(TokenKind::In)?;
        let body = self.parse_expression()?;
        Ok(Expr::shared(ExprKind::Let { bindings, body }, pos))
    }

    fn parse_initializations(&mut self) -> ParseResult<Vec<Binding>> {
        let mut bindings = Vec::new();
        loop {
            if self.accept(TokenKind::Comma)? {
                self.expect(TokenKind::Comma)?;
            }

            let token = self.expect(TokenKind::Identifier)?;

            let declared = if self.accept(TokenKind::Colon)? {
                self.expect(TokenKind::Colon)?;
                Some(self.expect(TokenKind::Identifier)?.value)
            } else {
                None
            };

            let value = if self.accept(TokenKind::Equal)? {
                self.expect(TokenKind::Equal)?;
                Some(self.parse_expression()?)
            } else {
                None
            };

            bindings.push(Binding {
                name: token.value,
                declared,
                ty: plume_ir::TypeSlot::new(),
                value,
                pos: token.pos,
            });

            if !self.accept(TokenKind::Comma)? {
                break;
            }
        }
        Ok(bindings)
    }

    fn parse_block(&mut self) -> ParseResult<Rc<Expr>> {
        let pos = self.current.pos;
        self.expect(TokenKind::LeftBrace)?;

        let mut expressions = Vec::new();
        while !self.accept(TokenKind::RightBrace)? {
            expressions.push(self.parse_expression()?);
        }

        self.expect(TokenKind::RightBrace)?;
        Ok(Expr::shared(ExprKind::Block(expressions), pos))
    }

    fn parse_constructor_call(&mut self) -> ParseResult<Rc<Expr>> {
        let pos = self.current.pos;
        self.expect(TokenKind::New)?;
        let class = self.expect(TokenKind::Identifier)?.value;
        let args = self.parse_actuals()?;
        Ok(Expr::shared(ExprKind::ConstructorCall { class, args }, pos))
    }

    fn parse_super_call(&mut self) -> ParseResult<Rc<Expr>> {
        let pos = self.current.pos;
        self.expect(TokenKind::Super)?;
        self.expect(TokenKind::Dot)?;
        let (function, args, _) = self.parse_call_parts()?;
        Ok(Expr::shared(ExprKind::SuperCall { function, args }, pos))
    }

    fn parse_assignment(&mut self) -> ParseResult<Rc<Expr>> {
        let token = self.expect(TokenKind::Identifier)?;
        let operator = self.current.value;
        self.advance()?;
        let value = self.parse_expression()?;
        Ok(Expr::shared(
            ExprKind::Assignment {
                target: token.value,
                operator,
                value,
            },
            token.pos,
        ))
    }

    /// `name(actuals)` — the name may be an operator spelling, which is how
    /// symbolic methods are called explicitly.
    pub(crate) fn parse_call_parts(&mut self) -> ParseResult<(Name, Vec<Rc<Expr>>, plume_ir::Pos)> {
        let token = if self.accept(TokenKind::Identifier)? {
            self.expect(TokenKind::Identifier)?
        } else {
            let token = self.current;
            self.advance()?;
            token
        };

        let args = self.parse_actuals()?;
        Ok((token.value, args, token.pos))
    }

    pub(crate) fn parse_actuals(&mut self) -> ParseResult<Vec<Rc<Expr>>> {
        self.expect(TokenKind::LeftParen)?;

        let mut actuals = Vec::new();
        if !self.accept(TokenKind::RightParen)? {
            loop {
                if self.accept(TokenKind::Comma)? {
                    self.expect(TokenKind::Comma)?;
                }
                actuals.push(self.parse_expression()?);
                if !self.accept(TokenKind::Comma)? {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok(actuals)
    }

    // === Token plumbing ===

    pub(crate) fn advance(&mut self) -> ParseResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Whether the current token has the given kind. Newlines before it are
    /// discarded unless a newline itself is asked for.
    pub(crate) fn accept(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if kind != TokenKind::Newline {
            self.discard_newlines()?;
        }
        if kind != TokenKind::EndOfInput && self.current.kind == TokenKind::EndOfInput {
            return Ok(false);
        }
        Ok(self.current.kind == kind)
    }

    pub(crate) fn accept_one_of(&mut self, kinds: &[TokenKind]) -> ParseResult<bool> {
        if !kinds.contains(&TokenKind::Newline) {
            self.discard_newlines()?;
        }
        if self.current.kind == TokenKind::EndOfInput {
            return Ok(false);
        }
        Ok(kinds.contains(&self.current.kind))
    }

    /// Consume the current token, which must have the given kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if kind != TokenKind::Newline {
            self.discard_newlines()?;
        }

        let token = self.current;
        if kind != TokenKind::EndOfInput && token.kind == TokenKind::EndOfInput {
            return Err(ParseError::syntax(
                SyntaxErrorKind::UnexpectedEndOfInput {
                    expected: expected_name(kind).to_owned(),
                },
                token.pos,
            ));
        }
        if token.kind != kind {
            return Err(ParseError::syntax(
                SyntaxErrorKind::UnexpectedToken {
                    expected: expected_name(kind).to_owned(),
                    found: token.display_value(&self.interner),
                },
                token.pos,
            ));
        }

        self.advance()?;
        Ok(token)
    }

    pub(crate) fn discard_newlines(&mut self) -> ParseResult<()> {
        while self.current.kind == TokenKind::Newline {
            self.advance()?;
        }
        Ok(())
    }

    // === Operator accept sets ===

    pub(crate) fn accept_operator(&mut self) -> ParseResult<bool> {
        Ok(self.accept_additive_operator()?
            || self.accept_comparison_operator()?
            || self.accept_multiplicative_operator()?
            || self.accept_boolean_operator()?
            || self.accept_other_operator()?)
    }

    fn accept_additive_operator(&mut self) -> ParseResult<bool> {
        self.accept_one_of(&[TokenKind::Plus, TokenKind::Minus])
    }

    fn accept_multiplicative_operator(&mut self) -> ParseResult<bool> {
        self.accept_one_of(&[TokenKind::Times, TokenKind::Div, TokenKind::Modulo])
    }

    fn accept_comparison_operator(&mut self) -> ParseResult<bool> {
        self.accept_one_of(&[
            TokenKind::Less,
            TokenKind::LessOrEqual,
            TokenKind::Greater,
            TokenKind::GreaterOrEqual,
            TokenKind::DoubleEqual,
            TokenKind::NotEqual,
        ])
    }

    fn accept_boolean_operator(&mut self) -> ParseResult<bool> {
        self.accept_one_of(&[
            TokenKind::And,
            TokenKind::Or,
            TokenKind::DoubleEqual,
            TokenKind::NotEqual,
        ])
    }

    fn accept_other_operator(&mut self) -> ParseResult<bool> {
        self.accept_one_of(&[
            TokenKind::Tilde,
            TokenKind::TildeEqual,
            TokenKind::Dollar,
            TokenKind::DollarEqual,
            TokenKind::Caret,
            TokenKind::CaretEqual,
        ])
    }
}

/// Human-readable name for an expected token kind.
fn expected_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Identifier => "identifier",
        TokenKind::Integer => "integer literal",
        TokenKind::Decimal => "decimal literal",
        TokenKind::Str => "string literal",
        other => other.fixed_lexeme().unwrap_or("token"),
    }
}
