//! Definition grammar: classes, functions, properties, programs.

use std::rc::Rc;

use plume_ir::{builtin, Class, Formal, Function, Program, Property, TokenKind};
use tracing::trace;

use crate::error::{ParseError, SyntaxErrorKind};
use crate::parser::{ParseResult, Parser};

impl Parser {
    /// Parse a whole compilation unit: `[export] class` definitions until
    /// end of input.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        trace!("parse_program");
        let mut classes = Vec::new();
        while !self.accept(TokenKind::EndOfInput)? {
            classes.push(self.parse_class()?);
        }
        Ok(Program::new(classes))
    }

    /// Parse one `[export] class Name[(formals)] [extends Super[(actuals)]]
    /// { body }` definition.
    pub fn parse_class(&mut self) -> ParseResult<Rc<Class>> {
        let exported = if self.accept(TokenKind::Export)? {
            self.expect(TokenKind::Export)?;
            true
        } else {
            false
        };

        let class_token = self.expect(TokenKind::Class)?;
        let name = self.expect(TokenKind::Identifier)?.value;
        trace!(?name, "parse_class");

        let params = if self.accept(TokenKind::LeftParen)? {
            self.parse_formals()?
        } else {
            Vec::new()
        };

        // Without an extends clause every class still sits under Object;
        // only the builtin root itself has no superclass.
        let (superclass, super_args) = if self.accept(TokenKind::Extends)? {
            self.expect(TokenKind::Extends)?;
            let superclass = self.expect(TokenKind::Identifier)?.value;
            let super_args = if self.accept(TokenKind::LeftParen)? {
                self.parse_actuals()?
            } else {
                Vec::new()
            };
            (Some(superclass), super_args)
        } else {
            (Some(builtin::OBJECT), Vec::new())
        };

        let mut properties = Vec::new();
        let mut functions = Vec::new();
        self.parse_class_body(&mut properties, &mut functions)?;

        Ok(Rc::new(Class {
            name,
            params,
            superclass,
            super_args,
            properties,
            functions,
            exported,
            pos: class_token.pos,
        }))
    }

    /// Class bodies accept only property and function declarations.
    fn parse_class_body(
        &mut self,
        properties: &mut Vec<Property>,
        functions: &mut Vec<Rc<Function>>,
    ) -> ParseResult<()> {
        self.expect(TokenKind::LeftBrace)?;

        loop {
            if self.accept(TokenKind::RightBrace)? {
                break;
            }
            if self.accept(TokenKind::Var)? {
                properties.push(self.parse_property()?);
            } else if self.accept(TokenKind::Def)?
                || self.accept(TokenKind::Private)?
                || self.accept(TokenKind::Override)?
            {
                functions.push(self.parse_function()?);
            } else if self.accept(TokenKind::EndOfInput)? {
                return Err(ParseError::syntax(
                    SyntaxErrorKind::IncompleteInput,
                    self.current.pos,
                ));
            } else {
                return Err(ParseError::syntax(
                    SyntaxErrorKind::Unexpected {
                        found: self.current.display_value(&self.interner),
                    },
                    self.current.pos,
                ));
            }
        }

        self.expect(TokenKind::RightBrace)?;
        Ok(())
    }

    /// Parse one `[override|private] def name(formals)[: Type] = body`
    /// definition. The name may be an operator spelling.
    pub fn parse_function(&mut self) -> ParseResult<Rc<Function>> {
        let mut is_override = false;
        let mut is_private = false;

        let mut pos = self.current.pos;
        if self.accept(TokenKind::Override)? {
            pos = self.expect(TokenKind::Override)?.pos;
            is_override = true;
        } else if self.accept(TokenKind::Private)? {
            pos = self.expect(TokenKind::Private)?.pos;
            is_private = true;
        }

        let def_token = self.expect(TokenKind::Def)?;
        if !is_override && !is_private {
            pos = def_token.pos;
        }

        let name = if self.accept(TokenKind::Identifier)? {
            self.expect(TokenKind::Identifier)?.value
        } else if self.accept_operator()? {
            let name = self.current.value;
            self.advance()?;
            name
        } else {
            return Err(ParseError::syntax(
                SyntaxErrorKind::ExpectedFunctionName {
                    found: self.current.display_value(&self.interner),
                },
                pos,
            ));
        };

        let params = self.parse_formals()?;

        let return_type = if self.accept(TokenKind::Colon)? {
            self.expect(TokenKind::Colon)?;
            self.expect(TokenKind::Identifier)?.value
        } else {
            builtin::VOID
        };

        self.expect(TokenKind::Equal)?;
        let body = self.parse_expression()?;

        Ok(Rc::new(Function {
            name,
            params,
            return_type,
            body,
            is_override,
            is_private,
            pos,
        }))
    }

    /// Parse one `var name[: Type] [= value]` declaration.
    pub fn parse_property(&mut self) -> ParseResult<Property> {
        let var_token = self.expect(TokenKind::Var)?;
        let name = self.expect(TokenKind::Identifier)?.value;

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

        Ok(Property::new(name, declared, value, var_token.pos))
    }

    /// `(name: Type, lazy name: Type, ...)`, possibly empty.
    fn parse_formals(&mut self) -> ParseResult<Vec<Formal>> {
        self.expect(TokenKind::LeftParen)?;

        let mut formals = Vec::new();
        if !self.accept(TokenKind::RightParen)? {
            loop {
                if self.accept(TokenKind::Comma)? {
                    self.expect(TokenKind::Comma)?;
                }

                let lazy = if self.accept(TokenKind::Lazy)? {
                    self.expect(TokenKind::Lazy)?;
                    true
                } else {
                    false
                };

                let name_token = self.expect(TokenKind::Identifier)?;
                self.expect(TokenKind::Colon)?;
                let ty = self.expect(TokenKind::Identifier)?.value;

                formals.push(Formal::new(name_token.value, ty, lazy, name_token.pos));

                if !self.accept(TokenKind::Comma)? {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok(formals)
    }
}
