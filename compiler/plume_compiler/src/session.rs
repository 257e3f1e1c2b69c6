//! The session engine: the core side of the interactive/batch driver
//! boundary.
//!
//! A session owns one class registry shared between its type environment
//! (compile-time view) and its evaluation context (runtime view), one
//! interner, and one receiver instance of the `Predef` class that
//! top-level properties and functions are injected into. There is no line
//! buffering or prompting here; a driver feeds complete top-level units
//! and uses [`Session::try_parse`] to decide when a unit is complete.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::debug;

use plume_eval::{
    evaluate, evaluate_property, force_reference, runtime, to_display_string, Cell, Context, Obj,
    Value,
};
use plume_ir::{builtin, Class, ExprKind, Function, Name, Pos, Property, SharedInterner, TokenKind};
use plume_lexer::Lexer;
use plume_parse::{ParseError, Parser};
use plume_typeck::{checker, TypeEnvironment};
use plume_types::{SharedRegistry, Symbol, TypeError, TypeErrorKind};

use crate::error::SessionError;

/// What [`Session::try_parse`] concluded about a buffered chunk of input.
#[derive(Clone, Debug)]
pub enum ParseOutcome {
    /// The chunk parses as one complete top-level unit.
    Complete,
    /// The chunk is well-formed so far but ended mid-construct; the driver
    /// should buffer more input.
    Incomplete,
    /// The chunk is malformed regardless of further input.
    Invalid(ParseError),
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// An interactive/batch session over one shared registry.
pub struct Session {
    interner: SharedInterner,
    registry: SharedRegistry,
    env: TypeEnvironment,
    ctx: Context,
    /// The installed Predef class's own methods, kept under injected ones.
    predef_base_functions: Vec<Rc<Function>>,
    predef_properties: Vec<Property>,
    predef_functions: Vec<Rc<Function>>,
    predef: Value,
    res_counter: usize,
}

impl Session {
    /// Build a session: install the builtin runtime, bind `Math` and `IO`,
    /// and set up the `Predef` receiver.
    pub fn new() -> SessionResult<Self> {
        let interner = SharedInterner::default();
        let registry = SharedRegistry::new();

        let mut ctx = Context::new(registry.clone(), interner.clone());
        runtime::install(&ctx)?;

        let mut env = TypeEnvironment::new(registry.clone(), interner.clone());
        let predef_class = registry.get(builtin::PREDEF).ok_or_else(|| {
            TypeError::new(
                TypeErrorKind::UndefinedType {
                    name: "Predef".to_owned(),
                },
                Pos::ORIGIN,
            )
        })?;
        env.current_class = Some(Rc::clone(&predef_class));
        env.symbols.enter_scope();
        ctx.environment.borrow_mut().enter_scope();

        let predef = Obj::create(&registry, builtin::PREDEF)?;
        ctx.self_obj = Some(Rc::clone(&predef));

        let mut session = Session {
            interner,
            registry,
            env,
            ctx,
            predef_base_functions: predef_class.functions.clone(),
            predef_properties: Vec::new(),
            predef_functions: Vec::new(),
            predef,
            res_counter: 0,
        };
        session.bind_singleton("Math", builtin::MATH)?;
        session.bind_singleton("IO", builtin::IO)?;
        Ok(session)
    }

    fn bind_singleton(&mut self, spelling: &str, class: Name) -> SessionResult<()> {
        let name = self.interner.intern(spelling);
        let instance = Obj::create(&self.registry, class)?;
        self.env
            .symbols
            .add(Symbol::new(name, Some(class), Pos::ORIGIN));
        let address = self.ctx.store.borrow_mut().alloc(Cell::Value(instance));
        self.ctx.environment.borrow_mut().add(name, address);
        Ok(())
    }

    /// Redirect IO output (a driver or test supplies its own sink).
    pub fn set_output(&mut self, sink: Rc<RefCell<dyn Write>>) {
        self.ctx.output = sink;
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Classify and run one complete top-level unit, returning the line a
    /// driver would echo.
    pub fn execute(&mut self, source: &str) -> SessionResult<String> {
        debug!(len = source.len(), "execute");
        match self.classify(source)? {
            TokenKind::Class | TokenKind::Export => self.define_class(source),
            TokenKind::Var => self.define_property(source),
            TokenKind::Def => self.define_function(source),
            _ => self.eval_expression(source),
        }
    }

    /// Decide whether `source` is a complete top-level unit, without
    /// touching session state.
    pub fn try_parse(&self, source: &str) -> ParseOutcome {
        let attempt = || -> Result<(), ParseError> {
            let kind = match self.classify(source) {
                Ok(kind) => kind,
                Err(SessionError::Parse(e)) => return Err(e),
                Err(_) => return Ok(()),
            };
            let mut parser = Parser::new(source, self.interner.clone())?;
            match kind {
                TokenKind::Class | TokenKind::Export => {
                    parser.parse_class().map(|_| ())
                }
                TokenKind::Var => parser.parse_property().map(|_| ()),
                TokenKind::Def => parser.parse_function().map(|_| ()),
                _ => parser.parse_expression().map(|_| ()),
            }
        };

        match attempt() {
            Ok(()) => ParseOutcome::Complete,
            Err(e) if e.is_incomplete() => ParseOutcome::Incomplete,
            Err(e) => ParseOutcome::Invalid(e),
        }
    }

    /// Consume a module loader's output: register the whole batch, check
    /// every class, and roll all of them back if any fails.
    pub fn load_classes(&mut self, classes: &[Rc<Class>]) -> SessionResult<Vec<String>> {
        let mut registered: Vec<Name> = Vec::new();

        let rollback = |session: &mut Session, registered: &[Name]| {
            for &name in registered {
                session.env.remove_class(name);
            }
        };

        for class in classes {
            if self.env.has_class(class.name) {
                rollback(self, &registered);
                return Err(TypeError::new(
                    TypeErrorKind::DuplicateClass {
                        name: self.interner.resolve(class.name).to_string(),
                    },
                    class.pos,
                )
                .into());
            }
            if let Err(e) = self.env.add_class(Rc::clone(class), class.pos) {
                rollback(self, &registered);
                return Err(e.into());
            }
            registered.push(class.name);
        }

        for class in classes {
            if let Err(e) = checker::check_class(&mut self.env, class) {
                rollback(self, &registered);
                return Err(e.into());
            }
        }

        Ok(classes
            .iter()
            .map(|c| self.interner.resolve(c.name).to_string())
            .collect())
    }

    fn classify(&self, source: &str) -> SessionResult<TokenKind> {
        let mut lexer = Lexer::new(source, self.interner.clone());
        loop {
            let token = lexer.next_token().map_err(ParseError::from)?;
            if token.kind != TokenKind::Newline {
                return Ok(token.kind);
            }
        }
    }

    /// Tentatively register a parsed class, check it, and roll the
    /// registration back if checking fails, so the session's visible state
    /// is unaffected.
    fn define_class(&mut self, source: &str) -> SessionResult<String> {
        let mut parser = Parser::new(source, self.interner.clone())?;
        let class = parser.parse_class()?;
        let name = class.name;

        let previous = self.registry.get(name);
        self.env.add_class(Rc::clone(&class), class.pos)?;

        if let Err(e) = checker::check_class(&mut self.env, &class) {
            match previous {
                Some(previous) => {
                    let _ = self.registry.add(previous, &self.interner, Pos::ORIGIN);
                }
                None => self.env.remove_class(name),
            }
            return Err(e.into());
        }

        Ok(format!("defined class {}", self.interner.resolve(name)))
    }

    fn define_property(&mut self, source: &str) -> SessionResult<String> {
        let mut parser = Parser::new(source, self.interner.clone())?;
        let property = parser.parse_property()?;

        checker::check_property(&mut self.env, &property)?;

        self.predef_properties.push(property.clone());
        self.rebuild_predef()?;

        let value = evaluate_property(&mut self.ctx, &property)?;
        self.predef
            .borrow_mut()
            .set(property.name, Cell::Value(Rc::clone(&value)));

        let rendered = to_display_string(&mut self.ctx, &value)?;
        let ty = property
            .ty
            .get()
            .map(|t| self.interner.resolve(t).to_string())
            .unwrap_or_default();
        Ok(format!(
            "{}: {} = {}",
            self.interner.resolve(property.name),
            ty,
            rendered
        ))
    }

    fn define_function(&mut self, source: &str) -> SessionResult<String> {
        let mut parser = Parser::new(source, self.interner.clone())?;
        let function = parser.parse_function()?;

        // A redefinition replaces the previous same-signature function.
        self.predef_functions
            .retain(|f| !f.same_signature(&function));
        self.predef
            .borrow_mut()
            .remove_method_with_signature(&function);

        self.predef_functions.push(Rc::clone(&function));
        self.rebuild_predef()?;

        if let Err(e) = checker::check_function(&mut self.env, &function) {
            self.predef_functions.pop();
            self.rebuild_predef()?;
            return Err(e.into());
        }

        self.predef.borrow_mut().methods.push(Rc::clone(&function));
        Ok(function.signature(&self.interner))
    }

    fn eval_expression(&mut self, source: &str) -> SessionResult<String> {
        let mut parser = Parser::new(source, self.interner.clone())?;
        let expr = parser.parse_expression()?;

        checker::check_expr(&mut self.env, &expr)?;
        let value = evaluate(&mut self.ctx, &expr)?;

        let (identifier, value) = match &expr.kind {
            ExprKind::Reference(name) => (self.interner.resolve(*name).to_string(), value),
            ExprKind::Assignment { target, .. } => {
                let stored = force_reference(&mut self.ctx, *target, Pos::ORIGIN)?;
                (self.interner.resolve(*target).to_string(), stored)
            }
            _ => {
                let spelling = format!("res{}", self.res_counter);
                self.res_counter += 1;
                let name = self.interner.intern(&spelling);
                let class = value.borrow().class;
                self.env
                    .symbols
                    .add(Symbol::new(name, Some(class), Pos::ORIGIN));
                let address = self
                    .ctx
                    .store
                    .borrow_mut()
                    .alloc(Cell::Value(Rc::clone(&value)));
                self.ctx.environment.borrow_mut().add(name, address);
                (spelling, value)
            }
        };

        let class = value.borrow().class;
        if class == builtin::VOID {
            return Ok(String::new());
        }
        if class == builtin::STRING {
            let payload = value
                .borrow()
                .as_str()
                .map(ToOwned::to_owned)
                .unwrap_or_default();
            return Ok(format!("{identifier}: String = \"{payload}\""));
        }

        let rendered = to_display_string(&mut self.ctx, &value)?;
        Ok(format!(
            "{identifier}: {} = {rendered}",
            self.interner.resolve(class)
        ))
    }

    /// Re-register the Predef class with the session's injected members
    /// and repoint the checker's current class at the rebuilt definition.
    fn rebuild_predef(&mut self) -> SessionResult<()> {
        let mut class = Class::empty(builtin::PREDEF, Some(builtin::OBJECT));
        class.functions = self
            .predef_base_functions
            .iter()
            .chain(self.predef_functions.iter())
            .cloned()
            .collect();
        class.properties = self.predef_properties.clone();

        let class = Rc::new(class);
        self.registry
            .add(Rc::clone(&class), &self.interner, Pos::ORIGIN)
            .map_err(SessionError::Semantic)?;
        self.env.current_class = Some(class);
        Ok(())
    }
}
