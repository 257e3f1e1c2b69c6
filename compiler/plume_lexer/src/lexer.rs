//! The lexer: source text to a token stream.

use plume_ir::{Name, Pos, SharedInterner, Token, TokenKind};

use crate::char_class;
use crate::error::{LexError, LexErrorKind};
use crate::fsm;

/// Result alias for lexing.
pub type LexResult<T> = Result<T, LexError>;

/// Converts source text into [`Token`]s, one at a time.
///
/// Whitespace is skipped; newline is a significant token. A one-token
/// pushback buffer backs [`Lexer::lookahead`]. Any unrecognized symbol
/// raises immediately; there is no recovery.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    buffer: Vec<Token>,
    interner: SharedInterner,
}

impl Lexer {
    /// Create a lexer over `input`, interning through `interner`.
    pub fn new(input: &str, interner: SharedInterner) -> Self {
        Lexer {
            chars: input.chars().collect(),
            position: 0,
            line: 0,
            column: 0,
            buffer: Vec::with_capacity(1),
            interner,
        }
    }

    /// All tokens up to (excluding) end of input.
    pub fn tokenize(&mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.kind == TokenKind::EndOfInput {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// The next token, consuming it.
    pub fn next_token(&mut self) -> LexResult<Token> {
        if let Some(token) = self.buffer.pop() {
            return Ok(token);
        }
        self.read_token()
    }

    /// Peek at the next token without consuming it.
    pub fn lookahead(&mut self) -> LexResult<Token> {
        if let Some(&token) = self.buffer.last() {
            return Ok(token);
        }
        let token = self.read_token()?;
        self.buffer.push(token);
        Ok(token)
    }

    fn read_token(&mut self) -> LexResult<Token> {
        self.skip_whitespace();

        let Some(symbol) = self.current() else {
            return Ok(Token::new(
                TokenKind::EndOfInput,
                Name::EMPTY,
                Pos::new(self.line, self.column),
            ));
        };

        if char_class::is_literal_start(symbol) {
            return self.recognize_literal(symbol);
        }
        if char_class::is_operator(symbol) {
            return self.recognize_operator(symbol);
        }
        if char_class::is_delimiter(symbol) {
            return self.recognize_delimiter(symbol);
        }
        if char_class::is_dot(symbol) {
            let pos = Pos::new(self.line, self.column);
            self.advance(1);
            return Ok(self.fixed(TokenKind::Dot, pos));
        }
        if char_class::is_newline(symbol) {
            let pos = Pos::new(self.line, self.column);
            self.position += 1;
            self.line += 1;
            self.column = 0;
            return Ok(self.fixed(TokenKind::Newline, pos));
        }

        Err(self.unrecognized(symbol))
    }

    fn recognize_literal(&mut self, symbol: char) -> LexResult<Token> {
        if char_class::is_identifier_start(symbol) {
            return Ok(self.recognize_keyword_or_identifier());
        }
        if char_class::is_number_start(symbol) {
            return self.recognize_number();
        }
        if char_class::is_string_delimiter(symbol) {
            return self.recognize_string();
        }
        Err(self.unrecognized(symbol))
    }

    /// Scan a maximal identifier run; it is a keyword only when it exactly
    /// matches a reserved word. The run being maximal is what keeps `to`
    /// from matching as a keyword prefix of `toString`.
    fn recognize_keyword_or_identifier(&mut self) -> Token {
        let mut len = 0;
        while let Some(&c) = self.chars.get(self.position + len) {
            if !char_class::is_identifier_part(c) {
                break;
            }
            len += 1;
        }

        let spelling: String = self.chars[self.position..self.position + len].iter().collect();
        let pos = Pos::new(self.line, self.column);
        self.advance(len);

        let value = self.interner.intern(&spelling);
        let kind = TokenKind::keyword(&spelling).unwrap_or(TokenKind::Identifier);
        Token::new(kind, value, pos)
    }

    fn recognize_number(&mut self) -> LexResult<Token> {
        let outcome = fsm::recognize_number(&self.chars[self.position..]);
        if !outcome.recognized {
            return Err(LexError::new(
                LexErrorKind::MalformedNumber,
                Pos::new(self.line, self.column),
            ));
        }

        // A lone '.' that never became a decimal is the dispatch operator.
        let mut value = outcome.value;
        if value == "." {
            let pos = Pos::new(self.line, self.column);
            self.advance(1);
            return Ok(self.fixed(TokenKind::Dot, pos));
        }

        // "3." consumed a trailing dot the decimal never completed; give the
        // dot back so it can be read as a Dot token.
        if value.ends_with('.') {
            value.pop();
        }

        let pos = Pos::new(self.line, self.column);
        self.advance(value.chars().count());

        let is_decimal = value.chars().any(|c| matches!(c, '.' | 'e' | 'E'));
        let kind = if is_decimal {
            TokenKind::Decimal
        } else {
            TokenKind::Integer
        };
        Ok(Token::new(kind, self.interner.intern(&value), pos))
    }

    fn recognize_string(&mut self) -> LexResult<Token> {
        let outcome = fsm::recognize_string(&self.chars[self.position..]);
        if !outcome.recognized {
            return Err(LexError::new(
                LexErrorKind::MalformedString,
                Pos::new(self.line, self.column),
            ));
        }

        let pos = Pos::new(self.line, self.column);
        self.advance(outcome.value.chars().count());
        Ok(Token::new(
            TokenKind::Str,
            self.interner.intern(&outcome.value),
            pos,
        ))
    }

    fn recognize_delimiter(&mut self, symbol: char) -> LexResult<Token> {
        let pos = Pos::new(self.line, self.column);
        self.advance(1);

        let kind = match symbol {
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            _ => return Err(self.unrecognized(symbol)),
        };
        Ok(self.fixed(kind, pos))
    }

    fn recognize_operator(&mut self, symbol: char) -> LexResult<Token> {
        let lookahead = self.chars.get(self.position + 1).copied();
        let pos = Pos::new(self.line, self.column);

        // `//` opens a line comment: skip to the newline and go again.
        if symbol == '/' && lookahead == Some('/') {
            self.skip_until_newline();
            return self.read_token();
        }

        if let Some(kind) = lookahead.and_then(|la| compound_operator(symbol, la)) {
            self.advance(2);
            return Ok(self.fixed(kind, pos));
        }

        // `&` and `|` exist only doubled; `&=` and `|=` are invalid too.
        let kind = match symbol {
            '=' => TokenKind::Equal,
            '%' => TokenKind::Modulo,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Div,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '!' => TokenKind::Not,
            '~' => TokenKind::Tilde,
            '$' => TokenKind::Dollar,
            '^' => TokenKind::Caret,
            _ => return Err(self.unrecognized(symbol)),
        };
        self.advance(1);
        Ok(self.fixed(kind, pos))
    }

    /// Build a token whose spelling is fixed by its kind.
    fn fixed(&self, kind: TokenKind, pos: Pos) -> Token {
        let value = kind
            .fixed_lexeme()
            .map_or(Name::EMPTY, |lexeme| self.interner.intern(lexeme));
        Token::new(kind, value, pos)
    }

    fn unrecognized(&self, symbol: char) -> LexError {
        LexError::new(
            LexErrorKind::UnrecognizedSymbol { symbol },
            Pos::new(self.line, self.column),
        )
    }

    #[inline]
    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn advance(&mut self, n: usize) {
        self.position += n;
        self.column += n as u32;
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current() {
            if !char_class::is_whitespace(c) {
                break;
            }
            self.advance(1);
        }
    }

    fn skip_until_newline(&mut self) {
        while let Some(c) = self.current() {
            if char_class::is_newline(c) {
                break;
            }
            self.advance(1);
        }
    }
}

/// Two-character operator recognition via one-character lookahead.
fn compound_operator(symbol: char, lookahead: char) -> Option<TokenKind> {
    let kind = match (symbol, lookahead) {
        ('=', '=') => TokenKind::DoubleEqual,
        ('!', '=') => TokenKind::NotEqual,
        ('<', '=') => TokenKind::LessOrEqual,
        ('>', '=') => TokenKind::GreaterOrEqual,
        ('&', '&') => TokenKind::And,
        ('|', '|') => TokenKind::Or,
        ('+', '=') => TokenKind::PlusEqual,
        ('-', '=') => TokenKind::MinusEqual,
        ('*', '=') => TokenKind::TimesEqual,
        ('/', '=') => TokenKind::DivEqual,
        ('%', '=') => TokenKind::ModuloEqual,
        ('<', '-') => TokenKind::LeftArrow,
        ('-', '>') => TokenKind::RightArrow,
        ('~', '=') => TokenKind::TildeEqual,
        ('$', '=') => TokenKind::DollarEqual,
        ('^', '=') => TokenKind::CaretEqual,
        _ => return None,
    };
    Some(kind)
}
