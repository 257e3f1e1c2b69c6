//! Finite-state recognizers for numeric and string literals.
//!
//! Both machines consume input until the first symbol with no transition,
//! then report whether they stopped in a final state and what they consumed.
//! The lexer decides what to do with a rejected or partially-consumed
//! prefix (e.g. reinterpreting a lone `.` as the dispatch operator).

use crate::char_class;

/// What a recognizer consumed, and whether it ended in a final state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FsmOutcome {
    pub recognized: bool,
    pub value: String,
}

/// Drive a transition function from `start` over `input`.
///
/// `transition` returns `None` for an invalid move, which stops the run
/// without consuming the offending symbol.
fn run<S: Copy>(
    start: S,
    input: &[char],
    transition: impl Fn(S, char) -> Option<S>,
    is_final: impl Fn(S) -> bool,
) -> FsmOutcome {
    let mut state = start;
    let mut value = String::new();

    for &symbol in input {
        match transition(state, symbol) {
            Some(next) => {
                state = next;
                value.push(symbol);
            }
            None => break,
        }
    }

    FsmOutcome {
        recognized: is_final(state),
        value,
    }
}

/// States of the numeric-literal recognizer.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum NumberState {
    Start,
    Zero,
    Integer,
    StartDecimal,
    Decimal,
    StartExponentNotation,
    NumberInExponentNotation,
}

fn number_transition(state: NumberState, symbol: char) -> Option<NumberState> {
    use NumberState::{
        Decimal, Integer, NumberInExponentNotation, Start, StartDecimal, StartExponentNotation,
        Zero,
    };

    match state {
        Start => match symbol {
            '0' => Some(Zero),
            '.' => Some(StartDecimal),
            _ if char_class::is_digit(symbol) => Some(Integer),
            _ => None,
        },
        Zero => match symbol {
            '.' => Some(StartDecimal),
            _ if char_class::is_exponent_symbol(symbol) => Some(StartExponentNotation),
            _ => None,
        },
        Integer => match symbol {
            '.' => Some(StartDecimal),
            _ if char_class::is_digit(symbol) => Some(Integer),
            _ if char_class::is_exponent_symbol(symbol) => Some(StartExponentNotation),
            _ => None,
        },
        StartDecimal => char_class::is_digit(symbol).then_some(Decimal),
        Decimal => match symbol {
            _ if char_class::is_digit(symbol) => Some(Decimal),
            _ if char_class::is_exponent_symbol(symbol) => Some(StartExponentNotation),
            _ => None,
        },
        // A negative exponent is allowed; a positive sign is not.
        StartExponentNotation => (char_class::is_digit(symbol) || symbol == '-')
            .then_some(NumberInExponentNotation),
        NumberInExponentNotation => {
            char_class::is_digit(symbol).then_some(NumberInExponentNotation)
        }
    }
}

fn number_is_final(state: NumberState) -> bool {
    matches!(
        state,
        NumberState::Zero
            | NumberState::Integer
            | NumberState::StartDecimal
            | NumberState::Decimal
            | NumberState::NumberInExponentNotation
    )
}

/// Recognize a numeric literal prefix of `input`.
///
/// `StartDecimal` is final so that a trailing dot (`3.`) is consumed here
/// and stripped by the lexer, which re-reads the `.` as a Dot token.
pub fn recognize_number(input: &[char]) -> FsmOutcome {
    run(NumberState::Start, input, number_transition, number_is_final)
}

/// States of the string-literal recognizer.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum StringState {
    Start,
    StartString,
    Character,
    Backslash,
    EscapeSequence,
    EndString,
}

fn string_transition(state: StringState, symbol: char) -> Option<StringState> {
    use StringState::{Backslash, Character, EndString, Start, StartString};

    match state {
        Start => char_class::is_string_delimiter(symbol).then_some(StartString),
        StartString | Character | StringState::EscapeSequence => {
            if char_class::is_string_delimiter(symbol) {
                Some(EndString)
            } else if char_class::is_escape_character(symbol) {
                Some(Backslash)
            } else {
                Some(Character)
            }
        }
        Backslash => {
            char_class::is_end_of_escape_sequence(symbol).then_some(StringState::EscapeSequence)
        }
        EndString => None,
    }
}

/// Recognize a string literal prefix of `input`, quotes included.
///
/// The recognized value keeps its surrounding quotes and raw escape
/// sequences; unescaping is deferred to evaluation.
pub fn recognize_string(input: &[char]) -> FsmOutcome {
    run(StringState::Start, input, string_transition, |state| {
        state == StringState::EndString
    })
}
