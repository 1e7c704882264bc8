#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(
    clippy::needless_return,
    clippy::missing_docs_in_private_items,
    clippy::non_ascii_literal
)]

//! Plotcalc, the two engines behind a small graphing calculator: a safe
//! expression pipeline for plotting user-typed functions of `x`, and a
//! keypad calculator state machine.
//!
//! # Expressions
//!
//! The expression engine turns an arbitrary user-typed string into a
//! function of one variable that can be sampled repeatedly. Input is
//! checked against a fixed token whitelist, parsed into a syntax tree and
//! probed once before it is accepted; nothing outside the whitelist ever
//! reaches evaluation.
//!
//! ```
//! use plotcalc::{validate, ValidationResult};
//!
//! match validate("sin(x) / x") {
//!     ValidationResult::Valid(expr) => {
//!         assert!(expr.eval_at(0.0).is_nan()); // a gap, not an error
//!         assert!((expr.eval_at(1.0) - 1.0_f64.sin()).abs() < 1e-12);
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//!
//! assert!(!validate("x; alert(1)").is_valid());
//! assert_eq!(validate(""), ValidationResult::Empty);
//! ```
//!
//! A validated expression is sampled over an evenly spaced grid; points
//! where the function has no value stay in the series as NaN gaps:
//!
//! ```
//! use plotcalc::{sample, validate, SampleGrid};
//!
//! let expr = validate("sqrt(x)").expr().unwrap().clone();
//! let series = sample(&expr, &SampleGrid::default());
//! assert_eq!(series.len(), 1001);
//! assert!(!series.points()[0].is_defined());
//! ```
//!
//! The [`GraphPipeline`] ties both together behind the debounced
//! edit/poll contract an input adapter drives.
//!
//! # The calculator
//!
//! The calculator engine consumes discrete keypad events and owns nothing
//! but its display text and an optional stored operand with its pending
//! operator:
//!
//! ```
//! use plotcalc::{Calculator, Event};
//!
//! let mut calc = Calculator::default();
//! for label in &["7", "+", "3", "="] {
//!     calc.press(Event::from_label(label).unwrap());
//! }
//! assert_eq!(calc.display(), "10");
//! ```
//!
//! # Language definition
//!
//! An expression can contain the following elements:
//!
//! - the variable `x`;
//! - number literals built from digits and `.`;
//! - left and right parenthesis, and `,` between function arguments;
//! - mathematical operators: `+` for addition, `-` for subtraction and
//!   negation, `*` for multiplication and `/` for division;
//! - function calls: `sin(x)`, `pow(x, 2)`. The single-argument functions
//!   are `abs`, `ceil`, `cos`, `exp`, `floor`, `log`, `round`, `sign`,
//!   `sin`, `sqrt` and `tan`; the two-argument functions are `max`, `min`
//!   and `pow`;
//! - the constants `E` and `PI`.
//!
//! Any other symbol is forbidden in the input and rejected before parsing.
//!
//! # Technical details
//!
//! The expression engine is based on an AST interpreter, and uses a simple
//! Shunting-Yard algorithm for parsing the expressions. It works only with
//! `f64` data, and performs a simple constant propagation to optimize the
//! expressions. Evaluation is total: domain errors come back as NaN
//! through the usual floating point rules.

#[macro_use]
extern crate lazy_static;

mod ast;
mod calculator;
mod error;
mod expr;
mod lexer;
mod pipeline;
mod sample;
mod token;
mod util;

pub use ast::Ast;
pub use calculator::{Calculator, Event, Operator, UNDEFINED};
pub use error::Error;
pub use expr::{validate, Expr, ValidationResult};
pub use pipeline::{Feedback, GraphPipeline, DEBOUNCE};
pub use sample::{sample, SampleGrid, SamplePoint, SampleSeries};
pub use util::{CONSTANTS, FUNCTIONS, FUNCTIONS2};

#[cfg(test)]
mod tests {
    use super::{sample, validate, Calculator, Event, SampleGrid};

    #[test]
    // The whole plotting path, from raw input to rendered series
    fn end_to_end() {
        let result = validate("pow(x, 2) - 1");
        let expr = result.expr().expect("should compile");
        let series = sample(expr, &SampleGrid::default());
        assert_eq!(series.len(), 1001);
        assert_eq!(series.points()[500].x, 0.0);
        assert_eq!(series.points()[500].y, -1.0);
    }

    #[test]
    // The whole keypad path, from key names to a result
    fn keyboard_to_result() {
        let mut calc = Calculator::new();
        for key in &["1", "2", "+", "8", "="] {
            calc.press(Event::from_key(key).unwrap());
        }
        assert_eq!(calc.display(), "20");
    }
}
