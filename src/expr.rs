use crate::ast::Ast;
use crate::error::Error;
use crate::lexer::{scan_whitelist, Lexer};
use tracing::debug;

/// Outcome of validating a raw user-typed expression.
///
/// `Empty` is not an error: it only means there is nothing to plot yet and
/// must not be reported with the invalid-expression message.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// There was no input
    Empty,
    /// The input is not a safe numeric expression in `x`
    Invalid(Error),
    /// The input compiled to an evaluable function of `x`
    Valid(Expr),
}

impl ValidationResult {
    /// Check if validation produced a compiled expression
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Get the compiled expression, if validation succeeded
    pub fn expr(&self) -> Option<&Expr> {
        if let Self::Valid(expr) = self {
            Some(expr)
        } else {
            None
        }
    }
}

/// A parsed and optimized expression in the single variable `x`.
///
/// # Examples
/// ```
/// use plotcalc::Expr;
///
/// let expr = Expr::parse("3 + 5 * x").unwrap();
/// assert_eq!(expr.eval_at(2.0), 13.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    ast: Ast,
}

impl Expr {
    /// Parse the given mathematical `expression` into an `Expr`.
    ///
    /// The input is first checked against the token whitelist, then lexed
    /// and built into a syntax tree. Function and constant keywords resolve
    /// as whole identifiers, so the `x` inside `exp` or `max` is never read
    /// as the variable.
    ///
    /// # Examples
    /// ```
    /// use plotcalc::Expr;
    /// // A valid expression
    /// assert!(Expr::parse("3 + 5 * 2").is_ok());
    /// // an invalid expression
    /// assert!(Expr::parse("3eff + 5 * 2").is_err());
    /// ```
    pub fn parse(expression: &str) -> Result<Self, Error> {
        scan_whitelist(expression)?;
        let mut tokens = Lexer::new(expression).parse()?;
        let ast = Ast::from_tokens(&mut tokens, "")?;
        if !tokens.is_empty() {
            return Err(Error::Parse("dangling tokens after expression".into()));
        }
        Ok(Self { ast })
    }

    /// Evaluate the expression with the variable bound to `x`.
    ///
    /// Evaluation is total: a domain error (square root of a negative,
    /// division by zero, ...) comes back as NaN or an infinity, never as a
    /// panic or an `Err`.
    ///
    /// # Examples
    /// ```
    /// use plotcalc::Expr;
    ///
    /// let expr = Expr::parse("sqrt(x)").unwrap();
    /// assert_eq!(expr.eval_at(9.0), 3.0);
    /// assert!(expr.eval_at(-1.0).is_nan());
    /// ```
    pub fn eval_at(&self, x: f64) -> f64 {
        self.ast.eval_at(x)
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }
}

/// Validate a raw user-typed string into an evaluable expression.
///
/// Empty input is reported as [`ValidationResult::Empty`]. Anything that
/// fails the token whitelist or does not parse is
/// [`ValidationResult::Invalid`]. A parsed expression is then probed once
/// at a random point in `[0, 1)`: a non-finite result there (an unknown
/// name would already have failed the parse; this catches expressions that
/// are degenerate everywhere, like `1/0`) is also `Invalid`. The probe
/// point is drawn fresh on every call and never reused for sampling.
///
/// # Examples
/// ```
/// use plotcalc::{validate, ValidationResult};
///
/// assert_eq!(validate(""), ValidationResult::Empty);
/// assert!(!validate("x; alert(1)").is_valid());
///
/// match validate("x*x") {
///     ValidationResult::Valid(expr) => assert_eq!(expr.eval_at(3.0), 9.0),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
pub fn validate(raw: &str) -> ValidationResult {
    if raw.is_empty() {
        return ValidationResult::Empty;
    }
    match Expr::parse(raw) {
        Err(err) => {
            debug!("rejected expression: {}", err);
            ValidationResult::Invalid(err)
        }
        Ok(expr) => {
            let probe = rand::random::<f64>();
            if expr.eval_at(probe).is_finite() {
                ValidationResult::Valid(expr)
            } else {
                debug!("expression is not finite at probe point {}", probe);
                ValidationResult::Invalid(Error::NonFinite)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{validate, Expr, ValidationResult};
    use crate::error::Error;

    #[test]
    fn parse() {
        let valid_expressions = [
            "3 + 5",
            "(3 + -5)*45",
            "(3. + 5.0)*\t\n45",
            "sin(3.0) - sqrt(28.0)",
            "pow(max(x,2), 2)",
            "-x",
            "-sin(x)",
            "x/x - PI*E",
        ];
        for expr in &valid_expressions {
            assert!(Expr::parse(expr).is_ok(), "{} should parse", expr);
        }
    }

    #[test]
    fn parse_rejects_structural_errors() {
        let invalid_expressions = [
            "sin(",
            "sin 3",
            "2x",
            "x 2",
            "()",
            "sin()",
            "pow(3)",
            "pow(1, 2, 3)",
            "1..2",
            ".",
            "1 +",
            "*2",
        ];
        for expr in &invalid_expressions {
            match Expr::parse(expr) {
                Err(Error::Parse(_)) => {}
                other => panic!("{} should be a parse error, got {:?}", expr, other),
            }
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(Expr::parse("minx"), Err(Error::Name("minx".into())));
        assert_eq!(Expr::parse("Ex"), Err(Error::Name("Ex".into())));
    }

    #[test]
    fn parse_rejects_forbidden_characters() {
        assert_eq!(Expr::parse("x; alert(1)"), Err(Error::Forbidden(';')));
        assert_eq!(Expr::parse("x=1"), Err(Error::Forbidden('=')));
        assert_eq!(Expr::parse("y+1"), Err(Error::Forbidden('y')));
    }

    #[test]
    fn empty_is_not_invalid() {
        assert_eq!(validate(""), ValidationResult::Empty);
        assert!(!matches!(validate(""), ValidationResult::Invalid(_)));
        // whitespace is not the empty input, and holds no expression
        assert!(matches!(validate("  "), ValidationResult::Invalid(_)));
    }

    #[test]
    fn validate_compiles_a_function_of_x() {
        let result = validate("x*x");
        let expr = result.expr().expect("x*x should be valid");
        assert_eq!(expr.eval_at(3.0), 9.0);
        assert_eq!(expr.eval_at(-2.0), 4.0);
    }

    #[test]
    fn validate_keeps_domain_errors_out_of_the_probe_range() {
        // sqrt is defined on the probe range [0, 1), so this is valid even
        // though half the plotting grid will be NaN gaps
        let result = validate("sqrt(x)");
        let expr = result.expr().expect("sqrt(x) should be valid");
        assert!(expr.eval_at(-1.0).is_nan());
        assert_eq!(expr.eval_at(4.0), 2.0);
    }

    #[test]
    fn validate_rejects_expressions_that_probe_non_finite() {
        assert_eq!(validate("1/0"), ValidationResult::Invalid(Error::NonFinite));
        // log of a negative number is NaN on the whole probe range
        assert_eq!(
            validate("log(0 - 1 - x)"),
            ValidationResult::Invalid(Error::NonFinite)
        );
    }

    #[test]
    fn validate_two_argument_functions() {
        let result = validate("pow(max(x,2), 2)");
        let expr = result.expr().expect("should be valid");
        assert_eq!(expr.eval_at(1.0), 4.0);
        assert_eq!(expr.eval_at(5.0), 25.0);
    }

    #[test]
    fn constants_are_valid_expressions() {
        let result = validate("PI");
        let expr = result.expr().expect("PI should be valid");
        assert_eq!(expr.eval_at(0.0), std::f64::consts::PI);
        assert_eq!(expr.eval_at(3.0), std::f64::consts::PI);
    }
}
