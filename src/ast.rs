use crate::error::Error;
use crate::token::{Op, Token};
use crate::util::{CONSTANTS, FUNCTIONS, FUNCTIONS2, VARIABLE};

/// Ast nodes for the expressions
#[derive(Debug, Clone)]
pub enum Ast {
    /// The variable, substituted at evaluation time
    Variable,
    /// A constant value
    Value(f64),
    /// <left> + <right>
    Add(Box<Ast>, Box<Ast>),
    /// <left> - <right>
    Sub(Box<Ast>, Box<Ast>),
    /// <left> * <right>
    Mul(Box<Ast>, Box<Ast>),
    /// <left> / <right>
    Div(Box<Ast>, Box<Ast>),
    /// -<arg>
    Neg(Box<Ast>),
    /// fn(<arg>)
    Function(fn(f64) -> f64, Box<Ast>),
    /// fn(<first>, <second>)
    Function2(fn(f64, f64) -> f64, Box<Ast>, Box<Ast>),
}

impl PartialEq<Self> for Ast {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ast::Variable, Ast::Variable) => true,
            // byte comparison so that NaN constants compare equal
            (Ast::Value(v), Ast::Value(v2)) => v.to_le_bytes() == v2.to_le_bytes(),
            (Ast::Add(a, b), Ast::Add(a2, b2)) => a == a2 && b == b2,
            (Ast::Sub(a, b), Ast::Sub(a2, b2)) => a == a2 && b == b2,
            (Ast::Mul(a, b), Ast::Mul(a2, b2)) => a == a2 && b == b2,
            (Ast::Div(a, b), Ast::Div(a2, b2)) => a == a2 && b == b2,
            (Ast::Neg(a), Ast::Neg(a2)) => a == a2,
            (Ast::Function(f, a), Ast::Function(f2, a2)) => f == f2 && a == a2,
            (Ast::Function2(f, a, b), Ast::Function2(f2, a2, b2)) => {
                f == f2 && a == a2 && b == b2
            }
            _ => false,
        }
    }
}
impl Eq for Ast {}

impl Ast {
    /// Construct the AST for a vector of tokens in reverse polish notation.
    /// This function eats the tokens as it uses them
    pub fn from_tokens(tokens: &mut Vec<Token>, context: &str) -> Result<Self, Error> {
        let unoptimized_ast = Self::from_tokens_internal(tokens, context)?;
        Ok(Self::optimize(unoptimized_ast))
    }

    fn from_tokens_internal(tokens: &mut Vec<Token>, context: &str) -> Result<Self, Error> {
        if let Some(token) = tokens.pop() {
            match token {
                Token::Number(number) => number
                    .parse()
                    .map(Self::Value)
                    .map_err(|_| Error::Parse(format!("invalid number {}", number))),
                Token::Ident(name) => {
                    if let Some(&func) = FUNCTIONS.get(&name) {
                        let arg = Box::new(Self::from_tokens_internal(
                            tokens,
                            " in function call",
                        )?);
                        Ok(Self::Function(func, arg))
                    } else if let Some(&func) = FUNCTIONS2.get(&name) {
                        let second = Box::new(Self::from_tokens_internal(
                            tokens,
                            " in function call",
                        )?);
                        let first = Box::new(Self::from_tokens_internal(
                            tokens,
                            " in function call",
                        )?);
                        Ok(Self::Function2(func, first, second))
                    } else if let Some(&value) = CONSTANTS.get(&name) {
                        Ok(Self::Value(value))
                    } else if name == VARIABLE {
                        Ok(Self::Variable)
                    } else {
                        Err(Error::Name(name))
                    }
                }
                Token::Op(Op::Neg) => {
                    let arg = Box::new(Self::from_tokens_internal(tokens, " after operator")?);
                    Ok(Self::Neg(arg))
                }
                Token::Op(op) => {
                    let right = Box::new(Self::from_tokens_internal(tokens, " after operator")?);
                    let left = Box::new(Self::from_tokens_internal(tokens, " before operator")?);
                    match op {
                        Op::Plus => Ok(Self::Add(left, right)),
                        Op::Minus => Ok(Self::Sub(left, right)),
                        Op::Mul => Ok(Self::Mul(left, right)),
                        Op::Div => Ok(Self::Div(left, right)),
                        Op::Neg => unreachable!(),
                    }
                }
                other => panic!("Internal error: got {:?} token after shunting yard", other),
            }
        } else {
            Err(Error::Parse(format!("empty expression{}", context)))
        }
    }

    /// If the AST node correspond to a constant, get `Some(constant)`. Else,
    /// get `None`
    pub fn value(&self) -> Option<f64> {
        if let Self::Value(value) = *self {
            Some(value)
        } else {
            None
        }
    }

    /// Evaluate the tree with the variable bound to `x`.
    ///
    /// Evaluation is total: domain errors surface as NaN through the usual
    /// floating point rules, never as a panic.
    pub fn eval_at(&self, x: f64) -> f64 {
        match *self {
            Self::Variable => x,
            Self::Value(value) => value,
            Self::Add(ref left, ref right) => left.eval_at(x) + right.eval_at(x),
            Self::Sub(ref left, ref right) => left.eval_at(x) - right.eval_at(x),
            Self::Mul(ref left, ref right) => left.eval_at(x) * right.eval_at(x),
            Self::Div(ref left, ref right) => left.eval_at(x) / right.eval_at(x),
            Self::Neg(ref arg) => -arg.eval_at(x),
            Self::Function(func, ref arg) => func(arg.eval_at(x)),
            Self::Function2(func, ref first, ref second) => {
                func(first.eval_at(x), second.eval_at(x))
            }
        }
    }

    /// Optimize the AST by doing constants propagation. Folding uses the
    /// same arithmetic as evaluation, so NaN and infinite results survive
    /// as constants for the domain probe to see.
    pub fn optimize(self) -> Self {
        match self {
            Self::Variable | Self::Value(_) => self,
            Self::Neg(arg) => {
                let arg = arg.optimize();
                if let Some(arg) = arg.value() {
                    return Self::Value(-arg);
                }
                return Self::Neg(Box::new(arg));
            }
            Self::Function(func, arg) => {
                let arg = arg.optimize();
                if let Some(arg) = arg.value() {
                    return Self::Value(func(arg));
                }
                return Self::Function(func, Box::new(arg));
            }
            Self::Function2(func, first, second) => {
                let first = first.optimize();
                let second = second.optimize();
                if let Some(first) = first.value() {
                    if let Some(second) = second.value() {
                        return Self::Value(func(first, second));
                    }
                }
                return Self::Function2(func, Box::new(first), Box::new(second));
            }
            Self::Add(left, right) => {
                let left = left.optimize();
                let right = right.optimize();
                if let Some(left) = left.value() {
                    if let Some(right) = right.value() {
                        return Self::Value(left + right);
                    }
                }
                return Self::Add(Box::new(left), Box::new(right));
            }
            Self::Sub(left, right) => {
                let left = left.optimize();
                let right = right.optimize();
                if let Some(left) = left.value() {
                    if let Some(right) = right.value() {
                        return Self::Value(left - right);
                    }
                }
                return Self::Sub(Box::new(left), Box::new(right));
            }
            Self::Mul(left, right) => {
                let left = left.optimize();
                let right = right.optimize();
                if let Some(left) = left.value() {
                    if let Some(right) = right.value() {
                        return Self::Value(left * right);
                    }
                }
                return Self::Mul(Box::new(left), Box::new(right));
            }
            Self::Div(left, right) => {
                let left = left.optimize();
                let right = right.optimize();
                if let Some(left) = left.value() {
                    if let Some(right) = right.value() {
                        return Self::Value(left / right);
                    }
                }
                return Self::Div(Box::new(left), Box::new(right));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Ast;
    use crate::lexer::Lexer;

    fn ast_for(expression: &str) -> Ast {
        Ast::from_tokens(&mut Lexer::new(expression).parse().unwrap(), "").unwrap()
    }

    #[test]
    // Verifies that we have reduced the input to a single value token when possible
    fn optimize() {
        assert_eq!(ast_for("3 + 5").value(), Some(8.0));
        assert_eq!(ast_for("(3 + 5*2)*45").value(), Some(585.0));
        assert_eq!(ast_for("sqrt(9)").value(), Some(3.0));
        assert_eq!(ast_for("-(2 + 3)").value(), Some(-5.0));
        assert_eq!(ast_for("pow(2, 3)").value(), Some(8.0));
        assert_eq!(ast_for("max(1, min(3, 2))").value(), Some(2.0));
    }

    #[test]
    fn optimize_keeps_non_finite_constants() {
        assert!(ast_for("sqrt(0 - 9)").value().unwrap().is_nan());
        assert!(ast_for("1/0").value().unwrap().is_infinite());
    }

    #[test]
    fn optimize_stops_at_the_variable() {
        assert_eq!(ast_for("x + 1").value(), None);
        // but constant subtrees still fold
        let ast = ast_for("x + (2 + 3)");
        if let Ast::Add(_, right) = ast {
            assert_eq!(right.value(), Some(5.0));
        } else {
            panic!("expected an addition");
        }
    }

    #[test]
    fn eval_substitutes_the_variable() {
        assert_eq!(ast_for("x*x").eval_at(3.0), 9.0);
        assert_eq!(ast_for("x*x").eval_at(-2.0), 4.0);
        assert_eq!(ast_for("-x").eval_at(2.5), -2.5);
        assert_eq!(ast_for("pow(max(x, 2), 2)").eval_at(1.0), 4.0);
        assert_eq!(ast_for("pow(max(x, 2), 2)").eval_at(5.0), 25.0);
    }

    #[test]
    fn eval_maps_domain_errors_to_nan() {
        assert!(ast_for("sqrt(x)").eval_at(-1.0).is_nan());
        assert!(ast_for("log(x)").eval_at(-2.0).is_nan());
        assert!(ast_for("x/x").eval_at(0.0).is_nan());
    }

    #[test]
    fn constants_resolve_at_parse_time() {
        assert_eq!(ast_for("PI").value(), Some(std::f64::consts::PI));
        assert_eq!(ast_for("E").value(), Some(std::f64::consts::E));
    }
}
