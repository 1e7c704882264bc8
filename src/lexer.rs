use crate::error::Error;
use crate::token::{Op, Token};
use crate::util::{is_function, KEYWORDS};
use std::iter::Peekable;
use std::str::Chars;

/// Check `input` against the fixed token whitelist.
///
/// Every allowed token is consumed from the front of the remaining input;
/// the first character that does not start one is reported as an error.
/// Rejecting instead of deleting keeps the scan a hard boundary: input
/// never reaches the parser with unexpected characters silently removed.
pub fn scan_whitelist(input: &str) -> Result<(), Error> {
    let mut rest = input;
    'scan: while let Some(c) = rest.chars().next() {
        if c.is_ascii_whitespace()
            || c.is_ascii_digit()
            || matches!(c, '.' | '+' | '-' | '*' | '/' | '(' | ')' | ',')
        {
            rest = &rest[c.len_utf8()..];
            continue;
        }
        // Named tokens match longest first, see KEYWORDS
        for keyword in KEYWORDS.iter() {
            if rest.starts_with(keyword.as_str()) {
                rest = &rest[keyword.len()..];
                continue 'scan;
            }
        }
        return Err(Error::Forbidden(c));
    }
    Ok(())
}

/// An helper struct for lexing the input
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(string: &str) -> Lexer {
        Lexer {
            input: string.chars().peekable(),
        }
    }

    /// Run the shunting-yard pass, producing the tokens in reverse polish
    /// notation.
    pub fn parse(&mut self) -> Result<Vec<Token>, Error> {
        let mut output = Vec::new();
        let mut operators = Vec::new();
        // Whether the next token should start an operand; decides between
        // the binary and unary readings of `+` and `-`
        let mut expect_operand = true;

        'tokens: while let Some(token) = self.next_token()? {
            match token {
                Token::Ident(ref name) if is_function(name) => {
                    operators.push(token.clone());
                    expect_operand = true;
                }
                Token::Number(_) | Token::Ident(_) => {
                    output.push(token);
                    expect_operand = false;
                }
                Token::Op(op) => {
                    let o1 = match (op, expect_operand) {
                        (Op::Plus, true) => continue 'tokens, // unary plus is a no-op
                        (Op::Minus, true) => Op::Neg,
                        (Op::Mul, true) | (Op::Div, true) => {
                            return Err(Error::Parse(format!(
                                "missing operand before operator {}",
                                op
                            )));
                        }
                        (op, _) => op,
                    };
                    'operators: while let Some(token) = operators.last().cloned() {
                        match token {
                            Token::Op(o2) => {
                                let pop_me =
                                    o1.is_left_associative() && o1.precedence() <= o2.precedence();
                                let pop_me = pop_me
                                    || o1.is_right_associative()
                                        && o1.precedence() < o2.precedence();
                                if pop_me {
                                    operators.pop();
                                    output.push(Token::Op(o2));
                                } else {
                                    break 'operators;
                                }
                            }
                            _ => break 'operators,
                        }
                    }
                    operators.push(Token::Op(o1));
                    expect_operand = true;
                }
                Token::LParen => {
                    operators.push(token);
                    expect_operand = true;
                }
                Token::Comma => {
                    'arguments: while let Some(token) = operators.last().cloned() {
                        match token {
                            Token::Op(o2) => {
                                operators.pop();
                                output.push(Token::Op(o2));
                            }
                            _ => break 'arguments,
                        }
                    }
                    match operators.last() {
                        Some(&Token::LParen) => {}
                        _ => {
                            return Err(Error::Parse(
                                "argument separator outside a function call".into(),
                            ));
                        }
                    }
                    expect_operand = true;
                }
                Token::RParen => {
                    while let Some(token) = operators.pop() {
                        match token {
                            Token::LParen => {
                                let next_is_fn =
                                    if let Some(&Token::Ident(ref name)) = operators.last() {
                                        is_function(name)
                                    } else {
                                        false
                                    };

                                if next_is_fn {
                                    if let Some(func) = operators.pop() {
                                        output.push(func);
                                    }
                                }
                                expect_operand = false;
                                continue 'tokens;
                            }
                            Token::Op(_) => output.push(token),
                            other => panic!("Internal bug: found {:?} in operators stack", other),
                        }
                    }
                    return Err(Error::Parse("mismatched parenthesis".into()));
                }
            }
        }

        while let Some(token) = operators.pop() {
            match token {
                Token::LParen => return Err(Error::Parse("mismatched parenthesis".into())),
                Token::Op(_) => output.push(token),
                Token::Ident(name) => {
                    return Err(Error::Parse(format!(
                        "function {} is missing its parentheses",
                        name
                    )));
                }
                other => panic!("Internal bug: found {:?} in operators stack", other),
            }
        }
        Ok(output)
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        if let Some(c) = self.input.next() {
            let token = match c {
                ' ' | '\t' | '\n' | '\r' => return self.next_token(),
                c if c.is_ascii_digit() || c == '.' => {
                    let mut number = String::new();
                    number.push(c);
                    'number: while let Some(&c) = self.input.peek() {
                        if c.is_ascii_digit() || c == '.' {
                            self.input.next();
                            number.push(c);
                        } else {
                            break 'number;
                        }
                    }
                    Token::Number(number)
                }
                c if c.is_ascii_alphabetic() => {
                    let mut ident = String::new();
                    ident.push(c);
                    'ident: while let Some(&c) = self.input.peek() {
                        if c.is_ascii_alphabetic() {
                            self.input.next();
                            ident.push(c);
                        } else {
                            break 'ident;
                        }
                    }
                    Token::Ident(ident)
                }
                '+' => Token::Op(Op::Plus),
                '-' => Token::Op(Op::Minus),
                '*' => Token::Op(Op::Mul),
                '/' => Token::Op(Op::Div),
                '(' => Token::LParen,
                ')' => Token::RParen,
                ',' => Token::Comma,
                other => return Err(Error::Forbidden(other)),
            };
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Op, Token};
    use test_case::test_case;

    fn number(value: &str) -> Token {
        Token::Number(value.to_string())
    }

    fn ident(name: &str) -> Token {
        Token::Ident(name.to_string())
    }

    #[test_case("2 + 2" => Ok(vec![number("2"), number("2"), Token::Op(Op::Plus)]) ; "addition is parsed properly")]
    #[test_case("2+2" => Ok(vec![number("2"), number("2"), Token::Op(Op::Plus)]) ; "spaces are optional")]
    #[test_case("-x" => Ok(vec![ident("x"), Token::Op(Op::Neg)]) ; "prefix minus becomes negation")]
    #[test_case("+x" => Ok(vec![ident("x")]) ; "prefix plus is dropped")]
    #[test_case("2*(x+1)" => Ok(vec![number("2"), ident("x"), number("1"), Token::Op(Op::Plus), Token::Op(Op::Mul)]) ; "parenthesis binds tighter")]
    #[test_case("3+5*2" => Ok(vec![number("3"), number("5"), number("2"), Token::Op(Op::Mul), Token::Op(Op::Plus)]) ; "precedence is respected")]
    #[test_case("pow(x, 2)" => Ok(vec![ident("x"), number("2"), ident("pow")]) ; "two argument call")]
    #[test_case("sin(x)" => Ok(vec![ident("x"), ident("sin")]) ; "one argument call")]
    #[test_case("-x*-x" => Ok(vec![ident("x"), Token::Op(Op::Neg), ident("x"), Token::Op(Op::Neg), Token::Op(Op::Mul)]) ; "negation on both factors")]
    fn parse(expression: &str) -> Result<Vec<Token>, Error> {
        Lexer::new(expression).parse()
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            Lexer::new("sin 3").parse(),
            Err(Error::Parse("function sin is missing its parentheses".into()))
        );
        assert_eq!(
            Lexer::new("(x").parse(),
            Err(Error::Parse("mismatched parenthesis".into()))
        );
        assert_eq!(
            Lexer::new("x)").parse(),
            Err(Error::Parse("mismatched parenthesis".into()))
        );
        assert_eq!(
            Lexer::new("1, 2").parse(),
            Err(Error::Parse("argument separator outside a function call".into()))
        );
        assert_eq!(
            Lexer::new("*2").parse(),
            Err(Error::Parse("missing operand before operator *".into()))
        );
        assert_eq!(Lexer::new("x; 1").parse(), Err(Error::Forbidden(';')));
    }

    #[test]
    fn whitelist_accepts_the_token_set() {
        let allowed = [
            "x*x",
            "pow(max(x,2), 2)",
            "sin(x)/cos(x)",
            "2.5 + PI - E",
            "floor(x) - round(x) + ceil(x)",
            "abs(sign(x)) * sqrt(exp(log(x))) - tan(min(x, 1))",
        ];
        for input in &allowed {
            assert_eq!(scan_whitelist(input), Ok(()));
        }
    }

    #[test]
    fn whitelist_rejects_everything_else() {
        assert_eq!(scan_whitelist("x; alert(1)"), Err(Error::Forbidden(';')));
        assert_eq!(scan_whitelist("x=1"), Err(Error::Forbidden('=')));
        assert_eq!(scan_whitelist("y+1"), Err(Error::Forbidden('y')));
        assert_eq!(scan_whitelist("2^3"), Err(Error::Forbidden('^')));
        assert_eq!(scan_whitelist("1e5"), Err(Error::Forbidden('e')));
        assert_eq!(scan_whitelist("pi"), Err(Error::Forbidden('p')));
        assert_eq!(scan_whitelist("x\u{221a}"), Err(Error::Forbidden('\u{221a}')));
    }

    #[test]
    fn whitelist_matches_named_tokens_at_their_boundaries() {
        // the x inside exp and max belongs to the keyword, not the variable
        assert_eq!(scan_whitelist("exp(x)"), Ok(()));
        assert_eq!(scan_whitelist("max(x, 2)"), Ok(()));
        // leftovers after a keyword are still checked
        assert_eq!(scan_whitelist("xp"), Err(Error::Forbidden('p')));
    }
}
