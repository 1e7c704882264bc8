use thiserror::Error;

/// Error type for expression validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A character outside the token whitelist
    #[error("forbidden character '{0}' in input")]
    Forbidden(char),
    /// Error while parsing an expression
    #[error("ParseError: {0}")]
    Parse(String),
    /// Unknown name found while building the syntax tree
    #[error("NameError: name '{0}' is not defined")]
    Name(String),
    /// The domain probe did not produce a finite number
    #[error("expression is not finite at the probe point")]
    NonFinite,
}
