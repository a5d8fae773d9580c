use thiserror::Error;

/// Everything the reader can complain about. The messages are the exact
/// strings recorded by the diagnostic sink.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unsupported character")]
    UnsupportedCharacter,
    #[error("delimiter expected")]
    DelimiterExpected,
    #[error("invalid number: missing exponent")]
    MissingExponent,
    #[error("number overflows exact range")]
    NumberOverflowsExact,
    #[error("real number cannot be represented as exact")]
    RealNumberAsExact,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("unterminated list")]
    UnterminatedList,
    #[error("list terminator expected")]
    ListTerminatorExpected,
    #[error("too many nested expressions")]
    TooManyNestedExpressions,
}
