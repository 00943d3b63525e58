use std::fmt::{self, Display, Formatter};

/// Raised when no classifier in the lexer's configured [TokenType](crate::TokenType) set
/// accepts a lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub line: usize,
    pub column: usize,
    pub text: String,
}

/// Raised when no grammar path accepts the next token after every alternative has been
/// exhausted. Carries the position of the first still-unread token in the parser's pushback
/// buffer, not the position at which backtracking was ultimately exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub token_text: String,
}

/// Programmer-error class: an abstract [Rule](crate::Rule) instantiated as-is, an invalid
/// path index, a grammar with no root, and similar invariant violations that indicate a bug
/// in grammar construction rather than a parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalError {
    pub what: String,
    pub message: String,
}

/// Raised by a grammar callback ([Rule::expand](crate::Rule::expand) or a successor
/// computation) to reject a branch contextually, e.g. when an environment-variable
/// constraint is violated. Never escapes the grammar module: the parser catches it at every
/// site that requests successors and treats it as "no successors here", pruning the subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessorError;

/// The unified error type returned by [Parser::parse](crate::Parser::parse) and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Lexical(LexicalError),
    Parse(ParseError),
    Internal(InternalError),
}

impl LexicalError {
    pub fn new(line: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            column,
            text: text.into(),
        }
    }
}

impl Display for LexicalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown token '{}' at line {}, column {}",
            self.text, self.line, self.column
        )
    }
}

impl std::error::Error for LexicalError {}

impl ParseError {
    pub fn new(line: usize, column: usize, token_text: impl Into<String>) -> Self {
        Self {
            line,
            column,
            token_text: token_text.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line:{}, Column:{} -> Unexpected token '{}'",
            self.line, self.column, self.token_text
        )
    }
}

impl std::error::Error for ParseError {}

impl InternalError {
    pub fn new(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            message: message.into(),
        }
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "InternalError: {}-{}", self.what, self.message)
    }
}

impl std::error::Error for InternalError {}

impl Display for SuccessorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SuccessorError")
    }
}

impl std::error::Error for SuccessorError {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lexical(e) => Display::fmt(e, f),
            Error::Parse(e) => Display::fmt(e, f),
            Error::Internal(e) => Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Error {}

impl From<LexicalError> for Error {
    fn from(e: LexicalError) -> Self {
        Error::Lexical(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<InternalError> for Error {
    fn from(e: InternalError) -> Self {
        Error::Internal(e)
    }
}
