use std::fmt;

use crate::method::Method;

/// Pattern syntax error
///
/// Returned by [`compile`](crate::router::compile) when a registration pattern
/// cannot be turned into a segment list. Always surfaced at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// The pattern string was empty
    EmptyPattern,
    /// A `{` was never closed by a matching `}`
    UnterminatedCapture {
        /// Byte offset of the opening brace
        position: usize,
    },
    /// A `}` appeared outside of a capture
    UnexpectedClose {
        /// Byte offset of the stray brace
        position: usize,
    },
    /// `/*` appeared somewhere other than the end of the pattern
    MisplacedWildcard {
        /// Byte offset of the `*`
        position: usize,
    },
    /// Two captures follow each other with no literal text between them
    AdjacentCaptures {
        /// Byte offset of the second capture
        position: usize,
    },
    /// The regex body of a capture did not compile
    InvalidRegex {
        /// The body as written in the pattern
        body: String,
        /// Message from the regex engine
        reason: String,
    },
    /// A regex capture was declared with an empty body (`{id:}`)
    EmptyRegex {
        /// Byte offset of the capture
        position: usize,
    },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::EmptyPattern => write!(f, "pattern must not be empty"),
            SyntaxError::UnterminatedCapture { position } => {
                write!(f, "unterminated capture starting at byte {position}")
            }
            SyntaxError::UnexpectedClose { position } => {
                write!(f, "unexpected '}}' at byte {position}")
            }
            SyntaxError::MisplacedWildcard { position } => {
                write!(
                    f,
                    "wildcard at byte {position} is only allowed as the trailing '/*'"
                )
            }
            SyntaxError::AdjacentCaptures { position } => {
                write!(
                    f,
                    "capture at byte {position} directly follows another capture"
                )
            }
            SyntaxError::InvalidRegex { body, reason } => {
                write!(f, "invalid capture regex '{body}': {reason}")
            }
            SyntaxError::EmptyRegex { position } => {
                write!(f, "capture at byte {position} has an empty regex body")
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Router error
///
/// Every registration-time failure is reported through this type, as are
/// failures of the reverse URL builder. Match-time outcomes (not found,
/// method not allowed) are ordinary results, see
/// [`MatchOutcome`](crate::router::MatchOutcome).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The pattern is malformed
    Syntax {
        /// The rejected pattern
        pattern: String,
        /// What was wrong with it
        source: SyntaxError,
    },
    /// The pattern already has a handler for this method
    DuplicateRoute {
        /// The pattern being registered
        pattern: String,
        /// The method that is already taken
        method: Method,
    },
    /// A method outside the supported enumeration
    UnknownMethod {
        /// The method as supplied by the caller
        method: String,
    },
    /// The handler name was empty
    MissingHandler {
        /// The pattern being registered
        pattern: String,
    },
    /// A reverse build lacked a value for a named capture
    MissingParameter {
        /// Name of the capture without a value
        name: String,
    },
    /// The route name is already bound to a pattern
    DuplicateName {
        /// The contested name
        name: String,
    },
    /// Neither a route name nor a registered pattern
    UnknownRoute {
        /// The name or pattern that was looked up
        route: String,
    },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Syntax { pattern, source } => {
                write!(f, "invalid route pattern '{pattern}': {source}")
            }
            RouterError::DuplicateRoute { pattern, method } => {
                write!(f, "route '{pattern}' already has a {method} handler")
            }
            RouterError::UnknownMethod { method } => {
                write!(f, "unsupported request method '{method}'")
            }
            RouterError::MissingHandler { pattern } => {
                write!(f, "route '{pattern}' registered without a handler")
            }
            RouterError::MissingParameter { name } => {
                write!(f, "no value supplied for parameter '{name}'")
            }
            RouterError::DuplicateName { name } => {
                write!(f, "route name '{name}' is already in use")
            }
            RouterError::UnknownRoute { route } => {
                write!(f, "'{route}' is neither a route name nor a registered pattern")
            }
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::Syntax { source, .. } => Some(source),
            _ => None,
        }
    }
}
