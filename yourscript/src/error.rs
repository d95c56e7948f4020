use std::fmt;
use std::path::PathBuf;

/// Error types for keyword translation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A subset name has no registered keyword mapping
    #[error("Unknown subset '{subset}'")]
    UnknownSubset { subset: String },

    /// A source keyword has no counterpart in the destination subset
    #[error("Keyword '{keyword}' of subset '{from}' has no translation in subset '{to}'")]
    UntranslatableKeyword {
        keyword: String,
        from: String,
        to: String,
    },

    /// The source text could not be lexed
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// Two canonical keywords share one spelling, so the subset cannot be inverted
    #[error("Subset '{subset}' uses spelling '{spelling}' for more than one keyword")]
    DuplicateSpelling { subset: String, spelling: String },

    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Structurally valid JSON that is not a lexems file
    #[error("Invalid lexems in '{}': {message}", .path.display())]
    InvalidLexems { path: PathBuf, message: String },
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while lexing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeErrorKind {
    UnterminatedString,
    UnterminatedTemplate,
    UnterminatedRegex,
    UnterminatedComment,
    InvalidIdentifierEscape,
    UnexpectedCharacter(char),
}

impl fmt::Display for TokenizeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            TokenizeErrorKind::UnterminatedTemplate => write!(f, "unterminated template literal"),
            TokenizeErrorKind::UnterminatedRegex => {
                write!(f, "unterminated regular expression literal")
            }
            TokenizeErrorKind::UnterminatedComment => write!(f, "unterminated block comment"),
            TokenizeErrorKind::InvalidIdentifierEscape => {
                write!(f, "invalid unicode escape in identifier")
            }
            TokenizeErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character {:?}", c),
        }
    }
}

/// Lexing failure, positioned in the original source
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with the column
/// counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Tokenize error at line {line}, column {column}: {kind}")]
pub struct TokenizeError {
    pub kind: TokenizeErrorKind,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl TokenizeError {
    pub(crate) fn at(source: &str, offset: usize, kind: TokenizeErrorKind) -> Self {
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        TokenizeError {
            kind,
            offset,
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_error_position() {
        let source = "let a = 1;\nlet b = 'oops";
        let err = TokenizeError::at(source, 19, TokenizeErrorKind::UnterminatedString);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 9);
        assert_eq!(
            err.to_string(),
            "Tokenize error at line 2, column 9: unterminated string literal"
        );
    }

    #[test]
    fn test_untranslatable_keyword_message() {
        let err = Error::UntranslatableKeyword {
            keyword: "async".to_string(),
            from: "javascript".to_string(),
            to: "tiny".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Keyword 'async' of subset 'javascript' has no translation in subset 'tiny'"
        );
    }
}
