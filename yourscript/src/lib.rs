//! Translate JavaScript sources between keyword subsets
//!
//! A subset is a keyword vocabulary over the otherwise unchanged JavaScript
//! grammar. Translation rewrites keyword tokens only; strings, comments,
//! regular expressions, identifiers and whitespace come out byte for byte.
//!
//! ```ignore
//! use yourscript::{Config, ParseOptions, YourScript};
//!
//! let yourscript = YourScript::new(Config::default())?;
//! let dialect = yourscript.parse("if (x) { return y; }", &ParseOptions::default())?;
//! assert_eq!(dialect, "whenever (x) { giveback y; }");
//!
//! let back = yourscript.translate_source(&dialect, "yourscript", "javascript")?;
//! assert_eq!(back, "if (x) { return y; }");
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod error;
pub mod lexems;
pub mod loader;
pub mod tokenizer;
pub mod translator;


pub use error::{Error, Result, TokenizeError, TokenizeErrorKind};
pub use lexems::{KeywordSet, Lexems};
pub use loader::{load_all_lexems_from_dir, load_lexems_from_file};
pub use tokenizer::{Token, TokenKind, Tokenizer};
pub use translator::Translation;

pub const DEFAULT_SOURCE_SUBSET: &str = "javascript";
pub const DEFAULT_DESTINATION_SUBSET: &str = "yourscript";

/// Instance configuration
///
/// Deserializes from JSON such as
/// `{ "lexemsFolder": "lexems", "from": "javascript", "to": "yourscript" }`;
/// every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Folder of `<subset>.json` files; the built-in subsets are used when absent
    pub lexems_folder: Option<PathBuf>,
    /// Subset to translate from
    pub from: String,
    /// Subset to translate to
    pub to: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lexems_folder: None,
            from: DEFAULT_SOURCE_SUBSET.to_string(),
            to: DEFAULT_DESTINATION_SUBSET.to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Per-call subset selection; unset fields fall back to the instance [`Config`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ParseOptions {
    pub fn with_from(mut self, subset: &str) -> Self {
        self.from = Some(subset.to_string());
        self
    }

    pub fn with_to(mut self, subset: &str) -> Self {
        self.to = Some(subset.to_string());
        self
    }
}

/// Keyword translator
///
/// Holds the dictionary and the default subset pair. Every call resolves its
/// own subsets and running offset, so one instance can be shared freely.
#[derive(Debug, Clone)]
pub struct YourScript {
    lexems: Arc<Lexems>,
    config: Config,
}

impl YourScript {
    /// Build a translator, loading the lexems folder named by `config` if any
    pub fn new(config: Config) -> Result<Self> {
        let lexems = match &config.lexems_folder {
            Some(folder) => Lexems::from_dir(folder)?,
            None => Lexems::builtin()?,
        };
        Ok(YourScript::with_lexems(Arc::new(lexems), config))
    }

    /// Build a translator over an already loaded dictionary
    pub fn with_lexems(lexems: Arc<Lexems>, config: Config) -> Self {
        YourScript { lexems, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lexems(&self) -> &Lexems {
        &self.lexems
    }

    /// The `(from, to)` subset pair `options` selects, after defaults
    pub fn resolve_subsets<'a>(&'a self, options: &'a ParseOptions) -> (&'a str, &'a str) {
        (
            options.from.as_deref().unwrap_or(&self.config.from),
            options.to.as_deref().unwrap_or(&self.config.to),
        )
    }

    /// Translate `text` between the subsets chosen by `options`
    pub fn parse(&self, text: &str, options: &ParseOptions) -> Result<String> {
        let (from, to) = self.resolve_subsets(options);
        self.translate_source(text, from, to)
    }

    /// Translate `text` from subset `from` to subset `to`
    pub fn translate_source(&self, text: &str, from: &str, to: &str) -> Result<String> {
        Translation::new(&self.lexems, from, to)?.run(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.from, "javascript");
        assert_eq!(config.to, "yourscript");
        assert_eq!(config.lexems_folder, None);
    }

    #[test]
    fn test_config_from_json() {
        let config: Config = serde_json::from_str(r#"{ "lexemsFolder": "my/lexems", "to": "dialect" }"#)
            .unwrap();
        assert_eq!(config.lexems_folder, Some(PathBuf::from("my/lexems")));
        assert_eq!(config.from, "javascript");
        assert_eq!(config.to, "dialect");
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yourscript.config.json");
        fs::write(&path, r#"{ "from": "yourscript", "to": "javascript" }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.from, "yourscript");
        assert_eq!(config.to, "javascript");

        assert!(Config::from_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_parse_with_defaults() {
        let yourscript = YourScript::new(Config::default()).unwrap();
        assert_eq!(
            yourscript
                .parse("if (x) { y(); }", &ParseOptions::default())
                .unwrap(),
            "whenever (x) { y(); }"
        );
    }

    #[test]
    fn test_parse_options_override_only_that_call() {
        let yourscript = YourScript::new(Config::default()).unwrap();
        let options = ParseOptions::default()
            .with_from("yourscript")
            .with_to("javascript");
        assert_eq!(
            yourscript.parse("whenever (x) giveback;", &options).unwrap(),
            "if (x) return;"
        );

        // The instance defaults are untouched
        assert_eq!(yourscript.config().from, "javascript");
        assert_eq!(
            yourscript.parse("return", &ParseOptions::default()).unwrap(),
            "giveback"
        );
    }

    #[test]
    fn test_resolve_subsets() {
        let yourscript = YourScript::new(Config::default()).unwrap();
        assert_eq!(
            yourscript.resolve_subsets(&ParseOptions::default()),
            ("javascript", "yourscript")
        );
        assert_eq!(
            yourscript.resolve_subsets(&ParseOptions::default().with_from("yourscript")),
            ("yourscript", "yourscript")
        );
        assert_eq!(
            yourscript.resolve_subsets(&ParseOptions::default().with_to("javascript")),
            ("javascript", "javascript")
        );
    }

    #[test]
    fn test_new_with_lexems_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("javascript.json"), r#"{ "if": "if" }"#).unwrap();
        fs::write(dir.path().join("short.json"), r#"{ "if": "if_" }"#).unwrap();

        let config = Config {
            lexems_folder: Some(dir.path().to_path_buf()),
            to: "short".to_string(),
            ..Config::default()
        };
        let yourscript = YourScript::new(config).unwrap();
        assert_eq!(yourscript.lexems().subsets(), vec!["javascript", "short"]);
        assert_eq!(
            yourscript.parse("if (a) if (b) c", &ParseOptions::default()).unwrap(),
            "if_ (a) if_ (b) c"
        );
    }

    #[test]
    fn test_unknown_subset_fails_before_tokenizing() {
        let yourscript = YourScript::new(Config::default()).unwrap();
        // Unlexable input, but the subset error comes first
        let err = yourscript
            .translate_source("'unterminated", "javascript", "klingon")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSubset { ref subset } if subset == "klingon"));
    }
}
