use crate::error::{Error, Result};
use crate::lexems::KeywordSet;
use crate::tokenizer::is_identifier_name;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Parse a lexems document into a keyword set named `subset`
///
/// The JSON document should have the following structure:
/// ```json
/// {
///     "@metadata": { ... },  // Ignored
///     "if": "whenever",
///     "return": "giveback"
/// }
/// ```
///
/// Keys are canonical keyword identifiers (the standard JavaScript spelling),
/// values are the spellings used by the subset. Entries whose value is not a
/// string, or is not shaped like an identifier, are skipped with a warning:
/// the tokenizer could never report such a spelling as a keyword.
///
/// `path` is only used for error messages.
pub fn parse_lexems(subset: &str, content: &str, path: &Path) -> Result<KeywordSet> {
    let json: Value = serde_json::from_str(content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let obj = json.as_object().ok_or_else(|| Error::InvalidLexems {
        path: path.to_path_buf(),
        message: "root must be an object".to_string(),
    })?;

    let mut pairs = Vec::with_capacity(obj.len());
    for (canonical, value) in obj {
        if canonical.starts_with('@') {
            continue;
        }

        let Some(spelling) = value.as_str() else {
            warn!(subset, keyword = %canonical, "Keyword spelling is not a string, skipping");
            continue;
        };

        if !is_identifier_name(spelling) {
            warn!(
                subset,
                keyword = %canonical,
                spelling,
                "Keyword spelling is not a valid identifier, skipping"
            );
            continue;
        }

        pairs.push((canonical.clone(), spelling.to_string()));
    }

    KeywordSet::from_pairs(subset, pairs)
}

/// Load a single lexems file
///
/// The file stem is used as the subset name: `yourscript.json` -> `"yourscript"`.
pub fn load_lexems_from_file(path: &Path) -> Result<KeywordSet> {
    let subset = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| Error::InvalidLexems {
            path: path.to_path_buf(),
            message: "file name is not a valid subset name".to_string(),
        })?;

    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_lexems(subset, &content, path)
}

/// Load every `*.json` lexems file in a directory
///
/// Returns a map from subset name to keyword set. Other files are ignored.
///
/// # Errors
/// - Directory not found or not a directory
/// - File read/parse errors
pub fn load_all_lexems_from_dir(dir: &Path) -> Result<HashMap<String, KeywordSet>> {
    if !dir.is_dir() {
        return Err(Error::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "lexems folder not found or not a directory",
            ),
        });
    }

    let entries = fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut subsets = HashMap::new();
    for entry in entries {
        let path = entry
            .map_err(|source| Error::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();

        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let set = load_lexems_from_file(&path)?;
        subsets.insert(set.name().to_string(), set);
    }

    if subsets.is_empty() {
        warn!(dir = %dir.display(), "No lexems files found");
    }

    Ok(subsets)
}
