//! Keyword dictionaries
//!
//! A [`KeywordSet`] maps canonical keyword identifiers (the standard JavaScript
//! spellings) to the spellings one subset uses, and keeps the inverse mapping
//! so that a spelling can be looked up directly. [`Lexems`] holds every known
//! subset and answers the cross-subset questions the translator asks:
//! what does this spelling become, and how much longer or shorter is it.

use crate::error::{Error, Result};
use crate::loader::{load_all_lexems_from_dir, parse_lexems};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const BUILTIN_LEXEMS: &[(&str, &str)] = &[
    ("javascript", include_str!("../lexems/javascript.json")),
    ("yourscript", include_str!("../lexems/yourscript.json")),
];

/// One subset's keyword vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    name: String,
    // canonical -> spelling
    keywords: BTreeMap<String, String>,
    // spelling -> canonical
    spellings: HashMap<String, String>,
}

impl KeywordSet {
    /// Build a keyword set from `(canonical, spelling)` pairs
    ///
    /// Fails with [`Error::DuplicateSpelling`] when two canonical keywords
    /// share one spelling, since such a set cannot be inverted.
    pub fn from_pairs<I, K, V>(name: &str, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let keywords: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(canonical, spelling)| (canonical.into(), spelling.into()))
            .collect();

        let mut spellings = HashMap::with_capacity(keywords.len());
        for (canonical, spelling) in &keywords {
            if spellings
                .insert(spelling.clone(), canonical.clone())
                .is_some()
            {
                return Err(Error::DuplicateSpelling {
                    subset: name.to_string(),
                    spelling: spelling.clone(),
                });
            }
        }

        Ok(KeywordSet {
            name: name.to_string(),
            keywords,
            spellings,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spelling of a canonical keyword in this subset
    pub fn spelling(&self, canonical: &str) -> Option<&str> {
        self.keywords.get(canonical).map(String::as_str)
    }

    /// Canonical keyword behind a spelling of this subset
    pub fn canonical(&self, spelling: &str) -> Option<&str> {
        self.spellings.get(spelling).map(String::as_str)
    }

    pub fn contains_spelling(&self, spelling: &str) -> bool {
        self.spellings.contains_key(spelling)
    }

    /// `(canonical, spelling)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keywords
            .iter()
            .map(|(canonical, spelling)| (canonical.as_str(), spelling.as_str()))
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Registry of keyword subsets
///
/// Read-only once built, so a single instance can serve concurrent
/// translations behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Lexems {
    subsets: HashMap<String, KeywordSet>,
}

impl Lexems {
    /// An empty registry
    pub fn new() -> Self {
        Lexems::default()
    }

    /// Registry with the subsets shipped in this crate: `javascript` and `yourscript`
    pub fn builtin() -> Result<Self> {
        let mut lexems = Lexems::new();
        for (name, content) in BUILTIN_LEXEMS {
            let path = Path::new("lexems").join(format!("{}.json", name));
            lexems.with_subset(parse_lexems(name, content, &path)?);
        }
        Ok(lexems)
    }

    /// Registry loaded from a folder of `<subset>.json` files
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Ok(Lexems {
            subsets: load_all_lexems_from_dir(dir)?,
        })
    }

    /// Register a subset, replacing any subset with the same name
    pub fn with_subset(&mut self, set: KeywordSet) -> &mut Self {
        self.subsets.insert(set.name().to_string(), set);
        self
    }

    /// Names of all registered subsets, sorted
    pub fn subsets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.subsets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get_keywords(&self, subset: &str) -> Result<&KeywordSet> {
        self.subsets.get(subset).ok_or_else(|| Error::UnknownSubset {
            subset: subset.to_string(),
        })
    }

    /// Translate one keyword spelling from subset `from` to subset `to`
    pub fn translate(&self, spelling: &str, from: &str, to: &str) -> Result<&str> {
        let source = self.get_keywords(from)?;
        let destination = self.get_keywords(to)?;

        source
            .canonical(spelling)
            .and_then(|canonical| destination.spelling(canonical))
            .ok_or_else(|| Error::UntranslatableKeyword {
                keyword: spelling.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Length change, in bytes, caused by translating `spelling`
    pub fn translation_offset(&self, spelling: &str, from: &str, to: &str) -> Result<isize> {
        let translated = self.translate(spelling, from, to)?;
        Ok(translated.len() as isize - spelling.len() as isize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Lexems {
        let mut lexems = Lexems::new();
        lexems
            .with_subset(
                KeywordSet::from_pairs(
                    "javascript",
                    [("if", "if"), ("return", "return"), ("async", "async")],
                )
                .unwrap(),
            )
            .with_subset(
                KeywordSet::from_pairs("dialect", [("if", "whenever"), ("return", "giveback")])
                    .unwrap(),
            );
        lexems
    }

    #[test]
    fn test_keyword_set_inversion() {
        let set = KeywordSet::from_pairs("dialect", [("if", "whenever"), ("else", "otherwise")])
            .unwrap();
        assert_eq!(set.canonical("whenever"), Some("if"));
        assert_eq!(set.spelling("else"), Some("otherwise"));
        assert!(set.contains_spelling("otherwise"));
        assert!(!set.contains_spelling("if"));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![("else", "otherwise"), ("if", "whenever")]
        );
    }

    #[test]
    fn test_keyword_set_rejects_duplicate_spelling() {
        let err = KeywordSet::from_pairs("broken", [("if", "when"), ("case", "when")]).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateSpelling { ref spelling, .. } if spelling == "when"
        ));
    }

    #[test]
    fn test_translate() {
        let lexems = sample();
        assert_eq!(lexems.translate("if", "javascript", "dialect").unwrap(), "whenever");
        assert_eq!(lexems.translate("giveback", "dialect", "javascript").unwrap(), "return");
        assert_eq!(lexems.translate("if", "javascript", "javascript").unwrap(), "if");
    }

    #[test]
    fn test_translation_offset() {
        let lexems = sample();
        assert_eq!(lexems.translation_offset("if", "javascript", "dialect").unwrap(), 6);
        assert_eq!(lexems.translation_offset("return", "javascript", "dialect").unwrap(), 2);
        assert_eq!(lexems.translation_offset("whenever", "dialect", "javascript").unwrap(), -6);
    }

    #[test]
    fn test_untranslatable_keyword() {
        let lexems = sample();
        let err = lexems.translate("async", "javascript", "dialect").unwrap_err();
        assert!(matches!(err, Error::UntranslatableKeyword { ref keyword, .. } if keyword == "async"));

        // Not a keyword of the source subset at all
        assert!(lexems.translate("whenever", "javascript", "dialect").is_err());
    }

    #[test]
    fn test_unknown_subset() {
        let lexems = sample();
        let err = lexems.get_keywords("klingon").unwrap_err();
        assert!(matches!(err, Error::UnknownSubset { ref subset } if subset == "klingon"));
        assert!(lexems.translate("if", "javascript", "klingon").is_err());
    }

    #[test]
    fn test_builtin_subsets_are_bijective() {
        let lexems = Lexems::builtin().unwrap();
        assert_eq!(lexems.subsets(), vec!["javascript", "yourscript"]);

        let javascript = lexems.get_keywords("javascript").unwrap();
        let yourscript = lexems.get_keywords("yourscript").unwrap();
        assert_eq!(javascript.len(), yourscript.len());
        for (canonical, spelling) in javascript.iter() {
            assert_eq!(canonical, spelling);
            assert!(yourscript.spelling(canonical).is_some(), "missing {}", canonical);
        }
        assert_eq!(yourscript.spelling("if"), Some("whenever"));
        assert_eq!(yourscript.spelling("return"), Some("giveback"));
    }
}
