//! Offset-tracked keyword rewriting
//!
//! A [`Translation`] is one translation call: it borrows the dictionary and
//! both keyword sets, owns its running offset, and walks a token stream once,
//! left to right. Token ranges always refer to the original text; the running
//! offset reprojects them onto the partially rewritten text, so no token is
//! ever re-scanned after a replacement.

use crate::error::Result;
use crate::lexems::{KeywordSet, Lexems};
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use tracing::{debug, trace};

/// State of one translation from subset `source` to subset `destination`
#[derive(Debug)]
pub struct Translation<'a> {
    lexems: &'a Lexems,
    source: &'a KeywordSet,
    destination: &'a KeywordSet,
    offset: isize,
}

impl<'a> Translation<'a> {
    /// Resolve both subsets; fails with `UnknownSubset` before any text is touched
    pub fn new(lexems: &'a Lexems, from: &str, to: &str) -> Result<Self> {
        Ok(Translation {
            lexems,
            source: lexems.get_keywords(from)?,
            destination: lexems.get_keywords(to)?,
            offset: 0,
        })
    }

    pub fn source(&self) -> &'a KeywordSet {
        self.source
    }

    pub fn destination(&self) -> &'a KeywordSet {
        self.destination
    }

    /// Net length drift, in bytes, introduced so far
    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Tokenize `text` with the source vocabulary and rewrite its keywords
    pub fn run(mut self, text: &str) -> Result<String> {
        let tokens = Tokenizer::new(self.source).tokenize(text)?;
        let translated = self.replace_tokens(text, &tokens)?;
        debug!(
            from = self.source.name(),
            to = self.destination.name(),
            tokens = tokens.len(),
            offset = self.offset,
            "Translated source"
        );
        Ok(translated)
    }

    /// Replace every target token of `tokens` in `text`
    ///
    /// `tokens` must come from tokenizing `text`: ordered, non-overlapping,
    /// on character boundaries. Nothing is returned unless every target
    /// translated.
    fn replace_tokens(&mut self, text: &str, tokens: &[Token<'_>]) -> Result<String> {
        let mut result = text.to_string();
        let mut replaced = 0usize;

        for token in tokens {
            if !self.is_target_token(token) {
                continue;
            }

            let start = self.apply_offset(token.range.start);
            let end = self.apply_offset(token.range.end);
            let translated = self.translate(token.value)?;

            trace!(
                keyword = token.value,
                translated,
                start,
                end,
                offset = self.offset,
                "Replacing keyword"
            );
            result.replace_range(start..end, translated);

            self.increment_offset(token.value)?;
            replaced += 1;
        }

        debug!(replaced, "Replaced keywords");
        Ok(result)
    }

    /// Keyword tokens spelled as a keyword of the source subset
    pub fn is_target_token(&self, token: &Token<'_>) -> bool {
        token.kind == TokenKind::Keyword && self.source.contains_spelling(token.value)
    }

    /// Destination spelling of a source keyword
    pub fn translate(&self, keyword: &str) -> Result<&'a str> {
        self.lexems
            .translate(keyword, self.source.name(), self.destination.name())
    }

    /// Position in the rewritten text of an original-text `position`
    pub fn apply_offset(&self, position: usize) -> usize {
        position.saturating_add_signed(self.offset)
    }

    fn increment_offset(&mut self, keyword: &str) -> Result<()> {
        self.offset += self.lexems.translation_offset(
            keyword,
            self.source.name(),
            self.destination.name(),
        )?;
        Ok(())
    }
}
