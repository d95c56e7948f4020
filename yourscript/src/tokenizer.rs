//! JavaScript tokenizer with a pluggable keyword vocabulary
//!
//! The grammar is fixed, the keywords are not: a word is classified as a
//! [`TokenKind::Keyword`] exactly when its spelling belongs to the
//! [`KeywordSet`] the tokenizer was built with. That makes the same lexer
//! usable for standard JavaScript and for any dialect that only respells
//! keywords.
//!
//! Comments and whitespace are skipped; they never appear in the token stream.
//! Every token carries its byte range in the source text.

use crate::error::{TokenizeError, TokenizeErrorKind};
use crate::lexems::KeywordSet;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:0[xX][0-9a-fA-F_]+n?|0[oO][0-7_]+n?|0[bB][01_]+n?|(?:[0-9][0-9_]*(?:\.[0-9_]*)?|\.[0-9][0-9_]*)(?:[eE][+-]?[0-9][0-9_]*)?n?)",
    )
    .expect("number pattern is valid")
});

// Longest first, so the first prefix match is the longest one.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "<<", ">>", "**", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuator,
    Numeric,
    String,
    /// One literal chunk of a template: "`a${", "}b${" or "}c`"
    Template,
    RegularExpression,
    Boolean,
    Null,
}

/// A token and where it sits in the original source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub value: &'src str,
    /// Half-open byte range into the original source
    pub range: Range<usize>,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, value: &'src str, range: Range<usize>) -> Self {
        Token { kind, value, range }
    }
}

/// Is `c` allowed as the first character of an identifier
pub fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

/// Is `c` allowed after the first character of an identifier
pub fn is_id_continue(c: char) -> bool {
    is_id_start(c) || c.is_alphanumeric() || c == '\u{200C}' || c == '\u{200D}'
}

/// Would `name` be read back as a single word by the tokenizer
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_id_start) && chars.all(is_id_continue)
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Brace {
    /// Block or function body; a `/` after its `}` starts a regex
    Statement,
    /// Object literal or function expression body; a `/` after its `}` divides
    Expression,
    /// `${` inside a template
    Substitution,
}

/// Tokenizer bound to one keyword vocabulary
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'k> {
    keywords: &'k KeywordSet,
}

impl<'k> Tokenizer<'k> {
    pub fn new(keywords: &'k KeywordSet) -> Self {
        Tokenizer { keywords }
    }

    /// Split `source` into tokens ordered by position
    pub fn tokenize<'src>(&self, source: &'src str) -> Result<Vec<Token<'src>>, TokenizeError> {
        let mut lexer = Lexer {
            source,
            pos: 0,
            keywords: self.keywords,
            tokens: Vec::new(),
            braces: Vec::new(),
            parens: Vec::new(),
            last_paren_opener: None,
            regex_after_close: false,
        };
        lexer.run()?;
        Ok(lexer.tokens)
    }
}

struct Lexer<'src, 'k> {
    source: &'src str,
    pos: usize,
    keywords: &'k KeywordSet,
    tokens: Vec<Token<'src>>,
    braces: Vec<Brace>,
    // token indices of unmatched `(`
    parens: Vec<usize>,
    // `(` matching the most recent `)`
    last_paren_opener: Option<usize>,
    // whether a `/` right after the most recent `)` or `}` starts a regex
    regex_after_close: bool,
}

impl<'src> Lexer<'src, '_> {
    fn run(&mut self) -> Result<(), TokenizeError> {
        if self.rest().starts_with("#!") {
            self.skip_line();
        }

        loop {
            self.skip_trivia()?;
            let Some(c) = self.peek() else {
                return Ok(());
            };
            let start = self.pos;

            match c {
                '\'' | '"' => self.string(c)?,
                '`' => self.template(start)?,
                '}' if self.braces.last() == Some(&Brace::Substitution) => {
                    self.braces.pop();
                    self.template(start)?;
                }
                '#' if self.peek_nth(1).is_some_and(is_id_start) => {
                    self.bump();
                    self.eat_while(is_id_continue);
                    self.push(TokenKind::Identifier, start);
                }
                c if is_id_start(c) => self.word()?,
                '\\' if self.peek_nth(1) == Some('u') => self.word()?,
                '0'..='9' => self.number()?,
                '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.number()?,
                '/' if self.regex_allowed() => self.regex()?,
                _ => self.punctuator()?,
            }
        }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn error(&self, offset: usize, kind: TokenizeErrorKind) -> TokenizeError {
        TokenizeError::at(self.source, offset, kind)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let source = self.source;
        let range = start..self.pos;
        self.tokens
            .push(Token::new(kind, &source[range.clone()], range));
    }

    fn skip_line(&mut self) {
        self.eat_while(|c| !is_line_terminator(c));
    }

    fn skip_trivia(&mut self) -> Result<(), TokenizeError> {
        loop {
            let rest = self.rest();
            if rest.starts_with("//") || rest.starts_with("<!--") {
                self.skip_line();
            } else if rest.starts_with("/*") {
                let start = self.pos;
                match rest[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error(start, TokenizeErrorKind::UnterminatedComment)),
                }
            } else if self
                .peek()
                .is_some_and(|c| c.is_whitespace() || c == '\u{FEFF}')
            {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    fn word(&mut self) -> Result<(), TokenizeError> {
        let start = self.pos;
        let mut escaped = false;
        loop {
            if self.peek().is_some_and(is_id_continue) {
                self.bump();
            } else if self.rest().starts_with("\\u") {
                self.unicode_escape()?;
                escaped = true;
            } else {
                break;
            }
        }
        let source = self.source;
        let value = &source[start..self.pos];

        // `obj.default` and `obj?.new` are property names, not keywords
        let property_name = matches!(
            self.tokens.last(),
            Some(t) if t.kind == TokenKind::Punctuator && matches!(t.value, "." | "?.")
        );

        // An escaped spelling such as `\u0069f` never denotes a keyword
        let kind = if property_name || escaped {
            TokenKind::Identifier
        } else if self.keywords.contains_spelling(value) {
            TokenKind::Keyword
        } else {
            match value {
                "true" | "false" => TokenKind::Boolean,
                "null" => TokenKind::Null,
                _ => TokenKind::Identifier,
            }
        };
        self.push(kind, start);
        Ok(())
    }

    /// Consume `\uXXXX` or `\u{X...}` inside an identifier
    fn unicode_escape(&mut self) -> Result<(), TokenizeError> {
        let start = self.pos;
        let rest = &self.rest()[2..];
        let len = match rest.strip_prefix('{') {
            Some(body) => body
                .find('}')
                .filter(|&n| n > 0 && body[..n].chars().all(|c| c.is_ascii_hexdigit()))
                .map(|n| n + 2),
            None => rest
                .get(..4)
                .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
                .map(|_| 4),
        };
        let Some(len) = len else {
            return Err(self.error(start, TokenizeErrorKind::InvalidIdentifierEscape));
        };
        self.pos += 2 + len;
        Ok(())
    }

    fn keyword_at(&self, index: usize) -> Option<&str> {
        self.tokens
            .get(index)
            .filter(|t| t.kind == TokenKind::Keyword)
            .and_then(|t| self.keywords.canonical(t.value))
    }

    fn punctuator_at(&self, index: usize) -> Option<&'src str> {
        self.tokens
            .get(index)
            .filter(|t| t.kind == TokenKind::Punctuator)
            .map(|t| t.value)
    }

    /// Does the `(` at `opener` belong to `if`, `while`, `for` or `with`
    fn is_control_paren(&self, opener: usize) -> bool {
        opener
            .checked_sub(1)
            .and_then(|i| self.keyword_at(i))
            .is_some_and(|k| matches!(k, "if" | "while" | "for" | "with"))
    }

    /// Classify a `{` about to be pushed at the end of the token stream
    fn brace_kind(&self) -> Brace {
        let Some(prev) = self.tokens.last() else {
            return Brace::Statement;
        };
        match prev.kind {
            TokenKind::Punctuator => match prev.value {
                ")" => self.body_kind_after_paren(),
                ";" | "{" | "}" | "=>" => Brace::Statement,
                _ => Brace::Expression,
            },
            TokenKind::Keyword => match self.keywords.canonical(prev.value) {
                Some("else" | "do" | "try" | "finally") => Brace::Statement,
                _ => Brace::Expression,
            },
            // object literal right after "${"
            TokenKind::Template => Brace::Expression,
            // `class A {`, `label: {` and the like
            _ => Brace::Statement,
        }
    }

    /// A body after `)` is an expression only when it belongs to a function expression
    fn body_kind_after_paren(&self) -> Brace {
        let Some(opener) = self.last_paren_opener else {
            return Brace::Statement;
        };

        // Walk back over `function* name (`
        let mut i = opener;
        if i > 0 && self.tokens[i - 1].kind == TokenKind::Identifier {
            i -= 1;
        }
        if i > 0 && self.punctuator_at(i - 1) == Some("*") {
            i -= 1;
        }
        let Some(function) = i.checked_sub(1).filter(|&f| self.keyword_at(f) == Some("function"))
        else {
            return Brace::Statement;
        };

        let mut before = function.checked_sub(1);
        if before.is_some_and(|b| self.keyword_at(b) == Some("async")) {
            before = before.and_then(|b| b.checked_sub(1));
        }
        let Some(before) = before else {
            return Brace::Statement;
        };

        if matches!(self.punctuator_at(before), Some(";" | "{" | "}"))
            || matches!(self.keyword_at(before), Some("export" | "default"))
        {
            Brace::Statement
        } else {
            Brace::Expression
        }
    }

    fn number(&mut self) -> Result<(), TokenizeError> {
        let start = self.pos;
        let len = NUMBER
            .find(self.rest())
            .map(|m| m.end())
            .filter(|&len| len > 0)
            .ok_or_else(|| {
                let c = self.peek().unwrap_or_default();
                self.error(start, TokenizeErrorKind::UnexpectedCharacter(c))
            })?;
        self.pos += len;
        self.push(TokenKind::Numeric, start);
        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<(), TokenizeError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some(c) if c == quote => break,
                Some('\\') => {
                    if self.bump() == Some('\r') && self.peek() == Some('\n') {
                        self.bump();
                    }
                }
                Some('\n' | '\r') | None => {
                    return Err(self.error(start, TokenizeErrorKind::UnterminatedString));
                }
                Some(_) => {}
            }
        }
        self.push(TokenKind::String, start);
        Ok(())
    }

    /// Scan one template chunk starting at "`" or at the "}" closing a substitution
    fn template(&mut self, start: usize) -> Result<(), TokenizeError> {
        self.bump();
        loop {
            match self.bump() {
                Some('`') => break,
                Some('\\') => {
                    self.bump();
                }
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    self.braces.push(Brace::Substitution);
                    break;
                }
                Some(_) => {}
                None => return Err(self.error(start, TokenizeErrorKind::UnterminatedTemplate)),
            }
        }
        self.push(TokenKind::Template, start);
        Ok(())
    }

    /// A `/` starts a regex unless it follows something that ends an expression
    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(t) => match t.kind {
                TokenKind::Punctuator => match t.value {
                    ")" | "}" => self.regex_after_close,
                    "]" => false,
                    _ => true,
                },
                TokenKind::Keyword => !matches!(
                    self.keywords.canonical(t.value),
                    Some("this") | Some("super")
                ),
                _ => false,
            },
        }
    }

    fn regex(&mut self) -> Result<(), TokenizeError> {
        let start = self.pos;
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                Some('\\') => {
                    if self.bump().is_none_or(is_line_terminator) {
                        return Err(self.error(start, TokenizeErrorKind::UnterminatedRegex));
                    }
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(c) if is_line_terminator(c) => {
                    return Err(self.error(start, TokenizeErrorKind::UnterminatedRegex));
                }
                Some(_) => {}
                None => return Err(self.error(start, TokenizeErrorKind::UnterminatedRegex)),
            }
        }
        self.eat_while(is_id_continue);
        self.push(TokenKind::RegularExpression, start);
        Ok(())
    }

    fn punctuator(&mut self) -> Result<(), TokenizeError> {
        let start = self.pos;
        let rest = self.rest();
        let punctuator = PUNCTUATORS
            .iter()
            .find(|p| rest.starts_with(**p))
            // `a?.5:b` is a conditional, not optional chaining
            .filter(|p| **p != "?." || !rest[2..].starts_with(|c: char| c.is_ascii_digit()))
            .copied()
            .or_else(|| rest.starts_with('?').then_some("?"));

        let Some(punctuator) = punctuator else {
            let c = self.peek().unwrap_or_default();
            return Err(self.error(start, TokenizeErrorKind::UnexpectedCharacter(c)));
        };

        let index = self.tokens.len();
        match punctuator {
            "(" => self.parens.push(index),
            ")" => {
                let opener = self.parens.pop();
                self.regex_after_close = opener.is_some_and(|o| self.is_control_paren(o));
                self.last_paren_opener = opener;
            }
            "{" => {
                let kind = self.brace_kind();
                self.braces.push(kind);
            }
            "}" => {
                self.regex_after_close = self.braces.pop() != Some(Brace::Expression);
            }
            _ => {}
        }

        self.pos += punctuator.len();
        self.push(TokenKind::Punctuator, start);
        Ok(())
    }
}
