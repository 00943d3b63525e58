use super::{Kind, TokenType, TokenTypeId};
use regex::Regex;

impl TokenType {
    /// A token type matching the full lexeme text against a regular expression.
    ///
    /// The expression is implicitly anchored at both ends: it must match the entire
    /// accumulated lexeme, not a prefix of it.
    pub fn word(pattern: &str) -> Result<Self, String> {
        let anchored = format!("^(?:{})$", pattern);
        let regex = Regex::new(&anchored)
            .map_err(|err| format!("Word pattern should be a valid regex expression: {}", err))?;
        Ok(Self {
            id: TokenTypeId::next(),
            kind: Kind::Word { regex },
        })
    }

    pub(crate) fn word_matches(&self, text: &str) -> bool {
        match &self.kind {
            Kind::Word { regex } => regex.is_match(text),
            _ => false,
        }
    }
}
