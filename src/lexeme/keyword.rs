use super::{Kind, TokenType, TokenTypeId};

impl TokenType {
    /// A token type matching one exact string value.
    ///
    /// When `case_sensitive` is `false`, the lexer additionally accepts a lexeme whose
    /// uppercased form equals this keyword's configured text (see
    /// [Lexer](crate::Lexer)'s classification rules).
    pub fn keyword(text: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            id: TokenTypeId::next(),
            kind: Kind::Keyword {
                text: text.into(),
                case_sensitive,
            },
        }
    }

    pub(crate) fn keyword_text(&self) -> Option<&str> {
        match &self.kind {
            Kind::Keyword { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    pub(crate) fn is_case_sensitive(&self) -> bool {
        match &self.kind {
            Kind::Keyword { case_sensitive, .. } => *case_sensitive,
            _ => true,
        }
    }
}
