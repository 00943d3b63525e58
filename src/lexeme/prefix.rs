use super::{Kind, TokenType, TokenTypeId};

impl TokenType {
    /// A token type matching when the lexeme begins with `text` and has a non-empty
    /// remainder. The emitted token's text is `text` itself; the remainder is exposed via
    /// [TokenType::prefix_split].
    pub fn prefix(text: impl Into<String>) -> Self {
        Self {
            id: TokenTypeId::next(),
            kind: Kind::Prefix { text: text.into() },
        }
    }

    /// If this prefix matches `text`, returns `(matched_text, remaining_right)`.
    pub(crate) fn prefix_split(&self, text: &str) -> Option<(String, String)> {
        let prefix = match &self.kind {
            Kind::Prefix { text } => text.as_str(),
            _ => return None,
        };
        let remainder = text.strip_prefix(prefix)?;
        if remainder.is_empty() {
            return None;
        }
        Some((prefix.to_string(), remainder.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_prefix_from_remainder() {
        let plus = TokenType::prefix("+");
        assert_eq!(
            plus.prefix_split("+x"),
            Some(("+".to_string(), "x".to_string()))
        );
        assert_eq!(plus.prefix_split("+"), None);
        assert_eq!(plus.prefix_split("x"), None);
    }
}
