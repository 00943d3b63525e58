use super::{Kind, TokenType, TokenTypeId};

impl TokenType {
    /// A token type matching when the lexeme ends with `text` and has a non-empty remainder
    /// to its left. The emitted token's text is `text` itself; the remainder is exposed via
    /// [TokenType::postfix_split].
    pub fn postfix(text: impl Into<String>) -> Self {
        Self {
            id: TokenTypeId::next(),
            kind: Kind::Postfix { text: text.into() },
        }
    }

    /// If this postfix matches `text`, returns `(remaining_left, matched_text)`.
    pub(crate) fn postfix_split(&self, text: &str) -> Option<(String, String)> {
        let postfix = match &self.kind {
            Kind::Postfix { text } => text.as_str(),
            _ => return None,
        };
        let remainder = text.strip_suffix(postfix)?;
        if remainder.is_empty() {
            return None;
        }
        Some((remainder.to_string(), postfix.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_remainder_from_postfix() {
        let semi = TokenType::postfix(";");
        assert_eq!(
            semi.postfix_split("x;"),
            Some(("x".to_string(), ";".to_string()))
        );
        assert_eq!(semi.postfix_split(";"), None);
        assert_eq!(semi.postfix_split("x"), None);
    }
}
