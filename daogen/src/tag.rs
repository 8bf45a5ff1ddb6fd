//! Parser for `key:"value"` annotation strings.
//!
//! The string carried by `#[dao("...")]` is a whitespace-separated list of
//! pairs such as `column:"id" identity:"true"`. Values must be double-quoted
//! and may contain the escapes `\"`, `\\`, `\'`, `\n`, `\t`, `\r` and `\0`.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Syntax error in an annotation string. Offsets are byte positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("expected a key at byte {offset}")]
    EmptyKey { offset: usize },

    #[error("expected `:` after key `{key}` at byte {offset}")]
    MissingColon { key: String, offset: usize },

    #[error("expected `\"` to open the value of `{key}` at byte {offset}")]
    MissingQuote { key: String, offset: usize },

    #[error("unterminated value for `{key}` starting at byte {offset}")]
    Unterminated { key: String, offset: usize },

    #[error("unknown escape `\\{escape}` in value of `{key}` at byte {offset}")]
    BadEscape { key: String, escape: char, offset: usize },
}

/// Parsed annotation string, pairs kept in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTag {
    pairs: Vec<(String, String)>,
}

impl FieldTag {
    /// Parse an annotation string.
    pub fn parse(input: &str) -> Result<Self, TagError> {
        let mut pairs = Vec::new();
        let mut chars = input.char_indices().peekable();

        loop {
            skip_whitespace(&mut chars);
            let Some(&(start, _)) = chars.peek() else {
                break;
            };

            let mut key = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_whitespace() || c.is_control() || c == ':' || c == '"' {
                    break;
                }
                key.push(c);
                chars.next();
            }
            if key.is_empty() {
                return Err(TagError::EmptyKey { offset: start });
            }

            skip_whitespace(&mut chars);
            match chars.next() {
                Some((_, ':')) => {}
                other => {
                    return Err(TagError::MissingColon {
                        key,
                        offset: other.map_or(input.len(), |(i, _)| i),
                    });
                }
            }

            skip_whitespace(&mut chars);
            let open = match chars.next() {
                Some((i, '"')) => i,
                other => {
                    return Err(TagError::MissingQuote {
                        key,
                        offset: other.map_or(input.len(), |(i, _)| i),
                    });
                }
            };

            let value = read_quoted(&mut chars, &key, open)?;
            pairs.push((key, value));
        }

        Ok(Self { pairs })
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

}

fn skip_whitespace(chars: &mut Peekable<CharIndices<'_>>) {
    while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
}

/// Read a value up to its closing quote. The opening quote is already consumed.
fn read_quoted(chars: &mut Peekable<CharIndices<'_>>, key: &str, open: usize) -> Result<String, TagError> {
    let mut value = String::new();
    loop {
        match chars.next() {
            None => {
                return Err(TagError::Unterminated {
                    key: key.to_string(),
                    offset: open,
                });
            }
            Some((_, '"')) => return Ok(value),
            Some((at, '\\')) => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, '\'')) => value.push('\''),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, '0')) => value.push('\0'),
                Some((_, escape)) => {
                    return Err(TagError::BadEscape {
                        key: key.to_string(),
                        escape,
                        offset: at,
                    });
                }
                None => {
                    return Err(TagError::Unterminated {
                        key: key.to_string(),
                        offset: open,
                    });
                }
            },
            Some((_, c)) => value.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs_in_order() {
        let tag = FieldTag::parse(r#"column:"first_name" updatable:"false""#).unwrap();
        assert_eq!(tag.pairs.len(), 2);
        assert_eq!(tag.get("column"), Some("first_name"));
        assert_eq!(tag.get("updatable"), Some("false"));
        assert_eq!(tag.get("identity"), None);
        assert!(tag.contains_key("updatable"));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let tag = FieldTag::parse("  column : \"id\"\n\tidentity:\"true\"  ").unwrap();
        assert_eq!(tag.get("column"), Some("id"));
        assert_eq!(tag.get("identity"), Some("true"));
    }

    #[test]
    fn test_adjacent_pairs_without_separator() {
        let tag = FieldTag::parse(r#"a:"1"b:"2""#).unwrap();
        assert_eq!(tag.get("a"), Some("1"));
        assert_eq!(tag.get("b"), Some("2"));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let tag = FieldTag::parse(r#"column:"a" column:"b""#).unwrap();
        assert_eq!(tag.get("column"), Some("a"));
        assert_eq!(tag.pairs.len(), 2);
    }

    #[test]
    fn test_escapes_and_empty_values() {
        let tag = FieldTag::parse(r#"note:"say \"hi\"\n" column:"""#).unwrap();
        assert_eq!(tag.get("note"), Some("say \"hi\"\n"));
        assert_eq!(tag.get("column"), Some(""));
    }

    #[test]
    fn test_empty_input() {
        assert!(FieldTag::parse("").unwrap().pairs.is_empty());
        assert!(FieldTag::parse("   ").unwrap().pairs.is_empty());
    }

    #[test]
    fn test_unquoted_value_is_rejected() {
        let err = FieldTag::parse("column:id").unwrap_err();
        assert_eq!(
            err,
            TagError::MissingQuote {
                key: "column".to_string(),
                offset: 7
            }
        );
    }

    #[test]
    fn test_missing_colon() {
        let err = FieldTag::parse(r#"column "id""#).unwrap_err();
        assert!(matches!(err, TagError::MissingColon { ref key, offset: 7 } if key == "column"));

        let err = FieldTag::parse("column").unwrap_err();
        assert!(matches!(err, TagError::MissingColon { offset: 6, .. }));
    }

    #[test]
    fn test_unterminated_and_bad_escape() {
        let err = FieldTag::parse(r#"column:"id"#).unwrap_err();
        assert!(matches!(err, TagError::Unterminated { offset: 7, .. }));

        let err = FieldTag::parse(r#"column:"a\qb""#).unwrap_err();
        assert!(matches!(err, TagError::BadEscape { escape: 'q', offset: 9, .. }));
    }

    #[test]
    fn test_empty_key() {
        let err = FieldTag::parse(r#":"id""#).unwrap_err();
        assert_eq!(err, TagError::EmptyKey { offset: 0 });
    }
}
