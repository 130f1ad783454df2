//! Identifiers and the naming service that produces them.
//!
//! A [`Name`] keeps the raw string exactly as it was found in a schema source
//! together with its split into lowercase words. Everything in the schema model
//! is named with one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A normalized identifier with its raw string form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Name {
    raw: String,
    words: Vec<String>,
}

impl Name {
    /// Create a name from a raw string using the default word split
    pub fn new(raw: impl Into<String>) -> Self {
        DefaultNaming.string_to_name(&raw.into())
    }

    /// Create a name from an explicit word split
    pub fn with_words(raw: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            raw: raw.into(),
            words,
        }
    }

    /// The raw identifier as written in the schema source
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn to_snake_case(&self) -> String {
        self.words.join("_")
    }

    pub fn to_pascal_case(&self) -> String {
        self.words
            .iter()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                }
            })
            .collect()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for Name {
    fn from(raw: String) -> Self {
        Name::new(raw)
    }
}

impl From<&str> for Name {
    fn from(raw: &str) -> Self {
        Name::new(raw)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.raw
    }
}

/// Identifier-normalization service injected into every adaptor
pub trait Naming: Send + Sync {
    /// Convert a raw string into a canonical identifier
    fn string_to_name(&self, value: &str) -> Name;
}

/// Splits on `_`, `-`, whitespace and lower-to-upper camel case boundaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNaming;

impl Naming for DefaultNaming {
    fn string_to_name(&self, value: &str) -> Name {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut prev_lower = false;

        for ch in value.chars() {
            if ch == '_' || ch == '-' || ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                prev_lower = false;
                continue;
            }
            if ch.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            current.extend(ch.to_lowercase());
        }
        if !current.is_empty() {
            words.push(current);
        }

        Name::with_words(value, words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_naming_splits_words() {
        let naming = DefaultNaming;
        assert_eq!(naming.string_to_name("test_table").words(), ["test", "table"]);
        assert_eq!(naming.string_to_name("OrderLine").words(), ["order", "line"]);
        assert_eq!(naming.string_to_name("item-2 count").words(), ["item", "2", "count"]);
        assert_eq!(naming.string_to_name("ID").words(), ["id"]);
    }

    #[test]
    fn test_name_renderings() {
        let name = Name::new("customerOrder_line");
        assert_eq!(name.raw(), "customerOrder_line");
        assert_eq!(name.to_snake_case(), "customer_order_line");
        assert_eq!(name.to_pascal_case(), "CustomerOrderLine");
        assert_eq!(name.to_string(), "customerOrder_line");
    }

    #[test]
    fn test_names_compare_by_raw_string() {
        assert_eq!(Name::new("a_b"), Name::with_words("a_b", vec![]));
        assert_ne!(Name::new("a_b"), Name::new("A_B"));
    }
}
