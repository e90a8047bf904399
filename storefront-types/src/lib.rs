use derive_more::Display;
use serde::{Deserialize, Serialize};

pub mod filter;
pub mod product;
pub mod taxonomy;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[display("Men")]
    Men,
    #[display("Women")]
    Women,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Men, Gender::Women];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "men",
            Gender::Women => "women",
        }
    }

    pub fn from_slug(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "men" => Some(Gender::Men),
            "women" => Some(Gender::Women),
            _ => None,
        }
    }

    pub fn possessive(&self) -> &'static str {
        match self {
            Gender::Men => "Men's",
            Gender::Women => "Women's",
        }
    }
}

/// Lowercases the input and collapses whitespace, `-` and `_` runs into a single
/// hyphen. Other punctuation is dropped.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_dash = false;
    for ch in input.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            out.push(ch);
            prev_dash = false;
            continue;
        }
        if (ch.is_whitespace() || ch == '-' || ch == '_') && !prev_dash && !out.is_empty() {
            out.push('-');
            prev_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

pub fn same_slug(a: &str, b: &str) -> bool {
    slugify(a) == slugify(b)
}

/// `silver grey` -> `Silver Grey`, `off-white` -> `Off-White`.
pub fn capitalize_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.trim().chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace() || ch == '-';
    }
    out
}
