//! Path encoding of active filters: `color-black+fabric-cotton`.
//!
//! Tokens are `attribute-value`, sorted and joined with `+`. Values use form
//! encoding, so a space inside a value is also a `+`. A `+`-separated piece
//! that contains a literal `-` starts a new token, any other piece continues
//! the value of the previous token. To keep that unambiguous the encoder
//! escapes `-` as `%2D` in every word of a value after the first.
//!
//! Whitespace runs inside a value encode and decode as a single space. Values
//! built with [`ActiveFilter::parse`] are already collapsed, so they survive a
//! round trip unchanged.

use itertools::Itertools;
use std::collections::BTreeSet;
use storefront_types::filter::{ActiveFilter, FilterAttribute};
use url::form_urlencoded;

pub const TOKEN_SEPARATOR: char = '+';

fn encode_value(value: &str) -> String {
    value
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let encoded: String = form_urlencoded::byte_serialize(word.as_bytes()).collect();
            if i == 0 {
                encoded
            } else {
                encoded.replace('-', "%2D")
            }
        })
        .join("+")
}

fn decode_word(word: &str) -> String {
    match urlencoding::decode(word) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            log::debug!("Keeping undecodable filter word {word:?}: {err}");
            word.to_string()
        }
    }
}

pub fn encode<'a>(filters: impl IntoIterator<Item = &'a ActiveFilter>) -> String {
    filters
        .into_iter()
        .filter(|f| !f.value.trim().is_empty())
        .map(|f| format!("{}-{}", f.attribute.as_str(), encode_value(&f.value)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .join("+")
}

/// Same as [`encode`] for raw string pairs; unknown attributes are dropped.
pub fn encode_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let filters = pairs
        .into_iter()
        .filter_map(|(k, v)| ActiveFilter::parse(k.as_ref(), v.as_ref()))
        .collect::<Vec<_>>();
    encode(&filters)
}

type Token = (Option<FilterAttribute>, Vec<String>);

fn push_token(out: &mut Vec<ActiveFilter>, token: Option<Token>) {
    let Some((Some(attribute), words)) = token else {
        return;
    };
    let value = words.iter().flat_map(|w| w.split_whitespace()).join(" ");
    if value.is_empty() {
        return;
    }
    let filter = ActiveFilter::new(attribute, value);
    if !out.contains(&filter) {
        out.push(filter);
    }
}

pub fn decode(segment: &str) -> Vec<ActiveFilter> {
    let mut out = Vec::new();
    let mut current: Option<Token> = None;
    for piece in segment.trim().split(TOKEN_SEPARATOR).filter(|p| !p.is_empty()) {
        match piece.split_once('-') {
            Some((attribute, first)) => {
                push_token(&mut out, current.take());
                let attribute = FilterAttribute::from_str(attribute);
                if attribute.is_none() {
                    log::debug!("Dropping filter token with unknown attribute {piece:?}");
                }
                current = Some((attribute, vec![decode_word(first)]));
            }
            None => match current.as_mut() {
                Some((_, words)) => words.push(decode_word(piece)),
                None => log::debug!("Dropping orphan filter word {piece:?}"),
            },
        }
    }
    push_token(&mut out, current);
    out
}

/// Reads legacy `?color=black&fabric=cotton,linen` filters. Keys that are not
/// filter attributes are ignored.
pub fn filters_from_query(query: &str) -> Vec<ActiveFilter> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .flat_map(|(key, value)| {
            value
                .split(',')
                .filter_map(|v| ActiveFilter::parse(&key, v))
                .collect::<Vec<_>>()
        })
        .unique()
        .collect()
}

pub fn merge(
    filters: impl IntoIterator<Item = ActiveFilter>,
    more: impl IntoIterator<Item = ActiveFilter>,
) -> Vec<ActiveFilter> {
    filters.into_iter().chain(more).unique().collect()
}
