//! Parsing of wordlists returned by an LLM.
//!
//! The model is asked for `{"wordlist": [...]}` but real responses wrap the
//! JSON in a markdown code fence, return a bare array, or use a `words`
//! key. All of those are accepted.

use serde_json::Value;
use thiserror::Error;

/// A response that does not carry a wordlist.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The extracted body is not JSON.
    #[error("response is not valid JSON")]
    InvalidJson(#[from] serde_json::Error),

    /// The JSON has no list of strings where a wordlist was expected.
    #[error("response JSON does not contain a word list")]
    MissingWordlist,
}

/// Extract the candidate words from a raw model response.
///
/// Entries are trimmed; empty entries are dropped.
///
/// # Errors
///
/// [`ResponseError::InvalidJson`] when the body is not JSON and
/// [`ResponseError::MissingWordlist`] when it has the wrong shape.
pub fn parse_wordlist_response(text: &str) -> Result<Vec<String>, ResponseError> {
    let value: Value = serde_json::from_str(json_body(text))?;
    let list = match value {
        Value::Array(list) => list,
        Value::Object(mut map) => match map.remove("wordlist").or_else(|| map.remove("words")) {
            Some(Value::Array(list)) => list,
            _ => return Err(ResponseError::MissingWordlist),
        },
        _ => return Err(ResponseError::MissingWordlist),
    };

    let mut words = Vec::with_capacity(list.len());
    for entry in list {
        let Value::String(word) = entry else {
            return Err(ResponseError::MissingWordlist);
        };
        let trimmed = word.trim();
        if !trimmed.is_empty() {
            words.push(trimmed.to_owned());
        }
    }
    Ok(words)
}

/// The JSON part of `text`: the inside of a ```` ```json ```` fence, else
/// of the first plain fence, else the whole text.
fn json_body(text: &str) -> &str {
    let fenced = text
        .split_once("```json")
        .or_else(|| text.split_once("```"))
        .map(|(_, rest)| rest.split_once("```").map_or(rest, |(inner, _)| inner));
    fenced.unwrap_or(text).trim()
}
