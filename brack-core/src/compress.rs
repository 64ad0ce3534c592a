//! Short-name planning for library members.
//!
//! Long member names are mapped to `<letter><count>` codes so a later
//! minification pass can shrink shipped libraries. Only the table is built;
//! no program text is rewritten here.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::registry::{LibraryRegistry, NAME_KEY};

pub const DEFAULT_ALPHABET: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Names this short or shorter are left alone.
pub const MIN_COMPRESSED_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionEntry {
    pub full: String,
    pub short: String,
}

pub fn plan(registry: &LibraryRegistry, alphabet: &[char]) -> Result<Vec<CompressionEntry>, CoreError> {
    if alphabet.is_empty() {
        return Err(CoreError::EmptyAlphabet);
    }
    // codes are `<letter><count>`, so a repeated letter would reuse codes
    let mut letters = HashSet::new();
    if let Some(letter) = alphabet.iter().find(|letter| !letters.insert(**letter)) {
        return Err(CoreError::DuplicateLetter(*letter));
    }

    let mut names = collect_names(registry);
    // stable: equal lengths keep registry order
    names.sort_by_key(|name| Reverse(name.chars().count()));

    let ratio = names.len() / alphabet.len();
    let mut index = 0;
    let mut count = 0;
    let mut entries = Vec::with_capacity(names.len());
    for full in names {
        let short = format!("{}{}", alphabet[index], count);
        count += 1;
        if count > ratio {
            index += 1;
            count = 0;
        }
        entries.push(CompressionEntry {
            full: full.to_string(),
            short,
        });
    }

    tracing::debug!(entries = entries.len(), ratio, "planned identifier compression");
    Ok(entries)
}

fn collect_names(registry: &LibraryRegistry) -> Vec<&str> {
    let mut seen = HashSet::new();
    registry
        .iter()
        .filter(|(module, _)| *module != NAME_KEY)
        .filter_map(|(_, entry)| entry.as_module())
        .flat_map(|module| module.keys())
        .map(String::as_str)
        .filter(|name| *name != NAME_KEY && name.chars().count() > MIN_COMPRESSED_LEN)
        .filter(|name| seen.insert(*name))
        .collect()
}
