//! Cleanup of Foundry VTT content links in exported tables.
//!
//! Foundry exports embed references as `@UUID[Compendium.pack.Item.abc]{Label}`.
//! Tables shown outside Foundry only need the label.

use std::path::Path;

const MARKER: &str = "@UUID[";

/// Replace every `@UUID[...]{label}` with `label`. Malformed references are
/// left untouched.
#[must_use]
pub fn strip_references(text: &str) -> String {
    strip(text).0
}

/// Stripped text and the number of references replaced.
fn strip(text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut replaced = 0;
    let mut rest = text;

    while let Some(start) = rest.find(MARKER) {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match split_reference(candidate) {
            Some((label, consumed)) => {
                out.push_str(label);
                replaced += 1;
                rest = &candidate[consumed..];
            }
            None => {
                out.push_str(MARKER);
                rest = &candidate[MARKER.len()..];
            }
        }
    }

    out.push_str(rest);
    (out, replaced)
}

/// Parse `@UUID[id]{label}` at the start of `text`, returning the label and
/// the number of bytes consumed.
fn split_reference(text: &str) -> Option<(&str, usize)> {
    let after_marker = &text[MARKER.len()..];
    let id_end = after_marker.find(']')?;
    if id_end == 0 {
        return None;
    }
    let after_id = &after_marker[id_end + 1..];
    let label_body = after_id.strip_prefix('{')?;
    let label_end = label_body.find('}')?;
    if label_end == 0 {
        return None;
    }
    let consumed = MARKER.len() + id_end + 2 + label_end + 1;
    Some((&label_body[..label_end], consumed))
}

/// Rewrite a file in place with references stripped. Returns how many
/// references were replaced.
///
/// # Errors
///
/// Propagates read and write failures.
pub fn strip_references_in_file(path: &Path) -> std::io::Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let (stripped, replaced) = strip(&content);
    if stripped != content {
        std::fs::write(path, stripped)?;
    }
    Ok(replaced)
}

#[cfg(test)]
#[path = "refs_test.rs"]
mod tests;
