// Copyright (c) The quick-trx Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture name resolution.
//!
//! A TRX test definition's `className` may be a bare type name, a fully
//! assembly-qualified name
//! (`Namespace.Type, Assembly, Version=..., Culture=..., PublicKeyToken=...`),
//! or a generic type name containing `<...>` markers. The report groups
//! tests under a short, human-legible key derived from it.
//!
//! The shortening is a heuristic: two distinct fully-qualified names that
//! share a suffix after prefix stripping collapse to the same key. That
//! trade of strict uniqueness for readability is intentional.

/// Derives a fixture grouping key from a `className` attribute.
///
/// `file_stem` is the result file's base name without extension, which for
/// MSTest output usually matches the assembly name and therefore makes a
/// good redundant-namespace prefix to strip.
///
/// Returns an empty string when the class name is absent.
pub(crate) fn fixture_name(class_name: Option<&str>, file_stem: &str) -> String {
    let Some(class_name) = class_name else {
        return String::new();
    };

    // Split on commas from the right, discarding trailing `key=value`
    // assembly metadata segments. Generic-bracketed names carry no such
    // segments and survive verbatim.
    let segments: Vec<&str> = class_name.split(',').collect();
    let kept = segments.len()
        - segments
            .iter()
            .rev()
            .take_while(|segment| segment.contains('='))
            .count();
    let segments = &segments[..kept];

    // A remaining trailing segment that is not a generic marker is the
    // assembly name; the rest, rejoined, is the type name.
    let (type_name, assembly_name) = match segments.split_last() {
        Some((last, rest)) if !rest.is_empty() && !last.contains('>') => {
            (rest.join(","), last.trim())
        }
        _ => (segments.join(","), ""),
    };

    // Two candidate prefixes to strip; keep whichever result is shortest,
    // with the file-stem candidate winning ties.
    let from_file_stem = strip_prefix(&type_name, file_stem);
    let from_assembly = strip_prefix(&type_name, assembly_name);
    if from_assembly.len() < from_file_stem.len() {
        from_assembly
    } else {
        from_file_stem
    }
}

/// Removes a leading `prefix.`, or everything through the last `.prefix.`
/// occurrence, from `type_name`.
fn strip_prefix(type_name: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return type_name.to_owned();
    }
    let leading = format!("{prefix}.");
    if let Some(rest) = type_name.strip_prefix(&leading) {
        return rest.to_owned();
    }
    let embedded = format!(".{prefix}.");
    match type_name.rfind(&embedded) {
        Some(index) => type_name[index + embedded.len()..].to_owned(),
        None => type_name.to_owned(),
    }
}
