//! Utility functions and helpers.

pub mod http;
pub mod rate_limit;
pub mod url;

/// Turn a free-text name into a single safe path component.
///
/// Path separators and NUL become `_`; leading dots are stripped so a name can
/// never address a parent or hidden directory.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// File name for the `index`-th photo of a species: `Esox_lucius_3.jpg`.
pub fn photo_file_name(species: &str, index: usize, extension: &str) -> String {
    let stem = sanitize_component(species)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}.{}", stem, index, extension.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("Esox lucius"), "Esox lucius");
        assert_eq!(sanitize_component("../etc"), "_etc");
        assert_eq!(sanitize_component("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_component(".."), "_");
        assert_eq!(sanitize_component("  "), "_");
    }

    #[test]
    fn test_photo_file_name() {
        assert_eq!(photo_file_name("Esox lucius", 0, "jpg"), "Esox_lucius_0.jpg");
        assert_eq!(
            photo_file_name("Lepomis  macrochirus", 12, ".jpg"),
            "Lepomis_macrochirus_12.jpg"
        );
    }
}
