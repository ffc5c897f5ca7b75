//! Folder display labels.
//!
//! Folder names come straight from directory names, which tend to be
//! filesystem-friendly (`spring-gala`, `staff_party_2024`). Display labels
//! humanize them: hyphens and underscores become spaces. The raw name stays
//! the unique key everywhere; only the label changes.
//!
//! A folder without a logo is represented by an initial-letter badge derived
//! from its label.

/// Display label for a folder name: hyphens and underscores become spaces.
///
/// - `"spring-gala"` → `"spring gala"`
/// - `"staff_party_2024"` → `"staff party 2024"`
/// - `"Alumni"` → `"Alumni"`
pub fn folder_label(name: &str) -> String {
    name.replace(['-', '_'], " ")
}

/// Single-character badge for folders with no logo: the first alphanumeric
/// character of the label, uppercased. Falls back to `"?"` when the name has
/// none.
pub fn initial_badge(name: &str) -> String {
    folder_label(name)
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphens_become_spaces() {
        assert_eq!(folder_label("spring-gala"), "spring gala");
    }

    #[test]
    fn underscores_become_spaces() {
        assert_eq!(folder_label("staff_party_2024"), "staff party 2024");
    }

    #[test]
    fn mixed_separators() {
        assert_eq!(folder_label("open-house_2023"), "open house 2023");
    }

    #[test]
    fn plain_name_unchanged() {
        assert_eq!(folder_label("Alumni"), "Alumni");
    }

    #[test]
    fn badge_is_uppercased_first_letter() {
        assert_eq!(initial_badge("spring-gala"), "S");
        assert_eq!(initial_badge("alumni"), "A");
    }

    #[test]
    fn badge_skips_leading_separators() {
        assert_eq!(initial_badge("_drafts"), "D");
    }

    #[test]
    fn badge_accepts_digits() {
        assert_eq!(initial_badge("2024-reunion"), "2");
    }

    #[test]
    fn badge_falls_back_for_empty_name() {
        assert_eq!(initial_badge(""), "?");
        assert_eq!(initial_badge("---"), "?");
    }
}
