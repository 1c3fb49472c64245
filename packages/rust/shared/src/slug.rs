//! Identifier slugs derived from navigation labels.

/// Turn a navigation label into a resource-id segment.
///
/// Alphanumerics are kept and lowercased. A run of whitespace, `.`, `-` or `_`
/// following an alphanumeric becomes a single `_`; every other character is
/// dropped. Leading and trailing `_` are stripped.
pub fn slugify(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut was_alnum = false;

    for c in label.chars() {
        if c.is_alphanumeric() {
            was_alnum = true;
            out.extend(c.to_lowercase().filter(|l| l.is_alphanumeric()));
        } else if was_alnum && (c.is_whitespace() || matches!(c, '.' | '-' | '_')) {
            was_alnum = false;
            out.push('_');
        }
    }

    out.trim_matches('_').to_string()
}

/// Strip trailing slashes from a URL or path.
pub fn clean_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Campaign Guides"), "campaign_guides");
        assert_eq!(slugify("3. Intro - The Valley"), "3_intro_the_valley");
        assert_eq!(slugify("  Rules   Glossary  "), "rules_glossary");
        assert_eq!(slugify("one-day_missions."), "one_day_missions");
    }

    #[test]
    fn slugify_drops_other_punctuation() {
        assert_eq!(slugify("Ranger's Path"), "rangers_path");
        assert_eq!(slugify("FAQ!"), "faq");
        assert_eq!(slugify("(Optional) Rules"), "optional_rules");
    }

    #[test]
    fn slugify_is_idempotent() {
        for label in [
            "Campaign Guides",
            "3. Intro - The Valley",
            "__weird__ -- label..",
            "Lure of the Valley: Day 1",
            "",
            "---",
            "İstanbul Ünlü",
        ] {
            let once = slugify(label);
            assert_eq!(slugify(&once), once, "label {label:?}");
            assert!(!once.starts_with('_') && !once.ends_with('_'));
            assert!(!once.contains("__"));
            assert!(
                once.chars()
                    .all(|c| c == '_' || (c.is_alphanumeric() && !c.is_uppercase()))
            );
        }
    }

    #[test]
    fn slugify_lowercasing_keeps_only_alphanumerics() {
        assert_eq!(slugify("İ"), "i");
        assert_eq!(slugify(&slugify("İ")), "i");
        assert_eq!(slugify("İzmir Day"), "izmir_day");
    }

    #[test]
    fn clean_url_strips_trailing_slashes() {
        assert_eq!(clean_url("/docs/faq/"), "/docs/faq");
        assert_eq!(clean_url("/docs/faq"), "/docs/faq");
        assert_eq!(clean_url("/"), "");
    }
}
