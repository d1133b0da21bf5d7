//! Text helpers for slugs and search tags.

/// Turn a shop name into a URL slug.
///
/// ```
/// use artisania_core::slugify;
///
/// assert_eq!(slugify("Atelier Zellige & Co."), "atelier-zellige-co");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Derive product tags from its name and description.
///
/// Tags are the lowercase words longer than two characters, in first-seen
/// order without duplicates.
#[must_use]
pub fn derive_tags(name: &str, description: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let words = name
        .split(|c: char| !c.is_alphanumeric())
        .chain(description.split(|c: char| !c.is_alphanumeric()));
    for word in words {
        if word.chars().count() <= 2 {
            continue;
        }
        let word = word.to_lowercase();
        if !tags.contains(&word) {
            tags.push(word);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Dar  Tazi -- Pottery "), "dar-tazi-pottery");
        assert_eq!(slugify("Ébène"), "ébène");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_derive_tags() {
        let tags = derive_tags("Blue Fes Bowl", "A hand-painted bowl of blue clay");
        assert_eq!(tags, vec!["blue", "fes", "bowl", "hand", "painted", "clay"]);
    }

    #[test]
    fn test_derive_tags_empty() {
        assert!(derive_tags("", "an of to").is_empty());
    }
}
