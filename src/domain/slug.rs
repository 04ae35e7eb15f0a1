//! Slug derivation for URL lookups and accent-folded collation keys.
//!
//! Titles such as "Introducción a Rust" become `introduccion-a-rust` through
//! the `slug` crate. The same folding doubles as a collation key so that
//! title ordering treats `Árbol` like `arbol` instead of sorting accented
//! letters after `z`.

use std::cmp::Ordering;

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
    #[error("`{slug}` is not a valid slug")]
    Invalid { slug: String },
}

/// Derive a base slug from human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug the `is_unique` predicate accepts, suffixing `-2`, `-3`, ...
/// on collisions.
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    (2..=MAX_SUFFIX_ATTEMPTS + 1)
        .map(|attempt| format!("{base}-{attempt}"))
        .find(|candidate| is_unique(candidate))
        .ok_or(SlugError::Exhausted { base })
}

/// Check that a caller-supplied slug is already in canonical form.
pub fn ensure_valid_slug(slug: &str) -> Result<(), SlugError> {
    if !slug.is_empty() && slugify(slug) == slug {
        Ok(())
    } else {
        Err(SlugError::Invalid {
            slug: slug.to_string(),
        })
    }
}

/// Compare two display strings ignoring case and diacritics, falling back to
/// the raw text so distinct strings never compare equal.
pub fn collate(a: &str, b: &str) -> Ordering {
    slugify(a)
        .cmp(&slugify(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_folds_accents() {
        let slug = derive_slug("Introducción a Rust").expect("slug");
        assert_eq!(slug, "introduccion-a-rust");
    }

    #[test]
    fn derive_slug_rejects_blank_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn generate_unique_slug_appends_counter() {
        let mut existing = vec!["pattern-library".to_string()];
        let slug = generate_unique_slug("Pattern Library", |candidate| {
            if existing.iter().any(|slug| slug == candidate) {
                false
            } else {
                existing.push(candidate.to_string());
                true
            }
        })
        .expect("unique slug");

        assert_eq!(slug, "pattern-library-2");
    }

    #[test]
    fn generate_unique_slug_exhausted() {
        let result = generate_unique_slug("Example", |_| false).expect_err("exhausted");
        assert_eq!(
            result,
            SlugError::Exhausted {
                base: "example".to_string()
            }
        );
    }

    #[test]
    fn ensure_valid_slug_rejects_uppercase_and_spaces() {
        assert!(ensure_valid_slug("rust-tips").is_ok());
        assert!(ensure_valid_slug("Rust Tips").is_err());
        assert!(ensure_valid_slug("").is_err());
    }

    #[test]
    fn collate_orders_accented_letters_with_their_base() {
        assert_eq!(collate("Árbol", "Zeta"), Ordering::Less);
        assert_eq!(collate("angular", "Bases"), Ordering::Less);
        assert_ne!(collate("Rust", "rust"), Ordering::Equal);
    }
}
