//! # Identifier Minter
//!
//! Deterministic IRI construction from natural keys.
//!
//! - **Slug mode**: one key → `<namespace><prefix>_<slug>`
//! - **Composite mode**: two keys → `<namespace><prefix>_<digest>`, where the
//!   digest is a truncated BLAKE3 hex string of fixed length
//!
//! Minting is a pure function of the key(s) and the configuration: the same
//! key yields the same IRI for the whole run, with no lookup table.

use crate::config::MissingKeyPolicy;
use crate::primitives::{PLACEHOLDER_KEY, SLUG_SEPARATOR};
use crate::vocab::Vocabulary;
use crate::{EntityKind, Iri, TabgraphError};

/// Reduce free text to an IRI-safe local name.
///
/// Letters and digits are kept and lowercased, hyphens are kept, whitespace
/// and underscores collapse into a single `_`, everything else is dropped.
/// Leading and trailing separators or hyphens are trimmed.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '-' {
            if pending_separator && !slug.is_empty() {
                slug.push(SLUG_SEPARATOR);
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == SLUG_SEPARATOR {
            pending_separator = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == SLUG_SEPARATOR)
        .to_string()
}

/// Mints IRIs for every entity kind.
#[derive(Debug, Clone)]
pub struct Minter {
    vocab: Vocabulary,
    missing_key: MissingKeyPolicy,
    digest_chars: usize,
}

impl Minter {
    /// Create a minter. `digest_chars` is assumed to be validated by
    /// [`crate::TransformConfig::validate`]; it is clamped to 64 regardless.
    #[must_use]
    pub fn new(vocab: Vocabulary, missing_key: MissingKeyPolicy, digest_chars: usize) -> Self {
        Self {
            vocab,
            missing_key,
            digest_chars: digest_chars.min(64),
        }
    }

    /// The vocabulary this minter resolves namespaces against.
    #[must_use]
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Slug-mode mint from a single natural key.
    ///
    /// A missing key, or one that slugs to nothing, follows the
    /// missing-key policy.
    pub fn mint(&self, kind: EntityKind, key: Option<&str>) -> Result<Iri, TabgraphError> {
        let slug = key.map(slugify).filter(|s| !s.is_empty());
        let slug = match slug {
            Some(slug) => slug,
            None => self.placeholder(kind)?.to_string(),
        };

        Ok(Iri::new(format!(
            "{}{}{}{}",
            self.vocab.namespace_for(kind),
            kind.slug_prefix(),
            SLUG_SEPARATOR,
            slug
        )))
    }

    /// Composite-mode mint from two related natural keys.
    ///
    /// The suffix is always exactly `digest_chars` hex characters. Each key
    /// is length-prefixed before hashing, so `("a_b", "c")` and `("a", "b_c")`
    /// are distinct inputs. Distinct key pairs collide with probability about
    /// `n^2 / 2^(4 * digest_chars + 1)`.
    pub fn mint_composite(
        &self,
        kind: EntityKind,
        left: Option<&str>,
        right: Option<&str>,
    ) -> Result<Iri, TabgraphError> {
        let left = match left.map(str::trim).filter(|s| !s.is_empty()) {
            Some(key) => key,
            None => self.placeholder(kind)?,
        };
        let right = match right.map(str::trim).filter(|s| !s.is_empty()) {
            Some(key) => key,
            None => self.placeholder(kind)?,
        };

        let mut hasher = blake3::Hasher::new();
        for key in [left, right] {
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
        }
        let hex = hasher.finalize().to_hex();

        Ok(Iri::new(format!(
            "{}{}{}{}",
            self.vocab.namespace_for(kind),
            kind.slug_prefix(),
            SLUG_SEPARATOR,
            &hex.as_str()[..self.digest_chars]
        )))
    }

    fn placeholder(&self, kind: EntityKind) -> Result<&'static str, TabgraphError> {
        match self.missing_key {
            MissingKeyPolicy::Placeholder => {
                tracing::warn!(%kind, "missing natural key, minting placeholder");
                Ok(PLACEHOLDER_KEY)
            }
            MissingKeyPolicy::Reject => Err(TabgraphError::MissingKey { kind }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::DEFAULT_DIGEST_CHARS;
    use crate::vocab::Namespaces;

    fn minter(policy: MissingKeyPolicy) -> Minter {
        Minter::new(
            Vocabulary::new(&Namespaces::default()),
            policy,
            DEFAULT_DIGEST_CHARS,
        )
    }

    #[test]
    fn slugify_cleans_text() {
        assert_eq!(slugify("  Bogotá D.C. "), "bogotá_dc");
        assert_eq!(slugify("Ingeniería   y  Tecnología"), "ingeniería_y_tecnología");
        assert_eq!(slugify("U-001"), "u-001");
        assert_eq!(slugify("-edge_"), "edge");
        assert_eq!(slugify("a__b"), "a_b");
        assert_eq!(slugify("¿?!"), "");
    }

    #[test]
    fn slug_mint_is_idempotent() {
        let m = minter(MissingKeyPolicy::Placeholder);
        let a = m.mint(EntityKind::University, Some("U001")).expect("mint");
        let b = m.mint(EntityKind::University, Some(" U001 ")).expect("mint");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "http://example.org/university/university_u001");
    }

    #[test]
    fn missing_key_uses_placeholder() {
        let m = minter(MissingKeyPolicy::Placeholder);
        let a = m.mint(EntityKind::City, None).expect("mint");
        let b = m.mint(EntityKind::City, Some("***")).expect("mint");
        assert_eq!(a.as_str(), "http://example.org/geography/city_unknown");
        assert_eq!(a, b);
    }

    #[test]
    fn missing_key_rejected_under_reject_policy() {
        let m = minter(MissingKeyPolicy::Reject);
        assert!(matches!(
            m.mint(EntityKind::Student, None),
            Err(TabgraphError::MissingKey {
                kind: EntityKind::Student
            })
        ));
        assert!(m
            .mint_composite(EntityKind::AcademicDecision, Some("E1"), None)
            .is_err());
    }

    #[test]
    fn composite_mint_is_deterministic_and_fixed_length() {
        let m = minter(MissingKeyPolicy::Placeholder);
        let a = m
            .mint_composite(EntityKind::AcademicDecision, Some("E1"), Some("U001"))
            .expect("mint");
        let b = m
            .mint_composite(EntityKind::AcademicDecision, Some("E1"), Some("U001"))
            .expect("mint");
        let c = m
            .mint_composite(EntityKind::AcademicDecision, Some("E1"), Some("U002"))
            .expect("mint");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), c.as_str().len());

        let prefix = "http://example.org/behavior/decision_";
        assert!(a.as_str().starts_with(prefix));
        assert_eq!(a.as_str().len() - prefix.len(), DEFAULT_DIGEST_CHARS);
    }

    #[test]
    fn composite_keys_are_not_ambiguous_on_concatenation() {
        let m = minter(MissingKeyPolicy::Placeholder);
        let mint = |left: &str, right: &str| {
            m.mint_composite(EntityKind::AcademicDecision, Some(left), Some(right))
                .expect("mint")
        };

        assert_ne!(mint("E1", "0U"), mint("E10", "U"));
        // keys may contain the slug separator themselves
        assert_ne!(mint("a_b", "c"), mint("a", "b_c"));
        assert_ne!(mint("E1_", "U"), mint("E1", "_U"));
    }

    #[test]
    fn digest_length_is_configurable() {
        let m = Minter::new(
            Vocabulary::new(&Namespaces::default()),
            MissingKeyPolicy::Placeholder,
            16,
        );
        let iri = m
            .mint_composite(EntityKind::AcademicDecision, Some("E1"), Some("U1"))
            .expect("mint");
        let suffix = iri.as_str().rsplit('_').next().unwrap_or_default();
        assert_eq!(suffix.len(), 16);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
