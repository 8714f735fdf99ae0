//! Address-fragment routing.
//!
//! The URL fragment is the only wire format this crate speaks: `#<slug>`
//! where the slug is derived from a section title, and an empty or unknown
//! fragment denotes home. [`HashRouter`] holds the bidirectional slug table,
//! built once from the catalog; lookups are pure and never fail.

use fxhash::FxHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::catalog::{SectionCatalog, SectionId};

lazy_static! {
    static ref LEADING_MARKERS: Regex = Regex::new(r"^[#/]+").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("sections {first} and {second} both slugify to '{slug}'")]
    DuplicateSlug {
        slug: String,
        first: SectionId,
        second: SectionId,
    },
}

/// Derives the fragment slug for a section title: lowercased, with every run
/// of whitespace replaced by a single hyphen.
pub fn slugify(title: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&title.to_lowercase(), "-")
        .into_owned()
}

/// Strips leading `#` and `/` markers and lowercases the remainder.
fn normalize_fragment(raw: &str) -> String {
    LEADING_MARKERS.replace(raw, "").to_lowercase()
}

/// Bidirectional slug table over the section catalog.
///
/// The table is a bijection: construction fails when two section titles
/// slugify to the same string, since a shared slug would make fragments
/// ambiguous in one direction and unstable in the other.
#[derive(Debug, Clone)]
pub struct HashRouter {
    section_by_slug: FxHashMap<String, SectionId>,
    slug_by_section: FxHashMap<SectionId, String>,
}

impl HashRouter {
    pub fn new(catalog: &SectionCatalog) -> Result<HashRouter, RoutingError> {
        let mut section_by_slug = FxHashMap::default();
        let mut slug_by_section = FxHashMap::default();

        for section in catalog.sections() {
            let slug = slugify(&section.title);
            if let Some(&first) = section_by_slug.get(&slug) {
                return Err(RoutingError::DuplicateSlug {
                    slug,
                    first,
                    second: section.id,
                });
            }
            section_by_slug.insert(slug.clone(), section.id);
            slug_by_section.insert(section.id, slug);
        }

        tracing::trace!(slugs = section_by_slug.len(), "built fragment router");
        Ok(HashRouter {
            section_by_slug,
            slug_by_section,
        })
    }

    /// Resolves a raw fragment to a section id.
    ///
    /// Leading `#`/`/` markers are stripped and matching is case-insensitive.
    /// The empty fragment and fragments that match no known slug both resolve
    /// to `None`, meaning home.
    pub fn section_from_fragment(&self, raw: &str) -> Option<SectionId> {
        let cleaned = normalize_fragment(raw);
        if cleaned.is_empty() {
            return None;
        }
        self.section_by_slug.get(&cleaned).copied()
    }

    /// Canonical fragment for a section: `None` maps to the empty fragment,
    /// a known id to its slug. An id outside the catalog also maps to the
    /// empty fragment; the id domain is closed over the catalog, so that case
    /// is not expected in normal operation.
    pub fn fragment_for(&self, section: Option<SectionId>) -> &str {
        section
            .and_then(|id| self.slug_by_section.get(&id))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// True when the fragment denotes home or a known section.
    pub fn is_valid_fragment(&self, raw: &str) -> bool {
        let cleaned = normalize_fragment(raw);
        cleaned.is_empty() || self.section_by_slug.contains_key(&cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Section, SectionContent, SiteMeta};

    fn section(id: SectionId, title: &str) -> Section {
        Section {
            id,
            title: title.to_string(),
            summary: None,
            content: SectionContent::Text { paragraphs: vec![] },
        }
    }

    fn test_catalog() -> SectionCatalog {
        SectionCatalog::from_parts(
            SiteMeta {
                owner: "Iris Calder".to_string(),
                home_title: "Iris Calder | Portfolio".to_string(),
            },
            vec![
                section(1, "Experience"),
                section(2, "Freelancing"),
                section(3, "Projects"),
                section(4, "Contact"),
                section(5, "About Me"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn slugify_lowercases_and_hyphenates_whitespace_runs() {
        assert_eq!(slugify("Experience"), "experience");
        assert_eq!(slugify("About Me"), "about-me");
        assert_eq!(slugify("Deep\t  Space   Ops"), "deep-space-ops");
        // Leading and trailing whitespace becomes leading and trailing
        // hyphens; titles are expected to be trimmed upstream.
        assert_eq!(slugify(" About Me "), "-about-me-");
    }

    #[test]
    fn fragments_round_trip_for_every_section() {
        let catalog = test_catalog();
        let router = HashRouter::new(&catalog).unwrap();

        for entry in catalog.sections() {
            let fragment = router.fragment_for(Some(entry.id)).to_string();
            assert!(!fragment.is_empty());
            assert_eq!(
                router.section_from_fragment(&fragment),
                Some(entry.id),
                "fragment '{}' should resolve back to section {}",
                fragment,
                entry.id
            );
        }
    }

    #[test]
    fn resolution_is_case_insensitive_and_canonicalizing() {
        let router = HashRouter::new(&test_catalog()).unwrap();

        let id = router.section_from_fragment("#EXPERIENCE").unwrap();
        assert_eq!(router.fragment_for(Some(id)), "experience");
        assert_eq!(router.section_from_fragment("About-Me"), Some(5));
    }

    #[test]
    fn leading_markers_are_stripped() {
        let router = HashRouter::new(&test_catalog()).unwrap();

        assert_eq!(router.section_from_fragment("#experience"), Some(1));
        assert_eq!(router.section_from_fragment("##experience"), Some(1));
        assert_eq!(router.section_from_fragment("/experience"), Some(1));
        assert_eq!(router.section_from_fragment("#/about-me"), Some(5));
    }

    #[test]
    fn empty_and_unknown_fragments_mean_home() {
        let router = HashRouter::new(&test_catalog()).unwrap();

        assert_eq!(router.section_from_fragment(""), None);
        assert_eq!(router.section_from_fragment("#"), None);
        assert_eq!(router.section_from_fragment("#unknown-slug"), None);
        assert_eq!(router.fragment_for(None), "");
    }

    #[test]
    fn unknown_section_id_maps_to_the_empty_fragment() {
        let router = HashRouter::new(&test_catalog()).unwrap();

        assert_eq!(router.fragment_for(Some(999)), "");
    }

    #[test]
    fn fragment_validity_accepts_home_and_known_slugs_only() {
        let router = HashRouter::new(&test_catalog()).unwrap();

        assert!(router.is_valid_fragment(""));
        assert!(router.is_valid_fragment("#"));
        assert!(router.is_valid_fragment("#projects"));
        assert!(router.is_valid_fragment("/About-Me"));
        assert!(!router.is_valid_fragment("#missing"));
    }

    #[test]
    fn colliding_slugs_are_rejected() {
        let catalog = SectionCatalog::from_parts(
            SiteMeta {
                owner: "A".to_string(),
                home_title: "A".to_string(),
            },
            vec![section(1, "About Me"), section(2, "about  ME")],
        )
        .unwrap();

        match HashRouter::new(&catalog) {
            Err(RoutingError::DuplicateSlug { slug, first, second }) => {
                assert_eq!(slug, "about-me");
                assert_eq!((first, second), (1, 2));
            }
            other => panic!("expected duplicate slug error, got {:?}", other),
        }
    }
}
