//! Static section catalog.
//!
//! The catalog is the read-only list of content sections the site presents:
//! id, title, optional summary and a tagged content payload per section, plus
//! site-wide metadata used for display-title composition. It is decoded once
//! from the embedded TOML document and must stay stable for the lifetime of
//! the process; navigation treats section ids as opaque values with equality
//! semantics only.

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::assets::{ContentAssets, SECTIONS_DOCUMENT};

/// Identifier of a content section, assigned by the catalog.
pub type SectionId = u32;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("embedded catalog document '{0}' is missing")]
    MissingDocument(&'static str),
    #[error("catalog document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("failed to parse catalog document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate section id {id}")]
    DuplicateId { id: SectionId },
}

/// Site-wide metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteMeta {
    /// Name of the site owner, appended to section display titles.
    pub owner: String,
    /// Display title used while no section is active.
    pub home_title: String,
}

/// One entry of a work-history style listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExperienceItem {
    pub organization: String,
    pub role: String,
    pub period: String,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub href: String,
}

/// Content payload of a section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionContent {
    Text {
        paragraphs: Vec<String>,
    },
    Experience {
        items: Vec<ExperienceItem>,
    },
    Projects {
        items: Vec<ProjectItem>,
    },
    Contact {
        message: Vec<String>,
        links: Vec<ContactLink>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub content: SectionContent,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    site: SiteMeta,
    #[serde(default)]
    sections: Vec<Section>,
}

/// Ordered, read-only collection of sections plus site metadata.
#[derive(Debug, Clone)]
pub struct SectionCatalog {
    site: SiteMeta,
    sections: IndexMap<SectionId, Section>,
}

impl SectionCatalog {
    /// Decodes the catalog from the embedded content document.
    pub fn load_embedded() -> Result<SectionCatalog, CatalogError> {
        let file = ContentAssets::sections()
            .ok_or(CatalogError::MissingDocument(SECTIONS_DOCUMENT))?;
        let text = std::str::from_utf8(file.data.as_ref())?;
        let catalog = Self::from_toml(text)?;
        tracing::debug!(
            sections = catalog.len(),
            owner = %catalog.site.owner,
            "loaded embedded section catalog"
        );
        Ok(catalog)
    }

    /// Decodes a catalog from TOML text.
    pub fn from_toml(text: &str) -> Result<SectionCatalog, CatalogError> {
        let document: CatalogDocument = toml::from_str(text)?;
        Self::from_parts(document.site, document.sections)
    }

    /// Builds a catalog from already-decoded parts, rejecting duplicate ids.
    /// Section order is preserved.
    pub fn from_parts(
        site: SiteMeta,
        sections: Vec<Section>,
    ) -> Result<SectionCatalog, CatalogError> {
        let mut map = IndexMap::with_capacity(sections.len());
        for section in sections {
            let id = section.id;
            if map.insert(id, section).is_some() {
                return Err(CatalogError::DuplicateId { id });
            }
        }
        Ok(SectionCatalog {
            site,
            sections: map,
        })
    }

    pub fn site(&self) -> &SiteMeta {
        &self.site
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    /// Sections in catalog order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_CATALOG: &str = r#"
        [site]
        owner = "Iris Calder"
        home_title = "Iris Calder | Portfolio"

        [[sections]]
        id = 1
        title = "Experience"
        summary = "Where I have worked"

        [sections.content]
        kind = "experience"

        [[sections.content.items]]
        organization = "Meridian Systems"
        role = "Systems Engineer"
        period = "2021 - 2024"
        description = ["Built ground-station telemetry pipelines."]
        skills = ["Rust", "Grafana"]

        [[sections]]
        id = 5
        title = "About Me"

        [sections.content]
        kind = "text"
        paragraphs = ["Hello.", "I build things."]
    "#;

    #[test]
    fn parses_sections_in_order() {
        let catalog = SectionCatalog::from_toml(SMALL_CATALOG).unwrap();

        assert_eq!(catalog.len(), 2);
        let titles: Vec<&str> = catalog.sections().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Experience", "About Me"]);
        assert_eq!(catalog.site().owner, "Iris Calder");
        assert_eq!(catalog.site().home_title, "Iris Calder | Portfolio");
    }

    #[test]
    fn resolves_sections_by_id() {
        let catalog = SectionCatalog::from_toml(SMALL_CATALOG).unwrap();

        let about = catalog.section(5).unwrap();
        assert_eq!(about.title, "About Me");
        assert_eq!(about.summary, None);
        match &about.content {
            SectionContent::Text { paragraphs } => assert_eq!(paragraphs.len(), 2),
            other => panic!("unexpected content: {:?}", other),
        }

        assert!(catalog.section(42).is_none());
    }

    #[test]
    fn decodes_experience_payload() {
        let catalog = SectionCatalog::from_toml(SMALL_CATALOG).unwrap();

        let experience = catalog.section(1).unwrap();
        assert_eq!(experience.summary.as_deref(), Some("Where I have worked"));
        match &experience.content {
            SectionContent::Experience { items } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].organization, "Meridian Systems");
                assert_eq!(items[0].skills, vec!["Rust", "Grafana"]);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let text = r#"
            [site]
            owner = "A"
            home_title = "A"

            [[sections]]
            id = 1
            title = "One"
            [sections.content]
            kind = "text"
            paragraphs = []

            [[sections]]
            id = 1
            title = "Other"
            [sections.content]
            kind = "text"
            paragraphs = []
        "#;

        match SectionCatalog::from_toml(text) {
            Err(CatalogError::DuplicateId { id }) => assert_eq!(id, 1),
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn embedded_catalog_loads_and_is_well_formed() {
        let catalog = SectionCatalog::load_embedded().unwrap();

        assert!(!catalog.is_empty());
        assert!(!catalog.site().owner.is_empty());
        for section in catalog.sections() {
            assert!(section.id > 0, "section ids are positive");
            assert!(!section.title.is_empty());
        }
    }
}
