//! Embedded content assets.
//!
//! The section catalog ships inside the binary as a TOML document embedded at
//! compile time using rust-embed, so the library needs no data files on disk.

use rust_embed::Embed;
use rust_embed::EmbeddedFile;

/// File name of the section catalog document inside the embedded folder.
pub const SECTIONS_DOCUMENT: &str = "sections.toml";

/// Embedded portfolio content.
///
/// Only the TOML documents under `content/` are embedded.
#[derive(Embed)]
#[folder = "content/"]
#[include = "*.toml"]
pub struct ContentAssets;

impl ContentAssets {
    /// Returns the embedded section catalog document, if present.
    pub fn sections() -> Option<EmbeddedFile> {
        Self::get(SECTIONS_DOCUMENT)
    }
}
