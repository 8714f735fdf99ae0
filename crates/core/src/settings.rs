//! Versioned settings storage.
//!
//! Settings are stored under the data directory in a versioned layout with a
//! manifest file tracking all versions:
//!
//! ```text
//! <data-dir>/
//! ├── settings/
//! │   ├── .helm-index.toml                # manifest with version metadata
//! │   ├── settings-v0.1.2.toml            # version-specific settings files
//! │   └── settings-v0.1.3-5-gabc123.toml
//! └── settings.toml                       # legacy location, migrated away
//! ```
//!
//! When the application loads:
//! 1. Check for a legacy `settings.toml` in the data directory
//! 2. If it exists, migrate it to the versioned system and delete the old file
//! 3. Read the manifest and pick the entry matching the current version,
//!    falling back to the entry with the most recent build UUID
//! 4. Load that version's settings file
//!
//! When the application saves:
//! 1. Write to the current version file
//! 2. Update manifest metadata
//! 3. Remove old files exceeding the retention limit

use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const SETTINGS_DIR: &str = "settings";
const MANIFEST_FILE: &str = ".helm-index.toml";
const LEGACY_SETTINGS_FILE: &str = "settings.toml";

/// Persisted shell state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Fragment the navigation host is seeded with on the next launch.
    pub start_fragment: String,
    /// Settings file versions kept on disk (0 = keep all).
    pub settings_retention: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            start_fragment: String::new(),
            settings_retention: 5,
        }
    }
}

/// Metadata for a settings file version in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsEntry {
    /// The version string (e.g., "v0.1.2" or "v0.1.3-5-gabc123").
    pub version: String,
    /// UUID v7 from the build that created this entry (timestamp-sortable).
    pub uuid: String,
    /// Path to the settings file (relative to the settings directory).
    pub file: String,
    /// When this settings file was last saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// Manifest file that tracks all settings versions.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SettingsManifest {
    /// All known settings versions, in order.
    #[serde(default)]
    pub entries: Vec<SettingsEntry>,
}

/// Manages versioned settings files and migrations.
#[derive(Clone)]
pub struct SettingsManager {
    settings_dir: PathBuf,
    manifest_path: PathBuf,
    current_version: String,
    build_uuid: String,
    root_dir: PathBuf,
}

impl SettingsManager {
    /// Creates a settings manager rooted at `root_dir` (the data directory).
    ///
    /// `current_version` is the application version (e.g., from
    /// `GIT_VERSION`). The build UUID is obtained from the compile-time
    /// `BUILD_UUID` environment variable set by the crate's build script.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use helm_core::settings::SettingsManager;
    ///
    /// let manager = SettingsManager::new(".", env!("GIT_VERSION").to_string());
    /// ```
    pub fn new(root_dir: impl Into<PathBuf>, current_version: String) -> Self {
        let root_dir = root_dir.into();
        let settings_dir = root_dir.join(SETTINGS_DIR);
        let manifest_path = settings_dir.join(MANIFEST_FILE);

        SettingsManager {
            settings_dir,
            manifest_path,
            current_version,
            build_uuid: env!("BUILD_UUID").to_string(),
            root_dir,
        }
    }

    /// Loads settings from the versioned storage, migrating if necessary.
    ///
    /// The manifest is searched for an entry matching the current version;
    /// without an exact match the entry with the most recent build UUID is
    /// used, and with no entries at all the defaults are returned. Never
    /// fails: defaults are the ultimate fallback.
    ///
    /// Diagnostics go to stdout/stderr rather than `tracing` because logging
    /// is configured after settings are loaded; tracing calls here would be
    /// silently dropped.
    pub fn load(&self) -> Settings {
        if let Err(e) = fs::create_dir_all(&self.settings_dir) {
            eprintln!("failed to create settings directory: {}; using defaults", e);
            return Settings::default();
        }

        self.migrate_legacy_settings();

        let manifest = match self.read_manifest() {
            Ok(m) => m,
            Err(e) => {
                eprintln!("failed to read manifest: {}; using defaults", e);
                return Settings::default();
            }
        };

        let matched_entry = manifest
            .entries
            .iter()
            .find(|e| e.version == self.current_version)
            .cloned()
            .or_else(|| {
                let mut entries: Vec<_> = manifest.entries.clone();
                entries.sort_by(|a, b| b.uuid.cmp(&a.uuid));
                entries.first().cloned()
            });

        match matched_entry {
            Some(entry) => {
                println!(
                    "Loading settings from version {} (file: {})",
                    entry.version, entry.file
                );
                let file_path = self.settings_dir.join(&entry.file);
                match crate::helpers::load_toml::<Settings, _>(&file_path) {
                    Ok(settings) => settings,
                    Err(e) => {
                        eprintln!(
                            "failed to load settings file {}: {}; using defaults",
                            file_path.display(),
                            e
                        );
                        Settings::default()
                    }
                }
            }
            None => {
                println!(
                    "No existing settings found for version {}, using defaults",
                    self.current_version
                );
                Settings::default()
            }
        }
    }

    /// Saves settings to a versioned file and updates the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written, the manifest
    /// cannot be updated, or old files cannot be removed.
    pub fn save(&self, settings: &Settings) -> Result<(), Error> {
        fs::create_dir_all(&self.settings_dir).context("failed to create settings directory")?;

        let filename = format!("settings-{}.toml", self.current_version);
        let file_path = self.settings_dir.join(&filename);

        tracing::debug!(file_path = %file_path.display(), "saving settings to file");
        crate::helpers::save_toml(settings, &file_path).context("failed to save settings file")?;

        tracing::info!(
            version = %self.current_version,
            file = %filename,
            start_fragment = %settings.start_fragment,
            "saved versioned settings"
        );

        self.update_manifest_and_cleanup(&filename, settings)?;

        Ok(())
    }

    /// Migrates a legacy `settings.toml` from the data directory into the
    /// versioned format, registering it in the manifest and deleting the old
    /// file afterwards.
    ///
    /// Fully non-fatal: migration is opportunistic, and any failure merely
    /// leaves the legacy file in place for the next attempt. Diagnostics use
    /// stdout/stderr for the same reason as [`SettingsManager::load`].
    fn migrate_legacy_settings(&self) {
        let legacy_path = self.root_dir.join(LEGACY_SETTINGS_FILE);

        if !legacy_path.exists() {
            return;
        }

        println!(
            "Migrating legacy settings from {} to versioned format",
            legacy_path.display()
        );

        let settings = match crate::helpers::load_toml::<Settings, _>(&legacy_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!(
                    "failed to load legacy settings file {}: {}; skipping migration",
                    legacy_path.display(),
                    e
                );
                return;
            }
        };

        let filename = format!("settings-{}.toml", self.current_version);
        let file_path = self.settings_dir.join(&filename);

        if let Err(e) = crate::helpers::save_toml(&settings, &file_path) {
            eprintln!(
                "failed to save migrated settings file {}: {}; continuing with legacy",
                file_path.display(),
                e
            );
            return;
        }

        let mut manifest = self.read_manifest().unwrap_or_default();

        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        manifest
            .entries
            .retain(|e| e.version != self.current_version);

        manifest.entries.push(SettingsEntry {
            version: self.current_version.clone(),
            uuid: self.build_uuid.clone(),
            file: filename,
            saved_at: Some(now),
        });

        if let Err(e) = self.write_manifest(&manifest) {
            eprintln!("failed to update manifest after migration: {}; continuing", e);
        }

        if let Err(e) = fs::remove_file(&legacy_path) {
            eprintln!(
                "failed to delete legacy {} after migration: {}; continuing",
                legacy_path.display(),
                e
            );
        }

        println!(
            "Successfully migrated legacy settings to version {} (file: {})",
            self.current_version,
            file_path.display()
        );
    }

    /// Reads the settings manifest, or an empty default when the file does
    /// not exist yet.
    fn read_manifest(&self) -> Result<SettingsManifest, Error> {
        if self.manifest_path.exists() {
            crate::helpers::load_toml::<SettingsManifest, _>(&self.manifest_path)
                .context("failed to read settings manifest")
        } else {
            Ok(SettingsManifest::default())
        }
    }

    fn write_manifest(&self, manifest: &SettingsManifest) -> Result<(), Error> {
        crate::helpers::save_toml(manifest, &self.manifest_path)
            .context("failed to write settings manifest")
    }

    /// Updates the manifest with a new entry for the current version and
    /// prunes files beyond the retention limit, in a single read/write pass.
    ///
    /// Any existing entry for the same version is replaced. Retention sorts
    /// by build UUID, so the oldest builds are removed first.
    fn update_manifest_and_cleanup(
        &self,
        filename: &str,
        settings: &Settings,
    ) -> Result<(), Error> {
        let mut manifest = self.read_manifest()?;
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        manifest
            .entries
            .retain(|e| e.version != self.current_version);

        manifest.entries.push(SettingsEntry {
            version: self.current_version.clone(),
            uuid: self.build_uuid.clone(),
            file: filename.to_string(),
            saved_at: Some(now),
        });

        let retention = settings.settings_retention;

        if retention > 0 && manifest.entries.len() > retention {
            manifest.entries.sort_by(|a, b| a.uuid.cmp(&b.uuid));

            let entries_to_remove = manifest.entries.len() - retention;
            let removed_entries: Vec<_> = manifest.entries.drain(..entries_to_remove).collect();

            for entry in removed_entries {
                let file_path = self.settings_dir.join(&entry.file);

                if file_path.exists() {
                    fs::remove_file(&file_path).context(format!(
                        "failed to remove old settings file: {}",
                        entry.file
                    ))?;
                    tracing::debug!(
                        version = %entry.version,
                        file = %entry.file,
                        "removed old settings file"
                    );
                }
            }
        }

        self.write_manifest(&manifest)
    }
}
