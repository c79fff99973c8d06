//! Theme files on disk.
//!
//! A theme directory holds one `<id>.json` file per theme. The default
//! theme is built in and always listed, whether or not a file for it
//! exists.

use std::path::{Path, PathBuf};

use maposter_core::{DEFAULT_THEME_ID, ThemeOverrides, ThemeStore};

/// A [`ThemeStore`] backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct DirThemeStore {
    dir: PathBuf,
}

impl DirThemeStore {
    /// Serve themes from `dir`. The directory need not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory themes are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, theme_id: &str) -> Option<PathBuf> {
        let valid = !theme_id.is_empty()
            && theme_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| self.dir.join(format!("{theme_id}.json")))
    }
}

impl ThemeStore for DirThemeStore {
    fn load(&self, theme_id: &str) -> Option<ThemeOverrides> {
        let Some(path) = self.path_for(theme_id) else {
            log::warn!("ignoring invalid theme id {theme_id:?}");
            return None;
        };
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                log::debug!("cannot read {}: {err}", path.display());
                return None;
            }
        };
        match ThemeOverrides::from_json(&text) {
            Ok(overrides) => {
                log::debug!("loaded theme {theme_id:?} from {}", path.display());
                Some(overrides)
            }
            Err(err) => {
                log::warn!("invalid theme file {}: {err}", path.display());
                None
            }
        }
    }

    fn list(&self) -> Vec<String> {
        let mut ids = vec![DEFAULT_THEME_ID.to_owned()];
        match std::fs::read_dir(&self.dir) {
            Ok(entries) => {
                ids.extend(entries.filter_map(Result::ok).filter_map(|entry| {
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        path.file_stem()
                            .and_then(|stem| stem.to_str())
                            .map(str::to_owned)
                    } else {
                        None
                    }
                }));
            }
            Err(err) => log::debug!("cannot list {}: {err}", self.dir.display()),
        }
        ids.sort();
        ids.dedup();
        ids
    }
}
