//! Caption fonts for raster output.
//!
//! Explicit font files take precedence. Without them a handful of
//! common sans-serif faces are looked up in the platform font
//! directories, and failing that the faces bundled with
//! `maposter-export` are used.

use std::path::{Path, PathBuf};

use maposter_export::FontSet;

use crate::IoError;

/// Environment variable naming extra font directories, separated like
/// `PATH`.
pub const FONT_DIR_ENV: &str = "MAPOSTER_FONT_DIR";

/// How deep to descend into font directories.
const MAX_DEPTH: usize = 4;

/// `(regular, bold)` file names, in order of preference.
const CANDIDATES: [(&str, &str); 6] = [
    ("DejaVuSans.ttf", "DejaVuSans-Bold.ttf"),
    ("LiberationSans-Regular.ttf", "LiberationSans-Bold.ttf"),
    ("NotoSans-Regular.ttf", "NotoSans-Bold.ttf"),
    ("Roboto-Regular.ttf", "Roboto-Bold.ttf"),
    ("arial.ttf", "arialbd.ttf"),
    ("Arial.ttf", "Arial Bold.ttf"),
];

/// Load caption fonts.
///
/// With `regular` set, that file (and `bold`, if set) is used. Otherwise
/// the system font directories are searched, falling back to
/// [`FontSet::bundled`].
///
/// # Errors
///
/// [`IoError::Io`] if a named file cannot be read, [`IoError::Decode`]
/// if it is not a usable font.
pub fn load_fonts(regular: Option<&Path>, bold: Option<&Path>) -> Result<FontSet, IoError> {
    let Some(regular) = regular else {
        if bold.is_some() {
            log::warn!("--bold-font given without --font; searching system fonts");
        }
        return Ok(discover_fonts(&font_dirs()));
    };
    let regular_bytes = std::fs::read(regular).map_err(|err| IoError::io(regular, err))?;
    let bold_bytes = bold
        .map(|path| std::fs::read(path).map_err(|err| IoError::io(path, err)))
        .transpose()?;
    FontSet::from_bytes(regular_bytes, bold_bytes).map_err(|err| IoError::Decode(err.to_string()))
}

/// Search `dirs` for the first candidate family with a parsable regular
/// face; [`FontSet::bundled`] if there is none.
#[must_use]
pub fn discover_fonts(dirs: &[PathBuf]) -> FontSet {
    let mut files = Vec::new();
    for dir in dirs {
        collect_files(dir, 0, &mut files);
    }

    for (regular, bold) in CANDIDATES {
        let Some(regular_path) = find(&files, regular) else {
            continue;
        };
        let Ok(regular_bytes) = std::fs::read(regular_path) else {
            continue;
        };
        let bold_bytes = find(&files, bold).and_then(|path| std::fs::read(path).ok());
        match FontSet::from_bytes(regular_bytes, bold_bytes) {
            Ok(set) => {
                log::debug!("using caption font {}", regular_path.display());
                return set;
            }
            Err(err) => log::debug!("skipping {}: {err}", regular_path.display()),
        }
    }
    log::info!("no system caption font found; using bundled DejaVu Sans");
    FontSet::bundled()
}

fn find<'a>(files: &'a [PathBuf], name: &str) -> Option<&'a PathBuf> {
    files
        .iter()
        .find(|path| path.file_name().is_some_and(|file| file == name))
}

fn collect_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_DEPTH {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            collect_files(&path, depth + 1, out);
        } else {
            out.push(path);
        }
    }
}

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Some(extra) = std::env::var_os(FONT_DIR_ENV) {
        dirs.extend(std::env::split_paths(&extra).filter(|p| !p.as_os_str().is_empty()));
    }

    #[cfg(target_os = "windows")]
    {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
        if let Some(windir) = std::env::var_os("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(&home).join(".fonts"));
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    dirs
}
