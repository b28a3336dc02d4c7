use std::env;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{MecabError, Result};

/// Environment variable naming the exact path to the MeCab shared library.
pub(crate) const MECAB_PATH_ENV: &str = "MECAB_PATH";

#[cfg(target_os = "windows")]
pub(crate) fn default_library_candidates() -> &'static [&'static str] {
    &[
        "C:\\Program Files\\MeCab\\bin\\libmecab.dll",
        "C:\\Program Files (x86)\\MeCab\\bin\\libmecab.dll",
    ]
}

#[cfg(target_os = "macos")]
pub(crate) fn default_library_candidates() -> &'static [&'static str] {
    &[
        "libmecab.dylib",
        "/usr/local/lib/libmecab.dylib",
        "/opt/homebrew/lib/libmecab.dylib",
    ]
}

#[cfg(all(unix, not(target_os = "macos")))]
pub(crate) fn default_library_candidates() -> &'static [&'static str] {
    &[
        "libmecab.so",
        "libmecab.so.2",
        "/usr/local/lib/libmecab.so",
        "/usr/lib/libmecab.so",
    ]
}

#[cfg(target_os = "windows")]
fn library_file_name() -> &'static str {
    "libmecab.dll"
}

#[cfg(target_os = "macos")]
fn library_file_name() -> &'static str {
    "libmecab.dylib"
}

#[cfg(all(unix, not(target_os = "macos")))]
fn library_file_name() -> &'static str {
    "libmecab.so"
}

/// Resolves the MeCab shared library path, in order: the `MECAB_PATH`
/// environment variable, platform-specific discovery, then well-known
/// install locations.
///
/// Called once when opening a library; the result is threaded into the
/// loader explicitly rather than cached in global state.
pub(crate) fn resolve_library_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os(MECAB_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = discover_installed_library() {
        return Ok(path);
    }

    for candidate in default_library_candidates() {
        let path = PathBuf::from(candidate);
        // Bare file names are left to the loader's own search path.
        if !path.is_absolute() || path.exists() {
            return Ok(path);
        }
    }

    Err(MecabError::LibraryNotFound(format!(
        "set {MECAB_PATH_ENV} to the full path of the mecab shared library"
    )))
}

/// Asks the MeCab installation itself where its library lives.
///
/// On unix this invokes `mecab-config --libs-only-L`; on Windows it reads
/// the install location MeCab records in the registry.
#[cfg(unix)]
fn discover_installed_library() -> Option<PathBuf> {
    let output = Command::new("mecab-config")
        .arg("--libs-only-L")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let libdir = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if libdir.is_empty() {
        return None;
    }
    let path = PathBuf::from(libdir).join(library_file_name());
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

#[cfg(target_os = "windows")]
fn discover_installed_library() -> Option<PathBuf> {
    let output = Command::new("reg")
        .args(["query", "HKCU\\Software\\MeCab", "/v", "mecabrc"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    // reg query output: "    mecabrc    REG_SZ    C:\Program Files\MeCab\etc\mecabrc"
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mecabrc = stdout.lines().find_map(|line| {
        let mut parts = line.trim().splitn(3, char::is_whitespace);
        if parts.next()? != "mecabrc" {
            return None;
        }
        let _reg_type = parts.next()?;
        Some(parts.next()?.trim().to_string())
    })?;
    // mecabrc lives in <root>\etc; the library in <root>\bin.
    let root = PathBuf::from(mecabrc).parent()?.parent()?.to_path_buf();
    let path = root.join("bin").join(library_file_name());
    if path.exists() {
        Some(path)
    } else {
        None
    }
}
