//! Writing the rendered payload to disk.

use std::path::{Path, PathBuf};

use launcher_common::constants::PAYLOAD_FILE_NAME;
use launcher_common::error::{LauncherError, Result};

use crate::render::render_payload;
use crate::resolved::ResolvedConfig;

/// Writes the payload for `config` and returns the path written.
///
/// If `target` is an existing directory the payload lands in
/// `<target>/config.yaml`, where the build recipe copies it from; otherwise
/// `target` is the file path. The file is written next to its destination
/// and renamed into place.
///
/// # Errors
///
/// Returns [`LauncherError::Serialization`] if rendering fails and
/// [`LauncherError::Io`] if the file cannot be written.
pub fn export_payload(config: &ResolvedConfig, target: &Path) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(PAYLOAD_FILE_NAME)
    } else {
        target.to_path_buf()
    };
    let text = render_payload(config)?;
    tracing::info!(config = %config.name, path = %path.display(), "exporting payload");

    let io_err = |source| LauncherError::Io {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let staging = path.with_extension("yaml.tmp");
    std::fs::write(&staging, text).map_err(io_err)?;
    std::fs::rename(&staging, &path).map_err(io_err)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ResolvedConfig {
        ResolvedConfig::new("app", "img").expect("config")
    }

    #[test]
    fn export_into_directory_uses_payload_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = export_payload(&config(), dir.path()).expect("export");
        assert_eq!(path, dir.path().join("config.yaml"));
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, render_payload(&config()).expect("render"));
    }

    #[test]
    fn export_to_explicit_file_creates_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("out/app-payload.yml");
        let path = export_payload(&config(), &target).expect("export");
        assert_eq!(path, target);
        assert!(path.is_file());
        assert!(!dir.path().join("out/app-payload.yaml.tmp").exists());
    }
}
