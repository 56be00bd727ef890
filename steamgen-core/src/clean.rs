//! Removes previously generated sources from the protocol tree.

use crate::error::GenerateError;
use crate::ports::FilePort;
use crate::settings::GenerateSettings;
use anyhow::Context;
use camino::Utf8PathBuf;
use glob::glob;
use tracing::{debug, info};

/// Steam language outputs removed alongside the protobuf files.
pub const STEAMLANG_OUTPUTS: &[&str] = &["enums.go", "messages.go"];

/// Remove every generated `.pb.go` file under the protocol root and the
/// Steam language outputs. Returns the removed paths.
pub fn clean(settings: &GenerateSettings, fs: &dyn FilePort) -> Result<Vec<Utf8PathBuf>, GenerateError> {
    info!("# Cleaning");
    let protocol_dir = settings.protocol_dir();
    let pattern = format!("{}/**/*.pb.go", glob::Pattern::escape(protocol_dir.as_str()));
    debug!(pattern = %pattern, "scanning for generated files");

    let mut removed = Vec::new();
    let entries = glob(&pattern)
        .with_context(|| format!("glob {pattern}"))
        .map_err(|e| GenerateError::fs(&protocol_dir, e))?;
    for entry in entries {
        let path = entry
            .map_err(|e| GenerateError::fs(&protocol_dir, anyhow::anyhow!("glob error: {e}")))?;
        let path = Utf8PathBuf::from_path_buf(path).map_err(|p| {
            GenerateError::fs(&protocol_dir, anyhow::anyhow!("non UTF-8 path {}", p.display()))
        })?;
        fs.remove_file(&path)
            .map_err(|e| GenerateError::fs(&path, e))?;
        removed.push(path);
    }

    let steamlang_dir = settings.steamlang_dir();
    for name in STEAMLANG_OUTPUTS {
        let path = steamlang_dir.join(name);
        // Missing outputs are fine.
        if fs.remove_file(&path).is_ok() {
            removed.push(path);
        }
    }

    info!(removed = removed.len(), "clean finished");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FsFilePort;
    use fs_err as fs;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn removes_generated_files_recursively() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().join("generator")).unwrap();
        let protocol = Utf8PathBuf::from_path_buf(temp.path().join("protocol")).unwrap();

        let files = [
            protocol.join("protobuf/steam/base.pb.go"),
            protocol.join("protobuf/steam/unified/auth.pb.go"),
            protocol.join("steamlang/enums.go"),
        ];
        let kept = [
            protocol.join("protobuf/steam/handwritten.go"),
            protocol.join("steamlang/steamlang.go"),
        ];
        for path in files.iter().chain(kept.iter()) {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "package x\n").unwrap();
        }
        fs::create_dir_all(&root).unwrap();

        let settings = GenerateSettings {
            root,
            ..GenerateSettings::default()
        };
        let mut removed = clean(&settings, &FsFilePort).unwrap();
        removed.sort();

        assert_eq!(removed.len(), 3);
        for path in &files {
            assert!(!path.exists(), "{path} should be removed");
        }
        for path in &kept {
            assert!(path.exists(), "{path} should be kept");
        }
    }

    #[test]
    fn empty_tree_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let settings = GenerateSettings {
            root: Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap(),
            ..GenerateSettings::default()
        };
        assert!(clean(&settings, &FsFilePort).unwrap().is_empty());
    }
}
