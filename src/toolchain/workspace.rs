use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Name of the compilation unit. The toolchain infers it from the enclosing
/// directory, so the sketch directory and the source file stem must match.
pub const UNIT_NAME: &str = "AireduinoSketch";

/// Extension of the single staged source file
pub const SOURCE_EXTENSION: &str = "ino";

/// An ephemeral build directory owned by exactly one request
///
/// Layout: `<root>/<UNIT_NAME>/<UNIT_NAME>.<SOURCE_EXTENSION>`. The whole root
/// is removed when the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    root: Option<TempDir>,
    root_path: PathBuf,
    source_file_path: PathBuf,
}

impl Workspace {
    /// Stages `source_text` under the system temporary directory
    pub fn stage(source_text: &str) -> io::Result<Self> {
        Self::stage_in(std::env::temp_dir(), source_text)
    }

    /// Stages `source_text` under `parent`, which must already exist
    pub fn stage_in(parent: impl AsRef<Path>, source_text: &str) -> io::Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("sketchd-")
            .tempdir_in(parent)?;

        // On any error below `root` is dropped and the partial layout removed
        let unit_dir = root.path().join(UNIT_NAME);
        fs::create_dir(&unit_dir)?;

        let source_file_path = unit_dir.join(format!("{UNIT_NAME}.{SOURCE_EXTENSION}"));
        fs::write(&source_file_path, source_text)?;

        let root_path = root.path().to_path_buf();
        log::debug!("Staged sketch at {}", source_file_path.display());

        Ok(Self {
            root: Some(root),
            root_path,
            source_file_path,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn unit_name(&self) -> &'static str {
        UNIT_NAME
    }

    pub fn source_file_path(&self) -> &Path {
        &self.source_file_path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };

        match root.close() {
            Ok(()) => log::debug!("Released workspace {}", self.root_path.display()),
            Err(e) => log::warn!(
                "Failed to remove workspace {}: {e}",
                self.root_path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stage_layout_matches_unit_name() {
        let parent = tempfile::tempdir().unwrap();
        let source = "void setup() {}\nvoid loop() {}\n";
        let workspace = Workspace::stage_in(parent.path(), source).unwrap();

        let unit_dir = workspace.source_file_path().parent().unwrap();
        assert_eq!(unit_dir.file_name().unwrap(), UNIT_NAME);
        assert_eq!(unit_dir.parent().unwrap(), workspace.root_path());
        assert_eq!(
            workspace.source_file_path().file_name().unwrap(),
            "AireduinoSketch.ino"
        );

        let entries: Vec<_> = fs::read_dir(unit_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read(workspace.source_file_path()).unwrap(), source.as_bytes());
    }

    #[test]
    fn test_stage_keeps_source_verbatim() {
        let parent = tempfile::tempdir().unwrap();
        let source = "  #include <Servo.h>\r\n\tint x = 1;";
        let workspace = Workspace::stage_in(parent.path(), source).unwrap();
        assert_eq!(fs::read_to_string(workspace.source_file_path()).unwrap(), source);
    }

    #[test]
    fn test_stage_empty_source() {
        let parent = tempfile::tempdir().unwrap();
        let workspace = Workspace::stage_in(parent.path(), "").unwrap();
        assert_eq!(fs::read(workspace.source_file_path()).unwrap().len(), 0);
    }

    #[test]
    fn test_workspaces_are_unique() {
        let parent = tempfile::tempdir().unwrap();
        let first = Workspace::stage_in(parent.path(), "a").unwrap();
        let second = Workspace::stage_in(parent.path(), "b").unwrap();
        assert_ne!(first.root_path(), second.root_path());
        assert_eq!(fs::read_to_string(first.source_file_path()).unwrap(), "a");
        assert_eq!(fs::read_to_string(second.source_file_path()).unwrap(), "b");
    }

    #[test]
    fn test_drop_removes_root() {
        let parent = tempfile::tempdir().unwrap();
        let workspace = Workspace::stage_in(parent.path(), "x").unwrap();
        let root = workspace.root_path().to_path_buf();
        assert!(root.exists());

        drop(workspace);
        assert!(!root.exists());
    }

    #[test]
    fn test_stage_uses_system_temp_dir() {
        let workspace = Workspace::stage("void loop() {}").unwrap();
        assert!(workspace.root_path().starts_with(std::env::temp_dir()));
        assert_eq!(workspace.unit_name(), UNIT_NAME);
    }

    #[test]
    fn test_stage_in_missing_parent_fails() {
        let parent = tempfile::tempdir().unwrap();
        let missing = parent.path().join("does-not-exist");
        let err = Workspace::stage_in(&missing, "x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
