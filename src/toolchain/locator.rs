use std::path::{Path, PathBuf};

/// Directory under the install dir that may hold a bundled toolchain
pub const TOOLS_DIR: &str = "tools";

/// Resolves which toolchain executable to invoke
///
/// A copy bundled at `<install_dir>/tools/<binary_name>` wins; otherwise the
/// bare binary name is returned and left to the executable search path.
/// Nothing is cached, the bundled copy is probed on every call.
#[derive(Debug, Clone)]
pub struct Locator {
    install_dir: PathBuf,
    binary_name: String,
}

impl Locator {
    pub fn new(install_dir: impl Into<PathBuf>, binary_name: impl Into<String>) -> Self {
        Self {
            install_dir: install_dir.into(),
            binary_name: binary_name.into(),
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    pub fn bundled_path(&self) -> PathBuf {
        self.install_dir.join(TOOLS_DIR).join(&self.binary_name)
    }

    pub fn locate(&self) -> PathBuf {
        let bundled = self.bundled_path();
        if bundled.is_file() {
            bundled
        } else {
            PathBuf::from(&self.binary_name)
        }
    }
}

/// Default toolchain binary name for the current platform
pub fn default_binary_name() -> String {
    format!("arduino-cli{}", std::env::consts::EXE_SUFFIX)
}

/// Directory containing the running executable
pub fn current_install_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_locate_prefers_bundled_copy() {
        let install_dir = tempfile::tempdir().unwrap();
        fs::create_dir(install_dir.path().join(TOOLS_DIR)).unwrap();
        let bundled = install_dir.path().join(TOOLS_DIR).join("arduino-cli");
        fs::write(&bundled, b"").unwrap();

        let locator = Locator::new(install_dir.path(), "arduino-cli");
        assert_eq!(locator.locate(), bundled);
    }

    #[test]
    fn test_locate_falls_back_to_bare_name() {
        let install_dir = tempfile::tempdir().unwrap();
        let locator = Locator::new(install_dir.path(), "arduino-cli");
        assert_eq!(locator.locate(), PathBuf::from("arduino-cli"));
    }

    #[test]
    fn test_locate_ignores_directory_named_like_binary() {
        let install_dir = tempfile::tempdir().unwrap();
        let locator = Locator::new(install_dir.path(), "arduino-cli");
        fs::create_dir_all(locator.bundled_path()).unwrap();
        assert_eq!(locator.locate(), PathBuf::from("arduino-cli"));
    }

    #[test]
    fn test_locate_is_not_cached() {
        let install_dir = tempfile::tempdir().unwrap();
        let locator = Locator::new(install_dir.path(), "arduino-cli");
        assert_eq!(locator.locate(), PathBuf::from("arduino-cli"));

        fs::create_dir(install_dir.path().join(TOOLS_DIR)).unwrap();
        fs::write(locator.bundled_path(), b"").unwrap();
        assert_eq!(locator.locate(), locator.bundled_path());

        fs::remove_file(locator.bundled_path()).unwrap();
        assert_eq!(locator.locate(), PathBuf::from("arduino-cli"));
    }

    #[test]
    fn test_default_binary_name() {
        if cfg!(windows) {
            assert_eq!(default_binary_name(), "arduino-cli.exe");
        } else {
            assert_eq!(default_binary_name(), "arduino-cli");
        }
    }
}
