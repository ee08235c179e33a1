//! Config path resolution
//!
//! Paths are resolved relative to the server's home path (`fs_homepath`).

use std::path::{Path, PathBuf};

/// Returns the qlrust directory under the server's home path.
///
/// Path: `<fs_homepath>/qlrust/`
pub fn qlrust_base_dir(homepath: &Path) -> PathBuf {
    homepath.join("qlrust")
}

/// Returns the core framework config path.
///
/// Path: `<fs_homepath>/qlrust/core.toml`
pub fn core_config_path(homepath: &Path) -> PathBuf {
    qlrust_base_dir(homepath).join("core.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_config_path_format() {
        let path = core_config_path(Path::new("/home/ql/.quakelive/27960"));
        assert!(path.ends_with("qlrust/core.toml"));
    }
}
