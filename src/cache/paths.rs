// Cache path utilities.
// Locates the snapshot file under the platform cache directory.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/orgtop on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgtop").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the cache snapshot file.
pub fn snapshot_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("github_data.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_path_is_under_cache_dir() {
        let dir = cache_dir().unwrap();
        let path = snapshot_path().unwrap();
        assert!(path.starts_with(&dir));
        assert!(path.ends_with("github_data.json"));
    }
}
