pub mod export;
pub mod import;
pub mod merge;

use std::path::{Path, PathBuf};

/// Resolve `file` against an optional base directory; absolute paths are kept
pub(crate) fn resolve_path(base: Option<&Path>, file: &Path) -> PathBuf {
    match base {
        Some(base) if file.is_relative() => base.join(file),
        _ => file.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        let base = Path::new("data");
        assert_eq!(resolve_path(Some(base), Path::new("a.xlsx")), PathBuf::from("data/a.xlsx"));
        assert_eq!(resolve_path(None, Path::new("a.xlsx")), PathBuf::from("a.xlsx"));

        let absolute = std::env::temp_dir().join("a.xlsx");
        assert_eq!(resolve_path(Some(base), &absolute), absolute);
    }
}
