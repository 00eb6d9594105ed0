//! Model repository sources.

use crate::error::LoadError;
use hf_hub::CacheRepo;
use hf_hub::api::sync::ApiRepo;
use std::path::PathBuf;

/// Where acoustic model files come from.
#[derive(Debug)]
pub enum ModelRepo {
    /// Local filesystem path
    Path(PathBuf),
    /// HuggingFace cache repository
    Cache(CacheRepo),
    /// HuggingFace API repository
    Api(ApiRepo),
}

impl ModelRepo {
    /// Resolve a file name to its full path in this repository.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf, LoadError> {
        match self {
            ModelRepo::Path(dir) => {
                let path = dir.join(file_name);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(LoadError::ModelNotFound(path.display().to_string()))
                }
            }
            ModelRepo::Cache(cache_repo) => cache_repo
                .get(file_name)
                .ok_or_else(|| LoadError::ModelNotFound(format!("{file_name} (hf cache)"))),
            ModelRepo::Api(api_repo) => api_repo
                .get(file_name)
                .map_err(|e| LoadError::ModelNotFound(format!("{file_name} (hf api: {e})"))),
        }
    }

    /// Try resolving multiple file names, return first successful match.
    pub fn resolve_any(&self, candidates: &[&str]) -> Result<PathBuf, LoadError> {
        candidates
            .iter()
            .find_map(|name| self.resolve(name).ok())
            .ok_or_else(|| LoadError::ModelNotFound(candidates.join(" | ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_first_existing_candidate() {
        let dir = std::env::temp_dir().join("melops-am-types-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("mdef.txt"), "0.3\n").unwrap();

        let repo = ModelRepo::Path(dir.clone());
        let path = repo.resolve_any(&["mdef", "mdef.txt"]).unwrap();

        assert_eq!(path, dir.join("mdef.txt"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn reports_missing_file() {
        let repo = ModelRepo::Path(std::env::temp_dir().join("melops-am-missing-repo"));

        let result = repo.resolve_any(&["mdef"]);

        assert!(matches!(result, Err(LoadError::ModelNotFound(_))));
    }
}
