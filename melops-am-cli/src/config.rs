//! Configuration types for resolved CLI arguments.
//!
//! Args structs (for CLI parsing) live in cli.rs and the subcommand modules;
//! this module holds what they resolve to.

use crate::cli::{ModelArgs, ModelSource};
use eyre::{Context, Result};
use hf_hub::Cache;
use hf_hub::api::sync::Api;
use melops_am::config::AcousticModelConfig;
use melops_am::loader::TiedStateLoader;
use melops_am::model::AcousticModel;
use melops_am::types::ModelRepo;
use melops_am::unit_manager::UnitManager;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Resolved model configuration.
///
/// Converted from ModelArgs via TryFrom.
#[derive(Debug)]
pub struct ModelConfig {
    pub repo: ModelRepo,
}

impl TryFrom<ModelArgs> for ModelConfig {
    type Error = eyre::Error;

    fn try_from(args: ModelArgs) -> Result<Self> {
        let repo = match args.model_source {
            ModelSource::Auto => {
                let path = PathBuf::from(&args.model_id);
                if path.is_dir() {
                    ModelRepo::Path(path)
                } else {
                    let api = Api::new()?;
                    ModelRepo::Api(api.model(args.model_id))
                }
            }
            ModelSource::Path => ModelRepo::Path(PathBuf::from(args.model_id)),
            ModelSource::Cache => ModelRepo::Cache(Cache::from_env().model(args.model_id)),
            ModelSource::Api => ModelRepo::Api(Api::new()?.model(args.model_id)),
        };

        Ok(Self { repo })
    }
}

impl ModelConfig {
    /// Build and allocate an acoustic model from this repository.
    pub fn load(self, am_config: AcousticModelConfig) -> Result<AcousticModel> {
        tracing::info!(repo = ?self.repo, "locating model");

        let s = Instant::now();

        let model = AcousticModel::new(
            Arc::new(TiedStateLoader::new(self.repo)),
            Arc::new(UnitManager::new()),
            am_config,
        );
        model.allocate().wrap_err("failed to load acoustic model")?;

        let d = s.elapsed();
        tracing::info!(duration = %format_secs(d.as_secs_f32()), "model loaded");

        Ok(model)
    }
}

fn format_secs(secs: f32) -> String {
    format!("{secs:.2}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_source_is_taken_verbatim() {
        let args = ModelArgs {
            model_id: "does/not/exist".to_string(),
            model_source: ModelSource::Path,
        };

        let config = ModelConfig::try_from(args).unwrap();

        assert!(matches!(config.repo, ModelRepo::Path(p) if p == PathBuf::from("does/not/exist")));
    }

    #[test]
    fn auto_source_prefers_existing_directory() {
        let dir = std::env::temp_dir();
        let args = ModelArgs {
            model_id: dir.display().to_string(),
            model_source: ModelSource::Auto,
        };

        let config = ModelConfig::try_from(args).unwrap();

        assert!(matches!(config.repo, ModelRepo::Path(_)));
    }

    #[test]
    fn missing_model_fails_to_load() {
        let config = ModelConfig {
            repo: ModelRepo::Path(std::env::temp_dir().join("mel-am-missing-model")),
        };

        assert!(config.load(AcousticModelConfig::default()).is_err());
    }
}
