//! Info subcommand - load a model and print its statistics.

use crate::cli::ModelArgs;
use crate::config::ModelConfig;
use eyre::Result;
use melops_am::config::AcousticModelConfig;
use melops_am::hmm::HmmPosition;
use melops_am::model::AcousticModel;

/// CLI arguments for model statistics.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub am_config: AcousticModelConfig,
}

/// Resolved configuration for model statistics.
#[derive(Debug)]
pub struct Config {
    pub model: ModelConfig,
    pub am_config: AcousticModelConfig,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            model: args.model.try_into()?,
            am_config: args.am_config,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let model = config.model.load(config.am_config)?;

    model.log_info()?;
    print!("{}", summary(&model)?);

    Ok(())
}

/// Human-readable model statistics.
pub fn summary(model: &AcousticModel) -> Result<String> {
    let mut out = String::new();

    let hmms: Vec<_> = model.hmm_iter()?.collect();
    let units: Vec<String> = model
        .context_independent_unit_iter()?
        .map(|unit| {
            if unit.is_filler() {
                format!("{unit}*")
            } else {
                unit.to_string()
            }
        })
        .collect();

    out.push_str(&format!("hmms          {}\n", hmms.len()));
    for position in HmmPosition::ALL {
        let count = hmms.iter().filter(|h| h.position() == position).count();
        out.push_str(&format!("  {position}           {count}\n"));
    }
    out.push_str(&format!(
        "context size  {}/{}\n",
        model.left_context_size()?,
        model.right_context_size()?
    ));
    out.push_str(&format!("ci units      {}\n", units.join(" ")));

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use melops_am::hmm::{Hmm, HmmManager};
    use melops_am::loader::ModelData;
    use melops_am::senone::{Senone, SenoneSequence};
    use melops_am::unit::Context;
    use melops_am::unit_manager::UnitManager;
    use ndarray::Array2;
    use std::sync::Arc;

    #[test]
    fn summarizes_counts() {
        let units = Arc::new(UnitManager::new());
        let sil = units.silence().clone();
        let ae = units.get_unit("AE", false, Context::Empty);

        let loader = move |_: &UnitManager| -> melops_am::error::Result<ModelData> {
            let hmm_manager = HmmManager::new();
            for (i, unit) in [&sil, &ae].into_iter().enumerate() {
                hmm_manager.put(Hmm::new(
                    unit.clone(),
                    Arc::new(SenoneSequence::new(vec![Arc::new(Senone::tied(i))])),
                    Arc::new(Array2::zeros((1, 2))),
                    HmmPosition::Undefined,
                ));
            }

            Ok(ModelData {
                hmm_manager,
                ci_units: [&sil, &ae]
                    .into_iter()
                    .map(|u| (u.name().to_string(), u.clone()))
                    .collect(),
                ..Default::default()
            })
        };

        let model = AcousticModel::new(Arc::new(loader), units, AcousticModelConfig::default());
        model.allocate().unwrap();

        let text = summary(&model).unwrap();

        assert!(text.contains("hmms          2\n"));
        assert!(text.contains("  -           2\n"));
        assert!(text.contains("context size  0/0\n"));
        assert!(text.contains("ci units      AE SIL*\n"));
    }
}
