//! Lookup subcommand - resolve a unit to its nearest HMM.

use crate::cli::ModelArgs;
use crate::config::ModelConfig;
use eyre::{Context as _, OptionExt, Result, bail};
use melops_am::config::AcousticModelConfig;
use melops_am::hmm::{Hmm, HmmPosition};
use melops_am::model::AcousticModel;
use melops_am::senone::Senone;
use melops_am::unit::{Context, Unit};
use std::sync::Arc;

/// CLI arguments for unit lookup.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Unit to resolve: NAME, NAME[L,R], NAME[*,R] or NAME[L,*]
    pub unit: String,

    /// Word position: b, e, i, s or -
    #[arg(short, long, default_value = "i", allow_hyphen_values = true)]
    pub position: HmmPosition,

    /// Only accept an HMM registered for exactly this unit and position
    #[arg(long)]
    pub exact: bool,

    #[command(flatten)]
    pub am_config: AcousticModelConfig,
}

/// Resolved configuration for unit lookup.
#[derive(Debug)]
pub struct Config {
    pub model: ModelConfig,
    pub unit: String,
    pub position: HmmPosition,
    pub exact: bool,
    pub am_config: AcousticModelConfig,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            model: args.model.try_into()?,
            unit: args.unit,
            position: args.position,
            exact: args.exact,
            am_config: args.am_config,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let model = config.model.load(config.am_config)?;
    let unit = parse_unit(&model, &config.unit)?;

    tracing::info!(%unit, position = %config.position, exact = config.exact, "resolving unit");

    let hmm = model
        .lookup_nearest_hmm(&unit, config.position, config.exact)
        .wrap_err_with(|| format!("failed to resolve {unit}"))?;

    match hmm {
        Some(hmm) => print!("{}", describe(&hmm)),
        None => println!("no exact match"),
    }

    Ok(())
}

/// Parse `NAME` or `NAME[LEFT,RIGHT]` against the model's phones.
///
/// A side is `*` when unconstrained, `-` when empty, else one or more phone
/// names joined with `.`.
pub fn parse_unit(model: &AcousticModel, text: &str) -> Result<Arc<Unit>> {
    let text = text.trim();

    let (name, context) = match text.split_once('[') {
        None => (text, Context::Empty),
        Some((name, rest)) => {
            let sides = rest
                .strip_suffix(']')
                .ok_or_eyre("unit context must end with ']'")?;
            let (left, right) = sides
                .split_once(',')
                .ok_or_eyre("unit context must be [LEFT,RIGHT]")?;

            let context = Context::left_right(
                parse_side(model, left.trim())?,
                parse_side(model, right.trim())?,
            );
            (name.trim(), context)
        }
    };

    let Some(base) = phone(model, name)? else {
        bail!("unknown base phone {name:?}");
    };

    Ok(model
        .unit_manager()
        .get_unit(base.name(), base.is_filler(), context))
}

fn parse_side(model: &AcousticModel, side: &str) -> Result<Option<Vec<Arc<Unit>>>> {
    match side {
        "*" => Ok(None),
        "-" => Ok(Some(Vec::new())),
        phones => phones
            .split('.')
            .map(|name| phone(model, name)?.ok_or_eyre(format!("unknown context phone {name:?}")))
            .collect::<Result<Vec<_>>>()
            .map(Some),
    }
}

fn phone(model: &AcousticModel, name: &str) -> Result<Option<Arc<Unit>>> {
    Ok(model.context_independent_unit(name)?)
}

/// Render an HMM: unit, position, per-state senones and transition shape.
pub fn describe(hmm: &Hmm) -> String {
    let states: Vec<String> = hmm
        .senone_sequence()
        .senones()
        .iter()
        .map(|senone| match senone.as_ref() {
            Senone::Tied(id) => id.to_string(),
            Senone::Composite(composite) => {
                let members: Vec<String> = composite
                    .members()
                    .iter()
                    .map(|m| m.id().to_string())
                    .collect();
                format!("{{{}}}", members.join("|"))
            }
        })
        .collect();

    let (rows, cols) = hmm.transition_matrix().dim();

    format!(
        "unit      {}\nposition  {}\nstates    {}\ntmat      {rows}x{cols}\ncomposite {}\n",
        hmm.unit(),
        hmm.position(),
        states.join(" "),
        hmm.is_composite()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use melops_am::loader::ModelData;
    use melops_am::senone::{CompositeSenone, SenoneSequence};
    use melops_am::unit_manager::UnitManager;
    use ndarray::Array2;
    use std::collections::BTreeMap;

    fn model() -> AcousticModel {
        let units = Arc::new(UnitManager::new());
        let ci_units: BTreeMap<String, Arc<Unit>> = ["AE", "K", "T"]
            .into_iter()
            .map(|name| (name.to_string(), units.get_unit(name, false, Context::Empty)))
            .chain([("SIL".to_string(), units.silence().clone())])
            .collect();

        let loader = move |_: &UnitManager| -> melops_am::error::Result<ModelData> {
            Ok(ModelData {
                ci_units: ci_units.clone(),
                ..Default::default()
            })
        };

        let model = AcousticModel::new(Arc::new(loader), units, AcousticModelConfig::default());
        model.allocate().unwrap();
        model
    }

    #[test]
    fn parses_context_independent_unit() {
        let model = model();

        let unit = parse_unit(&model, "AE").unwrap();

        assert!(!unit.is_context_dependent());
        assert_eq!(unit.to_string(), "AE");
    }

    #[test]
    fn parses_partial_context() {
        let model = model();

        let unit = parse_unit(&model, "AE[*,T]").unwrap();

        assert!(unit.context().left().is_none());
        assert_eq!(unit.context().right().map(<[_]>::len), Some(1));
        assert!(unit.is_composite_candidate());
    }

    #[test]
    fn display_round_trips() {
        let model = model();

        for text in ["AE[K,T]", "AE[-,SIL]", "AE[K.T,*]"] {
            assert_eq!(parse_unit(&model, text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn silence_keeps_filler_flag() {
        let model = model();

        assert!(parse_unit(&model, "SIL").unwrap().is_filler());
    }

    #[test]
    fn rejects_unknown_phones() {
        let model = model();

        assert!(parse_unit(&model, "ZH").is_err());
        assert!(parse_unit(&model, "AE[ZH,T]").is_err());
        assert!(parse_unit(&model, "AE[K,T").is_err());
        assert!(parse_unit(&model, "AE[K]").is_err());
    }

    #[test]
    fn describes_composite_states() {
        let unit = Arc::new(Unit::new("AE", false, Context::Empty));
        let composite = CompositeSenone::new(
            [Arc::new(Senone::tied(4)), Arc::new(Senone::tied(2))],
            0.0,
        );
        let hmm = Hmm::new(
            unit,
            Arc::new(SenoneSequence::new(vec![
                Arc::new(Senone::Composite(composite)),
                Arc::new(Senone::tied(7)),
            ])),
            Arc::new(Array2::zeros((2, 3))),
            HmmPosition::Internal,
        );

        let text = describe(&hmm);

        assert!(text.contains("unit      AE\n"));
        assert!(text.contains("position  i\n"));
        assert!(text.contains("states    {2|4} 7\n"));
        assert!(text.contains("tmat      2x3\n"));
        assert!(text.contains("composite true\n"));
    }
}
