//! Acoustic model configuration.

/// Configuration consumed when constructing an
/// [`AcousticModel`](crate::model::AcousticModel).
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct AcousticModelConfig {
    /// Disable composite HMM synthesis for units with an open context side
    #[arg(long = "no-composites", action = clap::ArgAction::SetFalse)]
    pub use_composites: bool,
}

impl Default for AcousticModelConfig {
    fn default() -> Self {
        Self {
            use_composites: true,
        }
    }
}

impl AcousticModelConfig {
    pub fn new(use_composites: bool) -> Self {
        Self { use_composites }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        config: AcousticModelConfig,
    }

    #[test]
    fn composites_default_on() {
        assert!(AcousticModelConfig::default().use_composites);

        let harness = Harness::parse_from(["test"]);
        assert!(harness.config.use_composites);
    }

    #[test]
    fn flag_turns_composites_off() {
        let harness = Harness::parse_from(["test", "--no-composites"]);

        assert!(!harness.config.use_composites);
    }
}
