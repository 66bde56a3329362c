//! `recommend` command: one JSON request on stdin, ranked stations on stdout.

use std::io::{Read, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chargewise_scorer::{ModelArtifact, RecommendRequest, ScoringEngine, ServingConfig};
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::files::write_line;
use crate::{ARG_ARTIFACT, ARG_DEFAULT_BATTERY, ARG_TOP_K, CliError};

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read {\"stations\": [...], \"user_preferences\": {...}} from \
                 stdin and print the stations ranked by predicted rating. \
                 Without a usable model artefact the stations are ranked by \
                 the rule-based score instead.",
    about = "Rank candidate stations for one user"
)]
#[ortho_config(prefix = "CHARGEWISE")]
pub(crate) struct RecommendArgs {
    /// Model artefact written by `train` or `compare`.
    #[arg(long = ARG_ARTIFACT, value_name = "path")]
    #[serde(default)]
    pub(crate) artifact: Option<Utf8PathBuf>,
    /// Seed for simulated slots and reliability.
    #[arg(long, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Results kept when ranking by rules.
    #[arg(long = ARG_TOP_K, value_name = "count")]
    #[serde(default)]
    pub(crate) top_k: Option<usize>,
    /// Battery capacity assumed when the request omits it.
    #[arg(long = ARG_DEFAULT_BATTERY, value_name = "kwh")]
    #[serde(default)]
    pub(crate) default_battery_kwh: Option<f64>,
}

impl RecommendArgs {
    fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    pub(crate) artifact: Option<Utf8PathBuf>,
    pub(crate) serving: ServingConfig,
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let defaults = ServingConfig::default();
        let top_k = args.top_k.unwrap_or(defaults.top_k);
        if top_k == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_TOP_K,
                reason: "must keep at least one station".to_owned(),
            });
        }
        let default_battery_kwh = args
            .default_battery_kwh
            .unwrap_or(defaults.default_battery_kwh);
        if !default_battery_kwh.is_finite() || default_battery_kwh <= 0.0 {
            return Err(CliError::InvalidArgument {
                field: ARG_DEFAULT_BATTERY,
                reason: format!("{default_battery_kwh} is not a positive capacity"),
            });
        }
        Ok(Self {
            artifact: args.artifact,
            serving: ServingConfig {
                seed: args.seed.unwrap_or(defaults.seed),
                default_battery_kwh,
                top_k,
            },
        })
    }
}

pub(crate) fn run_recommend(
    args: RecommendArgs,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_recommend(&config, input, output)
}

pub(crate) fn execute_recommend(
    config: &RecommendConfig,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> Result<(), CliError> {
    let mut body = String::new();
    input
        .read_to_string(&mut body)
        .map_err(CliError::ReadRequest)?;
    let request = RecommendRequest::from_json(&body)?;
    let engine = if request.is_empty() {
        info!("request names no stations; skipping the model artefact");
        ScoringEngine::default()
    } else {
        load_engine(config.artifact.as_deref())?
    };
    let response = request.respond(&engine, &config.serving)?;
    write_line(output, &response)
}

/// Engine with the artefact at `path` installed when it can be used.
///
/// Missing or unreadable artefacts leave the engine on rule scoring; an
/// artefact that decodes but is inconsistent is an error.
pub(crate) fn load_engine(path: Option<&Utf8Path>) -> Result<ScoringEngine, CliError> {
    let engine = ScoringEngine::default();
    let Some(artifact_path) = path else {
        info!("no model artefact configured; ranking by rules");
        return Ok(engine);
    };
    match ModelArtifact::load(artifact_path) {
        Ok(artifact) => engine.install(artifact),
        Err(err) if err.is_recoverable() => {
            warn!("model artefact {artifact_path} unusable ({err}); ranking by rules");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(engine)
}
