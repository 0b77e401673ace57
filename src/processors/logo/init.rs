use std::path::Path;

use anyhow::Error;
use inquire::{InquireError, MultiSelect, Text};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};
use tracing::{debug, info, instrument};

use crate::configuration::{Config, write_config};

/// Bedrock models that accept the `TEXT_IMAGE` request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
pub enum KnownModel {
    #[strum(serialize = "amazon.nova-canvas-v1:0")]
    NovaCanvas,
    #[strum(serialize = "amazon.titan-image-generator-v2:0")]
    TitanImageV2,
    #[strum(serialize = "amazon.titan-image-generator-v1")]
    TitanImageV1,
}

fn handle_inquire_error(err: InquireError, context: &str) -> Error {
    match err {
        InquireError::OperationCanceled => Error::msg("Operation cancelled by user"),
        InquireError::OperationInterrupted => Error::msg("Operation interrupted by user"),
        _ => Error::msg(format!("{}: {}", context, err)),
    }
}

/// Configured models first, in priority order, then the remaining known ones.
fn model_options(configured: &[String]) -> Vec<String> {
    let mut options = configured.to_vec();

    for model in KnownModel::iter() {
        if !options.iter().any(|o| o == model.as_ref()) {
            options.push(model.as_ref().to_string());
        }
    }

    options
}

fn with_selected_models(mut config: Config, models: Vec<String>, region: String) -> Config {
    config.logo.models = models;
    config.logo.region = region;
    config
}

#[instrument(skip(config), fields(path = %config_path.display()))]
pub fn initialize_logo_configuration(config_path: &Path, config: Config) -> Result<(), Error> {
    println!("📋 Current model priority:");
    for (index, model) in config.logo.models.iter().enumerate() {
        println!("  {}. {}", index + 1, model);
    }
    println!();

    let options = model_options(&config.logo.models);
    let default_indices: Vec<usize> = (0..config.logo.models.len()).collect();

    let models = MultiSelect::new("Select the models to try, in listed order:", options)
        .with_help_message(
            "Use space to select/deselect, arrow keys to navigate, enter to confirm. Models are tried top to bottom",
        )
        .with_default(&default_indices)
        .prompt()
        .map_err(|err| handle_inquire_error(err, "Failed to get model selection"))?;

    if models.is_empty() {
        return Err(Error::msg("At least one model must be selected"));
    }
    debug!(?models, "selected models");

    let region = Text::new("AWS region:")
        .with_default(&config.logo.region)
        .prompt()
        .map_err(|err| handle_inquire_error(err, "Failed to prompt for region"))?;

    let config = with_selected_models(config, models, region);
    config.validate()?;
    write_config(config_path, &config)?;

    info!("wrote logo configuration");
    println!("✅ Successfully configured logo generation");
    println!("📁 Configuration written to: {}", config_path.display());

    Ok(())
}
