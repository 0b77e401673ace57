use std::{io, path::PathBuf, time::Duration};

use anyhow::Error;
use clap::{CommandFactory, Parser, Subcommand};
use inquire::Confirm;
use tracing::{debug, info};

use crate::{
    configuration::{get_config_path, initialize_configuration, reset_configuration},
    processors::{
        favicon::builder::build_favicons,
        logo::{
            bedrock::BedrockConnection,
            generator::{LogoOutput, generate_logo},
            init::initialize_logo_configuration,
        },
    },
};

mod configuration;
mod processors;
mod utils;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resize a logo into favicon PNGs and a favicon.ico
    Favicon {
        /// Source image (defaults to the configured input)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Directory the favicons are written to
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
    },
    /// Generate a team logo with a Bedrock image model
    Logo {
        /// Directory the logo is written to
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
        /// Model to try, in order; repeat to override the configured list
        #[arg(short, long = "model", value_name = "MODEL_ID")]
        models: Vec<String>,
    },
    /// Interactively choose the models and region used for logo generation
    Init,
    /// Reset the configuration file to its defaults
    Reset,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let _guard = utils::init_tracing(cli.debug);

    let config_path = match cli.config.clone().or_else(get_config_path) {
        Some(path) => path,
        None => return Err(Error::msg("Failed to determine config path")),
    };
    debug!(path = %config_path.display(), "using configuration file");

    match &cli.command {
        Some(Commands::Favicon { input, output_dir }) => {
            let config = initialize_configuration(&config_path, false)?;
            let input = input.clone().unwrap_or(config.favicon.input.clone());

            if let Some(report) =
                build_favicons(&config.favicon, &input, output_dir, &mut io::stdout())?
            {
                info!(files = report.written.len(), "favicon set complete");
            }
        }
        Some(Commands::Logo { output_dir, models }) => {
            let mut config = initialize_configuration(&config_path, false)?;
            if !models.is_empty() {
                config.logo.models = models.clone();
            }

            let connection = BedrockConnection::connect(
                &config.logo.region,
                Duration::from_secs(config.logo.timeout_secs),
            )?;
            let backends = connection.backends(&config.logo);
            let output = LogoOutput {
                dir: output_dir,
                prefix: &config.logo.output_prefix,
            };

            generate_logo(
                &backends,
                &config.logo.prompt,
                &config.logo.generation,
                &output,
                &mut io::stdout(),
            );
        }
        Some(Commands::Init) => {
            let config = initialize_configuration(&config_path, false)?;
            initialize_logo_configuration(&config_path, config)?;
        }
        Some(Commands::Reset) => {
            if utils::is_interactive() {
                let confirmed = Confirm::new(&format!(
                    "Overwrite {} with the default configuration?",
                    config_path.display()
                ))
                .with_default(false)
                .prompt()
                .unwrap_or(false);

                if !confirmed {
                    println!("ℹ️  No changes made.");
                    return Ok(());
                }
            }

            match reset_configuration(config_path.as_path()) {
                Ok(_) => {
                    info!(path = %config_path.display(), "configuration reset");
                    println!(
                        "Configuration reset to default at {}",
                        config_path.display()
                    )
                }
                Err(e) => eprintln!("Failed to reset configuration: {}", e),
            };
        }
        None => {
            let mut cmd = Cli::command();
            cmd.print_help().ok();
        }
    }

    Ok(())
}
