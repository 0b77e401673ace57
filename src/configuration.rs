use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};
use strum::Display;

const DEFAULT_PROMPT: &str = "Create a playful, kitsch-style logo with ABSOLUTELY NO TEXT, NO LETTERS, NO WORDS.
The design should be:
- Retro-futuristic with neon colors (hot pink, electric blue, lime green, bright yellow)
- Include cute pixelated elements or 8-bit style graphics
- Feature adorable kawaii-style ghosts as the main characters
- Cute ghosts with big sparkly eyes and happy expressions
- Mix of digital glitch effects and smooth gradients
- NO text anywhere including bottom, top, or sides
- NO \"VARCRON\" or any other text
- NO letters, NO typography - only visual elements
- Overall vibe: fun, energetic, slightly chaotic but charming
Style: Vaporwave meets kawaii culture, digital art, maximalist design, completely text-free logo";

/// Largest edge an ICO directory entry can describe.
pub const MAX_ICO_SIZE: u32 = 256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaviconConfig {
    pub input: PathBuf,
    pub sizes: Vec<u32>,
    pub ico_sizes: Vec<u32>,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        FaviconConfig {
            input: PathBuf::from("kitsch_team_logo_20250905_231057.png"),
            sizes: vec![16, 32, 48, 64, 128, 256],
            ico_sizes: vec![16, 32],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Quality {
    Standard,
    Premium,
}

/// Parameters sent verbatim as `imageGenerationConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub number_of_images: u32,
    pub quality: Quality,
    pub height: u32,
    pub width: u32,
    pub cfg_scale: f32,
    pub seed: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            number_of_images: 1,
            quality: Quality::Standard,
            height: 1024,
            width: 1024,
            cfg_scale: 8.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogoConfig {
    pub region: String,
    /// Tried in order; the first one that produces an image wins.
    pub models: Vec<String>,
    pub prompt: String,
    pub output_prefix: String,
    pub timeout_secs: u64,
    pub generation: GenerationConfig,
}

impl Default for LogoConfig {
    fn default() -> Self {
        LogoConfig {
            region: "us-east-1".to_string(),
            models: vec![
                "amazon.nova-canvas-v1:0".to_string(),
                "amazon.titan-image-generator-v1".to_string(),
            ],
            prompt: DEFAULT_PROMPT.to_string(),
            output_prefix: "kitsch_team_logo".to_string(),
            timeout_secs: 120,
            generation: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: u32,
    pub favicon: FaviconConfig,
    pub logo: LogoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: 1,
            favicon: FaviconConfig::default(),
            logo: LogoConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.favicon.sizes.is_empty() || self.favicon.sizes.contains(&0) {
            return Err(Error::msg("favicon.sizes must be a non-empty list of positive sizes"));
        }

        if self.favicon.ico_sizes.is_empty()
            || self
                .favicon
                .ico_sizes
                .iter()
                .any(|&size| size == 0 || size > MAX_ICO_SIZE)
        {
            return Err(Error::msg(format!(
                "favicon.ico_sizes must be a non-empty list of sizes between 1 and {}",
                MAX_ICO_SIZE
            )));
        }

        if self.logo.models.is_empty() {
            return Err(Error::msg("logo.models must name at least one model"));
        }

        if self.logo.generation.number_of_images == 0 {
            return Err(Error::msg("logo.generation.numberOfImages must be at least 1"));
        }

        if self.logo.timeout_secs == 0 {
            return Err(Error::msg("logo.timeout_secs must be at least 1"));
        }

        Ok(())
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    let system_config_path = dirs::config_dir();

    if let Some(mut path) = system_config_path {
        path.push("kitsch_assets/kitsch-assets.json");
        return Some(path);
    }

    let mut current_dir = env::current_dir().ok()?;

    current_dir.push("kitsch-assets.json");

    Some(current_dir)
}

pub fn write_config(path: &Path, config: &Config) -> Result<(), Error> {
    let config_data = serde_json::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, config_data)
        .with_context(|| format!("Failed to write configuration to {}", path.display()))?;

    Ok(())
}

pub fn create_default_config(path: &Path) -> Result<(), Error> {
    write_config(path, &Config::default())
}

pub fn initialize_configuration(
    config_path: &Path,
    reset_configuration: bool,
) -> Result<Config, Error> {
    if config_path.exists() && reset_configuration {
        fs::remove_file(config_path).ok();
    }

    if !config_path.exists() {
        create_default_config(config_path)?;
    }

    let contents = fs::read_to_string(config_path)?;

    let config: Config = serde_json::from_str(&contents).with_context(|| {
        format!("Failed to parse configuration file {}", config_path.display())
    })?;

    config.validate()?;

    Ok(config)
}

pub fn reset_configuration(config_path: &Path) -> Result<Config, Error> {
    initialize_configuration(config_path, true)
}
