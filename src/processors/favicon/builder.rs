use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use image::{ImageFormat, imageops::FilterType};
use tracing::{debug, info, instrument, warn};

use crate::{
    configuration::FaviconConfig,
    processors::favicon::icon::{ICO_FILE_NAME, write_icon},
};

/// Files written by one successful run, in the order they were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconReport {
    pub written: Vec<PathBuf>,
}

pub fn variant_file_name(size: u32) -> String {
    format!("favicon-{size}x{size}.png")
}

/// Builds the favicon set for `input` into `output_dir`.
///
/// A missing input is reported on `out` and yields `Ok(None)` without touching
/// the file system. Decode and encode failures are returned as errors; files
/// already written by then stay on disk.
#[instrument(skip_all, fields(input = %input.display(), output_dir = %output_dir.display()))]
pub fn build_favicons(
    config: &FaviconConfig,
    input: &Path,
    output_dir: &Path,
    out: &mut impl Write,
) -> Result<Option<FaviconReport>, Error> {
    if !input.exists() {
        warn!("favicon source is missing");
        writeln!(out, "❌ Could not find {}", input.display())?;
        return Ok(None);
    }

    let source = image::open(input)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    debug!(
        width = source.width(),
        height = source.height(),
        "decoded favicon source"
    );

    let mut written = Vec::with_capacity(config.sizes.len() + 1);

    for &size in &config.sizes {
        let file_name = variant_file_name(size);
        let path = output_dir.join(&file_name);

        source
            .resize_exact(size, size, FilterType::Lanczos3)
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(size, path = %path.display(), "wrote favicon variant");
        writeln!(out, "✅ {} created", file_name)?;
        written.push(path);
    }

    // The icon entries are resampled from the source again rather than read
    // back from the variants above.
    let ico_path = output_dir.join(ICO_FILE_NAME);
    write_icon(&source, &config.ico_sizes, &ico_path)?;

    info!(sizes = ?config.ico_sizes, path = %ico_path.display(), "wrote favicon icon");
    writeln!(out, "✅ {} created", ICO_FILE_NAME)?;
    written.push(ico_path);

    Ok(Some(FaviconReport { written }))
}
