use std::{fs, path::Path};

use anyhow::{Context, Error};
use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::{DynamicImage, imageops::FilterType};
use tracing::debug;

pub const ICO_FILE_NAME: &str = "favicon.ico";

/// Resizes `source` once per entry of `sizes` and packs every result into a
/// single ICO directory. Entries keep the order of `sizes`.
pub fn encode_icon(source: &DynamicImage, sizes: &[u32]) -> Result<IconDir, Error> {
    let mut icon_dir = IconDir::new(ResourceType::Icon);

    for &size in sizes {
        let rgba = source
            .resize_exact(size, size, FilterType::Lanczos3)
            .to_rgba8();
        let image = IconImage::from_rgba_data(size, size, rgba.into_raw());
        let entry = IconDirEntry::encode(&image)
            .with_context(|| format!("Failed to encode {size}x{size} ICO entry"))?;

        debug!(size, "added ICO entry");
        icon_dir.add_entry(entry);
    }

    Ok(icon_dir)
}

pub fn write_icon(source: &DynamicImage, sizes: &[u32], path: &Path) -> Result<(), Error> {
    let icon_dir = encode_icon(source, sizes)?;

    let mut buffer = Vec::new();
    icon_dir
        .write(&mut buffer)
        .context("Failed to serialize ICO directory")?;

    fs::write(path, &buffer).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn entries_follow_requested_sizes() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([x as u8 * 4, y as u8 * 4, 128, 255])
        }));

        let icon_dir = encode_icon(&source, &[16, 32]).unwrap();
        let sizes: Vec<(u32, u32)> = icon_dir
            .entries()
            .iter()
            .map(|entry| (entry.width(), entry.height()))
            .collect();

        assert_eq!(sizes, vec![(16, 16), (32, 32)]);
    }

    #[cfg(unix)]
    #[test]
    fn write_to_full_device_is_an_error() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([255, 0, 128, 255])));

        let result = write_icon(&source, &[16, 32], Path::new("/dev/full"));

        assert!(result.is_err());
    }
}
