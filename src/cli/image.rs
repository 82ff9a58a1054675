//! Image upload CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::error::{SleekError, SleekResult};
use crate::images::{validate_upload, ImageOptimizer};

/// Image subcommands
#[derive(Subcommand)]
pub enum ImageCommands {
    /// Check whether a file would be accepted as an upload
    Check { file: PathBuf },
    /// Shrink an image to the configured maximum dimension
    Optimize {
        file: PathBuf,
        /// Output path, defaults to `<name>.optimized.<ext>` next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle an image command
pub fn handle_image_command(settings: &Settings, cmd: ImageCommands) -> SleekResult<()> {
    match cmd {
        ImageCommands::Check { file } => {
            let bytes = read(&file)?;
            let format = validate_upload(&bytes, settings.images.max_upload_bytes)?;
            println!(
                "{}: {} ({}), {} bytes",
                file.display(),
                format,
                format.mime_type(),
                bytes.len()
            );
        }

        ImageCommands::Optimize { file, output } => {
            let bytes = read(&file)?;
            let optimized = ImageOptimizer::from_settings(&settings.images).optimize(&bytes)?;

            let output = output.unwrap_or_else(|| {
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                file.with_file_name(format!(
                    "{}.optimized.{}",
                    stem,
                    optimized.format.extension()
                ))
            });
            std::fs::write(&output, &optimized.bytes).map_err(|e| {
                SleekError::Io(format!("Failed to write {}: {}", output.display(), e))
            })?;

            println!("Wrote {}", output.display());
            if let Some((width, height)) = optimized.dimensions {
                println!(
                    "  {}x{}{}",
                    width,
                    height,
                    if optimized.resized { " (resized)" } else { "" }
                );
            }
            println!(
                "  {} -> {} bytes (saved {})",
                optimized.original_size,
                optimized.size(),
                optimized.saved_bytes()
            );
        }
    }

    Ok(())
}

fn read(path: &PathBuf) -> SleekResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| SleekError::Io(format!("Failed to read {}: {}", path.display(), e)))
}
