//! Rename/convert stage
//!
//! Moves the sorted sequence into its canonical names `<prefix><seq>[.ext]`,
//! re-encoding files whose extension differs from the configured output
//! format. The zero-pad width of the sequence number comes from the digit
//! count of the final retained count, not the original count. A failed
//! conversion leaves the source file in place under its old name, so the
//! resulting sequence may carry a gap; that behavior is observable and kept.

use super::{safe_remove, CandidateFile};
use crate::config::{OutputFormat, PostProcessConfig};
use crate::error::{HarvestError, Result};
use crate::keywords::{digit_count, zero_pad};
use crate::services::FailureLog;
use std::path::{Path, PathBuf};

/// What happened to one file in the rename stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Moved in place, bytes preserved exactly
    Moved,
    /// Re-encoded into the output format; source deleted
    Converted,
    /// Decode/encode failed; source left untouched under its old name
    ConversionFailed,
}

/// Normalized extension of a file name: lowercase, with `jpeg` rewritten to
/// `jpg`. `None` when the name has no extension.
fn normalized_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    let ext = ext.to_ascii_lowercase();
    Some(if ext == "jpeg" { "jpg".to_string() } else { ext })
}

/// Rename or convert every file of the sorted sequence in order.
///
/// # Errors
/// - Filesystem errors moving a file (a move failure is not best-effort; it
///   aborts the keyword like any unexpected error)
pub(crate) fn rename_sequence(
    files: &[CandidateFile],
    prefix: &str,
    config: &PostProcessConfig,
    failure_log: &FailureLog,
) -> Result<Vec<RenameOutcome>> {
    let width = digit_count(files.len());
    let mut outcomes = Vec::with_capacity(files.len());

    for (position, file) in files.iter().enumerate() {
        let new_base = format!("{prefix}{}", zero_pad(position + 1, width));
        let extension = normalized_extension(&file.file_name);

        let matches_target = match (&config.output_format, &extension) {
            (None, _) => true,
            (Some(format), Some(ext)) => ext.as_str() == format.extension(),
            (Some(_), None) => false,
        };

        if matches_target {
            let new_name = match &extension {
                Some(ext) => format!("{new_base}.{ext}"),
                None => new_base,
            };
            let new_path = sibling(&file.path, &new_name);
            log::debug!("moving {} -> {}", file.path.display(), new_path.display());
            std::fs::rename(&file.path, &new_path)
                .map_err(|e| HarvestError::file_io_error("move file", &file.path, e))?;
            outcomes.push(RenameOutcome::Moved);
        } else {
            let format = config.output_format.expect("checked above");
            let new_path = sibling(&file.path, &format!("{new_base}.{}", format.extension()));
            log::debug!("converting {} -> {}", file.path.display(), new_path.display());
            match convert(&file.path, &new_path, format, config.quality) {
                Ok(()) => {
                    safe_remove(&file.path, failure_log);
                    outcomes.push(RenameOutcome::Converted);
                },
                Err(e) => {
                    let message = format!("Unable to convert image {}: {e}", file.path.display());
                    log::warn!("{message}");
                    failure_log.record(&message);
                    outcomes.push(RenameOutcome::ConversionFailed);
                },
            }
        }
    }

    Ok(outcomes)
}

/// Path next to `original` with the given file name
fn sibling(original: &Path, file_name: &str) -> PathBuf {
    original
        .parent()
        .map_or_else(|| PathBuf::from(file_name), |dir| dir.join(file_name))
}

/// Decode `src` and re-encode it at `dest` in the requested format.
///
/// A partially written destination is cleaned up on failure.
fn convert(src: &Path, dest: &Path, format: OutputFormat, quality: u8) -> Result<()> {
    let image = image::open(src)?;
    let result = match format {
        OutputFormat::Jpeg => {
            let file = std::fs::File::create(dest)
                .map_err(|e| HarvestError::file_io_error("create file", dest, e))?;
            let mut writer = std::io::BufWriter::new(file);
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
            encoder
                .encode_image(&image.to_rgb8())
                .map_err(HarvestError::from)
                .and_then(|()| {
                    std::io::Write::flush(&mut writer)
                        .map_err(|e| HarvestError::file_io_error("flush file", dest, e))
                })
        },
        OutputFormat::Png => image
            .save_with_format(dest, image::ImageFormat::Png)
            .map_err(HarvestError::from),
        OutputFormat::WebP => image
            .save_with_format(dest, image::ImageFormat::WebP)
            .map_err(HarvestError::from),
    };

    if result.is_err() && dest.exists() {
        let _ = std::fs::remove_file(dest);
    }
    result
}
