//! Scoring of retained files for the sort stage

use crate::error::{HarvestError, Result};
use crate::services::FailureLog;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn rank_regex() -> &'static Regex {
    static RANK: OnceLock<Regex> = OnceLock::new();
    RANK.get_or_init(|| Regex::new("[0-9]+").expect("valid rank pattern"))
}

/// Parse the first maximal run of decimal digits in a filename.
///
/// Lower scores sort earlier. The downloader embeds the 1-based discovery
/// rank as the first digit run, so this relies on that naming contract; a
/// filename with no digit run is a hard error for the keyword. Absurdly long
/// digit runs saturate instead of failing.
pub(crate) fn rank_score(file_name: &str) -> Result<u64> {
    let run = rank_regex()
        .find(file_name)
        .ok_or_else(|| HarvestError::missing_rank(file_name))?;
    Ok(run.as_str().parse::<u64>().unwrap_or(u64::MAX))
}

/// Pixel area (`height * width`) of the decoded image.
///
/// A file that fails to decode scores 0 (sorts last in descending order, first
/// in ascending) rather than aborting the keyword; the failure is logged.
pub(crate) fn resolution_score(path: &Path, failure_log: &FailureLog) -> u64 {
    match image::image_dimensions(path) {
        Ok((width, height)) => u64::from(height) * u64::from(width),
        Err(e) => {
            let message = format!("Unable to determine the size for {}: {e}", path.display());
            log::warn!("{message}");
            failure_log.record(&message);
            0
        },
    }
}
