//! Keyword task planning
//!
//! Turns a keyword list into per-keyword tasks: slices the list by the
//! requested `begin`/`end` range (interpreted against a configurable starting
//! number), and derives each task's destination directory under the output
//! root. Index padding in directory names uses the digit count of the full,
//! pre-slice list so a re-run over a narrower range produces the same names.

use crate::error::{HarvestError, Result};
use std::path::{Path, PathBuf};

/// One keyword's unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTask {
    /// Position in the keyword list, offset by the starting number
    pub index: usize,
    /// The search keyword
    pub keyword: String,
    /// Destination directory for this keyword's images
    pub dest_dir: PathBuf,
}

/// Options controlling slicing and directory naming
#[derive(Debug, Clone)]
pub struct KeywordOptions {
    /// Root directory under which per-keyword directories are created
    pub output_root: PathBuf,
    /// First row to process (defaults to `starting_number`)
    pub begin: Option<usize>,
    /// Last row to process, inclusive (defaults to the last row)
    pub end: Option<usize>,
    /// User's preferred numbering base (default 1)
    pub starting_number: usize,
    /// Prefix directory names with the zero-padded index
    pub include_index: bool,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            begin: None,
            end: None,
            starting_number: 1,
            include_index: false,
        }
    }
}

/// Number of decimal digits in `value`, used for zero-padding widths
#[must_use]
pub fn digit_count(value: usize) -> usize {
    value.to_string().len()
}

/// Zero-pad `value` to `width` digits
#[must_use]
pub fn zero_pad(value: usize, width: usize) -> String {
    format!("{value:0width$}")
}

/// Resolve the `begin`/`end` range against the list length and starting number.
///
/// Returns the resolved inclusive `(begin, end)` pair in user numbering.
///
/// # Errors
/// - `begin` below the starting number
fn resolve_range(
    len: usize,
    begin: Option<usize>,
    end: Option<usize>,
    starting_number: usize,
) -> Result<(usize, usize)> {
    let begin = match begin {
        None => starting_number,
        Some(begin) if begin < starting_number => {
            return Err(HarvestError::invalid_config(format!(
                "the starting position is less than {starting_number}"
            )))
        },
        Some(begin) => begin,
    };
    let end = end.unwrap_or((len + starting_number).saturating_sub(1));
    Ok((begin, end))
}

/// Slice a keyword list by `begin`/`end` in user numbering.
///
/// With both bounds in range the slice holds exactly `end - begin + 1`
/// keywords; an `end` past the list is clamped, mirroring the permissive
/// behavior of range selection in spreadsheet-style inputs.
///
/// # Errors
/// - `begin` below the starting number
pub fn slice_keywords(
    keywords: &[String],
    begin: Option<usize>,
    end: Option<usize>,
    starting_number: usize,
) -> Result<Vec<String>> {
    let (begin, end) = resolve_range(keywords.len(), begin, end, starting_number)?;
    let start = begin - starting_number;
    let stop = (end + 1 - starting_number).min(keywords.len());
    if start >= stop {
        return Ok(Vec::new());
    }
    Ok(keywords
        .get(start..stop)
        .map(<[String]>::to_vec)
        .unwrap_or_default())
}

/// Build the destination directory name for a task
fn dest_dir_name(keyword: &str, index: usize, pad_width: usize, include_index: bool) -> String {
    if include_index {
        format!("{}_{keyword}", zero_pad(index, pad_width))
    } else {
        keyword.to_string()
    }
}

/// Plan per-keyword tasks from the full keyword list.
///
/// Slices by the configured range and assigns each task its user-visible
/// index (`position + begin`) and destination directory.
///
/// # Errors
/// - `begin` below the starting number
pub fn plan_keywords(keywords: &[String], options: &KeywordOptions) -> Result<Vec<KeywordTask>> {
    let (begin, _) = resolve_range(
        keywords.len(),
        options.begin,
        options.end,
        options.starting_number,
    )?;
    // Pad width comes from the full list, not the slice
    let pad_width = digit_count(keywords.len());
    let sliced = slice_keywords(
        keywords,
        options.begin,
        options.end,
        options.starting_number,
    )?;

    Ok(sliced
        .into_iter()
        .enumerate()
        .map(|(position, keyword)| {
            let index = position + begin;
            let dir_name = dest_dir_name(&keyword, index, pad_width, options.include_index);
            KeywordTask {
                index,
                dest_dir: options.output_root.join(dir_name),
                keyword,
            }
        })
        .collect())
}

/// Reset a task's destination directory: remove it recursively when present,
/// then recreate it empty. Runs at the start of every acquisition attempt, so
/// no files survive across attempts or prior program runs.
///
/// # Errors
/// - Filesystem errors removing or creating the directory
pub fn reset_dest_dir(dest_dir: &Path) -> Result<()> {
    if dest_dir.exists() {
        std::fs::remove_dir_all(dest_dir)
            .map_err(|e| HarvestError::file_io_error("remove directory", dest_dir, e))?;
    }
    std::fs::create_dir_all(dest_dir)
        .map_err(|e| HarvestError::file_io_error("create directory", dest_dir, e))?;
    Ok(())
}
