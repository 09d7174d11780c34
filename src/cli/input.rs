//! Keyword input reading
//!
//! Keywords arrive from the command line, stdin, or a file. File inputs may
//! be plain text (one keyword per line) or delimiter-separated tables with a
//! selectable column. The input type is inferred from the file extension when
//! not forced. Spreadsheet files are not supported; export them to CSV first.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::io::Read;
use std::path::Path;

/// Supported keyword input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputType {
    /// Plain text file, one keyword per line
    Txt,
    /// Comma-separated table with a keyword column
    Csv,
    /// Tab-separated table with a keyword column
    Tsv,
    /// Comma-separated keywords on stdin
    Stdin,
    /// Keywords from the `--keywords` option
    Cmd,
}

/// Where the keyword list comes from
#[derive(Debug, Clone)]
pub struct KeywordSource<'a> {
    /// Comma-separated keywords from the command line
    pub keywords: Option<&'a str>,
    /// Input file path
    pub file: Option<&'a Path>,
    /// Forced input type (inferred when absent)
    pub input_type: Option<InputType>,
    /// 1-based column index for table inputs
    pub column_index: Option<usize>,
    /// Column name for table inputs (requires a header row)
    pub column_name: Option<&'a str>,
    /// The file carries no header row
    pub exclude_header: bool,
}

impl KeywordSource<'_> {
    /// Resolve the effective input type
    fn resolve_type(&self) -> Result<InputType> {
        if let Some(input_type) = self.input_type {
            return Ok(input_type);
        }
        if self.keywords.is_some() {
            return Ok(InputType::Cmd);
        }
        let Some(file) = self.file else {
            return Ok(InputType::Stdin);
        };
        if !file.is_file() {
            bail!("path {} is not a file", file.display());
        }
        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(InputType::Csv),
            Some("tsv") => Ok(InputType::Tsv),
            Some("xlsx" | "xls") => {
                bail!("spreadsheet input is not supported; export to CSV first")
            },
            // Anything else reads as a text file
            _ => Ok(InputType::Txt),
        }
    }
}

/// Read the keyword list from the configured source.
///
/// Keywords are trimmed; empty entries are dropped.
pub fn read_keywords(source: &KeywordSource<'_>) -> Result<Vec<String>> {
    let raw = match source.resolve_type()? {
        InputType::Cmd => {
            let keywords = source
                .keywords
                .context("--keywords is required for cmd input")?;
            split_list(keywords)
        },
        InputType::Stdin => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read keywords from stdin")?;
            split_list(&buffer)
        },
        InputType::Txt => {
            let file = source.file.context("--file is required for txt input")?;
            let contents = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            contents.lines().map(str::to_string).collect()
        },
        InputType::Csv => read_table(source, ',')?,
        InputType::Tsv => read_table(source, '\t')?,
    };

    Ok(raw
        .into_iter()
        .map(|keyword| keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty())
        .collect())
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}

/// Extract one column from a delimiter-separated file.
///
/// Fields are split naively on the delimiter; quoted fields containing the
/// delimiter are not supported.
fn read_table(source: &KeywordSource<'_>, delimiter: char) -> Result<Vec<String>> {
    let file = source.file.context("--file is required for table input")?;
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mut rows = contents.lines().map(|line| {
        line.split(delimiter)
            .map(str::trim)
            .map(str::to_string)
            .collect::<Vec<String>>()
    });

    let header = if source.exclude_header {
        None
    } else {
        rows.next()
    };

    let column = match (source.column_index, source.column_name) {
        (Some(index), _) => {
            if index == 0 {
                bail!("column index is 1-based");
            }
            index - 1
        },
        (None, Some(name)) => {
            let header =
                header.as_ref().context("--column-name requires a header row")?;
            header
                .iter()
                .position(|cell| cell == name)
                .with_context(|| format!("no column named '{name}'"))?
        },
        (None, None) => {
            bail!("neither column name nor column index is specified")
        },
    };

    Ok(rows
        .filter_map(|row| row.get(column).cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source<'a>() -> KeywordSource<'a> {
        KeywordSource {
            keywords: None,
            file: None,
            input_type: None,
            column_index: None,
            column_name: None,
            exclude_header: false,
        }
    }

    #[test]
    fn test_cmd_keywords_split_and_trimmed() {
        let mut s = source();
        s.keywords = Some("cat, dog ,,bird");
        let keywords = read_keywords(&s).unwrap();
        assert_eq!(keywords, vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn test_txt_file_one_keyword_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.txt");
        std::fs::write(&path, "cat\ndog\n\nbird\n").unwrap();

        let mut s = source();
        s.file = Some(&path);
        let keywords = read_keywords(&s).unwrap();
        assert_eq!(keywords, vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn test_csv_column_by_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "id,animal\n1,cat\n2,dog\n").unwrap();

        let mut s = source();
        s.file = Some(&path);
        s.column_name = Some("animal");
        let keywords = read_keywords(&s).unwrap();
        assert_eq!(keywords, vec!["cat", "dog"]);
    }

    #[test]
    fn test_tsv_column_by_index_without_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.tsv");
        std::fs::write(&path, "1\tcat\n2\tdog\n").unwrap();

        let mut s = source();
        s.file = Some(&path);
        s.column_index = Some(2);
        s.exclude_header = true;
        let keywords = read_keywords(&s).unwrap();
        assert_eq!(keywords, vec!["cat", "dog"]);
    }

    #[test]
    fn test_table_without_column_selection_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let mut s = source();
        s.file = Some(&path);
        assert!(read_keywords(&s).is_err());
    }

    #[test]
    fn test_spreadsheet_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.xlsx");
        std::fs::write(&path, b"fake").unwrap();

        let mut s = source();
        s.file = Some(&path);
        assert!(read_keywords(&s).is_err());
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.txt");

        let mut s = source();
        s.file = Some(&path);
        assert!(read_keywords(&s).is_err());
    }

    #[test]
    fn test_forced_type_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.csv");
        std::fs::write(&path, "cat\ndog\n").unwrap();

        let mut s = source();
        s.file = Some(&path);
        s.input_type = Some(InputType::Txt);
        let keywords = read_keywords(&s).unwrap();
        assert_eq!(keywords, vec!["cat", "dog"]);
    }
}
