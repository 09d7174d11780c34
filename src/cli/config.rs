//! Conversion from CLI arguments to library configuration

use super::main::Cli;
use crate::config::{HarvestConfig, OutputFormat, SortCriterion};
use crate::discovery::{DiscoveryOptions, Engine, ProxyKind, ProxySettings};
use crate::downloader::DownloadOptions;
use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Builds library configuration from validated CLI arguments
pub struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Validate CLI argument combinations before building
    ///
    /// # Errors
    /// - Inconsistent or out-of-range argument combinations
    pub fn validate_cli(cli: &Cli) -> Result<()> {
        if cli.max_attempts == 0 {
            bail!("--max-attempts must be at least 1");
        }
        if cli.images_quality > 100 {
            bail!("--images-quality must be between 0 and 100");
        }
        if cli.remove_extra && cli.required_number.is_none() {
            bail!("--remove-extra requires --required-number");
        }
        if cli.num_threads == 0 {
            bail!("--num-threads must be at least 1");
        }
        // Parse-only validations; the values are converted again in from_cli
        Self::parse_min_dim(&cli.min_dim)?;
        cli.sort
            .parse::<SortCriterion>()
            .context("invalid --sort")?;
        if let Some(format) = &cli.images_format {
            format
                .parse::<OutputFormat>()
                .context("invalid --images-format")?;
        }
        Ok(())
    }

    /// Convert CLI arguments to the library configuration
    ///
    /// # Errors
    /// - Any validation failure, see [`validate_cli`](Self::validate_cli)
    pub fn from_cli(cli: &Cli) -> Result<HarvestConfig> {
        let sort: SortCriterion = cli.sort.parse().context("invalid --sort")?;
        let output_format = cli
            .images_format
            .as_deref()
            .map(str::parse::<OutputFormat>)
            .transpose()
            .context("invalid --images-format")?;
        let min_dim = Self::parse_min_dim(&cli.min_dim)?;
        let proxy = Self::parse_proxy(cli)?;

        let discovery = DiscoveryOptions {
            max_number: cli.max_number,
            face_only: cli.face_only,
            safe_mode: cli.safe_mode,
            proxy: proxy.clone(),
            browser: cli.driver.clone(),
            image_type: cli.image_type.clone(),
            color: cli.color.clone(),
            quiet: cli.verbose == 0,
        };

        let download = DownloadOptions {
            concurrency: cli.num_threads,
            timeout: Duration::from_secs(cli.timeout),
            proxy,
            file_prefix: None,
            format_filter: Self::parse_format_filter(&cli.format_filter),
            min_dim,
        };

        let config = HarvestConfig::builder()
            .engines(Self::resolve_engines(cli)?)
            .max_attempts(cli.max_attempts)
            .required_number(cli.required_number)
            .discovery_options(discovery)
            .download_options(download)
            .dedup(cli.remove_duplicate)
            .sort(sort)
            .trim_to_required(cli.remove_extra)
            .file_prefix(cli.file_prefix.clone())
            .output_format(output_format)
            .quality(cli.images_quality)
            .fail_fast(cli.debug_mode)
            .build()?;

        Ok(config)
    }

    /// Ordered engine list: `--engines` overrides `--engine`
    fn resolve_engines(cli: &Cli) -> Result<Vec<Engine>> {
        match &cli.engines {
            Some(list) => list
                .split(',')
                .map(|name| name.parse::<Engine>().map_err(Into::into))
                .collect(),
            None => Ok(vec![Engine::new(&cli.engine)]),
        }
    }

    /// Allowed extensions, lowercase, with the jpg/jpeg alias made explicit
    fn parse_format_filter(filter: &str) -> Vec<String> {
        let mut formats: Vec<String> = filter
            .split(',')
            .map(|ext| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        // jpg is an alias for jpeg
        if formats.iter().any(|f| f == "jpg") && !formats.iter().any(|f| f == "jpeg") {
            formats.push("jpeg".to_string());
        }
        formats
    }

    /// Parse `height,width` minimum dimensions
    fn parse_min_dim(min_dim: &str) -> Result<(u32, u32)> {
        let parts: Vec<&str> = min_dim.split(',').map(str::trim).collect();
        let [height, width] = parts.as_slice() else {
            bail!("incorrect input for dimension: '{min_dim}'");
        };
        let height: u32 = height
            .parse()
            .with_context(|| format!("incorrect input for dimension: '{min_dim}'"))?;
        let width: u32 = width
            .parse()
            .with_context(|| format!("incorrect input for dimension: '{min_dim}'"))?;
        Ok((height, width))
    }

    /// Opaque proxy passthrough; no processing beyond kind selection
    fn parse_proxy(cli: &Cli) -> Result<Option<ProxySettings>> {
        let Some(address) = &cli.proxy else {
            return Ok(None);
        };
        let kind = match cli.proxy_type.as_str() {
            "http" => ProxyKind::Http,
            "socks5" => ProxyKind::Socks5,
            other => bail!("unsupported proxy type '{other}' (expected http or socks5)"),
        };
        Ok(Some(ProxySettings {
            kind,
            address: address.clone(),
        }))
    }
}
