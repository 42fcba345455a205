//! Validate command handler.

use crate::catalog::ReqwestTransport;
use crate::config::AppConfig;
use crate::model::{Locale, ValidationResult};
use crate::pipeline::{exit_codes, write_output, OutputTarget, Services};
use crate::reports::{create_reporter, ReportFormat};
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, IsTerminal as _, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// Options for the `validate` command.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// MPNs given on the command line
    pub mpns: Vec<String>,
    /// File with one MPN per line
    pub file: Option<PathBuf>,
    /// `MPN=MANUFACTURER` hints
    pub hints: Vec<String>,
    pub manufacturer_id: Option<String>,
    pub site: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    /// Include batch statistics in the report
    pub stats: bool,
    /// Skip cache reads
    pub refresh: bool,
}

/// Run the validate command, returning the desired exit code.
pub fn run_validate(mut config: AppConfig, opts: ValidateOptions) -> Result<i32> {
    config.locale = Locale::new(
        opts.site.as_deref().unwrap_or(&config.locale.site),
        opts.language.as_deref().unwrap_or(&config.locale.language),
        opts.currency.as_deref().unwrap_or(&config.locale.currency),
    );
    config.cache.bypass_cache |= opts.refresh;
    super::ensure_valid(&config)?;

    let hints = opts
        .hints
        .iter()
        .map(|h| parse_hint(h))
        .collect::<Result<HashMap<_, _>>>()?;

    let mpns = collect_inputs(&opts)?;
    if mpns.is_empty() {
        bail!("no MPNs given (pass them as arguments, with --file, or on stdin)");
    }
    tracing::info!("Validating {} MPNs for locale {}", mpns.len(), config.locale);

    let transport = Arc::new(ReqwestTransport::new()?);
    let services = Services::from_config(&config, transport)?;
    let (results, stats) = services.validator.validate_batch_with_stats(
        &mpns,
        (!hints.is_empty()).then_some(&hints),
        opts.manufacturer_id.as_deref(),
    )?;
    stats.log_summary();

    let reporter = create_reporter(opts.format);
    let report = reporter.generate(&results, opts.stats.then_some(&stats))?;
    write_output(&report, &OutputTarget::from_option(opts.output))?;

    Ok(exit_code_for(&results))
}

fn exit_code_for(results: &IndexMap<String, ValidationResult>) -> i32 {
    if results.values().all(|r| r.valid) {
        exit_codes::SUCCESS
    } else {
        exit_codes::INVALID_FOUND
    }
}

/// Parse a `MPN=MANUFACTURER` hint.
pub fn parse_hint(raw: &str) -> Result<(String, String)> {
    let Some((mpn, manufacturer)) = raw.split_once('=') else {
        bail!("invalid hint '{raw}': expected MPN=MANUFACTURER");
    };
    let (mpn, manufacturer) = (mpn.trim(), manufacturer.trim());
    if mpn.is_empty() || manufacturer.is_empty() {
        bail!("invalid hint '{raw}': MPN and manufacturer must be non-empty");
    }
    Ok((mpn.to_string(), manufacturer.to_string()))
}

/// Read one MPN per line, skipping blanks and `#` comments.
pub fn read_mpns(reader: impl Read) -> Result<Vec<String>> {
    let mut mpns = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line.context("failed to read MPN list")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        mpns.push(line.to_string());
    }
    Ok(mpns)
}

fn collect_inputs(opts: &ValidateOptions) -> Result<Vec<String>> {
    let mut mpns = opts.mpns.clone();
    if let Some(path) = &opts.file {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        mpns.extend(read_mpns(file)?);
    }
    if mpns.is_empty() && opts.file.is_none() && !std::io::stdin().is_terminal() {
        mpns.extend(read_mpns(std::io::stdin().lock())?);
    }
    Ok(mpns)
}
