use std::fs::{self, File};
use std::io::{self as stdio, BufReader, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use struct_forge::Geometry;
use struct_forge::batch::ElementPolicy;
use struct_forge::io::{self, read_xyz};
use struct_forge::ops::{EnumerationConfig, FilterSet, ResolveMode, ResolverConfig};

pub mod inspect;
pub mod label;

/// Filter presets exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterPreset {
    /// Minimum bond length, bond-type length, and valence.
    #[value(name = "basic")]
    Basic,
    /// The basic filters plus bond angle and coplanarity.
    #[value(name = "all")]
    All,
}

impl FilterPreset {
    pub fn filters(self) -> FilterSet {
        match self {
            FilterPreset::Basic => FilterSet::basic(),
            FilterPreset::All => FilterSet::all(),
        }
    }
}

/// Inference options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Filter preset applied during enumeration.
    #[arg(long, value_enum, default_value_t = FilterPreset::All)]
    pub filters: FilterPreset,
    /// Keep hydrogens instead of inferring heavy-atom skeletons.
    #[arg(long)]
    pub keep_hydrogens: bool,
    /// Trust coordinate signs instead of enumerating mirror images.
    #[arg(long)]
    pub no_sign_ambiguity: bool,
    /// Net molecular charge targeted by the bond-order resolver.
    #[arg(long, value_name = "INT", default_value_t = 0, allow_hyphen_values = true)]
    pub charge: i32,
    /// Report electron imbalance as radicals instead of formal charges.
    #[arg(long)]
    pub radicals: bool,
}

impl EngineArgs {
    pub fn enumeration(&self) -> EnumerationConfig {
        EnumerationConfig::default()
            .filters(self.filters.filters())
            .sign_ambiguity(!self.no_sign_ambiguity)
    }

    pub fn resolver(&self) -> ResolverConfig {
        let mode = if self.radicals {
            ResolveMode::Radical
        } else {
            ResolveMode::Charged
        };
        ResolverConfig::default()
            .mode(mode)
            .molecular_charge(self.charge)
    }

    pub fn element_policy(&self) -> ElementPolicy {
        ElementPolicy {
            strip_hydrogens: !self.keep_hydrogens,
        }
    }
}

/// Expands directories into the `.xyz` files they contain and returns a sorted, deduplicated
/// list of geometry paths.
pub fn collect_xyz_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input)
                .with_context(|| format!("Failed to list directory {}", input.display()))?;
            for entry in entries {
                let path = entry
                    .with_context(|| format!("Failed to list directory {}", input.display()))?
                    .path();
                if is_xyz(&path) {
                    files.push(path);
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_xyz(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xyz"))
}

/// Parses a one-based inclusive index range such as `1-100` or `42` and converts it into
/// zero-based indices over `count` items.
pub fn parse_range(text: &str, count: usize) -> Result<RangeInclusive<usize>> {
    let text = text.trim();
    let (start, end) = match text.split_once('-') {
        Some((a, b)) => (a.trim(), b.trim()),
        None => (text, text),
    };
    let start: usize = start
        .parse()
        .map_err(|_| anyhow!("Invalid range start '{}' in '{}'", start, text))?;
    let end: usize = end
        .parse()
        .map_err(|_| anyhow!("Invalid range end '{}' in '{}'", end, text))?;

    if start == 0 || start > end {
        bail!("Range '{}' must satisfy 1 <= start <= end", text);
    }
    if end > count {
        bail!("Range '{}' exceeds the {} available input files", text, count);
    }
    Ok(start - 1..=end - 1)
}

/// Reads one geometry, attaching the path to any failure.
pub fn read_geometry(path: &Path) -> Result<Geometry, io::Error> {
    let file = File::open(path).map_err(|e| io::Error::from_io(e, Some(path.to_path_buf())))?;
    read_xyz(BufReader::new(file), Some(path))
}

/// Wraps long-running operations with a spinner rendered to stderr.
pub fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_with_message(format!("{} ✓", message)),
        Err(_) => spinner.abandon_with_message(format!("{} ✗", message)),
    }

    result
}

/// Creates a determinate progress bar rendered to stderr.
pub fn progress_bar(len: usize, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar.set_message(message.to_string());
    bar
}

pub fn print_boxed_label<W: Write>(writer: &mut W, title: &str) -> stdio::Result<()> {
    let inner = format!(" {title} ");
    let width = inner.chars().count();
    writeln!(writer, "╭{}╮", "─".repeat(width))?;
    writeln!(writer, "│{}│", inner)?;
    writeln!(writer, "╰{}╯", "─".repeat(width))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_converts_to_zero_based() {
        assert_eq!(parse_range("1-10", 20).unwrap(), 0..=9);
        assert_eq!(parse_range(" 5 ", 5).unwrap(), 4..=4);
    }

    #[test]
    fn parse_range_rejects_invalid_bounds() {
        assert!(parse_range("0-3", 5).is_err());
        assert!(parse_range("4-2", 5).is_err());
        assert!(parse_range("1-6", 5).is_err());
        assert!(parse_range("a-b", 5).is_err());
    }

    #[test]
    fn filter_presets_map_to_sets() {
        assert_eq!(FilterPreset::Basic.filters(), FilterSet::basic());
        assert_eq!(FilterPreset::All.filters(), FilterSet::all());
    }
}
