use crate::types::VariantSelection;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "daily-allocation")]
#[command(about = "Mail the daily per-project task allocation from the team spreadsheet")]
#[command(version)]
pub struct CliArgs {
    /// TOML configuration file
    /// Default: ~/.config/daily-allocation/config.toml (Linux), if present
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Process this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Which emails to produce: the reply for today, the new thread for the
    /// next working day, or both (the scheduled daily run)
    #[arg(long, value_enum, default_value = "both")]
    pub variant: VariantSelection,

    /// Thread the reply under this Message-ID instead of today's derived one
    #[arg(long, value_name = "MESSAGE-ID")]
    pub in_reply_to: Option<String>,

    /// Read grids from <DIR>/<YYYY-MM-DD>.json instead of the spreadsheet
    #[arg(long, value_name = "DIR")]
    pub grid_dir: Option<PathBuf>,

    /// Print the composed emails instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Format a single grid file and print both renderings (no configuration needed)
    #[arg(long, value_name = "GRID.json")]
    pub preview: Option<PathBuf>,

    /// With --preview, print the grouped report and renderings as JSON
    #[arg(long)]
    pub json: bool,

    /// Stay running and send every day at SCHEDULE_TIME
    #[arg(long)]
    pub daemon: bool,

    /// With --daemon, also run once immediately at startup
    #[arg(long)]
    pub run_now: bool,
}

impl CliArgs {
    pub fn parse_args() -> Self {
        let mut args = Self::parse();

        // Message-IDs are compared verbatim; wrap a bare id in angle brackets
        if let Some(ref id) = args.in_reply_to {
            let id = id.trim();
            if !id.is_empty() && !id.starts_with('<') {
                args.in_reply_to = Some(format!("<{}>", id));
            }
        }

        args
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.daemon && self.date.is_some() {
            return Err("Cannot specify --date with --daemon".to_string());
        }

        if self.daemon && self.preview.is_some() {
            return Err("Cannot specify --preview with --daemon".to_string());
        }

        if self.run_now && !self.daemon {
            return Err("--run-now requires --daemon".to_string());
        }

        if self.json && self.preview.is_none() {
            return Err("--json requires --preview <GRID.json>".to_string());
        }

        if let Some(ref id) = self.in_reply_to {
            if self.variant != VariantSelection::Reply {
                return Err("--in-reply-to requires --variant reply".to_string());
            }
            if id.trim().is_empty() {
                return Err("--in-reply-to cannot be empty".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("daily-allocation").chain(argv.iter().copied()))
            .expect("Should parse")
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.variant, VariantSelection::Both);
        assert!(args.date.is_none());
        assert!(!args.dry_run);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_date_and_variant_parse() {
        let args = parse(&["--date", "2024-03-15", "--variant", "reply", "--dry-run"]);
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(args.variant, VariantSelection::Reply);
        assert!(args.dry_run);
    }

    #[test]
    fn test_bad_date_rejected_by_parser() {
        let result = CliArgs::try_parse_from(["daily-allocation", "--date", "15/03/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_daemon_conflicts() {
        assert!(parse(&["--daemon", "--date", "2024-03-15"]).validate().is_err());
        assert!(parse(&["--daemon", "--preview", "grid.json"]).validate().is_err());
        assert!(parse(&["--daemon", "--run-now"]).validate().is_ok());
        assert!(parse(&["--run-now"]).validate().is_err());
    }

    #[test]
    fn test_validate_json_requires_preview() {
        assert!(parse(&["--json"]).validate().is_err());
        assert!(parse(&["--preview", "grid.json", "--json"]).validate().is_ok());
    }

    #[test]
    fn test_validate_in_reply_to_requires_reply_variant() {
        assert!(parse(&["--in-reply-to", "<x@example.com>"]).validate().is_err());
        assert!(parse(&["--variant", "reply", "--in-reply-to", "<x@example.com>"]).validate().is_ok());
    }
}
