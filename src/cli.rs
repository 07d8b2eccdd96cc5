//! Command-line interface definitions for the LA Times scraper.
//!
//! All arguments can be provided via command-line flags or environment
//! variables. Search parameters come from a work-item payload file, from
//! flags, or both (flags win).

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the scraper.
///
/// # Examples
///
/// ```sh
/// # Search with flags only
/// latimes_scraper --query wildfire --section California --months 2
///
/// # Search parameters from a work-item payload
/// latimes_scraper --payload work-item.json -o ./output
///
/// # Custom selectors and waits
/// latimes_scraper --payload work-item.json --config scraper.yaml --headed
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON work-item payload with `query`, `section` and `months`
    #[arg(short, long, env = "WORK_ITEM_PAYLOAD")]
    pub payload: Option<PathBuf>,

    /// Search text (overrides the payload)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Section filter label (overrides the payload)
    #[arg(short, long)]
    pub section: Option<String>,

    /// Number of months back to collect (overrides the payload; values below 1 mean 1)
    #[arg(short, long, allow_negative_numbers = true)]
    pub months: Option<i64>,

    /// Optional path to a scraper YAML config file
    #[arg(short, long, env = "SCRAPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory for the results workbook
    #[arg(short, long, env = "OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Directory for downloaded images (defaults to `<output-dir>/images`)
    #[arg(short, long, env = "IMAGES_DIR")]
    pub images_dir: Option<PathBuf>,

    /// Chromium executable to launch
    #[arg(long, env = "CHROME_BIN")]
    pub chrome_bin: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Also append logs to this file (plain text, no colours)
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Where article images are saved.
    pub fn images_dir(&self) -> PathBuf {
        self.images_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("images"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["latimes_scraper"]);
        assert_eq!(cli.payload, None);
        assert_eq!(cli.output_dir, PathBuf::from("output"));
        assert_eq!(cli.images_dir(), PathBuf::from("output/images"));
        assert!(!cli.headed);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_cli_log_file_flag() {
        let cli = Cli::parse_from(["latimes_scraper", "--log-file", "/tmp/scraper.log"]);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/scraper.log")));
    }

    #[test]
    fn test_cli_search_flags() {
        let cli = Cli::parse_from([
            "latimes_scraper",
            "--query",
            "wildfire",
            "--section",
            "California",
            "--months",
            "-2",
        ]);
        assert_eq!(cli.query.as_deref(), Some("wildfire"));
        assert_eq!(cli.section.as_deref(), Some("California"));
        assert_eq!(cli.months, Some(-2));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "latimes_scraper",
            "-p",
            "/tmp/payload.json",
            "-o",
            "/tmp/out",
            "-i",
            "/tmp/imgs",
        ]);
        assert_eq!(cli.payload, Some(PathBuf::from("/tmp/payload.json")));
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cli.images_dir(), PathBuf::from("/tmp/imgs"));
    }
}
