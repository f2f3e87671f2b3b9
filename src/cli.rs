use crate::publish::SheetsConfig;
use crate::scrapers::types::{ScrapeConfig, DEFAULT_SEARCH_URL, DEFAULT_SITE_URL, DEFAULT_USER_AGENT};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track new, removed and repriced housing listings", long_about = None)]
pub struct Args {
    /// Directory holding the snapshot and change files
    #[arg(long, env = "LISTING_WATCH_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape listings, diff against the last run and rotate snapshots
    Run(RunArgs),
    /// Show whether a snapshot exists and when it was taken
    Check,
    /// Append the current snapshot to a Google spreadsheet
    Publish(PublishArgs),
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// Search URL; the page number is appended
    #[arg(long, env = "LISTING_WATCH_BASE_URL", default_value = DEFAULT_SEARCH_URL)]
    pub base_url: String,

    /// Origin for resolving relative listing links
    #[arg(long, default_value = DEFAULT_SITE_URL)]
    pub site_url: String,

    /// Maximum number of result pages to fetch
    #[arg(long, default_value_t = 13)]
    pub max_pages: u32,

    /// Delay between page requests, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub page_delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Number of new listings to print in the summary
    #[arg(long, default_value_t = 5)]
    pub preview: usize,
}

impl RunArgs {
    pub fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            search_url: self.base_url.clone(),
            site_url: self.site_url.clone(),
            max_pages: self.max_pages,
            page_delay: Duration::from_millis(self.page_delay_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct PublishArgs {
    #[arg(long, env = "GOOGLE_SPREADSHEET_ID")]
    pub spreadsheet_id: String,

    /// OAuth access token with the spreadsheets scope
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    #[arg(long, default_value = "Sheet1!A2")]
    pub range: String,
}

impl PublishArgs {
    pub fn sheets_config(&self) -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: self.spreadsheet_id.clone(),
            access_token: self.access_token.clone(),
            range: self.range.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let args = Args::try_parse_from(["listing-watch", "run"]).unwrap();
        let Command::Run(run) = args.command else {
            panic!("expected run command");
        };

        let config = run.scrape_config();
        assert_eq!(config.max_pages, 13);
        assert_eq!(config.page_delay, Duration::from_secs(1));
        assert_eq!(config.search_url, DEFAULT_SEARCH_URL);
    }

    #[test]
    fn test_publish_flags() {
        let args = Args::try_parse_from([
            "listing-watch",
            "--data-dir",
            "/tmp/watch",
            "publish",
            "--spreadsheet-id",
            "abc",
            "--access-token",
            "secret",
        ])
        .unwrap();

        assert_eq!(args.data_dir, PathBuf::from("/tmp/watch"));
        let Command::Publish(publish) = args.command else {
            panic!("expected publish command");
        };
        assert_eq!(publish.sheets_config().range, "Sheet1!A2");
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
