use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{FailurePolicy, LoaderConfig};
use crate::downloader::DuplicatePolicy;
use crate::resolver::OriginPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "page-loader",
    about = "Downloads a web page together with its same-origin assets",
    version,
    long_about = "Downloads a single page and the images, stylesheets, scripts and linked pages it references on the same host. The page is rewritten so those references point at the local copies."
)]
pub struct LoaderCommand {
    /// The URL of the page to download
    #[arg(required = true)]
    pub url: String,

    /// Output directory (must already exist)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Maximum concurrent asset downloads
    #[arg(short = 'c', long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_concurrent: u64,

    /// Timeout for each HTTP request in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// User agent string to use for requests
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Give up on the whole page after this many seconds
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Fail the whole load if any asset fails
    #[arg(long)]
    pub strict: bool,

    /// Fetch every reference separately, even when several point at the same URL
    #[arg(long)]
    pub per_occurrence: bool,

    /// Treat a different scheme or port on the same host as a foreign origin
    #[arg(long)]
    pub compare_scheme_and_port: bool,

    /// Print a JSON summary instead of the page path
    #[arg(long)]
    pub json: bool,

    /// Log every step to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl LoaderCommand {
    pub fn to_config(&self) -> LoaderConfig {
        let failures = if self.strict {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Report
        };
        let duplicates = if self.per_occurrence {
            DuplicatePolicy::PerOccurrence
        } else {
            DuplicatePolicy::FetchOnce
        };

        let config = LoaderConfig::new(&self.output);
        let config = match &self.user_agent {
            Some(user_agent) => config.with_user_agent(user_agent.as_str()),
            None => config,
        };

        config
            .with_max_concurrent(self.max_concurrent as usize)
            .with_request_timeout(Some(Duration::from_secs(self.timeout)))
            .with_deadline(self.deadline.map(Duration::from_secs))
            .with_failures(failures)
            .with_duplicates(duplicates)
            .with_origin(OriginPolicy {
                compare_scheme_and_port: self.compare_scheme_and_port,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_args() {
        let args = LoaderCommand::try_parse_from(&[
            "page-loader",
            "https://example.com",
        ]).unwrap();

        assert_eq!(args.url, "https://example.com");
        assert_eq!(args.output, PathBuf::from("."));
        assert_eq!(args.max_concurrent, 10);
        assert_eq!(args.timeout, 30);
        assert_eq!(args.deadline, None);
        assert!(!args.strict);
        assert!(!args.json);
    }

    #[test]
    fn test_parse_all_args() {
        let args = LoaderCommand::try_parse_from(&[
            "page-loader",
            "https://example.com/courses",
            "-o", "/tmp/out",
            "-c", "4",
            "--timeout", "5",
            "--deadline", "60",
            "--user-agent", "Mozilla/5.0 (compatible; Archiver/2.1)",
            "--strict",
            "--per-occurrence",
            "--compare-scheme-and-port",
            "--json",
            "-v",
        ]).unwrap();

        let config = args.to_config();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.deadline, Some(Duration::from_secs(60)));
        assert_eq!(config.failures, FailurePolicy::FailFast);
        assert_eq!(config.duplicates, DuplicatePolicy::PerOccurrence);
        assert!(config.origin.compare_scheme_and_port);
        assert_eq!(config.user_agent, "Mozilla/5.0 (compatible; Archiver/2.1)");
        assert!(args.json);
        assert!(args.verbose);
    }

    #[test]
    fn test_default_config_mapping() {
        let args = LoaderCommand::try_parse_from(&["page-loader", "https://example.com"]).unwrap();
        let config = args.to_config();

        assert_eq!(config.failures, FailurePolicy::Report);
        assert_eq!(config.duplicates, DuplicatePolicy::FetchOnce);
        assert!(!config.origin.compare_scheme_and_port);
        assert_eq!(config.user_agent, LoaderConfig::default().user_agent);
    }

    #[test]
    fn test_parse_missing_url() {
        let result = LoaderCommand::try_parse_from(&[
            "page-loader",
            "-o", "./output"
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_concurrent() {
        let result = LoaderCommand::try_parse_from(&[
            "page-loader",
            "https://example.com",
            "-c", "0"
        ]);
        assert!(result.is_err());
    }
}
