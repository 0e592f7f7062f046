use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::DuplicatePolicy;
use crate::resolver::OriginPolicy;

pub const DEFAULT_MAX_CONCURRENT: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a failed asset does to the page load as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the page path together with a report of which assets failed.
    #[default]
    Report,
    /// Wait for every asset, then fail the load with the first failure in asset order.
    FailFast,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub output_dir: PathBuf,
    pub max_concurrent: usize,
    pub origin: OriginPolicy,
    pub duplicates: DuplicatePolicy,
    pub failures: FailurePolicy,
    pub request_timeout: Option<Duration>,
    pub deadline: Option<Duration>,
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            origin: OriginPolicy::default(),
            duplicates: DuplicatePolicy::default(),
            failures: FailurePolicy::default(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            deadline: None,
            user_agent: concat!("page-loader/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Zero is treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_origin(mut self, origin: OriginPolicy) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn with_failures(mut self, failures: FailurePolicy) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
