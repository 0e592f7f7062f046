pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod file_manager;
pub mod html_parser;
pub mod loader;
pub mod observer;
pub mod resolver;
pub mod slug;

// Re-export main types for convenience
pub use cli::LoaderCommand;
pub use config::{FailurePolicy, LoaderConfig};
pub use downloader::{DownloadReport, Downloader, DuplicatePolicy};
pub use error::{ErrorKind, FsCode, LoadError, NetworkCode};
pub use extractor::{extract, Asset, AssetTag, Extraction};
pub use fetcher::{Fetcher, HttpFetcher};
pub use html_parser::{Element, HtmlDocument};
pub use loader::{LoadOutcome, PageLoader, Stage};
pub use observer::{ConsoleObserver, LoadObserver, NoopObserver, SkipReason, TracingObserver};
pub use resolver::{is_same_origin, resolve_reference, OriginPolicy};
pub use slug::{slugify_dir_name, slugify_file_name, slugify_url};
