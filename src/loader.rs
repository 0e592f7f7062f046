use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::config::{FailurePolicy, LoaderConfig};
use crate::downloader::{DownloadReport, Downloader};
use crate::error::LoadError;
use crate::extractor::{extract, Asset};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::file_manager::{create_directory, write_file};
use crate::observer::{LoadObserver, NoopObserver};
use crate::slug::{slugify_dir_name, slugify_file_name};

/// Stages of a page load, in order. Failure can end the load at any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingPage,
    ExtractingAssets,
    WritingPageAndDir,
    DownloadingAssets,
    Done,
}

#[derive(Debug, Serialize)]
pub struct LoadOutcome {
    pub page_path: PathBuf,
    pub assets_dir: PathBuf,
    pub report: DownloadReport,
}

enum LoadState {
    FetchingPage,
    ExtractingAssets {
        markup: String,
    },
    WritingPageAndDir {
        markup: String,
        assets: Vec<Asset>,
    },
    DownloadingAssets {
        page_path: PathBuf,
        assets: Vec<Asset>,
    },
    Done(LoadOutcome),
}

impl LoadState {
    fn stage(&self) -> Stage {
        match self {
            LoadState::FetchingPage => Stage::FetchingPage,
            LoadState::ExtractingAssets { .. } => Stage::ExtractingAssets,
            LoadState::WritingPageAndDir { .. } => Stage::WritingPageAndDir,
            LoadState::DownloadingAssets { .. } => Stage::DownloadingAssets,
            LoadState::Done(_) => Stage::Done,
        }
    }
}

/// Paths a load writes to, fixed before any I/O happens.
struct PageLayout {
    page_path: PathBuf,
    assets_dir_name: String,
    assets_dir: PathBuf,
    output_dir: PathBuf,
}

impl PageLayout {
    fn new(page_url: &Url, output_dir: &Path) -> Result<Self, LoadError> {
        let output_dir =
            std::path::absolute(output_dir).map_err(|e| LoadError::filesystem(output_dir, e))?;
        let assets_dir_name = slugify_dir_name(page_url);

        Ok(Self {
            page_path: output_dir.join(slugify_file_name(page_url)),
            assets_dir: output_dir.join(&assets_dir_name),
            assets_dir_name,
            output_dir,
        })
    }
}

/// Downloads one page and its same-origin assets into `output_dir`.
pub struct PageLoader {
    fetcher: Arc<dyn Fetcher>,
    config: LoaderConfig,
    observer: Arc<dyn LoadObserver>,
}

impl PageLoader {
    pub fn new(config: LoaderConfig) -> Result<Self, LoadError> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: LoaderConfig) -> Self {
        Self {
            fetcher,
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub async fn load(&self, page_url: &str) -> Result<LoadOutcome, LoadError> {
        let page_url = Url::parse(page_url).map_err(|e| LoadError::invalid_url(page_url, e))?;
        let layout = PageLayout::new(&page_url, &self.config.output_dir)?;

        match self.config.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(&page_url, &layout))
                .await
                .map_err(|_| LoadError::Timeout(deadline))?,
            None => self.run(&page_url, &layout).await,
        }
    }

    async fn run(&self, page_url: &Url, layout: &PageLayout) -> Result<LoadOutcome, LoadError> {
        let mut state = LoadState::FetchingPage;
        loop {
            self.observer.stage(state.stage(), page_url);
            state = match state {
                LoadState::Done(outcome) => return Ok(outcome),
                state => self.step(state, page_url, layout).await?,
            };
        }
    }

    async fn step(
        &self,
        state: LoadState,
        page_url: &Url,
        layout: &PageLayout,
    ) -> Result<LoadState, LoadError> {
        let next = match state {
            LoadState::FetchingPage => LoadState::ExtractingAssets {
                markup: self.fetcher.fetch_text(page_url).await?,
            },

            LoadState::ExtractingAssets { markup } => {
                let extraction = extract(
                    &markup,
                    page_url,
                    &layout.assets_dir_name,
                    &layout.output_dir,
                    self.config.origin,
                    self.observer.as_ref(),
                );
                LoadState::WritingPageAndDir {
                    markup: extraction.markup,
                    assets: extraction.assets,
                }
            }

            LoadState::WritingPageAndDir { markup, assets } => {
                tokio::try_join!(
                    create_directory(&layout.assets_dir),
                    write_file(&layout.page_path, markup.as_bytes()),
                )?;
                LoadState::DownloadingAssets {
                    page_path: layout.page_path.clone(),
                    assets,
                }
            }

            LoadState::DownloadingAssets { page_path, assets } => {
                let downloader = Downloader::new(
                    self.fetcher.clone(),
                    self.config.max_concurrent,
                    self.config.duplicates,
                );
                let report = downloader
                    .download_all(&assets, self.observer.as_ref())
                    .await;
                let report = match self.config.failures {
                    FailurePolicy::Report => report,
                    FailurePolicy::FailFast => report.into_result()?,
                };
                LoadState::Done(LoadOutcome {
                    page_path,
                    assets_dir: layout.assets_dir.clone(),
                    report,
                })
            }

            LoadState::Done(outcome) => LoadState::Done(outcome),
        };
        Ok(next)
    }
}
