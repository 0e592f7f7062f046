use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use serde::{Serialize, Serializer};
use tokio::sync::Semaphore;
use url::Url;

use crate::error::LoadError;
use crate::extractor::Asset;
use crate::fetcher::Fetcher;
use crate::file_manager::write_file;
use crate::observer::LoadObserver;

/// How assets that share a local file are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// One fetch per distinct local path, from the first URL that maps to it. URLs that
    /// differ only in their query string share a slug, so they share the fetch too.
    #[default]
    FetchOnce,
    /// One fetch and one write per markup occurrence. Writes to a shared path race and
    /// the last one to finish wins.
    PerOccurrence,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadedAsset {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub occurrences: usize,
}

fn serialize_error<S: Serializer>(err: &LoadError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

#[derive(Debug, Serialize)]
pub struct FailedAsset {
    pub url: String,
    pub path: PathBuf,
    pub occurrences: usize,
    pub code: Option<String>,
    #[serde(serialize_with = "serialize_error")]
    pub error: LoadError,
}

/// Outcome of every download job, each list in asset order.
#[derive(Debug, Default, Serialize)]
pub struct DownloadReport {
    pub downloaded: Vec<DownloadedAsset>,
    pub failed: Vec<FailedAsset>,
}

impl DownloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.downloaded.len() + self.failed.len()
    }

    /// Turn any failure into an error carrying the first failed job.
    pub fn into_result(mut self) -> Result<Self, LoadError> {
        if self.failed.is_empty() {
            return Ok(self);
        }
        let total = self.total();
        let failed = self.failed.len();
        let first = self.failed.remove(0).error;
        Err(LoadError::AssetFailures {
            failed,
            total,
            first: Box::new(first),
        })
    }
}

struct DownloadJob<'a> {
    url: &'a Url,
    path: &'a Path,
    occurrences: usize,
}

fn plan(assets: &[Asset], duplicates: DuplicatePolicy) -> Vec<DownloadJob<'_>> {
    let mut jobs: Vec<DownloadJob<'_>> = Vec::with_capacity(assets.len());
    match duplicates {
        DuplicatePolicy::PerOccurrence => {
            for asset in assets {
                jobs.push(DownloadJob {
                    url: &asset.absolute_url,
                    path: &asset.local_file_path,
                    occurrences: 1,
                });
            }
        }
        DuplicatePolicy::FetchOnce => {
            let mut seen: HashMap<&Path, usize> = HashMap::new();
            for asset in assets {
                match seen.get(asset.local_file_path.as_path()) {
                    Some(&index) => jobs[index].occurrences += 1,
                    None => {
                        seen.insert(&asset.local_file_path, jobs.len());
                        jobs.push(DownloadJob {
                            url: &asset.absolute_url,
                            path: &asset.local_file_path,
                            occurrences: 1,
                        });
                    }
                }
            }
        }
    }
    jobs
}

/// Fetches assets concurrently, at most `max_concurrent` at a time, and writes each to
/// its local path. A failing asset never cancels its siblings.
pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
    max_concurrent: usize,
    duplicates: DuplicatePolicy,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, max_concurrent: usize, duplicates: DuplicatePolicy) -> Self {
        Self {
            fetcher,
            max_concurrent: max_concurrent.max(1),
            duplicates,
        }
    }

    pub async fn download_all(&self, assets: &[Asset], observer: &dyn LoadObserver) -> DownloadReport {
        let jobs = plan(assets, self.duplicates);
        observer.batch_started(jobs.len());

        let semaphore = Semaphore::new(self.max_concurrent);
        let outcomes = join_all(jobs.iter().map(|job| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await.ok();
                observer.asset_started(job.url);
                let result = self.download_one(job).await;
                observer.asset_finished(job.url, job.path, result.as_ref().map(|bytes| *bytes));
                result
            }
        }))
        .await;

        let mut report = DownloadReport::default();
        for (job, result) in jobs.iter().zip(outcomes) {
            match result {
                Ok(bytes) => report.downloaded.push(DownloadedAsset {
                    url: job.url.to_string(),
                    path: job.path.to_path_buf(),
                    bytes,
                    occurrences: job.occurrences,
                }),
                Err(error) => report.failed.push(FailedAsset {
                    url: job.url.to_string(),
                    path: job.path.to_path_buf(),
                    occurrences: job.occurrences,
                    code: error.code(),
                    error,
                }),
            }
        }
        report
    }

    async fn download_one(&self, job: &DownloadJob<'_>) -> Result<u64, LoadError> {
        let content = self.fetcher.fetch_binary(job.url).await?;
        write_file(job.path, &content).await?;
        Ok(content.len() as u64)
    }
}
