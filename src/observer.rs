//! Progress and diagnostics are reported through an injected [`LoadObserver`] instead of
//! process-wide logging, so every component can run silently under test.

use std::path::Path;
use std::sync::Mutex;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::error::LoadError;
use crate::loader::Stage;

/// Why a reference found in the markup was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    InvalidUrl,
    ForeignOrigin,
}

pub trait LoadObserver: Send + Sync {
    fn stage(&self, _stage: Stage, _page_url: &Url) {}

    fn reference_skipped(&self, _tag: &str, _reference: &str, _reason: SkipReason) {}

    fn batch_started(&self, _jobs: usize) {}

    fn asset_started(&self, _url: &Url) {}

    fn asset_finished(&self, _url: &Url, _path: &Path, _result: Result<u64, &LoadError>) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn stage(&self, stage: Stage, page_url: &Url) {
        tracing::debug!(?stage, page = %page_url, "stage");
    }

    fn reference_skipped(&self, tag: &str, reference: &str, reason: SkipReason) {
        tracing::debug!(tag, reference, ?reason, "reference skipped");
    }

    fn batch_started(&self, jobs: usize) {
        tracing::debug!(jobs, "downloading assets");
    }

    fn asset_started(&self, url: &Url) {
        tracing::trace!(%url, "asset fetch started");
    }

    fn asset_finished(&self, url: &Url, path: &Path, result: Result<u64, &LoadError>) {
        match result {
            Ok(bytes) => tracing::info!(%url, path = %path.display(), bytes, "asset saved"),
            Err(err) => tracing::warn!(%url, path = %path.display(), error = %err, "asset failed"),
        }
    }
}

/// Human-facing progress: a bar over the download batch plus colored status lines.
/// Also forwards to `tracing` so `--verbose` keeps working alongside the bar.
pub struct ConsoleObserver {
    bar: Mutex<Option<ProgressBar>>,
    tracing: TracingObserver,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            tracing: TracingObserver,
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadObserver for ConsoleObserver {
    fn stage(&self, stage: Stage, page_url: &Url) {
        self.tracing.stage(stage, page_url);
        match stage {
            Stage::FetchingPage => eprintln!("🚀 Loading {}", page_url.as_str().blue()),
            Stage::Done => {
                if let Ok(mut guard) = self.bar.lock() {
                    if let Some(bar) = guard.take() {
                        bar.finish_with_message("done");
                    }
                }
            }
            _ => {}
        }
    }

    fn reference_skipped(&self, tag: &str, reference: &str, reason: SkipReason) {
        self.tracing.reference_skipped(tag, reference, reason);
        if reason == SkipReason::InvalidUrl {
            eprintln!("⚠️  Skipping invalid <{}> reference: {}", tag, reference.yellow());
        }
    }

    fn batch_started(&self, jobs: usize) {
        self.tracing.batch_started(jobs);
        let bar = ProgressBar::new(jobs as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
            bar.set_style(style.progress_chars("=> "));
        }
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn asset_started(&self, url: &Url) {
        self.tracing.asset_started(url);
        self.with_bar(|bar| bar.set_message(url.path().to_string()));
    }

    fn asset_finished(&self, url: &Url, path: &Path, result: Result<u64, &LoadError>) {
        self.tracing.asset_finished(url, path, result);
        self.with_bar(|bar| {
            if result.is_err() {
                bar.set_message(format!("{} {}", "failed".red(), url.path()));
            }
            bar.inc(1);
        });
    }
}
