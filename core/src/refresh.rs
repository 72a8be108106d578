//! Periodic policy refresh.
//!
//! # Responsibilities
//! - Fetch policy records from a [`PolicySource`] on a fixed interval
//! - Feed them to [`PolicyBinder::on_refresh`], in init mode until the first
//!   reload applies and in update mode afterwards
//!
//! Fetch failures are logged and the current table stays in place; the next
//! tick simply tries again.

use crate::{ConfigError, PolicyBinder, PolicyRecord, Reload};
use std::future::Future;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Shortest accepted refresh interval; shorter ones are raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Errors from fetching policy records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source could not be read.
    #[error("policy source unreadable: {0}")]
    Io(#[from] std::io::Error),
    /// The source content did not parse.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Where policy records come from.
///
/// `Ok(None)` means "nothing configured", which leaves the table untouched.
pub trait PolicySource: Send + Sync {
    /// The record type this source yields.
    type Record: PolicyRecord;

    /// Fetch the current records.
    fn fetch(&self) -> impl Future<Output = Result<Option<Vec<Self::Record>>, SourceError>> + Send;
}

/// Parses the text of a policy file into records.
pub type Parser<R> = fn(&str) -> Result<Vec<R>, ConfigError>;

/// Records read from a file on every fetch.
///
/// A missing or blank file yields `Ok(None)`.
#[derive(Debug, Clone)]
pub struct FileSource<R> {
    path: PathBuf,
    parse: Parser<R>,
    _record: PhantomData<fn() -> R>,
}

impl<R> FileSource<R>
where
    R: PolicyRecord + serde::de::DeserializeOwned,
{
    /// A file holding a JSON array of records.
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self::with_parser(path, |text| Ok(serde_json::from_str(text)?))
    }
}

impl<R: PolicyRecord> FileSource<R> {
    /// A file in any format, decoded by `parse`.
    pub fn with_parser(path: impl Into<PathBuf>, parse: Parser<R>) -> Self {
        Self {
            path: path.into(),
            parse,
            _record: PhantomData,
        }
    }

    /// The file read on every fetch.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: PolicyRecord> PolicySource for FileSource<R> {
    type Record = R;

    async fn fetch(&self) -> Result<Option<Vec<R>>, SourceError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some((self.parse)(&text)?))
    }
}

/// Drives a [`PolicyBinder`] from a [`PolicySource`].
pub struct RefreshTask<S> {
    binder: Arc<PolicyBinder>,
    source: S,
    every: Duration,
}

impl<S: PolicySource> RefreshTask<S> {
    /// A task refreshing `binder` from `source` every `every`, raised to at
    /// least [`MIN_INTERVAL`].
    pub fn new(binder: Arc<PolicyBinder>, source: S, every: Duration) -> Self {
        let every = if every < MIN_INTERVAL {
            tracing::warn!(
                policy = binder.policy().name(),
                requested_ms = u64::try_from(every.as_millis()).unwrap_or(u64::MAX),
                min_ms = u64::try_from(MIN_INTERVAL.as_millis()).unwrap_or(u64::MAX),
                "refresh interval too short; using the minimum"
            );
            MIN_INTERVAL
        } else {
            every
        };
        Self {
            binder,
            source,
            every,
        }
    }

    /// The interval between fetches.
    pub fn every(&self) -> Duration {
        self.every
    }

    /// Fetch once and reload.
    pub async fn refresh(&self, initial: bool) -> Reload {
        match self.source.fetch().await {
            Ok(records) => self.binder.on_refresh(records.as_deref(), initial),
            Err(err) => {
                tracing::warn!(
                    policy = self.binder.policy().name(),
                    error = %err,
                    "policy fetch failed; keeping current rules"
                );
                Reload::SkippedEmpty
            }
        }
    }

    /// Refresh on every tick until `shutdown` resolves. The first tick fires
    /// immediately.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        tracing::info!(
            policy = self.binder.policy().name(),
            every_ms = u64::try_from(self.every.as_millis()).unwrap_or(u64::MAX),
            "policy refresh starting"
        );

        let mut ticker = time::interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut initial = true;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.refresh(initial).await.is_applied() {
                        initial = false;
                    }
                }
                () = &mut shutdown => {
                    tracing::info!(
                        policy = self.binder.policy().name(),
                        "policy refresh stopped"
                    );
                    break;
                }
            }
        }
    }
}

/// Spawn a refresh loop on the current runtime. Abort the handle to stop it.
pub fn spawn_refresh<S>(binder: Arc<PolicyBinder>, source: S, every: Duration) -> JoinHandle<()>
where
    S: PolicySource + 'static,
{
    let task = RefreshTask::new(binder, source, every);
    tokio::spawn(task.run(std::future::pending()))
}
