//! Test-case lifecycle: suite setup, per-test job bookkeeping, cleanup.
//!
//! ```ignore
//! use std::sync::LazyLock;
//! use qibm_test_support::TestSuite;
//!
//! static SUITE: LazyLock<TestSuite> =
//!     LazyLock::new(|| TestSuite::set_up_class("TestIbmBackend", file!()));
//!
//! #[tokio::test]
//! async fn test_run_job() -> anyhow::Result<()> {
//!     SUITE
//!         .run(|jobs| async move {
//!             let job_id = submit(&client).await?;
//!             jobs.record(client.clone(), job_id);
//!             Ok(())
//!         })
//!         .await
//! }
//! ```
//!
//! Cleanup runs only when the test passed. Jobs of a failed test are left
//! alone so they can be inspected.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use qibm_job::{ApiJobStatus, JobClient, JobId, JobInfo};
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Instrument};
use tracing_subscriber::filter::LevelFilter;

use crate::config::TestLogConfig;
use crate::logging::setup_test_logging;

/// Wait after a cancel request and after each delete attempt.
pub const CLEANUP_DELAY: Duration = Duration::from_secs(1);

/// Maximum number of delete attempts per job.
pub const DELETE_ATTEMPTS: u32 = 3;

/// Whether a test passed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    /// The test completed without error.
    Passed,
    /// The test returned an error or panicked.
    Failed,
}

/// A submitted job: the client that owns it and its ID.
#[derive(Clone)]
pub struct JobRecord {
    /// Client used to manage the job.
    pub client: Arc<dyn JobClient>,
    /// Job identifier.
    pub job_id: JobId,
}

impl std::fmt::Debug for JobRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRecord")
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}

/// Jobs submitted by one test. Cloning shares the same list.
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    jobs: Arc<Mutex<Vec<JobRecord>>>,
}

impl JobTracker {
    /// Record a submitted job for cleanup.
    pub fn record(&self, client: Arc<dyn JobClient>, job_id: impl Into<JobId>) {
        let job_id = job_id.into();
        tracing::debug!(%job_id, "recorded job for cleanup");
        self.lock().push(JobRecord { client, job_id });
    }

    /// Number of recorded jobs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no job was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// IDs of recorded jobs, in submission order.
    pub fn job_ids(&self) -> Vec<JobId> {
        self.lock().iter().map(|r| r.job_id.clone()).collect()
    }

    fn take(&self) -> Vec<JobRecord> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<JobRecord>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A test suite: a name and the suite logger shared by its tests.
#[derive(Debug)]
pub struct TestSuite {
    name: String,
    dispatch: Dispatch,
    level: LevelFilter,
    log_file: Option<PathBuf>,
}

impl TestSuite {
    /// Set up a suite whose log file sits next to `source_file`, configured
    /// from the environment.
    pub fn set_up_class(name: impl Into<String>, source_file: impl AsRef<Path>) -> Self {
        Self::with_config(name, source_file, &TestLogConfig::from_env())
    }

    /// Set up a suite with explicit logging configuration.
    pub fn with_config(
        name: impl Into<String>,
        source_file: impl AsRef<Path>,
        config: &TestLogConfig,
    ) -> Self {
        let name = name.into();
        let logging = setup_test_logging(&name, source_file.as_ref(), config);
        Self {
            name,
            dispatch: logging.dispatch,
            level: logging.level,
            log_file: logging.log_file,
        }
    }

    /// Suite name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Suite log level.
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Log file being written, if any.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Run `f` with the suite logger as the default subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Start a test with an empty job list.
    pub fn set_up(&self) -> IbmTestCase {
        IbmTestCase {
            suite: self.name.clone(),
            dispatch: self.dispatch.clone(),
            jobs: JobTracker::default(),
        }
    }

    /// Run one test body, then tear down.
    ///
    /// The body fails by returning an error or by panicking; either way
    /// cleanup is skipped, and a panic is resumed after tear-down.
    pub async fn run<F, Fut>(&self, body: F) -> anyhow::Result<()>
    where
        F: FnOnce(JobTracker) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let case = self.set_up();
        let span = tracing::info_span!("test", suite = %self.name);
        let result = AssertUnwindSafe(
            body(case.jobs())
                .instrument(span)
                .with_subscriber(self.dispatch.clone()),
        )
        .catch_unwind()
        .await;

        let outcome = match &result {
            Ok(Ok(())) => TestOutcome::Passed,
            _ => TestOutcome::Failed,
        };
        case.tear_down(outcome).await;

        match result {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Log a job status update.
    pub fn simple_job_callback(&self, job_id: &JobId, job_status: ApiJobStatus, job: &JobInfo) {
        let queue_info = job
            .queue_info
            .as_ref()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        self.in_scope(|| {
            tracing::info!("Job {job_id} status is {job_status}, queue_info is {queue_info}");
        });
    }
}

/// One running test: its job list and the suite logger.
#[derive(Debug)]
pub struct IbmTestCase {
    suite: String,
    dispatch: Dispatch,
    jobs: JobTracker,
}

impl IbmTestCase {
    /// Handle for recording submitted jobs.
    pub fn jobs(&self) -> JobTracker {
        self.jobs.clone()
    }

    /// Clean up recorded jobs if the test passed.
    ///
    /// Each job not yet in a final state is cancelled, then deleted up to
    /// [`DELETE_ATTEMPTS`] times until the service reports it gone. Errors
    /// never escape.
    pub async fn tear_down(self, outcome: TestOutcome) {
        let span = tracing::info_span!("tear_down", suite = %self.suite);
        let jobs = self.jobs.take();
        async move {
            if outcome == TestOutcome::Failed {
                if !jobs.is_empty() {
                    tracing::info!(
                        num_jobs = jobs.len(),
                        "test failed; leaving submitted jobs in place"
                    );
                }
                return;
            }
            for record in &jobs {
                cleanup_job(record.client.as_ref(), &record.job_id).await;
            }
        }
        .instrument(span)
        .with_subscriber(self.dispatch)
        .await;
    }
}

/// Cancel (if needed) and delete one job.
async fn cleanup_job(client: &dyn JobClient, job_id: &JobId) {
    let status = match client.job_get(job_id).await.and_then(|info| info.api_status()) {
        Ok(status) => status,
        Err(e) => {
            tracing::debug!(%job_id, error = %e, "skipping cleanup: status query failed");
            return;
        }
    };

    if !status.is_final() {
        if let Err(e) = client.job_cancel(job_id).await {
            tracing::debug!(%job_id, %status, error = %e, "cancel failed");
        }
        tokio::time::sleep(CLEANUP_DELAY).await;
    }

    for attempt in 1..=DELETE_ATTEMPTS {
        match client.job_delete(job_id).await {
            Ok(()) => tokio::time::sleep(CLEANUP_DELAY).await,
            Err(e) if e.is_not_found() => {
                tracing::debug!(%job_id, attempt, "job deleted");
                return;
            }
            Err(e) => {
                tracing::debug!(%job_id, attempt, error = %e, "delete failed; giving up");
                return;
            }
        }
    }
}
