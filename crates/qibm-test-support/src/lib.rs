//! Test harness for IBM Quantum provider tests.
//!
//! - [`TestSuite`]: per-suite logging to a file next to the test source,
//!   optionally echoed to the test output
//! - [`IbmTestCase`] and [`JobTracker`]: jobs submitted by a test are
//!   cancelled and deleted after it passes
//! - [`TestLogConfig`]: `LOG_LEVEL`, `QIBM_LOG_LEVEL`, `STREAM_LOG` and
//!   `FILE_LOG` handling

pub mod case;
pub mod config;
pub mod error;
pub mod logging;

pub use case::{
    CLEANUP_DELAY, DELETE_ATTEMPTS, IbmTestCase, JobRecord, JobTracker, TestOutcome, TestSuite,
};
pub use config::{DEFAULT_LEVEL, TestLogConfig, parse_level};
pub use error::{SupportError, SupportResult};
pub use logging::{
    LIBRARY_TARGETS, SuiteLogging, is_library_target, log_file_for, setup_test_logging,
};
