//! Test execution

use crate::assertions::TestPlan;
use crate::generator::{GeneratedTest, TestKind};
use rp_db::Database;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Sample failing rows fetched per failed test
pub const SAMPLE_LIMIT: usize = 5;

/// Outcome of a data test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pass => write!(f, "pass"),
            TestStatus::Fail => write!(f, "fail"),
            TestStatus::Error => write!(f, "error"),
        }
    }
}

/// Result of a single test execution
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Test name
    pub name: String,

    /// Origin of the test
    #[serde(flatten)]
    pub kind: TestKind,

    pub status: TestStatus,

    /// Number of violating rows (0 if passed)
    pub failure_count: usize,

    /// Sample violating rows as formatted strings
    pub sample_failures: Vec<String>,

    pub duration_secs: f64,

    /// Error message if the query itself failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestResult {
    fn new(test: &GeneratedTest, status: TestStatus, duration_secs: f64) -> Self {
        Self {
            name: test.name.clone(),
            kind: test.kind.clone(),
            status,
            failure_count: 0,
            sample_failures: Vec::new(),
            duration_secs,
            error: None,
        }
    }

    /// Create a passed test result
    pub fn pass(test: &GeneratedTest, duration_secs: f64) -> Self {
        Self::new(test, TestStatus::Pass, duration_secs)
    }

    /// Create a failed test result
    pub fn fail(
        test: &GeneratedTest,
        failure_count: usize,
        sample_failures: Vec<String>,
        duration_secs: f64,
    ) -> Self {
        Self {
            failure_count,
            sample_failures,
            ..Self::new(test, TestStatus::Fail, duration_secs)
        }
    }

    /// Create an error test result
    pub fn error(test: &GeneratedTest, error: String, duration_secs: f64) -> Self {
        Self {
            error: Some(error),
            ..Self::new(test, TestStatus::Error, duration_secs)
        }
    }

    pub fn passed(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

/// Summary of a test run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub duration_secs: f64,
}

impl TestSummary {
    /// Create a summary from test results
    pub fn from_results(results: &[TestResult], duration_secs: f64) -> Self {
        let count = |status: TestStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(TestStatus::Pass),
            failed: count(TestStatus::Fail),
            errors: count(TestStatus::Error),
            duration_secs,
        }
    }

    /// Check if all tests passed
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

/// Runs data tests against a warehouse
pub struct TestRunner<'a> {
    db: &'a dyn Database,
}

impl<'a> TestRunner<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Run a single generated test
    pub async fn run_test(&self, test: &GeneratedTest) -> TestResult {
        let start = Instant::now();

        match self.db.query_count(&test.sql).await {
            Ok(0) => TestResult::pass(test, start.elapsed().as_secs_f64()),
            Ok(count) => {
                let sample_failures = self
                    .db
                    .query_sample_rows(&test.sql, SAMPLE_LIMIT)
                    .await
                    .unwrap_or_default();
                log::warn!("Test {} found {} violating rows", test.name, count);
                TestResult::fail(test, count, sample_failures, start.elapsed().as_secs_f64())
            }
            Err(e) => {
                log::error!("Test {} could not run: {}", test.name, e);
                TestResult::error(test, e.to_string(), start.elapsed().as_secs_f64())
            }
        }
    }

    /// Run tests in order
    pub async fn run_tests(&self, tests: &[GeneratedTest]) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(tests.len());
        for test in tests {
            results.push(self.run_test(test).await);
        }
        results
    }

    /// Run every test in a plan and summarize
    pub async fn run_all(&self, plan: &TestPlan) -> (Vec<TestResult>, TestSummary) {
        let start = Instant::now();
        let results = self.run_tests(&plan.tests).await;
        let summary = TestSummary::from_results(&results, start.elapsed().as_secs_f64());
        (results, summary)
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
