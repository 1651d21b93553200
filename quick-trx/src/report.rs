// Copyright (c) The quick-trx Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ParseError;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use std::fmt;

/// The normalized result classification used throughout the report model.
///
/// Variants are ordered by severity, least severe first, so that the rollup
/// of a set of statuses is simply its maximum: a fixture with one failed and
/// ten passed tests is `Failed`, and `Error` outranks everything.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Status {
    /// The test passed.
    Passed,
    /// The test was not executed.
    Skipped,
    /// The test produced no definite verdict.
    Inconclusive,
    /// The test ran and failed.
    Failed,
    /// The test could not run to completion (aborted, timed out, errored).
    Error,
}

impl Status {
    /// Classifies a raw MSTest outcome token.
    ///
    /// Tokens are matched case-sensitively, as emitted by the runner. A token
    /// outside the recognized vocabulary is a fatal
    /// [`ParseError::UnknownOutcome`].
    pub fn from_outcome(outcome: &str) -> Result<Self, ParseError> {
        match outcome {
            "Passed" => Ok(Status::Passed),
            "Failed" => Ok(Status::Failed),
            "Inconclusive" | "NotRunnable" | "PassedButRunAborted" | "Disconnected"
            | "Warning" | "Pending" => Ok(Status::Inconclusive),
            "NotExecuted" => Ok(Status::Skipped),
            "Error" | "Aborted" | "Timeout" => Ok(Status::Error),
            _ => Err(ParseError::UnknownOutcome {
                outcome: outcome.to_owned(),
            }),
        }
    }

    /// The worst status among `statuses`, or `Passed` when empty.
    pub fn rollup(statuses: impl IntoIterator<Item = Status>) -> Self {
        statuses.into_iter().max().unwrap_or(Status::Passed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Passed => "Passed",
            Status::Skipped => "Skipped",
            Status::Inconclusive => "Inconclusive",
            Status::Failed => "Failed",
            Status::Error => "Error",
        };
        f.write_str(s)
    }
}

/// Identifies the test framework a report originated from. Set once at
/// construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum TestRunner {
    /// Visual Studio's MSTest runner, 2010 TRX schema.
    MsTest2010,
}

impl fmt::Display for TestRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestRunner::MsTest2010 => f.write_str("MSTest2010"),
        }
    }
}

/// Descriptive metadata about the overall run: machine, user, runner
/// version, timing. An append-only mapping whose insertion order is the
/// display order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunInfo {
    entries: IndexMap<String, String>,
}

impl RunInfo {
    pub(crate) fn add(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(label.into(), value.into());
    }

    /// Returns the value recorded under `label`, if any.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    /// Iterates over entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(label, value)| (label.as_str(), value.as_str()))
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One individual test execution.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Test {
    /// The test method's display name, with the result file's base name
    /// prefix stripped when present.
    pub name: String,

    /// The normalized status.
    pub status: Status,

    /// Elapsed time in milliseconds; 0 when unknown. Negative when the input
    /// carried an end timestamp before its start timestamp.
    pub duration: f64,

    /// Description, error and trace text combined into one display string.
    /// Empty when the result carried none.
    pub status_message: String,
}

impl Test {
    pub(crate) fn new(
        name: impl Into<String>,
        status: Status,
        duration: f64,
        status_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            duration,
            status_message: status_message.into(),
        }
    }
}

/// A fixture: tests grouped under one resolved class name, displayed as one
/// report section.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct TestSuite {
    /// The grouping key, unique case-insensitively within a report.
    pub name: String,

    /// Accumulated duration of the fixture's tests, in milliseconds.
    pub duration: f64,

    /// The worst status among the fixture's tests.
    pub status: Status,

    /// The tests of this fixture, in document order.
    pub tests: Vec<Test>,
}

impl TestSuite {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: 0.0,
            status: Status::Passed,
            tests: Vec::new(),
        }
    }

    /// Appends a test, accumulating the fixture's duration and re-rolling
    /// its status.
    pub(crate) fn add_test(&mut self, test: Test) {
        self.duration += test.duration;
        self.status = self.status.max(test.status);
        self.tests.push(test);
    }
}

/// The report produced from one TRX file.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Report {
    /// The input file this report was converted from.
    pub file_name: Utf8PathBuf,

    /// The assembly the tests were loaded from, when the document records
    /// one.
    pub assembly_name: Option<String>,

    /// The originating test framework.
    pub test_runner: TestRunner,

    /// Total number of test results in the document.
    pub total: usize,
    /// Number of tests classified `Passed`.
    pub passed: usize,
    /// Number of tests classified `Failed`.
    pub failed: usize,
    /// Number of tests classified `Inconclusive`.
    pub inconclusive: usize,
    /// Number of tests classified `Skipped`.
    pub skipped: usize,
    /// Number of tests classified `Error`.
    pub errors: usize,

    /// Overall run duration in milliseconds; 0 when the document carries no
    /// run-level timing.
    pub duration: f64,

    /// Run metadata in display order.
    pub run_info: RunInfo,

    /// Fixtures in first-seen order.
    pub test_fixtures: Vec<TestSuite>,

    /// The worst status among all tests; `Passed` for an empty run.
    pub status: Status,
}

impl Report {
    pub(crate) fn new(file_name: Utf8PathBuf, test_runner: TestRunner) -> Self {
        Self {
            file_name,
            assembly_name: None,
            test_runner,
            total: 0,
            passed: 0,
            failed: 0,
            inconclusive: 0,
            skipped: 0,
            errors: 0,
            duration: 0.0,
            run_info: RunInfo::default(),
            test_fixtures: Vec::new(),
            status: Status::Passed,
        }
    }

    /// Finds the fixture named `name` (case-insensitively), creating it in
    /// last position on first sight.
    pub(crate) fn fixture_mut(&mut self, name: &str) -> &mut TestSuite {
        let index = match self
            .test_fixtures
            .iter()
            .position(|fixture| fixture.name.eq_ignore_ascii_case(name))
        {
            Some(index) => index,
            None => {
                self.test_fixtures.push(TestSuite::new(name));
                self.test_fixtures.len() - 1
            }
        };
        &mut self.test_fixtures[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Passed", Status::Passed)]
    #[test_case("Failed", Status::Failed)]
    #[test_case("Inconclusive", Status::Inconclusive)]
    #[test_case("NotRunnable", Status::Inconclusive)]
    #[test_case("PassedButRunAborted", Status::Inconclusive)]
    #[test_case("Disconnected", Status::Inconclusive)]
    #[test_case("Warning", Status::Inconclusive)]
    #[test_case("Pending", Status::Inconclusive)]
    #[test_case("NotExecuted", Status::Skipped)]
    #[test_case("Error", Status::Error)]
    #[test_case("Aborted", Status::Error)]
    #[test_case("Timeout", Status::Error)]
    fn outcome_classification(token: &str, expected: Status) {
        assert_eq!(Status::from_outcome(token).unwrap(), expected);
    }

    #[test_case("Exploded")]
    #[test_case("passed"; "tokens are case sensitive")]
    #[test_case("")]
    fn unknown_outcomes_are_fatal(token: &str) {
        assert!(matches!(
            Status::from_outcome(token),
            Err(ParseError::UnknownOutcome { outcome }) if outcome == token
        ));
    }

    #[test]
    fn severity_order_is_fixed() {
        assert!(Status::Passed < Status::Skipped);
        assert!(Status::Skipped < Status::Inconclusive);
        assert!(Status::Inconclusive < Status::Failed);
        assert!(Status::Failed < Status::Error);
    }

    #[test_case(&[Status::Passed, Status::Failed, Status::Passed], Status::Failed)]
    #[test_case(&[Status::Passed, Status::Skipped], Status::Skipped)]
    #[test_case(&[Status::Failed, Status::Error, Status::Inconclusive], Status::Error)]
    #[test_case(&[], Status::Passed; "empty set normalizes to passed")]
    fn rollup_is_the_worst_status(statuses: &[Status], expected: Status) {
        assert_eq!(Status::rollup(statuses.iter().copied()), expected);
    }

    #[test]
    fn fixtures_are_matched_case_insensitively() {
        let mut report = Report::new("results.trx".into(), TestRunner::MsTest2010);
        report
            .fixture_mut("Tests.Calc")
            .add_test(Test::new("adds", Status::Passed, 10.0, ""));
        report
            .fixture_mut("tests.calc")
            .add_test(Test::new("divides", Status::Failed, 5.0, ""));
        report
            .fixture_mut("Tests.Io")
            .add_test(Test::new("reads", Status::Passed, 1.0, ""));

        let names: Vec<_> = report
            .test_fixtures
            .iter()
            .map(|fixture| fixture.name.as_str())
            .collect();
        assert_eq!(names, ["Tests.Calc", "Tests.Io"]);

        let calc = &report.test_fixtures[0];
        assert_eq!(calc.tests.len(), 2);
        assert_eq!(calc.duration, 15.0);
        assert_eq!(calc.status, Status::Failed);
    }

    #[test]
    fn run_info_preserves_insertion_order() {
        let mut run_info = RunInfo::default();
        run_info.add("Machine Name", "BUILD01");
        run_info.add("TestRunner", "MSTest2010");
        run_info.add("User", "jane");

        let labels: Vec<_> = run_info.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, ["Machine Name", "TestRunner", "User"]);
        assert_eq!(run_info.get("User"), Some("jane"));
        assert_eq!(run_info.len(), 3);
    }
}
