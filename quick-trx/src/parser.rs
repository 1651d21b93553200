// Copyright (c) The quick-trx Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The TRX-to-report converter.
//!
//! One call converts one document: load the element tree, take the aggregate
//! counts, extract run metadata, then walk the individual test results in
//! document order, resolving each one's status, duration, message and owning
//! fixture. Mandatory structure that is missing (a result without its test
//! definition, an unknown outcome token) fails the whole conversion;
//! optional metadata degrades into [`ParseWarning`]s.

use crate::{
    document::{Document, Element},
    errors::{ParseError, ParseWarning},
    fixture_name::fixture_name,
    report::{Report, Status, Test, TestRunner},
    times,
};
use camino::Utf8Path;
use chrono::{DateTime, Local};
use quick_xml::escape::escape;
use std::fs;
use tracing::{debug, error, info};

/// Converts MSTest TRX documents into [`Report`]s.
///
/// The parser holds no state of its own; every call produces a fresh
/// [`ParsedReport`], so one value can safely convert any number of files.
#[derive(Copy, Clone, Debug, Default)]
pub struct MsTestParser {}

/// The outcome of a successful conversion: the report plus any recoverable
/// issues hit along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedReport {
    /// The converted report.
    pub report: Report,

    /// Recoverable metadata issues, in the order they were encountered.
    pub warnings: Vec<ParseWarning>,
}

/// Everything a conversion step needs to know about its input.
#[derive(Copy, Clone)]
struct ParseContext<'a> {
    doc: &'a Document,
    path: &'a Utf8Path,
    /// The input file's base name without extension. MSTest prefixes test
    /// and class names with the assembly name, which usually matches it.
    file_stem: &'a str,
}

impl MsTestParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and converts the TRX file at `path`.
    pub fn parse_file(&self, path: impl AsRef<Utf8Path>) -> Result<ParsedReport, ParseError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ParseError::Read {
            path: path.to_owned(),
            source,
        })?;

        let last_modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map(DateTime::<Local>::from);
        let mtime_error = last_modified.as_ref().err().map(ToString::to_string);

        let mut parsed = self.parse(path, &bytes, last_modified.ok())?;
        if let Some(reason) = mtime_error {
            error!(path = %path, %reason, "last-modified time unavailable");
            parsed.warnings.push(ParseWarning::LastModifiedUnavailable {
                path: path.to_owned(),
                reason,
            });
        }
        Ok(parsed)
    }

    /// Converts an in-memory TRX document.
    ///
    /// `path` names the document for run metadata and prefix stripping;
    /// `last_modified` feeds the "Last Run" run-info entry and may be `None`
    /// when unknown. Given equal inputs, the result is identical across
    /// calls.
    pub fn parse(
        &self,
        path: impl AsRef<Utf8Path>,
        bytes: &[u8],
        last_modified: Option<DateTime<Local>>,
    ) -> Result<ParsedReport, ParseError> {
        let path = path.as_ref();
        let doc = Document::parse(bytes)?;
        let cx = ParseContext {
            doc: &doc,
            path,
            file_stem: path.file_stem().unwrap_or_default(),
        };

        let mut report = Report::new(path.to_owned(), TestRunner::MsTest2010);
        let mut warnings = Vec::new();

        let results: Vec<&Element> = doc.descendants("UnitTestResult").collect();
        report.total = results.len();
        info!(path = %path, total = report.total, "processing TRX results");

        if report.total == 0 {
            // An empty run normalizes to Passed, with no fixtures and no
            // metadata extraction.
            return Ok(ParsedReport { report, warnings });
        }

        // Category counters come from the same classifier as per-test
        // statuses, so total == passed + failed + inconclusive + skipped +
        // errors holds whenever every token classifies.
        for result in &results {
            match Status::from_outcome(outcome_of(result)?)? {
                Status::Passed => report.passed += 1,
                Status::Failed => report.failed += 1,
                Status::Inconclusive => report.inconclusive += 1,
                Status::Skipped => report.skipped += 1,
                Status::Error => report.errors += 1,
            }
        }

        report.duration = run_duration(cx, &mut warnings);
        report.assembly_name = Some(assembly_name(cx)?);

        extract_run_info(cx, &mut report, last_modified, &mut warnings);

        for result in &results {
            let test = build_test(cx, result, &mut warnings)?;
            let class_name = class_name_of(cx, result)?;
            let fixture = fixture_name(class_name.as_deref(), cx.file_stem);
            report.fixture_mut(&fixture).add_test(test);
        }

        report.status = Status::rollup(
            report
                .test_fixtures
                .iter()
                .flat_map(|fixture| &fixture.tests)
                .map(|test| test.status),
        );

        Ok(ParsedReport { report, warnings })
    }
}

fn outcome_of(result: &Element) -> Result<&str, ParseError> {
    result.attr("outcome").ok_or(ParseError::MissingNode {
        path: "UnitTestResult/@outcome",
    })
}

/// The run-level duration from the `Times` node, in milliseconds. Absent or
/// malformed timing yields 0.
fn run_duration(cx: ParseContext<'_>, warnings: &mut Vec<ParseWarning>) -> f64 {
    let Some(times) = cx.doc.first_descendant("Times") else {
        return 0.0;
    };
    let resolved = match (times.attr("start"), times.attr("finish")) {
        (Some(start), Some(finish)) => times::difference_in_millis(start, finish),
        _ => None,
    };
    match resolved {
        Some(millis) => millis,
        None => {
            let warning = ParseWarning::RunMetadataIncomplete {
                reason: "Times node has missing or unparseable start/finish attributes".to_owned(),
            };
            error!(path = %cx.path, "{warning}");
            warnings.push(warning);
            0.0
        }
    }
}

/// The assembly the tests were loaded from, taken from the first test
/// definition's method-level `codeBase` attribute.
fn assembly_name(cx: ParseContext<'_>) -> Result<String, ParseError> {
    let definition = cx
        .doc
        .first_descendant("UnitTest")
        .ok_or(ParseError::MissingNode { path: "UnitTest" })?;
    let method = definition
        .child("TestMethod")
        .ok_or(ParseError::MissingNode {
            path: "UnitTest/TestMethod",
        })?;
    let code_base = method.attr("codeBase").ok_or(ParseError::MissingNode {
        path: "TestMethod/@codeBase",
    })?;
    Ok(code_base.to_owned())
}

/// Builds the run-info table: file identity first, then duration, then
/// whatever the run-level node yields. Failures here never abort the
/// conversion.
fn extract_run_info(
    cx: ParseContext<'_>,
    report: &mut Report,
    last_modified: Option<DateTime<Local>>,
    warnings: &mut Vec<ParseWarning>,
) {
    report.run_info.add("TestResult File", cx.path.as_str());
    if let Some(last_modified) = last_modified {
        report.run_info.add(
            "Last Run",
            last_modified.format("%-d %b %Y %H:%M").to_string(),
        );
    }
    if report.duration > 0.0 {
        report
            .run_info
            .add("Duration", format!("{} ms", report.duration));
    }

    let Some(test_run) = cx.doc.first_descendant("TestRun") else {
        report
            .run_info
            .add("TestRunner", report.test_runner.to_string());
        return;
    };

    match run_details(cx, test_run, report.test_runner) {
        Ok(entries) => {
            for (label, value) in entries {
                report.run_info.add(label, value);
            }
        }
        Err(reason) => {
            report
                .run_info
                .add("TestRunner", report.test_runner.to_string());
            let warning = ParseWarning::RunMetadataIncomplete {
                reason: reason.to_owned(),
            };
            error!(path = %cx.path, "{warning}");
            warnings.push(warning);
        }
    }
}

/// The run-node metadata entries, or the reason they could not be assembled.
/// Entries are staged so that a failure partway through leaves no partial
/// rows behind.
fn run_details(
    cx: ParseContext<'_>,
    test_run: &Element,
    runner: TestRunner,
) -> Result<Vec<(&'static str, String)>, &'static str> {
    let mut entries = Vec::new();

    let first_result = cx
        .doc
        .first_descendant("UnitTestResult")
        .ok_or("no UnitTestResult to take the machine name from")?;
    let machine = first_result
        .attr("computerName")
        .ok_or("first UnitTestResult has no computerName attribute")?;
    entries.push(("Machine Name", machine.to_owned()));
    entries.push(("TestRunner", runner.to_string()));

    let version = test_run
        .attr("xmlns")
        .ok_or("TestRun node has no xmlns attribute")?;
    entries.push(("TestRunner Version", version.to_owned()));

    if let Some(user) = test_run.attr("runUser") {
        if !user.trim().is_empty() {
            match user.split_once('\\') {
                Some((domain, name)) => {
                    entries.push(("User", name.to_owned()));
                    entries.push(("User Domain", domain.to_owned()));
                }
                None => entries.push(("User", user.to_owned())),
            }
        }
    }

    Ok(entries)
}

/// Builds one [`Test`] from a `UnitTestResult` element.
fn build_test(
    cx: ParseContext<'_>,
    result: &Element,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Test, ParseError> {
    let raw_name = result.attr("testName").ok_or(ParseError::MissingNode {
        path: "UnitTestResult/@testName",
    })?;
    let name = if cx.file_stem.is_empty() {
        raw_name.to_owned()
    } else {
        raw_name.replace(&format!("{}.", cx.file_stem), "")
    };

    let status = Status::from_outcome(outcome_of(result)?)?;
    let duration = test_duration(result);
    if duration < 0.0 {
        debug!(test = %name, millis = duration, "negative duration preserved");
        warnings.push(ParseWarning::NegativeDuration {
            test_name: name.clone(),
            millis: duration,
        });
    }

    Ok(Test::new(name, status, duration, status_message(result)))
}

/// Resolves a test's elapsed time: an explicit `duration` attribute wins
/// over a `startTime`/`endTime` pair; with neither, the duration is 0.
fn test_duration(result: &Element) -> f64 {
    if let Some(span) = result.attr("duration") {
        return times::parse_time_span(span).unwrap_or(0.0);
    }
    if let (Some(start), Some(end)) = (result.attr("startTime"), result.attr("endTime")) {
        return times::difference_in_millis(start, end).unwrap_or(0.0);
    }
    0.0
}

/// Composes the status message from a result's nested output: a description
/// block for standard output, a preformatted block for the error message and
/// newline-stripped stack trace, and a preformatted block for the escaped
/// debug trace. Blocks with no underlying content are omitted entirely.
fn status_message(result: &Element) -> String {
    let mut description = String::new();
    let mut error = String::new();
    let mut trace = String::new();

    for output in result.children_named("Output") {
        if let Some(std_out) = output.child("StdOut") {
            let text = std_out.inner_text();
            if !text.is_empty() {
                description = format!("<p class='description'>Description: {text}</p>");
            }
        }

        if let Some(error_info) = output.child("ErrorInfo") {
            let message = error_info
                .child("Message")
                .map(|node| node.inner_text())
                .unwrap_or_default();
            let stack_trace = error_info
                .child("StackTrace")
                .map(|node| node.inner_text().replace(['\r', '\n'], ""))
                .unwrap_or_default();
            if !message.is_empty() || !stack_trace.is_empty() {
                error = format!("<pre>{message}{stack_trace}</pre>");
            }
        }

        if let Some(debug_trace) = output.child("DebugTrace") {
            let text = debug_trace.inner_text();
            if !text.is_empty() {
                trace = format!("<pre>{}</pre>", escape(&text));
            }
        }
    }

    format!("{description}{error}{trace}")
}

/// Looks up the `className` of the test definition a result points at. The
/// definition itself is mandatory; the attribute is not.
fn class_name_of(cx: ParseContext<'_>, result: &Element) -> Result<Option<String>, ParseError> {
    let test_id = result.attr("testId").ok_or(ParseError::MissingNode {
        path: "UnitTestResult/@testId",
    })?;
    let method = cx
        .doc
        .descendants("UnitTest")
        .find(|definition| definition.attr("id") == Some(test_id))
        .and_then(|definition| definition.child("TestMethod"))
        .ok_or_else(|| ParseError::MissingTestDefinition {
            test_id: test_id.to_owned(),
        })?;
    Ok(method.attr("className").map(str::to_owned))
}
