// Copyright (c) The quick-trx Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-file conversion tests over committed TRX fixtures.

use camino::Utf8Path;
use pretty_assertions::assert_eq;
use quick_trx::{MsTestParser, ParseError, ParseWarning, Status};
use std::fs;

static SAMPLE_PATH: &str = "tests/fixtures/sample.trx";
static EMPTY_PATH: &str = "tests/fixtures/empty.trx";

static TRX_NAMESPACE: &str = "http://microsoft.com/schemas/VisualStudio/TeamTest/2010";

fn parse_fixture(path: &str) -> quick_trx::ParsedReport {
    let bytes = fs::read(path).expect("fixture exists");
    MsTestParser::new()
        .parse(Utf8Path::new(path), &bytes, None)
        .expect("fixture converts")
}

#[test]
fn sample_report_counts_and_status() {
    let parsed = parse_fixture(SAMPLE_PATH);
    let report = &parsed.report;

    assert_eq!(report.total, 4);
    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.inconclusive, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(
        report.total,
        report.passed + report.failed + report.inconclusive + report.skipped + report.errors
    );

    assert_eq!(report.status, Status::Failed);
    assert_eq!(report.duration, 5000.0);
    assert_eq!(report.assembly_name.as_deref(), Some("sample.dll"));
    assert_eq!(parsed.warnings, []);
}

#[test]
fn sample_report_fixtures_group_by_shortened_class_name() {
    let parsed = parse_fixture(SAMPLE_PATH);
    let fixtures = &parsed.report.test_fixtures;

    let names: Vec<_> = fixtures.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Tests.Calc", "Tests.Io"], "first-seen order");

    let calc = &fixtures[0];
    assert_eq!(calc.status, Status::Failed);
    assert_eq!(calc.duration, 3750.0);
    let calc_tests: Vec<_> = calc
        .tests
        .iter()
        .map(|t| (t.name.as_str(), t.status, t.duration))
        .collect();
    assert_eq!(
        calc_tests,
        [
            ("Calc.adds", Status::Passed, 1500.0),
            ("Calc.divides", Status::Failed, 2250.0),
        ]
    );

    let io = &fixtures[1];
    assert_eq!(io.status, Status::Inconclusive);
    assert_eq!(io.duration, 250.0);
    let io_tests: Vec<_> = io
        .tests
        .iter()
        .map(|t| (t.name.as_str(), t.status, t.duration))
        .collect();
    assert_eq!(
        io_tests,
        [
            ("Io.reads", Status::Skipped, 0.0),
            ("Io.writes", Status::Inconclusive, 250.0),
        ]
    );
}

#[test]
fn sample_report_run_info() {
    let parsed = parse_fixture(SAMPLE_PATH);
    let run_info = &parsed.report.run_info;

    let entries: Vec<_> = run_info.iter().collect();
    assert_eq!(
        entries,
        [
            ("TestResult File", SAMPLE_PATH),
            ("Duration", "5000 ms"),
            ("Machine Name", "BUILD01"),
            ("TestRunner", "MSTest2010"),
            ("TestRunner Version", TRX_NAMESPACE),
            ("User", "jane"),
            ("User Domain", "CONTOSO"),
        ]
    );
}

#[test]
fn sample_report_status_messages() {
    let parsed = parse_fixture(SAMPLE_PATH);
    let tests: Vec<_> = parsed
        .report
        .test_fixtures
        .iter()
        .flat_map(|f| &f.tests)
        .collect();

    assert_eq!(tests[0].status_message, "", "passing test carries no message");
    assert_eq!(
        tests[1].status_message,
        "<pre>Expected 2 but was 3.at Calc.divides() in calc.cs:line 14at Runner.invoke()</pre>",
        "stack trace newlines are stripped"
    );
    assert_eq!(
        tests[2].status_message,
        "<p class='description'>Description: reads a file from disk</p>\
         <pre>opening &lt;stream&gt; 1 &amp; 2</pre>",
        "debug trace is escaped for embedding"
    );
}

#[test]
fn empty_run_normalizes_to_passed() {
    let parsed = parse_fixture(EMPTY_PATH);
    let report = &parsed.report;

    assert_eq!(report.total, 0);
    assert_eq!(report.status, Status::Passed);
    assert_eq!(report.test_fixtures, []);
    assert!(report.run_info.is_empty());
    assert_eq!(report.assembly_name, None);
    assert_eq!(report.duration, 0.0);
    assert_eq!(parsed.warnings, []);
}

#[test]
fn conversion_is_idempotent() {
    let bytes = fs::read(SAMPLE_PATH).unwrap();
    let first = MsTestParser::new()
        .parse(Utf8Path::new(SAMPLE_PATH), &bytes, None)
        .unwrap();
    let second = MsTestParser::new()
        .parse(Utf8Path::new(SAMPLE_PATH), &bytes, None)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn parse_file_records_last_run() {
    let parsed = MsTestParser::new()
        .parse_file(SAMPLE_PATH)
        .expect("fixture converts");
    assert!(
        parsed.report.run_info.get("Last Run").is_some(),
        "committed fixtures have a last-modified time"
    );
}

fn trx_document(results: &str, definitions: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TestRun id="r" name="inline" xmlns="{TRX_NAMESPACE}">
  <Results>{results}</Results>
  <TestDefinitions>{definitions}</TestDefinitions>
</TestRun>"#
    )
    .into_bytes()
}

static ADDS_DEFINITION: &str = r#"<UnitTest id="t1" name="adds">
    <TestMethod codeBase="inline.dll" className="inline.Tests.Calc" name="adds" />
  </UnitTest>"#;

#[test]
fn unknown_outcome_aborts_conversion() {
    let bytes = trx_document(
        r#"<UnitTestResult testId="t1" testName="adds" outcome="Exploded" />"#,
        ADDS_DEFINITION,
    );
    let err = MsTestParser::new()
        .parse(Utf8Path::new("inline.trx"), &bytes, None)
        .unwrap_err();
    assert!(matches!(err, ParseError::UnknownOutcome { outcome } if outcome == "Exploded"));
}

#[test]
fn missing_test_definition_aborts_conversion() {
    let bytes = trx_document(
        r#"<UnitTestResult testId="t9" testName="ghost" outcome="Passed" />"#,
        ADDS_DEFINITION,
    );
    let err = MsTestParser::new()
        .parse(Utf8Path::new("inline.trx"), &bytes, None)
        .unwrap_err();
    assert!(matches!(err, ParseError::MissingTestDefinition { test_id } if test_id == "t9"));
}

#[test]
fn missing_definitions_node_aborts_conversion() {
    let bytes = trx_document(
        r#"<UnitTestResult testId="t1" testName="adds" outcome="Passed" />"#,
        "",
    );
    let err = MsTestParser::new()
        .parse(Utf8Path::new("inline.trx"), &bytes, None)
        .unwrap_err();
    assert!(matches!(err, ParseError::MissingNode { path: "UnitTest" }));
}

#[test]
fn error_block_alone_has_no_stray_wrappers() {
    let bytes = trx_document(
        r#"<UnitTestResult testId="t1" testName="adds" outcome="Failed">
             <Output>
               <StdOut></StdOut>
               <ErrorInfo><Message>boom</Message></ErrorInfo>
             </Output>
           </UnitTestResult>"#,
        ADDS_DEFINITION,
    );
    let parsed = MsTestParser::new()
        .parse(Utf8Path::new("inline.trx"), &bytes, None)
        .unwrap();
    let test = &parsed.report.test_fixtures[0].tests[0];
    assert_eq!(test.status_message, "<pre>boom</pre>");
}

#[test]
fn negative_duration_is_preserved_and_reported() {
    let bytes = trx_document(
        r#"<UnitTestResult testId="t1" testName="adds" outcome="Passed"
             startTime="2024-01-01T00:00:05.000" endTime="2024-01-01T00:00:02.000" />"#,
        ADDS_DEFINITION,
    );
    let parsed = MsTestParser::new()
        .parse(Utf8Path::new("inline.trx"), &bytes, None)
        .unwrap();

    let test = &parsed.report.test_fixtures[0].tests[0];
    assert_eq!(test.duration, -3000.0);
    assert_eq!(
        parsed.warnings,
        [ParseWarning::NegativeDuration {
            test_name: "adds".to_owned(),
            millis: -3000.0,
        }]
    );
}

#[test]
fn malformed_run_node_degrades_to_runner_entry_only() {
    // The document root is still a TestRun element, but without the xmlns
    // attribute the run details cannot be assembled.
    let bytes = format!(
        r#"<TestRun>
  <Results><UnitTestResult testId="t1" testName="adds" computerName="BUILD01" outcome="Passed" /></Results>
  <TestDefinitions>{ADDS_DEFINITION}</TestDefinitions>
</TestRun>"#
    )
    .into_bytes();

    let parsed = MsTestParser::new()
        .parse(Utf8Path::new("inline.trx"), &bytes, None)
        .unwrap();

    let entries: Vec<_> = parsed.report.run_info.iter().collect();
    assert_eq!(
        entries,
        [
            ("TestResult File", "inline.trx"),
            ("TestRunner", "MSTest2010"),
        ]
    );
    assert_eq!(
        parsed.warnings,
        [ParseWarning::RunMetadataIncomplete {
            reason: "TestRun node has no xmlns attribute".to_owned(),
        }]
    );
    assert_eq!(parsed.report.status, Status::Passed);
}

#[test]
fn unreadable_file_surfaces_read_error() {
    let err = MsTestParser::new()
        .parse_file("tests/fixtures/does-not-exist.trx")
        .unwrap_err();
    assert!(matches!(err, ParseError::Read { .. }));
}

#[test]
fn ill_formed_xml_surfaces_parse_error() {
    let err = MsTestParser::new()
        .parse(Utf8Path::new("inline.trx"), b"<TestRun><Results></TestRun>", None)
        .unwrap_err();
    assert!(matches!(err, ParseError::Xml(_)));
}
