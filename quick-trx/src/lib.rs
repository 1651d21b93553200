// Copyright (c) The quick-trx Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read MSTest TRX result files into a normalized report model.
//!
//! A TRX file is the XML document Visual Studio's test runner writes after a
//! run. This crate parses one such document and produces a [`Report`]:
//! aggregate pass/fail counters, tests grouped into fixtures by a shortened
//! class name, per-test status and timing, and a table of run metadata
//! (machine, user, runner version, duration).
//!
//! Rendering the report, locating result files on disk, and aggregating
//! several reports into a summary are left to consumers.
//!
//! # Example
//!
//! ```no_run
//! use quick_trx::MsTestParser;
//!
//! # fn main() -> Result<(), quick_trx::ParseError> {
//! let parsed = MsTestParser::new().parse_file("results/TestResults.trx")?;
//! println!("{} tests, status {}", parsed.report.total, parsed.report.status);
//! for warning in &parsed.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok(())
//! # }
//! ```

mod document;
mod errors;
mod fixture_name;
mod parser;
mod report;
mod times;

pub use errors::*;
pub use parser::*;
pub use report::*;
