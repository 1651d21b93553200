// Copyright (c) The quick-trx Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use thiserror::Error;

/// An error that occurs while converting a TRX document.
///
/// All variants are fatal: a failed conversion yields no
/// [`Report`](crate::Report) for that file. Callers decide whether to skip
/// the file or abort a larger batch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input file could not be read.
    #[error("failed to read `{path}`")]
    Read {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The input is not well-formed XML.
    #[error("input is not well-formed XML")]
    Xml(#[from] quick_xml::Error),

    /// A mandatory node or attribute is missing from the document.
    #[error("mandatory node or attribute `{path}` is missing")]
    MissingNode {
        /// Describes the missing node, e.g. `UnitTestResult/@outcome`.
        path: &'static str,
    },

    /// A test result refers to a test definition that does not exist.
    #[error("test definition for test id `{test_id}` not found")]
    MissingTestDefinition {
        /// The identifying key of the orphaned result.
        test_id: String,
    },

    /// A result carries an outcome token outside the recognized vocabulary.
    #[error("unrecognized outcome token `{outcome}`")]
    UnknownOutcome {
        /// The raw outcome token.
        outcome: String,
    },
}

/// A recoverable issue encountered while extracting optional metadata.
///
/// Warnings never abort a conversion. They are logged as they occur and
/// returned in [`ParsedReport::warnings`](crate::ParsedReport::warnings) so
/// callers can surface them without scraping logs.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ParseWarning {
    /// The file's last-modified time could not be determined, so the
    /// "Last Run" run-info entry is omitted.
    #[error("last-modified time unavailable for `{path}`: {reason}")]
    LastModifiedUnavailable {
        /// The file whose metadata lookup failed.
        path: Utf8PathBuf,
        /// The underlying failure, stringified.
        reason: String,
    },

    /// The run-level metadata node was malformed; only the "TestRunner"
    /// run-info entry was recorded.
    #[error("run metadata incomplete: {reason}")]
    RunMetadataIncomplete {
        /// What was missing or malformed.
        reason: String,
    },

    /// A test's end timestamp precedes its start timestamp. The negative
    /// duration is preserved as a signal of malformed input.
    #[error("test `{test_name}` has a negative duration ({millis} ms)")]
    NegativeDuration {
        /// The display name of the affected test.
        test_name: String,
        /// The computed duration in milliseconds.
        millis: f64,
    },
}
