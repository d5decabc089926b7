//! Config module tests
//!
//! Loading places files from disk, path expansion and error reporting.
