//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Backend/place types and their change notifications
//! - Backend ordering
//! - Row list building and identity preservation
//! - Selection aggregation
//! - The sidebar facade (scheduling, cleanup, host API)
//! - Places file parsing


#[cfg(test)]
mod ordering_tests;
#[cfg(test)]
mod sidebar_tests;
#[cfg(test)]
mod types_tests;
