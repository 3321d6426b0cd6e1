//! Integration tests for the docstore client. The tests live under `tests/`;
//! this crate only provides the shared harness.

pub mod test_util;
