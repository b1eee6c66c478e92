//! Integration tests for cbuild-lib: descriptor trees resolved end to end.

mod common;
mod execute_tests;
mod outputs_tests;
