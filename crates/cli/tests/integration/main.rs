mod common;
mod export_tests;
mod plan_tests;
