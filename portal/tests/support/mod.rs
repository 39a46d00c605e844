//! Shared helpers for portal integration tests.
//!
//! Integration tests compile as separate crates under `portal/tests/`, so
//! not every suite uses every helper.
#![allow(dead_code)]

pub mod fake_backend;
pub mod portal_app;
