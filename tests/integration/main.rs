//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the archive API and drive whole
//! walk-then-fetch jobs end-to-end.

mod common;
mod harvest_tests;
mod resume_tests;
