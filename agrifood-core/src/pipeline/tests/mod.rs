//! Integration tests for the pipeline module.
//!
//! These tests verify building, running and serialising complete pipelines.
