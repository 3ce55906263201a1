//! Test utilities and fixtures for Quill
//!
//! This crate provides shared test helpers that can be used by the
//! integration tests of every workspace crate.

pub mod compile;
pub mod fixtures;
pub mod mocks;
