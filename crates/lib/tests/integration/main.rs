//! End-to-end pipeline tests against the real filesystem.

mod assets_tests;
mod build_tests;
mod common;
