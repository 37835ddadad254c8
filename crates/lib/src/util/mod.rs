//! Shared utilities for dtsbuild-lib.

pub mod paths;
