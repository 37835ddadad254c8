//! dtsbuild-lib: TypeScript declaration build target
//!
//! This crate implements one build target of a multi-target library packager:
//! producing standalone `.d.ts` type-declaration artifacts by driving the
//! TypeScript compiler as a subprocess. It provides:
//! - `BuildRequest` / `build`: the orchestrated pipeline (clean, validate,
//!   resolve, invoke, report)
//! - `toolchain`: ordered fallback resolution of the `tsc` executable
//! - `tsconfig`: relaxed-JSON config loading and conflict detection
//! - `report`: the injected reporting sink consumed by the pipeline

pub mod build;
pub mod error;
pub mod invoke;
pub mod report;
pub mod toolchain;
pub mod tsconfig;
pub mod util;

pub use build::{BuildRequest, build};
pub use error::BuildError;
pub use report::Reporter;
