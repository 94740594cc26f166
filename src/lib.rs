//! # jar-verify
//!
//! Pre-release integrity check for jar artifacts.
//!
//! ## Architecture
//!
//! - **scan**: artifact discovery from directories and glob patterns
//! - **archive**: memory-mapped zip access and lazy entry enumeration
//! - **dedup**: duplicate entry detection, fatal on the first repeat
//! - **filter**: top-level class selection and class-name mapping
//! - **classfile**: JVM class-file reader (constant pool, header, methods)
//! - **resolve**: public method resolution against a classpath of jars
//! - **rank**: bounded top-K of classes by public method count
//! - **report**: scan summaries rendered as text or JSON
//! - **verify**: the per-artifact pipeline tying the above together
//! - **config**: settings layered from flags, environment and defaults

pub mod archive;
pub mod classfile;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod rank;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod verify;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod fixtures;
