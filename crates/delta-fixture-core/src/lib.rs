//! Delta Lake fixture provisioning on top of delta-rs.
//!
//! This crate provides everything the fixture binary needs to create a
//! Delta table that both Delta readers and symlink-manifest readers
//! (Hive/Presto) can consume. The transaction log, checkpoints, Parquet
//! writes and commits come from the `deltalake` crate; on top of it sit:
//!
//! - A `DeltaTable` handle with Spark-style save modes, DataFusion scans
//!   and checked table properties (`table` module).
//! - Symlink format manifest generation, including automatic regeneration
//!   after every commit when the table asks for it (`manifest` module).
//! - A session facade with builder options, DataFrame writers and a small
//!   SQL surface (`session` module).
//! - Table location parsing and atomic file writes (`storage` module).
//! - The sample records themselves (`fixture` module).
#![warn(missing_docs)]
pub mod fixture;
pub mod manifest;
pub mod session;
pub mod storage;
pub mod table;

/// Arrow as used by delta-rs, so callers build batches against the same
/// version.
pub use deltalake::arrow;
