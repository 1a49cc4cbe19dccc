//! # volpack Core Library
//!
//! This crate provides the core functionality for the `volpack` partitioner.
//!
//! volpack splits a collection of files into a small number of bounded-size
//! "volumes" suitable for independent archiving (optical media, parallel
//! upload, chunked backups). It does not compress anything itself; it only
//! *estimates* compressed sizes to make packing decisions, and hands the
//! resulting partition list to an output backend (copy, hardlink, zip, tar,
//! external 7-Zip).
//!
//! ## Key Modules
//!
//! - [`packer`]: The partition dispatch engine: bin-packing strategies plus
//!   the oversized-file overflow-resolution loop.
//! - [`estimate`]: Sample-based compressed-size estimation.
//! - [`sort`]: Within-partition file ordering policies (extension locality).
//! - [`scan`]: Directory traversal and the estimation phase.
//! - [`filter`]: Composable file-selection predicates.
//! - [`output`]: Backends that realize a partition on disk.
//! - [`index`]: Index-file emission (text and JSON).

pub mod cli;
pub mod config;
pub mod error;
pub mod estimate;
pub mod filter;
pub mod index;
pub mod output;
pub mod packer;
pub mod scan;
pub mod sort;
pub mod stat;

pub use error::PackError;
pub use packer::{FileEntry, Packer, Partition};
