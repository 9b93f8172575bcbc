//! Reporting point record import, export and merge
//!
//! Records are read from and written to Excel workbooks. The merge engine
//! reconciles a FROM record set against a TO record set, and the submit
//! pipeline turns workbook records into batches for the plant service,
//! resolving coded fields through relationship matrices on the way.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod matrix;
pub mod merge;
pub mod model;
pub mod service;
pub mod store;
pub mod submit;
