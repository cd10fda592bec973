//! File I/O for trajdiff: CSV traces, source manifests and report output.
//!
//! Loading is tolerant per quantity: every column that can be found is
//! returned as a signal, every one that cannot becomes a recorded failure.

mod domain;
mod error;
mod frame;
mod heading;
mod loader;
mod manifest;
mod reader;
mod writer;

pub use domain::ExperimentName;
pub use error::IoError;
pub use frame::FrameTransform;
pub use heading::{correct_heading, correct_headings};
pub use loader::{SourceLoader, TIME_ALIASES, column_aliases, load_sources};
pub use manifest::{RowFilter, SourceManifest, SourceSpec, TimeAxis};
pub use reader::{TraceReader, TraceTable};
pub use writer::ReportWriter;
