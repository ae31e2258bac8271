//! Host-facing georeferencing workflow.
//!
//! This crate ties the core types and the affine solver into a session that
//! a UI or CLI can drive:
//!
//! ```no_run
//! use georef_core::{ImageInfo, ImagePt, RealPt};
//! use georef_pipeline::GeorefSession;
//! # fn main() -> anyhow::Result<()> {
//! let mut session = GeorefSession::new();
//! session.set_image(ImageInfo::new(1024, 768));
//! session.import_csv(std::fs::File::open("points.csv")?)?;
//!
//! if let Some(real) = session.estimate_real(ImagePt::new(512.0, 384.0)) {
//!     println!("centre of the image is at {real}");
//! }
//!
//! let ids: Vec<_> = session.points().iter().map(|p| p.id).collect();
//! session.export_csv(std::fs::File::create("selected_points.csv")?, ids)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod session;
pub mod tabular;

pub use crate::config::{ExportColumns, GeorefConfig, ImportColumns};
pub use crate::session::{GeorefSession, LogEntry, SessionMetadata};
pub use crate::tabular::{export_csv, import_csv, read_pairs, CsvPair, ImportReport};
