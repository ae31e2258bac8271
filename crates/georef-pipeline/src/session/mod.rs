//! Georeferencing session framework.
//!
//! The session is a mutable state container that replaces process-wide
//! globals: it owns the reference set and image metadata and is passed to
//! every operation by reference.
//!
//! ```ignore
//! use georef_pipeline::session::GeorefSession;
//!
//! let mut session = GeorefSession::new();
//! session.set_image(ImageInfo::new(1024, 768));
//! session.import_csv(file)?;
//!
//! let prefill = session.estimate_real(clicked);
//! let id = session.add_point(clicked, confirmed_real)?;
//!
//! let json = session.to_json()?;
//! ```

mod georef_session;
pub mod types;

pub use georef_session::GeorefSession;
pub use types::{LogEntry, SessionMetadata};
