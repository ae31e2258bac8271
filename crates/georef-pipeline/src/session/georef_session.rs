//! Georeferencing session container.
//!
//! A [`GeorefSession`] owns everything a host needs between user actions:
//! the loaded image's metadata, the reference point set, the id of the point
//! being edited (if any), configuration and an operation log. Transforms are
//! never stored; they are re-solved from the current first three points on
//! every request.

use crate::config::GeorefConfig;
use crate::tabular::{self, ImportReport};
use anyhow::{bail, Context, Result};
use georef_core::{
    ImageInfo, ImagePt, PointId, RealPt, ReferenceError, ReferencePoint, ReferenceSet,
};
use georef_linear::{point_residuals, AffineError, AffineSolver, AffineTransform, PointResidual};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use super::types::{LogEntry, SessionMetadata};

/// A georeferencing session with mutable state.
///
/// # Example
///
/// ```
/// use georef_core::{ImagePt, RealPt};
/// use georef_pipeline::GeorefSession;
/// # fn main() -> anyhow::Result<()> {
/// let mut session = GeorefSession::new();
/// session.add_point(ImagePt::new(10.0, 10.0), RealPt::new(0.0, 0.0))?;
/// session.add_point(ImagePt::new(110.0, 10.0), RealPt::new(100.0, 0.0))?;
/// assert!(session.estimate_real(ImagePt::new(60.0, 60.0)).is_none());
///
/// session.add_point(ImagePt::new(10.0, 110.0), RealPt::new(0.0, 100.0))?;
/// let real = session.estimate_real(ImagePt::new(60.0, 60.0)).unwrap();
/// assert!((real.x - 50.0).abs() < 1e-9);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeorefSession {
    /// Session metadata (schema version, timestamps, description).
    pub metadata: SessionMetadata,

    /// Configuration (always present, defaults if not explicitly set).
    config: GeorefConfig,

    /// Loaded image. `None` until the host reports one.
    #[serde(default)]
    image: Option<ImageInfo>,

    /// Calibration pairs.
    points: ReferenceSet,

    /// Point currently being edited.
    #[serde(default)]
    editing: Option<PointId>,

    /// Operation log (lightweight audit trail).
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl GeorefSession {
    /// Schema version written by [`to_json`](Self::to_json).
    pub const SCHEMA_VERSION: u32 = 1;

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    pub fn new() -> Self {
        Self {
            metadata: SessionMetadata::new(Self::SCHEMA_VERSION),
            config: GeorefConfig::default(),
            image: None,
            points: ReferenceSet::new(),
            editing: None,
            log: Vec::new(),
        }
    }

    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            metadata: SessionMetadata::with_description(Self::SCHEMA_VERSION, description),
            ..Self::new()
        }
    }

    /// Create a session with a validated configuration.
    pub fn with_config(config: GeorefConfig) -> Result<Self> {
        let mut session = Self::new();
        session.set_config(config)?;
        Ok(session)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration and image
    // ─────────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &GeorefConfig {
        &self.config
    }

    /// # Errors
    ///
    /// Returns an error if [`GeorefConfig::validate`] fails.
    pub fn set_config(&mut self, config: GeorefConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.metadata.touch();
        Ok(())
    }

    /// Record the dimensions of a newly loaded image.
    ///
    /// Existing points are kept; points that fall outside the new image are
    /// reported with a warning.
    pub fn set_image(&mut self, image: ImageInfo) {
        let outside = self
            .points
            .iter()
            .filter(|p| !image.contains(&p.image))
            .count();
        if outside > 0 {
            warn!(
                "{} reference point(s) lie outside the {}x{} image",
                outside, image.width, image.height
            );
        }
        info!("image set: {}x{}", image.width, image.height);
        self.log.push(LogEntry::success_with_notes(
            "set_image",
            format!("{}x{}", image.width, image.height),
        ));
        self.image = Some(image);
        self.metadata.touch();
    }

    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reference points
    // ─────────────────────────────────────────────────────────────────────────

    pub fn points(&self) -> &ReferenceSet {
        &self.points
    }

    /// Warn when `image` falls outside the loaded raster. Returns whether it
    /// did.
    fn warn_if_outside(&self, image: &ImagePt) -> bool {
        match &self.image {
            Some(info) if !info.contains(image) => {
                warn!(
                    "{} is outside the {}x{} image",
                    image, info.width, info.height
                );
                true
            }
            _ => false,
        }
    }

    /// Append a calibration pair and return its stable id.
    pub fn add_point(&mut self, image: ImagePt, real: RealPt) -> Result<PointId> {
        self.warn_if_outside(&image);
        let result = self.points.add(image, real);
        let index = self.record("add_point", result)?;
        let id = self
            .points
            .id_at(index)
            .context("freshly added point is missing")?;
        self.log
            .push(LogEntry::success_with_notes("add_point", id.to_string()));
        self.metadata.touch();
        Ok(id)
    }

    /// Replace both coordinates of the point `id`.
    pub fn edit_point(&mut self, id: PointId, image: ImagePt, real: RealPt) -> Result<()> {
        self.warn_if_outside(&image);
        let result = self.points.edit_by_id(id, image, real);
        self.record("edit_point", result)?;
        self.log
            .push(LogEntry::success_with_notes("edit_point", id.to_string()));
        self.metadata.touch();
        Ok(())
    }

    /// Replace only the real-world coordinate of the point `id`.
    pub fn set_real(&mut self, id: PointId, real: RealPt) -> Result<()> {
        let image = self
            .points
            .get_by_id(id)
            .map(|p| p.image)
            .with_context(|| format!("unknown reference point {}", id))?;
        self.edit_point(id, image, real)
    }

    /// Remove the point `id`. Cancels an edit of that point.
    pub fn delete_point(&mut self, id: PointId) -> Result<ReferencePoint> {
        let result = self.points.delete_by_id(id);
        let removed = self.record("delete_point", result)?;
        self.after_delete(&removed);
        Ok(removed)
    }

    /// Remove the point at a display index. Cancels an edit of that point.
    pub fn delete_at(&mut self, index: usize) -> Result<ReferencePoint> {
        let result = self.points.delete(index);
        let removed = self.record("delete_point", result)?;
        self.after_delete(&removed);
        Ok(removed)
    }

    /// Log a failed point mutation and convert the error.
    fn record<T>(&mut self, operation: &str, result: Result<T, ReferenceError>) -> Result<T> {
        result.map_err(|err| {
            self.log.push(LogEntry::failure(operation, err.to_string()));
            err.into()
        })
    }

    fn after_delete(&mut self, removed: &ReferencePoint) {
        if self.editing == Some(removed.id) {
            debug!("edit of {} cancelled by delete", removed.id);
            self.editing = None;
        }
        self.log.push(LogEntry::success_with_notes(
            "delete_point",
            removed.id.to_string(),
        ));
        self.metadata.touch();
    }

    /// Remove all points and cancel any edit. Image metadata is kept.
    pub fn clear_points(&mut self) {
        self.points.clear();
        self.editing = None;
        self.log.push(LogEntry::success("clear_points"));
        self.metadata.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edit mode
    // ─────────────────────────────────────────────────────────────────────────

    /// Start editing the point shown at `index`; returns its id.
    pub fn begin_edit(&mut self, index: usize) -> Result<PointId> {
        let Some(id) = self.points.id_at(index) else {
            bail!(
                "cannot edit point {}: only {} reference points",
                index,
                self.points.len()
            );
        };
        self.editing = Some(id);
        Ok(id)
    }

    /// The point being edited, if it still exists.
    pub fn editing(&self) -> Option<&ReferencePoint> {
        self.editing.and_then(|id| self.points.get_by_id(id))
    }

    /// Store a new real-world value for the edited point and leave edit mode.
    ///
    /// The image location of the edited point is kept.
    pub fn finish_edit(&mut self, real: RealPt) -> Result<PointId> {
        let Some(id) = self.editing else {
            bail!("no point is being edited");
        };
        self.set_real(id, real)?;
        self.editing = None;
        Ok(id)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transform
    // ─────────────────────────────────────────────────────────────────────────

    /// Solve the affine transform from the current first three points.
    pub fn transform(&self) -> Result<AffineTransform, AffineError> {
        AffineSolver::solve(self.points.as_slice(), &self.config.solver)
    }

    /// Real-world estimate for an image location (pre-fill for new points).
    ///
    /// `None` while the transform is unavailable or degenerate.
    pub fn estimate_real(&self, image: ImagePt) -> Option<RealPt> {
        self.transform().ok().map(|t| t.image_to_real(image))
    }

    /// Image location of a real-world point.
    pub fn estimate_image(&self, real: RealPt) -> Option<ImagePt> {
        self.transform().ok().map(|t| t.real_to_image(real))
    }

    /// Residuals of every stored point against the current transform.
    pub fn residuals(&self) -> Result<Vec<PointResidual>, AffineError> {
        let t = self.transform()?;
        Ok(point_residuals(&t, self.points.as_slice()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Import / export
    // ─────────────────────────────────────────────────────────────────────────

    /// Append points from a CSV document using the configured columns.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<ImportReport> {
        let before = self.points.len();
        match tabular::import_csv(reader, &self.config.import, &mut self.points) {
            Ok(report) => {
                let outside = self.points.as_slice()[before..]
                    .iter()
                    .filter(|p| self.warn_if_outside(&p.image))
                    .count();
                let mut notes = format!("{} of {} rows loaded", report.loaded, report.rows);
                if outside > 0 {
                    notes.push_str(&format!(", {} outside image", outside));
                }
                self.log
                    .push(LogEntry::success_with_notes("import_csv", notes));
                self.metadata.touch();
                Ok(report)
            }
            Err(err) => {
                self.log
                    .push(LogEntry::failure("import_csv", format!("{:#}", err)));
                Err(err)
            }
        }
    }

    /// Write the points with the given ids as CSV. Unknown ids are skipped.
    /// Returns the number of rows written.
    pub fn export_csv<W, I>(&self, writer: W, ids: I) -> Result<usize>
    where
        W: Write,
        I: IntoIterator<Item = PointId>,
    {
        let selected = self.points.select_ids(ids);
        tabular::export_csv(writer, &self.config.export, &selected)?;
        Ok(selected.len())
    }

    /// Write the points at the given display indices as CSV.
    pub fn export_csv_indices<W, I>(&self, writer: W, indices: I) -> Result<usize>
    where
        W: Write,
        I: IntoIterator<Item = usize>,
    {
        let selected = self.points.select(indices);
        tabular::export_csv(writer, &self.config.export, &selected)?;
        Ok(selected.len())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize session to JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Deserialize session from JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Deserialization fails
    /// - Schema version is newer than supported
    /// - The stored configuration is invalid
    pub fn from_json(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json)?;

        if session.metadata.schema_version > Self::SCHEMA_VERSION {
            bail!(
                "session schema version {} is newer than supported version {}",
                session.metadata.schema_version,
                Self::SCHEMA_VERSION
            );
        }
        session.config.validate()?;

        Ok(session)
    }
}

impl Default for GeorefSession {
    fn default() -> Self {
        Self::new()
    }
}
