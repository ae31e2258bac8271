//! Reference points and the ordered set that stores them.
//!
//! A [`ReferencePoint`] is one user-confirmed correspondence between a pixel
//! and a real-world location. The [`ReferenceSet`] keeps them in insertion
//! order; only the first [`MIN_REFERENCE_POINTS`] entries define the affine
//! transform.
//!
//! Positional indices shift on delete. Every point also carries a stable
//! [`PointId`] that survives deletes of other points, so hosts holding a
//! long-lived reference (e.g. "the point currently being edited") should keep
//! the id and re-resolve the index with [`ReferenceSet::index_of`].

use super::current_timestamp;
use crate::{ImagePt, RealPt};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Number of reference points consumed by the affine solve.
pub const MIN_REFERENCE_POINTS: usize = 3;

/// Errors produced by [`ReferenceSet`] mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    #[error("non-finite coordinate in pair {image} -> {real}")]
    InvalidInput { image: ImagePt, real: RealPt },
    #[error("index {index} out of range for {len} reference points")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("unknown reference point {0}")]
    UnknownPoint(PointId),
    #[error("reference point {0} appears more than once")]
    DuplicateId(PointId),
}

/// Opaque, stable identifier of a reference point.
///
/// Assigned at creation and never reused within a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointId(pub(crate) u64);

impl PointId {
    /// Get the raw ID value (for display/debugging).
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PointId({})", self.0)
    }
}

/// One calibration pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub id: PointId,
    /// Pixel location on the image.
    pub image: ImagePt,
    /// Matching real-world location.
    pub real: RealPt,
    /// Unix timestamp (seconds) when the pair was created.
    pub created_at: u64,
}

/// Outcome of [`ReferenceSet::bulk_load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkLoadReport {
    /// Number of pairs appended.
    pub loaded: usize,
    /// Positions (within the input batch) of pairs rejected as non-finite.
    pub skipped: Vec<usize>,
}

/// Ordered collection of reference points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredReferenceSet")]
pub struct ReferenceSet {
    points: Vec<ReferencePoint>,
    next_id: u64,
}

/// Serialized form. Duplicate ids are rejected and `next_id` is recomputed on
/// load so ids stay unique even when the file was edited by hand.
#[derive(Deserialize)]
struct StoredReferenceSet {
    points: Vec<ReferencePoint>,
    #[serde(default)]
    next_id: u64,
}

impl TryFrom<StoredReferenceSet> for ReferenceSet {
    type Error = ReferenceError;

    fn try_from(stored: StoredReferenceSet) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(stored.points.len());
        if let Some(dup) = stored.points.iter().find(|p| !seen.insert(p.id)) {
            return Err(ReferenceError::DuplicateId(dup.id));
        }
        let after_max = stored
            .points
            .iter()
            .map(|p| p.id.0 + 1)
            .max()
            .unwrap_or(0);
        Ok(Self {
            points: stored.points,
            next_id: stored.next_id.max(after_max),
        })
    }
}

fn validate(image: ImagePt, real: RealPt) -> Result<(), ReferenceError> {
    if image.is_finite() && real.is_finite() {
        Ok(())
    } else {
        Err(ReferenceError::InvalidInput { image, real })
    }
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in insertion order.
    pub fn as_slice(&self) -> &[ReferencePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferencePoint> {
        self.points.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ReferencePoint> {
        self.points.get(index)
    }

    /// `true` once enough points exist for the affine solve.
    pub fn has_transform_basis(&self) -> bool {
        self.points.len() >= MIN_REFERENCE_POINTS
    }

    fn next_point(&mut self, image: ImagePt, real: RealPt) -> ReferencePoint {
        let id = PointId(self.next_id);
        self.next_id += 1;
        ReferencePoint {
            id,
            image,
            real,
            created_at: current_timestamp(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), ReferenceError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(ReferenceError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }

    /// Append a new pair and return its index.
    ///
    /// # Errors
    ///
    /// [`ReferenceError::InvalidInput`] if any component is NaN or infinite.
    pub fn add(&mut self, image: ImagePt, real: RealPt) -> Result<usize, ReferenceError> {
        validate(image, real)?;
        let point = self.next_point(image, real);
        debug!("reference point {} added: {} -> {}", point.id, image, real);
        self.points.push(point);
        Ok(self.points.len() - 1)
    }

    /// Replace image and real coordinates of the point at `index`.
    ///
    /// The point keeps its id and creation time.
    pub fn edit(
        &mut self,
        index: usize,
        image: ImagePt,
        real: RealPt,
    ) -> Result<(), ReferenceError> {
        self.check_index(index)?;
        validate(image, real)?;
        let point = &mut self.points[index];
        point.image = image;
        point.real = real;
        Ok(())
    }

    /// Remove the point at `index`; later points shift down by one.
    pub fn delete(&mut self, index: usize) -> Result<ReferencePoint, ReferenceError> {
        self.check_index(index)?;
        Ok(self.points.remove(index))
    }

    /// Points at `indices`, in set order. Indices that do not exist are
    /// skipped.
    pub fn select<I>(&self, indices: I) -> Vec<ReferencePoint>
    where
        I: IntoIterator<Item = usize>,
    {
        let wanted: HashSet<usize> = indices.into_iter().collect();
        self.points
            .iter()
            .enumerate()
            .filter(|(i, _)| wanted.contains(i))
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Append many pairs at once. Non-finite pairs are skipped and reported;
    /// the batch itself never fails.
    pub fn bulk_load<I>(&mut self, pairs: I) -> BulkLoadReport
    where
        I: IntoIterator<Item = (ImagePt, RealPt)>,
    {
        let mut report = BulkLoadReport::default();
        for (pos, (image, real)) in pairs.into_iter().enumerate() {
            match self.add(image, real) {
                Ok(_) => report.loaded += 1,
                Err(_) => report.skipped.push(pos),
            }
        }
        if !report.skipped.is_empty() {
            debug!(
                "bulk load: {} loaded, {} skipped",
                report.loaded,
                report.skipped.len()
            );
        }
        report
    }

    /// Remove every point. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Id-based access
    // ─────────────────────────────────────────────────────────────────────────

    /// Current index of the point with `id`.
    pub fn index_of(&self, id: PointId) -> Option<usize> {
        self.points.iter().position(|p| p.id == id)
    }

    pub fn get_by_id(&self, id: PointId) -> Option<&ReferencePoint> {
        self.points.iter().find(|p| p.id == id)
    }

    /// Id of the point at `index`.
    pub fn id_at(&self, index: usize) -> Option<PointId> {
        self.points.get(index).map(|p| p.id)
    }

    pub fn edit_by_id(
        &mut self,
        id: PointId,
        image: ImagePt,
        real: RealPt,
    ) -> Result<(), ReferenceError> {
        let index = self
            .index_of(id)
            .ok_or(ReferenceError::UnknownPoint(id))?;
        self.edit(index, image, real)
    }

    pub fn delete_by_id(&mut self, id: PointId) -> Result<ReferencePoint, ReferenceError> {
        let index = self
            .index_of(id)
            .ok_or(ReferenceError::UnknownPoint(id))?;
        self.delete(index)
    }

    /// Points whose id is in `ids`, in set order. Unknown ids are skipped.
    pub fn select_ids<I>(&self, ids: I) -> Vec<ReferencePoint>
    where
        I: IntoIterator<Item = PointId>,
    {
        let wanted: HashSet<PointId> = ids.into_iter().collect();
        self.points
            .iter()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a ReferencePoint;
    type IntoIter = std::slice::Iter<'a, ReferencePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
