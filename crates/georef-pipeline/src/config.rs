//! Session configuration.
//!
//! All fields have defaults, so a partial JSON file (or `{}`) is a valid
//! configuration.

use anyhow::{ensure, Result};
use georef_linear::AffineSolveOptions;
use serde::{Deserialize, Serialize};

/// Column names read by [`import_csv`](crate::import_csv).
///
/// Defaults match the spreadsheets produced by the field survey template,
/// including its misspelled `coulmn[pixel]` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportColumns {
    pub image_x: String,
    pub image_y: String,
    pub real_x: String,
    pub real_y: String,
}

impl Default for ImportColumns {
    fn default() -> Self {
        Self {
            image_x: "coulmn[pixel]".to_string(),
            image_y: "row[pixel]".to_string(),
            real_x: "Longitude [DD]".to_string(),
            real_y: "Latitude [DD]".to_string(),
        }
    }
}

/// Column names written by [`export_csv`](crate::export_csv).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportColumns {
    pub image_x: String,
    pub image_y: String,
    pub real_x: String,
    pub real_y: String,
}

impl Default for ExportColumns {
    fn default() -> Self {
        Self {
            image_x: "imageX".to_string(),
            image_y: "imageY".to_string(),
            real_x: "realX".to_string(),
            real_y: "realY".to_string(),
        }
    }
}

impl ExportColumns {
    pub fn header(&self) -> [&str; 4] {
        [&self.image_x, &self.image_y, &self.real_x, &self.real_y]
    }
}

/// Top-level configuration of a [`GeorefSession`](crate::GeorefSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeorefConfig {
    pub import: ImportColumns,
    pub export: ExportColumns,
    pub solver: AffineSolveOptions,
    /// Suggested file name for exported selections.
    pub export_file_name: String,
}

impl Default for GeorefConfig {
    fn default() -> Self {
        Self {
            import: ImportColumns::default(),
            export: ExportColumns::default(),
            solver: AffineSolveOptions::default(),
            export_file_name: "selected_points.csv".to_string(),
        }
    }
}

impl GeorefConfig {
    /// Reject configurations that cannot work.
    ///
    /// # Errors
    ///
    /// Returns an error for empty column names, duplicated import columns or
    /// a negative/non-finite degeneracy threshold.
    pub fn validate(&self) -> Result<()> {
        let import = [
            &self.import.image_x,
            &self.import.image_y,
            &self.import.real_x,
            &self.import.real_y,
        ];
        for (i, name) in import.iter().enumerate() {
            ensure!(!name.trim().is_empty(), "import column {} has an empty name", i);
            ensure!(
                !import[..i].contains(name),
                "import column '{}' is listed twice",
                name
            );
        }
        ensure!(
            self.export.header().iter().all(|h| !h.trim().is_empty()),
            "export column names must not be empty"
        );
        ensure!(
            self.solver.min_conditioned_det.is_finite() && self.solver.min_conditioned_det >= 0.0,
            "min_conditioned_det must be a non-negative number, got {}",
            self.solver.min_conditioned_det
        );
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
