use std::{fs, path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_INPUT_PATH: &str = "input.png";
pub const DEFAULT_SNAPSHOT_DIR: &str = "output";

pub const NUM_POLYGONS: usize = 100;
pub const NUM_POINTS: usize = 10;
pub const MIN_POINTS_PER_POLYGON: usize = 3;

pub const GENERATIONS: u64 = 100_000;
pub const SNAPSHOT_INTERVAL: u64 = 500;
pub const PROGRESS_INTERVAL: u64 = 100;
pub const PREVIEW_INTERVAL: u64 = 100;

// mutation roulette: category is drawn from [0, CATEGORY_SPAN)
pub const CATEGORY_SPAN: f64 = 2.8;
pub const COLOR_CATEGORY_LIMIT: f64 = 1.0;
pub const POINT_CATEGORY_LIMIT: f64 = 2.0;
// the remainder [POINT_CATEGORY_LIMIT, CATEGORY_SPAN) swaps layers

// color channel thresholds, reusing the category draw (already in [0, 1))
pub const ALPHA_THRESHOLD: f64 = 0.25;
pub const RED_THRESHOLD: f64 = 0.50;
pub const GREEN_THRESHOLD: f64 = 0.75;
pub const MIN_VISIBLE_ALPHA: f64 = 0.01;

// point axis threshold, reusing the category draw (already in [1, 2))
pub const X_AXIS_THRESHOLD: f64 = 1.5;

// magnitude is drawn from [0, MAGNITUDE_SPAN); below REFINE_LIMIT nudges, above randomizes
pub const MAGNITUDE_SPAN: f64 = 2.0;
pub const REFINE_LIMIT: f64 = 1.0;

pub const COLOR_NUDGE: f64 = 0.1;
pub const POINT_NUDGE_DIVISOR: f64 = 10.0;

/// Run configuration. Every field has a default so a partial JSON file is enough,
/// but unknown keys are rejected.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub input_path: PathBuf,
    pub num_polygons: usize,
    #[serde(alias = "num_points_per_polygon")]
    pub num_points: usize,
    pub generation_budget: u64,
    #[serde(alias = "time_budget")]
    pub time_budget_secs: Option<f64>,
    /// 0 disables snapshots
    pub snapshot_interval: u64,
    pub snapshot_dir: PathBuf,
    pub progress_interval: u64,
    pub show_live_preview: bool,
    pub preview_interval: u64,
    pub seed: Option<u64>,
    pub dump_path: Option<PathBuf>,
    pub resume_from: Option<PathBuf>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            num_polygons: NUM_POLYGONS,
            num_points: NUM_POINTS,
            generation_budget: GENERATIONS,
            time_budget_secs: None,
            snapshot_interval: SNAPSHOT_INTERVAL,
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            progress_interval: PROGRESS_INTERVAL,
            show_live_preview: false,
            preview_interval: PREVIEW_INTERVAL,
            seed: None,
            dump_path: None,
            resume_from: None,
            max_width: None,
            max_height: None,
        }
    }
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Settings> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// `None` for an unbounded run, or for a budget `validate` would reject.
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_polygons == 0 {
            return Err(Error::settings("num_polygons must be at least 1"));
        }
        if self.num_points < MIN_POINTS_PER_POLYGON {
            return Err(Error::settings(format!(
                "num_points must be at least {MIN_POINTS_PER_POLYGON}, got {}",
                self.num_points
            )));
        }
        if self.progress_interval == 0 {
            return Err(Error::settings("progress_interval must be at least 1"));
        }
        if self.show_live_preview && self.preview_interval == 0 {
            return Err(Error::settings("preview_interval must be at least 1"));
        }
        if let Some(secs) = self.time_budget_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(Error::settings(format!(
                    "time_budget_secs must be a positive number of seconds, got {secs}"
                )));
            }
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(Error::settings(format!(
                    "time_budget_secs {secs} is too large"
                )));
            }
        }
        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(Error::settings("max_width/max_height must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.num_polygons, 100);
        assert_eq!(settings.num_points, 10);
        assert_eq!(settings.snapshot_interval, 500);
        assert!(settings.time_budget().is_none());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "num_polygons": 50, "time_budget_secs": 2.5 }"#).unwrap();
        assert_eq!(settings.num_polygons, 50);
        assert_eq!(settings.num_points, NUM_POINTS);
        assert_eq!(settings.time_budget(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn rejects_degenerate_shapes() {
        let mut settings = Settings::default();
        settings.num_polygons = 0;
        assert!(matches!(settings.validate(), Err(Error::Settings(_))));

        let mut settings = Settings::default();
        settings.num_points = 2;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_time_budget() {
        let mut settings = Settings::default();
        settings.time_budget_secs = Some(0.0);
        assert!(settings.validate().is_err());
        settings.time_budget_secs = Some(f64::NAN);
        assert!(settings.validate().is_err());
        settings.time_budget_secs = Some(1e30);
        assert!(matches!(settings.validate(), Err(Error::Settings(_))));
        assert_eq!(settings.time_budget(), None);
    }

    #[test]
    fn accepts_long_time_budgets() {
        let mut settings = Settings::default();
        settings.time_budget_secs = Some(86_400.0 * 365.0);
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.time_budget(),
            Some(Duration::from_secs(86_400 * 365))
        );
    }

    #[test]
    fn option_names_and_aliases_parse() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "num_polygons": 7,
                "num_points_per_polygon": 4,
                "generation_budget": 3,
                "time_budget": 1.5,
                "show_live_preview": true
            }"#,
        )
        .unwrap();
        assert_eq!(settings.num_polygons, 7);
        assert_eq!(settings.num_points, 4);
        assert_eq!(settings.generation_budget, 3);
        assert_eq!(settings.time_budget_secs, Some(1.5));
        assert!(settings.show_live_preview);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = serde_json::from_str::<Settings>(r#"{ "numPolygons": 7 }"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "num_polygon": 7 }"#).unwrap();
        assert!(matches!(Settings::from_file(&path), Err(Error::Json(_))));
    }

    #[test]
    fn category_bounds_partition_the_roulette() {
        assert!(COLOR_CATEGORY_LIMIT < POINT_CATEGORY_LIMIT);
        assert!(POINT_CATEGORY_LIMIT < CATEGORY_SPAN);
        assert!(ALPHA_THRESHOLD < RED_THRESHOLD && RED_THRESHOLD < GREEN_THRESHOLD);
        assert!(GREEN_THRESHOLD < COLOR_CATEGORY_LIMIT);
    }
}
