//! Difficulty presets and their goals. The catalog is read-only for the whole application: it is
//! loaded from a json resource and only ever consulted for goal definitions.

use std::{
    collections::HashSet,
    fmt::Display,
    io::ErrorKind,
    path::PathBuf,
};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Catalog shipped with the binary. Used when no catalog file is configured.
const BUNDLED_CATALOG: &str = include_str!("../../levels.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("difficulty catalog {0:?} does not exist")]
    Missing(PathBuf),
    #[error("failed to read difficulty catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("difficulty catalog {origin} is malformed: {source}")]
    Malformed {
        origin: String,
        source: serde_json::Error,
    },
    #[error("difficulty catalog is invalid: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Week => write!(f, "week"),
        }
    }
}

/// Whether the goal is something to reach or something to stay under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalKind {
    Target,
    Limit,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawGoal")]
pub struct Goal {
    pub kind: GoalKind,
    pub target: f64,
    pub unit: String,
    pub period: Period,
}

impl Goal {
    /// Checks a period total against the goal.
    pub fn is_satisfied_by(&self, total: f64) -> bool {
        match self.kind {
            GoalKind::Target => total >= self.target,
            GoalKind::Limit => total <= self.target,
        }
    }
}

impl Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            GoalKind::Target => write!(f, "{}+ {} per {}", self.target, self.unit, self.period),
            GoalKind::Limit => write!(f, "<{} {} per {}", self.target, self.unit, self.period),
        }
    }
}

#[derive(Deserialize)]
struct RawGoal {
    target: Option<f64>,
    limit: Option<f64>,
    unit: String,
    #[serde(default)]
    period: Period,
}

impl TryFrom<RawGoal> for Goal {
    type Error = String;

    fn try_from(raw: RawGoal) -> Result<Self, Self::Error> {
        let (kind, target) = match (raw.target, raw.limit) {
            (Some(target), None) => (GoalKind::Target, target),
            (None, Some(limit)) => (GoalKind::Limit, limit),
            _ => return Err("a goal needs exactly one of `target` or `limit`".into()),
        };
        if !target.is_finite() || target < 0. {
            return Err(format!("goal value {target} must be a non-negative number"));
        }
        Ok(Goal {
            kind,
            target,
            unit: raw.unit,
            period: raw.period,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DifficultyPreset {
    pub id: String,
    pub goals: IndexMap<String, Goal>,
}

impl DifficultyPreset {
    /// Activities that can be logged under this preset, in catalog order.
    pub fn activities(&self) -> impl Iterator<Item = &str> {
        self.goals.keys().map(String::as_str)
    }

    pub fn goal(&self, activity: &str) -> Option<&Goal> {
        self.goals.get(activity)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Catalog {
    #[serde(rename = "difficulty_presets")]
    presets: Vec<DifficultyPreset>,
}

impl Catalog {
    pub fn from_json(origin: impl Into<String>, json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|source| CatalogError::Malformed {
                origin: origin.into(),
                source,
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.presets.is_empty() {
            return Err(CatalogError::Invalid("no difficulty presets defined".into()));
        }
        let mut seen = HashSet::new();
        for preset in &self.presets {
            if preset.id.trim().is_empty() {
                return Err(CatalogError::Invalid("preset id can't be empty".into()));
            }
            if !seen.insert(preset.id.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "preset id `{}` is defined twice",
                    preset.id
                )));
            }
            if preset.goals.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "preset `{}` has no goals",
                    preset.id
                )));
            }
        }
        Ok(())
    }

    pub fn presets(&self) -> &[DifficultyPreset] {
        &self.presets
    }

    pub fn find(&self, id: &str) -> Option<&DifficultyPreset> {
        self.presets.iter().find(|preset| preset.id == id)
    }
}

/// Where the catalog comes from. The catalog is re-read every time a flow needs it, so a broken
/// file only aborts that flow.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Bundled,
    File(PathBuf),
}

impl CatalogSource {
    /// Explicit path wins, then a `levels.json` in the application directory, then the bundled
    /// catalog.
    pub fn resolve(explicit: Option<PathBuf>, application_dir: &std::path::Path) -> Self {
        if let Some(path) = explicit {
            return CatalogSource::File(path);
        }
        let local = application_dir.join("levels.json");
        if local.exists() {
            CatalogSource::File(local)
        } else {
            CatalogSource::Bundled
        }
    }

    pub fn load(&self) -> Result<Catalog, CatalogError> {
        match self {
            CatalogSource::Bundled => Catalog::from_json("<bundled>", BUNDLED_CATALOG),
            CatalogSource::File(path) => {
                debug!("Loading catalog from {path:?}");
                let json = std::fs::read_to_string(path).map_err(|source| {
                    if source.kind() == ErrorKind::NotFound {
                        CatalogError::Missing(path.clone())
                    } else {
                        CatalogError::Io {
                            path: path.clone(),
                            source,
                        }
                    }
                })?;
                Catalog::from_json(path.display().to_string(), &json)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{Catalog, CatalogError, CatalogSource, GoalKind, Period};

    #[test]
    fn test_bundled_catalog_is_valid() -> Result<()> {
        let catalog = CatalogSource::Bundled.load()?;
        assert_eq!(catalog.presets().len(), 3);
        for preset in catalog.presets() {
            let activities = preset.activities().collect::<Vec<_>>();
            assert_eq!(activities, vec!["sleep", "fitness", "screen_time"]);
        }
        let pilot = catalog.find("pilot").unwrap();
        assert_eq!(pilot.goal("screen_time").unwrap().kind, GoalKind::Limit);
        assert_eq!(pilot.goal("fitness").unwrap().period, Period::Week);
        Ok(())
    }

    #[test]
    fn test_activity_set_comes_from_goals() -> Result<()> {
        let catalog = Catalog::from_json(
            "test",
            r#"{"difficulty_presets": [
                {"id": "custom", "goals": {
                    "reading": {"target": 20, "unit": "pages"},
                    "alcohol": {"limit": 2, "unit": "drinks", "period": "week"}
                }}
            ]}"#,
        )?;
        let preset = catalog.find("custom").unwrap();
        assert_eq!(
            preset.activities().collect::<Vec<_>>(),
            vec!["reading", "alcohol"]
        );
        assert_eq!(preset.goal("reading").unwrap().period, Period::Day);
        Ok(())
    }

    #[test]
    fn test_goal_satisfaction() -> Result<()> {
        let catalog = CatalogSource::Bundled.load()?;
        let cadet = catalog.find("cadet").unwrap();
        assert!(cadet.goal("sleep").unwrap().is_satisfied_by(7.));
        assert!(!cadet.goal("sleep").unwrap().is_satisfied_by(6.5));
        assert!(cadet.goal("screen_time").unwrap().is_satisfied_by(5.));
        assert!(!cadet.goal("screen_time").unwrap().is_satisfied_by(5.5));
        Ok(())
    }

    #[test]
    fn test_invalid_catalogs_are_rejected() {
        let duplicate = r#"{"difficulty_presets": [
            {"id": "a", "goals": {"sleep": {"target": 7, "unit": "hours"}}},
            {"id": "a", "goals": {"sleep": {"target": 8, "unit": "hours"}}}
        ]}"#;
        assert!(matches!(
            Catalog::from_json("test", duplicate),
            Err(CatalogError::Invalid(_))
        ));

        let both = r#"{"difficulty_presets": [
            {"id": "a", "goals": {"sleep": {"target": 7, "limit": 9, "unit": "hours"}}}
        ]}"#;
        assert!(matches!(
            Catalog::from_json("test", both),
            Err(CatalogError::Malformed { .. })
        ));

        assert!(matches!(
            Catalog::from_json("test", r#"{"difficulty_presets": []}"#),
            Err(CatalogError::Invalid(_))
        ));

        // An empty id would be saved into a record that never counts as set up.
        let unnamed = r#"{"difficulty_presets": [
            {"id": " ", "goals": {"sleep": {"target": 7, "unit": "hours"}}}
        ]}"#;
        assert!(matches!(
            Catalog::from_json("test", unnamed),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_file_source() -> Result<()> {
        let dir = tempdir()?;
        let missing = CatalogSource::File(dir.path().join("levels.json"));
        assert!(matches!(missing.load(), Err(CatalogError::Missing(_))));

        assert!(matches!(
            CatalogSource::resolve(None, dir.path()),
            CatalogSource::Bundled
        ));

        std::fs::write(dir.path().join("levels.json"), "not json")?;
        let source = CatalogSource::resolve(None, dir.path());
        assert!(matches!(source, CatalogSource::File(_)));
        assert!(matches!(source.load(), Err(CatalogError::Malformed { .. })));
        Ok(())
    }
}
