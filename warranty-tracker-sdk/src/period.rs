use crate::error::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Manufacturing,
    Replacement,
    Maintenance1,
    Maintenance2,
}

impl PeriodKind {
    /// All kinds in evaluation order. `Maintenance2` comes after the period it is chained to.
    pub const ALL: [PeriodKind; 4] = [
        PeriodKind::Manufacturing,
        PeriodKind::Replacement,
        PeriodKind::Maintenance1,
        PeriodKind::Maintenance2,
    ];

    pub(crate) const fn index(self) -> usize {
        match self {
            PeriodKind::Manufacturing => 0,
            PeriodKind::Replacement => 1,
            PeriodKind::Maintenance1 => 2,
            PeriodKind::Maintenance2 => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Manufacturing => "manufacturing",
            PeriodKind::Replacement => "replacement",
            PeriodKind::Maintenance1 => "maintenance1",
            PeriodKind::Maintenance2 => "maintenance2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodKind::Manufacturing => "Manufacturing defect warranty",
            PeriodKind::Replacement => "Replacement warranty",
            PeriodKind::Maintenance1 => "Maintenance cycle 1",
            PeriodKind::Maintenance2 => "Maintenance cycle 2",
        }
    }

    /// The only anchor a valid schedule accepts for this kind.
    pub const fn anchor(self) -> Anchor {
        match self {
            PeriodKind::Maintenance2 => Anchor::EndOf {
                period: PeriodKind::Maintenance1,
            },
            _ => Anchor::Inspection,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Anchor {
    Inspection,
    EndOf { period: PeriodKind },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodDefinition {
    pub kind: PeriodKind,
    pub duration_days: u32,
    pub anchor: Anchor,
}

impl PeriodDefinition {
    pub const fn new(kind: PeriodKind, duration_days: u32) -> Self {
        Self {
            kind,
            duration_days,
            anchor: kind.anchor(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::days(i64::from(self.duration_days))
    }
}

pub const MANUFACTURING_DAYS: u32 = 180;
pub const REPLACEMENT_DAYS: u32 = 14;
pub const MAINTENANCE_CYCLE_DAYS: u32 = 180;

static STANDARD: Schedule = Schedule {
    definitions: [
        PeriodDefinition::new(PeriodKind::Manufacturing, MANUFACTURING_DAYS),
        PeriodDefinition::new(PeriodKind::Replacement, REPLACEMENT_DAYS),
        PeriodDefinition::new(PeriodKind::Maintenance1, MAINTENANCE_CYCLE_DAYS),
        PeriodDefinition::new(PeriodKind::Maintenance2, MAINTENANCE_CYCLE_DAYS),
    ],
};

/// The validated table of period definitions, indexed by [`PeriodKind`].
///
/// A `Schedule` can only be obtained through [`Schedule::standard`] or the
/// validating constructors, so every instance has one definition per kind,
/// non-zero durations and `maintenance2` chained to the end of `maintenance1`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Schedule {
    definitions: [PeriodDefinition; 4],
}

impl Default for Schedule {
    fn default() -> Self {
        STANDARD.clone()
    }
}

fn reject(reason: String) -> Error {
    warn!(%reason, "rejected warranty schedule");
    Error::InvalidSchedule(reason)
}

impl Schedule {
    pub fn standard() -> &'static Schedule {
        &STANDARD
    }

    pub fn new(definitions: impl IntoIterator<Item = PeriodDefinition>) -> Result<Self> {
        let mut slots: [Option<PeriodDefinition>; 4] = [None; 4];

        for def in definitions {
            if def.duration_days == 0 {
                return Err(reject(format!("{} has a zero-day duration", def.kind)));
            }
            if def.anchor != def.kind.anchor() {
                return Err(reject(format!(
                    "{} must be anchored to {:?}, got {:?}",
                    def.kind,
                    def.kind.anchor(),
                    def.anchor
                )));
            }
            let slot = &mut slots[def.kind.index()];
            if slot.is_some() {
                return Err(reject(format!("duplicate definition for {}", def.kind)));
            }
            *slot = Some(def);
        }

        let [Some(manufacturing), Some(replacement), Some(maintenance1), Some(maintenance2)] =
            slots
        else {
            let missing: Vec<&str> = PeriodKind::ALL
                .iter()
                .filter(|kind| slots[kind.index()].is_none())
                .map(|kind| kind.as_str())
                .collect();
            return Err(reject(format!("missing definition for {}", missing.join(", "))));
        };

        Ok(Self {
            definitions: [manufacturing, replacement, maintenance1, maintenance2],
        })
    }

    pub fn get(&self, kind: PeriodKind) -> &PeriodDefinition {
        &self.definitions[kind.index()]
    }

    /// Definitions in evaluation order.
    pub fn definitions(&self) -> &[PeriodDefinition] {
        &self.definitions
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let d = &config.durations;
        Self::new(PeriodKind::ALL.map(|kind| {
            let days = d.get(kind).unwrap_or_else(|| STANDARD.get(kind).duration_days);
            PeriodDefinition::new(kind, days)
        }))
    }

    pub fn to_config(&self) -> ScheduleConfig {
        let days = |kind| Some(self.get(kind).duration_days);
        ScheduleConfig {
            durations: DurationOverrides {
                manufacturing: days(PeriodKind::Manufacturing),
                replacement: days(PeriodKind::Replacement),
                maintenance1: days(PeriodKind::Maintenance1),
                maintenance2: days(PeriodKind::Maintenance2),
            },
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ScheduleConfig = toml::from_str(content)?;
        Self::from_config(&config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_config())?)
    }
}

/// On-disk form of a schedule. Only durations can be overridden.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub durations: DurationOverrides,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DurationOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturing: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance2: Option<u32>,
}

impl DurationOverrides {
    pub fn get(&self, kind: PeriodKind) -> Option<u32> {
        match kind {
            PeriodKind::Manufacturing => self.manufacturing,
            PeriodKind::Replacement => self.replacement,
            PeriodKind::Maintenance1 => self.maintenance1,
            PeriodKind::Maintenance2 => self.maintenance2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_schedule_durations() {
        let schedule = Schedule::standard();
        assert_eq!(schedule.get(PeriodKind::Manufacturing).duration_days, 180);
        assert_eq!(schedule.get(PeriodKind::Replacement).duration_days, 14);
        assert_eq!(schedule.get(PeriodKind::Maintenance1).duration_days, 180);
        assert_eq!(schedule.get(PeriodKind::Maintenance2).duration_days, 180);
        assert_eq!(
            schedule.get(PeriodKind::Maintenance2).anchor,
            Anchor::EndOf {
                period: PeriodKind::Maintenance1
            }
        );
        assert_eq!(Schedule::new(schedule.definitions().to_vec()).unwrap(), *schedule);
    }

    #[test]
    fn rejects_zero_duration() {
        let defs = PeriodKind::ALL.map(|kind| {
            let days = if kind == PeriodKind::Replacement { 0 } else { 30 };
            PeriodDefinition::new(kind, days)
        });
        let err = Schedule::new(defs).unwrap_err();
        assert!(matches!(err, Error::InvalidSchedule(msg) if msg.contains("replacement")));
    }

    #[test]
    fn rejects_unchained_maintenance2() {
        let mut defs = Schedule::standard().definitions().to_vec();
        defs[3].anchor = Anchor::Inspection;
        assert!(matches!(Schedule::new(defs), Err(Error::InvalidSchedule(_))));
    }

    #[test]
    fn rejects_missing_and_duplicate_definitions() {
        let defs = vec![
            PeriodDefinition::new(PeriodKind::Manufacturing, 180),
            PeriodDefinition::new(PeriodKind::Replacement, 14),
        ];
        let err = Schedule::new(defs).unwrap_err();
        assert!(matches!(err, Error::InvalidSchedule(msg) if msg.contains("maintenance1, maintenance2")));

        let mut defs = Schedule::standard().definitions().to_vec();
        defs.push(PeriodDefinition::new(PeriodKind::Replacement, 7));
        assert!(matches!(Schedule::new(defs), Err(Error::InvalidSchedule(_))));
    }

    #[test]
    fn toml_overrides_keep_unlisted_defaults() {
        let schedule = Schedule::from_toml_str(
            r#"
            [durations]
            replacement = 30
            "#,
        )
        .unwrap();
        assert_eq!(schedule.get(PeriodKind::Replacement).duration_days, 30);
        assert_eq!(schedule.get(PeriodKind::Manufacturing).duration_days, 180);

        assert!(Schedule::from_toml_str("").unwrap() == *Schedule::standard());
        assert!(matches!(
            Schedule::from_toml_str("[durations]\nmaintenance2 = 0\n"),
            Err(Error::InvalidSchedule(_))
        ));
        assert!(matches!(
            Schedule::from_toml_str("[durations]\nwarranty = 10\n"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn toml_output_parses_back() {
        let text = Schedule::standard().to_toml_string().unwrap();
        assert!(text.contains("manufacturing = 180"));
        assert_eq!(Schedule::from_toml_str(&text).unwrap(), *Schedule::standard());
    }
}
