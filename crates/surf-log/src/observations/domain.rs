use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the persistence adapter that stored the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn fold_label(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Suitability judgment for the wind and tide factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suitability {
    Yes,
    No,
    Ok,
}

impl Suitability {
    pub const ALL: [Suitability; 3] = [Suitability::Yes, Suitability::No, Suitability::Ok];

    pub fn label(self) -> &'static str {
        match self {
            Suitability::Yes => "Yes",
            Suitability::No => "No",
            Suitability::Ok => "Ok",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match fold_label(value).as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            "ok" => Some(Self::Ok),
            _ => None,
        }
    }
}

/// Suitability judgment for the swell factor, which can also be too big to surf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwellSuitability {
    Yes,
    No,
    Ok,
    #[serde(rename = "Too Big")]
    TooBig,
}

impl SwellSuitability {
    pub const ALL: [SwellSuitability; 4] = [
        SwellSuitability::Yes,
        SwellSuitability::No,
        SwellSuitability::Ok,
        SwellSuitability::TooBig,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SwellSuitability::Yes => "Yes",
            SwellSuitability::No => "No",
            SwellSuitability::Ok => "Ok",
            SwellSuitability::TooBig => "Too Big",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match fold_label(value).as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            "ok" => Some(Self::Ok),
            "toobig" => Some(Self::TooBig),
            _ => None,
        }
    }
}

/// The sixteen-point compass used for wind bearings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassBearing {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassBearing {
    pub const ALL: [CompassBearing; 16] = [
        CompassBearing::N,
        CompassBearing::NNE,
        CompassBearing::NE,
        CompassBearing::ENE,
        CompassBearing::E,
        CompassBearing::ESE,
        CompassBearing::SE,
        CompassBearing::SSE,
        CompassBearing::S,
        CompassBearing::SSW,
        CompassBearing::SW,
        CompassBearing::WSW,
        CompassBearing::W,
        CompassBearing::WNW,
        CompassBearing::NW,
        CompassBearing::NNW,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompassBearing::N => "N",
            CompassBearing::NNE => "NNE",
            CompassBearing::NE => "NE",
            CompassBearing::ENE => "ENE",
            CompassBearing::E => "E",
            CompassBearing::ESE => "ESE",
            CompassBearing::SE => "SE",
            CompassBearing::SSE => "SSE",
            CompassBearing::S => "S",
            CompassBearing::SSW => "SSW",
            CompassBearing::SW => "SW",
            CompassBearing::WSW => "WSW",
            CompassBearing::W => "W",
            CompassBearing::WNW => "WNW",
            CompassBearing::NW => "NW",
            CompassBearing::NNW => "NNW",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|bearing| bearing.label().eq_ignore_ascii_case(wanted))
    }
}

/// Tide state at the time of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TideDirection {
    High,
    Low,
    Falling,
    Rising,
}

impl TideDirection {
    pub const ALL: [TideDirection; 4] = [
        TideDirection::High,
        TideDirection::Low,
        TideDirection::Falling,
        TideDirection::Rising,
    ];

    /// Label written by older versions of the log for a falling tide.
    pub const LEGACY_FALLING: &'static str = "Dropping";

    pub fn label(self) -> &'static str {
        match self {
            TideDirection::High => "High",
            TideDirection::Low => "Low",
            TideDirection::Falling => "Falling",
            TideDirection::Rising => "Rising",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match fold_label(value).as_str() {
            "high" => Some(Self::High),
            "low" => Some(Self::Low),
            "falling" | "dropping" => Some(Self::Falling),
            "rising" => Some(Self::Rising),
            _ => None,
        }
    }
}

/// Who may see a record in a multi-user store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Community,
}

impl Visibility {
    pub fn label(self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
            Visibility::Community => "Community",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match fold_label(value).as_str() {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "community" => Some(Self::Community),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwellObservation {
    /// Primary (Surfline) swell height in metres.
    pub primary_size_m: Option<f64>,
    /// Secondary (Seabreeze) swell height in metres.
    pub secondary_size_m: Option<f64>,
    pub period_s: Option<i64>,
    /// Whole degrees in `[0, 360)`.
    pub direction_deg: Option<u16>,
    pub suitable: Option<SwellSuitability>,
    pub score: Option<u8>,
    pub final_score: Option<f64>,
    pub comments: String,
}

impl SwellObservation {
    pub fn has_positive_size(&self) -> bool {
        [self.primary_size_m, self.secondary_size_m]
            .into_iter()
            .flatten()
            .any(|size| size > 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindObservation {
    pub bearing: Option<CompassBearing>,
    pub speed_kn: Option<i64>,
    pub suitable: Option<Suitability>,
    pub score: Option<u8>,
    pub final_score: Option<f64>,
    pub comments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TideObservation {
    pub reading_m: Option<f64>,
    pub direction: Option<TideDirection>,
    pub suitable: Option<Suitability>,
    pub score: Option<u8>,
    pub final_score: Option<f64>,
    pub comments: String,
}

/// One logged surf session in canonical, typed form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub break_name: String,
    pub zone: String,
    pub swell: SwellObservation,
    pub wind: WindObservation,
    pub tide: TideObservation,
    pub total_score: Option<f64>,
    pub full_commentary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl ObservationRecord {
    pub fn comments(&self) -> [&str; 3] {
        [
            self.swell.comments.as_str(),
            self.wind.comments.as_str(),
            self.tide.comments.as_str(),
        ]
    }

    pub fn has_any_comment(&self) -> bool {
        self.comments()
            .iter()
            .any(|comment| !comment.trim().is_empty())
    }

    /// Single-space join of the three comment fields, trimmed at both ends.
    pub fn joined_commentary(&self) -> String {
        self.comments().join(" ").trim().to_string()
    }

    pub fn effective_visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }
}
