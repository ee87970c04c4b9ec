use chrono::Weekday;
use serde::{Deserialize, Serialize};

pub mod comcigan_model;

/// One entry of the school directory.
///
/// Loaded once from the bundled dataset and never modified afterwards;
/// `code` identifies the school across every upstream.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRecord {
    pub code: String,
    pub office: String,
    pub office_domain: String,
    pub name: String,
}

impl SchoolRecord {
    /// NEIS course code (`schulCrseScCode`) guessed from the name suffix.
    pub fn course_code(&self) -> u8 {
        if self.name.ends_with("초등학교") {
            2
        } else if self.name.ends_with("중학교") {
            3
        } else {
            4
        }
    }
}

/// Meals served on one calendar day. Missing meals are `None`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SchoolMeal {
    pub breakfast: Option<String>,
    pub lunch: Option<String>,
    pub dinner: Option<String>,
}

impl SchoolMeal {
    pub fn is_empty(&self) -> bool {
        self.breakfast.is_none() && self.lunch.is_none() && self.dinner.is_none()
    }
}

/// Registry metadata scraped from the national school information page.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchoolInformation {
    pub address: Option<String>,
    pub area: Option<String>,
    pub class: Option<String>,
    pub office: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub establishment_date: Option<String>,
    pub establishment_type: Option<String>,
    pub school_anniversary: Option<String>,
    pub school_type: Option<String>,
    pub site: Option<String>,
}

/// A resolved timetable period.
///
/// Class schedules fill `teacher`, teacher schedules fill `grade` and `room`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub subject: Option<String>,
    pub subject_original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<u32>,
    pub is_changed: bool,
}

/// Periods of one day, first period at index 0. `None` means no class.
pub type DaySchedule = Vec<Option<ScheduleSlot>>;

/// Monday to Friday, Monday at index 0.
pub type WeeklySchedule = Vec<DaySchedule>;

/// Position of a school day in a [`WeeklySchedule`]; weekends have none.
pub fn weekday_index(weekday: Weekday) -> Option<usize> {
    match weekday {
        Weekday::Sat | Weekday::Sun => None,
        day => Some(day.num_days_from_monday() as usize),
    }
}
