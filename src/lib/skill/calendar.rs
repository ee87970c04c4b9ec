//! Monthly academic calendar from the regional NEIS office page.
use std::{collections::BTreeMap, sync::LazyLock};

use async_trait::async_trait;
use log::info;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::korean_school::{
    error::{Result, SchoolError},
    models::SchoolRecord,
};

static LEADING_DAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)").unwrap());

/// Events of one month keyed by day of month; days without events are absent.
pub type MonthEvents = BTreeMap<u32, String>;

#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn month_events(&self, school: &SchoolRecord, year: i32, month: u32)
        -> Result<MonthEvents>;
}

pub struct NeisCalendar {
    client: Client,
}

impl NeisCalendar {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CalendarSource for NeisCalendar {
    async fn month_events(
        &self,
        school: &SchoolRecord,
        year: i32,
        month: u32,
    ) -> Result<MonthEvents> {
        info!("Getting calendar of {} for {}-{:02}", school.name, year, month);
        let course = school.course_code();
        let url = format!("https://stu.{}.kr/sts_sci_sf01_001.do", school.office_domain);
        let html = self
            .client
            .get(url)
            .query(&[
                ("schulCode", school.code.clone()),
                ("schulCrseScCode", course.to_string()),
                ("schulKndScCode", format!("{course:02}")),
                ("ay", year.to_string()),
                ("mm", format!("{month:02}")),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_calendar_page(&html)
    }
}

/// Reads the monthly table: every cell starts with its day number, followed by
/// one line per event.
pub fn parse_calendar_page(html: &str) -> Result<MonthEvents> {
    let document = Html::parse_document(html);
    let cell_selector = Selector::parse(".tbl_type3 tbody td div")
        .map_err(|err| SchoolError::Parse(format!("bad calendar selector: {err}")))?;

    let mut events = MonthEvents::new();
    for cell in document.select(&cell_selector) {
        let text = cell.text().collect::<Vec<_>>().join("\n");
        let Some(found) = LEADING_DAY.captures(&text) else {
            continue;
        };
        let Ok(day) = found[1].parse::<u32>() else {
            continue;
        };
        let rest = &text[found.get(0).map_or(0, |whole| whole.end())..];
        let names = rest
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        if !names.is_empty() {
            events.insert(day, names.join(", "));
        }
    }
    Ok(events)
}

#[cfg(test)]
#[path = "tests/calendar.rs"]
mod tests;
