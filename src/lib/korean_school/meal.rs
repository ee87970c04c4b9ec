//! Monthly meal menus: the regional NEIS meal page for most schools, and the
//! school's own API for Korea Digital Media High School.
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use futures::future;
use log::info;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

use super::error::{Result, SchoolError};
use super::models::{SchoolMeal, SchoolRecord};

/// School served by [`DimigoMeals`] instead of the NEIS page.
pub const DIMIGO_CODE: &str = "J100000855";

pub const DEFAULT_DIMIGO_API_URL: &str = "https://api.dimigo.in/dimibobs";

static MEAL_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(조식|중식|석식)\]([^\[]*)").unwrap());

static LEADING_DAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").unwrap());

/// Meals of one month, day 1 at index 0. Days without a menu are `None`.
pub type MonthlyMeals = Vec<Option<SchoolMeal>>;

#[async_trait]
pub trait MealSource: Send + Sync {
    /// Menus for the month containing `date`.
    async fn meals(&self, school: &SchoolRecord, date: NaiveDate) -> Result<MonthlyMeals>;

    /// Menu for `date` alone.
    async fn meal(&self, school: &SchoolRecord, date: NaiveDate) -> Result<Option<SchoolMeal>> {
        let meals = self.meals(school, date).await?;
        Ok(meals.get(date.day0() as usize).cloned().flatten())
    }
}

pub struct NeisMealPage {
    client: Client,
}

impl NeisMealPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MealSource for NeisMealPage {
    async fn meals(&self, school: &SchoolRecord, date: NaiveDate) -> Result<MonthlyMeals> {
        info!(
            "Getting meals of {} for {}-{:02}",
            school.name,
            date.year(),
            date.month()
        );
        let url = format!("http://stu.{}.kr/sts_sci_md00_001.do", school.office_domain);
        let html = self
            .client
            .get(url)
            .query(&[
                ("schulCode", school.code.clone()),
                ("schulCrseScCode", school.course_code().to_string()),
                ("ay", date.year().to_string()),
                ("mm", format!("{:02}", date.month())),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_meal_page(&html)
    }
}

/// Parses the monthly table of the NEIS meal page.
pub fn parse_meal_page(html: &str) -> Result<MonthlyMeals> {
    let document = Html::parse_document(html);
    let cell_selector = Selector::parse(".tbl_type3 tbody tr td div")
        .map_err(|err| SchoolError::Parse(format!("bad meal selector: {err}")))?;

    let mut meals: MonthlyMeals = Vec::new();
    for cell in document.select(&cell_selector) {
        let content = cell.inner_html().replace("<br>", "\n").replace("&amp;", "&");
        let content = content.trim();
        let Some(day) = LEADING_DAY
            .find(content)
            .and_then(|day| day.as_str().parse::<usize>().ok())
            .filter(|day| *day > 0)
        else {
            continue;
        };
        if meals.len() < day {
            meals.resize(day, None);
        }
        meals[day - 1] = Some(parse_meal_cell(content));
    }
    Ok(meals)
}

/// Splits `"1 [조식]Toast[중식]Rice[석식]Soup"` into its three meals.
pub fn parse_meal_cell(content: &str) -> SchoolMeal {
    let mut meal = SchoolMeal::default();
    for section in MEAL_SECTION.captures_iter(content) {
        let menu = section[2].trim();
        if menu.is_empty() {
            continue;
        }
        let slot = match &section[1] {
            "조식" => &mut meal.breakfast,
            "중식" => &mut meal.lunch,
            _ => &mut meal.dinner,
        };
        *slot = Some(menu.to_owned());
    }
    meal
}

#[derive(Debug, Deserialize)]
struct Dimibob {
    breakfast: Option<String>,
    lunch: Option<String>,
    dinner: Option<String>,
}

/// Daily menus from the Dimigo API.
pub struct DimigoMeals {
    client: Client,
    api_url: String,
}

impl DimigoMeals {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl MealSource for DimigoMeals {
    async fn meals(&self, school: &SchoolRecord, date: NaiveDate) -> Result<MonthlyMeals> {
        let first = date.with_day(1).unwrap_or(date);
        let days = first
            .iter_days()
            .take_while(|day| day.month() == first.month());
        future::join_all(days.map(|day| self.meal(school, day)))
            .await
            .into_iter()
            .collect()
    }

    async fn meal(&self, _school: &SchoolRecord, date: NaiveDate) -> Result<Option<SchoolMeal>> {
        info!("Getting Dimigo meal for {}", date);
        let url = format!("{}/{}", self.api_url, date.format("%Y%m%d"));
        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bob: Dimibob = response.error_for_status()?.json().await?;
        let meal = SchoolMeal {
            breakfast: bob.breakfast.filter(|menu| !menu.trim().is_empty()),
            lunch: bob.lunch.filter(|menu| !menu.trim().is_empty()),
            dinner: bob.dinner.filter(|menu| !menu.trim().is_empty()),
        };
        Ok(Some(meal))
    }
}

#[cfg(test)]
#[path = "tests/meal.rs"]
mod tests;
