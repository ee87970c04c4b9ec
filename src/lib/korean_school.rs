//! School directory, timetable, meal and registry lookups.
//!
//! [`KoreanSchool`] ties the pieces together and is built once at startup.
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Client;

pub mod cell;
pub mod comcigan;
pub mod directory;
pub mod error;
pub mod information;
pub mod meal;
pub mod models;
pub mod timetable;

use comcigan::ComciganCache;
use directory::SchoolDirectory;
use error::Result;
use meal::{MealSource, DIMIGO_CODE};
use models::{
    comcigan_model::ComciganPayload, DaySchedule, SchoolInformation, SchoolMeal, SchoolRecord,
    WeeklySchedule,
};

pub struct KoreanSchool {
    pub directory: SchoolDirectory,
    comcigan: ComciganCache,
    meals: Arc<dyn MealSource>,
    dimigo_meals: Arc<dyn MealSource>,
    client: Client,
    school_info_url: String,
}

impl KoreanSchool {
    pub fn new(
        directory: SchoolDirectory,
        comcigan: ComciganCache,
        meals: Arc<dyn MealSource>,
        dimigo_meals: Arc<dyn MealSource>,
        client: Client,
        school_info_url: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            comcigan,
            meals,
            dimigo_meals,
            client,
            school_info_url: school_info_url.into(),
        }
    }

    pub async fn get_comcigan_data(&self, school: &SchoolRecord) -> Result<Arc<ComciganPayload>> {
        self.comcigan.get(school).await
    }

    pub async fn get_schedules(
        &self,
        school: &SchoolRecord,
        grade: usize,
        room: usize,
    ) -> Result<Option<WeeklySchedule>> {
        let payload = self.get_comcigan_data(school).await?;
        Ok(timetable::class_schedules(&payload, grade, room))
    }

    pub async fn get_schedule(
        &self,
        school: &SchoolRecord,
        grade: usize,
        room: usize,
        date: NaiveDate,
    ) -> Result<Option<DaySchedule>> {
        Ok(self
            .get_schedules(school, grade, room)
            .await?
            .and_then(|schedules| timetable::on_date(schedules, date)))
    }

    pub async fn get_teacher_schedules(
        &self,
        school: &SchoolRecord,
        teacher: &str,
    ) -> Result<Option<WeeklySchedule>> {
        let payload = self.get_comcigan_data(school).await?;
        Ok(timetable::teacher_schedules(&payload, teacher))
    }

    pub async fn get_teacher_schedule(
        &self,
        school: &SchoolRecord,
        teacher: &str,
        date: NaiveDate,
    ) -> Result<Option<DaySchedule>> {
        Ok(self
            .get_teacher_schedules(school, teacher)
            .await?
            .and_then(|schedules| timetable::on_date(schedules, date)))
    }

    pub async fn get_teachers(&self, school: &SchoolRecord) -> Result<Vec<String>> {
        let payload = self.get_comcigan_data(school).await?;
        Ok(timetable::teachers(&payload))
    }

    fn meal_source(&self, school: &SchoolRecord) -> &dyn MealSource {
        if school.code == DIMIGO_CODE {
            self.dimigo_meals.as_ref()
        } else {
            self.meals.as_ref()
        }
    }

    pub async fn get_meals(
        &self,
        school: &SchoolRecord,
        date: NaiveDate,
    ) -> Result<Vec<Option<SchoolMeal>>> {
        self.meal_source(school).meals(school, date).await
    }

    pub async fn get_meal(&self, school: &SchoolRecord, date: NaiveDate) -> Result<Option<SchoolMeal>> {
        self.meal_source(school).meal(school, date).await
    }

    pub async fn get_information(&self, school: &SchoolRecord) -> Result<SchoolInformation> {
        information::fetch_information(&self.client, &self.school_info_url, school).await
    }
}
