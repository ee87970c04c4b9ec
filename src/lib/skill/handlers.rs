//! Webhook endpoints. Every handler answers with a skill envelope; internal
//! failures degrade to a fixed "조회 실패" message instead of an HTTP error.
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use log::warn;

use super::error::SkillError;
use super::models::{
    ActionRequest, BlockRequest, CalendarContent, MealParams, Output, Param, SkillData,
    SkillResponse, TimeParams,
};
use super::server::SkillState;
use crate::korean_school::models::WeeklySchedule;

pub const FAILURE_MSG: &str = "조회 실패";

/// Periods shown in the timetable grid.
const PERIODS_SHOWN: usize = 7;

const WEEK_HEADER: &str = "     월          화          수          목         금\n";

const EMPTY_PERIOD: &str = "   -    ";

pub async fn get_time(
    State(state): State<SkillState>,
    body: Result<Json<ActionRequest<TimeParams>>, JsonRejection>,
) -> Json<SkillResponse> {
    match time_response(&state, body).await {
        Ok(response) => Json(response),
        Err(err) => {
            warn!("getTime degraded: {err}");
            let mut response = SkillResponse::with_template(vec![Output::SimpleText {
                text: FAILURE_MSG.to_owned(),
            }]);
            response.data = Some(failure_data());
            Json(response)
        }
    }
}

async fn time_response(
    state: &SkillState,
    body: Result<Json<ActionRequest<TimeParams>>, JsonRejection>,
) -> Result<SkillResponse, SkillError> {
    let Json(request) = body.map_err(|rejection| SkillError::BadRequest(rejection.body_text()))?;
    let grade = index_param(&request.action.params.grade, "grade")?;
    let room = index_param(&request.action.params.class, "class")?;
    let week = state
        .korean_school
        .get_schedules(&state.school, grade, room)
        .await?
        .ok_or(SkillError::ClassNotFound { grade, room })?;
    let text = render_timetable(grade, room, &week, (state.today)());
    Ok(SkillResponse::with_template(vec![Output::SimpleText { text }]))
}

pub async fn get_meal(
    State(state): State<SkillState>,
    body: Result<Json<ActionRequest<MealParams>>, JsonRejection>,
) -> Json<SkillResponse> {
    match meal_response(&state, body).await {
        Ok(response) => Json(response),
        Err(err) => {
            warn!("getMeal degraded: {err}");
            Json(failure())
        }
    }
}

async fn meal_response(
    state: &SkillState,
    body: Result<Json<ActionRequest<MealParams>>, JsonRejection>,
) -> Result<SkillResponse, SkillError> {
    let Json(request) = body.map_err(|rejection| SkillError::BadRequest(rejection.body_text()))?;
    let wday = request
        .action
        .params
        .wday
        .as_number()
        .ok_or_else(|| SkillError::BadRequest("wday is not a number".to_owned()))?;
    let date = meal_date((state.today)(), wday)
        .ok_or_else(|| SkillError::BadRequest(format!("wday {wday} is out of range")))?;
    let meal = state.korean_school.get_meal(&state.school, date).await?;
    Ok(SkillResponse::with_data(SkillData::Meal {
        meal,
        date: format!("{}/{}", date.month(), date.day()),
        msg: looked_up_at(date),
    }))
}

pub async fn get_school_sc(State(state): State<SkillState>) -> Json<SkillResponse> {
    match calendar_response(&state).await {
        Ok(response) => Json(response),
        Err(err) => {
            warn!("getSchoolSc degraded: {err}");
            Json(failure())
        }
    }
}

async fn calendar_response(state: &SkillState) -> Result<SkillResponse, SkillError> {
    let today = (state.today)();
    let events = state
        .calendar
        .month_events(&state.school, today.year(), today.month())
        .await?;
    let content = events
        .iter()
        .map(|(day, event)| format!("{}/{} - {}", today.month(), day, event))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(SkillResponse::with_data(SkillData::Calendar {
        calendar: CalendarContent { content },
        msg: looked_up_at(today),
        month: today.month(),
    }))
}

pub async fn block_id(body: Result<Json<BlockRequest>, JsonRejection>) -> Json<SkillResponse> {
    match body {
        Ok(Json(request)) => Json(SkillResponse::with_template(vec![Output::BasicCard {
            title: "블록ID 입니다".to_owned(),
            description: request.user_request.block.id,
        }])),
        Err(rejection) => {
            warn!("blockId degraded: {}", rejection.body_text());
            Json(failure())
        }
    }
}

pub fn failure() -> SkillResponse {
    SkillResponse::with_data(failure_data())
}

fn failure_data() -> SkillData {
    SkillData::Message {
        msg: FAILURE_MSG.to_owned(),
    }
}

fn index_param(param: &Param, name: &str) -> Result<usize, SkillError> {
    param
        .as_number()
        .and_then(|number| usize::try_from(number).ok())
        .ok_or_else(|| SkillError::BadRequest(format!("{name} is not a class number")))
}

fn looked_up_at(date: NaiveDate) -> String {
    format!("조회일시 - {}/{}/{}", date.year(), date.month(), date.day())
}

/// Day asked for by `wday` (0 = Monday). On Saturdays and Sundays the
/// coming week is meant.
pub fn meal_date(today: NaiveDate, wday: i64) -> Option<NaiveDate> {
    let offset = match today.weekday() {
        Weekday::Sat => wday.checked_add(2)?,
        weekday => wday
            .checked_add(1)?
            .checked_sub(i64::from(weekday.num_days_from_sunday()))?,
    };
    today.checked_add_signed(TimeDelta::try_days(offset)?)
}

/// Renders a 5-day by 7-period grid of subject names.
pub fn render_timetable(grade: usize, room: usize, week: &WeeklySchedule, today: NaiveDate) -> String {
    let mut text = format!("{grade}학년 {room}반 시간표\n");
    text.push_str(WEEK_HEADER);
    for period in 0..PERIODS_SHOWN {
        text.push_str(&format!("{}  ", period + 1));
        for day in 0..5 {
            let subject = week
                .get(day)
                .and_then(|periods| periods.get(period))
                .and_then(|slot| slot.as_ref())
                .and_then(|slot| slot.subject.as_deref());
            text.push_str(subject.unwrap_or(EMPTY_PERIOD));
            text.push_str(if day == 4 { "\n" } else { "     " });
        }
    }
    text.push_str(&looked_up_at(today));
    text
}

#[cfg(test)]
#[path = "tests/handlers.rs"]
mod tests;
