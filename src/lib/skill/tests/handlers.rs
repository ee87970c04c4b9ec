use chrono::NaiveDate;

use super::*;
use crate::korean_school::models::ScheduleSlot;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn slot(subject: &str) -> Option<ScheduleSlot> {
    Some(ScheduleSlot {
        subject: Some(subject.to_owned()),
        ..ScheduleSlot::default()
    })
}

#[test]
fn meal_date_counts_from_monday() {
    let wednesday = date(2024, 3, 6);
    assert_eq!(meal_date(wednesday, 0), Some(date(2024, 3, 4)));
    assert_eq!(meal_date(wednesday, 4), Some(date(2024, 3, 8)));

    let friday = date(2024, 3, 8);
    assert_eq!(meal_date(friday, 4), Some(friday));
}

#[test]
fn meal_date_on_weekend_means_next_week() {
    assert_eq!(meal_date(date(2024, 3, 9), 0), Some(date(2024, 3, 11)));
    assert_eq!(meal_date(date(2024, 3, 10), 0), Some(date(2024, 3, 11)));
    assert_eq!(meal_date(date(2024, 3, 10), 2), Some(date(2024, 3, 13)));
}

#[test]
fn timetable_renders_five_by_seven_grid() {
    let mut week: WeeklySchedule = vec![vec![None; 7]; 5];
    week[0][0] = slot("국어");
    week[4][6] = slot("체육");
    // a short day renders its missing periods as empty
    week[2] = vec![slot("수학")];

    let text = render_timetable(1, 3, &week, date(2024, 3, 6));
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], "1학년 3반 시간표");
    assert_eq!(lines[1], WEEK_HEADER.trim_end_matches('\n'));
    assert_eq!(
        lines[2],
        format!("1  국어     {EMPTY_PERIOD}     수학     {EMPTY_PERIOD}     {EMPTY_PERIOD}")
    );
    assert_eq!(
        lines[8],
        format!("7  {EMPTY_PERIOD}     {EMPTY_PERIOD}     {EMPTY_PERIOD}     {EMPTY_PERIOD}     체육")
    );
    assert_eq!(lines[9], "조회일시 - 2024/3/6");
}

#[test]
fn failure_envelope_is_plain_message() {
    assert_eq!(
        serde_json::to_value(failure()).unwrap(),
        serde_json::json!({ "version": "2.0", "data": { "msg": "조회 실패" } })
    );
}

#[test]
fn meal_date_rejects_overflowing_wday() {
    assert_eq!(meal_date(date(2024, 3, 4), i64::MAX), None);
    assert_eq!(meal_date(date(2024, 3, 9), i64::MAX), None);
    assert_eq!(meal_date(date(2024, 3, 6), i64::MIN), None);
}
