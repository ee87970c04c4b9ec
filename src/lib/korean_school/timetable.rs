//! Turns a Comcigan snapshot into readable class and teacher schedules.
use chrono::{Datelike, NaiveDate};

use super::cell::{subject_of, ClassCell, TeacherCell};
use super::models::{
    comcigan_model::{ComciganPayload, Grid},
    weekday_index, DaySchedule, ScheduleSlot, WeeklySchedule,
};

/// Grid day indices of Monday..=Friday. Day 0 and day 6 are placeholders.
const SCHOOL_DAYS: std::ops::RangeInclusive<usize> = 1..=5;

/// Weekly schedule of one class, or `None` if the grid has no such class.
pub fn class_schedules(payload: &ComciganPayload, grade: usize, room: usize) -> Option<WeeklySchedule> {
    payload.class_grid.row(&[grade, room])?;
    Some(weekly(&payload.class_grid, &[grade, room], |day, period, value| {
        let cell = ClassCell::decode(value)?;
        let original = payload.original_grid.cell(&[grade, room, day, period]);
        Some(ScheduleSlot {
            subject: payload.subject_name(cell.subject),
            subject_original: payload.long_subject_name(cell.subject),
            teacher: payload.teacher_name(cell.teacher),
            is_changed: original != Some(value),
            ..ScheduleSlot::default()
        })
    }))
}

/// Weekly schedule of the teacher called `teacher`.
pub fn teacher_schedules(payload: &ComciganPayload, teacher: &str) -> Option<WeeklySchedule> {
    let index = payload.teacher_index(teacher)?;
    payload.teacher_grid.row(&[index])?;
    Some(weekly(&payload.teacher_grid, &[index], |day, period, value| {
        let cell = TeacherCell::decode(value)?;
        let scheduled = payload
            .original_grid
            .cell(&[cell.grade as usize, cell.room as usize, day, period])
            .map(subject_of)
            .unwrap_or_default();
        let expected = TeacherCell {
            subject: scheduled,
            ..cell
        };
        Some(ScheduleSlot {
            subject: payload.subject_name(cell.subject),
            subject_original: payload.long_subject_name(cell.subject),
            grade: Some(cell.grade),
            room: Some(cell.room),
            is_changed: value != expected.encode(),
            ..ScheduleSlot::default()
        })
    }))
}

pub fn teachers(payload: &ComciganPayload) -> Vec<String> {
    payload
        .teacher_names
        .iter()
        .filter(|name| !name.is_empty())
        .cloned()
        .collect()
}

/// Entry of `schedules` for the weekday of `date`; weekends have none.
pub fn on_date(schedules: WeeklySchedule, date: NaiveDate) -> Option<DaySchedule> {
    let index = weekday_index(date.weekday())?;
    schedules.into_iter().nth(index)
}

/// Walks days 1..=5 of the week grid at `base`, dropping period 0 of each day.
fn weekly<F>(grid: &Grid, base: &[usize], resolve: F) -> WeeklySchedule
where
    F: Fn(usize, usize, u32) -> Option<ScheduleSlot>,
{
    SCHOOL_DAYS
        .map(|day| {
            let mut path = base.to_vec();
            path.push(day);
            let periods = grid.row(&path).map(Vec::len).unwrap_or(0);
            (1..periods)
                .map(|period| {
                    let mut cell_path = path.clone();
                    cell_path.push(period);
                    grid.cell(&cell_path)
                        .and_then(|value| resolve(day, period, value))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/timetable.rs"]
mod tests;
