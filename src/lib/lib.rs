//! School timetable, meal and calendar lookups behind a chatbot skill webhook.
pub mod korean_school;
pub mod skill;
