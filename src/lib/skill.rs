//! Chatbot skill webhook answering timetable, meal and calendar questions for
//! one configured school.
pub mod calendar;
pub mod error;
pub mod handlers;
pub mod models;
pub mod server;
