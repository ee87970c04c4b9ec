use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::korean_school::{
    comcigan::DEFAULT_ENTRY_URL, information::DEFAULT_SCHOOL_INFO_URL,
    meal::DEFAULT_DIMIGO_API_URL, models::SchoolMeal,
};

/// Command line of the skill server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
}

/// Server configuration, read from `config.json`, `SKILL_*` variables and `PORT`.
/// Every field has a default, so the file may be missing.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Office and (possibly abbreviated) name of the school the skill answers for.
    pub school_office: String,
    pub school_name: String,
    /// Directory dataset replacing the bundled one.
    pub directory_json_path: Option<PathBuf>,
    pub comcigan_url: String,
    pub scrape_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    pub dimigo_api_url: String,
    pub school_info_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            school_office: "경기도".to_owned(),
            school_name: "보평중".to_owned(),
            directory_json_path: None,
            comcigan_url: DEFAULT_ENTRY_URL.to_owned(),
            scrape_timeout_secs: 30,
            cache_ttl_secs: 5 * 60,
            http_timeout_secs: 10,
            dimigo_api_url: DEFAULT_DIMIGO_API_URL.to_owned(),
            school_info_url: DEFAULT_SCHOOL_INFO_URL.to_owned(),
        }
    }
}

/// Skill parameter; the chatbot platform sends numbers as strings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Param {
    Number(i64),
    Text(String),
}

impl Param {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Param::Number(number) => Some(*number),
            Param::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest<P> {
    pub action: Action<P>,
}

#[derive(Debug, Deserialize)]
pub struct Action<P> {
    pub params: P,
}

#[derive(Debug, Deserialize)]
pub struct TimeParams {
    pub grade: Param,
    pub class: Param,
}

/// `wday` is the school day counted from Monday of the week being asked about.
#[derive(Debug, Deserialize)]
pub struct MealParams {
    pub wday: Param,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    pub user_request: UserRequest,
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub block: Block,
}

#[derive(Debug, Deserialize)]
pub struct Block {
    pub id: String,
}

/// Response envelope of the chatbot platform (skill API version 2.0).
#[derive(Debug, Serialize, PartialEq)]
pub struct SkillResponse {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SkillData>,
}

impl SkillResponse {
    pub const VERSION: &'static str = "2.0";

    pub fn with_template(outputs: Vec<Output>) -> Self {
        Self {
            version: Self::VERSION,
            template: Some(Template { outputs }),
            data: None,
        }
    }

    pub fn with_data(data: SkillData) -> Self {
        Self {
            version: Self::VERSION,
            template: None,
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Template {
    pub outputs: Vec<Output>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Output {
    SimpleText { text: String },
    BasicCard { title: String, description: String },
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SkillData {
    Meal {
        meal: Option<SchoolMeal>,
        date: String,
        msg: String,
    },
    Calendar {
        calendar: CalendarContent,
        msg: String,
        month: u32,
    },
    Message {
        msg: String,
    },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CalendarContent {
    pub content: String,
}
