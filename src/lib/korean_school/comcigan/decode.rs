//! Recovery of readable field names from a raw Comcigan response.
//!
//! The site serves its timetable with keys such as `자료147`, and the page
//! script binds them to names (`원자료 = 자료.자료147`). Decoding is two passes:
//! [`FieldTable::recover`] maps every raw key to a canonical name, then
//! [`decode`] rewrites the keys and parses the result into a [`ComciganPayload`].
use std::{collections::HashMap, sync::LazyLock};

use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::korean_school::error::{Result, SchoolError};
use crate::korean_school::models::comcigan_model::ComciganPayload;

/// Present in the response body that carries the timetable.
pub const PAYLOAD_MARKER: &str = "\"교사수\":";

/// Present in the response body listing school search results.
pub const SEARCH_MARKER: &str = "\"학교검색\":";

static RAW_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""(자료\d+)""#).unwrap());

static SCRIPT_BINDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w가-힣]+)\s*=\s*자료\.(자료\d+)").unwrap());

static SAVED_AT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(자료\d+)":"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}""#).unwrap()
});

/// Page markup and raw response captured by one scrape session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub page_source: String,
    pub text: String,
}

/// Raw key to canonical field name, in order of first appearance.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FieldTable {
    names: Vec<(String, String)>,
}

impl FieldTable {
    pub fn recover(page_source: &str, raw: &str) -> Self {
        let bindings = script_bindings(page_source);
        let from_script = raw_keys(raw)
            .into_iter()
            .map(|key| {
                let name = bindings.get(key.as_str()).map(|name| (*name).to_owned());
                (key, name)
            })
            .collect::<Vec<_>>();
        let saved_at = SAVED_AT_KEY
            .captures_iter(raw)
            .map(|captures| captures[1].to_owned())
            .find(|key| {
                from_script
                    .iter()
                    .any(|(mapped, name)| mapped == key && name.is_none())
            });

        let names = from_script
            .into_iter()
            .map(|(key, name)| {
                let name = match name {
                    Some(name) => rename_legacy(name),
                    None if saved_at.as_deref() == Some(key.as_str()) => "저장일".to_owned(),
                    None => lonely_key_rule(raw, &key).to_owned(),
                };
                (key, name)
            })
            .collect();
        Self { names }
    }

    pub fn canonical(&self, raw_key: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|(key, _)| key == raw_key)
            .map(|(_, name)| name.as_str())
    }

    pub fn rewrite(&self, raw: &str) -> String {
        RAW_KEY
            .replace_all(raw, |captures: &regex::Captures| {
                let name = self.canonical(&captures[1]).unwrap_or(&captures[1]);
                format!("\"{name}\"")
            })
            .into_owned()
    }
}

/// A key the page script does not name is the teacher grid when it occurs
/// exactly once in the response; every other unnamed key is a subject table.
pub fn lonely_key_rule(raw: &str, key: &str) -> &'static str {
    if raw.matches(&format!("{key}\"")).count() == 1 {
        "교사시간표"
    } else {
        "과목명"
    }
}

fn rename_legacy(name: String) -> String {
    match name.as_str() {
        "원자료" => "시간표".to_owned(),
        "일일자료" => "학급시간표".to_owned(),
        _ => name,
    }
}

fn raw_keys(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for captures in RAW_KEY.captures_iter(raw) {
        let key = &captures[1];
        if !keys.iter().any(|known| known == key) {
            keys.push(key.to_owned());
        }
    }
    keys
}

/// `name = 자료.자료N` assignments of the page script, raw key to name.
/// The first assignment of a key wins.
fn script_bindings(page_source: &str) -> HashMap<&str, &str> {
    let mut bindings = HashMap::new();
    for captures in SCRIPT_BINDING.captures_iter(page_source) {
        if let (Some(name), Some(key)) = (captures.get(1), captures.get(2)) {
            bindings.entry(key.as_str()).or_insert(name.as_str());
        }
    }
    bindings
}

/// Trims a response body down to the JSON object on its first line.
pub fn payload_line(text: &str) -> Option<&str> {
    let line = text.lines().next()?;
    let start = line.find('{')?;
    let end = line.rfind('}')?;
    (start < end).then(|| &line[start..=end])
}

pub fn decode(raw: &RawPayload) -> Result<ComciganPayload> {
    let line = payload_line(&raw.text)
        .filter(|line| line.contains(PAYLOAD_MARKER))
        .ok_or_else(|| SchoolError::Parse("response carries no timetable payload".to_owned()))?;
    let table = FieldTable::recover(&raw.page_source, line);
    debug!("Recovered Comcigan field names: {:?}", table.names);
    /* duplicate canonical keys collapse here, the last one wins */
    let value: Value = serde_json::from_str(&table.rewrite(line))?;
    Ok(serde_json::from_value(value)?)
}
