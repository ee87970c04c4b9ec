//! Static directory of known schools with fuzzy office/name matching.
use std::{error::Error, fs::File, io::BufReader, io::Read, path::Path};

use log::{debug, info};
use regex::Regex;

use super::models::SchoolRecord;

const BUNDLED_SCHOOLS: &str = include_str!("../../../data/schools.json");

/// Short office names mapped to the form stored in the directory.
const OFFICE_ALIASES: [(&str, &str); 19] = [
    ("서울시", "서울특별시"),
    ("부산시", "부산광역시"),
    ("대구시", "대구광역시"),
    ("인천시", "인천광역시"),
    ("광주시", "광주광역시"),
    ("대전시", "대전광역시"),
    ("울산시", "울산광역시"),
    ("세종시", "세종특별자치시"),
    ("세종특별시", "세종특별자치시"),
    ("경기", "경기도"),
    ("강원", "강원도"),
    ("충북", "충청북도"),
    ("충남", "충청남도"),
    ("전북", "전라북도"),
    ("전남", "전라남도"),
    ("경북", "경상북도"),
    ("경남", "경상남도"),
    ("제주시", "제주특별자치도"),
    ("제주특별시", "제주특별자치도"),
];

/// Office or school name query: a literal substring or a regular expression.
#[derive(Debug, Clone)]
pub enum Query {
    Literal(String),
    Pattern(Regex),
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Literal(text.to_owned())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Literal(text)
    }
}

impl From<Regex> for Query {
    fn from(pattern: Regex) -> Self {
        Query::Pattern(pattern)
    }
}

pub fn resolve_office_alias(office: &str) -> &str {
    OFFICE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == office)
        .map(|(_, full)| *full)
        .unwrap_or(office)
}

/// Expands abbreviated school names: `백석고` -> `백석고등학교`,
/// `수원여중` -> `수원여자중학교`.
pub fn normalize_school_name(name: &str) -> String {
    let mut name = name.to_owned();
    for (short, full) in [("초", "초등학교"), ("중", "중학교"), ("고", "고등학교")] {
        if let Some(stem) = name.strip_suffix(short) {
            name = format!("{stem}{full}");
            break;
        }
    }
    for (level, full) in [("중학교", "여자중학교"), ("고등학교", "여자고등학교")] {
        if name.contains(full) {
            continue;
        }
        let short = format!("여{level}");
        if name.contains(&short) {
            name = name.replacen(&short, full, 1);
        }
    }
    name
}

pub struct SchoolDirectory {
    schools: Vec<SchoolRecord>,
}

impl SchoolDirectory {
    pub fn new(schools: Vec<SchoolRecord>) -> Self {
        Self { schools }
    }

    /// Directory shipped with the crate in `data/schools.json`.
    pub fn bundled() -> Result<Self, Box<dyn Error>> {
        Self::from_reader(BUNDLED_SCHOOLS.as_bytes())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Box<dyn Error>> {
        let schools: Vec<SchoolRecord> = serde_json::from_reader(reader)?;
        info!("Loaded {} schools into the directory", schools.len());
        Ok(Self::new(schools))
    }

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        info!(
            "Reading school directory from {}",
            std::path::absolute(path)?.display()
        );
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn get_all(&self) -> &[SchoolRecord] {
        &self.schools
    }

    /// Every school whose office matches `office` and whose name matches `name`,
    /// in directory order.
    pub fn find_all(
        &self,
        office: impl Into<Query>,
        name: impl Into<Query>,
        use_alias: bool,
    ) -> Vec<&SchoolRecord> {
        let office = office.into();
        let name = name.into();
        self.schools
            .iter()
            .filter(|school| office_matches(&office, &school.office, use_alias))
            .filter(|school| name_matches(&name, &school.name, use_alias))
            .collect()
    }

    /// The match whose full name length is closest to the expanded query name.
    /// Ties go to the earliest match in directory order.
    pub fn find(
        &self,
        office: impl Into<Query>,
        name: &str,
        use_alias: bool,
    ) -> Option<&SchoolRecord> {
        let expected_len = if use_alias {
            normalize_school_name(name).chars().count()
        } else {
            name.chars().count()
        };
        let best = self
            .find_all(office, name, use_alias)
            .into_iter()
            .fold(None, |best: Option<(&SchoolRecord, usize)>, school| {
                let distance = school.name.chars().count().abs_diff(expected_len);
                match best {
                    Some((_, best_distance)) if best_distance <= distance => best,
                    _ => Some((school, distance)),
                }
            })
            .map(|(school, _)| school);
        debug!("Directory lookup for {name} resolved to {best:?}");
        best
    }
}

fn office_matches(query: &Query, office: &str, use_alias: bool) -> bool {
    match query {
        Query::Literal(text) if use_alias => office.contains(resolve_office_alias(text)),
        Query::Literal(text) => office.contains(text.as_str()),
        Query::Pattern(pattern) => pattern.is_match(office),
    }
}

fn name_matches(query: &Query, name: &str, use_alias: bool) -> bool {
    match query {
        Query::Literal(text) if use_alias => {
            let name = normalize_school_name(name);
            name.contains(text.as_str()) || name.contains(&normalize_school_name(text))
        }
        Query::Literal(text) => name.contains(text.as_str()),
        Query::Pattern(pattern) => pattern.is_match(name),
    }
}

#[cfg(test)]
#[path = "tests/directory.rs"]
mod tests;
