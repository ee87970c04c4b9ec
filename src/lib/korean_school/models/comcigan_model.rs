//! Model of the timetable snapshot served by the Comcigan site, after its
//! obfuscated keys have been mapped back to their page-script names.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Loosely shaped nested array of the payload.
///
/// Comcigan mixes counters and sub-arrays on the same level (index 0 of most
/// axes holds a count), so cells are reached by walking a path of indices
/// rather than through a fixed Rust type.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Grid(pub Value);

impl Grid {
    pub fn get(&self, path: &[usize]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.0, |node, &index| node.as_array()?.get(index))
    }

    pub fn row(&self, path: &[usize]) -> Option<&Vec<Value>> {
        self.get(path)?.as_array()
    }

    /// Numeric cell at `path`; anything that is not a `u32` is `None`.
    pub fn cell(&self, path: &[usize]) -> Option<u32> {
        u32::try_from(self.get(path)?.as_u64()?).ok()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ComciganPayload {
    #[serde(rename = "교사수", default)]
    pub teacher_count: Option<u32>,
    #[serde(rename = "성명", default, deserialize_with = "lenient_strings")]
    pub teacher_names: Vec<String>,
    #[serde(rename = "과목명", default, deserialize_with = "lenient_strings")]
    pub subject_names: Vec<String>,
    #[serde(rename = "긴과목명", default, deserialize_with = "lenient_strings")]
    pub long_subject_names: Vec<String>,
    /// `[grade][room][day][period]` as originally scheduled.
    #[serde(rename = "시간표", default)]
    pub original_grid: Grid,
    /// `[grade][room][day][period]` with substitutions applied.
    #[serde(rename = "학급시간표", default)]
    pub class_grid: Grid,
    /// `[teacher][day][period]`.
    #[serde(rename = "교사시간표", default)]
    pub teacher_grid: Grid,
    #[serde(rename = "저장일", default)]
    pub saved_at: Option<String>,
    #[serde(rename = "학교명", default)]
    pub school_name: Option<String>,
    #[serde(rename = "학년도", default)]
    pub school_year: Option<u32>,
}

impl ComciganPayload {
    pub fn teacher_name(&self, index: usize) -> Option<String> {
        non_empty(&self.teacher_names, index)
    }

    pub fn subject_name(&self, index: usize) -> Option<String> {
        non_empty(&self.subject_names, index)
    }

    pub fn long_subject_name(&self, index: usize) -> Option<String> {
        non_empty(&self.long_subject_names, index)
    }

    pub fn teacher_index(&self, name: &str) -> Option<usize> {
        self.teacher_names.iter().position(|teacher| teacher == name)
    }
}

fn non_empty(names: &[String], index: usize) -> Option<String> {
    names
        .get(index)
        .filter(|name| !name.is_empty())
        .cloned()
}

/* name tables sometimes carry numbers or nulls as placeholders */
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| match value {
            Value::String(text) => text,
            _ => String::new(),
        })
        .collect())
}
