use std::sync::LazyLock;

use encoding_rs::EUC_KR;
use log::info;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use super::error::{Result, SchoolError};
use super::models::{SchoolInformation, SchoolRecord};

pub const DEFAULT_SCHOOL_INFO_URL: &str = "https://www.schoolinfo.go.kr/ei/ss/Pneiss_b01_s0.do";

static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"전화\s*([0-9-]+)").unwrap());
static FAX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"팩스\s*([0-9-]+)").unwrap());

/// Fetches the registry page of `school` (served as EUC-KR) and parses it.
pub async fn fetch_information(
    client: &Client,
    base_url: &str,
    school: &SchoolRecord,
) -> Result<SchoolInformation> {
    info!("Getting registry information for {}", school.name);
    let bytes = client
        .post(base_url)
        .query(&[("HG_CD", school.code.as_str())])
        .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let (html, _, _) = EUC_KR.decode(&bytes);
    parse_information(&html)
}

pub fn parse_information(html: &str) -> Result<SchoolInformation> {
    let document = Html::parse_document(html);
    let mut information = SchoolInformation {
        area: first_text(&document, ".School_Division .mapD_Area")?,
        class: first_text(&document, ".School_Division .mapD_Class")?,
        ..SchoolInformation::default()
    };

    for item in document.select(&selector(".School_Data li")?) {
        let text = element_text(&item);
        if let Some(value) = labeled(&text, "학교주소") {
            information.address = value;
        } else if let Some(value) = labeled(&text, "관할교육청") {
            information.office = value;
        } else if let Some(value) = labeled(&text, "전화/팩스") {
            let value = value.unwrap_or_default();
            information.phone = PHONE.captures(&value).map(|found| found[1].to_owned());
            information.fax = FAX.captures(&value).map(|found| found[1].to_owned());
        } else if let Some(value) = labeled(&text, "설립일") {
            information.establishment_date = value;
        } else if let Some(value) = labeled(&text, "설립구분") {
            information.establishment_type = value;
        } else if let Some(value) = labeled(&text, "개교기념일") {
            information.school_anniversary = value;
        } else if let Some(value) = labeled(&text, "설립유형") {
            information.school_type = value;
        } else if let Some(value) = labeled(&text, "홈페이지") {
            information.site = value;
        }
    }
    Ok(information)
}

/// `Some(value)` when `text` carries `label`; the value is what follows the
/// label, `None` inside when that is blank.
fn labeled(text: &str, label: &str) -> Option<Option<String>> {
    let (_, value) = text.split_once(label)?;
    let value = value.trim();
    Some((!value.is_empty()).then(|| value.to_owned()))
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| SchoolError::Parse(format!("bad selector {css}: {err}")))
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    Ok(document
        .select(&selector(css)?)
        .next()
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty()))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}

#[cfg(test)]
#[path = "tests/information.rs"]
mod tests;
