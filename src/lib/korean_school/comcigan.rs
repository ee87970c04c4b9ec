//! Comcigan timetable scraping and the per-school snapshot cache.
use std::{collections::HashMap, sync::Arc, sync::LazyLock, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use encoding_rs::EUC_KR;
use log::{debug, info};
use regex::Regex;
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::{
    sync::{oneshot, RwLock},
    time::Instant,
};

use super::error::{Result, SchoolError};
use super::models::{comcigan_model::ComciganPayload, SchoolRecord};

pub mod decode;

use decode::{payload_line, RawPayload, PAYLOAD_MARKER, SEARCH_MARKER};

pub const DEFAULT_ENTRY_URL: &str = "http://comci.kr:4081/st";
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(30);

static SEARCH_ROUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"url\s*:\s*'\.?(/\d+\?\d+l)'").unwrap());

static DATA_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sc_data\(\s*'(\d+_)'").unwrap());

/// Anything able to run one scrape session against the timetable site.
#[async_trait]
pub trait ComciganSource: Send + Sync {
    async fn scrape(&self, school: &SchoolRecord) -> Result<RawPayload>;
}

/// Scrapes the public Comcigan student page over plain HTTP, replaying the
/// requests its search form makes.
pub struct HttpComcigan {
    client: Client,
    entry_url: String,
    timeout: Duration,
}

impl HttpComcigan {
    pub fn new(client: Client, entry_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            entry_url: entry_url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ComciganSource for HttpComcigan {
    async fn scrape(&self, school: &SchoolRecord) -> Result<RawPayload> {
        info!("Scraping Comcigan timetable for {}", school.name);
        let (result_tx, result_rx) = oneshot::channel();
        let session = tokio::spawn(run_session(
            self.client.clone(),
            self.entry_url.clone(),
            school.name.clone(),
            result_tx,
        ));

        match tokio::time::timeout(self.timeout, result_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(SchoolError::Upstream(
                "scrape session ended without a timetable response".to_owned(),
            )),
            Err(_) => {
                session.abort();
                Err(SchoolError::Timeout(self.timeout))
            }
        }
    }
}

/// What a response body means to the session.
#[derive(Debug, PartialEq)]
pub enum Intercepted {
    /// School search results; the session follows the first hit.
    SearchHits(Vec<SearchHit>),
    /// First line of the timetable response.
    Payload(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub region: String,
    pub name: String,
    pub code: u64,
}

pub fn intercept(body: &str) -> Intercepted {
    let body = body.trim_end_matches('\0');
    if body.contains(PAYLOAD_MARKER) {
        return match payload_line(body) {
            Some(line) => Intercepted::Payload(line.to_owned()),
            None => Intercepted::Other,
        };
    }
    if body.contains(SEARCH_MARKER) {
        return Intercepted::SearchHits(parse_search_hits(body));
    }
    Intercepted::Other
}

fn parse_search_hits(body: &str) -> Vec<SearchHit> {
    let Some(line) = payload_line(body) else {
        return Vec::new();
    };
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return Vec::new();
    };
    value["학교검색"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    Some(SearchHit {
                        region: row.get(1)?.as_str()?.to_owned(),
                        name: row.get(2)?.as_str()?.to_owned(),
                        code: row.get(3)?.as_u64()?,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Routes the landing page script uses for searching and loading data.
#[derive(Debug, PartialEq, Eq)]
pub struct SiteRoutes {
    pub search_path: String,
    pub data_prefix: String,
}

impl SiteRoutes {
    pub fn from_page(page_source: &str) -> Result<Self> {
        let search_path = SEARCH_ROUTE
            .captures(page_source)
            .map(|captures| captures[1].to_owned())
            .ok_or_else(|| SchoolError::Parse("search route not found in page".to_owned()))?;
        let data_prefix = DATA_PREFIX
            .captures(page_source)
            .map(|captures| captures[1].to_owned())
            .ok_or_else(|| SchoolError::Parse("data prefix not found in page".to_owned()))?;
        Ok(Self {
            search_path,
            data_prefix,
        })
    }

    pub fn search_url(&self, origin: &str, school_name: &str) -> String {
        format!("{origin}{}{}", self.search_path, euc_kr_percent_encode(school_name))
    }

    /// `/36179?17384l` becomes `/36179_T?<base64("<prefix><code>_0_1")>`.
    pub fn data_url(&self, origin: &str, school_code: u64) -> String {
        let stem = self
            .search_path
            .split('?')
            .next()
            .unwrap_or(&self.search_path);
        let token = STANDARD.encode(format!("{}{}_0_1", self.data_prefix, school_code));
        format!("{origin}{stem}_T?{token}")
    }
}

pub fn euc_kr_percent_encode(text: &str) -> String {
    let (bytes, _, _) = EUC_KR.encode(text);
    bytes.iter().map(|byte| format!("%{byte:02X}")).collect()
}

async fn run_session(
    client: Client,
    entry_url: String,
    school_name: String,
    result_tx: oneshot::Sender<Result<RawPayload>>,
) {
    let result = drive_session(&client, &entry_url, &school_name).await;
    // the receiver is gone once the caller timed out
    let _ = result_tx.send(result);
}

async fn drive_session(client: &Client, entry_url: &str, school_name: &str) -> Result<RawPayload> {
    let entry = Url::parse(entry_url)
        .map_err(|err| SchoolError::Parse(format!("bad Comcigan url {entry_url}: {err}")))?;
    let origin = entry.origin().ascii_serialization();

    let page_bytes = client.get(entry.clone()).send().await?.bytes().await?;
    let (page_source, _, _) = EUC_KR.decode(&page_bytes);
    let page_source = page_source.into_owned();
    let routes = SiteRoutes::from_page(&page_source)?;
    debug!("Comcigan routes: {:?}", routes);

    let mut next_url = routes.search_url(&origin, school_name);
    let mut searched = false;
    loop {
        let bytes = client.get(&next_url).send().await?.bytes().await?;
        let body = String::from_utf8_lossy(&bytes);
        match intercept(&body) {
            Intercepted::SearchHits(_) if searched => {
                return Err(SchoolError::Upstream(format!(
                    "Comcigan answered {next_url} with search results again"
                )))
            }
            Intercepted::SearchHits(hits) => {
                searched = true;
                let hit = hits.first().ok_or_else(|| {
                    SchoolError::Upstream(format!("Comcigan knows no school named {school_name}"))
                })?;
                debug!("Following search hit {} ({})", hit.name, hit.code);
                next_url = routes.data_url(&origin, hit.code);
            }
            Intercepted::Payload(line) => {
                return Ok(RawPayload {
                    page_source,
                    text: line,
                })
            }
            Intercepted::Other => {
                return Err(SchoolError::Upstream(format!(
                    "unexpected Comcigan response from {next_url}"
                )))
            }
        }
    }
}

struct CacheEntry {
    payload: Arc<ComciganPayload>,
    fetched_at: Instant,
}

/// Decoded snapshots per school code, refreshed once older than the TTL.
///
/// Concurrent misses for one school each run their own scrape; the last
/// writer replaces the entry whole.
pub struct ComciganCache {
    source: Arc<dyn ComciganSource>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ComciganCache {
    pub fn new(source: Arc<dyn ComciganSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, school: &SchoolRecord) -> Result<Arc<ComciganPayload>> {
        if let Some(entry) = self.entries.read().await.get(&school.code) {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!("Comcigan cache hit for {}", school.code);
                return Ok(Arc::clone(&entry.payload));
            }
        }

        debug!("Comcigan cache miss for {}", school.code);
        let raw = self.source.scrape(school).await?;
        let payload = Arc::new(decode::decode(&raw)?);
        self.entries.write().await.insert(
            school.code.clone(),
            CacheEntry {
                payload: Arc::clone(&payload),
                fetched_at: Instant::now(),
            },
        );
        Ok(payload)
    }
}

#[cfg(test)]
#[path = "tests/comcigan.rs"]
mod tests;
