use std::{error::Error, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
    Router,
};
use chrono::{Local, NaiveDate};
use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use log::info;
use reqwest::Client;

use super::calendar::{CalendarSource, NeisCalendar};
use super::error::SkillError;
use super::handlers;
use super::models::{Args, Config};
use crate::korean_school::{
    comcigan::{ComciganCache, HttpComcigan},
    directory::SchoolDirectory,
    meal::{DimigoMeals, NeisMealPage},
    models::SchoolRecord,
    KoreanSchool,
};

/// Context shared by every handler, built once at startup.
#[derive(Clone)]
pub struct SkillState {
    /// The school the skill answers for.
    pub school: Arc<SchoolRecord>,
    pub korean_school: Arc<KoreanSchool>,
    pub calendar: Arc<dyn CalendarSource>,
    /// Source of "today" for date-relative answers.
    pub today: Arc<dyn Fn() -> NaiveDate + Send + Sync>,
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Reads `config.json`, then `SKILL_*` variables, then `PORT`.
pub fn load_config(args: &Args) -> Result<Config, figment::Error> {
    Figment::new()
        .merge(Json::file(&args.config_json_path))
        .merge(Env::prefixed("SKILL_"))
        .merge(Env::raw().only(&["PORT"]))
        .extract()
}

pub fn build_state(config: &Config) -> Result<SkillState, Box<dyn Error>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let directory = match &config.directory_json_path {
        Some(path) => SchoolDirectory::from_path(path)?,
        None => SchoolDirectory::bundled()?,
    };
    let school = directory
        .find(config.school_office.as_str(), &config.school_name, true)
        .cloned()
        .ok_or_else(|| SkillError::SchoolNotFound {
            office: config.school_office.clone(),
            name: config.school_name.clone(),
        })?;
    info!("Answering for {} ({})", school.name, school.code);

    let comcigan = ComciganCache::new(
        Arc::new(HttpComcigan::new(
            client.clone(),
            config.comcigan_url.as_str(),
            Duration::from_secs(config.scrape_timeout_secs),
        )),
        Duration::from_secs(config.cache_ttl_secs),
    );
    let korean_school = KoreanSchool::new(
        directory,
        comcigan,
        Arc::new(NeisMealPage::new(client.clone())),
        Arc::new(DimigoMeals::new(client.clone(), config.dimigo_api_url.as_str())),
        client.clone(),
        config.school_info_url.as_str(),
    );

    Ok(SkillState {
        school: Arc::new(school),
        korean_school: Arc::new(korean_school),
        calendar: Arc::new(NeisCalendar::new(client)),
        today: Arc::new(local_today),
    })
}

pub fn router(state: SkillState) -> Router {
    Router::new()
        .route("/getTime", post(handlers::get_time))
        .route("/getMeal", post(handlers::get_meal))
        .route("/getSchoolSc", post(handlers::get_school_sc))
        .route("/blockId", post(handlers::block_id))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = std::time::Instant::now();
    let response = next.run(request).await;
    info!(
        "{} {} {} - {} ms",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

pub async fn serve(config: &Config, state: SkillState) -> Result<(), SkillError> {
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| SkillError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("Skill server is listening on {addr}");
    axum::serve(listener, router(state))
        .await
        .map_err(SkillError::Serve)
}
