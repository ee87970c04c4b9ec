use std::sync::atomic::{AtomicUsize, Ordering};

use base64::{engine::general_purpose::STANDARD, Engine};

use super::decode::{decode, lonely_key_rule, FieldTable};
use super::*;

fn fixture_payload() -> RawPayload {
    RawPayload {
        page_source: std::fs::read_to_string("tests/test.comcigan_page.html").unwrap(),
        text: std::fs::read_to_string("tests/test.comcigan_raw.txt").unwrap(),
    }
}

fn school() -> SchoolRecord {
    SchoolRecord {
        code: "J100005716".to_owned(),
        office: "경기도".to_owned(),
        office_domain: "goe.go".to_owned(),
        name: "보평중학교".to_owned(),
    }
}

struct CountingSource {
    scrapes: AtomicUsize,
}

#[async_trait]
impl ComciganSource for CountingSource {
    async fn scrape(&self, _school: &SchoolRecord) -> Result<RawPayload> {
        self.scrapes.fetch_add(1, Ordering::SeqCst);
        Ok(fixture_payload())
    }
}

struct BrokenSource;

#[async_trait]
impl ComciganSource for BrokenSource {
    async fn scrape(&self, _school: &SchoolRecord) -> Result<RawPayload> {
        Err(SchoolError::Upstream("site down".to_owned()))
    }
}

#[test]
fn field_table_reads_names_from_page_script() {
    let raw = fixture_payload();
    let line = decode::payload_line(&raw.text).unwrap();
    let table = FieldTable::recover(&raw.page_source, line);
    assert_eq!(table.canonical("자료446"), Some("성명"));
    assert_eq!(table.canonical("자료4461"), Some("학급수"));
    assert_eq!(table.canonical("자료402"), Some("긴과목명"));
    assert_eq!(table.canonical("자료147"), Some("시간표"));
    assert_eq!(table.canonical("자료245"), Some("학급시간표"));
}

#[test]
fn field_table_applies_date_and_lonely_key_rules() {
    let raw = fixture_payload();
    let line = decode::payload_line(&raw.text).unwrap();
    let table = FieldTable::recover(&raw.page_source, line);
    assert_eq!(table.canonical("자료311"), Some("저장일"));
    assert_eq!(table.canonical("자료542"), Some("교사시간표"));
    assert_eq!(table.canonical("자료301"), Some("과목명"));
    assert_eq!(table.canonical("자료999"), None);
}

#[test]
fn field_table_keeps_first_binding_of_each_key() {
    let page = "a=자료.자료441; 성명=자료.자료44; 과목명 = 자료.자료441;";
    let raw = r#"{"교사수":1,"자료44":[""],"자료441":[1]}"#;
    let table = FieldTable::recover(page, raw);
    assert_eq!(table.canonical("자료44"), Some("성명"));
    assert_eq!(table.canonical("자료441"), Some("a"));
}

#[test]
fn lonely_key_counts_occurrences() {
    let raw = r#"{"자료1":[1],"자료2":[2],"note":"자료2"}"#;
    assert_eq!(lonely_key_rule(raw, "자료1"), "교사시간표");
    assert_eq!(lonely_key_rule(raw, "자료2"), "과목명");
}

#[test]
fn decode_builds_canonical_payload() {
    let payload = decode(&fixture_payload()).unwrap();
    assert_eq!(payload.teacher_count, Some(3));
    assert_eq!(payload.teacher_names, vec!["", "김철수", "이영희", "박민수"]);
    assert_eq!(payload.subject_names, vec!["", "국어", "수학", "영어"]);
    assert_eq!(payload.long_subject_name(3).as_deref(), Some("영어회화"));
    assert_eq!(payload.saved_at.as_deref(), Some("2024-03-04 08:12:33"));
    assert_eq!(payload.school_name.as_deref(), Some("보평중학교"));
    assert_eq!(payload.school_year, Some(2024));
    assert_eq!(payload.original_grid.cell(&[1, 1, 2, 1]), Some(202));
    assert_eq!(payload.class_grid.cell(&[1, 1, 2, 1]), Some(303));
    assert_eq!(payload.teacher_grid.cell(&[3, 2, 1]), Some(10103));
}

#[test]
fn decode_rejects_body_without_marker() {
    let raw = RawPayload {
        page_source: String::new(),
        text: r#"{"학교검색":[]}"#.to_owned(),
    };
    assert!(matches!(decode(&raw), Err(SchoolError::Parse(_))));
}

#[test]
fn intercept_recognises_search_results() {
    let body = "{\"학교검색\":[[24966,\"경기\",\"보평중학교\",12045],[24966,\"경기\",\"보평고등학교\",12046]]}\0\0";
    match intercept(body) {
        Intercepted::SearchHits(hits) => {
            assert_eq!(hits.len(), 2);
            assert_eq!(
                hits[0],
                SearchHit {
                    region: "경기".to_owned(),
                    name: "보평중학교".to_owned(),
                    code: 12045,
                }
            );
        }
        other => panic!("expected search hits, got {other:?}"),
    }
}

#[test]
fn intercept_captures_first_line_of_payload() {
    let raw = fixture_payload();
    match intercept(&raw.text) {
        Intercepted::Payload(line) => {
            assert!(line.starts_with("{\"교사수\":3"));
            assert!(line.ends_with('}'));
        }
        other => panic!("expected payload, got {other:?}"),
    }
    assert_eq!(intercept("<html></html>"), Intercepted::Other);
}

#[test]
fn site_routes_come_from_page_script() {
    let routes = SiteRoutes::from_page(&fixture_payload().page_source).unwrap();
    assert_eq!(routes.search_path, "/36179?17384l");
    assert_eq!(routes.data_prefix, "73629_");

    let url = routes.data_url("http://comci.kr:4081", 12045);
    let token = url.strip_prefix("http://comci.kr:4081/36179_T?").unwrap();
    assert_eq!(STANDARD.decode(token).unwrap(), b"73629_12045_0_1");
}

#[test]
fn site_routes_require_search_route() {
    assert!(matches!(
        SiteRoutes::from_page("<html></html>"),
        Err(SchoolError::Parse(_))
    ));
}

#[test]
fn school_name_is_percent_encoded_as_euc_kr() {
    let encoded = euc_kr_percent_encode("보평");
    assert_eq!(encoded.len(), 12);
    assert!(encoded.starts_with('%'));
    assert_eq!(euc_kr_percent_encode("A"), "%41");
}

#[tokio::test(start_paused = true)]
async fn cache_serves_same_snapshot_within_ttl() {
    let source = Arc::new(CountingSource {
        scrapes: AtomicUsize::new(0),
    });
    let cache = ComciganCache::new(source.clone(), DEFAULT_TTL);

    let first = cache.get(&school()).await.unwrap();
    tokio::time::advance(Duration::from_secs(4 * 60 + 59)).await;
    let second = cache.get(&school()).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.scrapes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cache_refetches_once_stale() {
    let source = Arc::new(CountingSource {
        scrapes: AtomicUsize::new(0),
    });
    let cache = ComciganCache::new(source.clone(), DEFAULT_TTL);

    let first = cache.get(&school()).await.unwrap();
    tokio::time::advance(DEFAULT_TTL).await;
    let second = cache.get(&school()).await.unwrap();
    let third = cache.get(&school()).await.unwrap();

    assert_eq!(source.scrapes.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));
    assert_eq!(*first, *second);
}

#[tokio::test]
async fn cache_surfaces_fetch_errors() {
    let cache = ComciganCache::new(Arc::new(BrokenSource), DEFAULT_TTL);
    let err = cache.get(&school()).await.unwrap_err();
    assert!(err.is_fetch());
}

#[tokio::test]
async fn scrape_times_out_when_site_never_answers() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let comcigan = HttpComcigan::new(
        Client::new(),
        format!("http://{addr}/st"),
        Duration::from_millis(200),
    );
    let err = comcigan.scrape(&school()).await.unwrap_err();
    assert!(matches!(err, SchoolError::Timeout(_)));
}
