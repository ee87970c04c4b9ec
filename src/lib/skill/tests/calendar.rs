use super::*;

#[test]
fn calendar_page_keeps_days_with_events() {
    let html = std::fs::read_to_string("tests/test.calendar_page.html").unwrap();
    let events = parse_calendar_page(&html).unwrap();
    assert_eq!(
        events,
        MonthEvents::from([
            (2, "입학식".to_owned()),
            (14, "학부모총회, 진단평가".to_owned()),
            (31, "개교기념일".to_owned()),
        ])
    );
}

#[test]
fn calendar_page_without_table_is_empty() {
    assert!(parse_calendar_page("<html></html>").unwrap().is_empty());
}
