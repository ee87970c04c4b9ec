use super::*;

#[test]
fn information_fields_are_read_by_label() {
    let html = std::fs::read_to_string("tests/test.information.html").unwrap();
    let information = parse_information(&html).unwrap();
    assert_eq!(
        information,
        SchoolInformation {
            address: Some("경기도 성남시 분당구 판교로 123".to_owned()),
            area: Some("경기".to_owned()),
            class: Some("중".to_owned()),
            office: Some("경기도성남교육지원청".to_owned()),
            phone: Some("031-8016-8500".to_owned()),
            fax: Some("031-8016-8599".to_owned()),
            establishment_date: Some("2009-03-01".to_owned()),
            establishment_type: Some("공립".to_owned()),
            school_anniversary: Some("2009-03-01".to_owned()),
            school_type: Some("단설".to_owned()),
            site: None,
        }
    );
}

#[test]
fn empty_page_has_no_information() {
    let information = parse_information("<html><body></body></html>").unwrap();
    assert_eq!(information, SchoolInformation::default());
}

#[test]
fn euc_kr_page_decodes() {
    let html = "<ul class=\"School_Data\"><li>설립구분 사립</li></ul>";
    let (bytes, _, _) = EUC_KR.encode(html);
    let (decoded, _, _) = EUC_KR.decode(&bytes);
    let information = parse_information(&decoded).unwrap();
    assert_eq!(information.establishment_type.as_deref(), Some("사립"));
}
