use super::*;

fn school() -> SchoolRecord {
    SchoolRecord {
        code: "J100005716".to_owned(),
        office: "경기도".to_owned(),
        office_domain: "goe.go".to_owned(),
        name: "보평중학교".to_owned(),
    }
}

struct FixtureMeals;

#[async_trait]
impl MealSource for FixtureMeals {
    async fn meals(&self, _school: &SchoolRecord, _date: NaiveDate) -> Result<MonthlyMeals> {
        parse_meal_page(&std::fs::read_to_string("tests/test.meal_page.html").unwrap())
    }
}

#[test]
fn meal_cell_splits_on_markers() {
    assert_eq!(
        parse_meal_cell("1 [조식]Toast[중식]Rice[석식]Soup"),
        SchoolMeal {
            breakfast: Some("Toast".to_owned()),
            lunch: Some("Rice".to_owned()),
            dinner: Some("Soup".to_owned()),
        }
    );
}

#[test]
fn meal_cell_without_markers_is_empty() {
    let meal = parse_meal_cell("3");
    assert!(meal.is_empty());
}

#[test]
fn meal_page_indexes_by_day() {
    let html = "<table class=\"tbl_type3\"><tbody><tr><td><div>1 [조식]Toast[중식]Rice[석식]Soup</div></td></tr></tbody></table>";
    let meals = parse_meal_page(html).unwrap();
    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].as_ref().unwrap().breakfast.as_deref(), Some("Toast"));
    assert_eq!(meals[0].as_ref().unwrap().lunch.as_deref(), Some("Rice"));
    assert_eq!(meals[0].as_ref().unwrap().dinner.as_deref(), Some("Soup"));
}

#[test]
fn meal_page_keeps_line_breaks_and_entities() {
    let meals = parse_meal_page(&std::fs::read_to_string("tests/test.meal_page.html").unwrap()).unwrap();
    assert_eq!(meals.len(), 5);
    assert_eq!(
        meals[0],
        Some(SchoolMeal {
            breakfast: None,
            lunch: Some("보리밥\n어묵매운탕&김치".to_owned()),
            dinner: None,
        })
    );
    assert_eq!(meals[1].as_ref().unwrap().breakfast.as_deref(), Some("토스트"));
    assert_eq!(meals[1].as_ref().unwrap().dinner.as_deref(), Some("된장국"));
    assert!(meals[2].as_ref().unwrap().is_empty());
    assert_eq!(meals[3], None);
    assert_eq!(meals[4].as_ref().unwrap().lunch.as_deref(), Some("카레라이스"));
}

#[tokio::test]
async fn meal_picks_day_of_month() {
    let second = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let meal = FixtureMeals.meal(&school(), second).await.unwrap().unwrap();
    assert_eq!(meal.lunch.as_deref(), Some("비빔밥"));

    let fourth = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    assert_eq!(FixtureMeals.meal(&school(), fourth).await.unwrap(), None);

    let last = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    assert_eq!(FixtureMeals.meal(&school(), last).await.unwrap(), None);
}
