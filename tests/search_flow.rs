use serde_json::json;

use pushkind_leads::domain::lead::SearchStatus;
use pushkind_leads::forms::search::{RangeInput, SearchForm};
use pushkind_leads::services::search::SearchController;

mod common;

fn names(leads: &[serde_json::Map<String, serde_json::Value>]) -> Vec<&str> {
    leads
        .iter()
        .map(|lead| lead["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_search_then_fetch_next_page() {
    let controller = SearchController::new(common::FakeApi::new([
        json!({"leads": [{"name": "A"}], "pagination": {"token": "tok1"}}),
        json!({"leads": [{"name": "B"}], "pagination": {}}),
    ]));
    let form = SearchForm {
        api_key: "key-1".to_string(),
        ..SearchForm::default()
    }
    .include("location", "US");

    controller.submit_form(form).await.unwrap();

    let view = controller.view();
    assert_eq!(view.status, SearchStatus::Idle);
    assert_eq!(view.page_numbers, [1]);
    assert_eq!(names(&view.visible_leads), ["A"]);
    assert!(view.has_more);

    controller.fetch_next_page().await.unwrap();

    let view = controller.view();
    assert_eq!(view.current_page, 2);
    assert_eq!(names(&view.visible_leads), ["B"]);
    assert!(!view.has_more);
    assert_eq!(names(&view.all_leads), ["A", "B"]);
    assert_eq!(view.search_count, 2);

    let requests = controller.api().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "key-1");
    assert_eq!(
        requests[0].1,
        json!({
            "query": {"location": {"include": ["US"]}},
            "pagination": {"size": 50}
        })
    );
    assert_eq!(
        requests[1].1,
        json!({
            "query": {"location": {"include": ["US"]}},
            "pagination": {"size": 50, "token": "tok1"}
        })
    );
}

#[tokio::test]
async fn test_normalized_form_reaches_the_api() {
    let controller = SearchController::new(common::FakeApi::new([json!([
        {"leads": [], "total": 0, "success": true}
    ])]));
    let form = SearchForm {
        api_key: "key-1".to_string(),
        headcount: RangeInput {
            more_than: "10".to_string(),
            less_than_or_equal: "abc".to_string(),
        },
        ..SearchForm::default()
    }
    .include("industry", " Google , ,Apple ")
    .exclude("currentJobTitle", "intern");

    controller.submit_form(form).await.unwrap();

    let requests = controller.api().requests();
    assert_eq!(
        requests[0].1["query"],
        json!({
            "industry": {"include": ["Google", "Apple"]},
            "currentCompanyName": {"include": ["Google", "Apple"]},
            "currentJobTitle": {"exclude": ["intern"]},
            "headcount": {">": 10}
        })
    );

    let view = controller.view();
    assert_eq!(view.total, Some(0));
    assert_eq!(view.success, Some(true));
    assert_eq!(view.search_count, 0);
    assert!(view.visible_leads.is_empty());
    assert!(!view.has_more);
}

#[tokio::test]
async fn test_page_links_follow_loaded_pages() {
    let controller = SearchController::new(common::FakeApi::new([
        json!({"leads": [{"name": "A"}], "pagination": {"token": "tok1"}}),
        json!({"leads": [{"name": "B"}], "pagination": {"token": "tok2"}}),
    ]));
    let form = SearchForm {
        api_key: "key-1".to_string(),
        ..SearchForm::default()
    }
    .include("keyword", "rust");

    controller.submit_form(form).await.unwrap();
    controller.go_to_page(2).await.unwrap();
    controller.go_to_page(1).await.unwrap();

    let links = controller.view().page_links;
    assert_eq!(links.current, 1);
    assert_eq!(links.fetchable, Some(3));
    assert!(!links.can_go_prev);
    assert!(links.can_go_next);
    assert!(links.is_enabled(2, false));
    assert!(links.is_enabled(3, false));
    assert!(!links.is_enabled(4, false));
    assert!(controller.go_to_page(4).await.is_err());
    assert_eq!(controller.api().requests().len(), 2);
}
