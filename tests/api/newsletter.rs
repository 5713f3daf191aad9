use crate::helpers::{IMAGE_FILTER, RECENT_FILTER, post_json, spawn_app, spawn_app_with};
use chrono::{Datelike, Utc};
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use linkify::{LinkFinder, LinkKind};
use serde_json::{Value, json};

fn image_posts() -> Vec<Value> {
    ["one", "two", "three", "four"]
        .iter()
        .map(|id| post_json(id, &Sentence(2..6).fake::<String>()))
        .collect()
}

#[tokio::test]
async fn test_run_creates_a_draft_on_any_day() {
    let app = spawn_app_with(|c| c.newsletter.weekday = Utc::now().weekday().succ()).await;

    app.mock_browse(IMAGE_FILTER, image_posts(), 4).await;
    app.mock_browse(RECENT_FILTER, vec![post_json("fresh", "Fresh")], 1)
        .await;
    app.mock_add_post("issue-1").await;

    let response = app.weekly_newsletter(true).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["postId"], "issue-1");
    assert_eq!(body["status"], "draft");
    assert_eq!(
        body["editUrl"],
        format!("{}/ghost/#/editor/post/issue-1", app.ghost_server.uri())
    );
    assert!(
        body["title"]
            .as_str()
            .unwrap()
            .starts_with("Weekly Newsletter - ")
    );

    let (post, url) = app.created_post().await;
    assert_eq!(post["status"], "draft");
    assert_eq!(post["tags"][0]["name"], "newsletter");
    assert!(!url.query_pairs().any(|(k, _)| k == "newsletter"));
}

#[tokio::test]
async fn issue_body_links_to_every_selected_post() {
    let app = spawn_app().await;

    app.mock_browse(IMAGE_FILTER, image_posts(), 4).await;
    app.mock_browse(RECENT_FILTER, vec![post_json("fresh", "Fresh")], 1)
        .await;
    app.mock_add_post("issue-1").await;

    app.weekly_newsletter(true).await;

    let (post, _) = app.created_post().await;
    let html = post["html"].as_str().unwrap();
    let links: Vec<&str> = LinkFinder::new()
        .links(html)
        .filter(|l| *l.kind() == LinkKind::Url)
        .map(|l| l.as_str())
        .filter(|l| !l.contains("/content/images/"))
        .collect();

    assert!(links.contains(&"https://blog.example.com/fresh/"));
    // hero plus two picks, each linked from its image and its caption
    let post_links = links
        .iter()
        .filter(|l| **l != "https://blog.example.com/fresh/")
        .count();
    assert_eq!(post_links, 6);

    let feature_image = post["feature_image"].as_str().unwrap();
    assert!(html.contains(feature_image));
}

#[tokio::test]
async fn live_run_on_the_scheduled_day_publishes_and_emails() {
    let app = spawn_app_with(|c| c.newsletter.weekday = Utc::now().weekday()).await;

    app.mock_browse(IMAGE_FILTER, image_posts(), 4).await;
    app.mock_browse(RECENT_FILTER, vec![], 0).await;
    app.mock_newsletters(json!([
        { "id": "n0", "name": "Product updates", "slug": "product-updates", "status": "active" },
        { "id": "n1", "name": "Weekly Digest", "slug": "weekly-digest", "status": "active" }
    ]))
    .await;
    app.mock_add_post("issue-2").await;

    let response = app.weekly_newsletter(false).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "published");

    let (post, url) = app.created_post().await;
    assert_eq!(post["status"], "published");
    assert_eq!(post["visibility"], "public");
    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(query.contains(&("newsletter".into(), "weekly-digest".into())));
    assert!(query.contains(&("email_segment".into(), "all".into())));
}

#[tokio::test]
async fn live_run_on_another_day_is_a_no_op() {
    let today = Utc::now().weekday();
    let app = spawn_app_with(|c| c.newsletter.weekday = today.succ()).await;

    let response = app.weekly_newsletter(false).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], format!("Not scheduled today ({today})"));
    assert!(body.get("postId").is_none());
    assert!(app.ghost_requests().await.is_empty());
}

#[tokio::test]
async fn loose_test_flag_values_run_in_live_mode() {
    let today = Utc::now().weekday();
    let app = spawn_app_with(|c| c.newsletter.weekday = today.succ()).await;

    for query in ["test=1", "test=TRUE", "test=yes"] {
        let response = app.weekly_newsletter_with_query(query).await;

        assert_eq!(response.status().as_u16(), 200, "{query}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({ "success": true, "message": format!("Not scheduled today ({today})") })
        );
    }
    assert!(app.ghost_requests().await.is_empty());
}

#[tokio::test]
async fn no_feature_images_fails_the_run() {
    let app = spawn_app().await;

    app.mock_browse(IMAGE_FILTER, vec![], 0).await;

    let response = app.weekly_newsletter(true).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Newsletter creation failed: No published posts with feature images found"
    );
}

#[tokio::test]
async fn unknown_newsletter_fails_a_live_run_without_creating_a_post() {
    let app = spawn_app_with(|c| c.newsletter.weekday = Utc::now().weekday()).await;

    app.mock_browse(IMAGE_FILTER, image_posts(), 4).await;
    app.mock_browse(RECENT_FILTER, vec![], 0).await;
    app.mock_newsletters(json!([
        { "id": "n0", "name": "Product updates", "slug": "product-updates", "status": "active" }
    ]))
    .await;

    let response = app.weekly_newsletter(false).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Newsletter creation failed: No newsletter matching 'weekly' found"
    );
    assert!(
        app.ghost_requests()
            .await
            .iter()
            .all(|r| r.method.as_str() != "POST")
    );
}
