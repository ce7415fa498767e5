//! End-to-end portal flow: sign in, list customers, Multipass redirect.

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde_json::Value;

use rep_portal::config::RosterConfig;
use rep_portal::multipass::MultipassIssuer;
use rep_portal_integration_tests::{
    Fault, MockShopify, REP_PASSWORD, STOREFRONT_DOMAIN, TestPortal, customer_node,
};

const REP: &str = "rep.one@x.com";

fn roster() -> Vec<Value> {
    vec![
        customer_node(
            Some("chef@bistro.example"),
            "Anna Koch",
            Some("Bistro Nord"),
            Some("K-10042"),
            Some("Rep.One@x.com; rep.two@x.com"),
        ),
        customer_node(
            Some("kitchen@hotel.example"),
            "Hotel Kitchen",
            Some("Grand Hotel"),
            None,
            Some("rep.two@x.com"),
        ),
        customer_node(
            Some("buyer@deli.example"),
            "Deli Buyer",
            Some("Corner Deli"),
            Some("K-20077"),
            Some("rep.three@x.com\nREP.ONE@x.com"),
        ),
    ]
}

fn small_pages() -> RosterConfig {
    RosterConfig {
        page_size: 2,
        ..RosterConfig::default()
    }
}

fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("missing Location header")
        .to_string()
}

#[tokio::test]
async fn test_health() {
    let portal = TestPortal::start(roster(), small_pages()).await;
    let resp = portal
        .client
        .get(portal.url("/health"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_requires_sign_in() {
    let portal = TestPortal::start(roster(), small_pages()).await;

    let resp = portal
        .client
        .get(portal.url("/customers"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = portal
        .client
        .post(portal.url("/go"))
        .form(&[("email", "chef@bistro.example")])
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(portal.shopify.requests(), 0);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let portal = TestPortal::start(roster(), small_pages()).await;

    let resp = portal.login(REP, "not-the-password").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = portal.login("not-an-email", REP_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = portal
        .client
        .get(portal.url("/customers"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_in_list_and_multipass_redirect() {
    let portal = TestPortal::start(roster(), small_pages()).await;

    let resp = portal.login("  Rep.One@X.com ", REP_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/customers");

    // Only the rep's customers, in roster order, across two pages
    let resp = portal
        .client
        .get(portal.url("/customers"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["rep"], REP);
    assert_eq!(body["count"], 2);
    assert_eq!(body["customers"][0]["email"], "chef@bistro.example");
    assert_eq!(body["customers"][1]["email"], "buyer@deli.example");
    assert_eq!(portal.shopify.requests(), 2);

    // Search narrows within the rep's customers
    let resp = portal
        .client
        .get(portal.url("/customers?q=k-20077"))
        .send()
        .await
        .expect("request failed");
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["count"], 1);
    assert_eq!(body["customers"][0]["company"], "Corner Deli");

    // Multipass redirect for an assigned customer
    let resp = portal
        .client
        .post(portal.url("/go"))
        .form(&[("email", "CHEF@bistro.example"), ("return_to", "/collections/knives")])
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let target = location(&resp);
    let prefix = format!("https://{STOREFRONT_DOMAIN}/account/login/multipass/");
    let token = target.strip_prefix(&prefix).expect("unexpected redirect target");
    assert!(!token.contains('='));

    let claim = MultipassIssuer::new(&portal.config.multipass)
        .decode(token)
        .expect("token must verify");
    assert_eq!(claim.email().as_str(), "chef@bistro.example");
    assert_eq!(claim.return_to(), Some("/collections/knives"));
}

#[tokio::test]
async fn test_unassigned_customer_is_forbidden() {
    let portal = TestPortal::start(roster(), small_pages()).await;
    assert_eq!(portal.login(REP, REP_PASSWORD).await.status(), StatusCode::SEE_OTHER);

    for email in ["kitchen@hotel.example", "stranger@nowhere.example"] {
        let resp = portal
            .client
            .post(portal.url("/go"))
            .form(&[("email", email)])
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{email}");
        assert!(resp.headers().get(LOCATION).is_none());
    }
}

#[tokio::test]
async fn test_external_return_to_is_rejected() {
    let portal = TestPortal::start(roster(), small_pages()).await;
    assert_eq!(portal.login(REP, REP_PASSWORD).await.status(), StatusCode::SEE_OTHER);

    let resp = portal
        .client
        .post(portal.url("/go"))
        .form(&[("email", "chef@bistro.example"), ("return_to", "https://evil.example")])
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_roster_failure_is_bad_gateway_not_empty_list() {
    let shopify = MockShopify::start_with_fault(roster(), Some(Fault::ServerError(2))).await;
    let portal = TestPortal::start_with_shopify(shopify, small_pages()).await;
    assert_eq!(portal.login(REP, REP_PASSWORD).await.status(), StatusCode::SEE_OTHER);

    let resp = portal
        .client
        .get(portal.url("/customers"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let portal = TestPortal::start(roster(), small_pages()).await;
    assert_eq!(portal.login(REP, REP_PASSWORD).await.status(), StatusCode::SEE_OTHER);

    let resp = portal
        .client
        .post(portal.url("/auth/logout"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let resp = portal
        .client
        .get(portal.url("/customers"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
