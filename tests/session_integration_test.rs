//! Cookies, keep-alive and logout over HTTP.

mod common;

use std::time::Duration;

use common::{envelope, jar_path, Console};
use jboxctl::gate::Gated;
use jboxctl::session::cookies::CookieJar;
use jboxctl::session::keepalive::{KeepAlive, PingStatus, SESSION_TERMINATED};
use jboxctl::session::logout::{logout, LOGOUT_PROMPT};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_set_cookie_is_persisted_and_replayed() {
    let dir = TempDir::new().unwrap();
    let jar = jar_path(&dir);
    let console = Console::start_with({
        let jar = jar.clone();
        move |config| config.with_cookie_path(Some(jar))
    })
    .await;

    Mock::given(path("/ping/"))
        .and(header("Cookie", "sessname=abc"))
        .respond_with(ResponseTemplate::new(204))
        .named("ping with cookie")
        .mount(&console.server)
        .await;
    Mock::given(path("/ping/"))
        .respond_with(
            ResponseTemplate::new(204).insert_header("Set-Cookie", "sessname=abc; Path=/"),
        )
        .with_priority(10)
        .mount(&console.server)
        .await;

    console.ctx.channel().ping().await.unwrap();
    assert_eq!(
        console.ctx.channel().cookies().get("sessname").as_deref(),
        Some("abc")
    );

    let reloaded = CookieJar::load(&jar).unwrap();
    assert_eq!(reloaded.get("sessname").as_deref(), Some("abc"));

    console.ctx.channel().ping().await.unwrap();
    let requests = console.server.received_requests().await.unwrap();
    assert_eq!(
        requests[1].headers.get("cookie").and_then(|v| v.to_str().ok()),
        Some("sessname=abc")
    );
}

#[tokio::test]
async fn test_keepalive_logs_out_once_past_threshold() {
    let console = Console::start_with(|config| {
        config
            .with_max_ping_fails(1)
            .with_ping_interval(Duration::from_millis(10))
    })
    .await;
    console.ctx.channel().cookies().set("sessname", "abc");
    console.ctx.channel().cookies().set("theme", "dark");

    Mock::given(path("/ping/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&console.server)
        .await;

    let keepalive = KeepAlive::new(console.ctx.clone());
    assert_eq!(keepalive.send_keep_alive().await, PingStatus::Failed { fails: 1 });
    assert_eq!(keepalive.send_keep_alive().await, PingStatus::LoggedOut);
    assert_eq!(keepalive.send_keep_alive().await, PingStatus::Skipped);

    assert_eq!(console.ui.alerts(), vec![SESSION_TERMINATED]);
    assert_eq!(console.ui.navigations(), vec!["/"]);
    let cookies = console.ctx.channel().cookies();
    assert!(cookies.get("sessname").is_none());
    assert_eq!(cookies.get("theme").as_deref(), Some("dark"));
    assert_eq!(console.request_count().await, 2);
}

#[tokio::test]
async fn test_keepalive_success_resets_failures() {
    let console = Console::start_with(|config| config.with_max_ping_fails(1)).await;

    Mock::given(path("/ping/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&console.server)
        .await;
    Mock::given(path("/ping/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&console.server)
        .await;

    let keepalive = KeepAlive::new(console.ctx.clone());
    assert_eq!(keepalive.send_keep_alive().await, PingStatus::Failed { fails: 1 });
    assert_eq!(keepalive.send_keep_alive().await, PingStatus::Alive);
    assert_eq!(keepalive.fails(), 0);
    assert!(!keepalive.is_logged_out());
}

#[tokio::test]
async fn test_keepalive_loop_ends_at_logout() {
    let console = Console::start_with(|config| {
        config
            .with_max_ping_fails(0)
            .with_ping_interval(Duration::from_millis(10))
    })
    .await;
    Mock::given(path("/ping/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&console.server)
        .await;

    let keepalive = KeepAlive::new(console.ctx.clone());
    tokio::time::timeout(Duration::from_secs(5), keepalive.run())
        .await
        .expect("loop ends once logged out");
    assert!(keepalive.is_logged_out());
    assert_eq!(console.ui.alerts(), vec![SESSION_TERMINATED]);
}

#[tokio::test]
async fn test_logout_calls_backend_then_clears_session() {
    let console = Console::start().await;
    console.ctx.channel().cookies().set("sessname", "abc");
    console.ctx.channel().cookies().set("hostipnb", "xyz");

    Mock::given(method("GET"))
        .and(path("/hostadmin/"))
        .and(query_param("logout", "me"))
        .respond_with(envelope(0, json!(null)))
        .expect(1)
        .mount(&console.server)
        .await;

    let Gated::Done(mut removed) = logout(&console.ctx).await else {
        panic!("logout should run when confirmed");
    };
    removed.sort();

    assert_eq!(removed, vec!["hostipnb", "sessname"]);
    assert_eq!(console.ui.confirms(), vec![LOGOUT_PROMPT]);
    assert_eq!(console.ui.navigations(), vec!["/"]);
    assert!(console.ctx.channel().cookies().is_empty());
}

#[tokio::test]
async fn test_logout_clears_locally_when_backend_fails() {
    let console = Console::start().await;
    console.ctx.channel().cookies().set("juliabox", "token");
    Mock::given(path("/hostadmin/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&console.server)
        .await;

    assert!(logout(&console.ctx).await.is_done());
    assert!(console.ctx.channel().cookies().get("juliabox").is_none());
}

#[tokio::test]
async fn test_declined_logout_sends_nothing() {
    let console = Console::start().await;
    console.ui.set_default_answer(false);
    console.ctx.channel().cookies().set("sessname", "abc");

    assert_eq!(logout(&console.ctx).await, Gated::Declined);
    assert_eq!(console.request_count().await, 0);
    assert_eq!(console.ctx.channel().cookies().get("sessname").as_deref(), Some("abc"));
}
