//! End-to-end HTTP behaviour over the in-memory adapters.

use actix_web::cookie::{Cookie, time};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test};
use chrono::TimeDelta;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use resource_library::Trace;
use resource_library::domain::TRACE_ID_HEADER;
use resource_library::inbound::http::configure_api;
use resource_library::inbound::http::session_config::SESSION_COOKIE;
use resource_library::inbound::http::test_utils::memory_state;
use resource_library::test_support::MemoryLibrary;

#[fixture]
fn library() -> MemoryLibrary {
    MemoryLibrary::default()
}

async fn app(
    lib: &MemoryLibrary,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(memory_state(lib))
            .wrap(Trace)
            .configure(configure_api),
    )
    .await
}

fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie")
}

async fn login<S>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"username": username, "password": password}))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::OK, "login as {username}");
    session_cookie(&res)
}

#[rstest]
#[actix_web::test]
async fn registration_login_and_resource_visibility(library: MemoryLibrary) {
    library.seed_user("root", "rootpw", true).await;
    let app = app(&library).await;

    let register = || {
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({"username": "alice", "password": "s3cret"}))
            .to_request()
    };
    let res = test::call_service(&app, register()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = test::call_service(&app, register()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");

    let alice = login(&app, "alice", "s3cret").await;

    let wrong = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"username": "alice", "password": "nope"}))
        .to_request();
    let res = test::call_service(&app, wrong).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(TRACE_ID_HEADER));

    let resource = json!({
        "title": "Rotating secrets",
        "category": "security",
        "content": "Use short-lived credentials.",
        "requiresAdmin": true
    });
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/resources")
            .cookie(alice.clone())
            .set_json(&resource)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let root = login(&app, "root", "rootpw").await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/resources")
            .cookie(root.clone())
            .set_json(&resource)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["requiresAdmin"], true);
    let uri = format!("/api/resources/{}", created["id"]);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&uri).cookie(alice.clone()).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/resources").cookie(alice).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let listed: Value = test::read_body_json(res).await;
    assert_eq!(listed, json!([]));

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&uri).cookie(root).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(res).await;
    assert_eq!(fetched["title"], "Rotating secrets");
}

#[rstest]
#[actix_web::test]
async fn logout_ends_the_session(library: MemoryLibrary) {
    library.seed_user("ada", "pw", false).await;
    let app = app(&library).await;
    let cookie = login(&app, "ada", "pw").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(library.sessions.is_empty().await);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/user").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn expired_sessions_are_rejected_and_removed() {
    let library = MemoryLibrary::with_ttl(TimeDelta::hours(1));
    library.seed_user("ada", "pw", false).await;
    let app = app(&library).await;
    let cookie = login(&app, "ada", "pw").await;

    library.clock.advance_seconds(3601);
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/user").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(library.sessions.is_empty().await);
}

#[rstest]
#[actix_web::test]
async fn authenticated_requests_extend_the_session(library: MemoryLibrary) {
    library.seed_user("ada", "pw", false).await;
    let app = app(&library).await;
    let cookie = login(&app, "ada", "pw").await;

    for _ in 0..3 {
        library.clock.advance_seconds(45 * 60);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/user")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let refreshed = session_cookie(&res);
        assert_eq!(refreshed.value(), cookie.value());
        assert_eq!(refreshed.max_age(), Some(time::Duration::hours(1)));
    }
}

#[rstest]
#[actix_web::test]
async fn forbidden_requests_still_refresh_the_cookie(library: MemoryLibrary) {
    library.seed_user("ada", "pw", false).await;
    let app = app(&library).await;
    let cookie = login(&app, "ada", "pw").await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/users")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(session_cookie(&res).value(), cookie.value());
}

#[rstest]
#[case::create_with_unknown_category("post", "/api/resources", r#"{"title":"t","category":"networking","content":"c"}"#)]
#[case::create_with_malformed_json("post", "/api/resources", "{")]
#[case::patch_resource_with_unknown_field("patch", "/api/resources/1", r#"{"id":9}"#)]
#[case::patch_resource_with_empty_title("patch", "/api/resources/1", r#"{"title":"  "}"#)]
#[case::patch_user_with_empty_password("patch", "/api/users/1", r#"{"password":""}"#)]
#[case::patch_user_with_unknown_field("patch", "/api/users/1", r#"{"username":"x"}"#)]
#[actix_web::test]
async fn members_are_refused_before_their_payload_is_read(
    library: MemoryLibrary,
    #[case] method: &str,
    #[case] uri: &str,
    #[case] body: &str,
) {
    library.seed_user("ada", "pw", false).await;
    let app = app(&library).await;
    let cookie = login(&app, "ada", "pw").await;

    let req = match method {
        "post" => test::TestRequest::post(),
        _ => test::TestRequest::patch(),
    };
    let res = test::call_service(
        &app,
        req.uri(uri)
            .cookie(cookie)
            .insert_header(("content-type", "application/json"))
            .set_payload(body.to_owned())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn administrators_still_get_body_errors(library: MemoryLibrary) {
    library.seed_user("root", "rootpw", true).await;
    let app = app(&library).await;
    let cookie = login(&app, "root", "rootpw").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/resources")
            .cookie(cookie)
            .insert_header(("content-type", "application/json"))
            .set_payload("{")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_body");
}

#[rstest]
#[actix_web::test]
async fn user_administration_protects_admins(library: MemoryLibrary) {
    let root = library.seed_user("root", "rootpw", true).await;
    let bob = library.seed_user("bob", "bobpw", false).await;
    let app = app(&library).await;
    let cookie = login(&app, "root", "rootpw").await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/users/{}", root.id()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/users/{}", root.id()))
            .cookie(cookie.clone())
            .set_json(json!({"isAdmin": false}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/users/{}", bob.id()))
            .cookie(cookie.clone())
            .set_json(json!({"isAdmin": true}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let promoted: Value = test::read_body_json(res).await;
    assert_eq!(promoted["isAdmin"], true);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/users/{}", bob.id()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/users/{}", bob.id()))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case("/api/users")]
#[case("/api/resources")]
#[case("/api/user")]
#[actix_web::test]
async fn anonymous_callers_are_unauthorised(library: MemoryLibrary, #[case] uri: &str) {
    let app = app(&library).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}
