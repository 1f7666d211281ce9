//! Serving the report over `http` request and response types.

use alloc_profiler::{Config, Engine, Error, ReportFormat, RequestUrl, ThreadKey};
use http::{Request, Response, StatusCode, Uri};

fn engine_with_one_session() -> Engine {
    let engine = Engine::new(Config::builder().format(ReportFormat::Short).build());

    engine.open("f1", None);
    engine.on_object_created(ThreadKey::current());
    engine.close();

    engine
}

#[test]
fn report_request_is_answered() {
    let engine = engine_with_one_session();

    let request = Request::get("http://localhost:8080/shop/profiler")
        .body(())
        .unwrap();
    let mut response = Response::new(String::new());

    assert!(engine.try_serve(&request, &mut response));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.body(),
        "Profiler result for last 1 items:\nf1;1;0;1;0\n"
    );
}

#[test]
fn query_string_is_ignored() {
    let engine = engine_with_one_session();

    let uri: Uri = "http://localhost/shop/profiler?refresh=1".parse().unwrap();
    let mut response = Response::new(Vec::new());

    assert!(engine.try_serve(&uri, &mut response));
    assert_eq!(
        String::from_utf8(response.into_body()).unwrap(),
        "Profiler result for last 1 items:\nf1;1;0;1;0\n"
    );
}

#[test]
fn other_requests_pass_through() {
    let engine = engine_with_one_session();

    for url in ["/shop/orders", "/shop/profiler/details", "/"] {
        let request = Request::get(url).body(()).unwrap();
        let mut response = Response::new(Vec::new());
        *response.status_mut() = StatusCode::ACCEPTED;

        assert!(!engine.try_serve(&request, &mut response));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(response.body().is_empty());
    }
}

struct BrokenRequest;

impl RequestUrl for BrokenRequest {
    fn request_url(&self) -> Result<String, Error> {
        Err(Error::Enrichment {
            problem: "connection already recycled".to_string(),
        })
    }
}

#[test]
fn request_without_url_passes_through() {
    let engine = engine_with_one_session();
    let mut response = Response::new(Vec::new());

    assert!(!engine.try_serve(&BrokenRequest, &mut response));
    assert!(response.body().is_empty());
}

#[test]
fn request_url_names_session() {
    let engine = Engine::new(Config::builder().format(ReportFormat::Short).build());
    let request = Request::get("http://localhost/shop/orders?id=7")
        .body(())
        .unwrap();

    let session = engine.open("shop/OrderHandler.handle", Some(&request));
    engine.close();

    assert_eq!(session.name(), "http://localhost/shop/orders");
}

#[test]
fn broken_request_falls_back_to_method_name() {
    let engine = Engine::new(Config::builder().format(ReportFormat::Short).build());

    let session = engine.open("shop/Orders.handle", Some(&BrokenRequest));
    engine.close();

    assert_eq!(session.name(), "shop.Orders.handle");
}
