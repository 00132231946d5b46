//! Request/response properties checked against small closure handlers.

use std::collections::BTreeMap;

use htest::{Harness, HttpRequest, RecordingReporter, ResponseRecorder};
use rstest::rstest;
use serde::{Deserialize, Serialize};

fn echo(req: &HttpRequest, res: &mut ResponseRecorder) {
    res.set_header("x-method", req.method.as_str());
    res.set_header("x-path", req.path.as_str());
    for (name, value) in req.headers.iter() {
        res.set_header(format!("x-echo-{name}"), value);
    }
    res.write(req.body_bytes());
}

fn router(req: &HttpRequest, res: &mut ResponseRecorder) {
    match req.path.as_str() {
        "/known" => res.write_str("here"),
        _ => {
            res.write_status(404);
            res.write_str("404 page not found");
        }
    }
}

#[rstest]
#[case("GET", "/", "GET")]
#[case("get", "/a/b", "GET")]
#[case("Post", "/form?x=1", "POST")]
#[case("put", "/items/7", "PUT")]
#[case("PATCH", "/items/7", "PATCH")]
#[case("delete", "/items/7", "DELETE")]
#[case("head", "/", "HEAD")]
#[case("options", "/opts", "OPTIONS")]
#[case("purge", "/cache", "PURGE")]
fn handler_sees_normalized_method_and_exact_path(
    #[case] method: &str,
    #[case] path: &str,
    #[case] normalized: &str,
) {
    let reporter = RecordingReporter::new();
    let test = Harness::new(&reporter, echo);

    let chain = test.request(method, path).dispatch();
    chain
        .expect_header("x-method", normalized)
        .expect_header("x-path", path);

    assert!(reporter.is_empty(), "{:?}", reporter.messages());
}

#[test]
fn repeated_add_header_overwrites() {
    let reporter = RecordingReporter::new();
    let test = Harness::new(&reporter, |req: &HttpRequest, res: &mut ResponseRecorder| {
        let values: Vec<_> = req.headers.get_all("x-token").collect();
        res.write_str(&values.join(","));
    });

    test.get("/")
        .add_header("X-Token", "one")
        .add_header("x-token", "two")
        .add_header("X-TOKEN", "three")
        .dispatch()
        .expect_body("three");
    assert!(reporter.is_empty());
}

#[rstest]
#[case("")]
#[case("my data")]
#[case("línea\nnueva ✓")]
fn send_string_round_trips(#[case] body: &str) {
    let reporter = RecordingReporter::new();
    let test = Harness::new(&reporter, echo);

    test.post("/").send_string(body).dispatch().expect_body(body);
    assert!(reporter.is_empty());
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u32,
    items: Vec<String>,
    notes: Option<String>,
    totals: BTreeMap<String, f64>,
}

#[test]
fn send_then_expect_json_round_trips() {
    let reporter = RecordingReporter::new();
    let test = Harness::new(&reporter, echo);
    let order = Order {
        id: 7,
        items: vec!["tea".to_string(), "cake".to_string()],
        notes: None,
        totals: BTreeMap::from([("net".to_string(), 9.5), ("tax".to_string(), 1.25)]),
    };

    test.post("/orders")
        .send(&order)
        .dispatch()
        .expect_header("x-echo-content-type", "application/json")
        .expect_json(&order);
    assert!(reporter.is_empty());
}

#[test]
fn explicit_empty_and_missing_headers_both_match_empty() {
    let reporter = RecordingReporter::new();
    let test = Harness::new(&reporter, |req: &HttpRequest, res: &mut ResponseRecorder| {
        if req.path == "/empty" {
            res.set_header("foo", "");
        }
    });

    test.get("/empty").dispatch().expect_header("foo", "");
    test.get("/missing").dispatch().expect_header("foo", "");
    assert!(reporter.is_empty());
}

#[test]
fn unmatched_route_is_404() {
    let reporter = RecordingReporter::new();
    let test = Harness::new(&reporter, router);

    test.get("/unknownpath").dispatch().expect_status(404);
    test.get("/known").dispatch().expect_status(200).expect_body("here");
    assert!(reporter.is_empty());
}

#[test]
fn failing_status_does_not_stop_the_body_check() {
    let reporter = RecordingReporter::new();
    let test = Harness::new(&reporter, router).named("chain");

    test.get("/nowhere")
        .dispatch()
        .expect_status(200)
        .expect_body("found");

    assert_eq!(
        reporter.messages(),
        [
            "chain: GET /nowhere: expected status 200, got 404",
            r#"chain: GET /nowhere: expected body "found", got "404 page not found""#,
        ]
    );
}

#[rstest]
#[case("flavor", "oatmeal", true)]
#[case("flavor", "raisin", false)]
#[case("missing", "oatmeal", false)]
fn expect_cookie_requires_exact_name_and_value(
    #[case] name: &str,
    #[case] value: &str,
    #[case] passes: bool,
) {
    let reporter = RecordingReporter::new();
    let test = Harness::new(&reporter, |_: &HttpRequest, res: &mut ResponseRecorder| {
        res.set_cookie(cookie::Cookie::new("flavor", "oatmeal"));
    });

    test.get("/").dispatch().expect_cookie(name, value);
    assert_eq!(reporter.is_empty(), passes);
}

#[test]
fn independent_harnesses_run_in_parallel() {
    std::thread::scope(|scope| {
        for worker in 0..4 {
            scope.spawn(move || {
                let reporter = RecordingReporter::new();
                let test = Harness::new(&reporter, echo).named(format!("worker-{worker}"));
                for round in 0..10 {
                    let body = format!("{worker}:{round}");
                    test.put("/").send_string(body.as_str()).dispatch().expect_body(&body);
                }
                assert!(reporter.is_empty());
            });
        }
    });
}
