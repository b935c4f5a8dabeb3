use routecomb::{Request, Router, RuleFile};
use std::sync::Arc;
use std::thread;

fn zoo_rules() -> &'static str {
    r#"
rules:
  - url: /
    method: GET
    action: root_handler
  - url: /zoo/animals
    method: GET
    action: get_animals
  - url: /zoo/animals
    method: POST
    action: create_animal
  - url: /zoo/animals/(\d+)
    method: GET
    action: get_animal
  - url: /zoo/animals/(\d+)
    method: "{PUT,PATCH}"
    action: update_animal
  - url: /zoo/animals/*
    method: DELETE
    action: delete_animal
  - url: /zoo/health
    method: "{HEAD,OPTIONS}"
    action: health_check
  - url: /zoo/files/**
    method: GET
    action: files
  - url: /zoo/search?q&page=(\d+)
    action: search
  - url: /zoo/feed
    headers:
      - x-keeper
      - { accept: "application\\/(json|xml)" }
    action: feed
"#
}

fn zoo_router() -> Router<String> {
    let file: RuleFile = serde_yaml::from_str(zoo_rules()).expect("failed to parse rules");
    file.finalize().expect("failed to build router")
}

fn assert_route_match(router: &Router<String>, method: &str, path: &str, expected_action: &str) {
    match router.route(method, path) {
        Some(m) => {
            println!("✅ {} {} → {} {:?}", method, path, m.action, m.captures);
            assert_eq!(
                m.action, expected_action,
                "Action mismatch for {} {}: expected '{}', got '{}'",
                method, path, expected_action, m.action
            );
        }
        None => {
            println!("❌ {} {} → no match", method, path);
            assert_eq!(
                expected_action, "<none>",
                "Expected route to match for {} {}",
                method, path
            );
        }
    }
}

fn captures(router: &Router<String>, request: &Request) -> Option<Vec<String>> {
    router.dispatch(request).map(|m| m.captures.to_vec())
}

#[test]
fn test_router_get_animals() {
    assert_route_match(&zoo_router(), "GET", "/zoo/animals", "get_animals");
}

#[test]
fn test_router_post_animals() {
    assert_route_match(&zoo_router(), "POST", "/zoo/animals", "create_animal");
}

#[test]
fn test_router_get_animal_by_id() {
    let router = zoo_router();
    assert_route_match(&router, "GET", "/zoo/animals/123", "get_animal");
    assert_route_match(&router, "GET", "/zoo/animals/abc", "<none>");
}

#[test]
fn test_router_expanded_methods() {
    let router = zoo_router();
    assert_route_match(&router, "PUT", "/zoo/animals/123", "update_animal");
    assert_route_match(&router, "PATCH", "/zoo/animals/123", "update_animal");
    assert_route_match(&router, "HEAD", "/zoo/health", "health_check");
    assert_route_match(&router, "OPTIONS", "/zoo/health", "health_check");
    assert_route_match(&router, "TRACE", "/zoo/health", "<none>");
}

#[test]
fn test_router_backtracks_to_wildcard() {
    // The regex branch matches the segment but not the method.
    let router = zoo_router();
    assert_route_match(&router, "DELETE", "/zoo/animals/123", "delete_animal");
    assert_route_match(&router, "DELETE", "/zoo/animals/abc", "delete_animal");
}

#[test]
fn test_router_unknown_path() {
    assert_route_match(&zoo_router(), "GET", "/unknown", "<none>");
}

#[test]
fn test_router_root_path() {
    let router = zoo_router();
    assert_route_match(&router, "GET", "/", "root_handler");
    assert_route_match(&router, "GET", "", "<none>");
}

#[test]
fn test_router_glob_captures_remainder() {
    let router = zoo_router();
    let req = Request::new("GET", "/zoo/files/a/b/c.txt");
    assert_eq!(captures(&router, &req), Some(vec!["a/b/c.txt".to_string()]));
    assert_route_match(&router, "GET", "/zoo/files", "<none>");
}

#[test]
fn test_router_query_pairs_in_any_order() {
    let router = zoo_router();
    for target in [
        "/zoo/search?q=lion&page=2",
        "/zoo/search?page=2&q=lion",
        "/zoo/search?sort=asc&page=2&q=lion",
    ] {
        let req = Request::new("GET", target);
        assert_eq!(
            captures(&router, &req),
            Some(vec!["lion".to_string(), "2".to_string()]),
            "{}",
            target
        );
    }
    assert_route_match(&router, "GET", "/zoo/search?q=lion&page=two", "<none>");
    assert_route_match(&router, "GET", "/zoo/search?q=lion", "<none>");
}

#[test]
fn test_router_headers() {
    let router = zoo_router();
    let req = Request::new("POST", "/zoo/feed")
        .header("X-Keeper", "sam")
        .header("Accept", "application/json");
    let m = router.dispatch(&req).expect("feed matches");
    assert_eq!(m.action, "feed");
    assert_eq!(m.captures.as_slice(), ["sam", "json"]);

    let missing = Request::new("POST", "/zoo/feed").header("accept", "application/json");
    assert!(router.dispatch(&missing).is_none());

    let wrong = Request::new("POST", "/zoo/feed")
        .header("x-keeper", "sam")
        .header("accept", "text/html");
    assert!(router.dispatch(&wrong).is_none());
}

#[test]
fn test_router_from_http_request() {
    let router = zoo_router();
    let http_req = http::Request::builder()
        .method("PATCH")
        .uri("/zoo/animals/7")
        .body(())
        .expect("valid request");
    let m = router
        .dispatch(&Request::from_http(&http_req))
        .expect("matches");
    assert_eq!(m.action, "update_animal");
    assert_eq!(m.capture(0), Some("7"));
}

#[test]
fn test_router_shared_across_threads() {
    let router = Arc::new(zoo_router());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for j in 0..100 {
                    let id = i * 1000 + j;
                    let m = router
                        .route("GET", &format!("/zoo/animals/{}", id))
                        .expect("matches");
                    assert_eq!(m.captures.as_slice(), [id.to_string()]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread finished");
    }
}

#[test]
fn test_router_traces_in_match_order() {
    let router = zoo_router();
    let first: Vec<String> = router
        .traces()
        .iter()
        .take(3)
        .map(ToString::to_string)
        .collect();
    assert_eq!(first, vec!["GET /", "GET /zoo/animals", "POST /zoo/animals"]);
    assert_eq!(router.len(), 12);
}
