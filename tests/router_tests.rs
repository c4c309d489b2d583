use muxtree::{
    router::{MatchOutcome, Router},
    runtime_config::RuntimeConfig,
    table::{parse_table, TableFormat},
    Method,
};

fn example_table() -> &'static str {
    r#"
routes:
  - pattern: /
    methods: [GET]
    handler: root_handler
  - pattern: /zoo/animals
    methods: [GET]
    handler: get_animals
  - pattern: /zoo/animals
    methods: [POST]
    handler: create_animal
  - pattern: /zoo/animals/{id}
    methods: [GET]
    handler: get_animal
    name: animal
  - pattern: /zoo/animals/{id}
    methods: [PUT]
    handler: update_animal
  - pattern: /zoo/animals/{id}
    methods: [PATCH]
    handler: patch_animal
  - pattern: /zoo/animals/{id}
    methods: [DELETE]
    handler: delete_animal
  - pattern: /zoo/health
    methods: [HEAD]
    handler: health_check
  - pattern: /zoo/health
    methods: [OPTIONS]
    handler: supported_ops
  - pattern: /zoo/health
    methods: [TRACE]
    handler: trace_route
  - pattern: /zoo/keepers/{keeper:[a-z]+}/*
    methods: [GET]
    handler: keeper_files
  - pattern: /zoo/
    methods: [GET]
    handler: zoo_index
"#
}

fn build_router() -> Router {
    let table = parse_table(example_table(), TableFormat::Yaml).expect("failed to parse table");
    let (router, _groups) = table
        .build_router(RuntimeConfig::default())
        .expect("failed to build router");
    router
}

fn assert_route_match(router: &Router, method: http::Method, path: &str, expected_handler: &str) {
    let method = Method::try_from(&method).expect("supported method");
    match router.route("", path, method) {
        MatchOutcome::Found(m) => {
            println!("✅ {} {} → {}", method, path, m.handler_name);
            assert_eq!(
                &*m.handler_name, expected_handler,
                "Handler mismatch for {} {}: expected '{}', got '{}'",
                method, path, expected_handler, m.handler_name
            );
        }
        other => {
            println!("❌ {} {} → {}", method, path, other.kind());
            assert_eq!(
                expected_handler, "<none>",
                "Expected route to match for {} {}",
                method, path
            );
        }
    }
}

#[test]
fn test_router_get_animals() {
    let router = build_router();
    assert_route_match(&router, http::Method::GET, "/zoo/animals", "get_animals");
}

#[test]
fn test_router_post_animals() {
    let router = build_router();
    assert_route_match(&router, http::Method::POST, "/zoo/animals", "create_animal");
}

#[test]
fn test_router_animal_by_id_verbs() {
    let router = build_router();
    assert_route_match(&router, http::Method::GET, "/zoo/animals/123", "get_animal");
    assert_route_match(&router, http::Method::PUT, "/zoo/animals/123", "update_animal");
    assert_route_match(&router, http::Method::PATCH, "/zoo/animals/123", "patch_animal");
    assert_route_match(&router, http::Method::DELETE, "/zoo/animals/123", "delete_animal");
}

#[test]
fn test_router_health_verbs() {
    let router = build_router();
    assert_route_match(&router, http::Method::HEAD, "/zoo/health", "health_check");
    assert_route_match(&router, http::Method::OPTIONS, "/zoo/health", "supported_ops");
    assert_route_match(&router, http::Method::TRACE, "/zoo/health", "trace_route");
}

#[test]
fn test_router_root_catches_unmatched_paths() {
    let router = build_router();
    // "/" ends in a slash, so it prefixes every path
    assert_route_match(&router, http::Method::GET, "/unknown", "root_handler");
    assert!(matches!(
        router.route("", "/unknown", Method::Post),
        MatchOutcome::MethodNotAllowed { .. }
    ));
}

#[test]
fn test_router_unknown_path() {
    let router = Router::new();
    router.register("/zoo/animals", &[Method::Get], "get_animals").unwrap();
    assert_route_match(&router, http::Method::GET, "/unknown", "<none>");
    assert_eq!(router.route("", "/unknown", Method::Get), MatchOutcome::NotFound);
}

#[test]
fn test_router_root_path() {
    let router = build_router();
    assert_route_match(&router, http::Method::GET, "/", "root_handler");
    assert_route_match(&router, http::Method::GET, "", "root_handler");
}

#[test]
fn test_router_method_not_allowed() {
    let router = build_router();
    assert_eq!(
        router.route("", "/zoo/animals", Method::Delete).allow(),
        Some("GET, OPTIONS, POST")
    );
    assert_eq!(
        router.route("", "/zoo/health", Method::Get).allow(),
        Some("HEAD, OPTIONS, TRACE")
    );
}

#[test]
fn test_router_wildcard_and_prefix() {
    let router = build_router();
    let m = router
        .route("", "/zoo/keepers/ann/rota/monday.txt", Method::Get)
        .found()
        .unwrap();
    assert_eq!(&*m.handler_name, "keeper_files");
    assert_eq!(m.get_path_param("keeper"), Some("ann"));
    assert_eq!(m.wildcard.as_deref(), Some("rota/monday.txt"));

    // Regex rejects the keeper, so the directory route answers
    assert_route_match(&router, http::Method::GET, "/zoo/keepers/42/x", "zoo_index");
    assert_route_match(&router, http::Method::GET, "/zoo/penguins", "zoo_index");
}

#[test]
fn test_router_named_url() {
    let router = build_router();
    let url = router.url("animal", &[("id", "7")], "").unwrap();
    assert_eq!(url, "/zoo/animals/7");
    assert_route_match(&router, http::Method::GET, &url, "get_animal");
}

#[test]
fn test_router_lists_routes() {
    let router = build_router();
    let routes = router.routes();
    assert_eq!(routes.len(), 6);
    assert_eq!(&*routes[0].pattern, "/");
    let animal = routes
        .iter()
        .find(|r| &*r.pattern == "/zoo/animals/{id}")
        .unwrap();
    let handlers: Vec<&str> = animal.handlers.iter().map(|(_, h)| &**h).collect();
    assert_eq!(
        handlers,
        vec!["get_animal", "update_animal", "patch_animal", "delete_animal"]
    );
}
