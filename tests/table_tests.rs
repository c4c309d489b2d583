use muxtree::{
    runtime_config::RuntimeConfig,
    table::load_table,
    MatchOutcome, Method,
};

mod common;
use common::temp_files;

const YAML_TABLE: &str = r#"
routes:
  - pattern: /pets
    methods: [GET, POST]
    handler: pets
    name: pets
  - pattern: /pets/{id:\d+}
    methods: [GET]
    handler: get_pet
    name: pet
    allow: "GET, HEAD"
  - pattern: /internal/*
    handler: internal
    group: internal
"#;

const JSON_TABLE: &str = r#"{
  "routes": [
    { "pattern": "/pets", "methods": ["GET", "POST"], "handler": "pets", "name": "pets" },
    { "pattern": "/pets/{id:\\d+}", "methods": ["GET"], "handler": "get_pet", "name": "pet", "allow": "GET, HEAD" },
    { "pattern": "/internal/*", "handler": "internal", "group": "internal" }
  ]
}"#;

const TOML_TABLE: &str = r#"
[[routes]]
pattern = "/pets"
methods = ["GET", "POST"]
handler = "pets"
name = "pets"

[[routes]]
pattern = '/pets/{id:\d+}'
methods = ["GET"]
handler = "get_pet"
name = "pet"
allow = "GET, HEAD"

[[routes]]
pattern = "/internal/*"
handler = "internal"
group = "internal"
"#;

#[test]
fn test_all_formats_load_the_same_table() {
    let yaml = temp_files::create_temp_table(YAML_TABLE, "yaml");
    let json = temp_files::create_temp_table(JSON_TABLE, "json");
    let toml = temp_files::create_temp_table(TOML_TABLE, "toml");

    let from_yaml = load_table(yaml.path()).unwrap();
    let from_json = load_table(json.path()).unwrap();
    let from_toml = load_table(toml.path()).unwrap();
    assert_eq!(from_yaml, from_json);
    assert_eq!(from_yaml, from_toml);
    assert_eq!(from_yaml.routes.len(), 3);
}

#[test]
fn test_loaded_table_routes_requests() {
    let file = temp_files::create_temp_yaml(YAML_TABLE);
    let (router, groups) = load_table(file.path())
        .unwrap()
        .build_router(RuntimeConfig::default())
        .unwrap();

    let m = router.route("", "/pets/3", Method::Get).found().unwrap();
    assert_eq!(&*m.handler_name, "get_pet");
    assert_eq!(m.get_path_param("id"), Some("3"));

    // The table fixes the Allow value for this route
    assert_eq!(
        router.route("", "/pets/3", Method::Options).allow(),
        Some("GET, HEAD")
    );
    assert_eq!(router.url("pets", &[] as &[(&str, &str)], "").unwrap(), "/pets");

    // No methods listed means every method but OPTIONS
    assert!(router.route("", "/internal/jobs", Method::Patch).is_found());
    groups["internal"].disable();
    assert!(matches!(
        router.route("", "/internal/jobs", Method::Patch),
        MatchOutcome::RouteDisabled { .. }
    ));
}

#[test]
fn test_missing_file_reports_path() {
    let err = load_table("/definitely/not/here.yaml").unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("failed to read route table"), "{message}");
    assert!(message.contains("/definitely/not/here.yaml"), "{message}");
}

#[test]
fn test_invalid_pattern_names_the_entry() {
    let file = temp_files::create_temp_yaml(
        "routes:\n  - pattern: /ok\n    handler: ok\n  - pattern: /bad/{id\n    handler: bad\n",
    );
    let err = load_table(file.path())
        .unwrap()
        .build_router(RuntimeConfig::default())
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("route #1 (/bad/{id)"), "{message}");
}

#[test]
fn test_duplicate_entry_is_rejected() {
    let file = temp_files::create_temp_yaml(
        "routes:\n  - pattern: /a\n    methods: [GET]\n    handler: one\n  - pattern: /a\n    methods: [GET]\n    handler: two\n",
    );
    let err = load_table(file.path())
        .unwrap()
        .build_router(RuntimeConfig::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("route #1 (/a)"));
}
