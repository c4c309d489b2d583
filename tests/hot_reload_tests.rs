use muxtree::{
    hot_reload::watch_table,
    router::Router,
    runtime_config::RuntimeConfig,
    table::load_table,
    Method,
};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

mod common;
use common::temp_files;

const TABLE_V1: &str = r#"
routes:
  - pattern: /foo
    methods: [GET]
    handler: foo_one
"#;

const TABLE_V2: &str = r#"
routes:
  - pattern: /foo
    methods: [GET]
    handler: foo_two
  - pattern: /bar/{id}
    methods: [GET]
    handler: bar
"#;

fn handler(router: &RwLock<Router>, path: &str) -> Option<String> {
    router
        .read()
        .unwrap()
        .route("", path, Method::Get)
        .found()
        .map(|m| m.handler_name.to_string())
}

#[test]
fn test_watch_table_reload() {
    let file = temp_files::create_temp_yaml(TABLE_V1);
    let path = file.path();
    let (initial, _groups) = load_table(path)
        .unwrap()
        .build_router(RuntimeConfig::default())
        .unwrap();
    let router = Arc::new(RwLock::new(initial));
    assert_eq!(handler(&router, "/foo").as_deref(), Some("foo_one"));

    let updates: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = updates.clone();

    let watcher = watch_table(
        path,
        Arc::clone(&router),
        RuntimeConfig::default(),
        move |new_router, _groups| {
            let names = new_router
                .routes()
                .iter()
                .flat_map(|r| r.handlers.iter().map(|(_, h)| h.to_string()))
                .collect();
            updates_clone.lock().unwrap().push(names);
        },
    )
    .expect("watch_table");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));

    std::fs::write(path, TABLE_V2).unwrap();

    for _ in 0..40 {
        {
            let ups = updates.lock().unwrap();
            if ups.iter().any(|v| v.contains(&"foo_two".to_string())) {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    {
        let ups = updates.lock().unwrap();
        assert!(ups.iter().any(|v| v.contains(&"foo_two".to_string())));
    }
    assert_eq!(handler(&router, "/foo").as_deref(), Some("foo_two"));
    assert_eq!(handler(&router, "/bar/9").as_deref(), Some("bar"));

    drop(watcher);
}

#[test]
fn test_broken_table_keeps_previous_routes() {
    let file = temp_files::create_temp_yaml(TABLE_V1);
    let path = file.path();
    let (initial, _groups) = load_table(path)
        .unwrap()
        .build_router(RuntimeConfig::default())
        .unwrap();
    let router = Arc::new(RwLock::new(initial));

    let reloads = Arc::new(Mutex::new(0usize));
    let reloads_clone = reloads.clone();
    let watcher = watch_table(path, Arc::clone(&router), RuntimeConfig::default(), move |_, _| {
        *reloads_clone.lock().unwrap() += 1;
    })
    .expect("watch_table");

    std::thread::sleep(Duration::from_millis(100));
    std::fs::write(path, "routes:\n  - pattern: /foo/{id\n    handler: broken\n").unwrap();
    std::thread::sleep(Duration::from_millis(500));

    assert_eq!(*reloads.lock().unwrap(), 0);
    assert_eq!(handler(&router, "/foo").as_deref(), Some("foo_one"));

    drop(watcher);
}
