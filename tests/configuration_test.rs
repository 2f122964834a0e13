use hydra::app::config::{ConfigLoader, ConsoleFormat, ElasticsearchConfig, LoggerConfig};
use hydra::domain::{Level, SetupError};
use hydra::logger::SharedBuffer;
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::fs;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "LOGGER_LEVEL",
    "LOGGER_CONSOLE_FORMAT",
    "LOGGER_ELASTICSEARCH_ENABLED",
    "LOGGER_ELASTICSEARCH_URL",
    "LOGGER_ELASTICSEARCH_INDEX",
    "LOGGER_ELASTICSEARCH_RETRIES",
    "ELASTIC_RETRIES",
    "ELASTIC_INSECURE_SKIP_VERIFY",
];

fn clean_env() {
    unsafe {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }
}

fn isolated_loader(dir: &TempDir) -> (ConfigLoader, SharedBuffer) {
    let diagnostics = SharedBuffer::new();
    let loader = ConfigLoader::new()
        .with_start_dir(dir.path())
        .with_env(HashMap::<String, String>::new())
        .with_diagnostics(diagnostics.output());
    (loader, diagnostics)
}

#[test]
fn test_loads_primary_yaml_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("logger.yaml"),
        "level: debug\nconsole_format: json\nelasticsearch:\n  enabled: true\n  index: app-logs\n  retries: 3\n",
    )
    .unwrap();
    let (loader, diagnostics) = isolated_loader(&dir);

    let config = loader.load(None).unwrap();

    assert_eq!(config.level, Level::Debug);
    assert_eq!(config.console_format, ConsoleFormat::Json);
    assert!(config.elasticsearch.enabled);
    assert_eq!(config.elasticsearch.index, "app-logs");
    assert_eq!(config.elasticsearch.retries, 3);
    assert_eq!(config.elasticsearch.url, "http://localhost:9200");
    assert!(diagnostics.contents().is_empty());
}

#[test]
fn test_loads_primary_json_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("logger.json"),
        r#"{"level": "error", "elasticsearch": {"url": "https://es.internal:9200"}}"#,
    )
    .unwrap();
    let (loader, _) = isolated_loader(&dir);

    let config = loader.load(None).unwrap();

    assert_eq!(config.level, Level::Error);
    assert_eq!(config.elasticsearch.url, "https://es.internal:9200");
}

#[test]
fn test_example_file_found_from_nested_directory() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("logger.example.yaml"), "level: warn\n").unwrap();
    let nested = root.path().join("services").join("billing");
    fs::create_dir_all(&nested).unwrap();

    let diagnostics = SharedBuffer::new();
    let loader = ConfigLoader::new()
        .with_start_dir(&nested)
        .with_env(HashMap::<String, String>::new())
        .with_diagnostics(diagnostics.output());

    let config = loader.load(None).unwrap();

    assert_eq!(config.level, Level::Warn);
}

#[test]
fn test_missing_file_warns_and_uses_defaults() {
    let dir = TempDir::new().unwrap();
    // deep enough that the upward search never leaves the temp dir
    let start = dir.path().join("a/b/c/d/e/f");
    fs::create_dir_all(&start).unwrap();
    let diagnostics = SharedBuffer::new();
    let loader = ConfigLoader::new()
        .with_start_dir(&start)
        .with_env(HashMap::<String, String>::new())
        .with_diagnostics(diagnostics.output());

    let config = loader.load(None).unwrap();

    assert_eq!(config, LoggerConfig::default());
    assert!(
        diagnostics
            .contents()
            .contains("logger: no configuration file found")
    );
}

#[test]
fn test_quoted_scalars_in_file_are_accepted() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("logger.yaml"),
        "elasticsearch:\n  enabled: \"true\"\n  retries: \"3\"\n  insecure_skip_verify: \"false\"\n",
    )
    .unwrap();
    let (loader, _) = isolated_loader(&dir);

    let config = loader.load(None).unwrap();

    assert!(config.elasticsearch.enabled);
    assert_eq!(config.elasticsearch.retries, 3);
    assert!(!config.elasticsearch.insecure_skip_verify);
}

#[test]
fn test_explicit_path_skips_search() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("logger.yaml"), "level: debug\n").unwrap();
    let explicit = dir.path().join("custom.yaml");
    fs::write(&explicit, "level: error\n").unwrap();
    let (loader, _) = isolated_loader(&dir);

    let config = loader.load(Some(&explicit)).unwrap();
    assert_eq!(config.level, Level::Error);

    let missing = dir.path().join("absent.yaml");
    let (loader, diagnostics) = isolated_loader(&dir);
    let config = loader.load(Some(&missing)).unwrap();
    assert_eq!(config.level, Level::Info);
    assert!(diagnostics.contents().contains("absent.yaml"));
}

#[test]
fn test_fully_specified_config_round_trips_through_file() {
    let original = LoggerConfig {
        level: Level::Warn,
        console_format: ConsoleFormat::Json,
        elasticsearch: ElasticsearchConfig {
            enabled: true,
            url: "https://es.internal:9200".to_string(),
            index: "audit".to_string(),
            username: "writer".to_string(),
            password: "s3cret".to_string(),
            insecure_skip_verify: true,
            retries: 4,
        },
    };
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logger.yaml");
    fs::write(&path, serde_yaml::to_string(&original).unwrap()).unwrap();
    let (loader, _) = isolated_loader(&dir);

    let loaded = loader.load(Some(&path)).unwrap();

    assert_eq!(loaded, original);
}

#[test]
#[serial]
fn test_process_environment_overrides_file() {
    clean_env();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("logger.yaml"),
        "level: debug\nelasticsearch:\n  retries: 2\n",
    )
    .unwrap();
    unsafe {
        env::set_var("LOGGER_LEVEL", "error");
        env::set_var("LOGGER_ELASTICSEARCH_ENABLED", "true");
        env::set_var("LOGGER_ELASTICSEARCH_RETRIES", "5");
        env::set_var("ELASTIC_RETRIES", "7");
        env::set_var("ELASTIC_INSECURE_SKIP_VERIFY", "1");
    }

    let loader = ConfigLoader::new()
        .with_start_dir(dir.path())
        .with_diagnostics(SharedBuffer::new().output());
    let config = loader.load(None);
    clean_env();

    let config = config.unwrap();
    assert_eq!(config.level, Level::Error);
    assert!(config.elasticsearch.enabled);
    assert_eq!(config.elasticsearch.retries, 7);
    assert!(config.elasticsearch.insecure_skip_verify);
}

#[test]
#[serial]
fn test_non_numeric_retries_fails_decoding() {
    clean_env();
    let dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("ELASTIC_RETRIES", "several");
    }

    let loader = ConfigLoader::new()
        .with_start_dir(dir.path())
        .with_diagnostics(SharedBuffer::new().output());
    let result = loader.load(None);
    clean_env();

    assert!(matches!(result, Err(SetupError::Decode(_))));
}
