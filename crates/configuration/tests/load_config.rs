use configuration::error::ConfigError;
use configuration::load_config;
use std::fs;
use std::path::PathBuf;

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_toml_and_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "config.toml",
        r#"
[database]
host = "localhost"
user = "postgres"
password = "secret"
name = "contacts"
"#,
    );

    let settings = load_config(&path).unwrap();

    assert_eq!(settings.database.host, "localhost");
    assert_eq!(settings.database.port, 5432);
    assert_eq!(settings.database.table, "entries");
    assert_eq!(settings.database.max_connections, 10);
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.server.host, "0.0.0.0");
}

#[test]
fn loads_yaml_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "development.yaml",
        r#"
server:
  port: 8080
database:
  host: db
  port: 6543
  user: app
  password: pw
  name: contacts
  table: people
"#,
    );

    let settings = load_config(&path).unwrap();

    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.database.port, 6543);
    assert_eq!(settings.database.table, "people");
}

#[test]
fn accepts_the_postgres_section_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "development.yaml",
        r#"
postgres:
  host: localhost
  port: 5432
  user: postgres
  password: postgres
  name: contacts
  db: people
"#,
    );

    let settings = load_config(&path).unwrap();

    assert_eq!(settings.database.host, "localhost");
    assert_eq!(settings.database.name, "contacts");
    assert_eq!(settings.database.table, "people");
    assert_eq!(settings.server.port, 3000);
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::LoadError(_)));
}

#[test]
fn missing_database_section_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "config.toml", "[server]\nport = 3000\n");
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::LoadError(_)));
}

#[test]
fn unsafe_table_name_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "config.toml",
        r#"
[database]
host = "localhost"
user = "postgres"
name = "contacts"
table = "entries; DROP TABLE entries"
"#,
    );

    let err = load_config(&path).unwrap_err();
    match err {
        ConfigError::ValidationError(message) => assert!(message.contains("database.table")),
        other => panic!("unexpected error: {other}"),
    }
}
