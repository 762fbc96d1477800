use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

const MINIMAL_YAML: &str = r#"
openapi: "3.0.3"
info:
  title: Test
  version: "1.0.0"
paths: {}
"#;

const MINIMAL_JSON: &str = r#"{
  "openapi": "3.0.3",
  "info": { "title": "Test", "version": "1.0.0" },
  "paths": {}
}"#;

fn write_temp_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn file(path: &Path) -> SchemaLocation {
    SchemaLocation::File(path.to_path_buf())
}

#[test]
fn location_plain_path() {
    let loc: SchemaLocation = "schemas/api.yaml".parse().unwrap();
    assert_eq!(loc, SchemaLocation::File("schemas/api.yaml".into()));
}

#[test]
fn location_revision() {
    let loc: SchemaLocation = "origin/main:schemas/api.yaml".parse().unwrap();
    assert_eq!(
        loc,
        SchemaLocation::Revision {
            rev: "origin/main".into(),
            path: "schemas/api.yaml".into(),
        }
    );
    assert_eq!(loc.to_string(), "origin/main:schemas/api.yaml");
}

#[test]
fn location_windows_drive_is_a_file() {
    let loc: SchemaLocation = r"C:\specs\api.yaml".parse().unwrap();
    assert!(matches!(loc, SchemaLocation::File(_)));
}

#[test]
fn location_relative_path_with_colon_is_a_file() {
    let loc: SchemaLocation = "./odd:name.yaml".parse().unwrap();
    assert!(matches!(loc, SchemaLocation::File(_)));
}

#[test]
fn location_missing_half_is_a_file() {
    assert!(matches!(
        ":api.yaml".parse::<SchemaLocation>().unwrap(),
        SchemaLocation::File(_)
    ));
    assert!(matches!(
        "HEAD:".parse::<SchemaLocation>().unwrap(),
        SchemaLocation::File(_)
    ));
}

#[test]
fn detect_format_by_extension() {
    assert!(matches!(
        detect_format(Path::new("spec.json")),
        Some(Format::Json)
    ));
    assert!(matches!(
        detect_format(Path::new("spec.yml")),
        Some(Format::Yaml)
    ));
    assert!(detect_format(Path::new("spec")).is_none());
}

#[test]
fn parse_schema_unknown_extension_tries_both() {
    assert!(parse_schema(MINIMAL_JSON, Path::new("spec.txt")).is_ok());
    assert!(parse_schema(MINIMAL_YAML, Path::new("spec.txt")).is_ok());
}

#[test]
fn parse_schema_invalid_json() {
    let result = parse_schema("not json", Path::new("spec.json"));
    assert!(matches!(result, Err(ParseError::Json(_))));
}

#[tokio::test]
async fn load_file_yaml() {
    let f = write_temp_file(MINIMAL_YAML, ".yaml");
    let spec = Loader::default().load(&file(f.path())).await.unwrap();
    assert_eq!(spec.info.title, "Test");
}

#[tokio::test]
async fn load_file_json() {
    let f = write_temp_file(MINIMAL_JSON, ".json");
    let spec = Loader::default().load(&file(f.path())).await.unwrap();
    assert_eq!(spec.info.title, "Test");
}

#[tokio::test]
async fn load_missing_file() {
    let result = Loader::default()
        .load(&file(Path::new("/nonexistent/path/spec.yaml")))
        .await;
    assert!(matches!(result, Err(LoadError::Io(_, _))));
}

#[tokio::test]
async fn load_invalid_content() {
    let f = write_temp_file("not valid openapi", ".yaml");
    let result = Loader::default().load(&file(f.path())).await;
    assert!(matches!(result, Err(LoadError::Parse(_, _))));
}

#[tokio::test]
async fn load_error_display_includes_location() {
    let err = Loader::default()
        .load(&file(Path::new("/some/path.yaml")))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("/some/path.yaml"));
}

#[tokio::test]
async fn load_revision_from_git_history() {
    let dir = tempfile::tempdir().unwrap();
    let git = Git::new(Some(dir.path().to_path_buf()));
    if git.run(&["init", "-q"]).await.is_err() {
        return;
    }
    std::fs::write(dir.path().join("api.yaml"), MINIMAL_YAML).unwrap();
    git.run(&["add", "api.yaml"]).await.unwrap();
    git.run(&[
        "-c",
        "user.name=t",
        "-c",
        "user.email=t@example.com",
        "-c",
        "commit.gpgsign=false",
        "commit",
        "-q",
        "-m",
        "schema",
    ])
    .await
    .unwrap();
    std::fs::write(dir.path().join("api.yaml"), "garbage").unwrap();

    let loader = Loader::new(git);
    let loc: SchemaLocation = "HEAD:api.yaml".parse().unwrap();
    let spec = loader.load(&loc).await.unwrap();
    assert_eq!(spec.info.title, "Test");
}

#[tokio::test]
async fn load_revision_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let git = Git::new(Some(dir.path().to_path_buf()));
    if git.run(&["init", "-q"]).await.is_err() {
        return;
    }
    let loc: SchemaLocation = "HEAD:api.yaml".parse().unwrap();
    let result = Loader::new(git).load(&loc).await;
    assert!(matches!(result, Err(LoadError::Git(_, _))));
}
