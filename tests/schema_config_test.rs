use anyhow::Result;
use model_cast::core::registry;
use model_cast::{Casing, Model, ModelError, SchemaConfig, Value};
use std::io::Write;
use tempfile::NamedTempFile;

const LIBRARY: &str = include_str!("fixtures/library.toml");
const BOOK_ONE: &str = include_str!("fixtures/book_one.json");

fn book_from_schema() -> Result<Model> {
    let config = SchemaConfig::from_toml_str(LIBRARY)?;
    config.register()?;

    let properties = registry::lookup("Book").expect("Book is registered");
    Ok(Model::from_json(properties, serde_json::from_str(BOOK_ONE)?)?)
}

/// 測試由 TOML 定義的模型可以從 JSON 建構
#[test]
fn test_schema_defined_book_matches_fixture() -> Result<()> {
    let book = book_from_schema()?;

    assert_eq!(book.type_name(), "Book");
    assert_eq!(book.properties().count(), 6);
    assert_eq!(book["id"], Value::Int(3));
    assert_eq!(book["stockLevel"], Value::Int(4));

    let pages = book["pages"].as_list().unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages
        .iter()
        .all(|page| page.as_model().map(Model::type_name) == Some("Page")));

    let current_page = book["currentPage"].as_model().unwrap();
    assert_eq!(current_page["page"], Value::Int(1));
    assert_eq!(current_page["chapter"].as_text(), Some("intro"));
    Ok(())
}

#[test]
fn test_schema_defined_book_serializes_with_configured_casing() -> Result<()> {
    let config = SchemaConfig::from_toml_str(LIBRARY)?;
    let book = book_from_schema()?;

    let data = book.to_array(config.casing());
    assert!(data.contains_key("stock_level"));
    assert_eq!(data["created_at"], "2019-03-20T08:30:31.461+00:00");

    let data = book.to_array(Casing::AsDeclared);
    assert!(data.contains_key("createdAt"));
    Ok(())
}

#[test]
fn test_schema_defined_book_round_trips_through_blob() -> Result<()> {
    let book = book_from_schema()?;

    let restored = Model::deserialize(&book.serialize()?)?;
    assert_eq!(restored, book);
    assert_eq!(restored.to_json(Casing::Snake)?, book.to_json(Casing::Snake)?);
    Ok(())
}

#[test]
fn test_registering_twice_is_harmless() -> Result<()> {
    let config = SchemaConfig::from_toml_str(LIBRARY)?;
    let first = config.register()?;
    let second = config.register()?;

    assert_eq!(first.len(), 2);
    assert!(first
        .iter()
        .zip(second.iter())
        .all(|(a, b)| std::sync::Arc::ptr_eq(a, b)));
    Ok(())
}

#[test]
fn test_conflicting_definition_is_rejected() -> Result<()> {
    SchemaConfig::from_toml_str(LIBRARY)?.register()?;

    let conflicting = SchemaConfig::from_toml_str(
        r#"
[[models]]
name = "Page"
properties = [{ name = "page", type = "string" }]
"#,
    )?;
    let err = conflicting.register().unwrap_err();
    assert!(matches!(err, ModelError::Schema { .. }));
    Ok(())
}

#[test]
fn test_schema_file_with_env_substitution() -> Result<()> {
    std::env::set_var("SCHEMA_FILE_TEST_DEFAULT", "42");

    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(
        br#"
[[models]]
name = "EnvCounter"
properties = [{ name = "count", type = "int", default = "${SCHEMA_FILE_TEST_DEFAULT}" }]
"#,
    )?;

    let config = SchemaConfig::from_file(temp_file.path())?;
    config.register()?;

    let counter = Model::from_json(registry::lookup("EnvCounter").unwrap(), serde_json::json!({}))?;
    assert_eq!(counter["count"], Value::Int(42));

    std::env::remove_var("SCHEMA_FILE_TEST_DEFAULT");
    Ok(())
}
