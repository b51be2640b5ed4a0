//! Loading JSON class records from disk and reading an API out of them.

use std::fs;
use std::path::Path;

use apinfer::analysis::{read_api_definition, TranslationSettings};
use apinfer::api::{ApiType, EndpointParameter, HttpMethod};
use apinfer::errors::TranslationError;
use apinfer::model::{ClassCollection, ClassDataLoader, JavaModel};
use tempfile::TempDir;

const CONTROLLER: &str = r#"[
  {
    "name": "com/example/ItemController",
    "access": 1,
    "superclass": "java/lang/Object",
    "annotations": [
      {"descriptor": "Lorg/springframework/web/bind/annotation/RestController;"},
      {"descriptor": "Lorg/springframework/web/bind/annotation/RequestMapping;",
       "attributes": {"path": {"kind": "array", "values": [{"kind": "string", "value": "/items"}]}}}
    ],
    "methods": [
      {"name": "<init>", "access": 1, "descriptor": "()V"},
      {"name": "getItem", "access": 1, "descriptor": "(J)Lcom/example/Item;",
       "annotations": [
         {"descriptor": "Lorg/springframework/web/bind/annotation/RequestMapping;",
          "attributes": {
            "path": {"kind": "array", "values": [{"kind": "string", "value": "/{id}"}]},
            "method": {"kind": "array", "values": [
              {"kind": "enum", "descriptor": "Lorg/springframework/web/bind/annotation/RequestMethod;", "value": "GET"}
            ]}
          }}
       ],
       "parameters": [
         {"name": "id", "annotations": [{"descriptor": "Lorg/springframework/web/bind/annotation/PathVariable;"}]}
       ]}
    ]
  }
]"#;

const MODEL: &str = r#"[
  {
    "name": "com/example/Item",
    "access": 1,
    "superclass": "java/lang/Object",
    "methods": [
      {"name": "getName", "access": 1, "descriptor": "()Ljava/lang/String;"},
      {"name": "getTags", "access": 1, "descriptor": "()Ljava/util/List;",
       "signature": "()Ljava/util/List<Ljava/lang/String;>;"}
    ]
  }
]"#;

const DUPLICATE: &str = r#"[
  {"name": "com/example/Item", "access": 513}
]"#;

fn write(dir: &Path, file: &str, content: &str) {
    fs::write(dir.join(file), content).unwrap();
}

fn record_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a_controller.json", CONTROLLER);
    write(dir.path(), "b_model.json", MODEL);
    write(dir.path(), "notes.txt", "not a class record");
    dir
}

#[test]
fn test_directory_to_api_definition() {
    let dir = record_dir();
    let collection = ClassCollection::from_path(dir.path()).unwrap();
    assert_eq!(collection.len(), 2);

    let model = JavaModel::new(collection);
    let api = read_api_definition(&model, &TranslationSettings::new()).unwrap();

    let group = api.endpoint_group("Item").unwrap();
    assert_eq!(group.endpoint_count(), 1);

    let endpoint = group.endpoint("getItem").unwrap();
    assert_eq!(endpoint.uri_template.as_str(), "/items/{id}");
    assert_eq!(endpoint.method, HttpMethod::Get);
    assert_eq!(endpoint.response_body, Some(ApiType::class("Item")));
    assert_eq!(
        endpoint.parameters,
        vec![EndpointParameter::PathVariable {
            name: "id".to_string(),
            path_variable: "id".to_string(),
            ty: ApiType::INTEGER,
        }]
    );

    let item = api.class_definition("Item").unwrap();
    assert_eq!(item.property("name").map(|p| &p.ty), Some(&ApiType::STRING));
    assert_eq!(item.property("tags").map(|p| &p.ty), Some(&ApiType::array(ApiType::STRING)));
    assert!(api.unknown_type_references().is_empty());
}

#[test]
fn test_single_file() {
    let dir = record_dir();
    let collection = ClassCollection::from_path(&dir.path().join("b_model.json")).unwrap();

    assert_eq!(collection.class_names(), vec!["com.example.Item"]);
}

#[test]
fn test_first_file_wins_for_duplicates() {
    let dir = record_dir();
    write(dir.path(), "c_duplicate.json", DUPLICATE);

    let collection = ClassCollection::from_path(dir.path()).unwrap();

    assert_eq!(collection.len(), 2);
    assert_eq!(collection.duplicate_class_names(), &["com.example.Item".to_string()]);
    assert!(!collection.load_class("com.example.Item").unwrap().is_interface());
}

#[test]
fn test_invalid_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.json", "[{\"name\": ");

    let err = ClassCollection::from_path(dir.path()).unwrap_err();
    assert!(matches!(err, TranslationError::Json(_)));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = ClassCollection::from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, TranslationError::Io(_)));
}
