//! Black-box run of the `omg` binary against a temporary store:
//! put-schema -> create-document -> get, all with `--json`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn omg(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_omg"))
        .arg("--json")
        .arg("--store-root")
        .arg(store)
        .args(args)
        .output()
        .expect("failed to spawn omg")
}

fn stdout_json(out: &Output) -> Value {
    assert!(
        out.status.success(),
        "omg failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is not json")
}

#[test]
fn schema_document_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    let schema_file = dir.path().join("schema.json");
    fs::write(
        &schema_file,
        r#"{"name": "post", "strings": [{"key": "title"}], "numbers": [{"key": "tags", "multiple": true}]}"#,
    )
    .unwrap();
    let created = stdout_json(&omg(&store, &["put-schema", schema_file.to_str().unwrap()]));
    let schema = created["key"].as_str().unwrap().to_string();

    // Same schema again is the same address.
    let again = stdout_json(&omg(&store, &["put-schema", schema_file.to_str().unwrap()]));
    assert_eq!(again["key"], created["key"]);

    let doc_file = dir.path().join("doc.json");
    fs::write(&doc_file, r#"{"title": "hello", "tags": [2, 1]}"#).unwrap();
    let doc = stdout_json(&omg(
        &store,
        &["create-document", "--schema", &schema, doc_file.to_str().unwrap()],
    ));
    let doc = doc["key"].as_str().unwrap().to_string();

    let got = stdout_json(&omg(
        &store,
        &["get", &doc, "--schema", &format!("ipfs://{schema}"), "--select", "title"],
    ));
    assert_eq!(got, serde_json::json!({"title": "hello"}));

    let cat = stdout_json(&omg(&store, &["cat", &doc]));
    assert_eq!(cat["kind"], "document");
}

#[test]
fn invalid_document_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    let schema_file = dir.path().join("schema.json");
    fs::write(&schema_file, r#"{"name": "post", "strings": [{"key": "title"}]}"#).unwrap();
    let created = stdout_json(&omg(&store, &["put-schema", schema_file.to_str().unwrap()]));
    let schema = created["key"].as_str().unwrap();

    let doc_file = dir.path().join("doc.json");
    fs::write(&doc_file, r#"{"body": "no title"}"#).unwrap();
    let out = omg(
        &store,
        &["create-document", "--schema", schema, doc_file.to_str().unwrap()],
    );
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("error"));
}

#[test]
fn identical_nested_children_share_one_object() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    let item_file = dir.path().join("item.json");
    fs::write(&item_file, r#"{"name": "item", "strings": [{"key": "data"}]}"#).unwrap();
    let item = stdout_json(&omg(&store, &["put-schema", item_file.to_str().unwrap()]));
    let item = item["key"].as_str().unwrap();

    let list_file = dir.path().join("list.json");
    fs::write(
        &list_file,
        format!(
            r#"{{"name": "list", "nodes": [{{"key": "items", "multiple": true, "schemas": ["{item}"]}}]}}"#
        ),
    )
    .unwrap();
    let list = stdout_json(&omg(&store, &["put-schema", list_file.to_str().unwrap()]));
    let list = list["key"].as_str().unwrap().to_string();

    let items: Vec<Value> = (0..8).map(|_| serde_json::json!({"data": "x"})).collect();
    let payload = serde_json::json!({ "items": items });
    let doc_file = dir.path().join("doc.json");
    fs::write(&doc_file, payload.to_string()).unwrap();

    for _ in 0..10 {
        let doc = stdout_json(&omg(
            &store,
            &["create-document", "--schema", &list, doc_file.to_str().unwrap()],
        ));
        let doc = doc["key"].as_str().unwrap().to_string();
        let got = stdout_json(&omg(&store, &["get", &doc, "--schema", &list]));
        assert_eq!(got, payload);
    }
}
