use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ATTENTION: &str = "Multi-head attention runs several attention heads in parallel. \
Each head projects the queries, keys and values with its own learned matrices, \
applies scaled dot-product attention with a softmax over the key scores, and the \
outputs of all heads are concatenated and projected again.";

const ENCODING: &str = "Positional encoding adds sinusoidal signals of different \
frequencies to the token embeddings so that the model can use the order of the \
sequence, because the architecture itself contains no recurrence or convolution.";

#[allow(deprecated)]
fn docrag(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docrag").expect("binary");
    cmd.current_dir(workdir)
        .env("DOCRAG_EMBEDDING_MODE", "stub")
        .env_remove("RUST_LOG")
        .arg("--docs")
        .arg("docs")
        .arg("--store")
        .arg("db/fragments.json");
    cmd
}

fn setup_docs() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(
        docs.join("transformer.txt"),
        format!("{ATTENTION}\x0c{ENCODING}"),
    )
    .unwrap();
    fs::write(docs.join("readme.md"), "not indexed").unwrap();
    temp
}

fn ask_json(workdir: &Path, question: &str) -> Value {
    let output = docrag(workdir)
        .arg("ask")
        .arg(question)
        .arg("--json")
        .output()
        .expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn index_builds_store_once() {
    let temp = setup_docs();
    let root = temp.path();

    docrag(root)
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 1 documents (2 pages, 2 fragments)"));
    assert!(root.join("db/fragments.json").is_file());

    docrag(root)
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("Store already holds 2 fragments"));

    docrag(root)
        .arg("index")
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 1 documents"));
}

#[test]
fn ask_returns_grounded_answer_with_sources() {
    let temp = setup_docs();
    let body = ask_json(temp.path(), "How does multi-head attention work?");

    assert_eq!(body["status"], "grounded");
    assert_eq!(body["sources"][0]["document"], "transformer.txt");
    assert_eq!(body["fragments"][0]["source"], "transformer.txt");
    assert_eq!(body["fragments"][0]["page"], 1);
    assert!(body["answer"]
        .as_str()
        .unwrap()
        .starts_with("Offline mode: 2 fragments retrieved."));
    assert!(body["report"]["keywords"]
        .as_array()
        .unwrap()
        .iter()
        .any(|k| k == "attention"));
}

#[test]
fn unrelated_question_is_out_of_scope() {
    let temp = setup_docs();
    let body = ask_json(temp.path(), "hola");

    assert_eq!(body["status"], "out_of_scope");
    assert!(body["answer"].is_null());
    assert!(body["fragments"].as_array().unwrap().is_empty());
}

#[test]
fn empty_docs_folder_means_no_information() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("docs")).unwrap();

    let body = ask_json(temp.path(), "What is attention?");
    assert_eq!(body["status"], "no_information");
}

#[test]
fn corpus_commands_describe_the_index() {
    let temp = setup_docs();
    let root = temp.path();

    docrag(root)
        .arg("docs")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. transformer.txt"));

    docrag(root)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed fragments: 2"));

    docrag(root)
        .arg("topics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed pages: 2"))
        .stdout(predicate::str::contains("attention"));
}

#[test]
fn chat_answers_until_exit() {
    let temp = setup_docs();

    docrag(temp.path())
        .arg("chat")
        .write_stdin("docs\n\nHow does multi-head attention work?\nexit\nnever asked\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. transformer.txt"))
        .stdout(predicate::str::contains("Offline mode"))
        .stdout(predicate::str::contains("Sources consulted"))
        .stdout(predicate::str::contains("Goodbye"));
}

#[test]
fn invalid_config_file_fails_startup() {
    let temp = setup_docs();
    fs::write(
        temp.path().join("bad.toml"),
        "[chunking]\nchunk_size = 100\noverlap = 100\n",
    )
    .unwrap();

    docrag(temp.path())
        .arg("--config")
        .arg("bad.toml")
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn store_from_another_embedding_model_is_refused() {
    let temp = setup_docs();
    let root = temp.path();
    fs::create_dir_all(root.join("db")).unwrap();
    fs::write(
        root.join("db/fragments.json"),
        r#"{"schema_version":1,"embedding_model":"nomic-embed-text","fragments":[]}"#,
    )
    .unwrap();

    docrag(root)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nomic-embed-text"))
        .stderr(predicate::str::contains("index --force"));

    docrag(root)
        .arg("index")
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 1 documents"));

    docrag(root)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed fragments: 2"));
}
