use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn encode_auto_detects_json() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    write_file(&input, r#"{"name":"Ada Lovelace","age":36,"tags":["a","b"]}"#);

    cargo_bin_cmd!("urlform")
        .arg(&input)
        .assert()
        .success()
        .stdout("name=Ada%20Lovelace&age=36&tags[]=a&tags[]=b");
}

#[test]
fn decode_auto_detects_form() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.form");
    write_file(&input, "user[name]=Ada&user[admin]&tags[]=x\n");

    let expected =
        "{\n  \"user\": {\n    \"name\": \"Ada\",\n    \"admin\": null\n  },\n  \"tags\": [\n    \"x\"\n  ]\n}";

    cargo_bin_cmd!("urlform")
        .arg(&input)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn stdin_defaults_to_encode() {
    cargo_bin_cmd!("urlform")
        .write_stdin(r#"{"q":"a b"}"#)
        .assert()
        .success()
        .stdout("q=a%20b");
}

#[test]
fn decode_flag_with_compact_output() {
    cargo_bin_cmd!("urlform")
        .args(["--decode", "--indent", "0"])
        .write_stdin("a=1&b=two+words")
        .assert()
        .success()
        .stdout(r#"{"a":"1","b":"two words"}"#);
}

#[test]
fn encode_options_apply() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    write_file(
        &input,
        r#"{"zipCode":"1 2","firstName":"Ada","middleName":null}"#,
    );

    cargo_bin_cmd!("urlform")
        .arg(&input)
        .args(["--key-mapping", "snake", "--drop-nil", "--plus-spaces", "--sort"])
        .assert()
        .success()
        .stdout("first_name=Ada&zip_code=1+2");
}

#[test]
fn decode_with_key_mapping() {
    cargo_bin_cmd!("urlform")
        .args(["-d", "--indent", "0", "--key-mapping", "snake"])
        .write_stdin("user_id=7&address[zip_code]=10115")
        .assert()
        .success()
        .stdout(r#"{"userId":"7","address":{"zipCode":"10115"}}"#);
}

#[test]
fn nested_arrays_fail() {
    cargo_bin_cmd!("urlform")
        .arg("--encode")
        .write_stdin(r#"{"m":[[1,2]]}"#)
        .assert()
        .failure()
        .stderr(contains("ERROR").and(contains("unsupported nesting")));
}

#[test]
fn scalar_root_fails() {
    cargo_bin_cmd!("urlform")
        .write_stdin("42")
        .assert()
        .failure()
        .stderr(contains("unsupported root shape"));
}

#[test]
fn duplicate_keys_fail_to_decode() {
    cargo_bin_cmd!("urlform")
        .arg("-d")
        .write_stdin("a=1&a=2")
        .assert()
        .failure()
        .stderr(contains("duplicate key `a`"));
}

#[test]
fn unknown_extension_needs_a_mode() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.bin");
    write_file(&input, "a=1");

    cargo_bin_cmd!("urlform")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("unable to auto-detect mode"));
}

#[test]
fn verbose_logs_to_stderr() {
    cargo_bin_cmd!("urlform")
        .args(["--decode", "--verbose", "--indent", "0"])
        .write_stdin("a=1")
        .assert()
        .success()
        .stdout(r#"{"a":"1"}"#)
        .stderr(contains("decoded wire string"));
}

#[test]
fn writes_to_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    let output = dir.path().join("output.form");
    write_file(&input, r#"{"name":"Ada"}"#);

    cargo_bin_cmd!("urlform")
        .arg(&input)
        .args(["-o", output.to_str().expect("output path")])
        .assert()
        .success()
        .stdout("")
        .stderr(contains("encoded input").and(contains("output.form")));

    let contents = fs::read_to_string(&output).expect("read output");
    assert_eq!(contents, "name=Ada");
}
