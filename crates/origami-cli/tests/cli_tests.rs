use assert_cmd::Command;
use predicates::prelude::*;

fn origami() -> Command {
    Command::cargo_bin("origami").expect("binary builds")
}

#[test]
fn version_prints() {
    origami()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("origami"));
}

#[test]
fn transform_single_file_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("page.mdx");
    std::fs::write(&file, "<div><$if test={ok}>yes</$if></div>").expect("write");

    origami()
        .current_dir(dir.path())
        .args(["transform", "--stdout", "page.mdx"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<div>{(ok) ? <>yes</> : null}</div>",
        ));
}

#[test]
fn transform_unchanged_file_passes_through_on_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("plain.mdx");
    std::fs::write(&file, "<p>plain</p>").expect("write");

    origami()
        .current_dir(dir.path())
        .args(["transform", "--stdout", "plain.mdx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>plain</p>"));
}

#[test]
fn transform_writes_outputs_and_maps_under_out_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("docs")).expect("mkdir");
    std::fs::write(
        dir.path().join("docs/tagged.mdx"),
        "<ul><$for var=\"x\" of={xs}>{x}</$for></ul>",
    )
    .expect("write");
    std::fs::write(dir.path().join("docs/plain.mdx"), "<p>plain</p>").expect("write");

    origami()
        .current_dir(dir.path())
        .args(["transform", "--out-dir", "dist"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 rewritten, 1 unchanged, 0 failed"));

    let rewritten =
        std::fs::read_to_string(dir.path().join("dist/docs/tagged.mdx")).expect("output");
    assert_eq!(rewritten, "<ul>{(xs).map((x) => <>{x}</>)}</ul>");

    let passthrough =
        std::fs::read_to_string(dir.path().join("dist/docs/plain.mdx")).expect("copy");
    assert_eq!(passthrough, "<p>plain</p>");

    // sourcemaps default on; only rewritten files get one
    assert!(dir.path().join("dist/docs/tagged.mdx.map").is_file());
    assert!(!dir.path().join("dist/docs/plain.mdx.map").exists());
}

#[test]
fn transform_without_destination_is_a_usage_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.mdx"), "<p>x</p>").expect("write");

    origami()
        .current_dir(dir.path())
        .arg("transform")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--out-dir"));
}

#[test]
fn config_file_is_discovered_and_respected() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("origami.toml"),
        "[transform]\nsourcemaps = false\n",
    )
    .expect("write config");
    std::fs::write(
        dir.path().join("a.mdx"),
        "<p><$if test={x}>y</$if></p>",
    )
    .expect("write");

    origami()
        .current_dir(dir.path())
        .args(["transform", "--out-dir", "dist"])
        .assert()
        .success();

    assert!(dir.path().join("dist/a.mdx").is_file());
    assert!(!dir.path().join("dist/a.mdx.map").exists());
}

#[test]
fn check_reports_malformed_chain_and_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("bad.mdx"), "<p><$else>x</$else></p>").expect("write");

    origami()
        .current_dir(dir.path())
        .args(["check", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no matching `$if`"));
}

#[test]
fn check_json_emits_diagnostic_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("bad.mdx"), "<p><$for of={xs}>x</$for></p>").expect("write");

    let assert = origami()
        .current_dir(dir.path())
        .args(["check", "--format", "json"])
        .assert()
        .code(1);

    let output = assert.get_output();
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid json on stdout");
    let list = parsed.as_array().expect("array");
    assert_eq!(list.len(), 1);
    assert!(
        list[0]["message"]
            .as_str()
            .expect("message")
            .contains("var")
    );
    assert_eq!(list[0]["severity"], "error");
}

#[test]
fn check_clean_tree_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("good.mdx"), "<p><$if test={x}>y</$if></p>").expect("write");

    origami()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 would be rewritten"));
}
