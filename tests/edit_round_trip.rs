#![cfg(unix)]
mod common;

use sensible as sb;
use sb::{SensibleError, ToolKind, Toolbox};

fn toolbox(dir: &std::path::Path, editor: &str) -> Toolbox {
    Toolbox::new(
        common::resolver_in(ToolKind::Editor, &[dir], &[editor]),
        common::resolver_in(ToolKind::Browser, &[dir], &[]),
        common::resolver_in(ToolKind::Pager, &[dir], &[]),
    )
}

#[test]
fn test_edit_tmp_returns_edited_contents() {
    let td = tempfile::tempdir().expect("tmpdir");
    common::stub_tool(td.path(), "appender", "printf ' world' >> \"$1\"");
    let tools = toolbox(td.path(), "appender");
    assert_eq!(tools.edit_tmp("hello").expect("edit_tmp"), "hello world");
}

#[test]
fn test_edit_tmp_scratch_file_uses_editor_prefix_and_is_removed() {
    let td = tempfile::tempdir().expect("tmpdir");
    let seen = td.path().join("seen");
    common::stub_tool(
        td.path(),
        "recorder",
        &format!("printf '%s' \"$1\" > '{}'", seen.display()),
    );
    let tools = toolbox(td.path(), "recorder");
    let out = tools.edit_tmp("keep me").expect("edit_tmp");
    assert_eq!(out, "keep me");

    let staged = std::fs::read_to_string(&seen).expect("read recorded path");
    let staged = std::path::Path::new(&staged);
    let name = staged.file_name().and_then(|s| s.to_str()).unwrap_or_default();
    assert!(name.starts_with("sedit_"), "unexpected scratch name {name}");
    assert!(!staged.exists(), "scratch file left behind: {}", staged.display());
}

#[test]
fn test_edit_tmp_replaced_file_is_read_back() {
    let td = tempfile::tempdir().expect("tmpdir");
    // Write-to-temp-then-rename, as many editors save.
    common::stub_tool(
        td.path(),
        "renamer",
        "printf 'rewritten' > \"$1.new\" && mv \"$1.new\" \"$1\"",
    );
    let tools = toolbox(td.path(), "renamer");
    assert_eq!(tools.edit_tmp("original").expect("edit_tmp"), "rewritten");
}

#[test]
fn test_edit_tmp_propagates_tool_failure() {
    let td = tempfile::tempdir().expect("tmpdir");
    common::stub_tool(td.path(), "broken", "exit 1");
    let tools = toolbox(td.path(), "broken");
    let e = tools.edit_tmp("x").expect_err("tool fails");
    assert!(matches!(e, SensibleError::NonZeroExit { .. }), "got {e:?}");
}

#[test]
fn test_toolbox_reports_missing_browser() {
    let td = tempfile::tempdir().expect("tmpdir");
    let tools = toolbox(td.path(), "nothing-here");
    let url = url::Url::parse("https://example.com").expect("url");
    let e = tools.browse(&[url]).expect_err("no browser configured");
    assert!(matches!(e, SensibleError::NotFound { tool: "browser", .. }), "got {e:?}");
    assert!(e.is_launch_failure());
}
