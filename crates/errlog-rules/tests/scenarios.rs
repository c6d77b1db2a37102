//! Integration test: the error_log_or_return rule end-to-end via Analyzer.
//!
//! Uses Go fixtures under `tests/fixtures/` and runs the full
//! parse → type resolution → file filter → rule pipeline.

use errlog_core::{Analyzer, IgnoreConfig, LintResult, Settings};
use errlog_go::GoFrontend;
use errlog_rules::{ErrorLogOrReturn, CODE_DOUBLE_HANDLED, CODE_UNHANDLED};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn analyze(settings: &Settings) -> LintResult {
    Analyzer::builder()
        .settings(settings)
        .frontend(GoFrontend::new())
        .rule(ErrorLogOrReturn::new())
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed")
}

/// `(function, code)` pairs in report order.
fn reports(result: &LintResult) -> Vec<(String, String)> {
    result
        .violations
        .iter()
        .map(|v| (v.function.clone().unwrap_or_default(), v.code.clone()))
        .collect()
}

fn pair(function: &str, code: &str) -> (String, String) {
    (function.to_string(), code.to_string())
}

// ── Fixture package: every shape of the rule ──

#[test]
fn reports_exactly_the_invalid_methods() {
    let result = analyze(&Settings::new(fixture("testpkg")));

    assert_eq!(
        reports(&result),
        vec![
            pair("Service.LogsAndReturns", CODE_DOUBLE_HANDLED),
            pair("Service.Drops", CODE_UNHANDLED),
            pair("Service.LogsNil", CODE_UNHANDLED),
            pair("Service.DefinesFromConstructor", CODE_UNHANDLED),
        ],
        "{:#?}",
        result.violations
    );
    assert_eq!(result.files_checked, 1);
}

#[test]
fn reports_point_at_the_declaration() {
    let result = analyze(&Settings::new(fixture("testpkg")));
    let source = fs::read_to_string(fixture("testpkg/service.go")).expect("fixture");

    for v in &result.violations {
        assert_eq!(v.location.file, PathBuf::from("service.go"));
        assert_eq!(v.location.column, 1);
        let line = source.lines().nth(v.location.line - 1).expect("line");
        assert!(line.starts_with("func ("), "{line}");
        assert!(source[v.location.offset..].starts_with("func ("));
    }
}

// ── The four predicate combinations on a receiver method ──

fn check_source(src: &str) -> LintResult {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("m.go"), src).expect("write");
    analyze(&Settings::new(dir.path()))
}

fn codes_for(body: &str) -> Vec<String> {
    let src = format!(
        "package p\n\ntype L struct{{}}\n\nfunc (l *L) Error(err *error) {{}}\n\n\
            type T struct{{ log *L }}\n\n{body}\n"
    );
    check_source(&src)
        .violations
        .into_iter()
        .map(|v| v.code)
        .collect()
}

#[test]
fn returns_error_with_deferred_log() {
    let codes = codes_for(
        "func (t *T) M() error {\n\tvar err error\n\tdefer t.log.Error(&err)\n\treturn err\n}",
    );
    assert_eq!(codes, vec![CODE_DOUBLE_HANDLED]);
}

#[test]
fn returns_error_without_deferred_log() {
    let codes = codes_for("func (t *T) M() error {\n\tvar err error\n\treturn err\n}");
    assert!(codes.is_empty());
}

#[test]
fn no_error_result_with_deferred_log() {
    let codes = codes_for("func (t *T) M() {\n\tvar err error\n\tdefer t.log.Error(&err)\n}");
    assert!(codes.is_empty());
}

#[test]
fn no_error_result_without_deferred_log() {
    let codes = codes_for("func (t *T) M() {\n\tvar err error\n\t_ = err\n}");
    assert_eq!(codes, vec![CODE_UNHANDLED]);
}

#[test]
fn without_err_nothing_is_reported() {
    assert!(codes_for("func (t *T) M() {\n\tdefer t.log.Error(nil)\n}").is_empty());
    assert!(codes_for("func (t *T) M() {}").is_empty());
}

#[test]
fn free_function_never_reports() {
    let codes = codes_for(
        "func M() error {\n\tvar err error\n\tvar t T\n\tdefer t.log.Error(&err)\n\treturn err\n}",
    );
    assert!(codes.is_empty());
}

#[test]
fn deferred_log_in_closure_counts() {
    let codes = codes_for(
        "func (t *T) M() error {\n\tvar err error\n\tdefer func() {\n\
            \t\tdefer t.log.Error(&err)\n\t}()\n\treturn err\n}",
    );
    assert_eq!(codes, vec![CODE_DOUBLE_HANDLED]);
}

// ── Suppression placement ──

#[test]
fn suppression_only_on_doc_or_declaration_line() {
    let invalid = "func (t *T) M() {\n\tvar err error\n\t_ = err\n}";

    assert!(codes_for(&format!("//nolint:error_log_or_return\n{invalid}")).is_empty());
    assert!(
        codes_for(&format!("// M is legacy.\n// //nolint:error_log_or_return keep\n{invalid}"))
            .is_empty()
    );
    assert!(codes_for(
        "func (t *T) M() { //nolint:error_log_or_return\n\tvar err error\n\t_ = err\n}"
    )
    .is_empty());

    let detached = format!("//nolint:error_log_or_return\n\n{invalid}");
    assert_eq!(codes_for(&detached), vec![CODE_UNHANDLED]);

    let in_body = "func (t *T) M() {\n\tvar err error //nolint:error_log_or_return\n\t_ = err\n}";
    assert_eq!(codes_for(in_body), vec![CODE_UNHANDLED]);

    let other_rule = format!("//nolint:errcheck\n{invalid}");
    assert_eq!(codes_for(&other_rule), vec![CODE_UNHANDLED]);
}

// ── Errors produced by dependencies held in fields ──

#[test]
fn err_from_field_dependencies_is_detected() {
    let result = analyze(&Settings::new(fixture("deps")));
    assert_eq!(
        reports(&result),
        vec![
            pair("Service.Sync", CODE_UNHANDLED),
            pair("Service.Persist", CODE_UNHANDLED),
            pair("Service.Reuse", CODE_UNHANDLED),
        ],
        "{:#?}",
        result.violations
    );
}

#[test]
fn err_from_promoted_method_is_detected() {
    let src = "package p\n\ntype Store struct{}\n\n\
        func (st *Store) Flush() error { return nil }\n\n\
        type Svc struct {\n\t*Store\n}\n\n\
        func (s *Svc) Sync() {\n\terr := s.Flush()\n\t_ = err\n}\n";
    let codes: Vec<String> = check_source(src)
        .violations
        .into_iter()
        .map(|v| v.code)
        .collect();
    assert_eq!(codes, vec![CODE_UNHANDLED]);
}

// ── Packages, recursion and ignore configuration ──

#[test]
fn resolves_methods_across_files_of_a_package() {
    let result = analyze(&Settings::new(fixture("multipkg")));
    assert_eq!(reports(&result), vec![pair("Store.Sync", CODE_UNHANDLED)]);
    assert_eq!(result.files_checked, 3);
}

#[test]
fn recursive_pattern_includes_subpackages() {
    let result = analyze(&Settings::new(fixture("multipkg")).recursive(true));
    assert_eq!(
        reports(&result),
        vec![
            pair("Disk.Write", CODE_DOUBLE_HANDLED),
            pair("MockDisk.Read", CODE_UNHANDLED),
            pair("Store.Sync", CODE_UNHANDLED),
        ]
    );
    assert_eq!(
        result.violations[0].location.file,
        Path::new("storage").join("disk.go")
    );
}

#[test]
fn ignored_files_are_not_reported() {
    let ignore = IgnoreConfig::parse("ignore = [\"*_mock.go\"]").expect("config");
    let result = analyze(&Settings::new(fixture("multipkg")).recursive(true).ignore(ignore));

    assert_eq!(
        reports(&result),
        vec![
            pair("Disk.Write", CODE_DOUBLE_HANDLED),
            pair("Store.Sync", CODE_UNHANDLED),
        ]
    );
    assert_eq!(result.files_ignored, 1);
}

#[test]
fn unparseable_file_does_not_stop_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("broken.go"), "package p\n\nfunc (t *T) M( {\n").expect("write");
    fs::write(
        dir.path().join("ok.go"),
        "package p\n\ntype T struct{}\n\nfunc (t *T) M() {\n\tvar err error\n\t_ = err\n}\n",
    )
    .expect("write");

    let result = analyze(&Settings::new(dir.path()));
    assert_eq!(reports(&result), vec![pair("T.M", CODE_UNHANDLED)]);
}
