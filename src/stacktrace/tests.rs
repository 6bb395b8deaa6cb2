// Tests for stack trace extraction, segmentation and filtering

use super::*;
use crate::config::FilterConfig;
use crate::grammar::{Level, LogGrammar};
use crate::model::{CaseResult, CompState};

fn grammar() -> LogGrammar {
    LogGrammar::new().expect("grammar compiles")
}

fn failed_case(trace: &[&str]) -> CaseResult {
    let mut case = CaseResult::from_component_path("com.example.app/.MainActivity").unwrap();
    case.comp_state = Some(CompState::Failed);
    case.full_trace = trace.iter().map(|s| s.to_string()).collect();
    case
}

fn block(header: &str, frames: &str, types: &[&str]) -> TraceBlock {
    TraceBlock {
        pkg_name: "com.example.app".to_string(),
        comp_name: "com.example.app.MainActivity".to_string(),
        level: Level::Error,
        header: header.to_string(),
        frames: frames.to_string(),
        exc_types: types.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn test_extract_stops_at_controller_line() {
    let lines = [
        "[main] INFO - Started component state monitor for compoent [a.b/.C]",
        "E AndroidRuntime: java.lang.NullPointerException: boom",
        "D Chatty: ignored",
        "E AndroidRuntime: \tat a.b.C.onCreate(C.java:10)",
        "[main] ERROR - Case FAILED! apkIndex=0, compIndex=0, caseIndex=0, strategy=s",
    ];
    let trace = extract_trace(&grammar(), &lines, 4);

    assert_eq!(trace.boundary, Some(0));
    assert!(!trace.reached_log_start());
    assert_eq!(
        trace.lines,
        vec![
            "E AndroidRuntime: java.lang.NullPointerException: boom".to_string(),
            "E AndroidRuntime: \tat a.b.C.onCreate(C.java:10)".to_string(),
        ]
    );
}

#[test]
fn test_extract_reaches_log_start() {
    let lines = ["W Foo: bar", "not a trace line", "[x] - Case PASSED!"];
    let trace = extract_trace(&grammar(), &lines, 2);

    assert!(trace.reached_log_start());
    assert_eq!(trace.unrecognized, 1);
    assert_eq!(trace.lines, vec!["W Foo: bar".to_string()]);
}

#[test]
fn test_extract_at_first_line() {
    let lines = ["[x] - Case PASSED!"];
    let trace = extract_trace(&grammar(), &lines, 0);
    assert!(trace.reached_log_start());
    assert!(trace.lines.is_empty());
}

#[test]
fn test_segment_single_block() {
    let case = failed_case(&[
        "E AndroidRuntime: java.lang.IllegalStateException: bad",
        "E AndroidRuntime: \tat com.example.app.MainActivity.onCreate(MainActivity.java:5)",
        "E AndroidRuntime: \tat android.app.Activity.performCreate(Activity.java:1)",
    ]);
    let blocks = segment_trace(&grammar(), &TraceFilter::default(), &case);

    assert_eq!(blocks.len(), 1);
    let b = &blocks[0];
    assert_eq!(b.level, Level::Error);
    assert!(b.exc_types.contains("java.lang.IllegalStateException"));
    // Frames are collected newest line first
    assert_eq!(
        b.frames,
        "\tat android.app.Activity.performCreate(Activity.java:1)\n\tat com.example.app.MainActivity.onCreate(MainActivity.java:5)"
    );
}

#[test]
fn test_segment_caused_by_joins_pending_block() {
    let case = failed_case(&[
        "E AndroidRuntime: java.lang.RuntimeException: Unable to start activity",
        "E AndroidRuntime: \tat android.app.ActivityThread.main(ActivityThread.java:1)",
        "E AndroidRuntime: Caused by: java.lang.NullPointerException: null",
        "E AndroidRuntime: \tat com.example.app.MainActivity.onCreate(MainActivity.java:5)",
    ]);
    let blocks = segment_trace(&grammar(), &TraceFilter::default(), &case);

    assert_eq!(blocks.len(), 1);
    let types: Vec<&str> = blocks[0].exc_types.iter().map(|s| s.as_str()).collect();
    assert_eq!(
        types,
        vec!["java.lang.NullPointerException", "java.lang.RuntimeException"]
    );
}

#[test]
fn test_segment_skips_passed_case_without_errors() {
    let mut case = failed_case(&[
        "W Foo: java.lang.Exception: warn",
        "W Foo: \tat com.example.app.X.y(X.java:1)",
    ]);
    case.comp_state = Some(CompState::Passed);
    assert!(segment_trace(&grammar(), &TraceFilter::default(), &case).is_empty());

    case.full_trace.insert(0, "E Foo: java.lang.Error: e".to_string());
    assert!(!segment_trace(&grammar(), &TraceFilter::default(), &case).is_empty());
}

#[test]
fn test_segment_filters_tag_and_benign_exceptions() {
    let case = failed_case(&[
        "E RunCaseHandler: java.lang.IllegalStateException: harness",
        "E RunCaseHandler: \tat com.example.app.A.b(A.java:1)",
        "E AndroidRuntime: java.lang.UnsatisfiedLinkError: no lib",
        "E AndroidRuntime: \tat com.example.app.A.c(A.java:2)",
        "W System.err: java.lang.Exception: whatever",
        "W System.err: \tat com.example.app.A.d(A.java:3)",
    ]);
    let blocks = segment_trace(&grammar(), &TraceFilter::default(), &case);
    assert!(blocks.is_empty());
}

#[test]
fn test_segment_unparseable_header_discards_block() {
    let case = failed_case(&[
        "E AndroidRuntime: java.lang.IllegalStateException: kept",
        "E AndroidRuntime: \tat com.example.app.A.a(A.java:1)",
        "E weird-header-without-colon",
        "E AndroidRuntime: \tat com.example.app.A.b(A.java:2)",
    ]);
    let blocks = segment_trace(&grammar(), &TraceFilter::default(), &case);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].frames, "\tat com.example.app.A.a(A.java:1)");
}

#[test]
fn test_segment_incomplete_block_is_dropped() {
    let case = failed_case(&["E AndroidRuntime: \tat com.example.app.A.a(A.java:1)"]);
    assert!(segment_trace(&grammar(), &TraceFilter::default(), &case).is_empty());
}

#[test]
fn test_unsatisfied_link_error_always_filtered() {
    let filter = TraceFilter::default();
    let b = block(
        "E AndroidRuntime: java.lang.RuntimeException: wrapped",
        "\tat com.example.app.A.a(A.java:1)",
        &["java.lang.RuntimeException", "java.lang.UnsatisfiedLinkError"],
    );
    assert!(filter.filter_exc(&b));
}

#[test]
fn test_filter_exc_header_markers() {
    let filter = TraceFilter::default();
    let toast = block(
        "W Toast: java.lang.Exception: Toast callstack! strTip=hi",
        "",
        &["java.lang.Exception"],
    );
    assert!(filter.filter_exc(&toast));

    let bridge = block(
        "E TestBridge: org.square16.ictdroid.testbridge.utils.CSVTestCaseMgr$1: parse",
        "",
        &["org.square16.ictdroid.testbridge.utils.CSVTestCaseMgr$1"],
    );
    assert!(filter.filter_exc(&bridge));

    let real = block(
        "E AndroidRuntime: java.lang.NullPointerException",
        "",
        &["java.lang.NullPointerException"],
    );
    assert!(!filter.filter_exc(&real));
}

#[test]
fn test_filter_tag_configurable() {
    let filter = TraceFilter::new(FilterConfig {
        ignored_tags: vec!["Chatty".to_string()],
        ..FilterConfig::default()
    });
    assert!(filter.filter_tag("Chatty"));
    assert!(!filter.filter_tag("BroadcastQueue"));
}

#[test]
fn test_relevance_by_component_package_and_group() {
    let filter = TraceFilter::default();
    let case = failed_case(&[]);

    let by_group = block("E X: java.lang.Error", "\tat com.example.lib.Util.f(U.java:1)", &[]);
    assert!(filter.is_relevant(&case, &[by_group]));

    let by_pkg = block("E X: java.lang.Error in com.example.app", "\tat java.util.List.get", &[]);
    assert!(filter.is_relevant(&case, &[by_pkg]));

    let unrelated = block("E X: java.lang.Error", "\tat org.other.Thing.run(T.java:1)", &[]);
    assert!(!filter.is_relevant(&case, &[unrelated]));
}

#[test]
fn test_super_not_called_always_relevant() {
    let filter = TraceFilter::default();
    let case = failed_case(&[]);
    let b = block(
        "E AndroidRuntime: android.util.SuperNotCalledException: did not call through",
        "\tat android.app.Activity.performResume(Activity.java:1)",
        &["android.util.SuperNotCalledException"],
    );
    assert!(filter.is_relevant(&case, &[b]));
}

#[test]
fn test_package_group_id() {
    assert_eq!(package_group_id("com.example.app.sub"), "com.example");
    assert_eq!(package_group_id("single"), "single");
}

#[test]
fn test_block_identity_ignores_origin() {
    let a = block("E X: java.lang.Error", "\tat a", &["java.lang.Error"]);
    let mut b = a.clone();
    b.pkg_name = "other.pkg".to_string();
    b.exc_types.clear();
    assert_eq!(a, b);
}
