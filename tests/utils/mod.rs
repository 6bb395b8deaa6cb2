// Transcript and test-case table builders shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const MAIN_ACTIVITY: &str = "com.example.app/.MainActivity";
pub const SETTINGS_ACTIVITY: &str = "com.example.app/.SettingsActivity";

pub const NPE_HEADER: &str = "E AndroidRuntime: java.lang.NullPointerException: Attempt to invoke virtual method 'int java.lang.String.length()' on a null object reference";

pub fn start_line(comp_path: &str) -> String {
    format!(
        "[2023-05-01 10:15:00.001 main] INFO TestController - Started component state monitor for compoent [{}]",
        comp_path
    )
}

pub fn result_line(state: &str, comp_index: u32, case_index: u32, strategy: &str) -> String {
    format!(
        "[2023-05-01 10:15:02.104 main] INFO TestController] - Case {}! state=DESTROYED, apkIndex=0, compIndex={}, caseIndex={}, strategy={}",
        state, comp_index, case_index, strategy
    )
}

pub fn frame(level: char, tag: &str, text: &str) -> String {
    format!("{} {}: \tat {}", level, tag, text)
}

/// Header, one app frame and a repeated header, as logcat prints a crash
pub fn npe_trace() -> Vec<String> {
    vec![
        NPE_HEADER.to_string(),
        frame(
            'E',
            "AndroidRuntime",
            "com.example.app.MainActivity.onCreate(MainActivity.java:42)",
        ),
        NPE_HEADER.to_string(),
    ]
}

/// One case: start line, trace, result line
pub fn case_lines(
    comp_path: &str,
    trace: &[String],
    state: &str,
    comp_index: u32,
    case_index: u32,
) -> Vec<String> {
    let mut lines = vec![start_line(comp_path)];
    lines.extend(trace.iter().cloned());
    lines.push(result_line(state, comp_index, case_index, "random"));
    lines
}

/// Write `<dir>/<pkg>/<comp>_<strategy>.csv` with six leading records
pub fn write_table(dir: &Path, pkg: &str, comp: &str, strategy: &str, body: &str) {
    let pkg_dir = dir.join(pkg);
    fs::create_dir_all(&pkg_dir).unwrap();
    let junk = "# testgen\n# version,2\n# seed,7\n# component,x\n# strategy,y\n# rows,n\n";
    fs::write(
        pkg_dir.join(format!("{}_{}.csv", comp, strategy)),
        format!("{}{}", junk, body),
    )
    .unwrap();
}

/// Table of MainActivity with a category flag and one extra per row
pub fn write_main_activity_table(dir: &Path) {
    write_table(
        dir,
        "com.example.app",
        "com.example.app.MainActivity",
        "random",
        "action,category,category_IRCUMQKVJRKA,data,extra,extra_0_1_OVZGY_KN2HE2LOM4\n\
         android.intent.action.VIEW,x,true,,yes,http://example.com\n\
         android.intent.action.MAIN,x,false,,yes,http://example.org\n\
         android.intent.action.EDIT,$#NULL#$,false,content://x,$#NULL#$,$#NULL#$\n\
         android.intent.action.SEND,x,1,,yes,mailto:a@b.c\n",
    );
}
