//! Named grammar rules for controller transcripts
//!
//! | rule        | shape                                                              |
//! |-------------|--------------------------------------------------------------------|
//! | case start  | `... Started component state monitor for compo(n*)ent [<pkg>/<c>]` |
//! | case result | `...] - Case <STATE>! ... apkIndex=<n>, compIndex=<n>, caseIndex=<n>, strategy=<s>` |
//! | trace line  | `<LEVEL> <TAG>...`                                                 |
//! | header      | `<L> <TAG>: <EXC>...`                                              |
//! | caused by   | `<L> <TAG>: Caused by: <EXC>...`                                   |
//! | frame       | contains `: \tat`                                                  |

use crate::error::Result;
use regex::Regex;
use std::fmt;

/// Marker every case result line carries
pub const RESULT_MARKER: &str = "] - Case ";
/// Marker of a stack frame line
pub const FRAME_MARKER: &str = ": \tat";
/// Marker of a nested cause line
pub const CAUSE_MARKER: &str = " Caused by: ";
/// Controller message logged when the harness caught no stack trace
pub const NO_STACKTRACE_MARKER: &str = "No stacktrace is caught";

/// Logcat priority letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Other(char),
}

impl Level {
    pub fn from_char(c: char) -> Self {
        match c {
            'V' => Level::Verbose,
            'D' => Level::Debug,
            'I' => Level::Info,
            'W' => Level::Warn,
            'E' => Level::Error,
            'F' => Level::Fatal,
            other => Level::Other(other),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Level::Verbose => 'V',
            Level::Debug => 'D',
            Level::Info => 'I',
            Level::Warn => 'W',
            Level::Error => 'E',
            Level::Fatal => 'F',
            Level::Other(c) => *c,
        }
    }

    /// Error or fatal priority
    pub fn is_error(&self) -> bool {
        matches!(self, Level::Error | Level::Fatal)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Fields captured from a case result line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine<'a> {
    pub state: &'a str,
    pub apk_index: u32,
    pub comp_index: u32,
    pub case_index: u32,
    pub strategy: &'a str,
}

/// Fields captured from a block header or caused-by line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine<'a> {
    pub level: Level,
    pub tag: &'a str,
    pub exc: &'a str,
}

/// Compiled grammar, built once per analyzer
#[derive(Debug, Clone)]
pub struct LogGrammar {
    case_start: Regex,
    case_result: Regex,
    trace_line: Regex,
    header: Regex,
    caused_by: Regex,
}

impl LogGrammar {
    pub fn new() -> Result<Self> {
        Ok(Self {
            case_start: Regex::new(
                r"^.*Started component state monitor for compo(n*)ent \[(?P<compPath>[^\]]+)\]$",
            )?,
            case_result: Regex::new(
                r"^.*\] - Case (?P<state>[A-Z]+)!.*apkIndex=(?P<apkIndex>[0-9]+), compIndex=(?P<compIndex>[0-9]+), caseIndex=(?P<caseIndex>[0-9]+), strategy=(?P<strategy>.*)$",
            )?,
            trace_line: Regex::new(r"^(?P<level>[A-Z]+) (?P<tag>[^:]+).*$")?,
            header: Regex::new(r"^(?P<level>[A-Z]) (?P<tag>[^:]+): (?P<exc>[^:\s]+).*$")?,
            caused_by: Regex::new(
                r"^(?P<level>[A-Z]) (?P<tag>[^:]+): Caused by: (?P<exc>[^:\s]+).*$",
            )?,
        })
    }

    /// Component path (`pkg/name`) of a case start line
    pub fn case_start<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.case_start
            .captures(line)
            .and_then(|caps| caps.name("compPath"))
            .map(|m| m.as_str())
    }

    /// Parse a case result line; indices that overflow `u32` make the line malformed
    pub fn case_result<'a>(&self, line: &'a str) -> Option<ResultLine<'a>> {
        if !line.contains(RESULT_MARKER) {
            return None;
        }
        let caps = self.case_result.captures(line)?;
        Some(ResultLine {
            state: caps.name("state")?.as_str(),
            apk_index: caps.name("apkIndex")?.as_str().parse().ok()?,
            comp_index: caps.name("compIndex")?.as_str().parse().ok()?,
            case_index: caps.name("caseIndex")?.as_str().parse().ok()?,
            strategy: caps.name("strategy")?.as_str(),
        })
    }

    /// Level and tag of a raw trace line
    pub fn trace_line<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.trace_line.captures(line)?;
        Some((caps.name("level")?.as_str(), caps.name("tag")?.as_str()))
    }

    pub fn header<'a>(&self, line: &'a str) -> Option<HeaderLine<'a>> {
        Self::header_fields(&self.header, line)
    }

    pub fn caused_by<'a>(&self, line: &'a str) -> Option<HeaderLine<'a>> {
        Self::header_fields(&self.caused_by, line)
    }

    fn header_fields<'a>(rule: &Regex, line: &'a str) -> Option<HeaderLine<'a>> {
        let caps = rule.captures(line)?;
        let level = caps.name("level")?.as_str().chars().next()?;
        Some(HeaderLine {
            level: Level::from_char(level),
            tag: caps.name("tag")?.as_str(),
            exc: caps.name("exc")?.as_str(),
        })
    }
}

pub fn is_frame_line(line: &str) -> bool {
    line.contains(FRAME_MARKER)
}

pub fn is_cause_line(line: &str) -> bool {
    line.contains(CAUSE_MARKER)
}
