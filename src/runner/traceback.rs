use std::backtrace::Backtrace;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::assertion::{SourceLocation, StackFrame};

/// Marker closing every rendered traceback
pub const TRACEBACK_END: &str = "{main}";

/// Path fragments of the Rust runtime
const RUNTIME_MARKERS: &[&str] = &[
    "/rustc/",
    "/library/std/",
    "/library/core/",
    "/library/alloc/",
    "/library/test/",
    "/library/panic_unwind/",
];

/// Error-handling crates whose frames never point at the raising site
const DEPENDENCY_PATH_MARKERS: &[&str] = &["/anyhow-"];
const DEPENDENCY_FUNCTION_PREFIXES: &[&str] = &["anyhow::", "<anyhow::"];

/// Engine sources, relative to the crate root
const ENGINE_SOURCES: &[&str] = &[
    "src/assertion",
    "src/capture",
    "src/discovery",
    "src/runner",
    "src/lib.rs",
];

/// Parse a captured backtrace into frames, innermost first.
///
/// Frames without a source location are dropped.
pub fn parse_backtrace(trace: &Backtrace) -> Vec<StackFrame> {
    parse_backtrace_text(&trace.to_string())
}

pub fn parse_backtrace_text(text: &str) -> Vec<StackFrame> {
    static SYMBOL_REGEX: OnceLock<Regex> = OnceLock::new();
    static LOCATION_REGEX: OnceLock<Regex> = OnceLock::new();
    let symbol_re = SYMBOL_REGEX.get_or_init(|| Regex::new(r"^\s*\d+:\s+(.+?)\s*$").unwrap());
    let location_re =
        LOCATION_REGEX.get_or_init(|| Regex::new(r"^\s+at\s+(.+?):(\d+)(?::\d+)?\s*$").unwrap());

    let mut frames = Vec::new();
    let mut function: Option<String> = None;

    for line in text.lines() {
        if let Some(caps) = symbol_re.captures(line) {
            function = Some(caps[1].to_string());
        } else if let Some(caps) = location_re.captures(line) {
            // Only the first location of a symbol is kept
            let Some(name) = function.take() else {
                continue;
            };
            let Ok(line_number) = caps[2].parse::<u32>() else {
                continue;
            };
            frames.push(StackFrame::new(
                SourceLocation::new(&caps[1], line_number),
                name,
                Vec::new(),
            ));
        }
    }

    frames
}

/// Decides which frames belong to the engine rather than to the caller
#[derive(Debug, Clone)]
pub struct TracebackFilter {
    internal_dirs: Vec<PathBuf>,
}

impl TracebackFilter {
    /// Filter hiding the engine's sources plus any `extra` prefixes
    pub fn new(extra: &[String]) -> Self {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let mut internal_dirs: Vec<PathBuf> = ENGINE_SOURCES.iter().map(|src| root.join(src)).collect();
        internal_dirs.extend(extra.iter().map(|p| absolutize(Path::new(p))));
        Self { internal_dirs }
    }

    /// Filter hiding only the given directories (runtime frames are always hidden)
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            internal_dirs: dirs.iter().map(|d| absolutize(d)).collect(),
        }
    }

    pub fn is_internal(&self, file: &str) -> bool {
        if RUNTIME_MARKERS
            .iter()
            .chain(DEPENDENCY_PATH_MARKERS)
            .any(|marker| file.contains(marker))
        {
            return true;
        }

        let path = absolutize(Path::new(file));
        self.internal_dirs.iter().any(|dir| path.starts_with(dir))
    }

    pub fn is_internal_frame(&self, frame: &StackFrame) -> bool {
        DEPENDENCY_FUNCTION_PREFIXES
            .iter()
            .any(|prefix| frame.function.starts_with(prefix))
            || self.is_internal(&frame.location.file)
    }

    /// Drop internal frames, keeping order
    pub fn filter(&self, frames: Vec<StackFrame>) -> Vec<StackFrame> {
        frames
            .into_iter()
            .filter(|frame| !self.is_internal_frame(frame))
            .collect()
    }
}

impl Default for TracebackFilter {
    fn default() -> Self {
        Self::new(&[])
    }
}

fn absolutize(path: &Path) -> PathBuf {
    let stripped = path.strip_prefix(".").unwrap_or(path);
    if stripped.is_absolute() {
        return stripped.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(stripped),
        Err(_) => stripped.to_path_buf(),
    }
}
