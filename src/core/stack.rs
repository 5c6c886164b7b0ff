//! Call stack capture
//!
//! Frames come from `std::backtrace::Backtrace`. Frames belonging to the
//! capture machinery and to this crate are skipped so the first frame is
//! the caller of the logging method.

use serde::Serialize;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// Frames beyond this count are not recorded.
pub const STACK_MAX_DEPTH: usize = 100;

const OWN_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
const OWN_IMPL_PREFIX: &str = concat!("<", env!("CARGO_CRATE_NAME"), "::");

const CAPTURE_PREFIXES: &[&str] = &[
    "std::backtrace",
    "<std::backtrace",
    "backtrace::",
    "std::backtrace_rs",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    /// Full symbol path, e.g. `app::server::handle`.
    pub function: String,
    /// Everything before the last path segment.
    pub module: String,
    /// Last path segment.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// Lines around a frame's source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub before: Vec<String>,
    pub line: String,
    pub after: Vec<String>,
}

impl StackFrame {
    pub fn new(function: impl Into<String>) -> Self {
        let function = strip_hash(&function.into()).to_string();
        let (module, name) = split_symbol(&function);
        Self {
            module: module.to_string(),
            name: name.to_string(),
            function,
            file: None,
            line: None,
            column: None,
        }
    }

    /// The source line this frame points at, if the file is readable.
    pub fn source(&self) -> Option<String> {
        self.source_context(0, 0).map(|ctx| ctx.line)
    }

    /// The source line plus up to `before` preceding and `after` following lines.
    pub fn source_context(&self, before: usize, after: usize) -> Option<SourceContext> {
        let file = self.file.as_ref()?;
        let line = usize::try_from(self.line?).ok()?;
        if line == 0 {
            return None;
        }

        let reader = BufReader::new(File::open(file).ok()?);
        let first = line.saturating_sub(before).max(1);
        let last = line + after;

        let mut ctx = SourceContext {
            before: Vec::new(),
            line: String::new(),
            after: Vec::new(),
        };
        let mut found = false;

        for (index, text) in reader.lines().enumerate() {
            let number = index + 1;
            if number > last {
                break;
            }
            if number < first {
                continue;
            }
            let text = text.ok()?;
            if number < line {
                ctx.before.push(text);
            } else if number == line {
                ctx.line = text;
                found = true;
            } else {
                ctx.after.push(text);
            }
        }

        found.then_some(ctx)
    }

    fn is_capture_frame(&self) -> bool {
        CAPTURE_PREFIXES
            .iter()
            .any(|prefix| self.function.starts_with(prefix))
    }

    fn is_own_frame(&self) -> bool {
        (self.function.starts_with(OWN_PREFIX) || self.function.starts_with(OWN_IMPL_PREFIX))
            && !self.function.contains("::tests::")
    }
}

/// Capture the current call stack, skipping capture and logger frames.
pub fn capture() -> Vec<StackFrame> {
    let backtrace = Backtrace::force_capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    parse(&backtrace.to_string())
}

/// Parse the textual rendering of a `std::backtrace::Backtrace`.
pub(crate) fn parse(rendered: &str) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();

    for raw in rendered.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                apply_location(frame, location);
            }
            continue;
        }
        let symbol = match line.split_once(": ") {
            Some((index, rest)) if index.chars().all(|c| c.is_ascii_digit()) => rest,
            _ => line,
        };
        frames.push(StackFrame::new(symbol));
    }

    frames
        .into_iter()
        .skip_while(|f| f.is_capture_frame() || f.is_own_frame())
        .take(STACK_MAX_DEPTH)
        .collect()
}

fn apply_location(frame: &mut StackFrame, location: &str) {
    let mut parts = location.rsplitn(3, ':');
    let column = parts.next().and_then(|c| c.parse::<u32>().ok());
    let line = parts.next().and_then(|l| l.parse::<u32>().ok());
    match (parts.next(), line, column) {
        (Some(path), Some(line), Some(column)) => {
            frame.file = Some(PathBuf::from(path));
            frame.line = Some(line);
            frame.column = Some(column);
        }
        _ => frame.file = Some(PathBuf::from(location)),
    }
}

fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            head
        }
        _ => symbol,
    }
}

/// Split at the last `::` that is not nested inside `<...>`.
fn split_symbol(symbol: &str) -> (&str, &str) {
    let bytes = symbol.as_bytes();
    let mut depth = 0i32;
    let mut split = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    match split {
        Some(at) => (&symbol[..at], &symbol[at + 2..]),
        None => ("", symbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RENDERED: &str = "   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/abc/library/std/src/../../backtrace/src/backtrace/libunwind.rs:116:5
   1: std::backtrace::Backtrace::create
             at /rustc/abc/library/std/src/backtrace.rs:331:13
   2: sawmill::core::stack::capture
             at ./src/core/stack.rs:120:21
   3: sawmill::core::logger::Logger::event
             at ./src/core/logger.rs:300:9
   4: app::server::handle::h0123456789abcdef
             at ./src/server.rs:42:17
   5: <app::Worker as core::ops::Drop>::drop
             at ./src/worker.rs:7:1
   6: main
";

    #[test]
    fn test_parse_skips_capture_and_own_frames() {
        let frames = parse(RENDERED);
        assert_eq!(frames.len(), 3);

        let first = &frames[0];
        assert_eq!(first.function, "app::server::handle");
        assert_eq!(first.module, "app::server");
        assert_eq!(first.name, "handle");
        assert_eq!(first.file, Some(PathBuf::from("./src/server.rs")));
        assert_eq!(first.line, Some(42));
        assert_eq!(first.column, Some(17));

        assert_eq!(frames[1].module, "<app::Worker as core::ops::Drop>");
        assert_eq!(frames[1].name, "drop");
        assert_eq!(frames[2].function, "main");
        assert_eq!(frames[2].file, None);
    }

    #[test]
    fn test_capture_starts_outside_capture_machinery() {
        let frames = capture();
        if let Some(first) = frames.first() {
            assert!(!first.function.starts_with("std::backtrace"));
        }
        assert!(frames.len() <= STACK_MAX_DEPTH);
    }

    #[test]
    fn test_source_context() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "one\ntwo\nthree\nfour\nfive").unwrap();

        let mut frame = StackFrame::new("app::run");
        frame.file = Some(file.path().to_path_buf());
        frame.line = Some(3);

        assert_eq!(frame.source().as_deref(), Some("three"));

        let ctx = frame.source_context(1, 5).unwrap();
        assert_eq!(ctx.before, vec!["two".to_string()]);
        assert_eq!(ctx.line, "three");
        assert_eq!(ctx.after, vec!["four".to_string(), "five".to_string()]);

        frame.line = Some(99);
        assert!(frame.source().is_none());
    }
}
