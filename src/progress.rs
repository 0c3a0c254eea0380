//! Export progress reporting.
//!
//! Reports which section of the document is being exported and how many rows
//! it produced, so long-running exports over a tunnel are observable.
//! Progress is emitted on **stderr** so stdout remains parseable for scripts
//! piping the summary or the document itself.

use std::io::Write;

/// A single progress event for an export run.
#[derive(Clone, Debug)]
pub enum ExportProgressEvent {
    /// A section fetch started.
    Section { name: &'static str },
    /// A section finished with this many rows.
    SectionDone { name: &'static str, rows: usize },
}

/// Reports export progress. Implementations write to stderr (human or JSON).
pub trait ExportProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the document builders.
    fn report(&self, event: ExportProgressEvent);
}

/// Human-friendly progress on stderr: "export hard_logic  1,234 rows".
pub struct StderrProgress;

impl ExportProgressReporter for StderrProgress {
    fn report(&self, event: ExportProgressEvent) {
        let line = match &event {
            ExportProgressEvent::Section { name } => {
                format!("export {}  ...\n", name)
            }
            ExportProgressEvent::SectionDone { name, rows } => {
                format!("export {}  {} rows\n", name, format_number(*rows as u64))
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ExportProgressReporter for JsonProgress {
    fn report(&self, event: ExportProgressEvent) {
        let obj = match &event {
            ExportProgressEvent::Section { name } => serde_json::json!({
                "event": "progress",
                "section": name,
                "phase": "fetching"
            }),
            ExportProgressEvent::SectionDone { name, rows } => serde_json::json!({
                "event": "progress",
                "section": name,
                "phase": "done",
                "rows": rows
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ExportProgressReporter for NoProgress {
    fn report(&self, _event: ExportProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. Caller passes it to the builders.
    pub fn reporter(&self) -> Box<dyn ExportProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
