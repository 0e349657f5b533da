// ABOUTME: Terminal reporting for deployment steps, checks and log tails.
// ABOUTME: Human, quiet (failures and result only) and JSON-lines renderings.

use serde::Serialize;
use std::time::Instant;

/// How progress and findings are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Step headings, check marks and command output
    Normal,
    /// Minimal output for CI (warnings, errors and the final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Renders one run's progress in the selected mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start the run clock used by `success`.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Seconds since `start_timer`, or zero if it was never called.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a step heading.
    pub fn section(&self, title: &str) {
        match self.mode {
            OutputMode::Normal => println!("\n==> {title}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit("section", title),
        }
    }

    /// Print a progress message (suppressed in quiet mode).
    pub fn progress(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("{message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit("progress", message),
        }
    }

    /// Print a passing check.
    pub fn ok(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("  ✓ {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit("ok", message),
        }
    }

    /// Print a failing check. Shown in every mode.
    pub fn fail(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("  ✗ {message}"),
            OutputMode::Json => self.emit("fail", message),
        }
    }

    /// Print a multi-line block such as a log tail or a command's stdout.
    pub fn block(&self, title: &str, body: &str) {
        let body = body.trim_end();
        match self.mode {
            OutputMode::Normal => {
                println!("--- {title} ---");
                if !body.is_empty() {
                    println!("{body}");
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "block",
                    message: title,
                    timestamp: timestamp(),
                    body: Some(body),
                    duration_secs: None,
                };
                print_json(&event, false);
            }
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => self.emit_err("warning", message),
        }
    }

    /// Print the final result, with the run time when the clock is running.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => self.emit("success", message),
        }
    }

    /// Print the error that ended the run.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => self.emit_err("error", message),
        }
    }

    fn emit(&self, event: &str, message: &str) {
        print_json(&self.event(event, message), false);
    }

    fn emit_err(&self, event: &str, message: &str) {
        print_json(&self.event(event, message), true);
    }

    fn event<'a>(&self, event: &'a str, message: &'a str) -> JsonEvent<'a> {
        JsonEvent {
            event,
            message,
            timestamp: timestamp(),
            body: None,
            duration_secs: if self.start_time.is_some() {
                Some(self.elapsed_secs())
            } else {
                None
            },
        }
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn print_json(event: &JsonEvent<'_>, to_stderr: bool) {
    if let Ok(json) = serde_json::to_string(event) {
        if to_stderr {
            eprintln!("{json}");
        } else {
            println!("{json}");
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
