use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use togif::{ProgressEvent, Stage};

const BAR_WIDTH: usize = 30;
const MAX_DISPLAY_LEN: usize = 50;
const KEPT_TAIL_LEN: usize = 47;
const TEMP_PREFIX: &str = "temp/";

/// Terminal-side consumer of progress events.
///
/// Normal mode draws one progress line per event. Debug mode stays quiet
/// while running (the tracing output covers it) and lists every input file
/// in the final summary. The list comes from the resolved inputs, not from
/// events, since the channel may drop events under load.
#[derive(Debug, Clone)]
pub struct ProgressDisplay {
    debug: bool,
    files: Vec<String>,
    output: Option<PathBuf>,
    done: bool,
}

impl ProgressDisplay {
    pub fn new(debug: bool, files: Vec<String>) -> Self {
        Self {
            debug,
            files,
            output: None,
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Apply one event, returning the line to draw for it
    pub fn update(&mut self, event: &ProgressEvent) -> Option<String> {
        if event.is_terminal() {
            self.done = true;
            self.output = event.output_path.clone();
            return None;
        }
        if self.debug {
            return None;
        }
        Some(progress_line(event))
    }

    /// Consume events until the run finishes or the sender goes away
    pub fn run<W: Write>(mut self, receiver: Receiver<ProgressEvent>, out: &mut W) -> Self {
        for event in receiver.iter() {
            if let Some(line) = self.update(&event) {
                let _ = writeln!(out, "{}", line);
            }
            if self.done {
                break;
            }
        }
        self
    }

    /// Final report once the GIF has been written
    pub fn summary(&self, output: &Path) -> String {
        let output = self.output.as_deref().unwrap_or(output);
        if !self.debug {
            return format!(
                "\nDone! Processed {} files.\nGIF file generated at: {}\n",
                self.files.len(),
                output.display()
            );
        }

        let mut summary = String::from("\nConversion completed!\n");
        summary.push_str(&format!("\nProcessed {} files:\n", self.files.len()));
        let index_width = self.files.len().to_string().len();
        for (idx, file) in self.files.iter().enumerate() {
            summary.push_str(&format!("{:>width$}. {}\n", idx + 1, display_name(file), width = index_width));
        }
        summary.push_str(&format!("\nGIF file generated at: {}\n", output.display()));
        summary
    }
}

/// Shorten a file name for the summary list.
///
/// A leading `temp/` is dropped. Other names longer than 50 characters keep
/// only their last 47, behind `...`.
pub fn display_name(file: &str) -> String {
    if let Some(stripped) = file.strip_prefix(TEMP_PREFIX) {
        return stripped.to_string();
    }
    let len = file.chars().count();
    if len <= MAX_DISPLAY_LEN {
        return file.to_string();
    }
    let tail: String = file.chars().skip(len - KEPT_TAIL_LEN).collect();
    format!("...{}", tail)
}

pub fn progress_line(event: &ProgressEvent) -> String {
    let filled = (event.fraction() * BAR_WIDTH as f32).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{:<10} [{}{}] {}/{} {}",
        stage_label(event.stage),
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        event.processed,
        event.total,
        event.current_item
    )
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Sampling => "Sampling",
        Stage::Quantizing => "Quantizing",
        Stage::Encoding => "Encoding",
        Stage::Finished => "Finished",
    }
}
