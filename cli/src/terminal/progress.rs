use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use subrecon_core::scanner::Progress;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];
const TEMPLATE: &str =
    "{spinner:.blue} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tasks ({eta})";

pub(crate) static PROGRESS: OnceLock<ProgressBar> = OnceLock::new();

/// Creates the run's progress bar. Later calls return the existing one.
pub fn start(hidden: bool) -> &'static ProgressBar {
    PROGRESS.get_or_init(|| init_progress(hidden))
}

fn init_progress(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    let style = ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICK_STRINGS)
        .progress_chars("##-");

    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Progress callback handed to the scanner.
pub fn report_scan_progress(progress: Progress) {
    if let Some(pb) = PROGRESS.get() {
        pb.set_length(progress.scheduled as u64);
        pb.set_position(progress.completed as u64);
    }
}

pub fn finish() {
    if let Some(pb) = PROGRESS.get() {
        pb.finish_and_clear();
    }
}

/// Log sink that prints above an active progress bar instead of tearing it.
pub struct ProgressWriter;

impl std::io::Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        let msg = msg.trim_end();
        match PROGRESS.get() {
            Some(pb) if !pb.is_finished() && !pb.is_hidden() => pb.println(msg),
            _ => eprintln!("{msg}"),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
