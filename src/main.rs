mod catalog;
mod config;
mod download;
mod error;
mod paths;
mod prompt;
mod session;
mod tag;

use indicatif::{ProgressBar, ProgressStyle};
use log::error;

use crate::catalog::{HttpCatalog, Song};
use crate::config::Config;
use crate::prompt::Prompter;
use crate::session::{DownloadObserver, Session};

fn main() {
    colog::init();
    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> error::Result<()> {
    let config = Config::from_env();
    let catalog = HttpCatalog::new(&config)?;
    let prompter = Prompter::stdio();
    let mut session = Session::new(
        catalog,
        prompter,
        ProgressBarView::default(),
        config.output_root,
    );

    let summary = session.run()?;
    println!(
        "{} succeeded, {} failed",
        summary.succeeded,
        summary.failed.len()
    );
    for title in &summary.failed {
        println!("  failed: {}", title);
    }
    Ok(())
}

/// Renders download progress as one indicatif bar per song.
#[derive(Default)]
struct ProgressBarView {
    bar: Option<ProgressBar>,
}

impl DownloadObserver for ProgressBarView {
    fn begin(&mut self, song: &Song) {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n{bar:32} {bytes}/{total_bytes} ({bytes_per_sec})")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_message(format!("[{}] {}", song.track, song.title));
        self.bar = Some(bar);
    }

    fn progress(&mut self, done: u64, total: Option<u64>) {
        if let Some(bar) = &self.bar {
            if let Some(total) = total {
                if bar.length() != Some(total) {
                    bar.set_length(total);
                }
            }
            bar.set_position(done);
        }
    }

    fn end(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
