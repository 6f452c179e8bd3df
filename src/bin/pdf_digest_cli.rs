//! Batch summarizer for PDFs on disk.
//!
//! Each argument is a PDF file or a directory searched recursively for `*.pdf`. Reports are written
//! as `resumo_e_explicacao_<file>.md` into the output directory. A failed document is reported and
//! skipped; the exit status is non-zero when any document failed.
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use pdfdigest::{config, logging, processing::SummaryService};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "pdf-digest-cli",
    about = "Summarize PDF files into markdown reports"
)]
struct Cli {
    /// PDF files, or directories searched recursively for PDFs.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Directory receiving the markdown reports.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_tracing();
    let config = config::load_config().context("failed to load configuration")?;
    let service = SummaryService::new(&config).context("failed to initialize summary service")?;

    let files = collect_pdfs(&cli.paths);
    if files.is_empty() {
        bail!("no PDF files found in the given paths");
    }
    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;

    let mut failed = 0usize;
    for path in &files {
        let source = source_label(path);
        match service.summarize_file(path, &source).await {
            Ok(report) => {
                let target = cli.output_dir.join(report.download_file_name());
                match fs::write(&target, report.to_markdown()) {
                    Ok(()) => println!("{} -> {}", path.display(), target.display()),
                    Err(error) => {
                        failed += 1;
                        eprintln!("{}: failed to write {}: {error}", path.display(), target.display());
                    }
                }
            }
            Err(error) => {
                failed += 1;
                eprintln!("{}: {} failed: {error}", path.display(), error.stage());
            }
        }
    }

    println!(
        "{} of {} document(s) summarized",
        files.len() - failed,
        files.len()
    );
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Expand directories into the PDFs they contain, sorted by path; files are kept as given.
fn collect_pdfs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Ok(entry) => Some(entry),
                        Err(error) => {
                            tracing::warn!(%error, "Skipping unreadable directory entry");
                            None
                        }
                    })
                    .filter(|entry| entry.file_type().is_file() && is_pdf(entry.path()))
                    .map(|entry| entry.into_path()),
            );
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"))
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
