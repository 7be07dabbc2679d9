use clap::{Parser, Subcommand};
use nb_student::{Config, Pipeline, PngRenderer, Style, layout_cell, preview};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nbstudent")]
#[command(about = "Student versions of Jupyter notebooks, code cells rendered as images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a student version of every notebook in a folder
    Generate {
        /// Folder containing .ipynb files
        dir: PathBuf,

        /// Where images are written (default: <DIR>/codeimg)
        #[arg(long)]
        images: Option<PathBuf>,

        /// Folder used in the image links, relative to the notebooks
        #[arg(long, default_value = "codeimg")]
        link_dir: String,

        /// Font file; repeat to add fallbacks (default: probe system fonts)
        #[arg(long = "font")]
        fonts: Vec<PathBuf>,

        /// JSON file overriding colors, keywords and sizes
        #[arg(long)]
        style: Option<PathBuf>,
    },
    /// Show how a source file would be highlighted
    Preview {
        /// Source file
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Output the layout as JSON
        #[arg(long)]
        json: bool,

        /// JSON file overriding colors, keywords and sizes
        #[arg(long)]
        style: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { dir, images, link_dir, fonts, style } => {
            generate(&dir, images, link_dir, &fonts, style.as_deref())
        }
        Commands::Preview { file, stdin, json, style } => preview_source(file, stdin, json, style.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", e.render(io::stderr().is_terminal()));
            ExitCode::FAILURE
        }
    }
}

/// Log filter from `RUST_LOG`, warnings only otherwise
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_style(path: Option<&Path>) -> nb_student::Result<Style> {
    match path {
        Some(path) => Style::from_path(path),
        None => Ok(Style::default()),
    }
}

fn generate(
    dir: &Path,
    images: Option<PathBuf>,
    link_dir: String,
    fonts: &[PathBuf],
    style: Option<&Path>,
) -> nb_student::Result<()> {
    let start = Instant::now();
    let style = load_style(style)?;
    let renderer = if fonts.is_empty() {
        PngRenderer::discover()?
    } else {
        PngRenderer::from_paths(fonts)?
    };

    let mut config = Config::new(dir).with_link_dir(link_dir);
    if let Some(images) = images {
        config = config.with_image_dir(images);
    }

    let summary = Pipeline::new(config, style, renderer).run()?;
    for report in &summary.notebooks {
        for image in &report.images {
            print_generated(&image.display().to_string());
        }
        print_generated(&report.output.display().to_string());
    }
    print_summary(summary.notebooks.len(), summary.image_count(), start.elapsed());
    Ok(())
}

fn preview_source(file: Option<PathBuf>, stdin: bool, json: bool, style: Option<&Path>) -> nb_student::Result<()> {
    let style = load_style(style)?;
    let source = match file {
        Some(path) if !stdin => fs::read_to_string(&path).map_err(|source| nb_student::Error::Io { path, source })?,
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|source| nb_student::Error::Io { path: PathBuf::from("<stdin>"), source })?;
            source
        }
    };

    let layout = layout_cell(&source, &style);
    if json {
        let out = preview::render_json(&layout)
            .map_err(|source| nb_student::Error::Json { path: PathBuf::from("<layout>"), source })?;
        println!("{}", out);
    } else {
        print!("{}", preview::render_terminal(&layout, &style, io::stdout().is_terminal()));
    }
    Ok(())
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(notebooks: usize, images: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let notebooks_word = if notebooks == 1 { "notebook" } else { "notebooks" };
    let images_word = if images == 1 { "image" } else { "images" };

    if is_tty {
        eprintln!(
            "\n\x1b[1m✨ Converted {} {} ({} {}) in {}\x1b[0m",
            notebooks, notebooks_word, images, images_word, time_str
        );
    } else {
        eprintln!(
            "\n✨ Converted {} {} ({} {}) in {}",
            notebooks, notebooks_word, images, images_word, time_str
        );
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
