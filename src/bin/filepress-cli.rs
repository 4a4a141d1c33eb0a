use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use filepress_proxy::client::{
    format_file_size, reduction_percent, ConversionDirection, HttpTransport, Notification,
    Session, SessionConfig, Severity, Tab, WatermarkKind,
};

#[derive(Parser)]
#[command(name = "filepress-cli")]
#[command(about = "Compress, convert or clean files through a Filepress proxy", long_about = None)]
struct Cli {
    /// Proxy origin
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Directory the processed file is written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a PDF
    CompressPdf {
        file: PathBuf,
        #[arg(short, long, default_value_t = 50)]
        level: u32,
    },
    /// Compress an image or a video
    CompressMedia {
        file: PathBuf,
        #[arg(short, long, default_value_t = 50)]
        level: u32,
    },
    /// Convert between PDF and Word
    Convert {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Direction::PdfToWord)]
        direction: Direction,
    },
    /// Remove a watermark from an image or a PDF
    RemoveWatermark {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Kind::Image)]
        kind: Kind,
        #[arg(long, default_value_t = 200)]
        threshold: u32,
        #[arg(long, default_value_t = 30)]
        tolerance: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    PdfToWord,
    WordToPdf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Image,
    Pdf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "filepress_proxy=warn".into()),
        )
        .init();

    let transport = Arc::new(HttpTransport::new(&cli.url, cli.output)?);
    let (mut session, mut notifications) = Session::new(transport, SessionConfig::default());

    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            print_notification(&notification);
        }
    });

    let mut progress = session.progress();
    let ticker = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let value = *progress.borrow_and_update();
            if value > 0 {
                eprint!("\rProcessing... {:>3}%", value);
            }
        }
    });

    let file = match cli.command {
        Commands::CompressPdf { file, level } => {
            session.parameters_mut().set_compression_level(level)?;
            file
        }
        Commands::CompressMedia { file, level } => {
            session.switch_tab(Tab::Media).await;
            session.parameters_mut().set_compression_level(level)?;
            file
        }
        Commands::Convert { file, direction } => {
            session.switch_tab(Tab::Convert).await;
            session
                .set_conversion_direction(match direction {
                    Direction::PdfToWord => ConversionDirection::PdfToWord,
                    Direction::WordToPdf => ConversionDirection::WordToPdf,
                })
                .await;
            file
        }
        Commands::RemoveWatermark {
            file,
            kind,
            threshold,
            tolerance,
        } => {
            session.switch_tab(Tab::Watermark).await;
            session
                .set_watermark_kind(match kind {
                    Kind::Image => WatermarkKind::Image,
                    Kind::Pdf => WatermarkKind::Pdf,
                })
                .await;
            session.parameters_mut().set_threshold(threshold)?;
            session.parameters_mut().set_tolerance(tolerance)?;
            file
        }
    };

    let outcome = run(&mut session, &file).await;
    if let Some(processed) = session.processed() {
        println!("Result kept at {}", processed.download_url);
    }

    drop(session);
    let _ = printer.await;
    ticker.abort();

    outcome
}

async fn run(
    session: &mut Session<HttpTransport>,
    file: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    session.select_path(file).await?;
    session.process().await?;
    eprintln!();

    if let (Some(original), Some(compressed)) = (session.original_size(), session.compressed_size()) {
        println!(
            "{} -> {} ({}% smaller)",
            format_file_size(original),
            format_file_size(compressed),
            reduction_percent(original, compressed)
        );
    }

    let name = session
        .processed()
        .map(|p| p.file_name.clone())
        .unwrap_or_default();
    session.download().await?;
    println!("Saved {}", name);
    Ok(())
}

fn print_notification(notification: &Notification) {
    match notification.severity {
        Severity::Info => eprintln!("\n{}: {}", notification.title, notification.description),
        Severity::Error => eprintln!("\nerror: {}: {}", notification.title, notification.description),
    }
}
