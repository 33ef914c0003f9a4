//! tabshell - drive a tab/iframe session engine from NDJSON commands
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::{Path, PathBuf};

use clap::Parser;
use tabshell::CommandSource;
use tabshell_app::config::load_settings;
use tabshell_app::fixture::PageBuilder;

/// tabshell - headless tab/iframe session engine
#[derive(Parser, Debug)]
#[command(name = "tabshell")]
#[command(about = "Drive a tab/iframe session engine from NDJSON commands", long_about = None)]
struct Args {
    /// Project directory holding `.tabshell/config.toml`
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Sidebar menu item, repeatable
    #[arg(long = "item", value_name = "HREF=LABEL", value_parser = parse_item)]
    items: Vec<(String, String)>,

    /// Header navbar menu item, repeatable
    #[arg(long = "header-item", value_name = "HREF=LABEL", value_parser = parse_item)]
    header_items: Vec<(String, String)>,

    /// Add the pinned page-content tab
    #[arg(long)]
    page_content: bool,

    /// Read commands from a file instead of stdin
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,
}

fn parse_item(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((href, label)) if !href.trim().is_empty() => {
            Ok((href.trim().to_string(), label.trim().to_string()))
        }
        _ => Err(format!("expected HREF=LABEL, got {:?}", raw)),
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let log_file = tabshell_core::logging::init()?;

    let args = Args::parse();

    let project_path = args
        .path
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let settings = load_settings(&project_path);

    let mut builder = PageBuilder::new();
    for (href, label) in &args.items {
        builder = builder.item(href, label);
    }
    for (href, label) in &args.header_items {
        builder = builder.header_item(href, label);
    }
    if args.page_content {
        builder = builder.with_page_content();
    }

    let source = match args.script {
        Some(path) => CommandSource::Script(path),
        None => CommandSource::Stdin,
    };

    if let Err(e) = tabshell::run_headless(builder.build(), settings, source).await {
        eprintln!("{}", log_hint(&log_file));
        return Err(e.into());
    }
    Ok(())
}

/// Where to look for details after a failed run
fn log_hint(log_file: &Path) -> String {
    format!("tabshell: see {} for details", log_file.display())
}
