use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use blogport::config::{Config, DEFAULT_CONFIG_FILE};
use blogport::convert::Conversion;
use blogport::report;

#[derive(Parser, Debug)]
#[command(
    name = "blogport",
    about = "Convert a Blogger Atom export into a JSON document of posts and pages"
)]
struct Args {
    /// Atom feed exported from Blogger (default: feed.atom)
    #[arg(value_name = "FEED")]
    input: Option<PathBuf>,

    /// JSON file to write, replaced if it exists (default: blogger_content.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Title stored as `blog_title` in the output
    #[arg(long, value_name = "TEXT")]
    blog_title: Option<String>,

    /// Settings file; missing is fine
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> Result<()> {
    // Logs go to stderr so the summary on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config file: {}", args.config.display()))?
        .with_overrides(args.input, args.output, args.blog_title);
    tracing::debug!(?config, "Resolved settings");

    let document = Conversion::from(config).run()?;

    report::print_summary(&document);
    Ok(())
}
