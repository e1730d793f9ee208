use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tex2svg::logging::{self, LogFormat};
use tex2svg::{
    strip_delimiters, ConversionRequest, Converter, Options, DEFAULT_DPI, DEFAULT_FONT_SIZE,
};
use tracing::error;

/// Convert a TeX math expression to an SVG file.
#[derive(Debug, Parser)]
#[command(name = "tex2svg", version, about, long_about = None)]
struct Cli {
    /// TeX math expression; one pair of $...$, $$...$$, \(...\) or \[...\] is stripped.
    /// Put `--` first when it starts with a hyphen
    #[arg(value_name = "TEX")]
    tex: String,

    /// Output file, or `-` for stdout
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Font size in points
    #[arg(short = 's', long, env = "TEX2SVG_FONT_SIZE", default_value_t = DEFAULT_FONT_SIZE)]
    font_size: f64,

    /// Resolution used to turn the font size into pixels
    #[arg(short, long, env = "TEX2SVG_DPI", default_value_t = DEFAULT_DPI)]
    dpi: f64,

    /// Typeset in inline (text) style instead of display style
    #[arg(long)]
    inline: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, env = "TEX2SVG_LOG_FORMAT", default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            font_size: self.font_size,
            dpi: self.dpi,
            display: !self.inline,
        }
    }

    fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = logging::init(cli.verbose, cli.log_format) {
        eprintln!("warning: {err}");
    }
    if let Err(err) = run(&cli) {
        report(&err);
        process::exit(1);
    }
}

fn report(err: &anyhow::Error) {
    let message = format!("{err:#}");
    if tracing::dispatcher::has_been_set() {
        error!(error = %message, "conversion failed");
    } else {
        eprintln!("error: {message}");
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let options = cli.options();

    if cli.writes_to_stdout() {
        strip_delimiters(&cli.tex)
            .and_then(|_| options.validate())
            .with_context(|| format!("failed to convert {:?}", cli.tex))?;
        let mut converter = Converter::new().context("failed to start MathJax")?;
        let svg = converter
            .render(&cli.tex, &options)
            .with_context(|| format!("failed to convert {:?}", cli.tex))?;
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(svg.as_bytes())
            .and_then(|()| stdout.flush())
            .context("failed to write SVG to stdout")?;
        return Ok(());
    }

    let request = ConversionRequest::new(cli.tex.as_str(), &cli.output).with_options(options);
    request
        .validate()
        .with_context(|| format!("failed to convert {:?}", cli.tex))?;
    let mut converter = Converter::new().context("failed to start MathJax")?;
    converter
        .convert(&request)
        .with_context(|| format!("failed to convert {:?}", cli.tex))?;
    Ok(())
}
