//! Command-line converter from Word documents to PDF.
//!
//! # Usage
//!
//! ```sh
//! longan report.docx -o report.pdf
//! longan *.docx --out-dir pdf/ --config layout.yaml -v
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use longan::convert::{convert_batch, output_path};
use longan::ooxml::charts::{ChartResolver, ResolveMode};
use longan::render::{ChartRenderer, Typeface};
use longan::{Converter, RenderConfig};

/// Convert Word documents to PDF, drawing embedded charts natively
#[derive(Parser, Debug)]
#[command(name = "longan", version)]
struct Args {
    /// Input .docx file(s)
    #[arg(value_name = "INPUT", required_unless_present = "print_config")]
    input: Vec<PathBuf>,

    /// Output file (single input only)
    #[arg(short, long, value_name = "OUTPUT", conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Directory for the generated PDFs
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// YAML layout configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// TrueType/OpenType font for chart labels
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Fill charts without cached data with sample values
    #[arg(long)]
    demo_data: bool,

    /// Override the maximum image width in points
    #[arg(long, value_name = "PT")]
    max_image_width: Option<f32>,

    /// Override the maximum image height in points
    #[arg(long, value_name = "PT")]
    max_image_height: Option<f32>,

    /// Override all four page margins in points
    #[arg(long, value_name = "PT")]
    margin: Option<f32>,

    /// Override the line height in points
    #[arg(long, value_name = "PT")]
    line_height: Option<f32>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::from_file(path)?,
            None => RenderConfig::default(),
        };
        if let Some(width) = self.max_image_width {
            config.max_image_width = width;
        }
        if let Some(height) = self.max_image_height {
            config.max_image_height = height;
        }
        if let Some(margin) = self.margin {
            config.margins = longan::config::Margins::uniform(margin);
        }
        if let Some(line_height) = self.line_height {
            config.line_height = line_height;
        }
        config.validate()?;
        Ok(config)
    }

    fn typeface(&self) -> Result<Typeface> {
        match &self.font {
            Some(path) => Typeface::from_file(path).with_context(|| format!("loading font {}", path.display())),
            None => Ok(Typeface::discover()),
        }
    }

    fn jobs(&self) -> Result<Vec<(PathBuf, PathBuf)>> {
        if self.output.is_some() && self.input.len() > 1 {
            bail!("--output takes a single input; use --out-dir for several");
        }
        if let Some(dir) = &self.out_dir {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }

        let mut jobs = Vec::with_capacity(self.input.len());
        for input in &self.input {
            if !input.is_file() {
                bail!("input is not a file: {}", input.display());
            }
            let output = match &self.output {
                Some(output) => output.clone(),
                None => output_path(input, self.out_dir.as_deref()),
            };
            if output.exists() && !self.force {
                bail!("{} exists; use --force to overwrite", output.display());
            }
            jobs.push((input.clone(), output));
        }
        Ok(jobs)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = args.render_config()?;
    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let mode = if args.demo_data {
        ResolveMode::Demo
    } else {
        ResolveMode::Faithful
    };
    let converter = Converter::new(config)?
        .with_resolver(ChartResolver::new().with_mode(mode))
        .with_renderer(ChartRenderer::new(args.typeface()?));

    let jobs = args.jobs()?;
    let outcomes = convert_batch(&converter, &jobs);

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => println!("✓ {} -> {} ({})", outcome.input.display(), outcome.output.display(), report),
            Err(e) => {
                failed += 1;
                eprintln!("✗ {}: {}", outcome.input.display(), e);
            },
        }
    }

    if outcomes.len() > 1 {
        println!("\n{} converted, {} failed", outcomes.len() - failed, failed);
    }
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
