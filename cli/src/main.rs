//! mdhwpx CLI - Markdown report to HWPX assembler

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use mdhwpx::package::{Manifest, TemplatePackage};
use mdhwpx::{
    detect_format_from_path, AssembleOptions, ConversionJob, ConvertOptions, Converter,
    ParseOptions, Progress, RendererKind, SectionSource,
};

#[derive(Parser)]
#[command(name = "mdhwpx")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Assemble Markdown reports into HWPX packages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Markdown sections into an HWPX package
    Convert {
        /// Template package
        #[arg(short, long, value_name = "FILE", required_unless_present = "job")]
        template: Option<PathBuf>,

        /// Body section as LABEL=PATH (repeatable, in order)
        #[arg(short, long = "section", value_name = "LABEL=PATH", value_parser = parse_section)]
        sections: Vec<SectionSource>,

        /// Appendix section as LABEL=PATH (repeatable, in order)
        #[arg(short, long = "appendix", value_name = "LABEL=PATH", value_parser = parse_section)]
        appendix: Vec<SectionSource>,

        /// Job file (JSON) describing template, sections and output
        #[arg(long, value_name = "FILE", conflicts_with_all = ["sections", "appendix"])]
        job: Option<PathBuf>,

        /// Output package (default: report_YYYYMMDD_HHMMSS.hwpx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Section member receiving the body
        #[arg(long, value_name = "MEMBER")]
        section_member: Option<String>,

        /// Section member receiving a table of contents
        #[arg(long, value_name = "MEMBER")]
        toc_member: Option<String>,

        /// Style catalog (JSON)
        #[arg(long, value_name = "FILE")]
        styles: Option<PathBuf>,

        /// Diagram render command
        #[arg(long, value_name = "CMD", env = "MDHWPX_RENDERER", default_value = "mmdc")]
        renderer_cmd: PathBuf,

        /// Use pre-rendered diagram_<id>.png files from this directory
        #[arg(long, value_name = "DIR", conflicts_with = "no_diagrams")]
        diagrams_dir: Option<PathBuf>,

        /// Skip diagram rendering; diagrams become placeholders
        #[arg(long)]
        no_diagrams: bool,

        /// Render worker threads
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Per-diagram render timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Keep rendered diagrams in this directory
        #[arg(long, value_name = "DIR")]
        work_dir: Option<PathBuf>,

        /// Skip missing section files instead of failing
        #[arg(long)]
        lenient: bool,

        /// Write the run summary as JSON
        #[arg(long, value_name = "FILE")]
        summary_json: Option<PathBuf>,
    },

    /// Parse a Markdown file and print its blocks as JSON
    Parse {
        /// Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Keep manual heading numbers
        #[arg(long)]
        keep_numbers: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show template package information
    Info {
        /// Template package
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Manifest member
        #[arg(long, default_value = "Contents/content.hpf")]
        manifest: String,

        /// Binary-asset directory
        #[arg(long, default_value = "BinData")]
        bin_dir: String,
    },

    /// Show version information
    Version,
}

fn parse_section(s: &str) -> Result<SectionSource, String> {
    s.parse().map_err(|e: mdhwpx::Error| e.to_string())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            template,
            sections,
            appendix,
            job,
            output,
            section_member,
            toc_member,
            styles,
            renderer_cmd,
            diagrams_dir,
            no_diagrams,
            workers,
            timeout_secs,
            work_dir,
            lenient,
            summary_json,
        }) => {
            let renderer = if no_diagrams {
                RendererKind::Disabled
            } else if let Some(dir) = diagrams_dir {
                RendererKind::Directory(dir)
            } else {
                RendererKind::Command(renderer_cmd)
            };
            let args = ConvertArgs {
                template,
                sections,
                appendix,
                job,
                output,
                section_member,
                toc_member,
                styles,
                renderer,
                workers,
                timeout: timeout_secs.map(Duration::from_secs),
                work_dir,
                lenient,
                summary_json,
            };
            cmd_convert(args)
        }
        Some(Commands::Parse {
            input,
            output,
            keep_numbers,
            compact,
        }) => cmd_parse(&input, output.as_deref(), keep_numbers, compact),
        Some(Commands::Info {
            input,
            manifest,
            bin_dir,
        }) => cmd_info(&input, &manifest, &bin_dir),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!(
                "{}",
                "Usage: mdhwpx convert -t <TEMPLATE> -s <LABEL=PATH>...".yellow()
            );
            println!("       mdhwpx --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct ConvertArgs {
    template: Option<PathBuf>,
    sections: Vec<SectionSource>,
    appendix: Vec<SectionSource>,
    job: Option<PathBuf>,
    output: Option<PathBuf>,
    section_member: Option<String>,
    toc_member: Option<String>,
    styles: Option<PathBuf>,
    renderer: RendererKind,
    workers: usize,
    timeout: Option<Duration>,
    work_dir: Option<PathBuf>,
    lenient: bool,
    summary_json: Option<PathBuf>,
}

fn cmd_convert(args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut job = match &args.job {
        Some(path) => ConversionJob::from_json_file(path)?,
        None => ConversionJob {
            body: args.sections,
            appendix: args.appendix,
            ..Default::default()
        },
    };
    if let Some(template) = args.template {
        job.template = template;
    }
    if args.output.is_some() {
        job.output = args.output;
    }
    if args.toc_member.is_some() {
        job.toc_member = args.toc_member;
    }
    if args.styles.is_some() {
        job.styles = args.styles;
    }
    if job.output.is_none() {
        job.output = Some(job.output_or_default(&chrono::Local::now()));
    }
    log::debug!("job: {:?}", job);

    let mut assemble = AssembleOptions::new();
    if let Some(member) = args.section_member {
        assemble = assemble.with_section_member(member);
    }
    let mut options = ConvertOptions::new()
        .with_assemble_options(assemble)
        .with_renderer(args.renderer)
        .with_workers(args.workers);
    if args.lenient {
        options = options.lenient();
    }
    if let Some(timeout) = args.timeout {
        options = options.with_timeout(timeout);
    }
    if let Some(dir) = args.work_dir {
        options = options.with_work_dir(dir);
    }

    let pb = ProgressBar::new(Progress::COUNT as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Parsing sections...");

    let converter = Converter::new(options);
    let summary = converter.run_with(&job, &mut |progress| {
        match progress {
            Progress::Parsed { blocks, diagrams } => {
                pb.set_message(format!(
                    "Parsed {} blocks, rendering {} diagrams...",
                    blocks, diagrams
                ));
            }
            Progress::Rendered { ok, failed } => {
                pb.set_message(format!("Rendered {} diagrams ({} failed)", ok, failed));
            }
            Progress::Stage(stage) => pb.set_message(stage.to_string()),
        }
        pb.inc(1);
    });

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };
    pb.finish_with_message("Done!");

    println!("\n{}", "Summary".green().bold());
    println!("{}", "─".repeat(40).dimmed());
    print!("{}", summary);

    if !summary.failures.is_empty() {
        println!(
            "\n{} {} diagrams failed to render; placeholders were written",
            "Warning:".yellow().bold(),
            summary.failures.len()
        );
    }

    if let Some(path) = args.summary_json {
        fs::write(&path, summary.to_json()?)?;
        println!("{} {}", "Summary saved to".green(), path.display());
    }

    Ok(())
}

fn cmd_parse(
    input: &Path,
    output: Option<&Path>,
    keep_numbers: bool,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ParseOptions::new();
    if keep_numbers {
        options = options.keep_heading_numbers();
    }
    let text = fs::read_to_string(input)?;
    let blocks = mdhwpx::parse_markdown_with_options(&text, options)?;

    let json = if compact {
        serde_json::to_string(&blocks)?
    } else {
        serde_json::to_string_pretty(&blocks)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path, manifest: &str, bin_dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let package = TemplatePackage::open(input)?;

    println!("{}", "Package Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Members".bold(), package.len());

    println!();
    println!("{}", "Members".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for name in package.names() {
        let size = package.member(name).map(|d| d.len()).unwrap_or(0);
        println!("  {} {} ({} bytes)", "·".dimmed(), name, size);
    }

    println!();
    println!("{}", "Manifest".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let manifest = Manifest::parse(&package.member_text(manifest)?)?;
    println!("{}: {}", "Items".bold(), manifest.item_ids().len());
    let highest = manifest
        .highest_asset_id()
        .max(package.highest_bin_id(bin_dir));
    println!("{}: {}", "Highest asset id".bold(), highest);
    println!("{}: image{}", "Next asset id".bold(), highest + 1);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "mdhwpx".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Markdown report to HWPX assembler");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/mdhwpx".dimmed());
    println!("License: MIT");
}
