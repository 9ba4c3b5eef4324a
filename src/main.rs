use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use thumbplan::imaging::{Anchor, ResizePolicy, compute_missing_dimension, plan_resize};
use thumbplan::types::Size;
use thumbplan::{config, imaging, output, process};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thumbplan")]
#[command(about = "Plan and apply thumbnail resizes and watermark placements")]
#[command(long_about = "\
Plan and apply thumbnail resizes and watermark placements

Resize policies:
  inset               scale down to fit inside the box, keep aspect ratio
  outbound            fill the box, crop the overflow around the centre
  outbound-from-top   fill the box, crop tall images from the top edge

Watermark anchors:
  top-left  top  top-right  left  center  right
  bottom-left  bottom  bottom-right  repeat  X,Y

Sizes are written WxH. A 0x0 target box means \"leave unchanged\".

Run 'thumbplan gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Print plans and results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show how an image would be resized into a box
    PlanResize {
        /// Source image size
        #[arg(long)]
        source: Size,
        /// Target box
        #[arg(long)]
        target: Size,
        /// Resize policy
        #[arg(long, default_value = "inset")]
        policy: ResizePolicy,
    },
    /// Show where a watermark would be pasted
    PlanWatermark {
        /// Source image size
        #[arg(long)]
        source: Size,
        /// Watermark size
        #[arg(long)]
        watermark: Size,
        /// Anchor name, `repeat`, or an explicit X,Y offset
        #[arg(long, default_value = "center")]
        anchor: Anchor,
    },
    /// Compute the missing side of a target from the source aspect ratio
    Scale {
        /// Source image size
        #[arg(long)]
        source: Size,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// Print the image backend selected for this system
    Backend,
    /// Thumbnail image files or directories of images
    Thumbnail {
        /// Image files or directories (walked recursively)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Where thumbnails are written
        #[arg(long, default_value = "thumbnails")]
        out_dir: PathBuf,
        /// Target box
        #[arg(long)]
        target: Size,
        /// Resize policy
        #[arg(long, default_value = "outbound")]
        policy: ResizePolicy,
        /// Worker threads (defaults to all cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Paste a watermark onto an image
    Watermark {
        /// Image to watermark
        input: PathBuf,
        /// Watermark image
        #[arg(long)]
        mark: PathBuf,
        /// Output file
        #[arg(long)]
        output: PathBuf,
        /// Anchor name, `repeat`, or an explicit X,Y offset
        #[arg(long, default_value = "bottom-right")]
        anchor: Anchor,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Serialize)]
struct ScaleOutput {
    width: u32,
    height: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::PlanResize {
            source,
            target,
            policy,
        } => {
            let plan = plan_resize(source, target, policy)?;
            if cli.json {
                print_json(&plan)?;
            } else {
                print_lines(output::format_resize_plan(&plan));
            }
        }
        Command::PlanWatermark {
            source,
            watermark,
            anchor,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let plan = imaging::plan_watermark(
                source,
                watermark,
                anchor,
                config.watermark.shrink_factor,
            )?;
            if cli.json {
                print_json(&plan)?;
            } else {
                print_lines(output::format_paste_plan(&plan, source));
            }
        }
        Command::Scale {
            source,
            width,
            height,
        } => {
            let (width, height) = compute_missing_dimension(source, width, height)?;
            if cli.json {
                print_json(&ScaleOutput { width, height })?;
            } else {
                println!("{}", Size::new(width, height));
            }
        }
        Command::Backend => {
            let config = config::load_config(&cli.config_dir)?;
            let handle = imaging::select_backend(&config.backend.preferred_order)?;
            if cli.json {
                print_json(&handle.kind())?;
            } else {
                println!("{}", output::format_backend(handle.kind()));
            }
        }
        Command::Thumbnail {
            inputs,
            out_dir,
            target,
            policy,
            jobs,
        } => {
            init_thread_pool(jobs);
            let files = process::collect_inputs(&inputs)?;
            tracing::info!(count = files.len(), "thumbnailing");
            let results = process::thumbnail_batch(
                &files,
                &out_dir,
                process::ThumbnailJob { target, policy },
            )?;

            let mut done = Vec::new();
            let mut failed = 0;
            for (source, result) in files.iter().zip(results) {
                match result {
                    Ok(outcome) => done.push(outcome),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {}", source.display(), e);
                    }
                }
            }

            if cli.json {
                print_json(&done)?;
            } else {
                for outcome in &done {
                    println!(
                        "{}",
                        output::format_thumbnail_result(
                            &outcome.source,
                            &outcome.output,
                            &outcome.plan
                        )
                    );
                }
            }
            if failed > 0 {
                return Err(format!("{failed} of {} images failed", files.len()).into());
            }
        }
        Command::Watermark {
            input,
            mark,
            output: output_path,
            anchor,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let outcome = process::watermark_file(
                &input,
                &mark,
                &output_path,
                anchor,
                config.watermark.shrink_factor,
            )?;
            if cli.json {
                print_json(&outcome)?;
            } else {
                print_lines(output::format_paste_plan(&outcome.plan, outcome.source));
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Initialize the rayon thread pool.
///
/// Caps at the number of available CPU cores; `--jobs` can lower it, not raise it.
fn init_thread_pool(jobs: Option<usize>) {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let threads = jobs.map_or(cores, |j| j.clamp(1, cores));
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
