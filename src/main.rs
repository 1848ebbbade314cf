use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use solekit::commands::{self, SessionSource};
use solekit::{init_logging, FootSide, ShoeSize, BUILD_DATE, VERSION};
use std::path::PathBuf;

/// SoleKit - true-scale orthotic insole layout
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON or TOML)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a session into a printable A4 SVG page
    Print {
        /// Session snapshot file
        #[arg(value_name = "SESSION", conflicts_with = "patient")]
        session: Option<PathBuf>,

        /// Load the stored session of this patient instead of a file
        #[arg(long, requires = "side")]
        patient: Option<String>,

        /// Foot side of the stored session (left or right)
        #[arg(long)]
        side: Option<String>,

        /// Output SVG file
        #[arg(short, long, value_name = "FILE", default_value = "insole.svg")]
        output: PathBuf,
    },

    /// Show foot length, scale and print rotation for a shoe size
    Size {
        /// EU shoe size (32-50)
        size: String,

        /// Foot side
        #[arg(long, default_value = "left")]
        side: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List catalog pieces with dimensions resolved at a shoe size
    Catalog {
        /// EU shoe size (32-50)
        #[arg(long, default_value = "41")]
        size: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    tracing::debug!(version = VERSION, build_date = BUILD_DATE, "Starting solekit");

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Print {
            session,
            patient,
            side,
            output,
        } => {
            let source = match (session, patient, side) {
                (Some(path), _, _) => SessionSource::File(path),
                (None, Some(patient_id), Some(side)) => SessionSource::Stored {
                    patient_id,
                    side: side.parse::<FootSide>()?,
                },
                _ => bail!("Provide a session file or --patient with --side"),
            };

            let doc = commands::print_session(source, &output, &config).await?;
            println!(
                "Wrote {} ({}), size {} {}, rotation {:.1} deg",
                output.display(),
                commands::page_label(doc.page),
                doc.shoe_size,
                doc.foot_side,
                doc.fit.final_rotation
            );
            if !doc.fit.fits {
                eprintln!(
                    "Warning: outline exceeds the printable area by {:.1} units; printed at true scale",
                    doc.fit.overflow
                );
            }
        }
        Command::Size { size, side, json } => {
            let size = ShoeSize::parse(&size)?;
            let side = side.parse::<FootSide>()?;
            let report = commands::size_report(size, side, &config);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Shoe size:      {}", report.shoe_size);
                println!("Foot length:    {:.1} cm", report.foot_length_cm);
                println!("Scale (x, y):   {:.4}, {:.4}", report.scale_x, report.scale_y);
                println!(
                    "Outline:        {:.1} x {:.1} units",
                    report.outline_width, report.outline_height
                );
                println!("Cosmetic angle: {:.1} deg", report.cosmetic_angle);
                println!(
                    "Print rotation: {:.1} deg{}",
                    report.final_rotation,
                    if report.fits { "" } else { " (does not fit)" }
                );
            }
        }
        Command::Catalog { size, json } => {
            let size = ShoeSize::parse(&size)?;
            let store = commands::dimension_store(&config)?;
            let lines = commands::catalog_report(size, &store);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&lines).context("Failed to encode catalog")?
                );
            } else {
                for line in lines {
                    println!(
                        "{:<22} {:>5.1} x {:>5.1} cm  {:>4.1} mm  {}",
                        line.id, line.width_cm, line.depth_cm, line.thickness_mm, line.material
                    );
                }
            }
        }
    }

    Ok(())
}
