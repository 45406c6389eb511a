//! Schematic Converter CLI
//!
//! Convert Minecraft structure files into glTF models.

use clap::{Parser, Subcommand};
use schematic_converter::{Converter, ConverterConfig, ModelFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schematic-converter")]
#[command(author, version, about = "Convert Minecraft structure files into glTF models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one or more structure files
    Convert {
        /// Structure files (.nbt, gzip-compressed or raw)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (single input only, defaults to model.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "gltf")]
        format: ModelFormat,

        /// Block schema version (selects the block registry)
        #[arg(long)]
        schema_version: Option<String>,

        /// Block registry data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Chunk radius of blocks to keep around the structure centre
        #[arg(long)]
        view_distance: Option<u32>,

        /// Canvas width, for the camera aspect ratio
        #[arg(long)]
        width: Option<u32>,

        /// Canvas height, for the camera aspect ratio
        #[arg(long)]
        height: Option<u32>,

        /// Disable face culling
        #[arg(long)]
        no_culling: bool,
    },

    /// Show information about a structure file
    Info {
        /// Structure file
        input: PathBuf,

        /// Block registry data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            out_dir,
            format,
            schema_version,
            data_dir,
            view_distance,
            width,
            height,
            no_culling,
        } => {
            let mut config = ConverterConfig::from_env();
            if let Some(version) = schema_version {
                config.schema_version = version;
            }
            if data_dir.is_some() {
                config.data_dir = data_dir;
            }
            if view_distance.is_some() {
                config.view_distance = view_distance;
            }
            if let Some(width) = width {
                config.canvas_width = width;
            }
            if let Some(height) = height {
                config.canvas_height = height;
            }
            config.cull_hidden_faces = !no_culling;

            convert_files(&inputs, output, &out_dir, format, config)?;
        }
        Commands::Info { input, data_dir } => {
            let mut config = ConverterConfig::from_env();
            if data_dir.is_some() {
                config.data_dir = data_dir;
            }
            show_info(&input, config)?;
        }
    }

    Ok(())
}

fn convert_files(
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    out_dir: &Path,
    format: ModelFormat,
    config: ConverterConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if output.is_some() && inputs.len() > 1 {
        return Err("--output can only be used with a single input, use --out-dir instead".into());
    }

    let converter = Converter::from_config(config)?;
    fs::create_dir_all(out_dir)?;

    let mut failures = 0;
    for input in inputs {
        let target = match &output {
            Some(path) => path.clone(),
            None => output_path(input, out_dir, format, inputs.len() == 1),
        };

        match convert_file(&converter, input, &target, format) {
            Ok(()) => {}
            Err(e) => {
                eprintln!("Failed to convert {:?}: {}", input, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} conversions failed", failures, inputs.len()).into());
    }
    Ok(())
}

fn convert_file(
    converter: &Converter,
    input: &Path,
    target: &Path,
    format: ModelFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Converting {:?}...", input);
    let data = fs::read(input)?;
    let conversion = converter.convert(&data, format)?;

    println!(
        "  Placed {} blocks ({} rendered), skipped {} air",
        conversion.block_count, conversion.rendered_count, conversion.report.air_skipped
    );
    if !conversion.report.unknown_types.is_empty() {
        println!(
            "  {} blocks of {} unknown types mapped to id 0",
            conversion.report.unknown_block_count(),
            conversion.report.unknown_types.len()
        );
    }

    fs::write(target, &conversion.bytes)?;
    println!("Exported {} bytes to {:?}", conversion.bytes.len(), target);

    Ok(())
}

/// `model.<ext>` for a single input, `<stem>.<ext>` per input otherwise.
fn output_path(input: &Path, out_dir: &Path, format: ModelFormat, single: bool) -> PathBuf {
    let stem = if single {
        "model".to_string()
    } else {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string())
    };
    out_dir.join(format!("{}.{}", stem, format.extension()))
}

fn show_info(input: &Path, config: ConverterConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading structure from {:?}...", input);
    let data = fs::read(input)?;
    let converter = Converter::from_config(config)?;
    let decoded = converter.decode(&data)?;

    println!("\nStructure Info:");
    match decoded.data_version {
        Some(version) => println!("  Data version: {}", version),
        None => println!("  Data version: unknown"),
    }
    if let Some([x, y, z]) = decoded.size {
        println!("  Size: {}x{}x{}", x, y, z);
    }
    println!("  Palette entries: {}", decoded.palette.len());
    println!("  Blocks: {}", decoded.world.len());
    println!("  Air skipped: {}", decoded.report.air_skipped);
    if decoded.report.overwritten > 0 {
        println!("  Overwritten positions: {}", decoded.report.overwritten);
    }
    for (name, count) in &decoded.report.unknown_types {
        println!("  Unknown type: {} ({} blocks)", name, count);
    }
    if let Some(bounds) = decoded.world.bounds() {
        let [w, h, d] = bounds.dimensions();
        println!("  Bounds: {}x{}x{}", w, h, d);
    }

    Ok(())
}
