use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

mod batch;
mod convert;

#[derive(Parser)]
#[command(name = "vbm-convert", version, about = "Convert CGE .vbm raster assets to and from .png")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract embedded palettes out of .vbm files
    #[command(visible_aliases = ["pal", "p"])]
    Palettes(PalettesArgs),
    /// Convert .vbm files to .png
    Png(PngArgs),
    /// Convert .png files back to .vbm
    Vbm(VbmArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Input path, a single file or a directory for batch processing
    #[arg(short, long)]
    input: PathBuf,

    /// Output path, has to be a directory
    #[arg(short, long)]
    output: PathBuf,

    /// Extended console output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
struct PalettesArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct PngArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Use this palette even when the .vbm embeds its own
    #[arg(long, conflicts_with_all = ["palette_path", "fallback_palette"])]
    force_palette: Option<PathBuf>,

    /// Directory of .act palettes matched to inputs by filename prefix
    /// (e.g. 24.act matches 24don01.vbm)
    #[arg(long)]
    palette_path: Option<PathBuf>,

    /// Palette used when no embedded or matched palette is found
    #[arg(long)]
    fallback_palette: Option<PathBuf>,

    /// The game the assets belong to
    #[arg(short, long, value_enum)]
    game: Game,
}

#[derive(Args)]
struct VbmArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Embed this .act palette within the produced .vbm files
    #[arg(long)]
    embed_palette: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Game {
    /// Patches the known-zeroed system palette slots on load
    Soltys,
    Sfinx,
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Palettes(args) => {
            init_logging(args.common.verbose);
            convert::extract_palettes(&args)
        }
        Command::Png(args) => {
            init_logging(args.common.verbose);
            convert::to_png(&args)
        }
        Command::Vbm(args) => {
            init_logging(args.common.verbose);
            convert::to_vbm(&args)
        }
    }
}
