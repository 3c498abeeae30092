use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::RgbImage;
use log::{debug, error, info, warn};

use lib_vbm::constants::{COLOR_MAP_EXT, FILE_EXT, PALETTE_EXT};
use lib_vbm::palette::system_colors::patch_soltys;
use lib_vbm::{encode, parse, ColorIndexMap, Palette, PixelGrid};

use crate::batch::{ensure_output_dir, file_stem_lower, gather_inputs, write_file};
use crate::{Game, PalettesArgs, PngArgs, VbmArgs};

/// Extracts the embedded palette of every input .vbm into a flat .act
/// file; inputs without one are passed over.
pub fn extract_palettes(args: &PalettesArgs) -> Result<()> {
    ensure_output_dir(&args.common.output)?;

    let mut failures = 0;
    for file in gather_inputs(&args.common.input, FILE_EXT)? {
        let result = extract_one_palette(&file, &args.common.output);
        if let Err(err) = result {
            error!("{}: {:#}", file.display(), err);
            failures += 1;
        }
    }
    finish_batch(failures)
}

fn extract_one_palette(file: &Path, out_dir: &Path) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let vbm = parse(&data)?;
    let Some(palette) = vbm.palette else {
        debug!("{} has no embedded palette, skipping", file.display());
        return Ok(());
    };

    let out_path = output_path(out_dir, file, PALETTE_EXT);
    info!("writing palette to {}", out_path.display());
    write_file(&out_path, &palette.to_act_bytes())
}

/// Converts every input .vbm to a .png plus its side-band .mct color
/// map, picking a palette per file: forced > embedded > matched by name >
/// fallback.
pub fn to_png(args: &PngArgs) -> Result<()> {
    ensure_output_dir(&args.common.output)?;

    let force = load_palette_arg(args.force_palette.as_deref(), args.game)?;
    let fallback = load_palette_arg(args.fallback_palette.as_deref(), args.game)?;
    let by_name = match args.palette_path.as_deref() {
        Some(dir) => load_palette_dir(dir, args.game)?,
        None => Vec::new(),
    };

    let mut failures = 0;
    for file in gather_inputs(&args.common.input, FILE_EXT)? {
        let result = convert_one_to_png(
            &file,
            &args.common.output,
            force.as_ref(),
            &by_name,
            fallback.as_ref(),
        );
        if let Err(err) = result {
            error!("{}: {:#}", file.display(), err);
            failures += 1;
        }
    }
    finish_batch(failures)
}

fn convert_one_to_png(
    file: &Path,
    out_dir: &Path,
    force: Option<&Palette>,
    by_name: &[(String, Palette)],
    fallback: Option<&Palette>,
) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let vbm = parse(&data)?;

    let stem = file_stem_lower(file);
    let palette = force
        .or(vbm.palette.as_ref())
        .or_else(|| match_palette(&stem, by_name))
        .or(fallback);
    let Some(palette) = palette else {
        warn!("no palette found for {}, skipping", file.display());
        return Ok(());
    };

    let decoded = vbm.rasterize(palette)?;

    let duplicates = decoded.color_map.duplicate_colors();
    if !duplicates.is_empty() {
        let listed: Vec<String> = duplicates
            .iter()
            .map(|(color, indices)| format!("{color:?} from indices {indices:?}"))
            .collect();
        warn!(
            "palette used for {} contains non-unique colors: {}",
            file.display(),
            listed.join(", ")
        );
    }

    let png_path = output_path(out_dir, file, "png");
    info!("writing {}", png_path.display());
    save_png(&png_path, &decoded.image)?;

    let map_path = output_path(out_dir, file, COLOR_MAP_EXT);
    write_file(&map_path, &decoded.color_map.to_bytes())
}

/// Converts every input .png back to a .vbm, reading the color map the
/// png conversion left next to it. A missing or unreadable map skips the
/// file, the engine indices cannot be reconstructed without it.
pub fn to_vbm(args: &VbmArgs) -> Result<()> {
    ensure_output_dir(&args.common.output)?;

    let embed = match args.embed_palette.as_deref() {
        Some(path) => Some(load_act(path)?),
        None => None,
    };

    let mut failures = 0;
    for file in gather_inputs(&args.common.input, "png")? {
        let result = convert_one_to_vbm(&file, &args.common.output, embed.as_ref());
        if let Err(err) = result {
            error!("{}: {:#}", file.display(), err);
            failures += 1;
        }
    }
    finish_batch(failures)
}

fn convert_one_to_vbm(file: &Path, out_dir: &Path, embed: Option<&Palette>) -> Result<()> {
    let map_path = file.with_extension(COLOR_MAP_EXT);
    if !map_path.is_file() {
        warn!(
            "no mapped color table found (expected at {}), skipping",
            map_path.display()
        );
        return Ok(());
    }
    let color_map = match load_color_map(&map_path) {
        Ok(map) => map,
        Err(err) => {
            warn!("unable to read color table {}: {:#}", map_path.display(), err);
            return Ok(());
        }
    };

    let img = image::open(file)
        .with_context(|| format!("reading {}", file.display()))?
        .to_rgb8();
    let grid = grid_from_png(&img);

    let encoded = encode(&grid, &color_map, embed)?;

    let out_path = output_path(out_dir, file, FILE_EXT);
    info!("writing {}", out_path.display());
    write_file(&out_path, &encoded)
}

fn finish_batch(failures: usize) -> Result<()> {
    if failures > 0 {
        bail!("{failures} file(s) failed");
    }
    Ok(())
}

fn output_path(out_dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    out_dir.join(stem).with_extension(extension)
}

fn load_act(path: &Path) -> Result<Palette> {
    let bytes = fs::read(path).with_context(|| format!("reading palette {}", path.display()))?;
    Palette::from_act_bytes(&bytes)
        .with_context(|| format!("parsing palette {}", path.display()))
}

/// Loads an .act palette and patches the Soltys system slots right away,
/// before any conversion sees it.
fn load_palette_arg(path: Option<&Path>, game: Game) -> Result<Option<Palette>> {
    let Some(path) = path else { return Ok(None) };
    let palette = load_act(path)?;
    Ok(Some(match game {
        Game::Soltys => patch_soltys(&palette),
        Game::Sfinx => palette,
    }))
}

fn load_palette_dir(dir: &Path, game: Game) -> Result<Vec<(String, Palette)>> {
    let mut palettes = Vec::new();
    for file in gather_inputs(dir, PALETTE_EXT)? {
        let palette = load_palette_arg(Some(&file), game)?;
        if let Some(palette) = palette {
            palettes.push((file_stem_lower(&file), palette));
        }
    }
    Ok(palettes)
}

/// Picks a palette whose file stem matches the asset's: exact stem first,
/// then the first palette whose stem is a prefix of the asset's.
fn match_palette<'a>(stem: &str, by_name: &'a [(String, Palette)]) -> Option<&'a Palette> {
    if let Some((_, palette)) = by_name.iter().find(|(name, _)| name == stem) {
        return Some(palette);
    }
    by_name
        .iter()
        .find(|(name, _)| stem.starts_with(name.as_str()))
        .map(|(_, palette)| palette)
}

fn load_color_map(path: &Path) -> Result<ColorIndexMap> {
    let bytes = fs::read(path)?;
    Ok(ColorIndexMap::from_bytes(&bytes)?)
}

fn save_png(path: &Path, grid: &PixelGrid) -> Result<()> {
    let mut img = RgbImage::new(grid.width() as u32, grid.height() as u32);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = image::Rgb(grid.get(x as usize, y as usize));
    }
    if let Err(err) = img.save(path) {
        let _ = fs::remove_file(path);
        return Err(err).with_context(|| format!("writing {}", path.display()));
    }
    Ok(())
}

fn grid_from_png(img: &RgbImage) -> PixelGrid {
    let mut grid = PixelGrid::filled(img.width() as usize, img.height() as usize, [0, 0, 0]);
    for (x, y, pixel) in img.enumerate_pixels() {
        grid.set(x as usize, y as usize, pixel.0);
    }
    grid
}
