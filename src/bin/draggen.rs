use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use draggen::{
    ArtStyle, AspectRatio, AssetId, AssetLibrary, AssetRepository, AssetType, BlendMode, CarBuild,
    ChromaKeyOpts, DEFAULT_PLACEMENT, FileSlot, FlattenOpts, GenerationConfig, ImagePayload,
    ItemPatch, KeyBand, PaintColor, Perspective, Point, ProcessGenerator, ReferenceColor, Rgb8,
    Stage, TimestampMs,
};

#[derive(Parser, Debug)]
#[command(name = "draggen", version)]
struct Cli {
    /// Directory holding the persisted asset library.
    #[arg(long, global = true, default_value = "draggen-store")]
    store: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored assets, newest first.
    List,
    /// Add an existing image file to the library.
    Import(ImportArgs),
    /// Delete an asset.
    Remove(RemoveArgs),
    /// Remove the solid background of an asset in place.
    Key(KeyArgs),
    /// Write one asset as a PNG file.
    Export(ExportArgs),
    /// Generate a new asset with an external generator program.
    Generate(GenerateArgs),
    /// Place assets on a stage and flatten them into one PNG.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// Image file to import.
    #[arg(long)]
    file: PathBuf,

    /// Asset category.
    #[arg(long = "type")]
    asset_type: AssetType,

    /// Art style.
    #[arg(long)]
    style: ArtStyle,

    /// Prompt or description to record.
    #[arg(long, default_value = "")]
    prompt: String,
}

#[derive(Parser, Debug)]
struct RemoveArgs {
    /// Asset id.
    #[arg(long)]
    id: String,
}

#[derive(Parser, Debug)]
struct KeyOptsArgs {
    /// Distance below which pixels become fully transparent.
    #[arg(long, default_value_t = draggen::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Width of the soft edge band above the tolerance.
    #[arg(long, default_value_t = draggen::DEFAULT_SOFTNESS)]
    softness: f64,

    /// Keep soft-band colors as-is against dark backgrounds.
    #[arg(long, default_value_t = false)]
    no_defringe: bool,

    /// Key against this `#rrggbb` color instead of the top-left pixel.
    #[arg(long, conflicts_with = "corners_agree")]
    reference: Option<String>,

    /// Require all four corners within this distance of the top-left pixel.
    #[arg(long)]
    corners_agree: Option<f64>,
}

impl KeyOptsArgs {
    fn to_opts(&self) -> anyhow::Result<ChromaKeyOpts> {
        let reference = match (&self.reference, self.corners_agree) {
            (Some(hex), _) => ReferenceColor::Explicit(Rgb8::parse_hex(hex)?),
            (None, Some(max_distance)) => ReferenceColor::CornersAgree { max_distance },
            (None, None) => ReferenceColor::TopLeft,
        };
        Ok(ChromaKeyOpts {
            band: KeyBand {
                tolerance: self.tolerance,
                softness: self.softness,
                defringe: !self.no_defringe,
            },
            reference,
        })
    }
}

#[derive(Parser, Debug)]
struct KeyArgs {
    /// Asset id.
    #[arg(long)]
    id: String,

    #[command(flatten)]
    key: KeyOptsArgs,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Asset id.
    #[arg(long)]
    id: String,

    /// Directory to write into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Generator program; receives the request JSON on stdin.
    #[arg(long)]
    program: PathBuf,

    /// Extra argument passed to the generator program (repeatable).
    #[arg(long = "program-arg")]
    program_args: Vec<String>,

    /// Subject details; appended to the car build description when one is given.
    #[arg(long, default_value = "")]
    prompt: String,

    /// Asset category.
    #[arg(long = "type", default_value = "car")]
    asset_type: AssetType,

    /// Art style.
    #[arg(long, default_value = "vector")]
    style: ArtStyle,

    /// Output aspect ratio.
    #[arg(long, default_value = "1:1")]
    aspect_ratio: AspectRatio,

    /// Camera angle.
    #[arg(long, default_value = "top-down")]
    perspective: Perspective,

    /// Named paint color.
    #[arg(long, conflicts_with = "hex")]
    color: Option<String>,

    /// Custom `#rrggbb` paint color.
    #[arg(long)]
    hex: Option<String>,

    /// Stored asset to pass to the generator as a reference image.
    #[arg(long)]
    reference: Option<String>,

    #[command(flatten)]
    car: CarBuildArgs,
}

/// Guided car description; any flag switches the prompt to the build's text.
#[derive(Parser, Debug)]
struct CarBuildArgs {
    /// Body style, e.g. "Pro Mod Dragster".
    #[arg(long)]
    car_body: Option<String>,

    /// Hood, e.g. "Cowl Induction".
    #[arg(long)]
    hood: Option<String>,

    /// Rear spoiler, e.g. "GT Wing".
    #[arg(long)]
    spoiler: Option<String>,

    /// Decal set, or "none" for clean bodywork.
    #[arg(long)]
    decals: Option<String>,
}

impl CarBuildArgs {
    /// `None` when no build flag was given.
    fn to_build(&self, paint: Option<PaintColor>) -> Option<CarBuild> {
        if self.car_body.is_none()
            && self.hood.is_none()
            && self.spoiler.is_none()
            && self.decals.is_none()
        {
            return None;
        }
        let mut build = CarBuild::default();
        if let Some(paint) = paint {
            build.paint = paint;
        }
        if let Some(body) = &self.car_body {
            build.body = body.clone();
        }
        if let Some(hood) = &self.hood {
            build.hood = hood.clone();
        }
        if let Some(spoiler) = &self.spoiler {
            build.spoiler = spoiler.clone();
        }
        if let Some(decals) = &self.decals {
            build.decals = (!decals.trim().eq_ignore_ascii_case("none")).then(|| decals.clone());
        }
        Some(build)
    }
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Layout JSON: an array of placements.
    #[arg(long)]
    layout: PathBuf,

    /// Directory to write the flattened PNG into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Margin around the content.
    #[arg(long, default_value_t = draggen::EXPORT_PADDING)]
    padding: f64,
}

#[derive(serde::Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct Placement {
    asset: String,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    scale: Option<f64>,
    #[serde(default)]
    rotation_deg: f64,
    #[serde(default)]
    blend_mode: BlendMode,
    #[serde(default)]
    z_index: Option<i64>,
    #[serde(default)]
    key: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let library = AssetLibrary::open(AssetRepository::new(FileSlot::new(&cli.store)));
    match cli.cmd {
        Command::List => cmd_list(&library),
        Command::Import(args) => cmd_import(library, args),
        Command::Remove(args) => cmd_remove(library, args),
        Command::Key(args) => cmd_key(library, args),
        Command::Export(args) => cmd_export(&library, args),
        Command::Generate(args) => cmd_generate(library, args),
        Command::Compose(args) => cmd_compose(&library, args),
    }
}

fn cmd_list(library: &AssetLibrary<FileSlot>) -> anyhow::Result<()> {
    for asset in library.store() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            asset.id(),
            asset.asset_type(),
            asset.style(),
            asset.timestamp(),
            asset.prompt()
        );
    }
    Ok(())
}

fn cmd_import(mut library: AssetLibrary<FileSlot>, args: ImportArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("read image '{}'", args.file.display()))?;
    let format = image::guess_format(&bytes)
        .with_context(|| format!("unrecognized image '{}'", args.file.display()))?;
    let payload = ImagePayload::new(format.to_mime_type(), bytes);
    payload.decode()?;

    let id = library.create(
        payload,
        args.prompt,
        args.asset_type,
        args.style,
        TimestampMs::now(),
    )?;
    println!("{id}");
    Ok(())
}

fn cmd_remove(mut library: AssetLibrary<FileSlot>, args: RemoveArgs) -> anyhow::Result<()> {
    match library.remove(&AssetId::new(args.id.as_str()))? {
        Some(_) => eprintln!("removed {}", args.id),
        None => eprintln!("no asset {}", args.id),
    }
    Ok(())
}

fn cmd_key(mut library: AssetLibrary<FileSlot>, args: KeyArgs) -> anyhow::Result<()> {
    let opts = args.key.to_opts()?;
    let id = AssetId::new(args.id.as_str());
    if library.fix_transparency(&id, &opts)? {
        eprintln!("keyed {id}");
    } else {
        eprintln!("no asset {id}");
    }
    Ok(())
}

fn cmd_export(library: &AssetLibrary<FileSlot>, args: ExportArgs) -> anyhow::Result<()> {
    let id = AssetId::new(args.id.as_str());
    let asset = library.get(&id).with_context(|| format!("no asset {id}"))?;
    let png = ImagePayload::encode_png(&asset.image().decode()?)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let path = args.out_dir.join(asset.download_file_name());
    std::fs::write(&path, png.bytes())
        .with_context(|| format!("write png '{}'", path.display()))?;

    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_generate(mut library: AssetLibrary<FileSlot>, args: GenerateArgs) -> anyhow::Result<()> {
    let paint = match (args.color, args.hex) {
        (Some(name), _) => Some(PaintColor::Named(name)),
        (None, Some(hex)) => Some(PaintColor::from_hex(&hex)?),
        (None, None) => None,
    };
    let reference = match &args.reference {
        Some(raw) => {
            let id = AssetId::new(raw.as_str());
            let asset = library
                .get(&id)
                .with_context(|| format!("no reference asset {id}"))?;
            Some(asset.image().clone())
        }
        None => None,
    };

    let mut config = GenerationConfig {
        prompt: args.prompt,
        asset_type: args.asset_type,
        style: args.style,
        aspect_ratio: args.aspect_ratio,
        perspective: args.perspective,
        paint: None,
        reference,
    };
    match args.car.to_build(paint.clone()) {
        Some(build) => {
            anyhow::ensure!(
                config.asset_type == AssetType::Car,
                "car build flags need --type car, got {}",
                config.asset_type
            );
            let details = std::mem::take(&mut config.prompt);
            build.apply(&mut config);
            if !details.trim().is_empty() {
                config.prompt = format!("{} {}", config.prompt, details.trim());
            }
        }
        None => config.paint = paint,
    }
    let generator = ProcessGenerator::new(args.program).args(args.program_args);

    match draggen::generate_asset(&mut library, &generator, &config, TimestampMs::now())? {
        Some(id) => println!("{id}"),
        None => eprintln!("prompt is empty; nothing generated"),
    }
    Ok(())
}

fn cmd_compose(library: &AssetLibrary<FileSlot>, args: ComposeArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.layout)
        .with_context(|| format!("read layout '{}'", args.layout.display()))?;
    let placements: Vec<Placement> = serde_json::from_str(&text)
        .with_context(|| format!("parse layout '{}'", args.layout.display()))?;

    let key_opts = ChromaKeyOpts::default();
    let mut stage = Stage::new();
    for p in placements {
        let asset_id = AssetId::new(p.asset.as_str());
        let asset = library
            .get(&asset_id)
            .with_context(|| format!("layout references unknown asset {asset_id}"))?;
        let id = stage.add_item(asset);

        let mut patch = ItemPatch::default()
            .with_position(Point::new(
                p.x.unwrap_or(DEFAULT_PLACEMENT.x),
                p.y.unwrap_or(DEFAULT_PLACEMENT.y),
            ))
            .with_rotation_deg(p.rotation_deg)
            .with_blend_mode(p.blend_mode);
        if let Some(scale) = p.scale {
            patch = patch.with_scale(scale);
        }
        if let Some(z) = p.z_index {
            patch = patch.with_z_index(z);
        }
        stage.update_items(&[id], patch)?;
        if p.key {
            stage.key_items(&[id], &key_opts)?;
        }
    }

    let opts = FlattenOpts {
        padding: args.padding,
        ..FlattenOpts::default()
    };
    let Some(flat) = stage.flatten(&opts)? else {
        eprintln!("layout is empty; nothing exported");
        return Ok(());
    };
    let path = flat.export(TimestampMs::now())?.write_to_dir(&args.out_dir)?;

    eprintln!("wrote {}", path.display());
    Ok(())
}
