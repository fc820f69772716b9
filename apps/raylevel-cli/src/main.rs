use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use raylevel_author::{ClickOutcome, EditorSession, Placement, PreviewConfig, PreviewState};
use raylevel_common::{EnemyKind, PickupKind, TileKind};
use raylevel_input::{InputState, parse_key_script};
use raylevel_kernel::{Level, SpawnSlot};
use raylevel_persist::{DEFAULT_LEVEL_ID, LoadOutcome};
use raylevel_render::{AsciiRenderer, RenderView, Renderer, SoftwareRenderer, TextureSet};
use raylevel_tools::LevelInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raylevel-cli", about = "CLI tool for raylevel operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a level summary, door/switch listings and entities
    Info {
        level: PathBuf,
        /// Also describe a single cell, as `x,y`
        #[arg(long, value_parser = parse_cell)]
        cell: Option<(u32, u32)>,
    },
    /// Write a new empty level
    New {
        out: PathBuf,
        #[arg(long, default_value = "32")]
        width: u32,
        #[arg(long, default_value = "32")]
        height: u32,
    },
    /// Resize a level, dropping entities that fall outside
    Resize {
        level: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Output path (defaults to overwriting the input)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Paint one cell with a tile (id 0-11 or name)
    Paint {
        level: PathBuf,
        x: u32,
        y: u32,
        #[arg(value_parser = parse_tile)]
        tile: TileKind,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Place a spawn, enemy or pickup: `spawn1`, `spawn2`, `enemy:<id>`, `pickup:<id>`
    Place {
        level: PathBuf,
        #[arg(value_parser = parse_placement)]
        what: Placement,
        x: u32,
        y: u32,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Link the switch at `switch` to the door at `door`, or to the exit
    Link {
        level: PathBuf,
        #[arg(value_parser = parse_cell)]
        switch: (u32, u32),
        #[arg(value_parser = parse_cell, required_unless_present = "exit")]
        door: Option<(u32, u32)>,
        #[arg(long, conflicts_with = "door")]
        exit: bool,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Convert an exported level header back into a level document
    ImportHeader {
        header: PathBuf,
        out: PathBuf,
    },
    /// Generate the level source text for the game build
    Export {
        level: PathBuf,
        #[arg(long, default_value = DEFAULT_LEVEL_ID)]
        id: String,
        /// Only the map array and spawn macros
        #[arg(long)]
        header_only: bool,
        /// Write `<id>.h` into this directory instead of printing
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Walk the preview camera through a key script and render the last frame
    Preview {
        level: PathBuf,
        /// Ticks of held keys, e.g. "w w w+d . s"
        #[arg(long, default_value = "")]
        keys: String,
        /// Preview settings as JSON (partial files are fine)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Directory of PNG textures
        #[arg(long)]
        textures: Option<PathBuf>,
        /// Write an RGBA frame here instead of printing text
        #[arg(long)]
        png: Option<PathBuf>,
    },
}

fn parse_cell(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in {s:?}: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in {s:?}: {e}"))?;
    Ok((x, y))
}

fn parse_tile(s: &str) -> Result<TileKind, String> {
    if let Ok(id) = s.parse::<u8>() {
        return TileKind::try_from(id).map_err(|e| e.to_string());
    }
    TileKind::ALL
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown tile {s:?}"))
}

fn parse_placement(s: &str) -> Result<Placement, String> {
    match s.split_once(':') {
        None if s.eq_ignore_ascii_case("spawn1") => Ok(Placement::Spawn(SpawnSlot::One)),
        None if s.eq_ignore_ascii_case("spawn2") => Ok(Placement::Spawn(SpawnSlot::Two)),
        Some(("enemy", id)) => {
            let id: u8 = id.parse().map_err(|e| format!("bad enemy kind {id:?}: {e}"))?;
            EnemyKind::try_from(id)
                .map(Placement::Enemy)
                .map_err(|e| e.to_string())
        }
        Some(("pickup", id)) => {
            let id: u8 = id.parse().map_err(|e| format!("bad pickup kind {id:?}: {e}"))?;
            PickupKind::try_from(id)
                .map(Placement::Pickup)
                .map_err(|e| e.to_string())
        }
        _ => Err(format!(
            "expected spawn1, spawn2, enemy:<id> or pickup:<id>, got {s:?}"
        )),
    }
}

fn load(path: &Path) -> anyhow::Result<Level> {
    let LoadOutcome { level, warnings } = raylevel_persist::load_level(path)
        .with_context(|| format!("loading level {}", path.display()))?;
    for warning in &warnings {
        tracing::warn!(path = %path.display(), "{warning}");
    }
    Ok(level)
}

fn save(path: &Path, level: &Level) -> anyhow::Result<()> {
    let fingerprint = raylevel_persist::save_level(path, level)
        .with_context(|| format!("saving level {}", path.display()))?;
    println!("Saved {} (sha256 {})", path.display(), &fingerprint[..12]);
    Ok(())
}

/// Load a level into an editing session, run `edit`, then save it.
fn edit_level(
    path: &Path,
    out: Option<&Path>,
    edit: impl FnOnce(&mut EditorSession) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut session = EditorSession::new(load(path)?, Default::default());
    edit(&mut session)?;
    save(out.unwrap_or(path), session.level())
}

fn click(session: &mut EditorSession, (x, y): (u32, u32)) -> anyhow::Result<ClickOutcome> {
    session
        .click(x, y)
        .with_context(|| format!("click at ({x},{y})"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { level, cell } => {
            let level = load(&level)?;
            println!("{}", LevelInspector::summary(&level));
            for door in LevelInspector::doors(&level) {
                println!("  {door}");
            }
            for switch in LevelInspector::switches(&level) {
                println!("  {switch}");
            }
            for entity in LevelInspector::entities(&level) {
                println!("  {entity}");
            }
            if let Some((x, y)) = cell {
                match LevelInspector::cell(&level, x, y) {
                    Some(info) => println!("Cell ({x},{y}): {info}"),
                    None => println!("Cell ({x},{y}) is outside the grid"),
                }
            }
        }
        Commands::New { out, width, height } => {
            if width == 0 || height == 0 {
                bail!("level dimensions must be positive, got {width}x{height}");
            }
            save(&out, &Level::new(width, height))?;
        }
        Commands::Resize {
            level,
            width,
            height,
            out,
        } => {
            if width == 0 || height == 0 {
                bail!("level dimensions must be positive, got {width}x{height}");
            }
            edit_level(&level, out.as_deref(), |session| {
                let dropped = session.resize(width, height);
                println!("Resized to {width}x{height}, dropped {dropped} entities");
                Ok(())
            })?;
        }
        Commands::Paint {
            level,
            x,
            y,
            tile,
            out,
        } => {
            edit_level(&level, out.as_deref(), |session| {
                session.select_brush(tile);
                if let ClickOutcome::Painted { edit, .. } = click(session, (x, y))? {
                    println!("({x},{y}) = {}", edit.stored);
                    for warning in edit.warnings {
                        println!("warning: {warning}");
                    }
                }
                Ok(())
            })?;
        }
        Commands::Place {
            level,
            what,
            x,
            y,
            out,
        } => {
            edit_level(&level, out.as_deref(), |session| {
                session.start_placing(what);
                let outcome = click(session, (x, y))?;
                println!("{outcome:?}");
                Ok(())
            })?;
        }
        Commands::Link {
            level,
            switch,
            door,
            exit,
            out,
        } => {
            edit_level(&level, out.as_deref(), |session| {
                session.set_link_mode(true);
                let ClickOutcome::SwitchSelected { switch_index } = click(session, switch)? else {
                    bail!("no switch at ({},{})", switch.0, switch.1);
                };
                match door {
                    Some(door) if !exit => match click(session, door)? {
                        ClickOutcome::Linked { door_index, .. } => {
                            println!("Switch {switch_index} -> Door {door_index}");
                        }
                        _ => bail!("no door at ({},{})", door.0, door.1),
                    },
                    _ => {
                        session.set_exit()?;
                        println!("Switch {switch_index} -> EXIT");
                    }
                }
                Ok(())
            })?;
        }
        Commands::ImportHeader { header, out } => {
            let import = raylevel_persist::load_header(&header)
                .with_context(|| format!("importing {}", header.display()))?;
            println!(
                "Imported {} ({}x{})",
                import.level_id, import.width, import.height
            );
            let LoadOutcome { level, warnings } = import.into_level()?;
            for warning in &warnings {
                tracing::warn!("{warning}");
            }
            save(&out, &level)?;
        }
        Commands::Export {
            level,
            id,
            header_only,
            dir,
        } => {
            let level = load(&level)?;
            match dir {
                Some(dir) => {
                    let path = raylevel_persist::save_header(&dir, &level, &id)
                        .with_context(|| format!("exporting into {}", dir.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", raylevel_persist::export_source(&level, &id, header_only)),
            }
        }
        Commands::Preview {
            level,
            keys,
            config,
            width,
            height,
            textures,
            png,
        } => {
            let level = load(&level)?;
            let mut cfg = match config {
                Some(path) => PreviewConfig::load(&path)
                    .with_context(|| format!("reading preview config {}", path.display()))?,
                None => PreviewConfig::default(),
            };
            cfg.width = width.unwrap_or(cfg.width);
            cfg.height = height.unwrap_or(cfg.height);

            let script = parse_key_script(&keys)?;
            let mut session = EditorSession::new(level, cfg.motion);
            let mut input = InputState::new();
            let mut moved = 0;
            for step in script.iter() {
                input.hold_only(step.iter().copied());
                if session.tick_preview(input.intents()) == PreviewState::Moving {
                    moved += 1;
                }
            }
            let camera = session.preview().camera();
            tracing::info!(
                ticks = script.len(),
                moved,
                x = camera.position.x,
                y = camera.position.y,
                angle = camera.angle.units(),
                "preview walk finished"
            );

            let view = RenderView::new(camera, cfg.width, cfg.height);
            match png {
                Some(path) => {
                    let textures = match textures {
                        Some(dir) => TextureSet::load_dir(&dir)
                            .with_context(|| format!("loading textures from {}", dir.display()))?,
                        None => TextureSet::default(),
                    };
                    let frame = SoftwareRenderer::new(cfg.render, textures)
                        .render(session.level(), &view);
                    frame
                        .save_png(&path)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}x{} frame to {}", cfg.width, cfg.height, path.display());
                }
                None => print!("{}", AsciiRenderer::new(cfg.render).render(session.level(), &view)),
            }
        }
    }

    Ok(())
}
