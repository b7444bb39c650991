//! map-inspect - print a soundscape map and simulate listener positions
//!
//! ```text
//! map-inspect forest.map
//! map-inspect forest.map --simulate 0,0 150,40 --simple
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use soundscape_core::audio::VirtualBackend;
use soundscape_core::config::{default_options_path, load_config, SoundscapeOptions};
use soundscape_core::display::{file_name, volume_label};
use soundscape_core::engine::Soundscape;
use soundscape_core::loader::SoundAssetCache;
use soundscape_core::{GlideMode, Vec2};

struct Args {
    map: PathBuf,
    points: Vec<Vec2>,
    simple: bool,
}

fn parse_point(s: &str) -> Result<Vec2> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("Expected x,y but got '{}'", s))?;
    let x: f32 = x.trim().parse().with_context(|| format!("Bad x in '{}'", s))?;
    let y: f32 = y.trim().parse().with_context(|| format!("Bad y in '{}'", s))?;
    Ok(Vec2::new(x, y))
}

fn parse_args() -> Result<Args> {
    let mut map = None;
    let mut points = Vec::new();
    let mut simple = false;
    let mut simulating = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--simulate" => simulating = true,
            "--simple" => simple = true,
            "-h" | "--help" => {
                println!("Usage: map-inspect <file.map> [--simulate x,y ...] [--simple]");
                std::process::exit(0);
            }
            _ if simulating && !arg.starts_with("--") => points.push(parse_point(&arg)?),
            _ if map.is_none() => map = Some(PathBuf::from(arg)),
            other => bail!("Unexpected argument '{}'", other),
        }
    }

    let map = map.context("Missing map file (usage: map-inspect <file.map> [--simulate x,y ...])")?;
    Ok(Args { map, points, simple })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args()?;

    let mut options: SoundscapeOptions = load_config(&default_options_path());
    options.glide_mode = GlideMode::Snap;
    options.simple_ui |= args.simple;

    let cache = Arc::new(SoundAssetCache::new(options.loader_workers));
    let backend = VirtualBackend::new(options.channel_count);
    let simple = options.simple_ui;
    let mut soundscape = Soundscape::new(backend, cache, options);

    let count = soundscape
        .load_map_file(&args.map)
        .with_context(|| format!("Failed to load map {:?}", args.map))?;

    println!("{} ({} nodes)", args.map.display(), count);
    println!("cursor {}", soundscape.cursor().position());
    for node in soundscape.nodes() {
        println!(
            "  {:<4} {:<32} at {:<18} r={:<7.1} {:<13} loops={:<3} {}{}",
            node.id().to_string(),
            node.file_path(),
            node.position.to_string(),
            node.radius,
            node.source.play_style().name(),
            node.source.loop_count(),
            if node.enabled() { "" } else { "[disabled] " },
            if node.source.load_failed() { "[unreadable]" } else { "" },
        );
    }

    let diag = soundscape.diagnostics();
    if diag.channel_exhaustions > 0 {
        println!("warning: {} nodes have no playback channel", diag.channel_exhaustions);
    }

    for point in args.points {
        soundscape.set_cursor_target(point);
        let report = soundscape.tick(0.0);

        println!();
        println!("listener {}", report.listener);
        for mix in &report.mixes {
            let Some(node) = soundscape.node(mix.id) else {
                continue;
            };
            let label = volume_label(file_name(node.file_path()), mix.volume, simple);
            let state = if node.source.is_playing() { "playing" } else { "stopped" };
            println!("  {} {} ({})", mix.id, label.replace('\n', " "), state);
        }
    }

    Ok(())
}
