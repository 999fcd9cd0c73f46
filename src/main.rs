use anyhow::Context;
use gridcast::player::grid_cell;
use gridcast::{Config, Intents, Map, Occupancy, PlayerState, RayCaster, RayHit};
use std::time::Instant;

const DEFAULT_MAP: &str = "map/map.grid";

const TARGET_FPS: u32 = 30;
const FRAMES: usize = 120;

/// Stand-in for the keyboard: walk, turn, then slide along whatever is
/// in the way.
fn scripted_intents(frame: usize) -> Intents {
    match frame {
        0..=29 => Intents {
            forward: true,
            ..Intents::default()
        },
        30..=49 => Intents {
            turn_right: true,
            ..Intents::default()
        },
        50..=89 => Intents {
            forward: true,
            strafe_left: true,
            ..Intents::default()
        },
        _ => Intents {
            backward: true,
            turn_left: true,
            ..Intents::default()
        },
    }
}

struct FrameSummary {
    nearest: f32,
    farthest: f32,
    misses: usize,
}

fn summarize(hits: &[RayHit]) -> FrameSummary {
    hits.iter().fold(
        FrameSummary {
            nearest: f32::INFINITY,
            farthest: 0.,
            misses: 0,
        },
        |mut acc, hit| {
            acc.nearest = acc.nearest.min(hit.distance);
            acc.farthest = acc.farthest.max(hit.distance);
            acc.misses += usize::from(!hit.is_hit());
            acc
        },
    )
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("GRIDCAST_LOG");

    let mut args = std::env::args().skip(1);
    let map_path = args.next().unwrap_or_else(|| DEFAULT_MAP.into());
    let config = match args.next() {
        Some(path) => Config::load(path)?,
        None => {
            log::info!("no config given, using defaults");
            Config::default()
        }
    };

    let map = Map::load(&map_path)?;
    log::info!(
        "map is {}x{} with {} solid cells",
        map.width,
        map.height,
        map.walls().len()
    );

    let spawn = map.get_spawn().unwrap_or(config.player_pos);
    if map.is_occupied(grid_cell(spawn)) {
        anyhow::bail!("player would spawn inside a wall at {spawn}");
    }
    let angle = map.spawn_angle().unwrap_or(config.player_angle);

    log::info!("initializing player at {spawn} facing {angle:.3} rad");
    let mut player = PlayerState::new(&config, spawn, angle);
    let caster = RayCaster::from_config(&config);

    let dt = 1. / TARGET_FPS as f32;
    let mut last = Vec::new();
    for frame in 0..FRAMES {
        player.update(scripted_intents(frame), dt, &map);
        debug_assert!(player.world_rect().contains(player.world_pos()));

        let started = Instant::now();
        let hits = caster.cast_all_par(&player, &map);
        let elapsed = started.elapsed();

        let summary = summarize(&hits);
        log::debug!(
            "frame {frame}: pos {} angle {:.3} nearest {:.1} farthest {:.1} misses {} ({elapsed:?})",
            player.pos(),
            player.angle(),
            summary.nearest,
            summary.farthest,
            summary.misses,
        );
        if frame % TARGET_FPS as usize == 0 {
            log::info!(
                "frame {frame}: cell {} cast {} rays in {elapsed:?}",
                player.cell(),
                hits.len()
            );
        }
        last = hits;
    }

    let center = last
        .get(last.len() / 2)
        .context("no rays were cast")?;
    println!(
        "final position {} angle {:.3}; center column sees {} at {} ({:.2} away, {:?} face)",
        player.pos(),
        player.angle(),
        match center.cell {
            Some(cell) => format!("wall {cell}"),
            None => "nothing".into(),
        },
        center.world_point(config.cell_size),
        center.distance,
        center.face_direction,
    );

    Ok(())
}
