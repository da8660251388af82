//! Scenario tests over small maps built in code.

mod polyobj_tests;
mod trace_tests;

use glam::Vec2;
use math::BBox;

use crate::BlockmapConfig;
use crate::level::MapData;
use crate::level::map_defs::{LineDef, LineId, Sector, SectorId};

/// 1024 x 1024 with the default config. Cells start at -8 so cell `n`
/// covers `-8 + 128n .. 120 + 128n` on each axis.
fn empty_map() -> MapData {
    let _ = simplelog::TestLogger::init(log::LevelFilter::Debug, simplelog::Config::default());
    MapData::new(
        BBox::new(Vec2::ZERO, Vec2::splat(1024.0)),
        BlockmapConfig::default(),
    )
    .unwrap()
}

/// One sector of floor 0, ceiling 128
fn room() -> (MapData, SectorId) {
    let mut map = empty_map();
    let sector = map.add_sector(Sector::new(0.0, 128.0));
    (map, sector)
}

/// A vertical two sided line at `x` running the height of the map
fn portal(map: &mut MapData, x: f32, front: SectorId, back: SectorId) -> LineId {
    map.add_line(LineDef::new(
        Vec2::new(x, 0.0),
        Vec2::new(x, 1024.0),
        front,
        Some(back),
    ))
}

/// A vertical one sided wall at `x` from `y0` to `y1`
fn wall(map: &mut MapData, x: f32, y0: f32, y1: f32, front: SectorId) -> LineId {
    map.add_line(LineDef::new(
        Vec2::new(x, y0),
        Vec2::new(x, y1),
        front,
        None,
    ))
}
