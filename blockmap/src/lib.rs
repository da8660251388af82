//! A uniform grid index over 2D map space, in the style of the Doom
//! blockmap, with ordered path traversal and line openings on top.
//!
//! [`Blockmap`] stores handles to lines, things, polyobjects and subsectors
//! that live in a [`MapData`]. Box and cell queries visit each handle once.
//! [`Interceptor`] walks a trace cell by cell and reports what it crosses
//! nearest first, which is what sight checks, autoaim and line use are built
//! from.
#![allow(clippy::new_without_default)]

mod aim;
pub mod blockmap;
mod cell;
mod config;
mod error;
pub mod grid;
pub mod interceptor;
pub mod level;
pub mod sight;
mod valid_count;

pub use aim::{AIM_BOTTOM_SLOPE, AIM_TOP_SLOPE, AimResult, AimTraverse};
pub use blockmap::{BlockHandle, BlockLinks, Blockmap, Linkable, ObjectStore};
pub use cell::CellRing;
pub use config::{BLOCKMAP_MARGIN, BlockmapConfig, MAPBLOCKUNITS, MAXRADIUS};
pub use error::BlockmapError;
pub use glam;
pub use grid::{CellCoord, CellRange, Grid};
pub use interceptor::{Intercept, InterceptKind, Interceptor, TraceFlags, TraceState};
pub use level::MapData;
pub use level::map_defs::{
    LineDef, LineDefFlags, LineId, MapObjFlag, MapObject, PolyObj, PolyObjId, Sector, SectorId,
    SubSector, SubSectorId, ThingId,
};
pub use level::opening::LineOpening;
pub use log;
pub use sight::{LineSightTest, SightFlags};
pub use valid_count::{ValidCount, ValidCounts};
