//! The data that makes up a level as far as spatial queries go, and the
//! blockmaps that index it.
//!
//! A loader outside this crate fills a [`MapData`] with sectors, lines,
//! subsectors and polyobjects, then spawns things into it. Everything added
//! is linked into the matching blockmap as it arrives, and moving things and
//! polyobjects keep their links current through the methods here.

pub mod map_defs;
pub mod opening;
mod polyobj;

#[cfg(test)]
mod tests;

use std::ops::ControlFlow;

use glam::Vec2;
use log::{debug, info};
use math::BBox;

use crate::blockmap::{BlockHandle, BlockLinks, Blockmap, Linkable};
use crate::interceptor::{Intercept, Interceptor, TraceFlags, TraceState};
use crate::valid_count::ValidCounts;
use crate::{BlockmapConfig, BlockmapError};

use self::map_defs::{
    LineDef, LineId, MapObjFlag, MapObject, PolyObj, PolyObjId, Sector, SectorId, SubSector,
    SubSectorId, ThingId,
};
use self::opening::LineOpening;

pub struct MapData {
    config: BlockmapConfig,
    sectors: Vec<Sector>,
    lines: Vec<LineDef>,
    things: Vec<MapObject>,
    polyobjs: Vec<PolyObj>,
    subsectors: Vec<SubSector>,

    line_blockmap: Blockmap<LineId>,
    thing_blockmap: Blockmap<ThingId>,
    polyobj_blockmap: Blockmap<PolyObjId>,
    subsector_blockmap: Blockmap<SubSectorId>,

    valid: ValidCounts,
    interceptor: Interceptor,
}

impl std::fmt::Debug for MapData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapData")
            .field("sectors", &self.sectors.len())
            .field("lines", &self.lines.len())
            .field("things", &self.things.len())
            .field("polyobjs", &self.polyobjs.len())
            .field("subsectors", &self.subsectors.len())
            .field("line_blockmap", &self.line_blockmap)
            .field("thing_blockmap", &self.thing_blockmap)
            .finish_non_exhaustive()
    }
}

impl MapData {
    /// Set up empty blockmaps covering `bounds`. All four share the same
    /// grid layout.
    pub fn new(bounds: BBox, config: BlockmapConfig) -> Result<Self, BlockmapError> {
        let line_blockmap = Blockmap::with_config(bounds, &config)?;
        let thing_blockmap = Blockmap::with_config(bounds, &config)?;
        let polyobj_blockmap = Blockmap::with_config(bounds, &config)?;
        let subsector_blockmap = Blockmap::with_config(bounds, &config)?;
        info!("Map blockmaps ready, bounds {bounds:?}");

        Ok(Self {
            interceptor: Interceptor::with_capacity(config.intercept_capacity),
            config,
            sectors: Vec::new(),
            lines: Vec::new(),
            things: Vec::new(),
            polyobjs: Vec::new(),
            subsectors: Vec::new(),
            line_blockmap,
            thing_blockmap,
            polyobj_blockmap,
            subsector_blockmap,
            valid: ValidCounts::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &BlockmapConfig {
        &self.config
    }

    #[inline]
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    #[inline]
    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id.index()]
    }

    /// Plane heights may be changed freely, openings are never cached
    #[inline]
    pub fn sector_mut(&mut self, id: SectorId) -> &mut Sector {
        &mut self.sectors[id.index()]
    }

    #[inline]
    pub fn lines(&self) -> &[LineDef] {
        &self.lines
    }

    #[inline]
    pub fn line(&self, id: LineId) -> &LineDef {
        &self.lines[id.index()]
    }

    #[inline]
    pub fn things(&self) -> &[MapObject] {
        &self.things
    }

    #[inline]
    pub fn thing(&self, id: ThingId) -> &MapObject {
        &self.things[id.index()]
    }

    #[inline]
    pub fn polyobjs(&self) -> &[PolyObj] {
        &self.polyobjs
    }

    #[inline]
    pub fn polyobj(&self, id: PolyObjId) -> &PolyObj {
        &self.polyobjs[id.index()]
    }

    #[inline]
    pub fn subsectors(&self) -> &[SubSector] {
        &self.subsectors
    }

    #[inline]
    pub fn line_blockmap(&self) -> &Blockmap<LineId> {
        &self.line_blockmap
    }

    #[inline]
    pub fn thing_blockmap(&self) -> &Blockmap<ThingId> {
        &self.thing_blockmap
    }

    #[inline]
    pub fn polyobj_blockmap(&self) -> &Blockmap<PolyObjId> {
        &self.polyobj_blockmap
    }

    #[inline]
    pub fn subsector_blockmap(&self) -> &Blockmap<SubSectorId> {
        &self.subsector_blockmap
    }

    pub fn add_sector(&mut self, sector: Sector) -> SectorId {
        self.sectors.push(sector);
        SectorId::from(self.sectors.len() - 1)
    }

    /// Add a static line and link it into every cell it passes through
    pub fn add_line(&mut self, mut line: LineDef) -> LineId {
        let id = LineId::from(self.lines.len());
        line.polyobj = None;
        self.line_blockmap
            .link_line(id, line.v1, line.v2, &mut line.block_links);
        self.lines.push(line);
        id
    }

    pub fn add_subsector(&mut self, mut subsector: SubSector) -> SubSectorId {
        let id = SubSectorId::from(self.subsectors.len());
        self.subsector_blockmap
            .link_box(id, &subsector.bbox, &mut subsector.block_links);
        self.subsectors.push(subsector);
        id
    }

    /// Add a thing and link it into the cell holding its origin
    pub fn spawn_thing(&mut self, thing: MapObject) -> ThingId {
        let id = ThingId::from(self.things.len());
        self.things.push(thing);
        self.set_thing_position(id);
        id
    }

    /// Link a thing at its current position, like `P_SetThingPosition`.
    /// Things flagged `NO_BLOCKMAP` are left out.
    pub fn set_thing_position(&mut self, id: ThingId) {
        let thing = &mut self.things[id.index()];
        if thing.flags.contains(MapObjFlag::NO_BLOCKMAP) {
            return;
        }
        self.thing_blockmap
            .link_point(id, thing.xy, &mut thing.block_links);
    }

    /// Unlink a thing from every cell it is in, like `P_UnsetThingPosition`
    pub fn unset_thing_position(&mut self, id: ThingId) {
        let thing = &mut self.things[id.index()];
        self.thing_blockmap.unlink_all(id, &mut thing.block_links);
    }

    pub fn move_thing(&mut self, id: ThingId, xy: Vec2) {
        self.unset_thing_position(id);
        self.things[id.index()].xy = xy;
        self.set_thing_position(id);
    }

    /// The opening through a line from its current sector heights
    pub fn line_opening(&self, id: LineId) -> LineOpening {
        let line = self.line(id);
        LineOpening::new(
            self.sector(line.front_sector),
            line.back_sector.map(|s| self.sector(s)),
        )
    }

    /// As [`MapData::line_opening`], looking through the line from `side`
    /// (0 front, 1 back). Only the naming of the two sectors changes so the
    /// result is the same from either side.
    pub fn opening_for(&self, id: LineId, side: usize) -> LineOpening {
        let line = self.line(id);
        let Some(back) = line.back_sector else {
            return LineOpening::new(self.sector(line.front_sector), None);
        };
        let (near, far) = if side == 0 {
            (line.front_sector, back)
        } else {
            (back, line.front_sector)
        };
        LineOpening::new(self.sector(near), Some(self.sector(far)))
    }

    /// Every static and polyobject line crossing `bbox`, each once
    pub fn lines_in_box(
        &mut self,
        bbox: &BBox,
        mut func: impl FnMut(LineId) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        self.valid.lines.begin_sweep();
        self.valid.polyobjs.begin_sweep();
        self.line_blockmap
            .for_all_in_box(bbox, &self.lines[..], &mut self.valid.lines, &mut func)?;

        let lines = &self.lines;
        let valid_lines = &mut self.valid.lines;
        self.polyobj_blockmap.for_all_in_box(
            bbox,
            &self.polyobjs[..],
            &mut self.valid.polyobjs,
            |po| {
                for &line in &self.polyobjs[po.index()].lines {
                    if valid_lines.mark(line.index()) && lines[line.index()].intersects(bbox) {
                        func(line)?;
                    }
                }
                ControlFlow::Continue(())
            },
        )
    }

    /// Every thing whose box overlaps `bbox`, each once. The cell search is
    /// widened by the largest thing radius since things are linked by their
    /// origin alone.
    pub fn things_in_box(
        &mut self,
        bbox: &BBox,
        mut func: impl FnMut(ThingId) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        self.valid.things.begin_sweep();
        let (range, _) = self
            .thing_blockmap
            .cell_block_of(&bbox.expand(self.config.max_radius));
        let things = &self.things;
        self.thing_blockmap
            .for_all_in_cell_block(range, &mut self.valid.things, |id| {
                if things[id.index()].intersects(bbox) {
                    return func(id);
                }
                ControlFlow::Continue(())
            })
    }

    pub fn polyobjs_in_box(
        &mut self,
        bbox: &BBox,
        func: impl FnMut(PolyObjId) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        self.valid.polyobjs.begin_sweep();
        self.polyobj_blockmap
            .for_all_in_box(bbox, &self.polyobjs[..], &mut self.valid.polyobjs, func)
    }

    pub fn subsectors_in_box(
        &mut self,
        bbox: &BBox,
        func: impl FnMut(SubSectorId) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        self.valid.subsectors.begin_sweep();
        self.subsector_blockmap.for_all_in_box(
            bbox,
            &self.subsectors[..],
            &mut self.valid.subsectors,
            func,
        )
    }

    /// Walk the blockmap from `origin` to `endpoint` calling `trav` on each
    /// intercept nearest first. Returns false if `trav` stopped early.
    pub fn path_traverse(
        &mut self,
        origin: Vec2,
        endpoint: Vec2,
        flags: TraceFlags,
        trav: impl FnMut(&Intercept, &mut TraceState<'_>) -> ControlFlow<()>,
    ) -> bool {
        let mut interceptor = std::mem::take(&mut self.interceptor);
        let finished = interceptor.traverse(self, origin, endpoint, flags, trav);
        self.interceptor = interceptor;
        finished
    }

    /// Add the lines of a polyobject and link it by their combined box. The
    /// polyobject's origin starts at the centre of that box.
    pub fn add_polyobj(&mut self, lines: Vec<LineDef>) -> PolyObjId {
        let id = PolyObjId::from(self.polyobjs.len());
        let bbox = BBox::from_points(lines.iter().flat_map(|l| [l.v1, l.v2]))
            .unwrap_or_else(|| BBox::new(Vec2::ZERO, Vec2::ZERO));
        let origin = (bbox.min() + bbox.max()) * 0.5;

        let mut ids = Vec::with_capacity(lines.len());
        let mut offsets = Vec::with_capacity(lines.len());
        for mut line in lines {
            line.polyobj = Some(id);
            offsets.push((line.v1 - origin, line.v2 - origin));
            ids.push(LineId::from(self.lines.len()));
            self.lines.push(line);
        }

        let mut polyobj = PolyObj {
            lines: ids,
            origin,
            angle: 0.0,
            offsets,
            bbox,
            block_links: BlockLinks::new(),
        };
        self.polyobj_blockmap
            .link_box(id, &polyobj.bbox, &mut polyobj.block_links);
        debug!(
            "Added polyobj {id:?} with {} lines in {} cells",
            polyobj.lines.len(),
            polyobj.block_links.len()
        );
        self.polyobjs.push(polyobj);
        id
    }
}
