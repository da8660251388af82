//! Path traversal through the blockmap.
//!
//! The trace walks the cells it passes through in order, like
//! `P_PathTraverse`. Lines and things in each cell are tested against the
//! trace and every hit becomes an [`Intercept`]. Intercepts are handed to
//! the caller nearest first. Hits with the same fraction keep the order they
//! were found in.
//!
//! A line or polyobject is linked into every cell it touches, so a hit at
//! some fraction is always found by the time the walk has passed that point.
//! Things are linked by origin only, so each visited cell also searches its
//! neighbours out to `max_radius` for things whose body reaches into it.

use std::f32::consts::SQRT_2;
use std::ops::ControlFlow;

use bitflags::bitflags;
use glam::Vec2;
use log::trace;
use math::{BBox, Trace, circle_seg_collide, intercept_vector, point_on_side};

use crate::blockmap::BlockHandle;
use crate::grid::CellCoord;
use crate::level::MapData;
use crate::level::map_defs::{LineDef, LineId, MapObject, ThingId};
use crate::level::opening::LineOpening;
use crate::valid_count::ValidCounts;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct TraceFlags: u8 {
        /// Intercept lines, including polyobject lines
        const ADD_LINES = 1;
        /// Intercept things
        const ADD_THINGS = 2;
        /// Stop as soon as a one sided line is crossed
        const EARLY_OUT = 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptKind {
    Line(LineId),
    Thing(ThingId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intercept {
    /// Fraction along the trace, 0.0 at the origin and 1.0 at the endpoint
    pub frac: f32,
    pub kind: InterceptKind,
}

/// What the traversal callback gets alongside each intercept
pub struct TraceState<'a> {
    map: &'a MapData,
    pub trace: Trace,
    /// The gap left after narrowing by every line passed to
    /// [`TraceState::adjust_opening`]
    pub opening: LineOpening,
}

impl<'a> TraceState<'a> {
    #[inline]
    pub fn map(&self) -> &'a MapData {
        self.map
    }

    /// Narrow the running opening by the opening of `line`. Returns false
    /// once nothing can pass.
    pub fn adjust_opening(&mut self, line: LineId) -> bool {
        let opening = self.map.line_opening(line);
        self.opening.narrow(&opening);
        self.opening.bottom < self.opening.top
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    intercept: Intercept,
    seq: u32,
}

/// Reusable buffers and visit tokens for path traversal
#[derive(Debug, Default)]
pub struct Interceptor {
    valid: ValidCounts,
    pending: Vec<Pending>,
    seq: u32,
}

impl Interceptor {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            valid: ValidCounts::new(),
            pending: Vec::with_capacity(capacity),
            seq: 0,
        }
    }

    /// Trace from `origin` to `endpoint` through `map`.
    ///
    /// Returns false if `trav` broke out or an `EARLY_OUT` trace crossed a
    /// one sided line, true if the whole trace was walked. A zero length
    /// trace, or one entirely outside the map, walks nothing and returns
    /// true.
    pub fn traverse(
        &mut self,
        map: &MapData,
        origin: Vec2,
        endpoint: Vec2,
        flags: TraceFlags,
        mut trav: impl FnMut(&Intercept, &mut TraceState<'_>) -> ControlFlow<()>,
    ) -> bool {
        let trace = Trace::from_points(origin, endpoint);
        let length = trace.dxy.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return true;
        }

        let blockmap = map.line_blockmap();
        let Some((t_start, t_end)) = clip_to_box(trace, blockmap.bounds()) else {
            return true;
        };

        self.valid.begin_sweep();
        self.pending.clear();
        self.seq = 0;

        let mut state = TraceState {
            map,
            trace,
            opening: LineOpening::UNBOUNDED,
        };

        let cell_size = blockmap.cell_size();

        let grid = blockmap.grid();
        let (width, height) = grid.dimensions();
        let cell_origin = grid.origin();
        let mut cell = grid.cell_at(trace.point_at(t_start));
        let end_cell = grid.cell_at(trace.point_at(t_end));

        let step_x: i64 = if trace.dxy.x > 0.0 { 1 } else { -1 };
        let step_y: i64 = if trace.dxy.y > 0.0 { 1 } else { -1 };
        let axis_t = |pos: f32, start: f32, delta: f32| (pos - start) / delta;
        let mut t_max_x = if trace.dxy.x == 0.0 {
            f32::INFINITY
        } else {
            let edge = cell.x + (step_x > 0) as u32;
            axis_t(cell_origin.x + edge as f32 * cell_size.x, origin.x, trace.dxy.x)
        };
        let mut t_max_y = if trace.dxy.y == 0.0 {
            f32::INFINITY
        } else {
            let edge = cell.y + (step_y > 0) as u32;
            axis_t(cell_origin.y + edge as f32 * cell_size.y, origin.y, trace.dxy.y)
        };
        let t_delta_x = (cell_size.x / trace.dxy.x).abs();
        let t_delta_y = (cell_size.y / trace.dxy.y).abs();

        // Each step moves one cell closer to the end cell
        let max_steps = width as usize + height as usize + 2;
        for _ in 0..max_steps {
            if !self.collect_cell(map, trace, cell, flags) {
                return false;
            }

            // An endpoint on a cell edge still needs the cell past the edge
            let t_exit = t_max_x.min(t_max_y).min(t_end);
            if cell == end_cell || t_exit > t_end {
                break;
            }
            if !self.dispatch(&mut state, t_exit, &mut trav) {
                return false;
            }

            let (x, y) = if t_max_x <= t_max_y {
                t_max_x += t_delta_x;
                (cell.x as i64 + step_x, cell.y as i64)
            } else {
                t_max_y += t_delta_y;
                (cell.x as i64, cell.y as i64 + step_y)
            };
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                break;
            }
            cell = CellCoord::new(x as u32, y as u32);
        }

        self.dispatch(&mut state, 1.0, &mut trav)
    }

    /// Hand over pending intercepts up to `max_frac`, nearest first
    fn dispatch(
        &mut self,
        state: &mut TraceState<'_>,
        max_frac: f32,
        trav: &mut impl FnMut(&Intercept, &mut TraceState<'_>) -> ControlFlow<()>,
    ) -> bool {
        if self.pending.is_empty() {
            return true;
        }
        self.pending.sort_by(|a, b| {
            a.intercept
                .frac
                .total_cmp(&b.intercept.frac)
                .then(a.seq.cmp(&b.seq))
        });
        let ready = self
            .pending
            .partition_point(|p| p.intercept.frac <= max_frac);

        for pending in &self.pending[..ready] {
            if trav(&pending.intercept, state).is_break() {
                return false;
            }
        }
        self.pending.drain(..ready);
        true
    }

    #[inline]
    fn push(&mut self, frac: f32, kind: InterceptKind) {
        self.pending.push(Pending {
            intercept: Intercept { frac, kind },
            seq: self.seq,
        });
        self.seq += 1;
    }

    /// Test everything linked in one cell. Returns false for an early out.
    fn collect_cell(&mut self, map: &MapData, trace: Trace, cell: CellCoord, flags: TraceFlags) -> bool {
        let early_out = flags.contains(TraceFlags::EARLY_OUT);

        if flags.contains(TraceFlags::ADD_LINES) {
            let mut blocked = false;
            let _ = map.line_blockmap().for_all_in_cell(cell, |id| {
                if self.valid.lines.mark(id.index()) && !self.add_line(trace, map.line(id), id, early_out) {
                    blocked = true;
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            });
            if blocked {
                return false;
            }

            let _ = map.polyobj_blockmap().for_all_in_cell(cell, |po| {
                if !self.valid.polyobjs.mark(po.index()) {
                    return ControlFlow::Continue(());
                }
                for &id in &map.polyobj(po).lines {
                    if self.valid.lines.mark(id.index()) && !self.add_line(trace, map.line(id), id, early_out) {
                        blocked = true;
                        return ControlFlow::Break(());
                    }
                }
                ControlFlow::Continue(())
            });
            if blocked {
                return false;
            }
        }

        if flags.contains(TraceFlags::ADD_THINGS) {
            // A thing's body reaches up to max_radius out of its own cell
            let blockmap = map.thing_blockmap();
            let reach = blockmap
                .grid()
                .cell_bounds(cell)
                .expand(map.config().max_radius);
            let (range, _) = blockmap.cell_block_of(&reach);
            let Self {
                valid,
                pending,
                seq,
            } = self;
            let _ = blockmap.for_all_in_cell_block(range, &mut valid.things, |id| {
                if let Some(frac) = thing_intercept(trace, map.thing(id)) {
                    pending.push(Pending {
                        intercept: Intercept {
                            frac,
                            kind: InterceptKind::Thing(id),
                        },
                        seq: *seq,
                    });
                    *seq += 1;
                }
                ControlFlow::Continue(())
            });
        }
        true
    }

    /// Like `PIT_AddLineIntercepts`. Returns false if an early out trace hit
    /// a one sided line.
    fn add_line(&mut self, trace: Trace, line: &LineDef, id: LineId, early_out: bool) -> bool {
        if line.is_self_referencing() {
            return true;
        }

        let s1 = point_on_side(trace, line.v1);
        let s2 = point_on_side(trace, line.v2);
        if s1 == s2 {
            // line isn't crossed
            return true;
        }

        let Some(frac) = intercept_vector(trace, line.divline()) else {
            return true;
        };
        if !(0.0..=1.0).contains(&frac) {
            return true;
        }

        if early_out && frac < 1.0 && line.is_one_sided() {
            trace!("Early out at {id:?}, frac {frac}");
            return false;
        }

        self.push(frac, InterceptKind::Line(id));
        true
    }
}

/// Like `PIT_AddThingIntercepts`, the thing is crossed along whichever of
/// its box diagonals faces the trace.
fn thing_intercept(trace: Trace, thing: &MapObject) -> Option<f32> {
    let r = thing.radius;
    // Cheap reject against the circle through the box corners
    if !circle_seg_collide(thing.xy, r * SQRT_2 + 0.01, trace.xy, trace.end()) {
        return None;
    }

    let positive = (trace.dxy.x >= 0.0) == (trace.dxy.y >= 0.0);
    let (v1, v2) = if positive {
        (thing.xy + Vec2::new(-r, r), thing.xy + Vec2::new(r, -r))
    } else {
        (thing.xy + Vec2::new(-r, -r), thing.xy + Vec2::new(r, r))
    };

    if point_on_side(trace, v1) == point_on_side(trace, v2) {
        return None;
    }

    let frac = intercept_vector(trace, Trace::from_points(v1, v2))?;
    (0.0..=1.0).contains(&frac).then_some(frac)
}

/// Clip the trace to `bbox`, returning the fractions it enters and leaves
/// by. `None` if it misses.
pub(crate) fn clip_to_box(trace: Trace, bbox: &BBox) -> Option<(f32, f32)> {
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    let checks = [
        (-trace.dxy.x, trace.xy.x - bbox.left),
        (trace.dxy.x, bbox.right - trace.xy.x),
        (-trace.dxy.y, trace.xy.y - bbox.bottom),
        (trace.dxy.y, bbox.top - trace.xy.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
    }
    (t0 <= t1).then_some((t0, t1))
}
