//! Hitscan helpers built on path traversal: finding what a shot would hit
//! and finding the line a use action reaches.

use std::ops::ControlFlow;

use glam::Vec2;
use log::debug;

use crate::interceptor::{Intercept, InterceptKind, TraceFlags, TraceState};
use crate::level::MapData;
use crate::level::map_defs::{LineDef, LineId, MapObjFlag, ThingId};
use crate::level::opening::LineOpening;

/// Vertical aim limits of an unaimed shot, as slopes per map unit
pub const AIM_TOP_SLOPE: f32 = 100.0 / 160.0;
pub const AIM_BOTTOM_SLOPE: f32 = -100.0 / 160.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimResult {
    pub aim_slope: f32,
    pub target: ThingId,
}

/// Like `PTR_AimTraverse`
#[derive(Debug, Clone)]
pub struct AimTraverse {
    shooter: ThingId,
    shootz: f32,
    attack_range: f32,
    top_slope: f32,
    bot_slope: f32,
    result: Option<AimResult>,
}

impl AimTraverse {
    pub fn new(shooter: ThingId, shootz: f32, attack_range: f32) -> Self {
        Self {
            shooter,
            shootz,
            attack_range,
            top_slope: AIM_TOP_SLOPE,
            bot_slope: AIM_BOTTOM_SLOPE,
            result: None,
        }
    }

    fn set_slope(&mut self, map: &MapData, line: &LineDef, opening: &LineOpening, dist: f32) {
        let Some(back) = line.back_sector else {
            return;
        };
        let front = map.sector(line.front_sector);
        let back = map.sector(back);

        if front.floor_height != back.floor_height {
            let slope = (opening.bottom - self.shootz) / dist;
            if slope > self.bot_slope {
                self.bot_slope = slope;
            }
        }

        if front.ceiling_height != back.ceiling_height {
            let slope = (opening.top - self.shootz) / dist;
            if slope < self.top_slope {
                self.top_slope = slope;
            }
        }
    }

    /// Breaks when a wall is hit or a target is found
    pub fn check(&mut self, intercept: &Intercept, state: &mut TraceState<'_>) -> ControlFlow<()> {
        let map = state.map();
        let dist = self.attack_range * intercept.frac;

        match intercept.kind {
            InterceptKind::Line(id) => {
                let line = map.line(id);
                // Check if solid line and stop
                if line.is_one_sided() {
                    return ControlFlow::Break(());
                }

                let opening = map.line_opening(id);
                if opening.bottom >= opening.top {
                    return ControlFlow::Break(());
                }

                if dist > 0.0 {
                    self.set_slope(map, line, &opening, dist);
                }

                if self.top_slope <= self.bot_slope {
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            }
            InterceptKind::Thing(id) => {
                // Don't shoot self
                if id == self.shooter {
                    return ControlFlow::Continue(());
                }
                let thing = map.thing(id);
                // Corpse?
                if !thing.flags.contains(MapObjFlag::SHOOTABLE) || dist <= 0.0 {
                    return ControlFlow::Continue(());
                }

                let mut thing_top_slope = (thing.z + thing.height - self.shootz) / dist;
                if thing_top_slope < self.bot_slope {
                    return ControlFlow::Continue(()); // Shot over
                }

                let mut thing_bot_slope = (thing.z - self.shootz) / dist;
                if thing_bot_slope > self.top_slope {
                    return ControlFlow::Continue(()); // Shot below
                }

                thing_top_slope = thing_top_slope.min(self.top_slope);
                thing_bot_slope = thing_bot_slope.max(self.bot_slope);

                self.result = Some(AimResult {
                    aim_slope: (thing_top_slope + thing_bot_slope) / 2.0,
                    target: id,
                });
                ControlFlow::Break(())
            }
        }
    }

    pub fn result(&mut self) -> Option<AimResult> {
        self.result.take()
    }
}

impl MapData {
    /// Find the first shootable thing within `range` of `shooter` in the
    /// direction of `to`, like `P_AimLineAttack`
    pub fn aim_line_attack(&mut self, shooter: ThingId, to: Vec2, range: f32) -> Option<AimResult> {
        let thing = self.thing(shooter);
        let origin = thing.xy;
        let shootz = thing.z + thing.height / 2.0 + 8.0;
        let endpoint = origin + (to - origin).normalize_or_zero() * range;

        let mut aim = AimTraverse::new(shooter, shootz, range);
        self.path_traverse(
            origin,
            endpoint,
            TraceFlags::ADD_LINES | TraceFlags::ADD_THINGS,
            |i, state| aim.check(i, state),
        );
        aim.result()
    }

    /// The first line with a special between `from` and `to`, like
    /// `P_UseLines`. A closed line without a special stops the search.
    pub fn use_lines(&mut self, from: Vec2, to: Vec2) -> Option<LineId> {
        let mut found = None;
        self.path_traverse(from, to, TraceFlags::ADD_LINES, |intercept, state| {
            let InterceptKind::Line(id) = intercept.kind else {
                return ControlFlow::Continue(());
            };
            let map = state.map();
            if map.line(id).special == 0 {
                if map.line_opening(id).is_closed() {
                    // can't use through a wall
                    return ControlFlow::Break(());
                }
                return ControlFlow::Continue(());
            }
            found = Some(id);
            ControlFlow::Break(())
        });
        if let Some(id) = found {
            debug!("Use reached {id:?}");
        }
        found
    }
}
