//! Line of sight over the blockmap.
//!
//! Slopes here are height change over the whole trace, not per map unit. A
//! sight window from `bottom_slope` to `top_slope` is narrowed at every two
//! sided line where the floors or ceilings differ, and sight is lost once it
//! closes.

use std::ops::ControlFlow;

use bitflags::bitflags;
use glam::Vec3;
use log::trace;

use crate::interceptor::{Intercept, InterceptKind, TraceFlags, TraceState};
use crate::level::MapData;
use crate::level::map_defs::ThingId;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct SightFlags: u8 {
        /// One sided lines seen from their back side do not block
        const PASS_LEFT = 1;
        /// Ceilings never lower the top of the window
        const PASS_OVER = 2;
        /// Floors never raise the bottom of the window
        const PASS_UNDER = 4;
    }
}

#[derive(Debug, Clone)]
pub struct LineSightTest {
    from: Vec3,
    to: Vec3,
    bottom_slope: f32,
    top_slope: f32,
    flags: SightFlags,
}

impl LineSightTest {
    pub fn new(from: Vec3, to: Vec3, bottom_slope: f32, top_slope: f32, flags: SightFlags) -> Self {
        Self {
            from,
            to,
            bottom_slope,
            top_slope,
            flags,
        }
    }

    #[inline]
    pub fn top_slope(&self) -> f32 {
        self.top_slope
    }

    #[inline]
    pub fn bottom_slope(&self) -> f32 {
        self.bottom_slope
    }

    /// True if nothing along the way blocks sight
    pub fn trace(&mut self, map: &mut MapData) -> bool {
        if self.top_slope <= self.bottom_slope {
            return false;
        }
        let (from, to) = (self.from.truncate(), self.to.truncate());
        map.path_traverse(from, to, TraceFlags::ADD_LINES, |i, state| {
            self.crosses(i, state)
        })
    }

    fn crosses(&mut self, intercept: &Intercept, state: &mut TraceState<'_>) -> ControlFlow<()> {
        let InterceptKind::Line(id) = intercept.kind else {
            return ControlFlow::Continue(());
        };
        let map = state.map();
        let line = map.line(id);

        let Some(back) = line.back_sector else {
            if self.flags.contains(SightFlags::PASS_LEFT)
                && line.point_on_side(self.from.truncate()) == 1
            {
                return ControlFlow::Continue(());
            }
            trace!("Sight blocked by one sided {id:?}");
            return ControlFlow::Break(());
        };

        let opening = map.line_opening(id);
        if opening.is_closed() {
            return ControlFlow::Break(());
        }

        let frac = intercept.frac;
        if frac > 0.0 {
            let front = map.sector(line.front_sector);
            let back = map.sector(back);
            if front.floor_height != back.floor_height && !self.flags.contains(SightFlags::PASS_UNDER) {
                let slope = (opening.bottom - self.from.z) / frac;
                if slope > self.bottom_slope {
                    self.bottom_slope = slope;
                }
            }
            if front.ceiling_height != back.ceiling_height && !self.flags.contains(SightFlags::PASS_OVER) {
                let slope = (opening.top - self.from.z) / frac;
                if slope < self.top_slope {
                    self.top_slope = slope;
                }
            }
        }

        if self.top_slope <= self.bottom_slope {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

impl MapData {
    /// Can `from` see `to` through a window between the two slopes
    pub fn check_sight(
        &mut self,
        from: Vec3,
        to: Vec3,
        bottom_slope: f32,
        top_slope: f32,
        flags: SightFlags,
    ) -> bool {
        LineSightTest::new(from, to, bottom_slope, top_slope, flags).trace(self)
    }

    /// Can `looker` see any part of `target`, like `P_CheckSight`. The eye is
    /// three quarters of the way up the looker.
    pub fn check_thing_sight(&mut self, looker: ThingId, target: ThingId) -> bool {
        let a = self.thing(looker);
        let b = self.thing(target);
        let eye = a.z + a.height - a.height / 4.0;
        let from = a.xy.extend(eye);
        let to = b.xy.extend(b.z + b.height / 2.0);
        let top_slope = b.z + b.height - eye;
        let bottom_slope = b.z - eye;
        self.check_sight(from, to, bottom_slope, top_slope, SightFlags::empty())
    }
}
