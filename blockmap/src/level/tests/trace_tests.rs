#[cfg(test)]
mod trace_tests {
    use std::ops::ControlFlow;

    use glam::Vec2;

    use crate::interceptor::{Intercept, InterceptKind, TraceFlags};
    use crate::level::MapData;
    use crate::level::map_defs::{LineDef, LineId, MapObjFlag, MapObject, Sector};
    use crate::level::tests::{portal, room, wall};

    fn collect(map: &mut MapData, from: Vec2, to: Vec2, flags: TraceFlags) -> (bool, Vec<Intercept>) {
        let mut seen = Vec::new();
        let finished = map.path_traverse(from, to, flags, |i, _| {
            seen.push(*i);
            ControlFlow::Continue(())
        });
        (finished, seen)
    }

    fn lines_of(intercepts: &[Intercept]) -> Vec<LineId> {
        intercepts
            .iter()
            .filter_map(|i| match i.kind {
                InterceptKind::Line(id) => Some(id),
                InterceptKind::Thing(_) => None,
            })
            .collect()
    }

    fn assert_sorted(intercepts: &[Intercept]) {
        for pair in intercepts.windows(2) {
            assert!(
                pair[0].frac <= pair[1].frac,
                "{:?} reported before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn lines_come_back_nearest_first() {
        let (mut map, s) = room();
        let other = map.add_sector(Sector::new(0.0, 128.0));
        // Added out of order on purpose
        let l700 = portal(&mut map, 700.0, s, other);
        let l150 = portal(&mut map, 150.0, s, other);
        let l900 = portal(&mut map, 900.0, s, other);
        let l300 = portal(&mut map, 300.0, s, other);

        let (finished, seen) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(950.0, 520.0),
            TraceFlags::ADD_LINES,
        );
        assert!(finished);
        assert_eq!(lines_of(&seen), vec![l150, l300, l700, l900]);
        assert_sorted(&seen);
        for i in &seen {
            assert!((0.0..=1.0).contains(&i.frac));
        }
    }

    #[test]
    fn backwards_trace_reverses_order() {
        let (mut map, s) = room();
        let other = map.add_sector(Sector::new(0.0, 128.0));
        let a = portal(&mut map, 200.0, s, other);
        let b = portal(&mut map, 600.0, s, other);

        let (_, seen) = collect(
            &mut map,
            Vec2::new(1000.0, 10.0),
            Vec2::new(20.0, 1000.0),
            TraceFlags::ADD_LINES,
        );
        assert_eq!(lines_of(&seen), vec![b, a]);
    }

    #[test]
    fn repeated_traces_are_identical() {
        let (mut map, s) = room();
        let other = map.add_sector(Sector::new(16.0, 100.0));
        for i in 0..12 {
            let x = 60.0 + 75.0 * i as f32;
            map.add_line(LineDef::new(
                Vec2::new(x, 40.0),
                Vec2::new(x + 30.0, 980.0),
                s,
                Some(other),
            ));
        }
        for i in 0..8 {
            map.spawn_thing(MapObject::new(
                Vec2::new(100.0 + 100.0 * i as f32, 120.0 + 90.0 * i as f32),
                0.0,
                20.0,
                56.0,
                MapObjFlag::SHOOTABLE,
            ));
        }

        let flags = TraceFlags::ADD_LINES | TraceFlags::ADD_THINGS;
        let from = Vec2::new(30.0, 60.0);
        let to = Vec2::new(990.0, 900.0);
        let (_, first) = collect(&mut map, from, to, flags);
        let (_, second) = collect(&mut map, from, to, flags);
        assert!(first.len() >= 12);
        assert_eq!(first, second);
        assert_sorted(&first);
    }

    #[test]
    fn ties_keep_discovery_order() {
        let (mut map, s) = room();
        let other = map.add_sector(Sector::new(0.0, 128.0));
        // Both cross the trace at 500,500 in the same cell
        let vertical = map.add_line(LineDef::new(
            Vec2::new(500.0, 400.0),
            Vec2::new(500.0, 600.0),
            s,
            Some(other),
        ));
        let diagonal = map.add_line(LineDef::new(
            Vec2::new(400.0, 400.0),
            Vec2::new(600.0, 600.0),
            s,
            Some(other),
        ));

        let (_, seen) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(900.0, 500.0),
            TraceFlags::ADD_LINES,
        );
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].frac, seen[1].frac);
        // Newest link in a cell is found first
        assert_eq!(lines_of(&seen), vec![diagonal, vertical]);
    }

    #[test]
    fn things_and_lines_interleave() {
        let (mut map, s) = room();
        let other = map.add_sector(Sector::new(0.0, 128.0));
        let mut expected = Vec::new();
        for k in 1..=8 {
            let k = k as f32;
            let thing = map.spawn_thing(MapObject::new(
                Vec2::splat(100.0 + 80.0 * k),
                0.0,
                20.0,
                56.0,
                MapObjFlag::SHOOTABLE,
            ));
            let line = portal(&mut map, 140.0 + 80.0 * k, s, other);
            expected.push(InterceptKind::Thing(thing));
            expected.push(InterceptKind::Line(line));
        }

        let (finished, seen) = collect(
            &mut map,
            Vec2::splat(100.0),
            Vec2::splat(900.0),
            TraceFlags::ADD_LINES | TraceFlags::ADD_THINGS,
        );
        assert!(finished);
        assert_eq!(seen.iter().map(|i| i.kind).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn thing_in_a_later_cell_is_not_reported_late() {
        let (mut map, s) = room();
        let other = map.add_sector(Sector::new(0.0, 128.0));
        // The line sits in cell (1, 1) and the thing in cell (2, 1), but the
        // trace reaches the thing's diagonal first
        let line = portal(&mut map, 247.8, s, other);
        let thing = map.spawn_thing(MapObject::new(
            Vec2::new(255.0, 240.0),
            0.0,
            20.0,
            56.0,
            MapObjFlag::SHOOTABLE,
        ));

        let (_, seen) = collect(
            &mut map,
            Vec2::splat(100.0),
            Vec2::splat(900.0),
            TraceFlags::ADD_LINES | TraceFlags::ADD_THINGS,
        );
        assert_eq!(
            seen.iter().map(|i| i.kind).collect::<Vec<_>>(),
            vec![InterceptKind::Thing(thing), InterceptKind::Line(line)]
        );
        assert_sorted(&seen);
    }

    #[test]
    fn polyobj_lines_are_intercepted() {
        let (mut map, s) = room();
        let po_line = LineDef::new(Vec2::new(400.0, 450.0), Vec2::new(400.0, 550.0), s, None);
        let po = map.add_polyobj(vec![po_line]);
        let id = map.polyobj(po).lines[0];

        let (finished, seen) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(900.0, 500.0),
            TraceFlags::ADD_LINES,
        );
        assert!(finished);
        assert_eq!(lines_of(&seen), vec![id]);
    }

    #[test]
    fn zero_length_and_outside_traces_walk_nothing() {
        let (mut map, s) = room();
        wall(&mut map, 500.0, 0.0, 1024.0, s);

        let mut calls = 0;
        assert!(map.path_traverse(Vec2::splat(500.0), Vec2::splat(500.0), TraceFlags::all(), |_, _| {
            calls += 1;
            ControlFlow::Break(())
        }));
        assert!(map.path_traverse(
            Vec2::new(-5000.0, -100.0),
            Vec2::new(5000.0, -100.0),
            TraceFlags::all(),
            |_, _| {
                calls += 1;
                ControlFlow::Break(())
            }
        ));
        assert_eq!(calls, 0);
    }

    #[test]
    fn trace_from_outside_is_clipped() {
        let (mut map, s) = room();
        let other = map.add_sector(Sector::new(0.0, 128.0));
        let line = portal(&mut map, 512.0, s, other);

        let (finished, seen) = collect(
            &mut map,
            Vec2::new(-3000.0, 300.0),
            Vec2::new(3000.0, 700.0),
            TraceFlags::ADD_LINES,
        );
        assert!(finished);
        assert_eq!(lines_of(&seen), vec![line]);
        assert!((seen[0].frac - 3512.0 / 6000.0).abs() < 1e-4);
    }

    #[test]
    fn callback_break_stops_the_trace() {
        let (mut map, s) = room();
        let other = map.add_sector(Sector::new(0.0, 128.0));
        for x in [200.0, 400.0, 600.0] {
            portal(&mut map, x, s, other);
        }

        let mut calls = 0;
        let finished = map.path_traverse(
            Vec2::new(100.0, 500.0),
            Vec2::new(900.0, 500.0),
            TraceFlags::ADD_LINES,
            |_, _| {
                calls += 1;
                if calls == 2 {
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            },
        );
        assert!(!finished);
        assert_eq!(calls, 2);
    }

    #[test]
    fn early_out_on_one_sided_line() {
        let (mut map, s) = room();
        wall(&mut map, 500.0, 300.0, 700.0, s);

        let (finished, seen) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(900.0, 500.0),
            TraceFlags::ADD_LINES | TraceFlags::EARLY_OUT,
        );
        assert!(!finished);
        assert!(seen.is_empty());

        // Without the flag the wall is just another intercept
        let (finished, seen) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(900.0, 500.0),
            TraceFlags::ADD_LINES,
        );
        assert!(finished);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn trace_ending_on_a_cell_edge_checks_the_last_cell() {
        let (mut map, s) = room();
        // x 248 is the edge between cell columns 1 and 2
        let edge = wall(&mut map, 248.0, 400.0, 600.0, s);
        let end = Vec2::new(248.0, 500.0);

        for from in [Vec2::new(100.0, 500.0), Vec2::new(400.0, 500.0)] {
            let (finished, seen) = collect(&mut map, from, end, TraceFlags::ADD_LINES);
            assert!(finished);
            assert_eq!(lines_of(&seen), vec![edge], "tracing from {from}");
            assert_eq!(seen[0].frac, 1.0);
        }
    }

    #[test]
    fn early_out_ignores_a_wall_at_the_endpoint() {
        let (mut map, s) = room();
        let edge = wall(&mut map, 248.0, 400.0, 600.0, s);

        let (finished, seen) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(248.0, 500.0),
            TraceFlags::ADD_LINES | TraceFlags::EARLY_OUT,
        );
        assert!(finished);
        assert_eq!(lines_of(&seen), vec![edge]);

        let (finished, _) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(300.0, 500.0),
            TraceFlags::ADD_LINES | TraceFlags::EARLY_OUT,
        );
        assert!(!finished);
    }

    #[test]
    fn thing_reaching_across_a_row_edge_is_intercepted() {
        let (mut map, _) = room();
        // Origin in row 4, body down across the y 500 trace in row 3
        let across = map.spawn_thing(MapObject::new(
            Vec2::new(600.0, 510.0),
            0.0,
            20.0,
            56.0,
            MapObjFlag::SHOOTABLE,
        ));
        // Same row, but its body stays clear of the trace
        map.spawn_thing(MapObject::new(
            Vec2::new(700.0, 560.0),
            0.0,
            20.0,
            56.0,
            MapObjFlag::SHOOTABLE,
        ));
        assert_eq!(map.thing_blockmap().cell_of(Vec2::new(600.0, 510.0)).0.y, 4);

        let (finished, seen) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(900.0, 500.0),
            TraceFlags::ADD_THINGS,
        );
        assert!(finished);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, InterceptKind::Thing(across));
        assert!((seen[0].frac - 510.0 / 800.0).abs() < 1e-4);
    }

    #[test]
    fn self_referencing_lines_are_skipped() {
        let (mut map, s) = room();
        portal(&mut map, 500.0, s, s);
        let (finished, seen) = collect(
            &mut map,
            Vec2::new(100.0, 500.0),
            Vec2::new(900.0, 500.0),
            TraceFlags::ADD_LINES | TraceFlags::EARLY_OUT,
        );
        assert!(finished);
        assert!(seen.is_empty());
    }

    #[test]
    fn opening_narrows_as_lines_are_passed() {
        let (mut map, s) = room();
        let step = map.add_sector(Sector::new(24.0, 128.0));
        let low = map.add_sector(Sector::new(24.0, 72.0));
        let a = portal(&mut map, 300.0, s, step);
        let b = portal(&mut map, 600.0, step, low);

        let mut openings = Vec::new();
        map.path_traverse(
            Vec2::new(100.0, 500.0),
            Vec2::new(900.0, 500.0),
            TraceFlags::ADD_LINES,
            |i, state| {
                if let InterceptKind::Line(id) = i.kind {
                    assert!(state.adjust_opening(id));
                    openings.push((id, state.opening));
                }
                ControlFlow::Continue(())
            },
        );
        assert_eq!(openings.len(), 2);
        assert_eq!(openings[0].0, a);
        assert_eq!((openings[0].1.bottom, openings[0].1.top), (24.0, 128.0));
        assert_eq!(openings[1].0, b);
        assert_eq!((openings[1].1.bottom, openings[1].1.top), (24.0, 72.0));
        assert_eq!(openings[1].1.range, 48.0);
    }
}
