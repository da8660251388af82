#[cfg(test)]
mod polyobj_tests {
    use std::f32::consts::FRAC_PI_2;
    use std::ops::ControlFlow;

    use glam::Vec2;
    use math::{BBox, SlopeType};

    use crate::grid::CellCoord;
    use crate::interceptor::{InterceptKind, TraceFlags};
    use crate::level::MapData;
    use crate::level::map_defs::{LineDef, LineId, PolyObjId, SectorId};
    use crate::level::tests::room;

    /// A 64 unit square door centred on 300,300
    fn square(map: &mut MapData, s: SectorId) -> PolyObjId {
        let corners = [
            Vec2::new(268.0, 268.0),
            Vec2::new(332.0, 268.0),
            Vec2::new(332.0, 332.0),
            Vec2::new(268.0, 332.0),
        ];
        let lines = (0..4)
            .map(|i| LineDef::new(corners[i], corners[(i + 1) % 4], s, None))
            .collect();
        map.add_polyobj(lines)
    }

    fn lines_near(map: &mut MapData, bbox: BBox) -> Vec<LineId> {
        let mut found = Vec::new();
        let _ = map.lines_in_box(&bbox, |id| {
            found.push(id);
            ControlFlow::Continue(())
        });
        found.sort();
        found
    }

    #[test]
    fn polyobj_links_by_its_box() {
        let (mut map, s) = room();
        let po = square(&mut map, s);
        let polyobj = map.polyobj(po);
        assert_eq!(polyobj.origin, Vec2::splat(300.0));
        assert_eq!(polyobj.lines.len(), 4);
        assert_eq!(polyobj.block_links.len(), 1);
        assert_eq!(map.polyobj_blockmap().cell_link_count(CellCoord::new(2, 2)), 1);
        // Polyobject lines stay out of the static line blockmap
        assert_eq!(map.line_blockmap().total_links(), 0);
        for &line in &map.polyobj(po).lines {
            assert_eq!(map.line(line).polyobj, Some(po));
        }
    }

    #[test]
    fn translate_moves_lines_and_links() {
        let (mut map, s) = room();
        let po = square(&mut map, s);
        // Grown a little so the edges cross it rather than touch it
        let old_box = map.polyobj(po).bbox.expand(1.0);
        assert_eq!(lines_near(&mut map, old_box).len(), 4);

        map.translate_polyobj(po, Vec2::new(400.0, 60.0));
        let polyobj = map.polyobj(po);
        assert_eq!(polyobj.origin, Vec2::new(700.0, 360.0));
        assert_eq!(
            polyobj.bbox,
            BBox::new(Vec2::new(668.0, 328.0), Vec2::new(732.0, 392.0))
        );
        assert_eq!(
            map.polyobj_blockmap().occupancy(),
            vec![(CellCoord::new(5, 2), 1), (CellCoord::new(5, 3), 1)]
        );
        assert_eq!(map.polyobj_blockmap().total_links(), 2);

        assert!(lines_near(&mut map, old_box).is_empty());
        let new_box = map.polyobj(po).bbox.expand(1.0);
        assert_eq!(lines_near(&mut map, new_box).len(), 4);
    }

    #[test]
    fn rotation_turns_around_the_origin() {
        let (mut map, s) = room();
        let po = square(&mut map, s);
        let first = map.polyobj(po).lines[0];
        assert_eq!(map.line(first).slope_type, SlopeType::Horizontal);

        map.rotate_polyobj(po, FRAC_PI_2);
        let line = map.line(first);
        assert!((line.v1 - Vec2::new(332.0, 268.0)).length() < 1e-3);
        assert!((line.v2 - Vec2::new(332.0, 332.0)).length() < 1e-3);
        assert!(line.delta.x.abs() < 1e-3 && line.delta.y > 63.9);
        assert_ne!(line.slope_type, SlopeType::Horizontal);

        // A quarter turn of a square covers the same box
        let bbox = map.polyobj(po).bbox;
        assert!((bbox.left - 268.0).abs() < 1e-3 && (bbox.top - 332.0).abs() < 1e-3);
    }

    #[test]
    fn full_turn_returns_home() {
        let (mut map, s) = room();
        let po = square(&mut map, s);
        let before: Vec<(Vec2, Vec2)> = map
            .polyobj(po)
            .lines
            .iter()
            .map(|&l| (map.line(l).v1, map.line(l).v2))
            .collect();

        for _ in 0..16 {
            map.rotate_polyobj(po, FRAC_PI_2 / 4.0);
        }
        for (&l, (v1, v2)) in map.polyobj(po).lines.iter().zip(before) {
            assert!((map.line(l).v1 - v1).length() < 1e-2);
            assert!((map.line(l).v2 - v2).length() < 1e-2);
        }
    }

    #[test]
    fn moved_door_blocks_new_path() {
        let (mut map, s) = room();
        let po = square(&mut map, s);
        let blocked = |map: &mut MapData| {
            !map.path_traverse(
                Vec2::new(100.0, 700.0),
                Vec2::new(900.0, 700.0),
                TraceFlags::ADD_LINES,
                // Only the door's one sided lines are in this map
                |i, _| match i.kind {
                    InterceptKind::Line(_) => ControlFlow::Break(()),
                    InterceptKind::Thing(_) => ControlFlow::Continue(()),
                },
            )
        };
        assert!(!blocked(&mut map));

        map.translate_polyobj(po, Vec2::new(200.0, 400.0));
        assert!(blocked(&mut map));
    }
}
