//! Moving polyobjects. Every move unlinks the polyobject, rebuilds its line
//! vertices and relinks it by the new bounds.

use glam::Vec2;
use log::trace;
use math::BBox;

use crate::blockmap::BlockHandle;
use crate::level::MapData;
use crate::level::map_defs::PolyObjId;

impl MapData {
    pub fn translate_polyobj(&mut self, id: PolyObjId, delta: Vec2) {
        let po = &mut self.polyobjs[id.index()];
        po.origin += delta;
        trace!("Polyobj {id:?} moved by {delta} to {}", po.origin);
        self.relink_polyobj(id);
    }

    /// Turn by `radians` counter-clockwise around the polyobject's origin
    pub fn rotate_polyobj(&mut self, id: PolyObjId, radians: f32) {
        let po = &mut self.polyobjs[id.index()];
        po.angle = (po.angle + radians).rem_euclid(std::f32::consts::TAU);
        trace!("Polyobj {id:?} rotated to {} rad", po.angle);
        self.relink_polyobj(id);
    }

    fn relink_polyobj(&mut self, id: PolyObjId) {
        let po = &mut self.polyobjs[id.index()];
        self.polyobj_blockmap.unlink_all(id, &mut po.block_links);

        let rotation = Vec2::from_angle(po.angle);
        let mut bbox: Option<BBox> = None;
        for (line, (o1, o2)) in po.lines.iter().zip(po.offsets.iter()) {
            let v1 = po.origin + rotation.rotate(*o1);
            let v2 = po.origin + rotation.rotate(*o2);
            self.lines[line.index()].set_vertices(v1, v2);
            let line_box = BBox::new(v1, v2);
            bbox = Some(bbox.map_or(line_box, |b| b.union(&line_box)));
        }
        po.bbox = bbox.unwrap_or_else(|| BBox::new(po.origin, po.origin));

        self.polyobj_blockmap
            .link_box(id, &po.bbox, &mut po.block_links);
    }
}
