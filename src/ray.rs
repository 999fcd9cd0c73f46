use crate::config::Config;
use crate::map::{CellRect, Occupancy};
use crate::normalize_angle;
use crate::player::PlayerState;
use glam::{IVec2, Vec2};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::f32::consts::{FRAC_PI_2, PI};

/// Below this a direction component counts as zero and the ray is treated
/// as parallel to that pair of cell edges.
pub const AXIS_EPSILON: f32 = 1e-6;

/// Face of the wall a ray struck.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cardinal {
    North,
    East,
    South,
    West,
}

/// Which kind of cell edge the ray crossed last.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    /// An edge of constant x
    Vertical,
    /// An edge of constant y
    Horizontal,
}

/// Direction class of a ray angle. y grows downward, so "+y" is south.
///
/// Angle 0 (due east) belongs to `PosXPosY`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Quadrant {
    /// [0, π/2)
    PosXPosY,
    /// [π/2, π)
    NegXPosY,
    /// [π, 3π/2)
    NegXNegY,
    /// [3π/2, 2π)
    PosXNegY,
}

impl Quadrant {
    pub fn from_angle(angle: f32) -> Self {
        let angle = normalize_angle(angle);
        if angle < FRAC_PI_2 {
            Quadrant::PosXPosY
        } else if angle < PI {
            Quadrant::NegXPosY
        } else if angle < 3. * FRAC_PI_2 {
            Quadrant::NegXNegY
        } else {
            Quadrant::PosXNegY
        }
    }

    /// Per-axis step sign: which neighbouring cell a crossing leads into.
    pub fn step(&self) -> IVec2 {
        match self {
            Quadrant::PosXPosY => IVec2::new(1, 1),
            Quadrant::NegXPosY => IVec2::new(-1, 1),
            Quadrant::NegXNegY => IVec2::new(-1, -1),
            Quadrant::PosXNegY => IVec2::new(1, -1),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RayHit {
    pub angle: f32,
    /// Impact point in grid units
    pub point: Vec2,
    /// Euclidean distance from the player in world units
    pub distance: f32,
    pub side: Side,
    pub face_direction: Cardinal,
    /// Solid cell that stopped the ray, `None` if the depth budget ran out
    pub cell: Option<IVec2>,
    /// Position along the struck face in [0, 1), for texture lookup
    pub hit_where: f32,
}

impl RayHit {
    pub fn is_hit(&self) -> bool {
        self.cell.is_some()
    }

    pub fn world_point(&self, cell_size: f32) -> Vec2 {
        self.point * cell_size
    }

    /// Distance projected onto the view direction (removes fisheye).
    pub fn perpendicular_distance(&self, player_angle: f32) -> f32 {
        self.distance * (self.angle - player_angle).cos()
    }
}

/// Exit of a ray from its current cell, in world units.
#[derive(Clone, Copy, Debug)]
struct Crossing {
    point: Vec2,
    length: f32,
    side: Side,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RayCaster {
    pub num_rays: usize,
    /// Field of view in radians
    pub fov: f32,
    pub max_depth: u32,
}

impl RayCaster {
    pub fn new(num_rays: usize, fov: f32, max_depth: u32) -> Self {
        Self {
            num_rays,
            fov,
            max_depth,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.num_rays, config.fov_rad(), config.max_depth)
    }

    /// Angle of screen column `column`. Column 0 is the leftmost, at the
    /// smallest angle; the middle column of an odd count looks straight
    /// ahead.
    pub fn ray_angle(&self, player_angle: f32, column: usize) -> f32 {
        let n = self.num_rays as f32;
        let offset = ((2 * column + 1) as f32 - n) * self.fov / (2. * n);
        normalize_angle(player_angle + offset)
    }

    /// One hit per column, in column order.
    pub fn cast_all(&self, player: &PlayerState, map: &impl Occupancy) -> Vec<RayHit> {
        (0..self.num_rays)
            .map(|column| self.cast(player, map, column))
            .collect()
    }

    /// Same result as [`RayCaster::cast_all`], with columns spread over the
    /// rayon pool.
    pub fn cast_all_par(
        &self,
        player: &PlayerState,
        map: &(impl Occupancy + Sync),
    ) -> Vec<RayHit> {
        (0..self.num_rays)
            .into_par_iter()
            .map(|column| self.cast(player, map, column))
            .collect()
    }

    pub fn cast(&self, player: &PlayerState, map: &impl Occupancy, column: usize) -> RayHit {
        self.cast_angle(player, self.ray_angle(player.angle(), column), map)
    }

    /// Walk a ray from the player's position, one cell boundary at a time,
    /// until it enters a solid cell or crosses `max_depth` boundaries.
    ///
    /// A ray that runs out of budget ends at the last boundary it crossed,
    /// so a deeper budget can only reach further. A non-finite angle ends
    /// at the player.
    pub fn cast_angle(&self, player: &PlayerState, angle: f32, map: &impl Occupancy) -> RayHit {
        let angle = normalize_angle(angle);
        let cell_size = player.cell_size();
        let start = player.world_pos();
        let mut origin = start;
        let mut side = Side::Vertical;

        if !angle.is_finite() {
            log::warn!("refusing to cast a ray at non-finite angle {angle}");
            return out_of_depth(angle, start, origin, side, IVec2::ONE, cell_size);
        }

        let dir = Vec2::from_angle(angle);
        let step = Quadrant::from_angle(angle).step();
        let mut cell = player.cell();

        for _ in 0..self.max_depth {
            let crossing = next_crossing(origin, dir, step, &CellRect::of(cell, cell_size));
            side = crossing.side;
            cell += match side {
                Side::Vertical => IVec2::new(step.x, 0),
                Side::Horizontal => IVec2::new(0, step.y),
            };

            if map.is_occupied(cell) {
                let point = crossing.point / cell_size;
                let face_direction = face(side, step);
                return RayHit {
                    angle,
                    point,
                    distance: (crossing.point - start).length(),
                    side,
                    face_direction,
                    cell: Some(cell),
                    hit_where: hit_where(face_direction, point),
                };
            }

            origin = crossing.point;
        }

        log::trace!(
            "ray at {angle:.4} found no wall within {} crossings",
            self.max_depth
        );
        out_of_depth(angle, start, origin, side, step, cell_size)
    }
}

/// Open-sky result ending at `last`, the final boundary point reached.
fn out_of_depth(
    angle: f32,
    start: Vec2,
    last: Vec2,
    side: Side,
    step: IVec2,
    cell_size: f32,
) -> RayHit {
    let point = last / cell_size;
    let face_direction = face(side, step);
    RayHit {
        angle,
        point,
        distance: (last - start).length(),
        side,
        face_direction,
        cell: None,
        hit_where: hit_where(face_direction, point),
    }
}

/// Nearest point where the ray leaves `rect`.
///
/// Candidates come from the edge of constant x and the edge of constant y
/// the ray is heading toward; a candidate whose direction component is
/// within `AXIS_EPSILON` of zero is dropped. Ties go to the vertical edge.
fn next_crossing(origin: Vec2, dir: Vec2, step: IVec2, rect: &CellRect) -> Crossing {
    let edge_x = if step.x > 0 { rect.right() } else { rect.left() };
    let edge_y = if step.y > 0 { rect.bottom() } else { rect.top() };

    // a negative length means float drift already put the origin past the
    // edge, so the crossing is immediate
    let vertical = (dir.x.abs() >= AXIS_EPSILON).then(|| {
        let length = ((edge_x - origin.x) / dir.x).max(0.);
        Crossing {
            point: Vec2::new(edge_x, origin.y + length * dir.y),
            length,
            side: Side::Vertical,
        }
    });
    let horizontal = (dir.y.abs() >= AXIS_EPSILON).then(|| {
        let length = ((edge_y - origin.y) / dir.y).max(0.);
        Crossing {
            point: Vec2::new(origin.x + length * dir.x, edge_y),
            length,
            side: Side::Horizontal,
        }
    });

    match (vertical, horizontal) {
        (Some(v), Some(h)) if h.length < v.length => h,
        (Some(v), _) => v,
        (None, Some(h)) => h,
        (None, None) => unreachable!("direction {dir} is not a unit vector"),
    }
}

fn face(side: Side, step: IVec2) -> Cardinal {
    match side {
        Side::Vertical if step.x > 0 => Cardinal::West,
        Side::Vertical => Cardinal::East,
        Side::Horizontal if step.y > 0 => Cardinal::North,
        Side::Horizontal => Cardinal::South,
    }
}

/// Texture coordinate along a face, running clockwise around the wall cell.
fn hit_where(face: Cardinal, point: Vec2) -> f32 {
    let along = match face {
        Cardinal::North => 1. - point.x.rem_euclid(1.),
        Cardinal::East => 1. - point.y.rem_euclid(1.),
        Cardinal::South => point.x.rem_euclid(1.),
        Cardinal::West => point.y.rem_euclid(1.),
    };
    along.rem_euclid(1.)
}
