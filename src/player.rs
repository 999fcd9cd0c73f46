use crate::config::Config;
use crate::map::{CellRect, Occupancy};
use crate::normalize_angle;
use glam::{IVec2, Vec2};

/// Movement requests for one frame, already resolved from whatever input
/// device drives the game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Intents {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PlayerState {
    /// Position in grid units
    pos: Vec2,
    /// Facing in radians, always in [0, 2π)
    angle: f32,
    speed: f32,
    rot_speed: f32,
    cell_size: f32,
}

impl PlayerState {
    /// The caller vouches that `pos` sits in an open cell.
    pub fn new(config: &Config, pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle: normalize_angle(angle),
            speed: config.player_speed,
            rot_speed: config.player_rot_speed,
            cell_size: config.cell_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config, config.player_pos, config.player_angle)
    }

    /// Advance one tick. Each axis is checked on its own, from the position
    /// before the move, so the player slides along walls instead of
    /// sticking to them. When both axes are clear but the diagonal cell is
    /// solid only x moves, so the player never ends up inside a wall.
    pub fn update(&mut self, intents: Intents, dt: f32, map: &impl Occupancy) {
        if dt.is_nan() || dt <= 0. {
            return;
        }

        let step = self.direction() * (self.speed * dt);
        // perpendicular pointing to the player's left, y grows downward
        let left = Vec2::new(step.y, -step.x);

        let mut delta = Vec2::ZERO;
        if intents.forward {
            delta += step;
        }
        if intents.backward {
            delta -= step;
        }
        if intents.strafe_left {
            delta += left;
        }
        if intents.strafe_right {
            delta -= left;
        }

        if delta != Vec2::ZERO {
            let origin = self.pos;
            let x_clear = !map.is_occupied(grid_cell(origin + Vec2::new(delta.x, 0.)));
            let y_clear = !map.is_occupied(grid_cell(origin + Vec2::new(0., delta.y)));
            // both axes open onto a solid diagonal: x wins
            let y_clear = y_clear && !(x_clear && map.is_occupied(grid_cell(origin + delta)));

            if x_clear {
                self.pos.x += delta.x;
            }
            if y_clear {
                self.pos.y += delta.y;
            }
        }

        let rotation = self.rot_speed * dt;
        if intents.turn_left {
            self.angle -= rotation;
        }
        if intents.turn_right {
            self.angle += rotation;
        }
        self.angle = normalize_angle(self.angle);
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Unit facing vector
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    pub fn world_pos(&self) -> Vec2 {
        self.pos * self.cell_size
    }

    pub fn cell(&self) -> IVec2 {
        grid_cell(self.pos)
    }

    pub fn world_rect(&self) -> CellRect {
        CellRect::of(self.cell(), self.cell_size)
    }
}

/// Cell containing a point given in grid units.
pub fn grid_cell(pos: Vec2) -> IVec2 {
    pos.floor().as_ivec2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    fn config() -> Config {
        Config {
            cell_size: 100.,
            player_speed: 1.,
            player_rot_speed: 1.,
            ..Config::default()
        }
    }

    fn walls(cells: &[(i32, i32)]) -> HashSet<IVec2> {
        cells.iter().map(|&(x, y)| IVec2::new(x, y)).collect()
    }

    fn everything() -> Intents {
        Intents {
            forward: true,
            strafe_left: true,
            turn_right: true,
            ..Intents::default()
        }
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let map = walls(&[]);
        let mut player = PlayerState::new(&config(), Vec2::new(2.5, 2.5), 1.);
        let before = player;
        player.update(everything(), 0., &map);
        assert_eq!(player, before);
    }

    #[test]
    fn test_forward_moves_along_facing() {
        let map = walls(&[]);
        let mut player = PlayerState::new(&config(), Vec2::new(2.5, 2.5), 0.);
        player.update(
            Intents {
                forward: true,
                ..Intents::default()
            },
            0.25,
            &map,
        );
        assert!((player.pos() - Vec2::new(2.75, 2.5)).length() < 1e-6);
        assert_eq!(player.angle(), 0.);
    }

    #[test]
    fn test_strafe_left_is_screen_left() {
        // facing east with y down, left is north (-y)
        let map = walls(&[]);
        let mut player = PlayerState::new(&config(), Vec2::new(2.5, 2.5), 0.);
        player.update(
            Intents {
                strafe_left: true,
                ..Intents::default()
            },
            0.25,
            &map,
        );
        assert!((player.pos() - Vec2::new(2.5, 2.25)).length() < 1e-6);
    }

    #[test]
    fn test_diagonal_is_not_normalized() {
        let map = walls(&[]);
        let mut player = PlayerState::new(&config(), Vec2::new(2.5, 2.5), 0.);
        player.update(
            Intents {
                forward: true,
                strafe_right: true,
                ..Intents::default()
            },
            0.25,
            &map,
        );
        let moved = player.pos() - Vec2::new(2.5, 2.5);
        assert!((moved.length() - 0.25 * 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_opposing_intents_cancel() {
        let map = walls(&[]);
        let mut player = PlayerState::new(&config(), Vec2::new(2.5, 2.5), 0.3);
        player.update(
            Intents {
                forward: true,
                backward: true,
                turn_left: true,
                turn_right: true,
                ..Intents::default()
            },
            0.5,
            &map,
        );
        assert!((player.pos() - Vec2::new(2.5, 2.5)).length() < 1e-6);
        assert!((player.angle() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_slides_along_east_wall() {
        // wall directly east, everything else open
        let map = walls(&[(3, 2)]);
        let start = Vec2::new(2.9, 2.5);
        let dt = 0.2;

        let mut north_only = PlayerState::new(&config(), start, 3. * FRAC_PI_2);
        north_only.update(
            Intents {
                forward: true,
                ..Intents::default()
            },
            dt,
            &map,
        );

        // facing east, "move east + move north" is forward + strafe left
        let mut player = PlayerState::new(&config(), start, 0.);
        player.update(
            Intents {
                forward: true,
                strafe_left: true,
                ..Intents::default()
            },
            dt,
            &map,
        );

        assert_eq!(player.pos().x, start.x);
        assert!(player.pos().y < start.y);
        assert!((player.pos().y - north_only.pos().y).abs() < 1e-6);
        assert_eq!(player.cell(), IVec2::new(2, 2));
    }

    #[test]
    fn test_y_check_uses_original_x() {
        // x moves into the open (3,2); the y check runs from the original
        // x and lands in the solid (2,1), even though (3,1) is open
        let map = walls(&[(2, 1)]);
        let mut player = PlayerState::new(&config(), Vec2::new(2.95, 2.05), 0.);
        player.update(
            Intents {
                forward: true,
                strafe_left: true,
                ..Intents::default()
            },
            0.1,
            &map,
        );
        assert!((player.pos() - Vec2::new(3.05, 2.05)).length() < 1e-5);
    }

    #[test]
    fn test_no_corner_cutting() {
        // (3,2) and (2,1) are open on their own, the diagonal (3,1) is not
        let map = walls(&[(3, 1)]);
        let mut player = PlayerState::new(&config(), Vec2::new(2.95, 2.05), 0.);
        player.update(
            Intents {
                forward: true,
                strafe_left: true,
                ..Intents::default()
            },
            0.1,
            &map,
        );
        assert!((player.pos() - Vec2::new(3.05, 2.05)).length() < 1e-5);
        assert!(!map.is_occupied(player.cell()));
    }

    #[test]
    fn test_blocked_both_axes() {
        let map = walls(&[(3, 2), (2, 1), (3, 1)]);
        let start = Vec2::new(2.95, 2.05);
        let mut player = PlayerState::new(&config(), start, 0.);
        player.update(
            Intents {
                forward: true,
                strafe_left: true,
                ..Intents::default()
            },
            0.1,
            &map,
        );
        assert_eq!(player.pos(), start);
    }

    #[test]
    fn test_rotation_wraps() {
        let map = walls(&[]);
        let mut player = PlayerState::new(&config(), Vec2::new(2.5, 2.5), 0.1);
        player.update(
            Intents {
                turn_left: true,
                ..Intents::default()
            },
            0.3,
            &map,
        );
        assert!((player.angle() - (TAU - 0.2)).abs() < 1e-5);

        player.update(
            Intents {
                turn_right: true,
                ..Intents::default()
            },
            0.5,
            &map,
        );
        assert!((player.angle() - 0.3).abs() < 1e-5);

        for _ in 0..100 {
            player.update(
                Intents {
                    turn_right: true,
                    ..Intents::default()
                },
                PI / 3.,
                &map,
            );
            assert!((0. ..TAU).contains(&player.angle()));
        }
    }

    #[test]
    fn test_from_config_normalizes_angle() {
        let config = Config {
            player_pos: Vec2::new(4.5, 2.5),
            player_angle: -FRAC_PI_2,
            ..config()
        };
        let player = PlayerState::from_config(&config);
        assert_eq!(player.pos(), Vec2::new(4.5, 2.5));
        assert!((player.angle() - 3. * FRAC_PI_2).abs() < 1e-5);
        assert!((player.direction() - Vec2::new(0., -1.)).length() < 1e-5);
    }

    #[test]
    fn test_derived_views() {
        let player = PlayerState::new(&config(), Vec2::new(3.25, 1.5), 0.);
        assert_eq!(player.world_pos(), Vec2::new(325., 150.));
        assert_eq!(player.cell(), IVec2::new(3, 1));
        let rect = player.world_rect();
        assert_eq!(rect.min, Vec2::new(300., 100.));
        assert_eq!(rect.size, 100.);
        assert!(rect.contains(player.world_pos()));
    }
}
