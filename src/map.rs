use anyhow::Context;
use glam::{IVec2, Vec2};
use std::collections::{HashMap, HashSet};
use std::fs::read_to_string;
use std::path::Path;

/// The one question the caster and the player ask of the world.
pub trait Occupancy {
    /// `true` when the cell at `cell` is solid.
    fn is_occupied(&self, cell: IVec2) -> bool;
}

impl<T: Occupancy + ?Sized> Occupancy for &T {
    fn is_occupied(&self, cell: IVec2) -> bool {
        (**self).is_occupied(cell)
    }
}

/// A bare set of occupied cells; anything not in the set is open.
impl Occupancy for HashSet<IVec2> {
    fn is_occupied(&self, cell: IVec2) -> bool {
        self.contains(&cell)
    }
}

/// Axis-aligned bounds of one grid cell in world units.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CellRect {
    pub min: Vec2,
    pub size: f32,
}

impl CellRect {
    pub fn of(cell: IVec2, cell_size: f32) -> Self {
        Self {
            min: cell.as_vec2() * cell_size,
            size: cell_size,
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.min.x + self.size
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.min.y + self.size
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Tile {
    Empty,
    Spawn,
    Wall(char),
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Meta {
    Spawn { angle: f32 },
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Map {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Tile>,
    pub meta: Vec<Meta>,
}

impl Map {
    pub fn load(name: impl AsRef<Path>) -> anyhow::Result<Self> {
        let name = name.as_ref();
        log::info!("loading map at {}", name.display());
        let file =
            read_to_string(name).with_context(|| format!("could not read {}", name.display()))?;
        Self::parse(&file).with_context(|| format!("malformed map {}", name.display()))
    }

    pub fn parse(src: &str) -> anyhow::Result<Self> {
        let mut lines = src.lines();
        let mut this = Self::default();

        while let Some(line) = lines.by_ref().next() {
            match line.trim_end() {
                "" => continue,
                "!!!!META" => this.parse_meta(&mut lines)?,
                "!!!!MAIN" => this.parse_main(&mut lines)?,
                other => anyhow::bail!("unrecognized directive: {other}"),
            }
        }

        if this.tiles.is_empty() {
            anyhow::bail!("map has no !!!!MAIN section");
        }

        log::debug!(
            "parsed {}x{} map with {} walls",
            this.width,
            this.height,
            this.tiles
                .iter()
                .filter(|tile| matches!(tile, Tile::Wall(_)))
                .count()
        );

        Ok(this)
    }

    fn parse_meta<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
    ) -> anyhow::Result<()> {
        for line in lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }

            let mut chunks = line.split(',');
            let directive = chunks.by_ref().next().unwrap_or_default().trim();
            let params = chunks
                .map(|param| param.split_once('='))
                .collect::<Option<HashMap<_, _>>>()
                .context("incorrectly formatted meta")?;
            match directive {
                "spawn" => {
                    let degrees: f32 = params
                        .get("angle")
                        .unwrap_or(&"0")
                        .trim()
                        .parse()
                        .context("spawn angle is not a number")?;
                    self.meta.push(Meta::Spawn {
                        angle: degrees.to_radians(),
                    });
                }
                other => anyhow::bail!("unrecognized meta directive: {other}"),
            }
        }

        Ok(())
    }

    fn parse_main<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
    ) -> anyhow::Result<()> {
        let mut height = 0;
        let mut width = None;
        let mut tiles = vec![];
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let row = line.chars().count();
            match width {
                None => width = Some(row),
                Some(w) if w != row => {
                    anyhow::bail!("row {height} is {row} tiles wide, expected {w}")
                }
                Some(_) => {}
            }

            height += 1;
            for tile in line.chars() {
                tiles.push(match tile {
                    ' ' | '.' => Tile::Empty,
                    '*' => Tile::Spawn,
                    other if other.is_whitespace() => {
                        anyhow::bail!("invalid tile in map: {other:?}")
                    }
                    other => Tile::Wall(other),
                });
            }
        }

        self.width = width.unwrap_or(0);
        self.height = height;
        self.tiles = tiles;

        Ok(())
    }

    pub fn idx_to_cell(&self, idx: usize) -> IVec2 {
        let x = idx % self.width;
        let y = (idx - x) / self.width;
        IVec2::new(x as i32, y as i32)
    }

    pub fn cell_to_idx(&self, cell: IVec2) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    pub fn tile(&self, cell: IVec2) -> Option<Tile> {
        self.cell_to_idx(cell).map(|idx| self.tiles[idx])
    }

    /// Center of the spawn cell, in grid units.
    pub fn get_spawn(&self) -> Option<Vec2> {
        let idx = self.tiles.iter().position(|x| x == &Tile::Spawn)?;
        Some(self.idx_to_cell(idx).as_vec2() + Vec2::splat(0.5))
    }

    pub fn spawn_angle(&self) -> Option<f32> {
        self.meta.iter().find_map(|item| match item {
            Meta::Spawn { angle } => Some(*angle),
        })
    }

    /// Every solid cell, for callers that want the plain set form.
    pub fn walls(&self) -> HashSet<IVec2> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| matches!(tile, Tile::Wall(_)))
            .map(|(idx, _)| self.idx_to_cell(idx))
            .collect()
    }
}

/// Cells outside the parsed grid are open.
impl Occupancy for Map {
    fn is_occupied(&self, cell: IVec2) -> bool {
        matches!(self.tile(cell), Some(Tile::Wall(_)))
    }
}
