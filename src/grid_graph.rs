//! Doubled obstacle grid derived from a board.
//!
//! A board of side `d` becomes a `(2d-1) x (2d-1)` grid: cells sit on even
//! coordinates and wall segments occupy the odd rows and columns between
//! them. Cell nodes weigh 1 (passable) and wall segment nodes weigh 0
//! (impassable). A step moves two grid units and is only allowed when the
//! segment in between is passable.

use crate::{
    data_model::{BoardState, Direction, WallOrientation},
    wall_index::{wall_anchor, wall_orientation},
};

pub const CELL_WEIGHT: u8 = 1;
pub const WALL_WEIGHT: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPoint {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridGraph {
    dimension: usize,
    side: usize,
    weights: Vec<u8>,
}

impl GridPoint {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl GridGraph {
    /// An open grid with no walls.
    pub fn open(dimension: usize) -> Self {
        let side = 2 * dimension - 1;
        Self {
            dimension,
            side,
            weights: vec![CELL_WEIGHT; side * side],
        }
    }

    pub fn from_board(state: &BoardState) -> Self {
        let mut graph = Self::open(state.dimension);
        for &wall in &state.placed_walls {
            graph.add_wall(wall);
        }
        graph
    }

    /// Marks the three grid nodes covered by a wall as impassable.
    pub fn add_wall(&mut self, wall: usize) {
        let (ax, ay) = wall_anchor(self.dimension, wall);
        match wall_orientation(wall) {
            WallOrientation::Horizontal => {
                let y = 2 * ay + 1;
                for x in 2 * ax..=2 * ax + 2 {
                    self.set_weight(GridPoint::new(x, y), WALL_WEIGHT);
                }
            }
            WallOrientation::Vertical => {
                let x = 2 * ax + 1;
                for y in 2 * ay..=2 * ay + 2 {
                    self.set_weight(GridPoint::new(x, y), WALL_WEIGHT);
                }
            }
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn weight(&self, point: GridPoint) -> u8 {
        self.weights[point.y * self.side + point.x]
    }

    fn set_weight(&mut self, point: GridPoint, weight: u8) {
        if point.x < self.side && point.y < self.side {
            self.weights[point.y * self.side + point.x] = weight;
        }
    }

    pub fn is_wall(&self, point: GridPoint) -> bool {
        self.weight(point) == WALL_WEIGHT
    }

    pub fn cell_to_point(&self, cell: usize) -> GridPoint {
        GridPoint::new(2 * (cell % self.dimension), 2 * (cell / self.dimension))
    }

    pub fn point_to_cell(&self, point: GridPoint) -> Option<usize> {
        (point.x % 2 == 0 && point.y % 2 == 0 && point.x < self.side && point.y < self.side)
            .then(|| (point.y / 2) * self.dimension + point.x / 2)
    }

    fn offset(&self, point: GridPoint, dx: isize, dy: isize) -> Option<GridPoint> {
        let x = point.x as isize + dx;
        let y = point.y as isize + dy;
        let side = self.side as isize;
        (x >= 0 && y >= 0 && x < side && y < side).then(|| GridPoint::new(x as usize, y as usize))
    }

    /// Cell nodes reachable in one step, in North, East, South, West order.
    pub fn neighbors(&self, point: GridPoint) -> Vec<GridPoint> {
        Direction::iter()
            .filter_map(|direction| {
                let (dx, dy) = direction.to_offset();
                let between = self.offset(point, dx, dy)?;
                let target = self.offset(point, 2 * dx, 2 * dy)?;
                (!self.is_wall(between) && !self.is_wall(target)).then_some(target)
            })
            .collect()
    }

    /// Cost of stepping onto `point`.
    pub fn cost(&self, point: GridPoint) -> usize {
        self.weight(point) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_grid_dimensions() {
        let graph = GridGraph::open(9);
        assert_eq!(graph.side(), 17);
        assert_eq!(graph.cell_to_point(76), GridPoint::new(8, 16));
        assert_eq!(graph.point_to_cell(GridPoint::new(8, 16)), Some(76));
        assert_eq!(graph.point_to_cell(GridPoint::new(7, 16)), None);
    }

    #[test]
    fn horizontal_wall_covers_three_nodes() {
        let mut state = BoardState::initial();
        // Horizontal wall anchored at (4, 2).
        state.placed_walls = vec![40];
        let graph = GridGraph::from_board(&state);
        for x in 8..=10 {
            assert!(graph.is_wall(GridPoint::new(x, 5)));
        }
        assert!(!graph.is_wall(GridPoint::new(11, 5)));
        assert!(!graph.is_wall(GridPoint::new(7, 5)));
    }

    #[test]
    fn vertical_wall_covers_three_nodes() {
        let mut state = BoardState::initial();
        // Vertical wall anchored at (7, 0).
        state.placed_walls = vec![15];
        let graph = GridGraph::from_board(&state);
        for y in 0..=2 {
            assert!(graph.is_wall(GridPoint::new(15, y)));
        }
        assert!(!graph.is_wall(GridPoint::new(15, 3)));
    }

    #[test]
    fn neighbors_respect_walls_and_edges() {
        let mut state = BoardState::initial();
        state.placed_walls = vec![40];
        let graph = GridGraph::from_board(&state);
        // Cell (4, 3) has the wall directly north of it.
        let point = graph.cell_to_point(31);
        assert_eq!(
            graph.neighbors(point),
            vec![GridPoint::new(10, 6), GridPoint::new(8, 8), GridPoint::new(6, 6)]
        );
        let corner = graph.cell_to_point(0);
        assert_eq!(
            graph.neighbors(corner),
            vec![GridPoint::new(2, 0), GridPoint::new(0, 2)]
        );
    }
}
