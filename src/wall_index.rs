//! Linear wall-index scheme.
//!
//! Walls are anchored on the `(d-1) x (d-1)` grid of interior vertices. Each
//! vertex owns two consecutive indices: the even one is the horizontal wall
//! and the odd one the vertical wall centred on that vertex. Vertex `(x, y)`
//! is the bottom-right corner of cell `(x, y)`, so a horizontal wall there
//! separates rows `y` and `y+1` across columns `x` and `x+1`, and a vertical
//! wall separates columns `x` and `x+1` across rows `y` and `y+1`.

use crate::data_model::{Direction, WallOrientation};

/// Number of wall indices per row of anchor vertices.
pub fn anchor_row_width(dimension: usize) -> usize {
    2 * (dimension - 1)
}

pub fn total_wall_slots(dimension: usize) -> usize {
    anchor_row_width(dimension) * (dimension - 1)
}

pub fn wall_index(dimension: usize, x: usize, y: usize, orientation: WallOrientation) -> usize {
    let offset = match orientation {
        WallOrientation::Horizontal => 0,
        WallOrientation::Vertical => 1,
    };
    y * anchor_row_width(dimension) + x * 2 + offset
}

pub fn wall_orientation(index: usize) -> WallOrientation {
    if index % 2 == 0 {
        WallOrientation::Horizontal
    } else {
        WallOrientation::Vertical
    }
}

/// Anchor vertex `(x, y)` of a wall index.
pub fn wall_anchor(dimension: usize, index: usize) -> (usize, usize) {
    let row_width = anchor_row_width(dimension);
    ((index % row_width) / 2, index / row_width)
}

/// Every index that cannot coexist with `index`, including `index` itself.
pub fn conflicting_walls(dimension: usize, index: usize) -> Vec<usize> {
    let row_width = anchor_row_width(dimension);
    let total = total_wall_slots(dimension);
    let mut conflicts = vec![index];
    match wall_orientation(index) {
        WallOrientation::Horizontal => {
            conflicts.push(index + 1);
            if index % row_width != row_width - 2 {
                conflicts.push(index + 2);
            }
            if index % row_width != 0 {
                conflicts.push(index - 2);
            }
        }
        WallOrientation::Vertical => {
            conflicts.push(index - 1);
            if index >= row_width {
                conflicts.push(index - row_width);
            }
            conflicts.push(index + row_width);
        }
    }
    conflicts.retain(|&wall| wall < total);
    conflicts
}

pub fn walls_conflict(dimension: usize, a: usize, b: usize) -> bool {
    conflicting_walls(dimension, a).contains(&b)
}

pub fn conflicts_with_placed(dimension: usize, placed: &[usize], index: usize) -> bool {
    conflicting_walls(dimension, index)
        .iter()
        .any(|wall| placed.contains(wall))
}

/// The eight wall slots around a cell, relative to the cell's own
/// (bottom-right) anchor vertex, paired with the direction each one blocks.
const ADJACENT_WALL_OFFSETS: [(isize, isize, WallOrientation, Direction); 8] = [
    (0, 0, WallOrientation::Horizontal, Direction::South),
    (0, 0, WallOrientation::Vertical, Direction::East),
    (-1, 0, WallOrientation::Horizontal, Direction::South),
    (-1, 0, WallOrientation::Vertical, Direction::West),
    (-1, -1, WallOrientation::Horizontal, Direction::North),
    (-1, -1, WallOrientation::Vertical, Direction::West),
    (0, -1, WallOrientation::Horizontal, Direction::North),
    (0, -1, WallOrientation::Vertical, Direction::East),
];

/// Wall slots touching `cell` that exist on the board, with the direction
/// each would block.
pub fn adjacent_walls(dimension: usize, cell: usize) -> Vec<(usize, Direction)> {
    let anchors = (dimension - 1) as isize;
    let x = (cell % dimension) as isize;
    let y = (cell / dimension) as isize;
    ADJACENT_WALL_OFFSETS
        .iter()
        .filter_map(|&(dx, dy, orientation, direction)| {
            let (ax, ay) = (x + dx, y + dy);
            (ax >= 0 && ay >= 0 && ax < anchors && ay < anchors).then(|| {
                (
                    wall_index(dimension, ax as usize, ay as usize, orientation),
                    direction,
                )
            })
        })
        .collect()
}

/// Wall slots that would block a step from `cell` towards `direction`.
pub fn blocking_walls(dimension: usize, cell: usize, direction: Direction) -> Vec<usize> {
    adjacent_walls(dimension, cell)
        .into_iter()
        .filter_map(|(wall, blocks)| (blocks == direction).then_some(wall))
        .collect()
}
