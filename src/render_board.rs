use crate::data_model::{BoardState, Player, WallOrientation};

/// Text drawing of a position. Free anchor vertices are labelled with their
/// `x` and `y` coordinates so walls can be typed as `h<x><y>` / `v<x><y>`.
pub fn render_board(state: &BoardState) -> String {
    let size = state.dimension;
    let anchors = size - 1;
    let mut output = String::new();
    for y in 0..size {
        if y > 0 {
            output.push('\n');
        }
        let draw_vertical_wall = |x: usize| {
            let wall_above =
                y > 0 && state.wall_at(WallOrientation::Vertical, x as isize, y as isize - 1);
            let wall_below = state.wall_at(WallOrientation::Vertical, x as isize, y as isize);
            if wall_below || wall_above { '│' } else { ' ' }
        };
        for x in 0..size {
            output.push_str(format!("┌───┐ {} ", draw_vertical_wall(x)).as_str());
        }
        output.push('\n');
        for x in 0..size {
            let cell = y * size + x;
            let player_char = if state.player_position(Player::Player1) == cell {
                Player::Player1.symbol()
            } else if state.player_position(Player::Player2) == cell {
                Player::Player2.symbol()
            } else {
                ' '
            };
            output.push_str(format!("│ {} │ {} ", player_char, draw_vertical_wall(x)).as_str());
        }
        output.push('\n');
        for x in 0..size {
            output.push_str(format!("└───┘ {} ", draw_vertical_wall(x)).as_str());
        }
        if y < anchors {
            output.push('\n');
            for x in 0..size {
                let (xi, yi) = (x as isize, y as isize);
                let wall_right = state.wall_at(WallOrientation::Horizontal, xi, yi);
                let wall_left = x > 0 && state.wall_at(WallOrientation::Horizontal, xi - 1, yi);
                let vertical_wall = state.wall_at(WallOrientation::Vertical, xi, yi);
                let vertical_wall_char = if vertical_wall { '│' } else { ' ' };
                let write_indices = x < anchors && !vertical_wall;
                let (x_str, y_str) = if write_indices {
                    (x.to_string(), y.to_string())
                } else {
                    (" ".to_string(), " ".to_string())
                };
                if wall_right {
                    output.push_str("────────");
                } else if wall_left {
                    output.push_str(
                        format!("─────{}{}{}", x_str, vertical_wall_char, y_str).as_str(),
                    );
                } else {
                    output.push_str(
                        format!("     {}{}{}", x_str, vertical_wall_char, y_str).as_str(),
                    );
                }
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pawns_are_drawn_on_their_rows() {
        let rendered = render_board(&BoardState::initial());
        let lines: Vec<&str> = rendered.lines().collect();
        // Each board row takes three lines plus one separator line.
        assert!(lines[1].contains("│ 2 │"));
        assert!(lines[8 * 4 + 1].contains("│ 1 │"));
        assert!(!lines[8 * 4 + 1].contains("│ 2 │"));
    }

    #[test]
    fn walls_replace_anchor_labels() {
        let mut state = BoardState::initial();
        // Horizontal wall at (0, 0) and vertical wall at (3, 0).
        state.placed_walls = vec![0, 7];
        let rendered = render_board(&state);
        let separator = rendered.lines().nth(3).unwrap_or_default();
        assert!(separator.starts_with("────────"));
        assert!(separator.contains('│'));
        assert!(!separator.contains("0 0"));
    }
}
