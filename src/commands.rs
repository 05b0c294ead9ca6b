use std::io::{self, BufRead, Write};
use std::str::FromStr;

use thiserror::Error;

use crate::{
    data_model::{BoardState, DIMENSION, Edge, WallOrientation},
    game_logic::apply_edge,
    wall_index::{total_wall_slots, wall_index},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,

    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("`{0}` is not a number")]
    InvalidNumber(String),

    #[error("{value} is out of range (limit {limit})")]
    OutOfRange { value: usize, limit: usize },
}

fn parse_index(text: &str, limit: usize) -> Result<usize, ParseError> {
    let value = text
        .trim()
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidNumber(text.trim().to_string()))?;
    if value >= limit {
        return Err(ParseError::OutOfRange { value, limit });
    }
    Ok(value)
}

fn parse_digit(c: Option<char>, limit: usize) -> Result<usize, ParseError> {
    let c = c.ok_or(ParseError::Empty)?;
    let value = c
        .to_digit(10)
        .ok_or_else(|| ParseError::InvalidNumber(c.to_string()))? as usize;
    if value >= limit {
        return Err(ParseError::OutOfRange { value, limit });
    }
    Ok(value)
}

/// Parses a textual action on a board of side `dimension`.
///
/// Accepted forms:
/// - `move <cell>` and `wall <index>`, the labels edges are displayed with;
/// - `m<x><y>`: move to the cell in column `x`, row `y`;
/// - `h<x><y>` / `v<x><y>`: horizontal or vertical wall anchored at `(x, y)`.
pub fn parse_edge(input: &str, dimension: usize) -> Result<Edge, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    if let Some(rest) = input.strip_prefix("move ") {
        return Ok(Edge::Move(parse_index(rest, dimension * dimension)?));
    }
    if let Some(rest) = input.strip_prefix("wall ") {
        return Ok(Edge::Wall(parse_index(rest, total_wall_slots(dimension))?));
    }

    let mut chars = input.chars();
    let action = chars.next();
    let (limit, orientation) = match action {
        Some('m') => (dimension, None),
        Some('h') => (dimension - 1, Some(WallOrientation::Horizontal)),
        Some('v') => (dimension - 1, Some(WallOrientation::Vertical)),
        _ => return Err(ParseError::UnknownAction(input.to_string())),
    };
    let x = parse_digit(chars.next(), limit)?;
    let y = parse_digit(chars.next(), limit)?;
    if chars.next().is_some() {
        return Err(ParseError::UnknownAction(input.to_string()));
    }
    Ok(match orientation {
        None => Edge::Move(y * dimension + x),
        Some(orientation) => Edge::Wall(wall_index(dimension, x, y, orientation)),
    })
}

impl FromStr for Edge {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_edge(s, DIMENSION)
    }
}

/// Prompts on stdin until a legal action for `state` is entered.
pub fn get_human_move(state: &BoardState) -> io::Result<Edge> {
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a move was entered",
            ));
        }

        match parse_edge(&input, state.dimension) {
            Ok(edge) => match apply_edge(state, edge) {
                Ok(_) => return Ok(edge),
                Err(err) => println!("Illegal move: {err}."),
            },
            Err(err) => println!("Invalid input format: {err}."),
        }
    }
}
