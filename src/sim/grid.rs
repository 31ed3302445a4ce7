//! The world board: a grid of single-character cells

use serde::{Deserialize, Serialize};

/// Board as exchanged on the wire: `{x: width, y: height, cells: [row, ...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldGrid {
    #[serde(rename = "x", default)]
    pub width: usize,
    #[serde(rename = "y", default)]
    pub height: usize,
    #[serde(default)]
    pub cells: Vec<String>,
}

impl WorldGrid {
    pub const DEFAULT_WIDTH: usize = 20;
    pub const DEFAULT_HEIGHT: usize = 10;

    pub const EMPTY: char = '.';
    pub const FOOD: char = '*';
    pub const PLAYER: char = 'A';

    /// A board filled with empty cells
    pub fn blank(width: usize, height: usize) -> Self {
        let row: String = std::iter::repeat(Self::EMPTY).take(width).collect();
        Self {
            width,
            height,
            cells: vec![row; height],
        }
    }

    /// Replace a board with no dimensions by the default 20x10 blank board
    pub fn or_default_board(self) -> Self {
        if self.width == 0 && self.height == 0 {
            Self::blank(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
        } else {
            self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Wrap a coordinate pair onto the board
    pub fn wrap(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        if self.is_empty() {
            return None;
        }
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        Some((x, y))
    }

    /// Cell at a position, wrapping around the edges
    pub fn get_cell(&self, x: i64, y: i64) -> Option<char> {
        let (x, y) = self.wrap(x, y)?;
        self.cells.get(y)?.chars().nth(x)
    }

    /// Overwrite the cell at a position, wrapping around the edges
    ///
    /// Rows shorter than the board width are left alone.
    pub fn set_cell(&mut self, x: i64, y: i64, value: char) {
        let Some((x, y)) = self.wrap(x, y) else {
            return;
        };
        let Some(row) = self.cells.get_mut(y) else {
            return;
        };

        let mut chars: Vec<char> = row.chars().collect();
        if let Some(cell) = chars.get_mut(x) {
            *cell = value;
            *row = chars.into_iter().collect();
        }
    }

    /// Number of cells holding `value`
    pub fn count(&self, value: char) -> usize {
        self.cells
            .iter()
            .map(|row| row.chars().filter(|c| *c == value).count())
            .sum()
    }

    /// Text rendering of the board with markers drawn over it
    pub fn render<I>(&self, markers: I) -> String
    where
        I: IntoIterator<Item = (i64, i64, char)>,
    {
        let mut board = self.clone();
        for (x, y, marker) in markers {
            board.set_cell(x, y, marker);
        }
        board
            .cells
            .iter()
            .take(board.height)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_is_twenty_by_ten_dots() {
        let grid = WorldGrid::default().or_default_board();

        assert_eq!(grid.width, 20);
        assert_eq!(grid.height, 10);
        assert_eq!(grid.cells.len(), 10);
        assert!(grid.cells.iter().all(|row| row == &".".repeat(20)));
    }

    #[test]
    fn existing_board_is_kept() {
        let grid = WorldGrid::blank(3, 2).or_default_board();
        assert_eq!(grid, WorldGrid::blank(3, 2));
    }

    #[test]
    fn cells_wrap_around_edges() {
        let mut grid = WorldGrid::blank(4, 3);
        grid.set_cell(-1, 3, WorldGrid::FOOD);

        assert_eq!(grid.cells[0], "...*");
        assert_eq!(grid.get_cell(3, 0), Some('*'));
        assert_eq!(grid.get_cell(7, -3), Some('*'));
    }

    #[test]
    fn empty_board_has_no_cells() {
        let mut grid = WorldGrid::default();
        grid.set_cell(0, 0, WorldGrid::FOOD);

        assert_eq!(grid.get_cell(0, 0), None);
        assert!(grid.cells.is_empty());
    }

    #[test]
    fn render_draws_markers_without_touching_board() {
        let grid = WorldGrid::blank(3, 2);
        let rendered = grid.render([(1, 1, 'A')]);

        assert_eq!(rendered, "...\n.A.");
        assert_eq!(grid.count(WorldGrid::EMPTY), 6);
    }

    #[test]
    fn wire_names_are_x_y_cells() {
        let grid: WorldGrid =
            serde_json::from_str(r#"{"x": 2, "y": 1, "cells": [".*"]}"#).unwrap();
        assert_eq!(grid.width, 2);
        assert_eq!(grid.height, 1);
        assert_eq!(grid.count(WorldGrid::FOOD), 1);
        assert_eq!(
            serde_json::to_string(&grid).unwrap(),
            r#"{"x":2,"y":1,"cells":[".*"]}"#
        );
    }
}
