use crate::config::{BoardConfig, CanvasConfig};
use crate::engine::{Point, Rect, Size};

/// The static background: a grid of tiles, one image per row
#[derive(Debug, Clone)]
pub struct Board {
    columns: u32,
    tile: Size,
    row_images: Vec<String>,
    bounds: Rect,
}

/// One background cell to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile<'a> {
    pub image: &'a str,
    pub position: Point,
}

impl Board {
    pub fn new(board: &BoardConfig, canvas: &CanvasConfig) -> Self {
        Board {
            columns: board.columns,
            tile: Size {
                width: board.tile_width,
                height: board.tile_height,
            },
            row_images: board.row_images.clone(),
            bounds: Rect::new(
                Point::default(),
                Size {
                    width: canvas.width.into(),
                    height: canvas.height.into(),
                },
            ),
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.row_images.len() as u32
    }

    pub fn tile_size(&self) -> Size {
        self.tile
    }

    /// The whole drawing surface, margins included
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Top-left corner of a tile; the board origin is (0, 0)
    pub fn tile_position(&self, column: u32, row: u32) -> Point {
        Point {
            x: f64::from(column) * self.tile.width,
            y: f64::from(row) * self.tile.height,
        }
    }

    /// Row by row, left to right
    pub fn tiles(&self) -> impl Iterator<Item = Tile<'_>> + '_ {
        self.row_images
            .iter()
            .enumerate()
            .flat_map(move |(row, image)| {
                (0..self.columns).map(move |column| Tile {
                    image: image.as_str(),
                    position: self.tile_position(column, row as u32),
                })
            })
    }
}
