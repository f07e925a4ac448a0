use crate::board::Board;
use crate::engine::{Entity, Point, Surface};
use crate::resources::{ImageSource, ResourceCache};
use anyhow::{anyhow, Result};
use std::rc::Rc;

/// An image looked up in the cache every time it is drawn
pub struct Sprite<L: ImageSource> {
    resources: Rc<ResourceCache<L>>,
    image: String,
}

impl<L: ImageSource + 'static> Sprite<L> {
    pub fn new(resources: Rc<ResourceCache<L>>, image: impl Into<String>) -> Self {
        Sprite {
            resources,
            image: image.into(),
        }
    }

    pub fn draw<S>(&self, surface: &S, position: Point) -> Result<()>
    where
        S: Surface<Image = L::Handle>,
    {
        let image = self
            .resources
            .get(&self.image)
            .ok_or_else(|| anyhow!("Sprite image '{}' is not loaded", self.image))?;
        surface.draw_image(&image, position)
    }
}

/// Crosses its row left to right and re-enters from the left edge
pub struct Enemy<L: ImageSource> {
    sprite: Sprite<L>,
    position: Point,
    // pixels per second
    speed: f64,
    // x past which the enemy wraps, and where it re-enters
    exit_x: f64,
    entry_x: f64,
}

impl<L: ImageSource + 'static> Enemy<L> {
    pub fn new(sprite: Sprite<L>, board: &Board, row: u32, speed: f64) -> Self {
        let entry_x = -board.tile_size().width;
        Enemy {
            sprite,
            position: Point {
                x: entry_x,
                y: board.tile_position(0, row).y,
            },
            speed,
            exit_x: board.bounds().right(),
            entry_x,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

impl<L, S> Entity<S> for Enemy<L>
where
    L: ImageSource + 'static,
    S: Surface<Image = L::Handle>,
{
    fn update(&mut self, dt: f64) {
        self.position.x += self.speed * dt;
        if self.position.x > self.exit_x {
            self.position.x = self.entry_x;
        }
    }

    fn render(&self, surface: &S) -> Result<()> {
        self.sprite.draw(surface, self.position)
    }
}

/// Stands on its tile; moving it is up to whoever handles input
pub struct Player<L: ImageSource> {
    sprite: Sprite<L>,
    position: Point,
}

impl<L: ImageSource + 'static> Player<L> {
    pub fn new(sprite: Sprite<L>, board: &Board, column: u32, row: u32) -> Self {
        Player {
            sprite,
            position: board.tile_position(column, row),
        }
    }
}

impl<L, S> Entity<S> for Player<L>
where
    L: ImageSource + 'static,
    S: Surface<Image = L::Handle>,
{
    fn update(&mut self, _dt: f64) {}

    fn render(&self, surface: &S) -> Result<()> {
        self.sprite.draw(surface, self.position)
    }
}
