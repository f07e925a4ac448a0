use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

// ==================== Defaults ====================
mod defaults {
    pub const CANVAS_WIDTH: u32 = 505;
    pub const CANVAS_HEIGHT: u32 = 606;
    pub const COLUMNS: u32 = 5;
    pub const TILE_WIDTH: f64 = 101.0;
    pub const TILE_HEIGHT: f64 = 83.0;

    pub const WATER: &str = "images/water-block.png";
    pub const STONE: &str = "images/stone-block.png";
    pub const GRASS: &str = "images/grass-block.png";
    pub const HEART: &str = "images/Heart.png";
    pub const GAME_OVER: &str = "images/gameover.png";
    pub const ENEMY: &str = "images/enemy-bug.png";
    pub const PLAYER: &str = "images/char-horn-girl.png";
}

/// Everything the game would otherwise hardcode. Missing fields fall back to
/// the classic 5x6 board.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas: CanvasConfig,
    pub board: BoardConfig,
    /// Images requested before the loop starts
    pub preload: Vec<String>,
    pub player: PlayerConfig,
    pub enemies: Vec<EnemyConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BoardConfig {
    pub columns: u32,
    pub tile_width: f64,
    pub tile_height: f64,
    /// One image per row, top to bottom. The row count follows its length.
    pub row_images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub image: String,
    pub column: u32,
    pub row: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnemyConfig {
    #[serde(default = "EnemyConfig::default_image")]
    pub image: String,
    pub row: u32,
    /// pixels per second
    pub speed: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            canvas: CanvasConfig::default(),
            board: BoardConfig::default(),
            preload: [
                defaults::STONE,
                defaults::WATER,
                defaults::GRASS,
                defaults::HEART,
                defaults::GAME_OVER,
                defaults::ENEMY,
                defaults::PLAYER,
            ]
            .iter()
            .map(|url| url.to_string())
            .collect(),
            player: PlayerConfig::default(),
            enemies: vec![
                EnemyConfig::new(1, 120.0),
                EnemyConfig::new(2, 200.0),
                EnemyConfig::new(3, 80.0),
            ],
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: defaults::CANVAS_WIDTH,
            height: defaults::CANVAS_HEIGHT,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            columns: defaults::COLUMNS,
            tile_width: defaults::TILE_WIDTH,
            tile_height: defaults::TILE_HEIGHT,
            // water on top, three rows of stone, two of grass
            row_images: [
                defaults::WATER,
                defaults::STONE,
                defaults::STONE,
                defaults::STONE,
                defaults::GRASS,
                defaults::GRASS,
            ]
            .iter()
            .map(|url| url.to_string())
            .collect(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            image: defaults::PLAYER.to_owned(),
            column: 2,
            row: 5,
        }
    }
}

impl EnemyConfig {
    pub fn new(row: u32, speed: f64) -> Self {
        EnemyConfig {
            image: Self::default_image(),
            row,
            speed,
        }
    }

    fn default_image() -> String {
        defaults::ENEMY.to_owned()
    }
}

impl GameConfig {
    /// `undefined` or `null` gives the defaults
    pub fn from_js(value: JsValue) -> Result<Self> {
        let config = if value.is_undefined() || value.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(value)
                .map_err(|err| anyhow!("Invalid game config : {}", err))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let board = &self.board;
        if board.columns == 0 || board.row_images.is_empty() {
            bail!("Board needs at least one row and one column");
        }
        if board.tile_width <= 0.0 || board.tile_height <= 0.0 {
            bail!(
                "Tile size must be positive, got {}x{}",
                board.tile_width,
                board.tile_height
            );
        }
        let rows = board.row_images.len();
        if self.player.column >= board.columns || self.player.row as usize >= rows {
            bail!(
                "Player tile ({}, {}) is off the board",
                self.player.column,
                self.player.row
            );
        }

        for (index, enemy) in self.enemies.iter().enumerate() {
            if enemy.row as usize >= rows {
                bail!("Enemy {} row {} is off the board", index, enemy.row);
            }
            if !(enemy.speed.is_finite() && enemy.speed >= 0.0) {
                bail!(
                    "Enemy {} speed must be a non-negative number, got {}",
                    index,
                    enemy.speed
                );
            }
        }

        // everything drawn must be requested before the loop starts
        let drawn = board
            .row_images
            .iter()
            .chain(std::iter::once(&self.player.image))
            .chain(self.enemies.iter().map(|enemy| &enemy.image));
        for image in drawn {
            if !self.preload.contains(image) {
                bail!("Image '{}' is drawn but never preloaded", image);
            }
        }
        Ok(())
    }
}
