// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

pub mod board;
pub mod browser;
pub mod config;
pub mod engine;
pub mod entities;
pub mod game;
pub mod resources;

#[cfg(test)]
mod testing;

use config::GameConfig;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - routes logs and panics to the console
/// - reads the optional config object (`undefined` -> classic board)
/// - creates the canvas, starts loading images, and starts the loop once
///   they are all in
#[wasm_bindgen]
pub fn main_js(config: JsValue) -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    // a second start finds the logger already installed, which is fine
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        log::debug!("Logger already set up : {}", err);
    }

    let config = GameConfig::from_js(config).map_err(to_js_error)?;
    game::start(&config).map_err(to_js_error)
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    log::error!("{:#}", err);
    JsValue::from_str(&format!("{:#}", err))
}
