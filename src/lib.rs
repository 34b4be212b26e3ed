//! Pocket Arcade core crate.
//!
//! Game logic for a handful of small browser games, compiled to WASM and
//! driven from the page:
//! - [`osu`]: osu!-style rhythm game (beatmap layout, approach timing, hit
//!   judgement, sliders, frame driver)
//! - [`tictactoe`]: tic-tac-toe against a rule-based bot
//! - [`minesweeper`]: classic minesweeper
//! - [`charsheet`]: D&D 5e character sheet math and dice
//!
//! Rendering, DOM and audio wiring stay in JavaScript; [`web`] is the bridge.

use wasm_bindgen::prelude::*;

pub mod charsheet;
pub mod config;
pub mod minesweeper;
pub mod osu;
pub mod tictactoe;
pub mod web;

pub use config::GameConfig;
pub use osu::{Frame, Game, InputEvent, Scoreboard};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Ignore a second init (module re-instantiated on the same page).
    let _ = console_log::init_with_level(log::Level::Debug);
    log::info!("pocket-arcade {} loaded", env!("CARGO_PKG_VERSION"));
}
