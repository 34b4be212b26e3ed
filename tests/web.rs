// Browser-side checks for the JS bindings. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use pocket_arcade::web::{OsuGame, TicTacToeGame, roll_dice};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn osu_game_starts_with_defaults_and_ticks() {
    let mut game = OsuGame::new(JsValue::UNDEFINED).unwrap();
    game.start();
    assert!(game.running());
    let frame = game.tick().unwrap();
    assert!(frame.is_object());
    assert_eq!(game.score(), 0);
}

#[wasm_bindgen_test]
fn pause_stops_the_song_clock() {
    let mut game = OsuGame::new(JsValue::NULL).unwrap();
    game.start();
    game.pause();
    let t = game.now();
    assert_eq!(game.now(), t);
    game.resume();
    assert!(game.now() >= t);
}

#[wasm_bindgen_test]
fn dice_and_tictactoe_bindings() {
    assert!(roll_dice("1d6").unwrap().starts_with('['));
    assert!(roll_dice("nope").is_err());

    let mut ttt = TicTacToeGame::new();
    assert_eq!(ttt.play(0), 4);
    assert_eq!(ttt.cells()[0], "X");
    assert_eq!(ttt.play(0), -1);
}
