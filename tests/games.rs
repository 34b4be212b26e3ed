// Integration tests (native) for the small games and the character sheet.

use pocket_arcade::charsheet::{CharacterSheet, DiceExpr, ability_modifier, level_from_class};
use pocket_arcade::minesweeper::{Board, Outcome};
use pocket_arcade::tictactoe::{Game, Mark, Status, bot_move};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn bot_blocks_the_obvious_threat() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut game = Game::new();
    assert_eq!(game.play(0, &mut rng), Some(4));
    // X threatens the top row at 2; O has nothing to win yet
    assert_eq!(game.play(1, &mut rng), Some(2));
    assert_eq!(game.status, Status::Turn(Mark::X));
}

#[test]
fn bot_closes_out_a_win() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut game = Game::new();
    assert_eq!(game.play(1, &mut rng), Some(4));
    // no threats on either side: O picks some corner
    let corner = game.play(7, &mut rng).unwrap();
    assert!([0, 2, 6, 8].contains(&corner));
    // O now owns the centre and a corner; the opposite corner wins
    assert_eq!(game.play(3, &mut rng), Some(8 - corner));
    assert_eq!(game.status, Status::Won(Mark::O, winning_diagonal(corner)));
}

fn winning_diagonal(corner: usize) -> [usize; 3] {
    if corner == 0 || corner == 8 { [0, 4, 8] } else { [2, 4, 6] }
}

#[test]
fn full_game_never_lets_a_cell_be_taken_twice() {
    for seed in 0..30 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new();
        while !game.is_over() {
            let idx = (0..9).find(|&i| game.board.is_free(i)).unwrap();
            game.play(idx, &mut rng);
        }
        let x = game.board.cells.iter().filter(|c| **c == Some(Mark::X)).count();
        let o = game.board.cells.iter().filter(|c| **c == Some(Mark::O)).count();
        assert!(x == o || x == o + 1);
        if game.status == Status::Draw {
            assert!(game.board.is_full());
            assert_eq!(bot_move(&game.board, Mark::O, &mut rng), None);
        }
    }
}

#[test]
fn minesweeper_first_click_flood_and_win() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut board = Board::default();
    let out = board.reveal(5, 5, &mut rng);
    assert_ne!(out, Outcome::Lost);
    assert!(board.cell(5, 5).unwrap().revealed);
    assert_eq!(board.cells.iter().filter(|c| c.mine).count(), 15);

    // reveal every safe cell to win
    let safe: Vec<usize> = (0..board.cells.len()).filter(|&i| !board.cells[i].mine).collect();
    for i in safe {
        board.reveal(i / board.cols, i % board.cols, &mut rng);
    }
    assert_eq!(board.outcome, Outcome::Won);
    assert_eq!(board.revealed, 100 - 15);
}

#[test]
fn character_sheet_from_partial_json() {
    let sheet: CharacterSheet =
        serde_json::from_str(r#"{ "name": "Tamsin", "class": "Ranger 6", "dex": 17, "wis": 14 }"#).unwrap();
    let stats = sheet.derived();
    assert_eq!(stats.level, 6);
    assert_eq!(stats.proficiency_bonus, 3);
    assert_eq!(stats.passive_perception, 12);
    assert_eq!(stats.modifiers[1], ability_modifier(17));
    assert_eq!(sheet.str, 10);
    assert_eq!(level_from_class(&sheet.class), 6);
}

#[test]
fn damage_roll_text() {
    let mut rng = StdRng::seed_from_u64(4);
    let expr: DiceExpr = "2d8+1".parse().unwrap();
    let roll = expr.roll(&mut rng);
    let text = roll.to_string();
    assert!(text.starts_with('['));
    assert!(text.ends_with(&format!("= {}", roll.total)));
    assert!(text.contains("+1"));
}

#[test]
fn character_sheet_from_form_export() {
    // the page exports every input as text
    let json = r#"{
        "name": "Oren", "class": "Wizard 3", "race": "Elf", "background": "Sage",
        "str": "8", "dex": "14", "con": "", "int": "17", "wis": "12", "cha": "",
        "notes": "", "spells": [{ "name": "Magic Missile", "level": "1" }]
    }"#;
    let sheet: CharacterSheet = serde_json::from_str(json).unwrap();
    let stats = sheet.derived();
    assert_eq!(stats.modifiers, [-1, 2, 0, 3, 1, 0]);
    assert_eq!(stats.proficiency_bonus, 2);
    assert_eq!(stats.passive_perception, 11);
    assert!(sheet.to_json().unwrap().contains("\"con\": 10"));
}
