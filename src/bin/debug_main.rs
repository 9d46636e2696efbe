//! A bare stdin/stdout runner for poking at the game engine without the terminal interface.

use clap::Parser;
use color_eyre::Result;
use sapper::{Difficulty, Game, GameAction, GameStatus};

#[derive(Parser, Debug)]
#[command(about = "Plays the game through plain text input")]
struct Args {
    #[arg(short, long, default_value_t = 1)]
    difficulty: u8,
    #[arg(short, long)]
    seed: Option<u64>,
}

/// Reads a line of the input. `None` once the input is over.
fn read_input() -> Result<Option<String>> {
    println!("Enter the action and the tile's coordinates (e.g. `f 3,5` to flag the tile in the 4th column of the 6th row):");

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }

    Ok(Some(input))
}

fn parse_action(input: &str) -> Option<GameAction> {
    let (action, position) = input.trim().split_once(char::is_whitespace)?;
    let (x, y) = position.trim().split_once(',')?;
    let position = (x.trim().parse().ok()?, y.trim().parse().ok()?);

    match action {
        "o" => Some(GameAction::OpenTile(position)),
        "f" => Some(GameAction::ToggleFlag(position)),
        _ => None,
    }
}

fn print_game(game: &Game) {
    println!("{}", game.field());
    println!(
        "flags left: {}, mines: {}, flags on mines: {}",
        game.total_flags_available(),
        game.mine_count(),
        game.flags_placed_on_mines(),
    );
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let mut game = args.seed.map_or_else(Game::new, Game::with_seed);
    game.set_difficulty(Difficulty::new(args.difficulty)?);
    game.start()?;

    print_game(&game);

    while let Some(input) = read_input()? {
        let Some(action) = parse_action(&input) else {
            println!("Incorrect input! Please, try again.");
            continue;
        };

        let outcome = game.take_action(action);

        for event in game.take_events() {
            println!("{:?}", event);
        }

        match outcome {
            Ok(GameStatus::Over { victory }) => {
                println!("{}", if victory { "Victory!" } else { "Game over." });
                break;
            }
            Ok(_) => {}
            Err(error) => println!("Refused: {error}"),
        }

        print_game(&game);
    }

    println!("{:?}", game.field());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::parse_action;
    use sapper::GameAction;

    #[test]
    fn actions_are_parsed_from_the_input_line() {
        assert_eq!(parse_action("o 3,5\n"), Some(GameAction::OpenTile((3, 5))));
        assert_eq!(parse_action("f 0, 9"), Some(GameAction::ToggleFlag((0, 9))));
        assert_eq!(parse_action("x 1,1"), None);
        assert_eq!(parse_action("o 1"), None);
        assert_eq!(parse_action(""), None);
    }
}
