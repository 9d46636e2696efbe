//! The terminal application

use crate::game_ui::render_game;
use crate::menu_ui::render_menu;
use crate::tui::Render;
use crate::update::{ControlsSupport, MoveCursorDirection};
use ratatui::Frame;
use sapper::{Difficulty, Game, GameAction, GameError, GameEvent};
use std::cmp;

/// The terminal application
#[derive(Debug)]
pub struct App {
    /// The app can be represented by one variant at a time.
    pub variant: AppVariant,
    /// Indicates that the main application loop should be broken and thus the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Starts in the menu, or right in a game if the difficulty is known already.
    pub fn new(difficulty: Option<u8>, seed: Option<u64>) -> Result<App, GameError> {
        Ok(App {
            variant: if let Some(level) = difficulty {
                AppVariant::InGame(AppGame::new(Difficulty::new(level)?, seed)?)
            } else {
                AppVariant::InMenu(AppMenu::new(Difficulty::default(), seed))
            },
            should_quit: false,
        })
    }

    /// Advances the game clock, if there's a game.
    pub fn tick(&mut self) {
        if let AppVariant::InGame(game) = &mut self.variant {
            game.game.tick();
        }
    }

    /// Carries out the leave and quit requests collected while handling the last event.
    pub fn process_requests(&mut self) {
        match &self.variant {
            AppVariant::InMenu(menu) if menu.should_quit => self.quit(),
            AppVariant::InGame(game) => {
                if game.should_leave {
                    self.back_to_menu()
                } else if game.should_emergency_leave {
                    self.quit()
                }
            }
            _ => (),
        };
    }

    pub fn back_to_menu(&mut self) {
        if let AppVariant::InGame(game) = &self.variant {
            self.variant = AppVariant::InMenu(AppMenu::new(game.game.difficulty(), game.seed));
        };
    }

    /// Quit the application altogether.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

impl ControlsSupport for App {
    fn move_cursor(&mut self, direction: MoveCursorDirection) {
        self.variant.move_cursor(direction);
    }

    fn perform_main_action(&mut self) {
        self.variant.perform_main_action()
    }

    fn perform_secondary_action(&mut self) {
        self.variant.perform_secondary_action()
    }

    fn leave(&mut self, force: bool) {
        self.variant.leave(force);
    }
}

impl Render for App {
    fn render(&mut self, frame: &mut Frame) {
        self.variant.render(frame);
    }
}

/// The current application variant.
#[derive(Debug)]
pub enum AppVariant {
    /// When the menu's being displayed
    InMenu(AppMenu),
    /// When the game's being displayed
    InGame(AppGame),
}

impl ControlsSupport for AppVariant {
    fn move_cursor(&mut self, direction: MoveCursorDirection) {
        match self {
            AppVariant::InMenu(menu) => menu.move_cursor(direction),
            AppVariant::InGame(game) => game.move_cursor(direction),
        }
    }

    fn perform_main_action(&mut self) {
        match self {
            AppVariant::InMenu(menu) => match menu.create_new_game() {
                Ok(game) => *self = AppVariant::InGame(game),
                Err(error) => menu.error = Some(error),
            },
            AppVariant::InGame(game) => game.open_tile_or_restart_or_confirm_leave(),
        }
    }

    fn perform_secondary_action(&mut self) {
        match self {
            AppVariant::InMenu(menu) => menu.restore_default(),
            AppVariant::InGame(game) => game.toggle_flag(),
        }
    }

    fn leave(&mut self, force: bool) {
        match self {
            AppVariant::InMenu(menu) => {
                menu.quit();
            }
            AppVariant::InGame(game) => {
                if force {
                    game.emergency_leave();
                } else {
                    game.confirm_or_cancel_leave_or_leave();
                }
            }
        }
    }
}

impl Render for AppVariant {
    fn render(&mut self, frame: &mut Frame) {
        match self {
            AppVariant::InMenu(ref mut menu) => render_menu(menu, frame),
            AppVariant::InGame(ref mut game) => render_game(game, frame),
        }
    }
}

/// The Menu app variant
#[derive(Debug)]
pub struct AppMenu {
    pub difficulty: Difficulty,
    pub error: Option<GameError>,
    /// Passed on to the games started from the menu.
    seed: Option<u64>,
    should_quit: bool,
}

impl AppMenu {
    fn new(difficulty: Difficulty, seed: Option<u64>) -> Self {
        AppMenu {
            difficulty,
            error: None,
            seed,
            should_quit: false,
        }
    }

    /// Left and right make the game easier and harder, staying within the supported range.
    fn move_cursor(&mut self, direction: MoveCursorDirection) {
        let level = match direction {
            MoveCursorDirection::Left => self.difficulty.level().saturating_sub(1),
            MoveCursorDirection::Right => self.difficulty.level().saturating_add(1),
            MoveCursorDirection::Up | MoveCursorDirection::Down => return,
        };

        if let Ok(difficulty) = Difficulty::new(level) {
            self.difficulty = difficulty;
            self.error = None;
        }
    }

    fn create_new_game(&self) -> Result<AppGame, GameError> {
        AppGame::new(self.difficulty, self.seed)
    }

    fn restore_default(&mut self) {
        self.difficulty = Difficulty::default();
        self.error = None;
    }

    fn quit(&mut self) {
        self.should_quit = true
    }
}

/// The latest thing worth telling the player about.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Notice {
    Event(GameEvent),
    /// An action the rules didn't allow.
    Refused(GameError),
}

/// The Game app variant
#[derive(Debug)]
pub struct AppGame {
    /// The game instance.
    pub game: Game,
    /// The amount of rows that should be rendered in the field. Must always be less or equal to the field size.
    pub visible_rows_amount: u8,
    /// The amount of columns that should be rendered in the field. Must always be less or equal to the field size.
    pub visible_columns_amount: u8,
    /// The window is a sliding frame-view into the field, used when the field is too big to be displayed in the
    /// given container.
    ///
    /// The values are the first visible column and row, i.e. the `(x, y)` of the top-left visible tile.
    pub window_offset: (u8, u8),
    /// The `(x, y)` of the currently selected tile relative to the whole field.
    pub cursor_position: (u8, u8),
    pub notice: Option<Notice>,
    /// Whether the cancel key was pressed and now the game's in the state of waiting for a confirmation from the user
    /// to leave back to the menu.
    pub awaiting_leave_confirmation: bool,
    /// Whether the leave was confirmed and now it's allowed to go back to the menu.
    pub should_leave: bool,
    /// Whether the app should urgently leave without asking for a confirmation
    pub should_emergency_leave: bool,
    seed: Option<u64>,
}

impl AppGame {
    fn new(difficulty: Difficulty, seed: Option<u64>) -> Result<Self, GameError> {
        let mut game = seed.map_or_else(Game::new, Game::with_seed);
        game.set_difficulty(difficulty);
        game.start()?;

        Ok(AppGame {
            game,
            visible_rows_amount: 0,
            visible_columns_amount: 0,
            window_offset: (0, 0),
            cursor_position: (0, 0),
            notice: None,
            awaiting_leave_confirmation: false,
            should_leave: false,
            should_emergency_leave: false,
            seed,
        })
    }

    fn move_cursor(&mut self, direction: MoveCursorDirection) {
        use MoveCursorDirection::*;

        // don't move the cursor when the game's already finished
        if !self.game.is_running() {
            return;
        }

        let last = self.game.field_size().saturating_sub(1);
        let (cx, cy) = self.cursor_position;

        self.cursor_position = match direction {
            Up => (cx, cy.saturating_sub(1)),
            Left => (cx.saturating_sub(1), cy),
            Down => (cx, cmp::min(cy.saturating_add(1), last)),
            Right => (cmp::min(cx.saturating_add(1), last), cy),
        };

        self.follow_cursor();
    }

    /// Slides the window so that the cursor stays visible.
    pub fn follow_cursor(&mut self) {
        let size = self.game.field_size();
        let (cx, cy) = self.cursor_position;
        let (ox, oy) = self.window_offset;

        self.window_offset = (
            follow(ox, cx, self.visible_columns_amount, size),
            follow(oy, cy, self.visible_rows_amount, size),
        );
    }

    fn open_tile_or_restart_or_confirm_leave(&mut self) {
        if self.awaiting_leave_confirmation {
            self.leave();
            return;
        }

        if self.game.is_over() {
            // if the game has ended, start a new one
            match self.game.start() {
                Ok(()) => self.notice = None,
                Err(error) => self.notice = Some(Notice::Refused(error)),
            }
        } else {
            self.act(GameAction::OpenTile(self.cursor_position));
        }
    }

    fn toggle_flag(&mut self) {
        if self.game.is_running() && !self.awaiting_leave_confirmation {
            self.act(GameAction::ToggleFlag(self.cursor_position));
        }
    }

    /// Passes the action on to the game and remembers what came out of it.
    fn act(&mut self, action: GameAction) {
        if let Err(error) = self.game.take_action(action) {
            log::debug!("{:?} refused: {}", action, error);
            self.notice = Some(Notice::Refused(error));
        }

        for event in self.game.take_events() {
            log::info!("{:?}", event);
            self.notice = Some(Notice::Event(event));
        }
    }

    fn confirm_or_cancel_leave_or_leave(&mut self) {
        if self.game.is_over() {
            // if the game has ended, just leave without asking for confirmation
            self.leave();
        } else {
            // otherwise, ask for confirmation
            self.awaiting_leave_confirmation = !self.awaiting_leave_confirmation;
        }
    }

    fn leave(&mut self) {
        self.should_leave = true;
    }

    fn emergency_leave(&mut self) {
        self.should_emergency_leave = true;
    }
}

/// Returns the offset of a window of `visible` tiles out of `size` that keeps `cursor` in sight, moving the window as
/// little as possible.
fn follow(offset: u8, cursor: u8, visible: u8, size: u8) -> u8 {
    if visible == 0 {
        return offset;
    }

    let offset = if cursor < offset {
        cursor
    } else if cursor >= offset.saturating_add(visible) {
        cursor + 1 - visible
    } else {
        offset
    };

    cmp::min(offset, size.saturating_sub(visible))
}

#[cfg(test)]
mod test {
    use super::{follow, AppGame, Notice};
    use crate::update::MoveCursorDirection::*;
    use sapper::{Difficulty, GameEvent};

    #[test]
    fn the_window_follows_the_cursor_both_ways() {
        assert_eq!(follow(0, 3, 5, 10), 0);
        assert_eq!(follow(0, 5, 5, 10), 1);
        assert_eq!(follow(4, 2, 5, 10), 2);
        assert_eq!(follow(8, 9, 5, 10), 5);
        assert_eq!(follow(3, 3, 0, 10), 3);
    }

    #[test]
    fn the_cursor_stays_within_the_field() {
        let mut app_game = AppGame::new(Difficulty::MIN, Some(1)).unwrap();
        app_game.move_cursor(Up);
        app_game.move_cursor(Left);
        assert_eq!(app_game.cursor_position, (0, 0));

        for _ in 0..20 {
            app_game.move_cursor(Right);
            app_game.move_cursor(Down);
        }
        assert_eq!(app_game.cursor_position, (9, 9));
    }

    #[test]
    fn flagging_from_the_app_spends_a_flag_and_leaves_a_notice() {
        let mut app_game = AppGame::new(Difficulty::MIN, Some(1)).unwrap();
        app_game.toggle_flag();

        assert_eq!(app_game.game.total_flags_available(), 19);
        assert_eq!(app_game.notice, Some(Notice::Event(GameEvent::FlagPlaced)));
    }
}
