pub mod clock;
pub mod field;

use clock::GameClock;
use field::tile::{Tile, TileState};
use field::{Field, FieldError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong when driving a game.
///
/// A failed operation never changes the state of the game.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Something's wrong with the field, e.g. a position beyond its bounds.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// The value is the rejected difficulty level.
    #[error("difficulty {0} is out of range")]
    InvalidDifficulty(u8),
    /// The game hasn't been started yet or has already ended.
    #[error("the game is not running")]
    NotRunning,
    /// The flag budget has been used up.
    #[error("there are no flags left")]
    NoFlagsLeft,
    #[error("tile {0:?} is not covered")]
    TileNotCovered((u8, u8)),
    #[error("tile {0:?} is not flagged")]
    TileNotFlagged((u8, u8)),
    /// Only an open tile with no mines around can spread to its neighbours.
    #[error("tile {0:?} is not an open tile with no mines around")]
    TileNotEmpty((u8, u8)),
}

/// The difficulty level. Everything about a game's setup is derived from it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Difficulty = Difficulty(1);
    /// The highest level whose field still fits the `u8` coordinates.
    pub const MAX: Difficulty = Difficulty(25);

    pub fn new(level: u8) -> Result<Self, GameError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&level) {
            Ok(Difficulty(level))
        } else {
            Err(GameError::InvalidDifficulty(level))
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Ten mines per level.
    pub fn mine_count(self) -> u16 {
        self.0 as u16 * 10
    }

    /// `trunc(max(level - 0.8, 1) * 10)`, i.e. 10, 12, 22, 32 and so on.
    pub fn field_size(self) -> u8 {
        cmp::max(self.0 as u16 * 10 - 8, 10) as u8
    }

    /// The number of flags a player may place during a game. Removing a flag doesn't give it back.
    pub fn flag_budget(self) -> u16 {
        (self.0 as u16 + 1) * 10
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::MIN
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The status of a game.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameStatus {
    /// No game has been started yet.
    NotStarted,
    /// An ongoing game.
    Running,
    /// A finished game. `true` for victory, `false` for loss.
    Over { victory: bool },
}

impl GameStatus {
    pub fn is_running(self) -> bool {
        self == GameStatus::Running
    }

    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::Over { .. })
    }

    pub fn is_victory(self) -> bool {
        self == GameStatus::Over { victory: true }
    }
}

/// Describes all the possible actions a player can take.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameAction {
    /// A request to open a tile by its `(x, y)` position.
    OpenTile((u8, u8)),
    /// A request to place or remove a flag.
    ToggleFlag((u8, u8)),
}

/// Things worth telling the player about, e.g. with a sound.
///
/// The game only queues them; see [`Game::take_events`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameEvent {
    FlagPlaced,
    /// A flag was taken off a mine.
    FlagRemoved,
    TileOpened,
    /// A flag was taken off a safe tile.
    WrongFlagRemoved,
    GameOver,
    GameWin,
}

/// The game engine.
///
/// It owns the field and all the bookkeeping: the clock, the flag budget and the number of correctly flagged mines.
/// The game is won by flagging every mine before the flag budget runs out, and lost by opening a mine or by running
/// out of flags.
#[derive(Debug)]
pub struct Game {
    /// The difficulty the next `start` uses.
    difficulty: Difficulty,
    field: Field,
    status: GameStatus,
    clock: GameClock,
    /// The number of mines in the current field.
    mine_count: u16,
    total_flags_available: u16,
    flags_placed_on_mines: u16,
    /// Not yet collected events.
    events: Vec<GameEvent>,
    rng: StdRng,
}

impl Game {
    /// Creates a game with an entropy-seeded mine placement.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a game whose fields are fully determined by the seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Game {
            difficulty: Difficulty::default(),
            field: Field::new(0),
            status: GameStatus::NotStarted,
            clock: GameClock::default(),
            mine_count: 0,
            total_flags_available: 0,
            flags_placed_on_mines: 0,
            events: Vec::new(),
            rng,
        }
    }

    /// Sets the difficulty for the next game. The ongoing one (if any) is not affected.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// (Re)starts the game with a freshly generated field for the current difficulty.
    ///
    /// Whatever happened before is discarded.
    pub fn start(&mut self) -> Result<(), GameError> {
        let mut field = Field::new(self.difficulty.field_size());

        if let Err(error) = field.populate_with_mines(self.difficulty.mine_count(), &mut self.rng) {
            log::warn!("Couldn't generate a field for difficulty {}: {}", self.difficulty, error);
            return Err(error.into());
        }

        self.start_with_field(field)
    }

    /// (Re)starts the game on a ready-made field. The flag budget still comes from the current difficulty.
    ///
    /// Every tile of the field gets covered first. A field without mines or without safe tiles is refused.
    pub fn start_with_field(&mut self, mut field: Field) -> Result<(), GameError> {
        field.check_playable()?;
        field.cover_all();

        self.mine_count = field.mines_amount();
        self.field = field;
        self.total_flags_available = self.difficulty.flag_budget();
        self.flags_placed_on_mines = 0;
        self.status = GameStatus::Running;
        self.events.clear();

        self.clock.reset();
        self.start_clock();

        log::info!(
            "Started a {size}x{size} game with {} mines and {} flags",
            self.mine_count,
            self.total_flags_available,
            size = self.field.size(),
        );

        Ok(())
    }

    /// Performs the requested action and returns the resulting status.
    pub fn take_action(&mut self, action: GameAction) -> Result<GameStatus, GameError> {
        log::debug!("Taking {:?}", action);

        match action {
            GameAction::OpenTile((x, y)) => self.open_tile(x, y),
            GameAction::ToggleFlag((x, y)) => self.toggle_flag(x, y),
        }
    }

    /// Opens a covered tile.
    ///
    /// Opening a mine loses the game. Opening a tile with no mines around also opens the whole empty region it
    /// belongs to.
    pub fn open_tile(&mut self, x: u8, y: u8) -> Result<GameStatus, GameError> {
        self.check_running()?;

        let tile = self.field.get_tile((x, y))?;
        if !tile.is_covered() {
            return Err(GameError::TileNotCovered((x, y)));
        }

        if tile.is_mine() {
            log::info!("Stepped on the mine at {:?}", (x, y));
            self.field.get_tile_mut((x, y))?.set_state(TileState::Detonated);
            self.defeat()?;
        } else {
            let empty = tile.mines_around() == Some(0);
            self.field.get_tile_mut((x, y))?.set_state(TileState::Open);
            self.events.push(GameEvent::TileOpened);

            if empty {
                let opened = self.field.open_empty_adjacent_tiles((x, y))?;
                log::debug!("Opened {} more tiles around {:?}", opened, (x, y));
            }
        }

        Ok(self.status)
    }

    /// Opens the covered neighbours of an open tile with no mines around, spreading through the ones with no mines
    /// around either. [`Game::open_tile`] does this on its own.
    ///
    /// Returns the number of tiles opened. A single `TileOpened` event is queued if there were any.
    pub fn open_empty_adjacent_tiles(&mut self, x: u8, y: u8) -> Result<usize, GameError> {
        self.check_running()?;

        let tile = self.field.get_tile((x, y))?;
        if !tile.is_open() || tile.mines_around() != Some(0) {
            return Err(GameError::TileNotEmpty((x, y)));
        }

        let opened = self.field.open_empty_adjacent_tiles((x, y))?;
        log::debug!("Opened {} tiles around {:?}", opened, (x, y));

        if opened > 0 {
            self.events.push(GameEvent::TileOpened);
        }

        Ok(opened)
    }

    /// Places a flag if the tile is covered and removes it if it's flagged.
    pub fn toggle_flag(&mut self, x: u8, y: u8) -> Result<GameStatus, GameError> {
        self.check_running()?;

        match self.field.get_tile((x, y))?.state() {
            TileState::Flagged => self.remove_flag(x, y),
            _ => self.place_flag(x, y),
        }
    }

    /// Flags a covered tile, spending one flag of the budget.
    pub fn place_flag(&mut self, x: u8, y: u8) -> Result<GameStatus, GameError> {
        self.check_running()?;

        let tile = self.field.get_tile((x, y))?;
        if !tile.is_covered() {
            return Err(GameError::TileNotCovered((x, y)));
        }
        if self.total_flags_available == 0 {
            return Err(GameError::NoFlagsLeft);
        }

        let is_mine = tile.is_mine();
        self.field.get_tile_mut((x, y))?.set_state(TileState::Flagged);
        self.events.push(GameEvent::FlagPlaced);
        self.on_flag_placed(is_mine);

        Ok(self.status)
    }

    /// Takes a flag off a tile. The spent flag is not returned to the budget.
    pub fn remove_flag(&mut self, x: u8, y: u8) -> Result<GameStatus, GameError> {
        self.check_running()?;

        let tile = self.field.get_tile((x, y))?;
        if !tile.is_flagged() {
            return Err(GameError::TileNotFlagged((x, y)));
        }

        let is_mine = tile.is_mine();
        self.field.get_tile_mut((x, y))?.set_state(TileState::Covered);
        self.on_flag_removed(is_mine);

        Ok(self.status)
    }

    fn on_flag_placed(&mut self, is_mine: bool) {
        self.total_flags_available -= 1;

        if is_mine {
            self.flags_placed_on_mines += 1;
        }

        let all_mines_flagged = self.flags_placed_on_mines == self.mine_count;

        if all_mines_flagged || self.total_flags_available == 0 {
            self.end(all_mines_flagged);
        }
    }

    fn on_flag_removed(&mut self, is_mine: bool) {
        if is_mine {
            self.flags_placed_on_mines = self.flags_placed_on_mines.saturating_sub(1);
            self.events.push(GameEvent::FlagRemoved);
        } else {
            self.events.push(GameEvent::WrongFlagRemoved);
        }
    }

    /// Ends the ongoing game with a loss.
    pub fn defeat(&mut self) -> Result<(), GameError> {
        self.check_running()?;
        self.end(false);
        Ok(())
    }

    /// Ends the ongoing game with a victory.
    pub fn victory(&mut self) -> Result<(), GameError> {
        self.check_running()?;
        self.end(true);
        Ok(())
    }

    fn end(&mut self, victory: bool) {
        self.status = GameStatus::Over { victory };
        self.stop_clock();
        self.field.show_mines();

        self.events.push(if victory {
            GameEvent::GameWin
        } else {
            GameEvent::GameOver
        });

        log::info!(
            "Game over: {} after {}s, {} of {} mines flagged, {} flags left",
            if victory { "victory" } else { "loss" },
            self.clock.get_elapsed_time().as_secs(),
            self.flags_placed_on_mines,
            self.mine_count,
            self.total_flags_available,
        );
    }

    fn start_clock(&mut self) {
        if !self.clock.start() {
            log::debug!("The clock is already running");
        }
    }

    fn stop_clock(&mut self) {
        if !self.clock.stop() {
            log::debug!("The clock is already stopped");
        }
    }

    /// Advances the elapsed time by one tick if the game is running. Returns whether it did.
    pub fn tick(&mut self) -> bool {
        self.clock.tick()
    }

    /// Returns all the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn check_running(&self) -> Result<(), GameError> {
        if self.status.is_running() {
            Ok(())
        } else {
            Err(GameError::NotRunning)
        }
    }

    pub fn get_tile(&self, x: u8, y: u8) -> Result<&Tile, GameError> {
        Ok(self.field.get_tile((x, y))?)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The length of a side of the current field (`0` before the first start).
    pub fn field_size(&self) -> u8 {
        self.field.size()
    }

    pub fn mine_count(&self) -> u16 {
        self.mine_count
    }

    pub fn total_flags_available(&self) -> u16 {
        self.total_flags_available
    }

    pub fn flags_placed_on_mines(&self) -> u16 {
        self.flags_placed_on_mines
    }

    /// The number of flags currently on the field.
    pub fn flags_on_board(&self) -> u16 {
        self.field.flagged_tiles_amount()
    }

    pub fn elapsed_time(&self) -> Duration {
        self.clock.get_elapsed_time()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn is_victory(&self) -> bool {
        self.status.is_victory()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
