//! The game renderer functions.

use crate::app::{AppGame, Notice};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::Frame,
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Row, Table, Widget},
};
use sapper::field::tile::{Tile, TileKind, TileState};
use sapper::{GameError, GameEvent, GameStatus};
use std::cmp;
use std::time::Duration;

/// The arrows telling that there are more tiles to the top/left/bottom/right (respectively) of the visible part of the
/// field.
///
/// The same order is used for everything arrow-related in this module.
const ARROW_SYMBOLS: [&str; 4] = ["↑", "←", "↓", "→"];
/// The space between the field's border and the tiles. The arrows are drawn over the border.
const FIELD_PADDING: u16 = 1;
/// The number of terminal rows a single tile occupies (including its border).
const TILE_HEIGHT: u16 = 3;
/// The number of terminal columns a single tile occupies (including its border).
const TILE_WIDTH: u16 = 5;

const COVERED_TILE_SYMBOL: &str = "███";
const FLAG_SYMBOL: &str = " 🚩";
const MINE_SYMBOL: &str = " 💣";
const DETONATED_MINE_SYMBOL: &str = " 💥";
const WRONG_FLAG_SYMBOL: &str = " ❌";
const CLOCK_SYMBOL: &str = "🕓";
/// Indexed by the number of mines around a tile.
const RANK_COLORS: [Color; 9] = [
    Color::Black,
    Color::Blue,
    Color::Green,
    Color::Red,
    Color::Magenta,
    Color::Cyan,
    Color::LightRed,
    Color::Black,
    Color::DarkGray,
];
const TILE_COLOR: Color = Color::Yellow;
const TILE_PALE_COLOR: Color = Color::LightYellow;
const APP_BG_COLOR: Color = Color::White;
const FIELD_BORDER_COLOR: Color = Color::Yellow;
const FIELD_BORDER_PALE_COLOR: Color = Color::LightYellow;
const OUTCOME_POPUP_VICTORY_BORDER_COLOR: Color = Color::Green;
const OUTCOME_POPUP_LOSS_BORDER_COLOR: Color = Color::Red;
const LEAVE_CONFIRMATION_POPUP_BORDER_COLOR: Color = Color::Red;
const INFO_WIDGET_BLOCK_COLOR: Color = Color::LightYellow;
const REGULAR_TEXT_COLOR: Color = Color::Black;
const REFUSAL_TEXT_COLOR: Color = Color::Red;
const LEGEND_TEXT_COLOR: Color = Color::DarkGray;

const LEGEND_TEXT: [&str; 4] = [
    "[↑][←][↓][→] / [w][a][s][d] / [i][j][k][l]: move the cursor",
    "[SPACE] / [ENTER]: open the selected tile",
    "[f]: place or remove a flag (removed flags are not given back!)",
    "[q] / [ESC]: leave",
];
const VICTORY_LINE_TEXT: &str = "All the mines are flagged. You won!";
const LOSS_LINE_TEXT: &str = "Boom. You lost... Wanna try again?";
const OUTCOME_POPUP_TEXT: [&str; 4] = [
    "",
    "Use:",
    "[SPACE] / [ENTER] to play again",
    "[q] / [ESC] to leave back to the menu",
];
const LEAVE_CONFIRMATION_POPUP_TEXT: [&str; 6] = [
    "Are you sure you want to leave?",
    "The game will be lost!",
    "",
    "Use:",
    "[SPACE] / [ENTER] - CONFIRM",
    "[q] / [ESC] - CANCEL",
];

pub fn render_game(app: &mut AppGame, frame: &mut Frame) {
    let root_container = frame.size();

    let (field_container, (flags_info_container, mines_info_container, time_info_container), notice_container, legend_container) =
        create_app_layout(&root_container);

    let field_size = app.game.field_size();

    // figure out how much of the field fits into the container and keep the cursor in sight
    app.visible_columns_amount = calculate_visible_amount(field_container.width, TILE_WIDTH, field_size);
    app.visible_rows_amount = calculate_visible_amount(field_container.height, TILE_HEIGHT, field_size);
    app.follow_cursor();

    let grid_container = center_grid(
        &field_container,
        app.visible_columns_amount as u16 * TILE_WIDTH,
        app.visible_rows_amount as u16 * TILE_HEIGHT,
    );

    // 1. The background
    frame.render_widget(Block::default().bg(APP_BG_COLOR), root_container);

    // 2. The field border with the arrows on top of it
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(FIELD_BORDER_COLOR)),
        field_container,
    );

    let (offset_x, offset_y) = app.window_offset;
    let hidden_tiles = [
        offset_y > 0,
        offset_x > 0,
        offset_y as u16 + (app.visible_rows_amount as u16) < field_size as u16,
        offset_x as u16 + (app.visible_columns_amount as u16) < field_size as u16,
    ];

    for (i, arrow_container) in arrow_containers(&field_container).into_iter().enumerate() {
        if hidden_tiles[i] {
            frame.render_widget(Paragraph::new(ARROW_SYMBOLS[i]).fg(FIELD_BORDER_PALE_COLOR), arrow_container);
        }
    }

    // 3. The visible tiles
    let game_lost = app.game.status() == GameStatus::Over { victory: false };

    for (row, row_containers) in build_grid_layout(&grid_container, app.visible_rows_amount, app.visible_columns_amount)
        .into_iter()
        .enumerate()
    {
        for (column, tile_container) in row_containers.into_iter().enumerate() {
            let position = (column as u8 + offset_x, row as u8 + offset_y);

            // the window never goes beyond the field, but the layout may get ahead of a just restarted game
            if let Ok(tile) = app.game.get_tile(position.0, position.1) {
                let selected = app.cursor_position == position;
                frame.render_widget(build_tile_widget(tile, selected, game_lost), tile_container);
            }
        }
    }

    // 4. The stats
    frame.render_widget(
        build_info_widget(app.game.total_flags_available().to_string(), FLAG_SYMBOL.trim()),
        flags_info_container,
    );
    frame.render_widget(
        build_info_widget(app.game.mine_count().to_string(), MINE_SYMBOL.trim()),
        mines_info_container,
    );
    frame.render_widget(
        build_info_widget(format_duration(app.game.elapsed_time()), CLOCK_SYMBOL),
        time_info_container,
    );

    // 5. The latest notice and the legend
    if let Some(notice) = app.notice {
        frame.render_widget(build_notice_widget(notice), notice_container);
    }
    frame.render_widget(build_legend_widget(), legend_container);

    // 6. The popups
    if let GameStatus::Over { victory } = app.game.status() {
        let (first_line, border_color) = if victory {
            (VICTORY_LINE_TEXT, OUTCOME_POPUP_VICTORY_BORDER_COLOR)
        } else {
            (LOSS_LINE_TEXT, OUTCOME_POPUP_LOSS_BORDER_COLOR)
        };

        let time_line = format!("Time: {}", format_duration(app.game.elapsed_time()));
        let lines = [first_line.to_string(), time_line]
            .into_iter()
            .chain(OUTCOME_POPUP_TEXT.map(String::from));

        render_popup(frame, lines, border_color);
    }

    if app.awaiting_leave_confirmation {
        render_popup(
            frame,
            LEAVE_CONFIRMATION_POPUP_TEXT.map(String::from),
            LEAVE_CONFIRMATION_POPUP_BORDER_COLOR,
        );
    }
}

/// Splits the screen into the field, the stats (flags left, mines and time), the notice line and the legend.
fn create_app_layout(container: &Rect) -> (Rect, (Rect, Rect, Rect), Rect, Rect) {
    // 2 rows for the borders and one for the contents
    let stats_container_height = 3;
    let notice_container_height = 1;
    let legend_container_height = LEGEND_TEXT.len() as u16;
    // the field gets all that's left
    let field_container_height = container
        .height
        .saturating_sub(stats_container_height + notice_container_height + legend_container_height);

    let app_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(Constraint::from_lengths([
            field_container_height,
            stats_container_height,
            notice_container_height,
            legend_container_height,
        ]))
        .split(*container);

    let field_container = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(Constraint::from_percentages([10, 80, 10]))
        .split(app_layout[0])[1];

    let stats_container = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(Constraint::from_percentages([25, 50, 25]))
        .split(app_layout[1])[1];

    let stats = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(Constraint::from_percentages([33, 34, 33]))
        .split(stats_container);

    let legend_container = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(Constraint::from_percentages([5, 90, 5]))
        .split(app_layout[3])[1];

    (field_container, (stats[0], stats[1], stats[2]), app_layout[2], legend_container)
}

/// The number of whole tiles of the given size fitting into `space` (the padding around the tiles excluded), but never
/// more than the field has.
fn calculate_visible_amount(space: u16, tile_size: u16, field_size: u8) -> u8 {
    let fitting = space.saturating_sub(FIELD_PADDING * 2) / tile_size;
    cmp::min(fitting, field_size as u16) as u8
}

/// Returns the rectangle of the given size in the middle of the field container.
///
/// The grid size is always a multiple of the tile size, so that no tile gets cut or stretched. Whatever's left is
/// spread around the grid.
fn center_grid(field_container: &Rect, width: u16, height: u16) -> Rect {
    let width = cmp::min(width, field_container.width);
    let height = cmp::min(height, field_container.height);

    Rect {
        x: field_container.x + (field_container.width - width) / 2,
        y: field_container.y + (field_container.height - height) / 2,
        width,
        height,
    }
}

/// The single-character rectangles in the middle of each side of the field border: top, left, bottom and right.
fn arrow_containers(field_container: &Rect) -> [Rect; 4] {
    let Rect { x, y, width, height } = *field_container;
    let (middle_x, middle_y) = (x + width / 2, y + height / 2);
    let (right, bottom) = (x + width.saturating_sub(1), y + height.saturating_sub(1));
    let arrow = |x, y| Rect { x, y, width: 1, height: 1 };

    [arrow(middle_x, y), arrow(x, middle_y), arrow(middle_x, bottom), arrow(right, middle_y)]
}

/// The grid is a 2D vector of the tiles' rectangles, rows first.
fn build_grid_layout(container: &Rect, rows_amount: u8, columns_amount: u8) -> Vec<Vec<Rect>> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints((0..rows_amount).map(|_| Constraint::Length(TILE_HEIGHT)))
        .split(*container)
        .iter()
        .map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints((0..columns_amount).map(|_| Constraint::Length(TILE_WIDTH)))
                .split(*row)
                .to_vec()
        })
        .collect()
}

/// Renders the lines in a bordered box in the middle of the screen.
///
/// The box is just big enough for the text.
fn render_popup(frame: &mut Frame, lines: impl IntoIterator<Item = String>, border_color: Color) {
    let lines: Vec<String> = lines.into_iter().collect();
    let root = frame.size();

    let popup_height = cmp::min(lines.len() as u16 + 2, root.height);
    let popup_width = cmp::min(
        lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as u16 + 2,
        root.width,
    );

    let container = Rect {
        x: root.x + (root.width - popup_width) / 2,
        y: root.y + (root.height - popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    let block = Block::default()
        .bg(APP_BG_COLOR)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let text = Paragraph::new(lines.join("\n"))
        .fg(REGULAR_TEXT_COLOR)
        .alignment(Alignment::Center)
        .block(block);

    // clear whatever's been rendered there before
    frame.render_widget(Clear, container);
    frame.render_widget(text, container);
}

/// What a tile looks like. After a loss the flags that were put on safe tiles are crossed out.
fn tile_symbol(tile: &Tile, game_lost: bool) -> String {
    match (tile.state(), tile.kind()) {
        (TileState::Covered, _) => COVERED_TILE_SYMBOL.to_string(),
        (TileState::Flagged, TileKind::Safe(_)) if game_lost => WRONG_FLAG_SYMBOL.to_string(),
        (TileState::Flagged, _) => FLAG_SYMBOL.to_string(),
        (TileState::Detonated, _) => DETONATED_MINE_SYMBOL.to_string(),
        (TileState::Open, TileKind::Mine) => MINE_SYMBOL.to_string(),
        (TileState::Open, TileKind::Safe(0)) => "   ".to_string(),
        (TileState::Open, TileKind::Safe(mines_around)) => format!(" {mines_around} "),
    }
}

fn build_tile_widget(tile: &Tile, selected: bool, game_lost: bool) -> impl Widget {
    let border_color = if selected { TILE_COLOR } else { TILE_PALE_COLOR };

    let text_color = match (tile.state(), tile.kind()) {
        (TileState::Open, TileKind::Safe(mines_around)) => {
            RANK_COLORS.get(mines_around as usize).copied().unwrap_or(REGULAR_TEXT_COLOR)
        }
        _ => border_color,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(border_color));

    Paragraph::new(tile_symbol(tile, game_lost)).fg(text_color).block(block)
}

fn build_info_widget(contents: String, title: &str) -> impl Widget + '_ {
    Paragraph::new(contents)
        .fg(REGULAR_TEXT_COLOR)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Thick)
                .border_style(Style::default().fg(INFO_WIDGET_BLOCK_COLOR)),
        )
}

fn describe_notice(notice: Notice) -> String {
    match notice {
        Notice::Event(event) => match event {
            GameEvent::FlagPlaced => "Flag placed",
            GameEvent::FlagRemoved | GameEvent::WrongFlagRemoved => "Flag removed. The flag is gone for good",
            GameEvent::TileOpened => "Tile opened",
            GameEvent::GameOver => "Game over",
            GameEvent::GameWin => "Victory",
        }
        .to_string(),
        Notice::Refused(GameError::NoFlagsLeft) => "No flags left".to_string(),
        Notice::Refused(GameError::TileNotCovered(_)) => "This tile can't be opened or flagged".to_string(),
        Notice::Refused(error) => error.to_string(),
    }
}

fn build_notice_widget(notice: Notice) -> impl Widget {
    let color = match notice {
        Notice::Event(_) => LEGEND_TEXT_COLOR,
        Notice::Refused(_) => REFUSAL_TEXT_COLOR,
    };

    Paragraph::new(describe_notice(notice)).fg(color).alignment(Alignment::Center)
}

/// Formats the elapsed time as `MM:SS`.
fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:0>2}:{:0>2}", seconds / 60, seconds % 60)
}

/// The controls, keys to the left of the `:` and their meaning to the right.
fn build_legend_widget() -> impl Widget {
    let rows = LEGEND_TEXT.map(|legend_row| {
        let (keys, meaning) = legend_row.split_once(':').unwrap_or((legend_row, ""));

        Row::new([
            Line::from(keys).alignment(Alignment::Right),
            Line::from(format!(":{meaning}")).alignment(Alignment::Left),
        ])
    });

    Table::new(rows, Constraint::from_percentages([50, 50])).fg(LEGEND_TEXT_COLOR)
}
