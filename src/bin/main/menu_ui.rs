//! The menu renderer.
//!
//! The only setting is the difficulty, everything else about the game is derived from it and shown next to it.

use crate::app::AppMenu;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::Frame,
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Widget},
};
use sapper::Difficulty;
use std::cmp;

const LEGEND_TEXT: [&str; 4] = [
    "[←][→] / [a][d] / [j][l]: make the game easier / harder",
    "[SPACE] / [ENTER]: start the game",
    "[f]: restore the default difficulty",
    "[q] / [ESC]: quit",
];
const MENU_WIDTH: u16 = 40;
const MENU_BORDER_COLOR: Color = Color::Yellow;
const SELECTOR_COLOR: Color = Color::Yellow;
const DETAILS_TEXT_COLOR: Color = Color::DarkGray;
const LEGEND_TEXT_COLOR: Color = Color::DarkGray;

pub fn render_menu(menu: &mut AppMenu, frame: &mut Frame) {
    let root_container = frame.size();

    let (menu_container, error_container, legend_container) = create_app_layout(&root_container);
    let details = describe_difficulty(menu.difficulty);
    let (menu_container, selector_container, details_container) =
        create_menu_layout(&menu_container, details.len() as u16);

    // 1. The background
    frame.render_widget(Block::default().bg(Color::White), root_container);

    // 2. The difficulty selector and what it means for the game
    frame.render_widget(
        Paragraph::new(format_selector(menu.difficulty))
            .alignment(Alignment::Center)
            .style(Style::default().bg(SELECTOR_COLOR).fg(Color::White)),
        selector_container,
    );
    frame.render_widget(
        Paragraph::new(details.join("\n"))
            .alignment(Alignment::Center)
            .fg(DETAILS_TEXT_COLOR),
        details_container,
    );

    // 3. The border around the menu
    frame.render_widget(
        Block::default()
            .title("Sapper")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(MENU_BORDER_COLOR)),
        menu_container,
    );

    // 4. The error (if any)
    if let Some(error) = &menu.error {
        frame.render_widget(
            Paragraph::new(format!("Couldn't start the game: {error}"))
                .alignment(Alignment::Center)
                .red(),
            error_container,
        )
    }

    // 5. The legend
    frame.render_widget(build_legend_widget(), legend_container);
}

/// `< 3 >`, with the arrows only where the difficulty can still be changed to.
fn format_selector(difficulty: Difficulty) -> String {
    let left = if difficulty > Difficulty::MIN { "<" } else { " " };
    let right = if difficulty < Difficulty::MAX { ">" } else { " " };

    format!("\nDifficulty: {left} {difficulty} {right}")
}

fn describe_difficulty(difficulty: Difficulty) -> [String; 3] {
    let size = difficulty.field_size();

    [
        format!("Field: {size}x{size}"),
        format!("Mines: {}", difficulty.mine_count()),
        format!("Flags: {}", difficulty.flag_budget()),
    ]
}

/// The menu on top, then a line for errors and the legend at the bottom.
fn create_app_layout(container: &Rect) -> (Rect, Rect, Rect) {
    // 1 line of text with 1 line of padding above and below
    let error_container_height = 3;
    let legend_container_height = LEGEND_TEXT.len() as u16;
    let menu_container_height = container
        .height
        .saturating_sub(error_container_height + legend_container_height);

    let vertical_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(Constraint::from_lengths([
            menu_container_height,
            error_container_height,
            legend_container_height,
        ]))
        .split(*container);

    let error_container = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(Constraint::from_percentages([0, 100, 0]))
        .margin(1)
        .split(vertical_layout[1])[1];

    let legend_container = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(Constraint::from_percentages([5, 90, 5]))
        .split(vertical_layout[2])[1];

    (vertical_layout[0], error_container, legend_container)
}

/// Centers a fixed-width menu in the container and splits it into the selector and the details below it.
fn create_menu_layout(container: &Rect, details_lines_amount: u16) -> (Rect, Rect, Rect) {
    // the selector's 3 rows, the details, a blank line between them and the border
    let menu_height = cmp::min(3 + 1 + details_lines_amount + 2, container.height);
    let menu_width = cmp::min(MENU_WIDTH, container.width);

    let menu_container = Rect {
        x: container.x + (container.width - menu_width) / 2,
        y: container.y + (container.height - menu_height) / 2,
        width: menu_width,
        height: menu_height,
    };

    let items = Layout::default()
        .direction(Direction::Vertical)
        .constraints(Constraint::from_lengths([3, 1, details_lines_amount]))
        .margin(1)
        .split(menu_container);

    (menu_container, items[0], items[2])
}

fn build_legend_widget() -> impl Widget {
    let rows = LEGEND_TEXT.map(|legend_line| {
        let (keys, meaning) = legend_line.split_once(':').unwrap_or((legend_line, ""));

        Row::new([
            Line::from(keys).alignment(Alignment::Right),
            Line::from(format!(":{meaning}")).alignment(Alignment::Left),
        ])
    });

    Table::new(rows, Constraint::from_percentages([50, 50])).fg(LEGEND_TEXT_COLOR)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn the_selector_hides_the_arrows_at_the_bounds() {
        assert_eq!(format_selector(Difficulty::MIN), "\nDifficulty:   1 >");
        assert_eq!(format_selector(Difficulty::new(7).unwrap()), "\nDifficulty: < 7 >");
        assert_eq!(format_selector(Difficulty::MAX), "\nDifficulty: < 25  ");
    }

    #[test]
    fn the_details_follow_the_difficulty() {
        assert_eq!(
            describe_difficulty(Difficulty::new(2).unwrap()),
            ["Field: 12x12", "Mines: 20", "Flags: 30"]
        );
    }
}
