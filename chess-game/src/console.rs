//! 控制台命令解析和棋盘文本输出

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chess_rules::{Color, Fen, Phase, PieceType, Position, WinReason, BOARD_SIZE};

use crate::game::format_clock;
use crate::session::{Action, GameSession};
use crate::settings::SettingKey;

/// 控制台命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `moves <row-col>`：列出合法目标
    Moves(Position),
    /// `move <row-col> <row-col>`
    Move(Position, Position),
    /// `remove <row-col>`
    Remove(Position),
    /// `select <piece>`
    Select(PieceType),
    /// `place <row-col>`
    Place(Position),
    Show,
    /// 列出已发生的操作
    History,
    /// 显示当前设置
    Settings,
    /// `set <time|removals|draft|log>`：切换到下一个选项
    Set(SettingKey),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("空命令"))?;
        let args: Vec<&str> = words.collect();

        let expect_args = |count: usize| -> Result<()> {
            if args.len() != count {
                bail!("{} 需要 {} 个参数，实际 {} 个", name, count, args.len());
            }
            Ok(())
        };
        let position = |text: &str| -> Result<Position> {
            text.parse::<Position>()
                .with_context(|| format!("无效的位置: {}", text))
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "moves" => {
                expect_args(1)?;
                Command::Moves(position(args[0])?)
            }
            "move" => {
                expect_args(2)?;
                Command::Move(position(args[0])?, position(args[1])?)
            }
            "remove" => {
                expect_args(1)?;
                Command::Remove(position(args[0])?)
            }
            "select" => {
                expect_args(1)?;
                Command::Select(args[0].parse::<PieceType>()?)
            }
            "place" => {
                expect_args(1)?;
                Command::Place(position(args[0])?)
            }
            "show" => Command::Show,
            "history" => Command::History,
            "settings" => Command::Settings,
            "set" => {
                expect_args(1)?;
                Command::Set(args[0].parse::<SettingKey>()?)
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("未知命令: {}", other),
        };

        Ok(command)
    }
}

pub const HELP: &str = "\
commands:
  moves <row-col>            list legal destinations
  move <row-col> <row-col>   move a piece
  remove <row-col>           remove an empty square
  select <piece>             pick a piece from the draft pool
  place <row-col>            place the selected piece
  show                       print the board
  history                    list actions so far
  settings                   print the settings
  set <time|removals|draft|log>
                             cycle a setting; applies to a game nobody has moved in yet
  quit";

/// 棋盘文本：白方大写，黑方小写，空格为 `.`，被移除的格子为 `x`
pub fn render_board(session: &GameSession) -> String {
    let state = session.state();
    let mut out = String::new();

    for row in 0..BOARD_SIZE as u8 {
        out.push_str(&row.to_string());
        out.push(' ');
        for col in 0..BOARD_SIZE as u8 {
            let pos = Position::new_unchecked(row, col);
            let c = if state.removed_squares.contains(pos) {
                'x'
            } else {
                state.board.get(pos).map(|piece| piece.to_fen_char()).unwrap_or('.')
            };
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("  01234567");
    out
}

/// 状态行：阶段、行动方、剩余移除次数、双方时间和 FEN 布局
pub fn render_status(session: &GameSession) -> String {
    let state = session.state();
    let clocks = format!(
        "white {} | black {}\nfen {}",
        format_clock(session.remaining_ms(Color::White)),
        format_clock(session.remaining_ms(Color::Black)),
        Fen::board_to_string(&state.board)
    );

    match &state.phase {
        Phase::Draft(draft) => {
            let pool: Vec<&str> = draft
                .available(draft.current_player())
                .iter()
                .map(|p| p.name())
                .collect();
            let selected = draft.selected().map(|p| p.name()).unwrap_or("-");
            format!(
                "draft: {} to place, selected {}, pool [{}]\n{}",
                draft.current_player(),
                selected,
                pool.join(", "),
                clocks
            )
        }
        Phase::Playing => {
            let check = if state.in_check() { " (check)" } else { "" };
            format!(
                "{} to move{}, removals left {}\n{}",
                state.current_player,
                check,
                state.removals_left(state.current_player),
                clocks
            )
        }
        Phase::Finished(outcome) => {
            let reason = match outcome.reason {
                WinReason::Checkmate => "checkmate",
                WinReason::Timeout => "timeout",
            };
            format!("{} wins by {}\n{}", outcome.winner, reason, clocks)
        }
    }
}

/// 每个操作一行，带时间戳
pub fn render_history(session: &GameSession) -> String {
    session
        .history()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let action = match &entry.action {
                Action::Move { mv, castling, check } => {
                    let mut text = format!("move {}", mv);
                    if let Some(captured) = mv.captured {
                        text.push_str(&format!(" x{}", captured.to_fen_char()));
                    }
                    if *castling {
                        text.push_str(" (castling)");
                    }
                    if *check {
                        text.push('+');
                    }
                    text
                }
                Action::Remove { at } => format!("remove {}", at),
                Action::Place { piece, at } => format!("place {} {}", piece.name(), at),
            };
            format!("{:>3}. {} {} {}", i + 1, entry.at.format("%H:%M:%S"), entry.color, action)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
