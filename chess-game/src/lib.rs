//! 移格国际象棋对局控制
//!
//! 包含:
//! - 游戏设置
//! - 对局计时
//! - 对局会话（回合、移除格子、布阵、胜负）
//! - 控制台命令

pub mod console;
pub mod game;
pub mod session;
pub mod settings;

pub use console::{render_board, render_history, render_status, Command};
pub use game::{format_clock, GameTimer};
pub use session::{Action, GameSession, HistoryEntry};
pub use settings::{GameSettings, LogLevel, RemovalLimit, SettingKey, TimeLimit};
