//! 对局会话
//!
//! 把不可变的 [`GameState`] 快照、计时器和操作历史组合在一起。
//! 每次状态转换成功后替换快照，并让计时器跟随当前行动方。

use chess_rules::{
    Color, GameOptions, GameOutcome, GameState, Move, MoveReport, Phase, PieceType, Position, Result,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::game::GameTimer;
use crate::settings::GameSettings;

/// 玩家的一次操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 走棋
    Move {
        mv: Move,
        castling: bool,
        check: bool,
    },
    /// 移除格子
    Remove { at: Position },
    /// 布阵落子
    Place { piece: PieceType, at: Position },
}

/// 历史记录条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub color: Color,
    pub action: Action,
}

/// 对局会话
pub struct GameSession {
    state: GameState,
    timer: GameTimer,
    history: Vec<HistoryEntry>,
}

impl GameSession {
    /// 按设置开局
    pub fn new(settings: &GameSettings) -> Self {
        Self::with_options(settings.game_options(), settings.time_limit.to_millis())
    }

    pub fn with_options(options: GameOptions, time_limit_ms: u64) -> Self {
        info!(
            "新对局开始: 每方 {} ms，移除上限 {}，布阵模式 {}",
            time_limit_ms, options.removals_per_player, options.draft_mode
        );

        Self {
            state: GameState::new(options),
            timer: GameTimer::new(time_limit_ms),
            history: Vec::new(),
        }
    }

    /// 当前快照
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// 是否已经有人行动过（布阵选子不算）
    pub fn has_started(&self) -> bool {
        !self.history.is_empty()
    }

    /// 指定阵营剩余时间（毫秒）
    pub fn remaining_ms(&self, color: Color) -> u64 {
        self.timer.remaining_ms(color)
    }

    /// 指定格子的合法目标
    pub fn legal_destinations(&self, from: Position) -> Vec<Position> {
        self.state.legal_destinations(from)
    }

    /// 检查当前行动方是否超时；超时则对方获胜
    pub fn check_timeout(&mut self) -> Option<GameOutcome> {
        if self.state.is_over() {
            return self.state.outcome();
        }

        let color = self.timer.expired()?;
        let next = self.state.time_expired(color).ok()?;
        warn!("{} 超时，{} 获胜", color, color.opponent());
        self.replace(next);
        self.state.outcome()
    }

    /// 移除格子
    pub fn remove_square(&mut self, pos: Position) -> Result<()> {
        self.check_timeout();
        let color = self.state.current_player;

        let next = self.state.remove_square(pos).inspect_err(|e| {
            debug!("移除格子被拒绝: {}", e);
        })?;

        info!(
            "{} 移除格子 {}，剩余 {} 次",
            color,
            pos,
            next.removals_left(color)
        );
        self.record(color, Action::Remove { at: pos });
        self.replace(next);
        Ok(())
    }

    /// 布阵选子
    pub fn select_draft_piece(&mut self, piece: PieceType) -> Result<()> {
        self.check_timeout();

        let next = self.state.select_draft_piece(piece).inspect_err(|e| {
            debug!("布阵选子被拒绝: {}", e);
        })?;

        debug!("{} 选择 {}", next.current_player, piece.name());
        self.replace(next);
        Ok(())
    }

    /// 布阵落子
    pub fn place_draft_piece(&mut self, pos: Position) -> Result<()> {
        self.check_timeout();
        let color = self.state.current_player;
        let piece = self.state.draft().and_then(|draft| draft.selected());

        let next = self.state.place_draft_piece(pos).inspect_err(|e| {
            debug!("布阵落子被拒绝: {}", e);
        })?;

        if let Some(piece) = piece {
            info!("{} 在 {} 放置 {}", color, pos, piece.name());
            self.record(color, Action::Place { piece, at: pos });
        }
        if next.phase == Phase::Playing {
            info!("布阵结束，白方先走");
        }
        self.replace(next);
        Ok(())
    }

    /// 走棋
    pub fn play_move(&mut self, from: Position, to: Position) -> Result<MoveReport> {
        self.check_timeout();

        let (next, report) = self.state.play_move(from, to).inspect_err(|e| {
            debug!("走法被拒绝: {}", e);
        })?;

        info!("{} 走棋 {}", report.color, report.mv);
        if let Some(rook) = report.rook_move {
            info!("王车易位，车 {} -> {}", rook.from, rook.to);
        }
        if report.checkmate {
            info!("将死，{} 获胜", report.color);
        } else if report.gives_check {
            debug!("{} 被将军", report.color.opponent());
        }

        self.record(
            report.color,
            Action::Move {
                mv: report.mv,
                castling: report.is_castling,
                check: report.gives_check,
            },
        );
        self.replace(next);
        Ok(report)
    }

    fn record(&mut self, color: Color, action: Action) {
        self.history.push(HistoryEntry {
            at: Utc::now(),
            color,
            action,
        });
    }

    /// 替换快照并同步计时器
    fn replace(&mut self, next: GameState) {
        self.state = next;
        if self.state.is_over() {
            self.timer.stop();
        } else {
            self.timer.set_turn(self.state.current_player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{ChessError, WinReason};
    use std::thread;
    use std::time::Duration;

    const FIVE_MINUTES: u64 = 5 * 60 * 1000;

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    fn standard() -> GameSession {
        GameSession::with_options(GameOptions::default(), FIVE_MINUTES)
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::new(&GameSettings::default());

        assert_eq!(session.state().current_player, Color::White);
        assert_eq!(session.timer().current_turn(), Color::White);
        assert_eq!(session.remaining_ms(Color::Black), FIVE_MINUTES);
        assert!(session.history().is_empty());
        assert!(!session.has_started());
    }

    #[test]
    fn test_move_switches_timer() {
        let mut session = standard();
        let report = session.play_move(pos(6, 4), pos(4, 4)).unwrap();

        assert_eq!(report.color, Color::White);
        assert_eq!(session.state().current_player, Color::Black);
        assert_eq!(session.timer().current_turn(), Color::Black);
        assert_eq!(session.history().len(), 1);
        assert!(session.has_started());
        assert!(matches!(session.history()[0].action, Action::Move { castling: false, .. }));
    }

    #[test]
    fn test_rejected_move_keeps_state() {
        let mut session = standard();
        let before = session.state().clone();

        assert_eq!(
            session.play_move(pos(1, 4), pos(3, 4)),
            Err(ChessError::NotYourTurn { color: Color::Black })
        );
        assert_eq!(session.state(), &before);
        assert!(session.history().is_empty());
        assert_eq!(session.timer().current_turn(), Color::White);
    }

    #[test]
    fn test_removal_consumes_turn() {
        let mut session = standard();
        session.remove_square(pos(4, 4)).unwrap();

        assert!(session.state().removed_squares.contains(pos(4, 4)));
        assert_eq!(session.timer().current_turn(), Color::Black);
        assert_eq!(session.history()[0].action, Action::Remove { at: pos(4, 4) });

        // 被移除的格子不在黑方 e 兵的路线上
        assert!(session.legal_destinations(pos(1, 4)).contains(&pos(3, 4)));
    }

    #[test]
    fn test_draft_session() {
        let mut session = GameSession::with_options(
            GameOptions {
                removals_per_player: 3,
                draft_mode: true,
            },
            FIVE_MINUTES,
        );

        assert_eq!(session.remove_square(pos(4, 4)), Err(ChessError::DraftInProgress));

        session.select_draft_piece(PieceType::King).unwrap();
        // 选子不切换计时方
        assert_eq!(session.timer().current_turn(), Color::White);

        session.place_draft_piece(pos(7, 4)).unwrap();
        assert_eq!(session.timer().current_turn(), Color::Black);
        assert_eq!(
            session.history()[0].action,
            Action::Place {
                piece: PieceType::King,
                at: pos(7, 4)
            }
        );
    }

    #[test]
    fn test_timeout_ends_game() {
        let mut session = GameSession::with_options(GameOptions::default(), 50);
        thread::sleep(Duration::from_millis(100));

        let outcome = session.check_timeout().unwrap();
        assert_eq!(outcome.winner, Color::Black);
        assert_eq!(outcome.reason, WinReason::Timeout);
        assert!(session.timer().is_paused());
        assert_eq!(session.play_move(pos(6, 4), pos(4, 4)), Err(ChessError::GameOver));
    }

    #[test]
    fn test_fools_mate() {
        let mut session = standard();
        session.play_move(pos(6, 5), pos(5, 5)).unwrap();
        session.play_move(pos(1, 4), pos(3, 4)).unwrap();
        session.play_move(pos(6, 6), pos(4, 6)).unwrap();
        let report = session.play_move(pos(0, 3), pos(4, 7)).unwrap();

        assert!(report.checkmate);
        assert_eq!(session.state().winner(), Some(Color::Black));
        assert!(session.timer().is_paused());
        assert_eq!(session.check_timeout().map(|o| o.reason), Some(WinReason::Checkmate));
    }
}
