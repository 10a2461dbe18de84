//! 完整的对局状态快照
//!
//! `GameState` 是不可变的值：每个状态转换接收 `&self`，返回新的快照；
//! 失败时返回错误，原快照保持不变。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::castling::CastlingState;
use crate::constants::DEFAULT_REMOVALS_PER_PLAYER;
use crate::draft::{DraftProgress, DraftState};
use crate::error::{ChessError, Result};
use crate::moves::{Move, MoveContext, MoveGenerator, RookMove};
use crate::piece::{ByColor, Color, PieceType, Position};
use crate::removed::RemovedSquares;

/// 开局选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    /// 每方可移除的格子数
    pub removals_per_player: u8,
    /// 是否以布阵阶段开局
    pub draft_mode: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            removals_per_player: DEFAULT_REMOVALS_PER_PLAYER,
            draft_mode: false,
        }
    }
}

/// 胜利原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// 将死
    Checkmate,
    /// 对方超时
    Timeout,
}

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Color,
    pub reason: WinReason,
}

/// 对局阶段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// 布阵中
    Draft(DraftState),
    /// 正常对局
    Playing,
    /// 已结束
    Finished(GameOutcome),
}

/// 一步走棋的报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// 走法（含被吃的棋子）
    pub mv: Move,
    /// 走棋方
    pub color: Color,
    /// 是否为王车易位
    pub is_castling: bool,
    /// 易位时车的移动
    pub rook_move: Option<RookMove>,
    /// 走后对方是否被将军
    pub gives_check: bool,
    /// 走后对方是否被将死
    pub checkmate: bool,
}

/// 对局状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// 棋盘
    pub board: Board,
    /// 当前行动方（布阵阶段跟随布阵方）
    pub current_player: Color,
    /// 被移除的格子
    pub removed_squares: RemovedSquares,
    /// 双方已使用的移除次数
    pub removals_used: ByColor<u8>,
    /// 每方移除上限
    pub removal_limit: u8,
    /// 易位状态
    pub castling: CastlingState,
    /// 对局阶段
    pub phase: Phase,
}

impl GameState {
    /// 按选项开局，白方先行
    pub fn new(options: GameOptions) -> Self {
        let (board, phase) = if options.draft_mode {
            (Board::draft_initial(), Phase::Draft(DraftState::new()))
        } else {
            (Board::initial(), Phase::Playing)
        };

        Self {
            board,
            current_player: Color::White,
            removed_squares: RemovedSquares::new(),
            removals_used: ByColor::default(),
            removal_limit: options.removals_per_player,
            castling: CastlingState::new(),
            phase,
        }
    }

    /// 是否已结束
    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    /// 胜者（未结束时为 None）
    pub fn winner(&self) -> Option<Color> {
        self.outcome().map(|outcome| outcome.winner)
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// 布阵状态（仅布阵阶段）
    pub fn draft(&self) -> Option<&DraftState> {
        match &self.phase {
            Phase::Draft(draft) => Some(draft),
            _ => None,
        }
    }

    /// 指定阵营剩余的移除次数
    pub fn removals_left(&self, color: Color) -> u8 {
        self.removal_limit.saturating_sub(*self.removals_used.get(color))
    }

    /// 当前阶段对应的走法上下文
    pub fn move_context(&self) -> MoveContext<'_> {
        match self.phase {
            Phase::Draft(_) => MoveContext::Draft,
            _ => MoveContext::Play(&self.castling),
        }
    }

    /// 当前行动方是否被将军
    pub fn in_check(&self) -> bool {
        MoveGenerator::is_in_check(&self.board, self.current_player, &self.removed_squares)
    }

    /// 当前行动方所有合法走法
    pub fn legal_moves(&self) -> Vec<Move> {
        if !matches!(self.phase, Phase::Playing) {
            return Vec::new();
        }
        MoveGenerator::all_valid_moves(
            &self.board,
            self.current_player,
            &self.removed_squares,
            self.move_context(),
        )
    }

    /// 指定格子上己方棋子的合法目标（用于高亮）
    ///
    /// 非对局阶段或不是当前行动方的棋子时返回空列表。
    pub fn legal_destinations(&self, from: Position) -> Vec<Position> {
        if !matches!(self.phase, Phase::Playing) {
            return Vec::new();
        }
        match self.board.get(from) {
            Some(piece) if piece.color == self.current_player => MoveGenerator::possible_moves(
                &self.board,
                from,
                &self.removed_squares,
                self.move_context(),
            ),
            _ => Vec::new(),
        }
    }

    fn ensure_playing(&self) -> Result<()> {
        match self.phase {
            Phase::Playing => Ok(()),
            Phase::Draft(_) => Err(ChessError::DraftInProgress),
            Phase::Finished(_) => Err(ChessError::GameOver),
        }
    }

    /// 移除一个格子，消耗当前行动方的一次回合
    pub fn remove_square(&self, pos: Position) -> Result<Self> {
        self.ensure_playing()?;
        if !pos.is_valid() {
            return Err(ChessError::InvalidPosition {
                row: pos.row as i8,
                col: pos.col as i8,
            });
        }

        let color = self.current_player;
        if self.removals_left(color) == 0 {
            return Err(ChessError::RemovalLimitReached {
                color,
                max: self.removal_limit,
            });
        }
        if self.removed_squares.contains(pos) {
            return Err(ChessError::SquareAlreadyRemoved { pos });
        }
        if !self.board.is_empty_at(pos) {
            return Err(ChessError::SquareOccupied { pos });
        }

        let mut next = self.clone();
        next.removed_squares.insert(pos);
        *next.removals_used.get_mut(color) += 1;
        next.current_player = color.opponent();
        Ok(next)
    }

    /// 布阵选子
    pub fn select_draft_piece(&self, piece: PieceType) -> Result<Self> {
        let draft = self.draft().ok_or(ChessError::NotInDraft)?;
        let draft = draft
            .select(piece)
            .ok_or(ChessError::DraftSelectionRejected { piece })?;

        Ok(Self {
            phase: Phase::Draft(draft),
            ..self.clone()
        })
    }

    /// 布阵落子；棋子池全部用完后进入正常对局，白方先走
    pub fn place_draft_piece(&self, pos: Position) -> Result<Self> {
        let draft = self.draft().ok_or(ChessError::NotInDraft)?;
        let placement = draft
            .place(&self.board, pos)
            .ok_or(ChessError::DraftPlacementRejected { pos })?;

        let (phase, current_player) = match placement.progress {
            DraftProgress::Continue(next) => {
                let current = next.current_player();
                (Phase::Draft(next), current)
            }
            DraftProgress::Complete => (Phase::Playing, Color::White),
        };

        Ok(Self {
            board: placement.board,
            current_player,
            phase,
            ..self.clone()
        })
    }

    /// 走棋
    ///
    /// 校验回合、走法合法性和自将，执行走法，用走子前的棋盘更新易位状态，
    /// 交换行动方，并判断对方是否被将死。
    pub fn play_move(&self, from: Position, to: Position) -> Result<(Self, MoveReport)> {
        self.ensure_playing()?;

        let color = self.current_player;
        let piece = self.board.get(from).ok_or(ChessError::NoPiece { pos: from })?;
        if piece.color != color {
            return Err(ChessError::NotYourTurn { color: piece.color });
        }

        if !MoveGenerator::is_valid_move(&self.board, from, to, &self.removed_squares, self.move_context()) {
            return Err(ChessError::InvalidMove { from, to });
        }

        let outcome = MoveGenerator::make_move(&self.board, from, to);
        if MoveGenerator::is_in_check(&outcome.board, color, &self.removed_squares) {
            return Err(ChessError::KingInCheck);
        }

        let castling = self.castling.after_move(&self.board, from, to);
        let opponent = color.opponent();
        let gives_check = MoveGenerator::is_in_check(&outcome.board, opponent, &self.removed_squares);
        let checkmate = gives_check
            && MoveGenerator::is_checkmate(
                &outcome.board,
                opponent,
                &self.removed_squares,
                MoveContext::Play(&castling),
            );

        let phase = if checkmate {
            Phase::Finished(GameOutcome {
                winner: color,
                reason: WinReason::Checkmate,
            })
        } else {
            Phase::Playing
        };

        let report = MoveReport {
            mv: Move {
                from,
                to,
                captured: outcome.captured,
            },
            color,
            is_castling: outcome.is_castling,
            rook_move: outcome.rook_move,
            gives_check,
            checkmate,
        };

        let next = Self {
            board: outcome.board,
            current_player: opponent,
            castling,
            phase,
            ..self.clone()
        };

        Ok((next, report))
    }

    /// 指定阵营超时，对方直接获胜
    pub fn time_expired(&self, color: Color) -> Result<Self> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }

        Ok(Self {
            phase: Phase::Finished(GameOutcome {
                winner: color.opponent(),
                reason: WinReason::Timeout,
            }),
            ..self.clone()
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;
    use crate::piece::Piece;

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    fn playing_from(fen: &str, current_player: Color) -> GameState {
        GameState {
            board: Fen::parse_board(fen).unwrap(),
            current_player,
            ..GameState::default()
        }
    }

    #[test]
    fn test_new_game() {
        let state = GameState::default();
        assert_eq!(state.board, Board::initial());
        assert_eq!(state.current_player, Color::White);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.removals_left(Color::Black), 3);
        assert_eq!(state.legal_moves().len(), 20);

        let draft = GameState::new(GameOptions {
            removals_per_player: 1,
            draft_mode: true,
        });
        assert_eq!(draft.board, Board::draft_initial());
        assert!(draft.draft().is_some());
        assert_eq!(draft.move_context(), MoveContext::Draft);
        assert!(draft.legal_moves().is_empty());
    }

    #[test]
    fn test_play_move_switches_turn() {
        let state = GameState::default();
        let (next, report) = state.play_move(pos(6, 4), pos(4, 4)).unwrap();

        assert_eq!(next.current_player, Color::Black);
        assert_eq!(report.color, Color::White);
        assert!(!report.gives_check);
        assert_eq!(next.board.get(pos(4, 4)), Some(Piece::new(PieceType::Pawn, Color::White)));
        // 原快照不变
        assert_eq!(state.board, Board::initial());
    }

    #[test]
    fn test_play_move_errors() {
        let state = GameState::default();

        assert_eq!(
            state.play_move(pos(4, 4), pos(3, 4)),
            Err(ChessError::NoPiece { pos: pos(4, 4) })
        );
        assert_eq!(
            state.play_move(pos(1, 4), pos(2, 4)),
            Err(ChessError::NotYourTurn { color: Color::Black })
        );
        assert_eq!(
            state.play_move(pos(6, 4), pos(3, 4)),
            Err(ChessError::InvalidMove {
                from: pos(6, 4),
                to: pos(3, 4)
            })
        );
    }

    #[test]
    fn test_self_check_rejected() {
        let state = playing_from("4k3/4r3/8/8/8/8/4B3/4K3", Color::White);

        assert_eq!(state.play_move(pos(6, 4), pos(5, 3)), Err(ChessError::KingInCheck));
        assert!(state.legal_destinations(pos(6, 4)).is_empty());
    }

    #[test]
    fn test_checkmate_finishes_game() {
        // 白后走到 g7，白王在 f6 保护
        let state = playing_from("7k/8/5K2/8/8/8/6Q1/8", Color::White);
        let (next, report) = state.play_move(pos(6, 6), pos(1, 6)).unwrap();

        assert!(report.gives_check);
        assert!(report.checkmate);
        assert!(next.is_over());
        assert_eq!(next.winner(), Some(Color::White));
        assert_eq!(
            next.outcome(),
            Some(GameOutcome {
                winner: Color::White,
                reason: WinReason::Checkmate
            })
        );
        assert_eq!(next.play_move(pos(0, 7), pos(0, 6)), Err(ChessError::GameOver));
    }

    #[test]
    fn test_castling_updates_rights() {
        let mut state = GameState::default();
        state.board = state.board.with_piece(pos(7, 5), None).with_piece(pos(7, 6), None);

        assert!(state.legal_destinations(pos(7, 4)).contains(&pos(7, 6)));

        let (next, report) = state.play_move(pos(7, 4), pos(7, 6)).unwrap();
        assert!(report.is_castling);
        assert_eq!(
            report.rook_move,
            Some(RookMove {
                from: pos(7, 7),
                to: pos(7, 5)
            })
        );
        assert!(!next.castling.rights.white_kingside);
        assert!(!next.castling.rights.white_queenside);
        assert!(next.castling.king_moved.white);
        assert!(next.castling.rights.black_kingside);
    }

    #[test]
    fn test_capturing_unmoved_rook_revokes_right() {
        // 白象吃掉黑方 h8 原位车
        let state = playing_from("r3k2r/8/8/8/8/8/1B6/4K3", Color::White);
        let (next, report) = state.play_move(pos(6, 1), pos(0, 7)).unwrap();

        assert_eq!(report.mv.captured, Some(Piece::new(PieceType::Rook, Color::Black)));
        assert!(!next.castling.rights.black_kingside);
        assert!(next.castling.rook_moved.black_kingside);
        assert!(next.castling.rights.black_queenside);
        assert!(!next.castling.king_moved.black);
    }

    #[test]
    fn test_remove_square() {
        let state = GameState::default();
        let next = state.remove_square(pos(2, 3)).unwrap();

        assert!(next.removed_squares.contains(pos(2, 3)));
        assert_eq!(next.removals_used.white, 1);
        assert_eq!(next.removals_left(Color::White), 2);
        // 移除消耗回合
        assert_eq!(next.current_player, Color::Black);

        assert_eq!(
            next.remove_square(pos(2, 3)),
            Err(ChessError::SquareAlreadyRemoved { pos: pos(2, 3) })
        );
        assert_eq!(
            next.remove_square(pos(1, 0)),
            Err(ChessError::SquareOccupied { pos: pos(1, 0) })
        );
        // 被移除的格子不能作为目标，但不阻挡兵的两步走
        assert_eq!(next.legal_destinations(pos(1, 3)), vec![pos(3, 3)]);
        assert_eq!(
            next.play_move(pos(1, 3), pos(2, 3)),
            Err(ChessError::InvalidMove {
                from: pos(1, 3),
                to: pos(2, 3)
            })
        );
    }

    #[test]
    fn test_removal_limit() {
        let state = GameState::new(GameOptions {
            removals_per_player: 1,
            draft_mode: false,
        });
        let state = state.remove_square(pos(3, 3)).unwrap();
        let state = state.remove_square(pos(4, 4)).unwrap();

        assert_eq!(
            state.remove_square(pos(3, 4)),
            Err(ChessError::RemovalLimitReached {
                color: Color::White,
                max: 1
            })
        );
    }

    #[test]
    fn test_draft_flow() {
        let state = GameState::new(GameOptions {
            removals_per_player: 3,
            draft_mode: true,
        });

        assert_eq!(state.play_move(pos(6, 0), pos(5, 0)), Err(ChessError::DraftInProgress));
        assert_eq!(state.remove_square(pos(4, 4)), Err(ChessError::DraftInProgress));
        assert_eq!(
            state.place_draft_piece(pos(7, 0)),
            Err(ChessError::DraftPlacementRejected { pos: pos(7, 0) })
        );
        assert_eq!(
            state.select_draft_piece(PieceType::Pawn),
            Err(ChessError::DraftSelectionRejected {
                piece: PieceType::Pawn
            })
        );
        assert_eq!(
            ChessError::DraftSelectionRejected {
                piece: PieceType::Pawn
            }
            .to_string(),
            "Draft selection rejected: pawn is not available"
        );

        let selected = state.select_draft_piece(PieceType::Rook).unwrap();
        assert_eq!(selected.current_player, Color::White);

        // 落在对方底线被拒绝，状态不变
        assert!(selected.place_draft_piece(pos(0, 0)).is_err());

        let placed = selected.place_draft_piece(pos(7, 0)).unwrap();
        assert_eq!(placed.current_player, Color::Black);
        assert_eq!(placed.draft().map(|d| d.selected()), Some(None));
    }

    #[test]
    fn test_draft_completion_starts_play() {
        let mut state = GameState::new(GameOptions {
            removals_per_player: 3,
            draft_mode: true,
        });
        let mut placements = 0;

        while let Some(draft) = state.draft() {
            let color = draft.current_player();
            let piece = draft.available(color)[0];
            let col = (8 - draft.available(color).len()) as u8;
            state = state
                .select_draft_piece(piece)
                .and_then(|s| s.place_draft_piece(pos(color.home_row(), col)))
                .unwrap();
            placements += 1;
        }

        assert_eq!(placements, 16);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.current_player, Color::White);
        assert!(state.select_draft_piece(PieceType::Rook).is_err());
        assert!(!state.legal_moves().is_empty());
    }

    #[test]
    fn test_time_expired() {
        let state = GameState::default();
        let next = state.time_expired(Color::White).unwrap();

        assert_eq!(
            next.outcome(),
            Some(GameOutcome {
                winner: Color::Black,
                reason: WinReason::Timeout
            })
        );
        assert_eq!(next.time_expired(Color::Black), Err(ChessError::GameOver));
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(GameOptions {
            removals_per_player: 5,
            draft_mode: true,
        })
        .select_draft_piece(PieceType::Queen)
        .unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);

        let removed = GameState::default().remove_square(pos(4, 4)).unwrap();
        let value = serde_json::to_value(&removed.removed_squares).unwrap();
        // 位集按 row * 8 + col 序列化为一个整数
        assert_eq!(value, serde_json::json!(1u64 << 36));
    }
}
