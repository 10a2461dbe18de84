//! 错误类型定义

use thiserror::Error;

use crate::piece::{Color, PieceType, Position};

/// 规则错误
///
/// 引擎的查询函数只返回布尔值或空集合；这里的错误仅由
/// [`GameState`](crate::GameState) 上的状态转换返回，原状态保持不变。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的位置
    #[error("Invalid position: ({row}, {col})")]
    InvalidPosition { row: i8, col: i8 },

    /// 无法解析的位置文本
    #[error("Cannot parse position: {text:?} (expected \"row-col\")")]
    InvalidPositionText { text: String },

    /// 未知的棋子名称
    #[error("Unknown piece type: {name}")]
    UnknownPieceType { name: String },

    /// 无效的走法
    #[error("Invalid move: from {from} to {to}")]
    InvalidMove { from: Position, to: Position },

    /// 没有棋子
    #[error("No piece at position {pos}")]
    NoPiece { pos: Position },

    /// 不是你的回合
    #[error("Not your turn: {color} is not to move")]
    NotYourTurn { color: Color },

    /// 走法会导致己方被将军
    #[error("Move would leave king in check")]
    KingInCheck,

    /// 布阵阶段尚未结束
    #[error("Draft phase is still in progress")]
    DraftInProgress,

    /// 当前不在布阵阶段
    #[error("No draft is in progress")]
    NotInDraft,

    /// 选择的棋子不在当前玩家的棋子池中
    #[error("Draft selection rejected: {} is not available", piece.name())]
    DraftSelectionRejected { piece: PieceType },

    /// 布阵落子被拒绝（未选子、不在底线或目标格有子）
    #[error("Draft placement rejected at {pos}")]
    DraftPlacementRejected { pos: Position },

    /// 移除次数已用完
    #[error("{color} has already used all {max} removals")]
    RemovalLimitReached { color: Color, max: u8 },

    /// 格子已被移除
    #[error("Square {pos} is already removed")]
    SquareAlreadyRemoved { pos: Position },

    /// 格子上有棋子，不能移除
    #[error("Square {pos} is occupied")]
    SquareOccupied { pos: Position },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 游戏已结束
    #[error("Game is already over")]
    GameOver,
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
