//! 规则常量定义

use crate::piece::PieceType;

/// 棋盘边长（行数与列数）
pub const BOARD_SIZE: usize = 8;

/// 格子总数
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 白方底线行
pub const WHITE_HOME_ROW: u8 = 7;

/// 黑方底线行
pub const BLACK_HOME_ROW: u8 = 0;

/// 王的初始列
pub const KING_START_COL: u8 = 4;

/// 王翼车所在列
pub const KINGSIDE_ROOK_COL: u8 = 7;

/// 后翼车所在列
pub const QUEENSIDE_ROOK_COL: u8 = 0;

/// 标准开局底线排列（从第 0 列到第 7 列）
pub const BACK_RANK_ORDER: [PieceType; BOARD_SIZE] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// 布阵模式下每方的棋子池
pub const DRAFT_POOL: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
];

/// 默认每方可移除的格子数
pub const DEFAULT_REMOVALS_PER_PLAYER: u8 = 3;
