//! 王车易位权利记录

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::{KINGSIDE_ROOK_COL, QUEENSIDE_ROOK_COL};
use crate::piece::{ByColor, Color, PieceType, Position};

/// 易位方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    /// 王翼（短易位）
    Kingside,
    /// 后翼（长易位）
    Queenside,
}

impl CastleSide {
    /// 根据王的目标列判断方向
    pub fn from_king_target(from: Position, to: Position) -> Self {
        if to.col > from.col {
            CastleSide::Kingside
        } else {
            CastleSide::Queenside
        }
    }

    /// 根据车所在列判断方向（仅第 0 列和第 7 列有意义）
    pub fn from_rook_col(col: u8) -> Option<Self> {
        match col {
            KINGSIDE_ROOK_COL => Some(CastleSide::Kingside),
            QUEENSIDE_ROOK_COL => Some(CastleSide::Queenside),
            _ => None,
        }
    }

    /// 车的初始列
    pub fn rook_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => KINGSIDE_ROOK_COL,
            CastleSide::Queenside => QUEENSIDE_ROOK_COL,
        }
    }

    /// 易位后车所在列
    pub fn rook_target_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    /// 王前进方向（列增量）
    pub fn direction(&self) -> i8 {
        match self {
            CastleSide::Kingside => 1,
            CastleSide::Queenside => -1,
        }
    }
}

/// 按阵营和方向区分的四个布尔标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastleFlags {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastleFlags {
    /// 四个标志全部为指定值
    pub const fn all(value: bool) -> Self {
        Self {
            white_kingside: value,
            white_queenside: value,
            black_kingside: value,
            black_queenside: value,
        }
    }

    pub fn get(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => self.white_kingside,
            (Color::White, CastleSide::Queenside) => self.white_queenside,
            (Color::Black, CastleSide::Kingside) => self.black_kingside,
            (Color::Black, CastleSide::Queenside) => self.black_queenside,
        }
    }

    pub fn set(&mut self, color: Color, side: CastleSide, value: bool) {
        let flag = match (color, side) {
            (Color::White, CastleSide::Kingside) => &mut self.white_kingside,
            (Color::White, CastleSide::Queenside) => &mut self.white_queenside,
            (Color::Black, CastleSide::Kingside) => &mut self.black_kingside,
            (Color::Black, CastleSide::Queenside) => &mut self.black_queenside,
        };
        *flag = value;
    }
}

/// 易位相关的全部状态
///
/// `rights` 只会从 true 变为 false；`king_moved` 和 `rook_moved` 只会从 false 变为 true。
/// 两类标志都会被检查，任一条件不满足即不能易位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingState {
    /// 易位权利
    pub rights: CastleFlags,
    /// 王是否移动过
    pub king_moved: ByColor<bool>,
    /// 车是否移动过（或在原位被吃）
    pub rook_moved: CastleFlags,
}

impl CastlingState {
    /// 开局状态：四个权利都在
    pub fn new() -> Self {
        Self {
            rights: CastleFlags::all(true),
            king_moved: ByColor::default(),
            rook_moved: CastleFlags::all(false),
        }
    }

    /// 指定阵营和方向当前是否仍可易位（仅看标志，不看棋盘）
    pub fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        !*self.king_moved.get(color) && self.rights.get(color, side) && !self.rook_moved.get(color, side)
    }

    /// 根据一步走法计算新的易位状态
    ///
    /// `board` 必须是走子 **之前** 的棋盘：第三条规则要看目标格上原来的棋子。
    /// 三条规则互相独立：
    /// 1. 王走动：记录王已动，清除该方两个易位权利；
    /// 2. 车从底线第 0/7 列走动：清除对应方向的权利并记录车已动；
    /// 3. 底线第 0/7 列上的车被吃：清除被吃方对应方向的权利并记录车已动。
    pub fn after_move(&self, board: &Board, from: Position, to: Position) -> Self {
        let mut next = *self;

        if let Some(piece) = board.get(from) {
            match piece.piece_type {
                PieceType::King => {
                    *next.king_moved.get_mut(piece.color) = true;
                    next.rights.set(piece.color, CastleSide::Kingside, false);
                    next.rights.set(piece.color, CastleSide::Queenside, false);
                }
                PieceType::Rook if from.row == piece.color.home_row() => {
                    if let Some(side) = CastleSide::from_rook_col(from.col) {
                        next.revoke_rook(piece.color, side);
                    }
                }
                _ => {}
            }
        }

        if let Some(captured) = board.get(to) {
            if captured.piece_type == PieceType::Rook && to.row == captured.color.home_row() {
                if let Some(side) = CastleSide::from_rook_col(to.col) {
                    next.revoke_rook(captured.color, side);
                }
            }
        }

        next
    }

    fn revoke_rook(&mut self, color: Color, side: CastleSide) {
        self.rook_moved.set(color, side, true);
        self.rights.set(color, side, false);
    }
}

impl Default for CastlingState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    #[test]
    fn test_initial_rights() {
        let state = CastlingState::new();
        for color in [Color::White, Color::Black] {
            assert!(state.can_castle(color, CastleSide::Kingside));
            assert!(state.can_castle(color, CastleSide::Queenside));
        }
    }

    #[test]
    fn test_king_move_clears_both_sides() {
        let board = Board::initial();
        let state = CastlingState::new().after_move(&board, pos(7, 4), pos(6, 4));

        assert!(state.king_moved.white);
        assert!(!state.rights.white_kingside);
        assert!(!state.rights.white_queenside);
        // 黑方不受影响
        assert!(state.rights.black_kingside);
        assert!(!state.king_moved.black);
    }

    #[test]
    fn test_rook_move_clears_one_side() {
        let board = Board::initial();
        let state = CastlingState::new().after_move(&board, pos(0, 0), pos(2, 0));

        assert!(!state.rights.black_queenside);
        assert!(state.rook_moved.black_queenside);
        assert!(state.rights.black_kingside);
        assert!(!state.rook_moved.black_kingside);
    }

    #[test]
    fn test_rook_off_home_row_keeps_rights() {
        let board = Board::empty().with_piece(pos(4, 7), Some(Piece::new(PieceType::Rook, Color::White)));
        let state = CastlingState::new().after_move(&board, pos(4, 7), pos(4, 0));

        assert_eq!(state, CastlingState::new());
    }

    #[test]
    fn test_captured_rook_revokes_right() {
        let board = Board::empty()
            .with_piece(pos(7, 7), Some(Piece::new(PieceType::Rook, Color::White)))
            .with_piece(pos(5, 5), Some(Piece::new(PieceType::Bishop, Color::Black)));

        let state = CastlingState::new().after_move(&board, pos(5, 5), pos(7, 7));

        assert!(!state.rights.white_kingside);
        assert!(state.rook_moved.white_kingside);
        assert!(state.rights.white_queenside);
        assert!(!state.can_castle(Color::White, CastleSide::Kingside));
    }

    #[test]
    fn test_rook_takes_rook_revokes_both_colors() {
        let board = Board::empty()
            .with_piece(pos(7, 0), Some(Piece::new(PieceType::Rook, Color::White)))
            .with_piece(pos(0, 0), Some(Piece::new(PieceType::Rook, Color::Black)));

        let state = CastlingState::new().after_move(&board, pos(7, 0), pos(0, 0));

        assert!(!state.rights.white_queenside);
        assert!(!state.rights.black_queenside);
        assert!(state.rights.white_kingside);
        assert!(state.rights.black_kingside);
    }

    #[test]
    fn test_rights_never_restored() {
        let board = Board::initial();
        let state = CastlingState::new()
            .after_move(&board, pos(7, 4), pos(6, 4))
            .after_move(&board, pos(6, 0), pos(5, 0));

        assert!(!state.rights.white_kingside);
        assert!(!state.rights.white_queenside);
    }

    #[test]
    fn test_castle_side_geometry() {
        assert_eq!(CastleSide::from_king_target(pos(7, 4), pos(7, 6)), CastleSide::Kingside);
        assert_eq!(CastleSide::from_king_target(pos(7, 4), pos(7, 2)), CastleSide::Queenside);
        assert_eq!(CastleSide::Kingside.rook_target_col(), 5);
        assert_eq!(CastleSide::Queenside.rook_target_col(), 3);
        assert_eq!(CastleSide::from_rook_col(3), None);
    }
}
