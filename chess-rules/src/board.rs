//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{BACK_RANK_ORDER, BOARD_SIZE, DRAFT_POOL};
use crate::piece::{Color, Piece, PieceType, Position};

/// 棋盘
///
/// 8x8 网格，`squares[row][col]`。第 0 行为黑方底线，第 7 行为白方底线。
/// 棋盘是值类型：引擎的所有函数都接收引用并返回新棋盘，从不原地修改输入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// 创建标准初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::draft_initial();

        for (col, piece_type) in BACK_RANK_ORDER.iter().enumerate() {
            let col = col as u8;
            board.set(
                Position::new_unchecked(Color::Black.home_row(), col),
                Some(Piece::new(*piece_type, Color::Black)),
            );
            board.set(
                Position::new_unchecked(Color::White.home_row(), col),
                Some(Piece::new(*piece_type, Color::White)),
            );
        }

        board
    }

    /// 创建布阵模式的初始棋盘：只有两排兵，底线由布阵阶段逐个放置
    pub fn draft_initial() -> Self {
        let mut board = Self::empty();

        for col in 0..BOARD_SIZE as u8 {
            board.set(
                Position::new_unchecked(Color::Black.pawn_start_row(), col),
                Some(Piece::new(PieceType::Pawn, Color::Black)),
            );
            board.set(
                Position::new_unchecked(Color::White.pawn_start_row(), col),
                Some(Piece::new(PieceType::Pawn, Color::White)),
            );
        }

        board
    }

    /// 获取指定位置的棋子
    pub fn get(&self, pos: Position) -> Option<Piece> {
        if pos.is_valid() {
            self.squares[pos.row as usize][pos.col as usize]
        } else {
            None
        }
    }

    /// 设置指定位置的棋子
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if pos.is_valid() {
            self.squares[pos.row as usize][pos.col as usize] = piece;
        }
    }

    /// 返回设置了指定格子的新棋盘
    pub fn with_piece(&self, pos: Position, piece: Option<Piece>) -> Self {
        let mut board = *self;
        board.set(pos, piece);
        board
    }

    /// 检查格子是否为空
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, color: Color) -> Option<Position> {
        Position::all().find(|&pos| {
            self.get(pos)
                .is_some_and(|piece| piece.is(PieceType::King, color))
        })
    }

    /// 获取指定阵营的所有棋子位置
    pub fn pieces(&self, color: Color) -> Vec<(Position, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Position, Piece)> {
        Position::all()
            .filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    /// 每行一串字符：白方大写，黑方小写，空格为 `.`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, squares) in self.squares.iter().enumerate() {
            write!(f, "{} ", row)?;
            for square in squares {
                let c = square.map(|piece| piece.to_fen_char()).unwrap_or('.');
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "  01234567")
    }
}

/// 布阵模式下每方可用的棋子（稳定顺序）
pub fn available_draft_pieces() -> Vec<PieceType> {
    DRAFT_POOL.to_vec()
}
