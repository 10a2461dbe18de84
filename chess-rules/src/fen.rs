//! FEN 棋子布局解析和生成
//!
//! 只处理 FEN 的第一段（棋子布局）。第一行对应第 0 行（黑方底线），
//! 与本引擎的行号一致，不需要翻转。
//!
//! 示例：`rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`

use crate::board::Board;
use crate::constants::BOARD_SIZE;
use crate::error::ChessError;
use crate::piece::{Piece, Position};

/// 标准初始布局
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// 布阵模式初始布局
pub const DRAFT_FEN: &str = "8/pppppppp/8/8/8/8/PPPPPPPP/8";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析棋子布局；忽略第一个空白之后的其余字段
    pub fn parse_board(fen: &str) -> Result<Board, ChessError> {
        let placement = fen.split_whitespace().next().ok_or_else(|| ChessError::InvalidFen {
            reason: "Empty FEN string".to_string(),
        })?;

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected {} rows, got {}", BOARD_SIZE, rows.len()),
            });
        }

        let mut board = Board::empty();
        for (row, text) in rows.iter().enumerate() {
            let mut col = 0usize;

            for c in text.chars() {
                if col >= BOARD_SIZE {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", row),
                    });
                }

                if let Some(empty_count) = c.to_digit(10) {
                    col += empty_count as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.set(Position::new_unchecked(row as u8, col as u8), Some(piece));
                    col += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if col != BOARD_SIZE {
                return Err(ChessError::InvalidFen {
                    reason: format!("Row {} has {} columns, expected {}", row, col, BOARD_SIZE),
                });
            }
        }

        Ok(board)
    }

    /// 将棋盘转换为 FEN 布局字段
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_SIZE);

        for row in 0..BOARD_SIZE as u8 {
            let mut text = String::new();
            let mut empty_count = 0;

            for col in 0..BOARD_SIZE as u8 {
                if let Some(piece) = board.get(Position::new_unchecked(row, col)) {
                    if empty_count > 0 {
                        text.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    text.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                text.push_str(&empty_count.to_string());
            }
            rows.push(text);
        }

        rows.join("/")
    }
}
