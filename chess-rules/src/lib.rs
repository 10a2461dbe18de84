//! 移格国际象棋规则库
//!
//! 包含:
//! - 棋子、棋盘、位置等核心数据结构
//! - 被移除格子集合和王车易位状态
//! - 走法验证、执行和将军/将死判定
//! - 布阵阶段状态机
//! - 对局状态快照 (GameState)
//! - FEN 棋子布局

mod board;
mod castling;
mod constants;
mod draft;
mod error;
mod fen;
mod game;
mod moves;
mod piece;
mod removed;

pub use board::{available_draft_pieces, Board};
pub use castling::{CastleFlags, CastleSide, CastlingState};
pub use constants::*;
pub use draft::{DraftPhase, DraftPlacement, DraftProgress, DraftState};
pub use error::{ChessError, Result};
pub use fen::{Fen, DRAFT_FEN, INITIAL_FEN};
pub use game::{GameOptions, GameOutcome, GameState, MoveReport, Phase, WinReason};
pub use moves::{Move, MoveContext, MoveGenerator, MoveOutcome, RookMove};
pub use piece::{ByColor, Color, Piece, PieceType, Position};
pub use removed::RemovedSquares;
