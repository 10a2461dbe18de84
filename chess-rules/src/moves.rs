//! 走法验证、执行和将军判定

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::castling::{CastleSide, CastlingState};
use crate::constants::KING_START_COL;
use crate::piece::{Color, Piece, PieceType, Position};
use crate::removed::RemovedSquares;

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始位置
    pub from: Position,
    /// 目标位置
    pub to: Position,
    /// 被吃的棋子（如果有）
    pub captured: Option<Piece>,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            captured: None,
        }
    }

    /// 创建带吃子的走法
    pub fn with_capture(from: Position, to: Position, captured: Piece) -> Self {
        Self {
            from,
            to,
            captured: Some(captured),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// 易位时车的移动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RookMove {
    pub from: Position,
    pub to: Position,
}

/// 执行走法的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// 走子后的新棋盘
    pub board: Board,
    /// 是否为王车易位
    pub is_castling: bool,
    /// 易位时车的移动
    pub rook_move: Option<RookMove>,
    /// 目标格上原有的棋子
    pub captured: Option<Piece>,
}

/// 走法验证所需的上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveContext<'a> {
    /// 只用基础走子规则（攻击扫描），不考虑王车易位
    Basic,
    /// 布阵阶段，王车易位不可用
    Draft,
    /// 正常对局，按易位状态判断王车易位
    Play(&'a CastlingState),
}

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 验证一步走法是否合法（不检查走后己方是否被将军）
    ///
    /// 依次检查：目标在棋盘内、目标未被移除、起点有棋子、目标不是己方棋子，
    /// 然后按棋子类型分派。
    pub fn is_valid_move(
        board: &Board,
        from: Position,
        to: Position,
        removed: &RemovedSquares,
        ctx: MoveContext<'_>,
    ) -> bool {
        if !to.is_valid() {
            return false;
        }

        if removed.contains(to) {
            return false;
        }

        let Some(piece) = board.get(from) else {
            return false;
        };

        // 不能吃己方棋子
        if let Some(target) = board.get(to) {
            if target.color == piece.color {
                return false;
            }
        }

        match piece.piece_type {
            PieceType::Pawn => Self::is_valid_pawn_move(board, from, to, piece.color, removed),
            PieceType::Rook => Self::is_valid_rook_move(board, from, to),
            PieceType::Knight => Self::is_valid_knight_move(from, to),
            PieceType::Bishop => Self::is_valid_bishop_move(board, from, to),
            PieceType::Queen => Self::is_valid_queen_move(board, from, to),
            PieceType::King => Self::is_valid_king_move(board, from, to, removed, ctx),
        }
    }

    /// 兵：只能向前；单步到空格，起始行可双步，斜向一步只能吃子
    fn is_valid_pawn_move(
        board: &Board,
        from: Position,
        to: Position,
        color: Color,
        removed: &RemovedSquares,
    ) -> bool {
        let direction = color.pawn_direction();
        let d_row = to.row as i8 - from.row as i8;
        let d_col = to.col as i8 - from.col as i8;

        if d_col == 0 {
            // 前进一步
            if d_row == direction && board.is_empty_at(to) {
                return true;
            }

            // 起始行前进两步：只看目标格为空且未移除，不检查中间格
            if from.row == color.pawn_start_row()
                && d_row == 2 * direction
                && board.is_empty_at(to)
                && !removed.contains(to)
            {
                return true;
            }
        }

        // 斜向吃子
        if d_col.abs() == 1 && d_row == direction {
            return board.get(to).is_some();
        }

        false
    }

    /// 车：横竖直线，路径上不能有棋子
    fn is_valid_rook_move(board: &Board, from: Position, to: Position) -> bool {
        if from.row != to.row && from.col != to.col {
            return false;
        }

        Self::is_path_clear(board, from, to)
    }

    /// 马：日字跳跃，不检查路径
    fn is_valid_knight_move(from: Position, to: Position) -> bool {
        let d_row = (from.row as i8 - to.row as i8).abs();
        let d_col = (from.col as i8 - to.col as i8).abs();

        (d_row == 2 && d_col == 1) || (d_row == 1 && d_col == 2)
    }

    /// 象：斜线，路径上不能有棋子
    fn is_valid_bishop_move(board: &Board, from: Position, to: Position) -> bool {
        let d_row = (from.row as i8 - to.row as i8).abs();
        let d_col = (from.col as i8 - to.col as i8).abs();
        if d_row != d_col {
            return false;
        }

        Self::is_path_clear(board, from, to)
    }

    /// 后：车或象的走法
    fn is_valid_queen_move(board: &Board, from: Position, to: Position) -> bool {
        Self::is_valid_rook_move(board, from, to) || Self::is_valid_bishop_move(board, from, to)
    }

    /// 王：周围一格；正常对局中横向两格视为易位
    fn is_valid_king_move(
        board: &Board,
        from: Position,
        to: Position,
        removed: &RemovedSquares,
        ctx: MoveContext<'_>,
    ) -> bool {
        let d_row = (from.row as i8 - to.row as i8).abs();
        let d_col = (from.col as i8 - to.col as i8).abs();

        if d_row <= 1 && d_col <= 1 {
            return true;
        }

        if d_row == 0 && d_col == 2 {
            if let MoveContext::Play(castling) = ctx {
                return Self::is_valid_castling(board, from, to, removed, castling);
            }
        }

        false
    }

    /// 验证王车易位
    ///
    /// 王在原位且未动过、对应方向的权利仍在、同色车在原位且未动过、
    /// 王车之间的格子既无棋子也未被移除、王当前未被将军、
    /// 王经过的两格在模拟放置后都不被攻击。
    pub fn is_valid_castling(
        board: &Board,
        from: Position,
        to: Position,
        removed: &RemovedSquares,
        castling: &CastlingState,
    ) -> bool {
        let Some(king) = board.get(from) else {
            return false;
        };
        if king.piece_type != PieceType::King {
            return false;
        }

        let color = king.color;
        let home_row = color.home_row();
        let side = CastleSide::from_king_target(from, to);

        // 王必须在初始位置
        if from.row != home_row || from.col != KING_START_COL {
            return false;
        }

        if *castling.king_moved.get(color) {
            return false;
        }

        if !castling.rights.get(color, side) {
            return false;
        }

        // 车必须在原位且未动过
        let rook_pos = Position::new_unchecked(home_row, side.rook_col());
        match board.get(rook_pos) {
            Some(rook) if rook.is(PieceType::Rook, color) => {}
            _ => return false,
        }
        if castling.rook_moved.get(color, side) {
            return false;
        }

        // 王车之间必须是空的，且不能有被移除的格子
        let (low, high) = if from.col < rook_pos.col {
            (from.col, rook_pos.col)
        } else {
            (rook_pos.col, from.col)
        };
        for col in (low + 1)..high {
            let between = Position::new_unchecked(home_row, col);
            if !board.is_empty_at(between) || removed.contains(between) {
                return false;
            }
        }

        // 不能在被将军时易位
        if Self::is_in_check(board, color, removed) {
            return false;
        }

        // 王经过的格子不能被攻击（只移动王，车保持原位）
        for step in 1..=2i8 {
            let col = (from.col as i8 + side.direction() * step) as u8;
            let transit = Position::new_unchecked(home_row, col);
            let test_board = board.with_piece(transit, Some(king)).with_piece(from, None);

            if Self::is_in_check(&test_board, color, removed) {
                return false;
            }
        }

        true
    }

    /// 检查起点和终点之间（不含两端）是否没有棋子
    ///
    /// 被移除的格子不阻挡路径。
    fn is_path_clear(board: &Board, from: Position, to: Position) -> bool {
        let d_row = (to.row as i8 - from.row as i8).signum();
        let d_col = (to.col as i8 - from.col as i8).signum();

        let mut current = from;
        while let Some(next) = current.offset(d_row, d_col) {
            if next == to {
                return true;
            }
            if board.get(next).is_some() {
                return false;
            }
            current = next;
        }
        false
    }

    /// 执行走法（不检查规则），返回新棋盘
    ///
    /// 王横向移动两格时同时移动对应的车：王翼车 7 -> 5，后翼车 0 -> 3。
    pub fn make_move(board: &Board, from: Position, to: Position) -> MoveOutcome {
        let mut next = *board;
        let piece = board.get(from);
        let captured = board.get(to);
        let mut rook_move = None;

        if let Some(king) = piece {
            let d_col = to.col as i8 - from.col as i8;
            if king.piece_type == PieceType::King && d_col.abs() == 2 {
                let side = CastleSide::from_king_target(from, to);
                let rook_from = Position::new_unchecked(from.row, side.rook_col());
                let rook_to = Position::new_unchecked(to.row, side.rook_target_col());

                next.set(rook_to, next.get(rook_from));
                next.set(rook_from, None);
                rook_move = Some(RookMove {
                    from: rook_from,
                    to: rook_to,
                });
            }
        }

        next.set(to, piece);
        next.set(from, None);

        MoveOutcome {
            board: next,
            is_castling: rook_move.is_some(),
            rook_move,
            captured,
        }
    }

    /// 检查指定阵营是否被将军
    ///
    /// 棋盘上没有该方的王时（例如布阵阶段）视为不被将军。
    pub fn is_in_check(board: &Board, color: Color, removed: &RemovedSquares) -> bool {
        let Some(king_pos) = board.find_king(color) else {
            return false;
        };

        board
            .pieces(color.opponent())
            .into_iter()
            .any(|(pos, _)| Self::is_valid_move(board, pos, king_pos, removed, MoveContext::Basic))
    }

    /// 指定棋子的所有合法目标（过滤掉会让己方被将军的走法）
    pub fn possible_moves(
        board: &Board,
        from: Position,
        removed: &RemovedSquares,
        ctx: MoveContext<'_>,
    ) -> Vec<Position> {
        let Some(piece) = board.get(from) else {
            return Vec::new();
        };

        Position::all()
            .filter(|&to| Self::is_legal(board, from, to, piece.color, removed, ctx))
            .collect()
    }

    /// 指定阵营的所有合法走法
    pub fn all_valid_moves(
        board: &Board,
        color: Color,
        removed: &RemovedSquares,
        ctx: MoveContext<'_>,
    ) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);

        for (from, _) in board.pieces(color) {
            for to in Position::all() {
                if Self::is_legal(board, from, to, color, removed, ctx) {
                    moves.push(match board.get(to) {
                        Some(target) => Move::with_capture(from, to, target),
                        None => Move::new(from, to),
                    });
                }
            }
        }

        moves
    }

    /// 走法合法且走后己方不被将军
    fn is_legal(
        board: &Board,
        from: Position,
        to: Position,
        color: Color,
        removed: &RemovedSquares,
        ctx: MoveContext<'_>,
    ) -> bool {
        if !Self::is_valid_move(board, from, to, removed, ctx) {
            return false;
        }
        let outcome = Self::make_move(board, from, to);
        !Self::is_in_check(&outcome.board, color, removed)
    }

    /// 检查是否被将死：被将军且没有任何合法走法
    ///
    /// 未被将军但无子可动的局面不做判定。
    pub fn is_checkmate(
        board: &Board,
        color: Color,
        removed: &RemovedSquares,
        ctx: MoveContext<'_>,
    ) -> bool {
        if !Self::is_in_check(board, color, removed) {
            return false;
        }

        Self::all_valid_moves(board, color, removed, ctx).is_empty()
    }
}
