//! 布阵阶段状态机
//!
//! 双方轮流从各自的棋子池中选子并放到己方底线：
//! `AwaitingSelection(玩家)` -> `AwaitingPlacement(玩家, 棋子)` -> `AwaitingSelection(对方)`，
//! 直到两个棋子池都为空，布阵结束，白方先走。

use serde::{Deserialize, Serialize};

use crate::board::{available_draft_pieces, Board};
use crate::piece::{ByColor, Color, Piece, PieceType, Position};

/// 布阵阶段的当前步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    /// 等待玩家选子
    AwaitingSelection(Color),
    /// 玩家已选子，等待落子
    AwaitingPlacement(Color, PieceType),
}

/// 布阵状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    /// 双方剩余的棋子池
    available: ByColor<Vec<PieceType>>,
    /// 当前选中的棋子
    selected: Option<PieceType>,
    /// 当前布阵方
    current: Color,
}

/// 一次落子之后的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftProgress {
    /// 继续布阵
    Continue(DraftState),
    /// 双方棋子池都已用完
    Complete,
}

/// 一次成功落子的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPlacement {
    /// 落子后的新棋盘
    pub board: Board,
    /// 放下的棋子
    pub piece: Piece,
    /// 落子位置
    pub at: Position,
    pub progress: DraftProgress,
}

impl DraftState {
    /// 开始布阵：双方各持一份完整棋子池，白方先选
    pub fn new() -> Self {
        Self {
            available: ByColor::new(available_draft_pieces(), available_draft_pieces()),
            selected: None,
            current: Color::White,
        }
    }

    pub fn phase(&self) -> DraftPhase {
        match self.selected {
            Some(piece) => DraftPhase::AwaitingPlacement(self.current, piece),
            None => DraftPhase::AwaitingSelection(self.current),
        }
    }

    /// 当前布阵方
    pub fn current_player(&self) -> Color {
        self.current
    }

    /// 当前选中的棋子
    pub fn selected(&self) -> Option<PieceType> {
        self.selected
    }

    /// 指定阵营剩余的棋子
    pub fn available(&self, color: Color) -> &[PieceType] {
        self.available.get(color)
    }

    /// 双方剩余棋子总数
    pub fn remaining(&self) -> usize {
        self.available.white.len() + self.available.black.len()
    }

    /// 选子：只能选当前布阵方棋子池中的棋子，不切换回合
    ///
    /// 棋子不在池中时返回 `None`。
    pub fn select(&self, piece: PieceType) -> Option<Self> {
        if !self.available(self.current).contains(&piece) {
            return None;
        }

        Some(Self {
            selected: Some(piece),
            ..self.clone()
        })
    }

    /// 检查能否在指定位置落子：已选子、位于当前方底线、目标格为空
    pub fn can_place(&self, board: &Board, pos: Position) -> bool {
        self.selected.is_some()
            && pos.is_valid()
            && pos.row == self.current.home_row()
            && board.is_empty_at(pos)
    }

    /// 落子
    ///
    /// 条件不满足时返回 `None`，状态和棋盘都不变。成功时从棋子池中移除一枚同类棋子，
    /// 清除选择并交换布阵方；两个棋子池都空时布阵结束。
    pub fn place(&self, board: &Board, pos: Position) -> Option<DraftPlacement> {
        if !self.can_place(board, pos) {
            return None;
        }
        let piece_type = self.selected?;
        let piece = Piece::new(piece_type, self.current);

        let mut available = self.available.clone();
        let pool = available.get_mut(self.current);
        if let Some(index) = pool.iter().position(|p| *p == piece_type) {
            pool.remove(index);
        }

        let progress = if available.white.len() + available.black.len() == 0 {
            DraftProgress::Complete
        } else {
            DraftProgress::Continue(Self {
                available,
                selected: None,
                current: self.current.opponent(),
            })
        };

        Some(DraftPlacement {
            board: board.with_piece(pos, Some(piece)),
            piece,
            at: pos,
            progress,
        })
    }
}

impl Default for DraftState {
    fn default() -> Self {
        Self::new()
    }
}
