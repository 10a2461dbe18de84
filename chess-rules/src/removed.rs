//! 被移除的格子
//!
//! 被移除的格子永久不可占据、不可作为走法目标，但不阻挡直线棋子的路径。

use serde::{Deserialize, Serialize};

use crate::piece::Position;

/// 被移除格子的集合（64 位位图，索引为 `row * 8 + col`）
///
/// 一局之内只增不减。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemovedSquares(u64);

impl RemovedSquares {
    /// 空集合
    pub const fn new() -> Self {
        Self(0)
    }

    fn bit(pos: Position) -> u64 {
        1u64 << pos.to_index()
    }

    /// 检查格子是否已被移除
    pub fn contains(&self, pos: Position) -> bool {
        pos.is_valid() && self.0 & Self::bit(pos) != 0
    }

    /// 移除一个格子，返回是否为新移除
    pub fn insert(&mut self, pos: Position) -> bool {
        if !pos.is_valid() || self.contains(pos) {
            return false;
        }
        self.0 |= Self::bit(pos);
        true
    }

    /// 返回追加了指定格子的新集合
    pub fn with(&self, pos: Position) -> Self {
        let mut removed = *self;
        removed.insert(pos);
        removed
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// 按行优先顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        Position::all().filter(move |pos| self.contains(*pos))
    }
}

impl FromIterator<Position> for RemovedSquares {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut removed = Self::new();
        for pos in iter {
            removed.insert(pos);
        }
        removed
    }
}
