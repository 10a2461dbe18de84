//! 对局计时
//!
//! 只有当前行动方的时间在流逝；对局结束后计时器停止。

use std::time::Instant;

use chess_rules::{ByColor, Color};

/// 游戏计时器
#[derive(Debug)]
pub struct GameTimer {
    /// 双方剩余时间（毫秒），不含当前回合已流逝的部分
    remaining_ms: ByColor<u64>,
    /// 当前计时方
    current_turn: Color,
    /// 当前回合开始时间
    turn_start: Option<Instant>,
    /// 是否暂停
    paused: bool,
}

impl GameTimer {
    /// 创建计时器，双方各 `time_ms` 毫秒，白方先计时
    pub fn new(time_ms: u64) -> Self {
        Self {
            remaining_ms: ByColor::new(time_ms, time_ms),
            current_turn: Color::White,
            turn_start: Some(Instant::now()),
            paused: false,
        }
    }

    /// 指定阵营的剩余时间（毫秒）
    pub fn remaining_ms(&self, color: Color) -> u64 {
        let base = *self.remaining_ms.get(color);
        if color == self.current_turn && !self.paused {
            self.calculate_remaining(base)
        } else {
            base
        }
    }

    fn calculate_remaining(&self, base_time: u64) -> u64 {
        if let Some(start) = self.turn_start {
            let elapsed = start.elapsed().as_millis() as u64;
            base_time.saturating_sub(elapsed)
        } else {
            base_time
        }
    }

    /// 结算当前方已流逝的时间
    fn settle(&mut self) {
        let color = self.current_turn;
        *self.remaining_ms.get_mut(color) = self.remaining_ms(color);
    }

    /// 切换计时方
    pub fn switch_turn(&mut self) {
        self.set_turn(self.current_turn.opponent());
    }

    /// 让指定阵营开始计时；已经是该方时不做任何事
    pub fn set_turn(&mut self, color: Color) {
        if color == self.current_turn {
            return;
        }

        self.settle();
        self.current_turn = color;
        if !self.paused {
            self.turn_start = Some(Instant::now());
        }
    }

    /// 暂停计时器
    pub fn pause(&mut self) {
        if !self.paused {
            self.settle();
            self.turn_start = None;
            self.paused = true;
        }
    }

    /// 恢复计时器
    pub fn resume(&mut self) {
        if self.paused {
            self.turn_start = Some(Instant::now());
            self.paused = false;
        }
    }

    /// 停止计时器
    pub fn stop(&mut self) {
        self.pause();
    }

    /// 检查是否超时
    pub fn is_timeout(&self, color: Color) -> bool {
        self.remaining_ms(color) == 0
    }

    /// 当前计时方如果已超时则返回该方
    pub fn expired(&self) -> Option<Color> {
        self.is_timeout(self.current_turn).then_some(self.current_turn)
    }

    /// 获取当前计时方
    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    /// 是否暂停
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// 将毫秒格式化为 `m:ss`
pub fn format_clock(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
