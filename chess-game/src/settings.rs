//! 游戏设置模块
//!
//! 提供设置数据结构和 JSON 持久化

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chess_rules::GameOptions;
use serde::{Deserialize, Serialize};

/// 每方用时
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeLimit {
    /// 3 分钟
    ThreeMinutes,
    /// 5 分钟
    #[default]
    FiveMinutes,
    /// 10 分钟
    TenMinutes,
    /// 15 分钟
    FifteenMinutes,
}

impl TimeLimit {
    /// 转换为毫秒
    pub fn to_millis(self) -> u64 {
        let minutes = match self {
            TimeLimit::ThreeMinutes => 3,
            TimeLimit::FiveMinutes => 5,
            TimeLimit::TenMinutes => 10,
            TimeLimit::FifteenMinutes => 15,
        };
        minutes * 60 * 1000
    }

    /// 显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TimeLimit::ThreeMinutes => "3 min",
            TimeLimit::FiveMinutes => "5 min",
            TimeLimit::TenMinutes => "10 min",
            TimeLimit::FifteenMinutes => "15 min",
        }
    }

    /// 下一个选项
    pub fn next(self) -> Self {
        match self {
            TimeLimit::ThreeMinutes => TimeLimit::FiveMinutes,
            TimeLimit::FiveMinutes => TimeLimit::TenMinutes,
            TimeLimit::TenMinutes => TimeLimit::FifteenMinutes,
            TimeLimit::FifteenMinutes => TimeLimit::ThreeMinutes,
        }
    }
}

/// 每方可移除的格子数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RemovalLimit {
    One,
    #[default]
    Three,
    Five,
}

impl RemovalLimit {
    pub fn count(self) -> u8 {
        match self {
            RemovalLimit::One => 1,
            RemovalLimit::Three => 3,
            RemovalLimit::Five => 5,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RemovalLimit::One => "1 square",
            RemovalLimit::Three => "3 squares",
            RemovalLimit::Five => "5 squares",
        }
    }

    pub fn next(self) -> Self {
        match self {
            RemovalLimit::One => RemovalLimit::Three,
            RemovalLimit::Three => RemovalLimit::Five,
            RemovalLimit::Five => RemovalLimit::One,
        }
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// `EnvFilter` 指令中使用的级别名
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn next(self) -> Self {
        match self {
            LogLevel::Error => LogLevel::Warn,
            LogLevel::Warn => LogLevel::Info,
            LogLevel::Info => LogLevel::Debug,
            LogLevel::Debug => LogLevel::Trace,
            LogLevel::Trace => LogLevel::Error,
        }
    }
}

/// 可在控制台中切换的设置项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Time,
    Removals,
    Draft,
    Log,
}

impl FromStr for SettingKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(SettingKey::Time),
            "removals" => Ok(SettingKey::Removals),
            "draft" => Ok(SettingKey::Draft),
            "log" => Ok(SettingKey::Log),
            other => bail!("未知设置项: {}", other),
        }
    }
}

/// 游戏设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// 每方用时
    pub time_limit: TimeLimit,
    /// 每方可移除的格子数
    pub removal_limit: RemovalLimit,
    /// 是否以布阵阶段开局
    pub draft_mode: bool,
    /// 日志级别
    pub log_level: LogLevel,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            time_limit: TimeLimit::default(),
            removal_limit: RemovalLimit::default(),
            draft_mode: false,
            log_level: LogLevel::default(),
        }
    }
}

impl GameSettings {
    /// 获取设置文件路径
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("removal-chess");
            path.push("settings.json");
            path
        })
    }

    /// 对应的开局选项
    pub fn game_options(&self) -> GameOptions {
        GameOptions {
            removals_per_player: self.removal_limit.count(),
            draft_mode: self.draft_mode,
        }
    }

    /// 把指定设置项切换到下一个选项
    pub fn cycle(&mut self, key: SettingKey) {
        match key {
            SettingKey::Time => self.time_limit = self.time_limit.next(),
            SettingKey::Removals => self.removal_limit = self.removal_limit.next(),
            SettingKey::Draft => self.draft_mode = !self.draft_mode,
            SettingKey::Log => self.log_level = self.log_level.next(),
        }
    }

    /// 单行文字描述
    pub fn describe(&self) -> String {
        format!(
            "time {} | removals {} | draft {} | log {}",
            self.time_limit.display_name(),
            self.removal_limit.display_name(),
            if self.draft_mode { "on" } else { "off" },
            self.log_level.as_directive()
        )
    }

    /// 从默认位置加载设置，失败时使用默认设置
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("无法获取配置目录，使用默认设置");
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("设置文件不存在，使用默认设置");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                tracing::info!("已加载设置: {:?}", path);
                settings
            }
            Err(e) => {
                tracing::warn!("{:#}，使用默认设置", e);
                Self::default()
            }
        }
    }

    /// 从指定文件加载设置
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取设置文件: {:?}", path))?;

        serde_json::from_str(&content).with_context(|| format!("设置文件格式无效: {:?}", path))
    }

    /// 保存设置到默认位置
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path().context("无法获取配置目录")?;
        self.save_to(&path)
    }

    /// 保存设置到指定文件，必要时创建目录
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self).context("序列化设置失败")?;

        std::fs::write(path, content).with_context(|| format!("写入设置文件失败: {:?}", path))?;

        tracing::info!("设置已保存: {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = GameSettings::default();
        assert_eq!(settings.time_limit, TimeLimit::FiveMinutes);
        assert_eq!(settings.time_limit.to_millis(), 300_000);
        assert_eq!(settings.removal_limit.count(), 3);
        assert!(!settings.draft_mode);
        assert_eq!(settings.game_options(), GameOptions::default());
    }

    #[test]
    fn test_option_cycling() {
        assert_eq!(TimeLimit::FifteenMinutes.next(), TimeLimit::ThreeMinutes);
        assert_eq!(RemovalLimit::Five.next(), RemovalLimit::One);
        assert_eq!(LogLevel::Trace.next(), LogLevel::Error);
    }

    #[test]
    fn test_cycle_and_describe() {
        let mut settings = GameSettings::default();
        assert_eq!(
            settings.describe(),
            "time 5 min | removals 3 squares | draft off | log info"
        );

        settings.cycle("time".parse().unwrap());
        settings.cycle(SettingKey::Removals);
        settings.cycle(SettingKey::Draft);
        settings.cycle(SettingKey::Log);

        assert_eq!(settings.time_limit, TimeLimit::TenMinutes);
        assert_eq!(
            settings.game_options(),
            GameOptions {
                removals_per_player: 5,
                draft_mode: true
            }
        );
        assert_eq!(
            settings.describe(),
            "time 10 min | removals 5 squares | draft on | log debug"
        );
        assert!("colour".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        let settings = GameSettings {
            time_limit: TimeLimit::FifteenMinutes,
            removal_limit: RemovalLimit::One,
            draft_mode: true,
            log_level: LogLevel::Debug,
        };
        settings.save_to(&path).unwrap();

        let loaded = GameSettings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(
            loaded.game_options(),
            GameOptions {
                removals_per_player: 1,
                draft_mode: true
            }
        );
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "draft_mode": true }"#).unwrap();

        let loaded = GameSettings::load_from(&path).unwrap();
        assert!(loaded.draft_mode);
        assert_eq!(loaded.time_limit, TimeLimit::FiveMinutes);
    }

    #[test]
    fn test_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(GameSettings::load_from(&path).is_err());
        assert!(GameSettings::load_from(&temp_dir.path().join("missing.json")).is_err());
    }
}
