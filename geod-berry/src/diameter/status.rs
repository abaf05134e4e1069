//! 计算阶段、状态事件与取消标志.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 三遍传播的阶段.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    /// 第一遍: 从背景出发, 寻找伪中心.
    InitCenters,

    /// 第二遍: 从伪中心出发, 寻找第一个端点.
    FirstEnds,

    /// 第三遍: 从第一个端点出发, 寻找第二个端点.
    SecondEnds,
}

impl Stage {
    /// 三个阶段, 按执行顺序.
    pub const ALL: [Stage; 3] = [Stage::InitCenters, Stage::FirstEnds, Stage::SecondEnds];

    /// 阶段标识符.
    #[inline]
    pub const fn id(&self) -> &'static str {
        match self {
            Stage::InitCenters => "initCenters",
            Stage::FirstEnds => "firstEnds",
            Stage::SecondEnds => "secondEnds",
        }
    }

    /// 阶段开始时的描述.
    #[inline]
    pub const fn description(&self) -> &'static str {
        match self {
            Stage::InitCenters => "Initializing pseudo geodesic centers...",
            Stage::FirstEnds => "Computing first geodesic extremities...",
            Stage::SecondEnds => "Computing second geodesic extremities...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 带阶段标记的状态事件. 纯观察用途, 不影响计算结果.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEvent {
    /// 当前阶段.
    pub stage: Stage,

    /// 描述信息.
    pub message: String,

    /// 当前进度.
    pub current: usize,

    /// 总进度. 阶段开始事件中为 `0`.
    pub total: usize,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(GeodDiam3d-{}) {}", self.stage, self.message)?;
        if self.total != 0 {
            write!(f, " [{}/{}]", self.current, self.total)?;
        }
        Ok(())
    }
}

/// 状态事件的接收者.
pub type StatusListener = Box<dyn Fn(&StatusEvent) + Send + Sync>;

/// 协作式取消标志. 克隆得到的标志共享同一状态.
///
/// 计算在每一遍传播 + 极值提取结束后检查该标志.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// 创建未取消的标志.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消.
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// 是否已请求取消?
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
