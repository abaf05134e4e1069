//! 算法运行统计.

use std::time::{Duration, Instant};

/// 单组 (权重, 后端) 配置在所有用例上的统计.
#[derive(Clone, Debug, Default)]
pub struct Profile {
    /// 成功完成的用例个数.
    done: u64,

    /// 失败 (返回 `Err` 或找不到直径) 的用例个数.
    failed: u64,

    /// 计算耗时总和.
    time: Duration,

    /// 最耗时的一次计算.
    most: Duration,

    /// 相对误差总和.
    err_sum: f64,

    /// 最大相对误差及对应用例.
    worst: Option<(&'static str, f64)>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始一次计时.
    #[inline]
    pub fn start(&self) -> Instant {
        Instant::now()
    }

    /// 记录一次成功的计算.
    pub fn count_done(&mut self, case: &'static str, since: Instant, rel_err: f64) {
        let d = since.elapsed();
        self.time += d;
        self.most = self.most.max(d);
        self.done += 1;
        self.err_sum += rel_err;
        if self.worst.map_or(true, |(_, e)| rel_err > e) {
            self.worst = Some((case, rel_err));
        }
    }

    /// 记录一次失败的计算.
    #[inline]
    pub fn count_failed(&mut self) {
        self.failed += 1;
    }

    /// 成功个数.
    #[inline]
    pub fn get_done(&self) -> u64 {
        self.done
    }

    /// 失败个数.
    #[inline]
    pub fn get_failed(&self) -> u64 {
        self.failed
    }

    /// 总耗时 (以微秒为单位).
    #[inline]
    pub fn get_time_us(&self) -> u64 {
        self.time.as_micros() as u64
    }

    /// 最耗时的一次计算 (以微秒为单位).
    #[inline]
    pub fn get_most_us(&self) -> u64 {
        self.most.as_micros() as u64
    }

    /// 平均相对误差. 没有成功用例时返回 `None`.
    #[inline]
    pub fn get_avg_err(&self) -> Option<f64> {
        (self.done != 0).then(|| self.err_sum / self.done as f64)
    }

    /// 最大相对误差及对应用例.
    #[inline]
    pub fn get_worst(&self) -> Option<(&'static str, f64)> {
        self.worst
    }
}
