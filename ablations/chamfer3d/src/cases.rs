//! 已知解析测地直径的体模.

use geod_berry::{phantom, LabelVolume};

/// 一个测试用例.
pub struct Case {
    /// 用例名称.
    pub name: &'static str,

    /// 标签体数据, 只含标签 `1`.
    pub labels: LabelVolume,

    /// 欧氏意义下的测地直径 (体素单位).
    pub truth: f64,
}

/// 构造全部用例.
pub fn all() -> Vec<Case> {
    let n = 40;
    let arm = 30;
    let r = 10.0;
    vec![
        Case {
            name: "line",
            labels: phantom::line_x(n, 2, 1),
            truth: (n - 1) as f64,
        },
        // 单体素粗的 L 形: 两臂各走 `arm - 2` 步, 拐角处走一个面对角.
        Case {
            name: "l-tube",
            labels: phantom::l_tube(arm, 1, 2),
            truth: 2.0 * (arm - 2) as f64 + std::f64::consts::SQRT_2,
        },
        Case {
            name: "sphere",
            labels: phantom::sphere((25, 25, 25), (12, 12, 12), r, 1),
            truth: 2.0 * r,
        },
    ]
}
