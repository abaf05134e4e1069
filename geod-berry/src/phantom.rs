//! 合成的标签体数据 (体模), 已知其测地直径的解析值. 用于测试和消融实验.

use itertools::iproduct;
use ndarray::Array3;

use crate::{Idx3d, LabelVolume};

/// 在 `data` 中将 `[from, to)` 范围内的长方体填充为 `label`.
///
/// 越界部分会被截断.
pub fn fill_box(data: &mut Array3<u32>, from: Idx3d, to: Idx3d, label: u32) {
    let (nz, ny, nx) = data.dim();
    for (z, y, x) in iproduct!(
        from.0..to.0.min(nz),
        from.1..to.1.min(ny),
        from.2..to.2.min(nx)
    ) {
        data[(z, y, x)] = label;
    }
}

/// 沿 x 方向长度为 `n` 的单体素直线, 四周留 `margin` 个背景体素. 标签为 `label`.
///
/// 其测地直径为 `n - 1` (体素单位), 两端点为 `(margin, margin, margin)`
/// 和 `(margin, margin, margin + n - 1)`.
pub fn line_x(n: usize, margin: usize, label: u32) -> LabelVolume {
    let side = 1 + 2 * margin;
    let mut data = Array3::zeros((side, side, n + 2 * margin));
    fill_box(
        &mut data,
        (margin, margin, margin),
        (margin + 1, margin + 1, margin + n),
        label,
    );
    LabelVolume::new(data)
}

/// 以 `center` 为球心、`radius` 为半径的体素化实心球. 标签为 `label`.
pub fn sphere(shape: Idx3d, center: Idx3d, radius: f64, label: u32) -> LabelVolume {
    let r2 = radius * radius;
    let data = Array3::from_shape_fn(shape, |(z, y, x)| {
        let dz = z as f64 - center.0 as f64;
        let dy = y as f64 - center.1 as f64;
        let dx = x as f64 - center.2 as f64;
        if dz * dz + dy * dy + dx * dx <= r2 {
            label
        } else {
            0
        }
    });
    LabelVolume::new(data)
}

/// L 形方管, 两臂 (沿 x 和沿 y) 的外侧长度均为 `arm`, 横截面为 `thickness * thickness`,
/// 四周留 `margin` 个背景体素. 标签为 `1`.
///
/// 其测地直径约为 `2 * (arm - 1)` 减去拐角处的对角捷径.
pub fn l_tube(arm: usize, thickness: usize, margin: usize) -> LabelVolume {
    assert!(arm >= thickness);
    let (m, t) = (margin, thickness);
    let mut data = Array3::zeros((t + 2 * m, arm + 2 * m, arm + 2 * m));
    // 沿 x 的臂
    fill_box(&mut data, (m, m, m), (m + t, m + t, m + arm), 1);
    // 沿 y 的臂
    fill_box(&mut data, (m, m, m), (m + t, m + arm, m + t), 1);
    LabelVolume::new(data)
}

/// 同一体数据中互不接触的两个长方体, 标签分别为 `1` (3x3x11) 和 `2` (3x5x5).
pub fn two_boxes() -> LabelVolume {
    let mut data = Array3::zeros((5, 16, 16));
    fill_box(&mut data, (1, 1, 1), (4, 4, 12), 1);
    fill_box(&mut data, (1, 8, 8), (4, 13, 13), 2);
    LabelVolume::new(data)
}
