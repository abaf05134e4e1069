//! 由标签体数据派生的二值体数据 (掩模 / 种子).
//!
//! 二值体数据以 `u8` 保存, 前景为 [`BINARY_FOREGROUND`], 背景为 [`BINARY_BACKGROUND`].

use ndarray::{Array3, ArrayView3, Zip};

use crate::consts::label::is_labeled;
use crate::extremum::Extremum;
use crate::{Idx3d, BINARY_BACKGROUND, BINARY_FOREGROUND};

#[inline]
const fn to_binary(fg: bool) -> u8 {
    if fg {
        BINARY_FOREGROUND
    } else {
        BINARY_BACKGROUND
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        /// 借助 `rayon`, 对每个体素并行地实施 `op`, 得到同形状的二值体数据.
        fn map_binary<F>(labels: ArrayView3<u32>, op: F) -> Array3<u8>
        where
            F: Fn(u32) -> bool + Sync + Send,
        {
            Zip::from(labels).par_map_collect(|&v| to_binary(op(v)))
        }
    } else {
        /// 对每个体素实施 `op`, 得到同形状的二值体数据.
        fn map_binary<F>(labels: ArrayView3<u32>, op: F) -> Array3<u8>
        where
            F: Fn(u32) -> bool,
        {
            Zip::from(labels).map_collect(|&v| to_binary(op(v)))
        }
    }
}

/// 二值化: 非零标签体素为前景, 其余为背景. 用作距离传播的掩模.
#[inline]
pub fn binarize(labels: ArrayView3<u32>) -> Array3<u8> {
    map_binary(labels, is_labeled)
}

/// 掩模的补: 背景体素为前景, 标签体素为背景.
///
/// 用作第一次传播的种子, 使每个区域的距离都从外部 (背景) 测起.
#[inline]
pub fn marker_outside_labels(labels: ArrayView3<u32>) -> Array3<u8> {
    map_binary(labels, |v| !is_labeled(v))
}

/// 创建全背景的种子体数据, 并在每个已找到的极值位置放置一个种子.
///
/// 未找到位置的标签不放置种子.
pub fn marker_from_extrema(shape: Idx3d, extrema: &[Extremum]) -> Array3<u8> {
    let mut marker = Array3::from_elem(shape, BINARY_BACKGROUND);
    for pos in extrema.iter().filter_map(|e| e.pos) {
        marker[pos] = BINARY_FOREGROUND;
    }
    marker
}

/// 统计二值体数据中前景体素个数.
#[inline]
pub fn count_foreground(binary: ArrayView3<u8>) -> usize {
    binary.iter().filter(|v| **v != BINARY_BACKGROUND).count()
}
