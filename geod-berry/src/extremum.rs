//! 逐标签极值提取.
//!
//! 联合扫描距离体数据和标签体数据, 为每个标签求出该标签体素上的最大距离,
//! 以及第一个达到该最大值的体素坐标.
//!
//! 扫描顺序固定为 `z -> y -> x` (行优先). 仅在 **严格大于** 时更新,
//! 因此并列时保留扫描顺序中第一个体素. `NaN` (不可达) 永远不会触发更新.
//! 并行版本按 z 分块 (块数不超过线程数), 再按块顺序以相同规则归并, 结果与串行扫描逐位一致.

use ndarray::{ArrayView2, ArrayView3, Axis};

use crate::consts::{label::is_background, NOT_FOUND};
use crate::{Error, Idx3d, LabelIndex, Result};

/// 单个标签在一次传播中的极值记录.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extremum {
    /// 标签值.
    pub label: u32,

    /// 第一个达到最大值的体素 `(z, y, x)`. `None` 表示未找到.
    pub pos: Option<Idx3d>,

    /// 最大距离. 未找到时为 `f32::NEG_INFINITY`.
    pub value: f32,
}

impl Extremum {
    /// 初始 (未找到) 状态.
    #[inline]
    pub const fn not_found(label: u32) -> Self {
        Self {
            label,
            pos: None,
            value: f32::NEG_INFINITY,
        }
    }

    /// 是否找到了位置?
    #[inline]
    pub fn is_found(&self) -> bool {
        self.pos.is_some()
    }

    /// 以 `(x, y, z)` 形式输出坐标, 未找到时为 `(-1, -1, -1)`.
    #[inline]
    pub fn xyz(&self) -> (i64, i64, i64) {
        pos_to_xyz(self.pos)
    }

    /// 若 `value` 严格大于当前最大值则更新.
    #[inline]
    fn offer(&mut self, value: f32, pos: Idx3d) {
        if value > self.value {
            self.value = value;
            self.pos = Some(pos);
        }
    }

    /// 以扫描顺序归并. `later` 必须来自扫描顺序中更靠后的分块.
    #[inline]
    fn merge(&mut self, later: &Self) {
        debug_assert_eq!(self.label, later.label);
        if let Some(pos) = later.pos {
            self.offer(later.value, pos);
        }
    }
}

/// 将可能不存在的 `(z, y, x)` 坐标转为 `(x, y, z)`, 不存在时为 `(-1, -1, -1)`.
#[inline]
pub fn pos_to_xyz(pos: Option<Idx3d>) -> (i64, i64, i64) {
    match pos {
        Some((z, y, x)) => (x as i64, y as i64, z as i64),
        None => (NOT_FOUND, NOT_FOUND, NOT_FOUND),
    }
}

/// 检查两个体数据形状是否一致.
#[inline]
fn check_shape(labels: Idx3d, distances: Idx3d) -> Result<()> {
    if labels != distances {
        return Err(Error::ShapeMismatch {
            expected: labels,
            found: distances,
        });
    }
    Ok(())
}

/// 扫描第 `z` 层切片, 更新 `acc`.
fn scan_slice(
    z: usize,
    distances: ArrayView2<f32>,
    labels: ArrayView2<u32>,
    index: &LabelIndex,
    acc: &mut [Extremum],
) {
    for (((y, x), &label), &value) in labels.indexed_iter().zip(distances.iter()) {
        // 不处理背景
        if is_background(label) {
            continue;
        }
        if let Some(i) = index.get(label) {
            acc[i].offer(value, (z, y, x));
        }
    }
}

/// 求每个标签的最大距离及第一个达到该值的体素坐标. 结果与 `index.labels()` 顺序一致.
///
/// 若两个体数据形状不一致, 返回 `Err(Error::ShapeMismatch)`.
/// 不属于 `index` 的标签会被忽略.
pub fn find_position_of_max_values(
    distances: ArrayView3<f32>,
    labels: ArrayView3<u32>,
    index: &LabelIndex,
) -> Result<Vec<Extremum>> {
    check_shape(labels.dim(), distances.dim())?;

    Ok(scan_all(distances, labels, index))
}

/// 所有标签的初始 (未找到) 记录.
#[inline]
fn init_extrema(index: &LabelIndex) -> Vec<Extremum> {
    index
        .labels()
        .iter()
        .map(|&l| Extremum::not_found(l))
        .collect()
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon` 按 z 分块扫描. 每个分块只持有一份累加器,
        /// 分块个数不超过线程数; 再按块顺序归并, 保证与串行扫描一致.
        fn scan_all(
            distances: ArrayView3<f32>,
            labels: ArrayView3<u32>,
            index: &LabelIndex,
        ) -> Vec<Extremum> {
            let nz = labels.len_of(Axis(0));
            let slab = nz.div_ceil(rayon::current_num_threads().max(1)).max(1);
            (0..nz)
                .into_par_iter()
                .with_min_len(slab)
                .fold(
                    || init_extrema(index),
                    |mut acc, z| {
                        scan_slice(
                            z,
                            distances.index_axis(Axis(0), z),
                            labels.index_axis(Axis(0), z),
                            index,
                            &mut acc,
                        );
                        acc
                    },
                )
                .reduce(
                    || init_extrema(index),
                    |mut a, b| {
                        a.iter_mut().zip(b.iter()).for_each(|(x, y)| x.merge(y));
                        a
                    },
                )
        }
    } else {
        /// 按 z 升序逐层扫描.
        fn scan_all(
            distances: ArrayView3<f32>,
            labels: ArrayView3<u32>,
            index: &LabelIndex,
        ) -> Vec<Extremum> {
            let mut ans = init_extrema(index);
            for (z, (d, l)) in distances
                .axis_iter(Axis(0))
                .zip(labels.axis_iter(Axis(0)))
                .enumerate()
            {
                scan_slice(z, d, l, index, &mut ans);
            }
            ans
        }
    }
}

/// 求每个标签的最大距离. 结果与 `index.labels()` 顺序一致.
///
/// 扫描与比较规则同 [`find_position_of_max_values`]. 没有任何体素更新过的标签,
/// 其值为 `f32::NEG_INFINITY`.
pub fn find_max_values(
    distances: ArrayView3<f32>,
    labels: ArrayView3<u32>,
    index: &LabelIndex,
) -> Result<Vec<f32>> {
    check_shape(labels.dim(), distances.dim())?;

    let mut ans = vec![f32::NEG_INFINITY; index.len()];
    for (&label, &value) in labels.iter().zip(distances.iter()) {
        if is_background(label) {
            continue;
        }
        if let Some(i) = index.get(label) {
            if value > ans[i] {
                ans[i] = value;
            }
        }
    }
    Ok(ans)
}
