//! 受掩模约束的测地距离传播.
//!
//! 给定二值种子体数据 (marker) 和二值掩模体数据 (mask), 计算每个掩模体素到最近种子体素的
//! 倒角加权最短路径长度, 路径只能经过掩模体素. 结果约定:
//!
//! 1. 掩模外体素的距离为 `0.0`;
//! 2. 掩模内但无法从任何种子到达的体素为 `NaN`;
//! 3. 掩模外的种子体素也作为源点 (距离为 0), 但路径只能进入掩模体素.
//!
//! 这样, 第一次传播以背景为种子时, 每个区域的距离都从其外边界测起.

use itertools::iproduct;
use ndarray::{Array3, ArrayView3};

use crate::{ChamferWeights3d, Idx3d};

mod dijkstra;
mod raster;

pub use dijkstra::DijkstraPropagator;
pub use raster::RasterScanPropagator;

/// 距离传播运行时错误.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropagationError {
    /// 种子与掩模形状不一致.
    #[error("marker shape {marker:?} differs from mask shape {mask:?}")]
    ShapeMismatch {
        /// 种子体数据形状.
        marker: Idx3d,
        /// 掩模体数据形状.
        mask: Idx3d,
    },

    /// 光栅扫描在给定的迭代次数内没有收敛.
    #[error("propagation did not converge within {0} iterations")]
    NotConverged(usize),
}

/// 距离传播结果.
pub type PropagationResult<T> = Result<T, PropagationError>;

/// 传播过程中的细粒度进度.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    /// 当前阶段, 例如 `"forward"`, `"backward"`, `"dijkstra"`.
    pub phase: &'static str,

    /// 当前进度.
    pub current: usize,

    /// 总进度.
    pub total: usize,
}

/// 测地距离传播后端.
///
/// 实现者必须是确定性的: 相同输入总是得到逐位相同的输出.
pub trait GeodesicPropagator {
    /// 后端名称.
    fn name(&self) -> &'static str;

    /// 计算受 `mask` 约束的、到 `marker` 的测地距离. 结果形状与输入一致.
    ///
    /// 只使用 `weights` 的前三个权重. `progress` 会收到细粒度进度, 不影响结果.
    fn propagate(
        &self,
        marker: ArrayView3<u8>,
        mask: ArrayView3<u8>,
        weights: &ChamferWeights3d,
        progress: &mut dyn FnMut(Progress),
    ) -> PropagationResult<Array3<f32>>;
}

/// 内置的传播后端.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Backend {
    /// 前向/后向交替光栅扫描, 直到稳定.
    #[default]
    RasterScan,

    /// 基于二叉堆的 Dijkstra 最短路.
    Dijkstra,
}

impl Backend {
    /// 创建对应的传播器.
    pub fn propagator(&self) -> Box<dyn GeodesicPropagator + Send + Sync> {
        match self {
            Backend::RasterScan => Box::new(RasterScanPropagator::default()),
            Backend::Dijkstra => Box::new(DijkstraPropagator),
        }
    }
}

/// 26-邻域中的一个偏移及其步长权重.
#[derive(Copy, Clone, Debug)]
struct Offset {
    dz: isize,
    dy: isize,
    dx: isize,
    weight: f32,
}

/// 26-邻域偏移. 若 `backward` 为 `true`, 仅返回光栅顺序中位于当前体素之前的 13 个,
/// 否则仅返回之后的 13 个. `None` 返回全部 26 个.
fn neighbour_offsets(weights: &ChamferWeights3d, backward: Option<bool>) -> Vec<Offset> {
    iproduct!(-1isize..=1, -1isize..=1, -1isize..=1)
        .filter(|&(dz, dy, dx)| (dz, dy, dx) != (0, 0, 0))
        .filter(|&o| match backward {
            Some(true) => o < (0, 0, 0),
            Some(false) => o > (0, 0, 0),
            None => true,
        })
        .map(|(dz, dy, dx)| {
            let non_zero = [dz, dy, dx].iter().filter(|d| **d != 0).count();
            Offset {
                dz,
                dy,
                dx,
                weight: weights.step(non_zero),
            }
        })
        .collect()
}

/// 行优先的扁平化体数据几何信息.
#[derive(Copy, Clone, Debug)]
struct Grid {
    nz: usize,
    ny: usize,
    nx: usize,
}

impl Grid {
    #[inline]
    fn new((nz, ny, nx): Idx3d) -> Self {
        Self { nz, ny, nx }
    }

    #[inline]
    fn len(&self) -> usize {
        self.nz * self.ny * self.nx
    }

    #[inline]
    fn flat(&self, (z, y, x): Idx3d) -> usize {
        (z * self.ny + y) * self.nx + x
    }

    #[inline]
    fn unflat(&self, i: usize) -> Idx3d {
        let x = i % self.nx;
        let y = (i / self.nx) % self.ny;
        (i / (self.nx * self.ny), y, x)
    }

    /// `pos + o`, 越界时返回 `None`.
    #[inline]
    fn shift(&self, (z, y, x): Idx3d, o: &Offset) -> Option<usize> {
        let z = z.checked_add_signed(o.dz).filter(|v| *v < self.nz)?;
        let y = y.checked_add_signed(o.dy).filter(|v| *v < self.ny)?;
        let x = x.checked_add_signed(o.dx).filter(|v| *v < self.nx)?;
        Some(self.flat((z, y, x)))
    }
}

/// 检查种子与掩模形状是否一致.
#[inline]
fn check_shape(marker: Idx3d, mask: Idx3d) -> PropagationResult<()> {
    if marker != mask {
        return Err(PropagationError::ShapeMismatch { marker, mask });
    }
    Ok(())
}

/// 按照模块约定收尾: 掩模外为 `0.0`, 不可达为 `NaN`.
fn finalize(grid: Grid, mask: &[bool], mut dist: Vec<f32>) -> Array3<f32> {
    for (d, m) in dist.iter_mut().zip(mask.iter()) {
        if !*m {
            *d = 0.0;
        } else if d.is_infinite() {
            *d = f32::NAN;
        }
    }
    // 该操作不会生成 `Err`, 可直接 unwrap.
    Array3::from_shape_vec((grid.nz, grid.ny, grid.nx), dist).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::binary::{binarize, marker_outside_labels};
    use crate::phantom;
    use crate::{BINARY_BACKGROUND, BINARY_FOREGROUND};

    fn float_eq(a: f32, b: f32) -> bool {
        (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-4
    }

    #[test]
    fn test_offsets_split() {
        let w: ChamferWeights3d = ChamferWeights3d::BORGEFORS.into();
        let back = neighbour_offsets(&w, Some(true));
        let fwd = neighbour_offsets(&w, Some(false));
        assert_eq!(back.len(), 13);
        assert_eq!(fwd.len(), 13);
        assert_eq!(neighbour_offsets(&w, None).len(), 26);
        for o in back.iter() {
            assert!((o.dz, o.dy, o.dx) < (0, 0, 0));
        }
        let sum: f32 = back.iter().map(|o| o.weight).sum();
        // 3 个正交, 6 个面对角, 4 个体对角.
        assert_eq!(sum, 3.0 * 3.0 + 6.0 * 4.0 + 4.0 * 5.0);
    }

    #[test]
    fn test_grid_flat() {
        let g = Grid::new((3, 4, 5));
        assert_eq!(g.len(), 60);
        for i in 0..g.len() {
            assert_eq!(g.flat(g.unflat(i)), i);
        }
        let o = Offset {
            dz: -1,
            dy: 0,
            dx: 1,
            weight: 1.0,
        };
        assert_eq!(g.shift((0, 0, 0), &o), None);
        assert_eq!(g.shift((1, 0, 4), &o), None);
        assert_eq!(g.shift((1, 2, 3), &o), Some(g.flat((0, 2, 4))));
    }

    /// 两个后端在多种形状与权重下给出相同的距离图.
    #[test]
    fn test_backends_agree() {
        let volumes = [
            phantom::sphere((15, 15, 15), (7, 7, 7), 6.0, 1),
            phantom::l_tube(20, 3, 2),
            phantom::two_boxes(),
        ];
        for labels in volumes.iter() {
            let mask = binarize(labels.data());
            let marker = marker_outside_labels(labels.data());
            for p in ChamferWeights3d::PRESETS {
                let w = ChamferWeights3d::from(p);
                let a = RasterScanPropagator::default()
                    .propagate(marker.view(), mask.view(), &w, &mut |_| ())
                    .unwrap();
                let b = DijkstraPropagator
                    .propagate(marker.view(), mask.view(), &w, &mut |_| ())
                    .unwrap();
                assert_eq!(a.dim(), b.dim());
                for (x, y) in a.iter().zip(b.iter()) {
                    assert!(float_eq(*x, *y), "{} vs {y} with {}", x, p.name());
                }
            }
        }
    }

    /// 一条沿 x 方向的直线, 从一端出发, 另一端的距离是 `(n - 1) * w0`.
    #[test]
    fn test_line_from_endpoint() {
        let n = 9;
        let mut mask = Array3::from_elem((3, 3, n + 2), BINARY_BACKGROUND);
        for x in 1..=n {
            mask[(1, 1, x)] = BINARY_FOREGROUND;
        }
        let mut marker = Array3::from_elem(mask.dim(), BINARY_BACKGROUND);
        marker[(1, 1, 1)] = BINARY_FOREGROUND;

        let w: ChamferWeights3d = ChamferWeights3d::BORGEFORS.into();
        for backend in [Backend::RasterScan, Backend::Dijkstra] {
            let d = backend
                .propagator()
                .propagate(marker.view(), mask.view(), &w, &mut |_| ())
                .unwrap();
            for x in 1..=n {
                assert_eq!(d[(1, 1, x)], 3.0 * (x - 1) as f32);
            }
            assert_eq!(d[(0, 0, 0)], 0.0);
            assert_eq!(d[(1, 1, 0)], 0.0);
        }
    }

    /// 种子无法到达的掩模体素为 `NaN`.
    #[test]
    fn test_unreachable_is_nan() {
        let mask = Array3::from_elem((2, 2, 2), BINARY_FOREGROUND);
        let marker = Array3::from_elem((2, 2, 2), BINARY_BACKGROUND);
        let w: ChamferWeights3d = ChamferWeights3d::CHESSBOARD.into();
        for backend in [Backend::RasterScan, Backend::Dijkstra] {
            let d = backend
                .propagator()
                .propagate(marker.view(), mask.view(), &w, &mut |_| ())
                .unwrap();
            assert!(d.iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let mask = Array3::from_elem((2, 2, 2), BINARY_FOREGROUND);
        let marker = Array3::from_elem((2, 2, 3), BINARY_BACKGROUND);
        let w = ChamferWeights3d::default();
        for backend in [Backend::RasterScan, Backend::Dijkstra] {
            let e = backend
                .propagator()
                .propagate(marker.view(), mask.view(), &w, &mut |_| ())
                .unwrap_err();
            assert_eq!(
                e,
                PropagationError::ShapeMismatch {
                    marker: (2, 2, 3),
                    mask: (2, 2, 2)
                }
            );
        }
    }
}
