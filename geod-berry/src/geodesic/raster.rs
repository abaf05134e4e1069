use ndarray::{Array3, ArrayView3};

use super::{
    check_shape, finalize, neighbour_offsets, GeodesicPropagator, Grid, Offset, Progress,
    PropagationError, PropagationResult,
};
use crate::consts::ElemType;
use crate::ChamferWeights3d;

/// 光栅扫描倒角距离传播.
///
/// 交替进行前向扫描 (`z, y, x` 升序, 使用已访问的 13 个邻居) 和后向扫描
/// (降序, 使用另外 13 个邻居), 直到一轮中没有任何体素被修改.
/// 测地传播一般需要多轮才能稳定.
#[derive(Copy, Clone, Debug, Default)]
pub struct RasterScanPropagator {
    /// 前向 + 后向扫描的最大轮数. `None` 表示直到稳定.
    pub max_iterations: Option<usize>,
}

impl RasterScanPropagator {
    /// 限制最大迭代轮数.
    #[inline]
    pub fn with_max_iterations(n: usize) -> Self {
        Self {
            max_iterations: Some(n),
        }
    }
}

/// 单次扫描. `reverse` 为 `false` 时为前向扫描, 否则为后向扫描.
/// 返回是否有体素被修改.
fn sweep(
    grid: Grid,
    mask: &[bool],
    dist: &mut [f32],
    offsets: &[Offset],
    reverse: bool,
    progress: &mut dyn FnMut(Progress),
) -> bool {
    let phase = if reverse { "backward" } else { "forward" };
    let mut modified = false;
    for step in 0..grid.nz {
        for y in 0..grid.ny {
            for x in 0..grid.nx {
                let pos = if reverse {
                    (grid.nz - 1 - step, grid.ny - 1 - y, grid.nx - 1 - x)
                } else {
                    (step, y, x)
                };
                let i = grid.flat(pos);
                if !mask[i] {
                    continue;
                }

                let mut best = dist[i];
                for o in offsets {
                    if let Some(j) = grid.shift(pos, o) {
                        let d = dist[j] + o.weight;
                        if d < best {
                            best = d;
                        }
                    }
                }
                if best < dist[i] {
                    dist[i] = best;
                    modified = true;
                }
            }
        }
        progress(Progress {
            phase,
            current: step + 1,
            total: grid.nz,
        });
    }
    modified
}

impl GeodesicPropagator for RasterScanPropagator {
    fn name(&self) -> &'static str {
        "raster-scan"
    }

    fn propagate(
        &self,
        marker: ArrayView3<u8>,
        mask: ArrayView3<u8>,
        weights: &ChamferWeights3d,
        progress: &mut dyn FnMut(Progress),
    ) -> PropagationResult<Array3<f32>> {
        check_shape(marker.dim(), mask.dim())?;
        let grid = Grid::new(mask.dim());

        // 行优先展开.
        let mask: Vec<bool> = mask
            .iter()
            .map(|v| ElemType::from_binary(*v).is_foreground())
            .collect();
        let mut dist: Vec<f32> = marker
            .iter()
            .map(|v| match ElemType::from_binary(*v) {
                ElemType::Foreground => 0.0,
                ElemType::Background => f32::INFINITY,
            })
            .collect();
        debug_assert_eq!(dist.len(), grid.len());

        let backward = neighbour_offsets(weights, Some(true));
        let forward = neighbour_offsets(weights, Some(false));

        let mut iteration = 0usize;
        loop {
            if self.max_iterations.is_some_and(|n| iteration >= n) {
                return Err(PropagationError::NotConverged(iteration));
            }
            iteration += 1;

            // 前向扫描使用光栅顺序中位于之前的邻居, 后向扫描反之.
            let m1 = sweep(grid, &mask, &mut dist, &backward, false, progress);
            let m2 = sweep(grid, &mask, &mut dist, &forward, true, progress);
            log::debug!("raster-scan iteration {iteration}: modified = {}", m1 || m2);
            if !(m1 || m2) {
                break;
            }
        }

        Ok(finalize(grid, &mask, dist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BINARY_BACKGROUND, BINARY_FOREGROUND};

    /// 蛇形通道需要多轮扫描才能稳定.
    #[test]
    fn test_serpentine_needs_iterations() {
        // 单层 z, 在 y 方向来回折返的通道.
        let (ny, nx) = (7, 7);
        let mut mask = Array3::from_elem((1, ny, nx), BINARY_BACKGROUND);
        for y in (0..ny).step_by(2) {
            for x in 0..nx {
                mask[(0, y, x)] = BINARY_FOREGROUND;
            }
        }
        // 连接段交替位于两端.
        for (k, y) in (1..ny).step_by(2).enumerate() {
            let x = if k % 2 == 0 { nx - 1 } else { 0 };
            mask[(0, y, x)] = BINARY_FOREGROUND;
        }
        let mut marker = Array3::from_elem(mask.dim(), BINARY_BACKGROUND);
        marker[(0, ny - 1, nx - 1)] = BINARY_FOREGROUND;
        let w: ChamferWeights3d = ChamferWeights3d::CITY_BLOCK.into();

        let mut sweeps = 0;
        let d = RasterScanPropagator::default()
            .propagate(marker.view(), mask.view(), &w, &mut |p: Progress| {
                if p.current == p.total {
                    sweeps += 1;
                }
            })
            .unwrap();
        assert!(sweeps >= 4);

        // 城市街区距离下沿通道的步数: 三段整行加三段折返.
        let path_len = 3 * (nx - 1) + 3 * 2;
        assert_eq!(d[(0, 0, 0)], path_len as f32);
        assert!(d.iter().all(|v| !v.is_nan()));

        let e = RasterScanPropagator::with_max_iterations(1)
            .propagate(marker.view(), mask.view(), &w, &mut |_| ())
            .unwrap_err();
        assert_eq!(e, PropagationError::NotConverged(1));
    }
}
