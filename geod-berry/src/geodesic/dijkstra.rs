use binary_heap_plus::BinaryHeap;
use ndarray::{Array3, ArrayView3};

use super::{
    check_shape, finalize, neighbour_offsets, GeodesicPropagator, Grid, Progress,
    PropagationResult,
};
use crate::consts::ElemType;
use crate::ChamferWeights3d;

/// 基于二叉堆的 Dijkstra 传播.
///
/// 与 [`RasterScanPropagator`](super::RasterScanPropagator) 在同一个 26-邻域倒角图上求最短路,
/// 每个体素只被确定一次. 种子很少 (例如每个标签一个种子) 时通常更快.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraPropagator;

impl GeodesicPropagator for DijkstraPropagator {
    fn name(&self) -> &'static str {
        "dijkstra"
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

        let mask: Vec<bool> = mask
            .iter()
            .map(|v| ElemType::from_binary(*v).is_foreground())
            .collect();
        let total = mask.iter().filter(|m| **m).count();
        let offsets = neighbour_offsets(weights, None);

        // 堆顶距离最小; 距离相同时下标小者优先, 保证确定性.
        let mut heap: BinaryHeap<(f32, usize), _> =
            BinaryHeap::new_by(|a: &(f32, usize), b: &(f32, usize)| {
                b.0.total_cmp(&a.0).then_with(|| b.1.cmp(&a.1))
            });
        let mut dist = vec![f32::INFINITY; grid.len()];
        for (i, v) in marker.iter().enumerate() {
            if ElemType::from_binary(*v).is_foreground() {
                dist[i] = 0.0;
                heap.push((0.0, i));
            }
        }

        // 每确定一整层切片那么多个体素, 报告一次进度.
        let report_every = (grid.ny * grid.nx).max(1);
        let mut settled = 0usize;
        while let Some((d, i)) = heap.pop() {
            if d > dist[i] {
                continue;
            }
            if mask[i] {
                settled += 1;
                if settled % report_every == 0 {
                    progress(Progress {
                        phase: "dijkstra",
                        current: settled,
                        total,
                    });
                }
            }

            let pos = grid.unflat(i);
            for o in offsets.iter() {
                let Some(j) = grid.shift(pos, o) else {
                    continue;
                };
                // 路径只能进入掩模体素
                if !mask[j] {
                    continue;
                }
                let nd = d + o.weight;
                if nd < dist[j] {
                    dist[j] = nd;
                    heap.push((nd, j));
                }
            }
        }
        progress(Progress {
            phase: "dijkstra",
            current: total,
            total,
        });

        Ok(finalize(grid, &mask, dist))
    }
}
