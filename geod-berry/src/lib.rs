#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 计算三维标签体数据中每个标签区域 (颗粒) 的测地直径、测地半径和测地伸长率.
//!
//! 测地距离是在区域 **内部** 测得的最短路径长度, 而非两点间的直线距离.
//! 对于细长、分叉的三维形状 (纤维、细胞、孔隙、血管), 包围盒等直线度量没有意义,
//! 测地直径则能较好地刻画其 "长度".
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 用法
//!
//! ```no_run
//! use geod_berry::prelude::*;
//!
//! let labels = LabelVolume::open("labels.nii.gz").unwrap();
//! let algo = GeodesicDiameter3d::new(ChamferWeights3d::BORGEFORS).unwrap();
//! let res = algo.process(&labels).unwrap();
//! print!("{}", ResultTable::csv(&res));
//! ```
//!
//! # 开发计划
//!
//! ### 三遍传播测地直径估计 ✅
//!
//! 1. 从区域外部 (背景) 出发传播距离, 得到伪中心;
//! 2. 从伪中心出发传播距离, 得到第一个端点和测地半径;
//! 3. 从第一个端点出发传播距离, 得到第二个端点和测地直径.
//!
//! 实现位于 `geod-berry/src/diameter`.
//!
//! ### 倒角距离传播 ✅
//!
//! 光栅扫描 (前向/后向交替, 直到稳定) 与 Dijkstra 两种后端,
//! 二者在同一个 26-邻域倒角图上求最短路.
//!
//! 实现位于 `geod-berry/src/geodesic`.
//!
//! ### 标签极值定位 ✅
//!
//! 按固定光栅顺序扫描, 严格大于才更新, 因此保留第一个达到最大值的体素.
//! 并行版本按 z 分块后按块顺序归并, 与串行结果逐位一致.
//!
//! 实现位于 `geod-berry/src/extremum.rs`.
//!
//! ### 数据读取 ✅
//!
//! 支持 nifti (`.nii`, `.nii.gz`) 和 `.npy` 格式的标签体数据.
//!
//! 实现位于 `geod-berry/src/data`.
//!
//! ### 骑士步 (5x5x5) 倒角掩模 ⌛️
//!
//! 目前仅使用前三个权重 (26-邻域), 更多的权重会被保留但不参与传播.

/// 三维索引 `(z, y, x)`, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 二值体数据中前景体素的取值.
pub const BINARY_FOREGROUND: u8 = 255;

/// 二值体数据中背景体素的取值.
pub const BINARY_BACKGROUND: u8 = 0;

/// 三维标签体数据及其派生的二值体数据.
mod data;

pub use data::{binary, LabelIndex, LabelVolume};

pub mod chamfer;
pub mod consts;
pub mod dataset;
pub mod diameter;
mod error;
pub mod extremum;
pub mod geodesic;
pub mod phantom;
pub mod prelude;

pub use chamfer::ChamferWeights3d;
pub use error::{Error, Result};
