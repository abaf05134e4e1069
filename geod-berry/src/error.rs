//! 运行时错误.

use crate::geodesic::PropagationError;
use crate::Idx3d;

/// 测地直径计算的运行时错误.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 倒角权重配置非法. 在处理任何体数据之前即被拒绝.
    #[error("invalid chamfer configuration: {0}")]
    InvalidConfiguration(String),

    /// 两个体数据形状不一致. `(expected, found)`, 均为 `(z, y, x)`.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// 期望的形状.
        expected: Idx3d,
        /// 实际的形状.
        found: Idx3d,
    },

    /// 标签值无法用 `u32` 表示 (负数、非整数或过大).
    #[error("voxel {0:?} does not hold a valid label value")]
    InvalidLabel(Idx3d),

    /// 距离传播失败. 对整次计算而言是致命的.
    #[error("geodesic propagation failed")]
    Propagation(#[from] PropagationError),

    /// 计算被主动取消.
    #[error("computation cancelled")]
    Cancelled,

    /// 文件系统错误.
    #[error("i/o error")]
    Io(#[from] std::io::Error),

    /// 结果表写出错误.
    #[error("failed to write result table")]
    Csv(#[from] csv::Error),

    /// nifti 文件读取错误.
    #[error("failed to read nifti volume")]
    Nifti(#[from] nifti::NiftiError),

    /// npy 文件读取错误.
    #[error("failed to read npy volume")]
    Npy(#[from] ndarray_npy::ReadNpyError),

    /// 数据维度不是三维.
    #[error("expected a 3D volume, found {0} dimensions")]
    NotVolume(usize),
}

/// 测地直径计算结果.
pub type Result<T> = std::result::Result<T, Error>;
