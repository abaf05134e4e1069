use std::collections::BTreeSet;
use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView3, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use num::ToPrimitive;

use crate::consts::label::*;
use crate::{Error, Idx3d, Result};

pub mod binary;
mod label_index;

pub use label_index::LabelIndex;

/// 将 nifti 的 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 三维标签体数据. 标签值以 `u32` 保存, `0` 为背景.
///
/// 数据按照 `(z, y, x)` 组织, 其中 `x` 变化最快. 体素分辨率 (毫米) 仅用于报告,
/// 不参与距离计算.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVolume {
    data: Array3<u32>,
    /// `[z, y, x]`, 单位毫米.
    pix_dim: [f64; 3],
}

impl Index<Idx3d> for LabelVolume {
    type Output = u32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array3<u32>> for LabelVolume {
    #[inline]
    fn from(data: Array3<u32>) -> Self {
        Self::new(data)
    }
}

impl LabelVolume {
    /// 由 `(z, y, x)` 组织的裸标签数据创建. 体素分辨率默认为各向同性的 1 毫米.
    #[inline]
    pub fn new(data: Array3<u32>) -> Self {
        Self {
            data,
            pix_dim: [1.0; 3],
        }
    }

    /// 由任意数值类型的 `(z, y, x)` 数据创建.
    ///
    /// 若某体素值无法精确表示为 `u32` (负数、非整数或过大),
    /// 返回 `Err(Error::InvalidLabel(pos))`, 其中 `pos` 为第一个非法体素.
    pub fn try_from_view<T: ToPrimitive + Copy>(view: ArrayView3<T>) -> Result<Self> {
        let mut out = Array3::<u32>::zeros(view.raw_dim());
        for ((pos, v), o) in view.indexed_iter().zip(out.iter_mut()) {
            *o = match (v.to_u32(), v.to_f64()) {
                (Some(u), Some(f)) if f == u as f64 => u,
                _ => return Err(Error::InvalidLabel(pos)),
            };
        }
        Ok(Self::new(out))
    }

    /// 设置体素分辨率, 格式为 `[z, y, x]`, 单位毫米.
    #[inline]
    pub fn with_pix_dim(mut self, pix_dim: [f64; 3]) -> Self {
        self.pix_dim = pix_dim;
        self
    }

    /// 打开 nii 文件格式的 3D 标签. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    ///
    /// 体素值先按 `f64` 读出 (已应用 `scl_slope`/`scl_inter`), 再逐个检查,
    /// 非法值返回 `Err(Error::InvalidLabel(pos))`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = obj.header().clone();
        let ndim = header.dim[0] as usize;
        if ndim != 3 {
            return Err(Error::NotVolume(ndim));
        }

        // [W, H, z] -> [z, H, W]
        // hint: 原第一维向下增长, 原第二维向右增长.
        let data = obj
            .into_volume()
            .into_ndarray::<f64>()?
            .permuted_axes([2, 1, 0].as_slice());
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| Error::NotVolume(ndim))?;
        debug_assert_eq!(data.dim(), get_shape_from_header(&header));

        let [_, w, h, z, ..] = header.pixdim;
        Ok(Self::try_from_view(data.view())?.with_pix_dim([z as f64, h as f64, w as f64]))
    }

    /// 打开 npy 文件格式的 3D 标签. 数组需按照 `(z, y, x)` 组织, 元素类型为 `u32`.
    pub fn open_npy<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data: Array3<u32> = ndarray_npy::read_npy(path)?;
        Ok(Self::new(data))
    }

    /// 获取数据形状大小 `(z, y, x)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取数据体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 获取单个体素分辨率 `[z, y, x]`, 以毫米为单位.
    #[inline]
    pub fn pix_dim(&self) -> [f64; 3] {
        self.pix_dim
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u32> {
        self.data.view()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_inner(self) -> Array3<u32> {
        self.data
    }

    /// 获取 3D 标签中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u32) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 收集体数据中出现的所有非零标签, 升序且无重复.
    pub fn labels(&self) -> Vec<u32> {
        self.data
            .iter()
            .copied()
            .filter(|v| is_labeled(*v))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 收集值为 `label` 的所有体素对应的下标, 结果按行优先存储.
    pub fn positions_of(&self, label: u32) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, v)| (*v == label).then_some(pos))
            .collect()
    }

    /// 是否不存在任何标签?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().all(|v| is_background(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::LabelVolume;
    use crate::Error;
    use ndarray::{array, Array3};

    #[test]
    fn test_labels_sorted_dedup() {
        let mut data = Array3::<u32>::zeros((2, 3, 4));
        data[(0, 0, 0)] = 7;
        data[(1, 2, 3)] = 2;
        data[(0, 1, 1)] = 7;
        data[(1, 0, 2)] = 40000;
        let v = LabelVolume::new(data);
        assert_eq!(v.labels(), vec![2, 7, 40000]);
        assert_eq!(v.count(7), 2);
        assert_eq!(v.positions_of(7), vec![(0, 0, 0), (0, 1, 1)]);
        assert!(!v.is_background());
    }

    #[test]
    fn test_try_from_view() {
        let ok = array![[[0i32, 1], [2, 3]]];
        let v = LabelVolume::try_from_view(ok.view()).unwrap();
        assert_eq!(v.labels(), vec![1, 2, 3]);

        let bad = array![[[0i32, 1], [-2, 3]]];
        match LabelVolume::try_from_view(bad.view()) {
            Err(Error::InvalidLabel(pos)) => assert_eq!(pos, (0, 1, 0)),
            other => panic!("unexpected {other:?}"),
        }

        let frac = array![[[0.0f32, 1.5]]];
        assert!(LabelVolume::try_from_view(frac.view()).is_err());
    }

    /// nii 数据按 `f64` 读出并按 `(x, y, z)` 存放, 转置后再检查.
    #[test]
    fn test_try_from_f64_permuted() {
        let xyz = array![[[0.0f64, 2.0]], [[1.0, 4.0e9]]];
        let zyx = xyz.view().permuted_axes([2, 1, 0]);
        assert!(!zyx.is_standard_layout());
        let v = LabelVolume::try_from_view(zyx).unwrap();
        assert_eq!(v.shape(), (2, 1, 2));
        assert_eq!(v[(0, 0, 1)], 1);
        assert_eq!(v[(1, 0, 0)], 2);
        assert_eq!(v[(1, 0, 1)], 4_000_000_000);

        let mut bad = xyz.clone();
        bad[(1, 0, 1)] = 5.0e9;
        match LabelVolume::try_from_view(bad.view().permuted_axes([2, 1, 0])) {
            Err(Error::InvalidLabel(pos)) => assert_eq!(pos, (1, 0, 1)),
            other => panic!("unexpected {other:?}"),
        }
        bad[(1, 0, 1)] = f64::NAN;
        assert!(LabelVolume::try_from_view(bad.view()).is_err());
        bad[(1, 0, 1)] = -1.0;
        assert!(LabelVolume::try_from_view(bad.view()).is_err());
    }

    #[test]
    fn test_empty_volume() {
        let v = LabelVolume::new(Array3::zeros((0, 4, 4)));
        assert_eq!(v.size(), 0);
        assert!(v.labels().is_empty());
        assert!(v.is_background());
    }
}
