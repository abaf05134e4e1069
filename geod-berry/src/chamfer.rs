//! 三维倒角 (chamfer) 距离权重.
//!
//! 权重依次对应正交 (轴向)、面对角、体对角三种单位步长,
//! 用于将离散路径步数换算成近似欧氏距离.

use std::fmt::{self, Formatter};

use crate::{Error, Result};

/// 一组三维倒角权重. 至少包含三个正的有限值, 且前三个值不递减.
///
/// 第三个之后的权重 (骑士步等) 会被保留, 但目前的传播后端不使用它们.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChamferWeights3d {
    weights: Vec<f32>,
}

/// 预置权重可以在编译期构造.
macro_rules! preset {
    ($(#[$doc: meta])* $name: ident = [$($w: expr),+ $(,)?]) => {
        $(#[$doc])*
        pub const $name: Preset = Preset {
            name: stringify!($name),
            weights: &[$($w),+],
        };
    };
}

/// 一组具名的预置权重. 通过 [`ChamferWeights3d::from`] 转换.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Preset {
    name: &'static str,
    weights: &'static [f32],
}

impl Preset {
    /// 预置权重的名称.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 预置权重的取值.
    #[inline]
    pub fn weights(&self) -> &'static [f32] {
        self.weights
    }
}

impl ChamferWeights3d {
    preset! {
        /// 棋盘距离, 26-邻域步长均为 1.
        CHESSBOARD = [1.0, 1.0, 1.0]
    }
    preset! {
        /// 城市街区距离, 6-邻域步长为 1.
        CITY_BLOCK = [1.0, 2.0, 3.0]
    }
    preset! {
        /// 准欧氏距离, 步长为各方向的欧氏长度.
        QUASI_EUCLIDEAN = [1.0, std::f32::consts::SQRT_2, 1.732_050_8]
    }
    preset! {
        /// Borgefors 整数权重 (3, 4, 5).
        BORGEFORS = [3.0, 4.0, 5.0]
    }
    preset! {
        /// (3, 4, 5, 7) 权重, 第四项为骑士步.
        WEIGHTS_3_4_5_7 = [3.0, 4.0, 5.0, 7.0]
    }
    preset! {
        /// (10, 14, 17, 22) 权重.
        WEIGHTS_10_14_17_22 = [10.0, 14.0, 17.0, 22.0]
    }
    preset! {
        /// (13, 18, 22, 29, 31) 权重.
        WEIGHTS_13_18_22_29_31 = [13.0, 18.0, 22.0, 29.0, 31.0]
    }

    /// 全部预置权重.
    pub const PRESETS: [Preset; 7] = [
        Self::CHESSBOARD,
        Self::CITY_BLOCK,
        Self::QUASI_EUCLIDEAN,
        Self::BORGEFORS,
        Self::WEIGHTS_3_4_5_7,
        Self::WEIGHTS_10_14_17_22,
        Self::WEIGHTS_13_18_22_29_31,
    ];

    /// 由权重数组创建倒角权重.
    ///
    /// # 返回值
    ///
    /// - 权重少于三个时, 返回 `Err(Error::InvalidConfiguration)`;
    /// - 存在非正或非有限的权重时, 返回 `Err(Error::InvalidConfiguration)`;
    /// - 前三个权重递减时, 返回 `Err(Error::InvalidConfiguration)`;
    /// - 其他情况下成功.
    pub fn new<I: IntoIterator<Item = f32>>(weights: I) -> Result<Self> {
        let weights: Vec<f32> = weights.into_iter().collect();
        if weights.len() < 3 {
            return Err(Error::InvalidConfiguration(format!(
                "requires at least three weights, found {}",
                weights.len()
            )));
        }
        if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(Error::InvalidConfiguration(format!(
                "weights must be positive and finite, found {w}"
            )));
        }
        let [a, b, c] = [weights[0], weights[1], weights[2]];
        if a > b || b > c {
            return Err(Error::InvalidConfiguration(format!(
                "expected orthogonal <= face-diagonal <= cube-diagonal, found ({a}, {b}, {c})"
            )));
        }
        Ok(Self { weights })
    }

    /// 正交 (轴向) 步长权重. 测得的距离除以该值即换算为体素单位.
    #[inline]
    pub fn orthogonal(&self) -> f32 {
        self.weights[0]
    }

    /// 面对角步长权重.
    #[inline]
    pub fn face_diagonal(&self) -> f32 {
        self.weights[1]
    }

    /// 体对角步长权重.
    #[inline]
    pub fn cube_diagonal(&self) -> f32 {
        self.weights[2]
    }

    /// 根据邻居偏移中非零分量的个数 (1, 2 或 3) 获取步长权重.
    #[inline]
    pub fn step(&self, non_zero: usize) -> f32 {
        debug_assert!((1..=3).contains(&non_zero));
        self.weights[non_zero - 1]
    }

    /// 全部权重.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }
}

impl From<Preset> for ChamferWeights3d {
    #[inline]
    fn from(p: Preset) -> Self {
        Self {
            weights: p.weights.to_vec(),
        }
    }
}

impl Default for ChamferWeights3d {
    #[inline]
    fn default() -> Self {
        Self::BORGEFORS.into()
    }
}

/// 压缩到一行.
impl fmt::Debug for ChamferWeights3d {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("ChamferWeights3d {:?}", self.weights))
    }
}
