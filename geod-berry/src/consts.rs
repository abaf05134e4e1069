//! 通用常量.

/// 标签值.
pub mod label {
    /// 标签体数据中, 背景的体素值.
    pub const BACKGROUND: u32 = 0;

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(v: u32) -> bool {
        v == BACKGROUND
    }

    /// 体素是否属于某个区域?
    #[inline]
    pub const fn is_labeled(v: u32) -> bool {
        !is_background(v)
    }
}

/// 结果表的列名. 顺序即输出顺序.
pub mod column {
    /// 标签值.
    pub const LABEL: &str = "Label";

    /// 测地直径.
    pub const GEODESIC_DIAMETER: &str = "GeodesicDiameter";

    /// 测地半径.
    pub const RADIUS: &str = "Radius";

    /// 测地伸长率.
    pub const GEODESIC_ELONGATION: &str = "GeodesicElongation";

    /// 全部列名.
    pub const ALL: [&str; 13] = [
        LABEL,
        GEODESIC_DIAMETER,
        RADIUS,
        GEODESIC_ELONGATION,
        "CenterX",
        "CenterY",
        "CenterZ",
        "Extremity1X",
        "Extremity1Y",
        "Extremity1Z",
        "Extremity2X",
        "Extremity2Y",
        "Extremity2Z",
    ];
}

/// 找不到极值位置时, 输出的坐标分量.
pub const NOT_FOUND: i64 = -1;

/// 稠密标签索引表允许的最大标签值. 超过该值 (且标签稀疏) 时改用哈希表.
pub const DENSE_LABEL_LIMIT: u32 = 1 << 16;

/// 二值体素类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElemType {
    /// `BINARY_BACKGROUND`, 代表背景.
    Background,

    /// `BINARY_FOREGROUND`, 代表前景.
    Foreground,
}

impl ElemType {
    /// 由二值体素值得到类型. 任何非零值都视为前景.
    #[inline]
    pub const fn from_binary(v: u8) -> Self {
        if v == crate::BINARY_BACKGROUND {
            Self::Background
        } else {
            Self::Foreground
        }
    }

    /// 是否为前景.
    #[inline]
    pub fn is_foreground(&self) -> bool {
        matches!(self, Self::Foreground)
    }

    /// 是否为背景.
    #[inline]
    pub fn is_background(&self) -> bool {
        !self.is_foreground()
    }
}
