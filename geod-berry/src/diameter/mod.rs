//! 三遍传播测地直径估计.
//!
//! 1. 以所有背景体素为种子传播距离, 每个标签中距离最大的体素作为伪中心;
//! 2. 以伪中心为种子传播距离, 最大距离为测地半径, 其位置为第一个端点;
//! 3. 以第一个端点为种子传播距离, 最大距离为测地直径, 其位置为第二个端点.
//!
//! 从外边界出发只能找到 "某个" 远点, 不一定是测地端点;
//! 从该点再传播一次才能可靠地到达直径的一端, 第三次传播到达另一端.
//!
//! 所有标签在同一次传播中并行处理. 某个标签在某一遍中找不到极值时,
//! 只记录警告并跳过它的种子, 不影响其他标签.

use ndarray::{Array3, ArrayView3};

use crate::data::binary::{binarize, marker_from_extrema, marker_outside_labels};
use crate::extremum::{find_max_values, find_position_of_max_values, pos_to_xyz, Extremum};
use crate::geodesic::{Backend, GeodesicPropagator, Progress};
use crate::{ChamferWeights3d, Error, Idx3d, LabelIndex, LabelVolume, Result};

mod status;
mod table;

pub use status::{CancelToken, Stage, StatusEvent, StatusListener};
pub use table::ResultTable;

/// 运行时配置.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiameterConfig {
    /// 倒角权重.
    pub weights: ChamferWeights3d,

    /// 距离传播后端.
    pub backend: Backend,
}

/// 单个标签的最终测量结果. 创建后不再修改.
///
/// 距离以体素 (正交步长) 为单位. 无法测得的距离为 `NaN`, 无法定位的坐标为 `None`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodesicRecord {
    /// 标签值.
    pub label: u32,

    /// 测地直径.
    pub diameter: f64,

    /// 测地半径.
    pub radius: f64,

    /// 测地伸长率, `max(diameter / (2 * radius), 1.0)`.
    pub elongation: f64,

    /// 伪中心 `(z, y, x)`.
    pub center: Option<Idx3d>,

    /// 第一个端点 `(z, y, x)`.
    pub first_end: Option<Idx3d>,

    /// 第二个端点 `(z, y, x)`.
    pub second_end: Option<Idx3d>,
}

impl GeodesicRecord {
    /// 伪中心 `(x, y, z)`, 不存在时为 `(-1, -1, -1)`.
    #[inline]
    pub fn center_xyz(&self) -> (i64, i64, i64) {
        pos_to_xyz(self.center)
    }

    /// 第一个端点 `(x, y, z)`, 不存在时为 `(-1, -1, -1)`.
    #[inline]
    pub fn first_end_xyz(&self) -> (i64, i64, i64) {
        pos_to_xyz(self.first_end)
    }

    /// 第二个端点 `(x, y, z)`, 不存在时为 `(-1, -1, -1)`.
    #[inline]
    pub fn second_end_xyz(&self) -> (i64, i64, i64) {
        pos_to_xyz(self.second_end)
    }

    /// 三个位置是否都找到了?
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.center.is_some() && self.first_end.is_some() && self.second_end.is_some()
    }
}

/// 某个标签在某一遍中找不到极值. 非致命.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelWarning {
    /// 标签值.
    pub label: u32,

    /// 发生的阶段.
    pub stage: Stage,
}

/// 一次计算的全部结果: 按标签升序排列的记录, 以及警告.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodesicDiameters {
    records: Vec<GeodesicRecord>,
    warnings: Vec<LabelWarning>,
}

impl GeodesicDiameters {
    /// 全部记录, 按标签升序.
    #[inline]
    pub fn records(&self) -> &[GeodesicRecord] {
        &self.records
    }

    /// 全部警告, 按阶段、标签顺序.
    #[inline]
    pub fn warnings(&self) -> &[LabelWarning] {
        &self.warnings
    }

    /// 获取标签 `label` 的记录.
    pub fn get(&self, label: u32) -> Option<&GeodesicRecord> {
        self.records
            .binary_search_by_key(&label, |r| r.label)
            .ok()
            .map(|i| &self.records[i])
    }

    /// 记录个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否没有任何记录?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 迭代全部记录.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, GeodesicRecord> {
        self.records.iter()
    }

    /// 消费自我, 获得记录.
    #[inline]
    pub fn into_records(self) -> Vec<GeodesicRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a GeodesicDiameters {
    type Item = &'a GeodesicRecord;
    type IntoIter = std::slice::Iter<'a, GeodesicRecord>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// 三维测地直径计算器.
///
/// 计算器本身不保存任何体数据, 每次 [`Self::process`] 调用都是独立的.
pub struct GeodesicDiameter3d {
    weights: ChamferWeights3d,
    propagator: Box<dyn GeodesicPropagator + Send + Sync>,
    listener: Option<StatusListener>,
    cancel: Option<CancelToken>,
}

impl std::fmt::Debug for GeodesicDiameter3d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeodesicDiameter3d")
            .field("weights", &self.weights)
            .field("propagator", &self.propagator.name())
            .field("listener", &self.listener.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl GeodesicDiameter3d {
    /// 使用给定的倒角权重和默认 (光栅扫描) 后端创建计算器.
    ///
    /// 权重不合法时返回 `Err(Error::InvalidConfiguration)`.
    pub fn new<W: Into<ChamferWeights3d>>(weights: W) -> Result<Self> {
        Self::with_config(DiameterConfig {
            weights: weights.into(),
            backend: Backend::default(),
        })
    }

    /// 由裸权重数组创建计算器. 权重少于三个等情况返回 `Err(Error::InvalidConfiguration)`.
    pub fn from_weights(weights: &[f32]) -> Result<Self> {
        Self::new(ChamferWeights3d::new(weights.iter().copied())?)
    }

    /// 由配置创建计算器.
    pub fn with_config(config: DiameterConfig) -> Result<Self> {
        // 反序列化得到的权重没有经过检查, 这里统一再检查一次.
        let weights = ChamferWeights3d::new(config.weights.as_slice().iter().copied())?;
        Ok(Self {
            weights,
            propagator: config.backend.propagator(),
            listener: None,
            cancel: None,
        })
    }

    /// 替换距离传播后端.
    pub fn with_propagator<P>(mut self, propagator: P) -> Self
    where
        P: GeodesicPropagator + Send + Sync + 'static,
    {
        self.propagator = Box::new(propagator);
        self
    }

    /// 设置状态事件接收者.
    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&StatusEvent) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// 设置取消标志.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 倒角权重.
    #[inline]
    pub fn weights(&self) -> &ChamferWeights3d {
        &self.weights
    }

    /// 计算 `labels` 中每个标签的测地直径. 结果按标签升序排列.
    ///
    /// # 返回值
    ///
    /// - 不存在任何标签时, 返回空结果, 且不进行任何传播;
    /// - 计算被取消时, 返回 `Err(Error::Cancelled)`;
    /// - 传播失败时, 返回 `Err(Error::Propagation)`;
    /// - 某个标签找不到极值时, 对应坐标为 `None`, 并在结果中附带警告.
    pub fn process(&self, labels: &LabelVolume) -> Result<GeodesicDiameters> {
        let index = LabelIndex::new(&labels.labels());
        if index.is_empty() {
            log::info!("no label found, nothing to measure");
            return Ok(GeodesicDiameters::default());
        }
        self.check_cancel()?;

        let shape = labels.shape();
        let view = labels.data();
        let mask = binarize(view);
        let mut missing = Missing::new(index.len());

        // 第一遍: 从背景出发
        let marker = marker_outside_labels(view);
        let dist = self.propagate(Stage::InitCenters, &marker, &mask)?;
        let centers = self.extract(Stage::InitCenters, &dist, view, &index, &mut missing)?;
        drop(dist);
        self.check_cancel()?;

        // 第二遍: 从伪中心出发
        let marker = marker_from_extrema(shape, &centers);
        let dist = self.propagate(Stage::FirstEnds, &marker, &mask)?;
        let mut radii = find_max_values(dist.view(), view, &index)?;
        let ends1 = self.extract(Stage::FirstEnds, &dist, view, &index, &mut missing)?;
        drop(dist);
        radii
            .iter_mut()
            .zip(missing.lost.iter())
            .filter(|(_, l)| **l)
            .for_each(|(r, _)| *r = f32::NEG_INFINITY);
        self.check_cancel()?;

        // 第三遍: 从第一个端点出发
        let marker = marker_from_extrema(shape, &ends1);
        let dist = self.propagate(Stage::SecondEnds, &marker, &mask)?;
        let ends2 = self.extract(Stage::SecondEnds, &dist, view, &index, &mut missing)?;
        drop(dist);
        self.check_cancel()?;

        let w0 = self.weights.orthogonal() as f64;
        let records = index
            .labels()
            .iter()
            .enumerate()
            .map(|(i, &label)| {
                debug_assert!(centers[i].label == label && ends2[i].label == label);
                let radius = normalize(radii[i], w0);
                let diameter = normalize(ends2[i].value, w0);
                GeodesicRecord {
                    label,
                    diameter,
                    radius,
                    elongation: elongation(diameter, radius),
                    center: centers[i].pos,
                    first_end: ends1[i].pos,
                    second_end: ends2[i].pos,
                }
            })
            .collect();

        Ok(GeodesicDiameters {
            records,
            warnings: missing.warnings,
        })
    }

    /// 运行一遍传播, 并转发进度.
    fn propagate(
        &self,
        stage: Stage,
        marker: &Array3<u8>,
        mask: &Array3<u8>,
    ) -> Result<Array3<f32>> {
        self.emit(StatusEvent {
            stage,
            message: stage.description().to_string(),
            current: 0,
            total: 0,
        });
        let mut forward = |p: Progress| {
            log::trace!("({stage}) {} {}/{}", p.phase, p.current, p.total);
            self.emit_quiet(StatusEvent {
                stage,
                message: p.phase.to_string(),
                current: p.current,
                total: p.total,
            });
        };
        let dist = self
            .propagator
            .propagate(marker.view(), mask.view(), &self.weights, &mut forward)?;
        Ok(dist)
    }

    /// 提取极值, 并记录本遍未找到的标签.
    fn extract(
        &self,
        stage: Stage,
        dist: &Array3<f32>,
        labels: ArrayView3<u32>,
        index: &LabelIndex,
        missing: &mut Missing,
    ) -> Result<Vec<Extremum>> {
        let mut ext = find_position_of_max_values(dist.view(), labels, index)?;
        missing.update(stage, &mut ext);
        Ok(ext)
    }

    /// 若已请求取消, 返回 `Err(Error::Cancelled)`.
    #[inline]
    fn check_cancel(&self) -> Result<()> {
        match &self.cancel {
            Some(t) if t.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    /// 发送阶段事件, 同时写日志.
    fn emit(&self, ev: StatusEvent) {
        log::info!("{ev}");
        self.emit_quiet(ev);
    }

    /// 只发送事件.
    #[inline]
    fn emit_quiet(&self, ev: StatusEvent) {
        if let Some(l) = &self.listener {
            l(&ev);
        }
    }
}

/// 各标签的丢失状态. 某一遍中丢失的标签在之后各遍中保持未找到.
struct Missing {
    lost: Vec<bool>,
    warnings: Vec<LabelWarning>,
}

impl Missing {
    fn new(n: usize) -> Self {
        Self {
            lost: vec![false; n],
            warnings: Vec::new(),
        }
    }

    fn update(&mut self, stage: Stage, ext: &mut [Extremum]) {
        for (e, l) in ext.iter_mut().zip(self.lost.iter_mut()) {
            if *l {
                *e = Extremum::not_found(e.label);
            }
            if !e.is_found() {
                *l = true;
                log::warn!("({stage}) could not find maximum for particle label {}", e.label);
                self.warnings.push(LabelWarning {
                    label: e.label,
                    stage,
                });
            }
        }
    }
}

/// 将加权距离换算为体素单位. 未测得 (`-inf`) 时为 `NaN`.
#[inline]
fn normalize(value: f32, w0: f64) -> f64 {
    if value.is_finite() {
        value as f64 / w0
    } else {
        f64::NAN
    }
}

/// `max(diameter / (2 * radius), 1.0)`. 任一距离未测得时为 `NaN`.
///
/// 单体素区域 (`0 / 0`) 的伸长率为 `1.0`.
#[inline]
fn elongation(diameter: f64, radius: f64) -> f64 {
    if diameter.is_nan() || radius.is_nan() {
        f64::NAN
    } else {
        (diameter / (radius * 2.0)).max(1.0)
    }
}
