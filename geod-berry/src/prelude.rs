//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Error, Idx3d, Result};

pub use crate::data::{LabelIndex, LabelVolume};

pub use crate::chamfer::{ChamferWeights3d, Preset};
pub use crate::consts::{ElemType, NOT_FOUND};

pub use crate::diameter::{
    CancelToken, DiameterConfig, GeodesicDiameter3d, GeodesicDiameters, GeodesicRecord,
    LabelWarning, ResultTable, Stage, StatusEvent,
};
pub use crate::geodesic::{
    Backend, DijkstraPropagator, GeodesicPropagator, Progress, RasterScanPropagator,
};

pub use crate::dataset::{self, home_dataset_dir_with, label_loader};
