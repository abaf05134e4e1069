//! 对 `geod-berry::dataset` 的更一层封装. 提供更直接的数据集加载器.

use geod_berry::dataset::{self, LabelLoader};
use std::env;
use std::path::{Path, PathBuf};

/// 标签目录所在的环境变量.
pub const LABEL_DIR_ENV: &str = "GEOD_LABEL_DIR";

/// 获取标签数据基本路径.
///
/// 1. 若环境变量 `$GEOD_LABEL_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/labels`. 无法确定用户主目录时返回 `None`.
pub fn label_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var(LABEL_DIR_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dataset::home_dataset_dir_with(["labels"]),
    }
}

/// 获取目录 `path` 下的标签数据加载器.
#[inline]
pub fn label_loader<P: AsRef<Path>>(path: P) -> geod_berry::Result<LabelLoader> {
    dataset::label_loader(path)
}

/// 从 `$GEOD_LABEL_DIR` 或者 `$HOME/dataset/labels` 下加载标签数据.
///
/// 目录不存在时返回 `None`.
pub fn label_loader_from_env_or_home() -> Option<LabelLoader> {
    let dir = label_dir_from_env_or_home()?;
    if !dir.is_dir() {
        return None;
    }
    label_loader(dir).ok()
}
