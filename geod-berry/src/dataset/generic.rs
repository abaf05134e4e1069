//! 通用标签数据加载器.
//!
//! 提供迭代器风格的数据集获取模式.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{LabelVolume, Result};

/// 支持的标签文件格式.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelFormat {
    /// `.nii` 或 `.nii.gz`.
    Nifti,

    /// `.npy`, 元素类型为 `u32`, 按 `(z, y, x)` 组织.
    Npy,
}

impl LabelFormat {
    /// 由文件名推断格式. 不支持时返回 `None`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".nii") || name.ends_with(".nii.gz") {
            Some(Self::Nifti)
        } else if name.ends_with(".npy") {
            Some(Self::Npy)
        } else {
            None
        }
    }
}

/// 按扩展名打开标签文件. 无法识别的扩展名按 nifti 处理.
pub fn open_label<P: AsRef<Path>>(path: P) -> Result<LabelVolume> {
    let path = path.as_ref();
    match LabelFormat::from_path(path) {
        Some(LabelFormat::Npy) => LabelVolume::open_npy(path),
        _ => LabelVolume::open(path),
    }
}

/// 为目录 `path` 下所有可识别的标签文件创建加载器, 按文件名升序迭代.
///
/// 子目录和无法识别扩展名的文件会被跳过. 目录无法读取时返回 `Err`.
pub fn label_loader<P: AsRef<Path>>(path: P) -> Result<LabelLoader> {
    let mut files = Vec::new();
    for entry in fs::read_dir(path.as_ref())? {
        let p = entry?.path();
        if p.is_file() && LabelFormat::from_path(&p).is_some() {
            files.push(p);
        }
    }
    files.sort_unstable();
    files.reverse();

    Ok(LabelLoader { files_rev: files })
}

/// 3D 标签数据加载器. 每次迭代返回文件路径和读取结果.
#[derive(Debug)]
pub struct LabelLoader {
    files_rev: Vec<PathBuf>,
}

impl Iterator for LabelLoader {
    type Item = (PathBuf, Result<LabelVolume>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files_rev.pop()?;
        let data = open_label(&path);
        Some((path, data))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.files_rev.len(), Some(self.files_rev.len()))
    }
}

impl ExactSizeIterator for LabelLoader {
    #[inline]
    fn len(&self) -> usize {
        self.files_rev.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phantom;

    #[test]
    fn test_label_format() {
        assert_eq!(LabelFormat::from_path("a/b.nii"), Some(LabelFormat::Nifti));
        assert_eq!(LabelFormat::from_path("B.NII.GZ"), Some(LabelFormat::Nifti));
        assert_eq!(LabelFormat::from_path("c.npy"), Some(LabelFormat::Npy));
        assert_eq!(LabelFormat::from_path("d.npz"), None);
        assert_eq!(LabelFormat::from_path("nii"), None);
    }

    #[test]
    fn test_npy_loader() {
        let dir = std::env::temp_dir().join(format!("geod-berry-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let boxes = phantom::two_boxes();
        let line = phantom::line_x(6, 1, 3);
        ndarray_npy::write_npy(dir.join("b.npy"), &boxes.data()).unwrap();
        ndarray_npy::write_npy(dir.join("a.npy"), &line.data()).unwrap();
        fs::write(dir.join("notes.txt"), "skip me").unwrap();

        let loader = label_loader(&dir).unwrap();
        assert_eq!(loader.len(), 2);
        let loaded: Vec<_> = loader.map(|(p, r)| (p, r.unwrap())).collect();
        fs::remove_dir_all(&dir).unwrap();

        assert!(loaded[0].0.ends_with("a.npy"));
        assert_eq!(loaded[0].1, line);
        assert!(loaded[1].0.ends_with("b.npy"));
        assert_eq!(loaded[1].1, boxes);
    }

    #[test]
    fn test_missing_dir() {
        assert!(label_loader("/definitely/not/here").is_err());
    }
}
