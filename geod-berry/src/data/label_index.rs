use std::collections::HashMap;

use crate::consts::label::is_labeled;
use crate::consts::DENSE_LABEL_LIMIT;

/// 标签值到紧凑索引 `[0, n)` 的映射.
///
/// 标签值较小时使用以标签值为下标的稠密数组, 否则使用哈希表.
/// 两者在功能上等价. 构建后在一次计算中保持不变.
#[derive(Debug, Clone)]
pub struct LabelIndex {
    labels: Vec<u32>,
    lookup: Lookup,
}

#[derive(Debug, Clone)]
enum Lookup {
    /// `dense[label] == index`, 不存在的标签为 `usize::MAX`.
    Dense(Vec<usize>),
    Sparse(HashMap<u32, usize>),
}

impl LabelIndex {
    /// 由标签集合创建索引表. `labels` 中的重复值只保留第一次出现的位置.
    ///
    /// 标签 `0` 是背景, 会被跳过, 查询时总返回 `None`.
    pub fn new(labels: &[u32]) -> Self {
        let labels: Vec<u32> = labels.iter().copied().filter(|l| is_labeled(*l)).collect();

        let mut uniq = Vec::with_capacity(labels.len());
        let max = labels.iter().copied().max().unwrap_or(0);
        let dense = max <= DENSE_LABEL_LIMIT || (max as usize) <= labels.len() * 4;

        let lookup = if dense {
            let mut table = vec![usize::MAX; max as usize + 1];
            for &l in &labels {
                if table[l as usize] == usize::MAX {
                    table[l as usize] = uniq.len();
                    uniq.push(l);
                }
            }
            Lookup::Dense(table)
        } else {
            let mut table = HashMap::with_capacity(labels.len());
            for &l in &labels {
                table.entry(l).or_insert_with(|| {
                    uniq.push(l);
                    uniq.len() - 1
                });
            }
            Lookup::Sparse(table)
        };

        Self {
            labels: uniq,
            lookup,
        }
    }

    /// 获取 `label` 的紧凑索引. 背景或未知标签返回 `None`.
    #[inline]
    pub fn get(&self, label: u32) -> Option<usize> {
        match &self.lookup {
            Lookup::Dense(t) => t.get(label as usize).copied().filter(|i| *i != usize::MAX),
            Lookup::Sparse(t) => t.get(&label).copied(),
        }
    }

    /// 按索引顺序排列的标签值.
    #[inline]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// 标签个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 是否没有任何标签?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 是否使用了稠密数组?
    #[inline]
    pub fn is_dense(&self) -> bool {
        matches!(self.lookup, Lookup::Dense(_))
    }
}
