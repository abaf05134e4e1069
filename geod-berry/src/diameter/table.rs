//! 结果表的文本输出.

use std::fmt;
use std::io::Write;

use csv::WriterBuilder;

use super::{GeodesicDiameters, GeodesicRecord};
use crate::consts::column;
use crate::Result;

/// 以分隔符文本 (CSV / TSV 等) 形式展示 [`GeodesicDiameters`].
///
/// 第一行为表头, 之后每个标签一行. 找不到的坐标输出 `-1`, 未测得的距离输出 `NaN`.
#[derive(Copy, Clone, Debug)]
pub struct ResultTable<'a> {
    res: &'a GeodesicDiameters,
    delimiter: u8,
}

impl<'a> ResultTable<'a> {
    /// 以 `delimiter` 分隔各列.
    #[inline]
    pub fn with_delimiter(res: &'a GeodesicDiameters, delimiter: u8) -> Self {
        Self { res, delimiter }
    }

    /// 逗号分隔.
    #[inline]
    pub fn csv(res: &'a GeodesicDiameters) -> Self {
        Self::with_delimiter(res, b',')
    }

    /// 制表符分隔.
    #[inline]
    pub fn tsv(res: &'a GeodesicDiameters) -> Self {
        Self::with_delimiter(res, b'\t')
    }

    /// 写入 `w`.
    pub fn write_to<W: Write>(&self, w: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().delimiter(self.delimiter).from_writer(w);
        wtr.write_record(column::ALL)?;
        for r in self.res.iter() {
            wtr.write_record(&row(r))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// 单个标签的一行. 距离保留 6 位小数.
fn row(r: &GeodesicRecord) -> Vec<String> {
    let mut ans = vec![
        r.label.to_string(),
        format!("{:.6}", r.diameter),
        format!("{:.6}", r.radius),
        format!("{:.6}", r.elongation),
    ];
    for (x, y, z) in [r.center_xyz(), r.first_end_xyz(), r.second_end_xyz()] {
        ans.extend([x.to_string(), y.to_string(), z.to_string()]);
    }
    ans
}

impl fmt::Display for ResultTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::with_capacity(64 * (self.res.len() + 1));
        self.write_to(&mut buf).map_err(|_| fmt::Error)?;
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diameter::GeodesicDiameter3d;
    use crate::{phantom, ChamferWeights3d, LabelVolume};
    use ndarray::Array3;

    #[test]
    fn test_header_and_rows() {
        let res = GeodesicDiameter3d::new(ChamferWeights3d::BORGEFORS)
            .unwrap()
            .process(&phantom::line_x(10, 1, 4))
            .unwrap();
        let s = ResultTable::csv(&res).to_string();
        let lines: Vec<_> = s.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], column::ALL.join(","));
        assert_eq!(
            lines[1],
            "4,9.000000,9.000000,1.000000,1,1,1,10,1,1,1,1,1"
        );
    }

    #[test]
    fn test_not_found_sentinel() {
        let labels = LabelVolume::new(Array3::from_elem((2, 2, 2), 5));
        let res = GeodesicDiameter3d::new(ChamferWeights3d::CHESSBOARD)
            .unwrap()
            .process(&labels)
            .unwrap();

        let mut buf = Vec::new();
        ResultTable::tsv(&res).write_to(&mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        let row: Vec<_> = s.lines().nth(1).unwrap().split('\t').collect();
        assert_eq!(row.len(), column::ALL.len());
        assert_eq!(row[0], "5");
        assert_eq!(row[1], "NaN");
        assert!(row[4..].iter().all(|c| *c == "-1"));
    }

    /// 结果表可以被 `csv` 读回, 且每行列数与表头一致.
    #[test]
    fn test_read_back() {
        let res = GeodesicDiameter3d::new(ChamferWeights3d::BORGEFORS)
            .unwrap()
            .process(&phantom::two_boxes())
            .unwrap();
        let text = ResultTable::with_delimiter(&res, b';').to_string();

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(text.as_bytes());
        let header: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, column::ALL);
        let labels: Vec<u32> = rdr
            .records()
            .map(|r| {
                let r = r.unwrap();
                assert_eq!(r.len(), column::ALL.len());
                r[0].parse().unwrap()
            })
            .collect();
        assert_eq!(labels, vec![1, 2]);
    }
}
