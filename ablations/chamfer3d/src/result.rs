//! 实验结果.

use crate::profile::Profile;
use geod_berry::geodesic::Backend;
use std::io::{self, Write};

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(
    name: &str,
    backend: Backend,
    p: &Profile,
    w: &mut W,
) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{:.4}%", f * 100.0),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Weights `{name}`, backend `{backend:?}`:")?;
    writeln!(w, "{S4}Finished cases: {}", p.get_done())?;
    writeln!(w, "{S4}Failed cases: {}", p.get_failed())?;
    writeln!(w, "{S4}Total time: {} us", p.get_time_us())?;
    writeln!(w, "{S4}Most time-consuming case costs {} us", p.get_most_us())?;
    writeln!(
        w,
        "{S4}Average relative error: {}",
        f64_to_display(p.get_avg_err())
    )?;
    match p.get_worst() {
        Some((case, e)) => write!(
            w,
            "{S4}Worst relative error: {} on `{case}`",
            f64_to_display(Some(e))
        )?,
        None => write!(w, "{S4}Worst relative error: /")?,
    }
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, Backend, Profile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (&'static str, Backend, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (key, backend, profile) in self.data.iter() {
            describe_into(key, *backend, profile, &mut buf).expect("Writing into memory error");
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }
    }
}
