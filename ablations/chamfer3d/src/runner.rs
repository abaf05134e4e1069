//! 程序运行函数.

use crate::cases::{self, Case};
use crate::profile::Profile;
use crate::result::AblationResult;
use geod_berry::chamfer::Preset;
use geod_berry::prelude::*;
use std::thread;
use utils::loader;

/// 在所有用例上运行一组 (权重, 后端) 配置.
fn study(preset: Preset, backend: Backend, cases: &[Case]) -> Profile {
    let mut profile = Profile::new();
    let algo = match GeodesicDiameter3d::with_config(DiameterConfig {
        weights: preset.into(),
        backend,
    }) {
        Ok(algo) => algo,
        Err(e) => {
            log::error!("{}: {e}", preset.name());
            cases.iter().for_each(|_| profile.count_failed());
            return profile;
        }
    };

    for case in cases {
        let since = profile.start();
        let diameter = algo
            .process(&case.labels)
            .ok()
            .and_then(|res| res.get(1).map(|r| r.diameter))
            .filter(|d| !d.is_nan());
        match diameter {
            Some(d) => {
                let err = utils::relative_error(d, case.truth);
                log::info!(
                    "{} / {backend:?} on `{}`: {d:.4} (truth {:.4})",
                    preset.name(),
                    case.name,
                    case.truth
                );
                profile.count_done(case.name, since, err);
            }
            None => {
                log::warn!("{} / {backend:?} failed on `{}`", preset.name(), case.name);
                profile.count_failed();
            }
        }
    }
    profile
}

/// 实际运行. 每组配置一个线程, 同时运行的线程数不超过核心数.
pub fn run() -> AblationResult {
    let cases = cases::all();
    let tasks: Vec<(Preset, Backend)> = ChamferWeights3d::PRESETS
        .into_iter()
        .flat_map(|p| [(p, Backend::RasterScan), (p, Backend::Dijkstra)])
        .collect();

    println!("Running ablation studies on {} cpus...", utils::cpus());
    let mut out = Vec::with_capacity(tasks.len());
    for wave in tasks.chunks(utils::cpus().max(1)) {
        thread::scope(|s| {
            let cases = cases.as_slice();
            let handles: Vec<_> = wave
                .iter()
                .map(|&(p, b)| s.spawn(move || (p.name(), b, study(p, b, cases))))
                .collect();
            out.extend(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            );
        });
    }
    AblationResult::from_iter(out)
}

/// 在真实标签数据上运行默认配置, 并输出结果表.
pub fn run_dataset() {
    let Some(files) = loader::label_loader_from_env_or_home() else {
        log::info!("no label directory found, skipping dataset run");
        return;
    };

    let algo = GeodesicDiameter3d::with_config(DiameterConfig::default())
        .expect("Default configuration error");
    for (path, labels) in files {
        let labels = match labels {
            Ok(v) => v,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                continue;
            }
        };
        println!("File {}...", path.display());
        match algo.process(&labels) {
            Ok(res) => {
                print!("{}", ResultTable::csv(&res));
                for w in res.warnings() {
                    let p = path.display();
                    log::warn!("{p}: label {} not found at {}", w.label, w.stage);
                }
            }
            Err(e) => log::error!("{}: {e}", path.display()),
        }
        utils::sep();
    }
}
