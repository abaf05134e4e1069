//! 倒角权重 / 传播后端消融实验.
//!
//! 在已知解析直径的体模上比较各组预置权重和两种传播后端的误差与耗时.
//! 若 `$GEOD_LABEL_DIR` (或 `$HOME/dataset/labels`) 存在, 额外在真实数据上输出结果表.

mod cases;
mod profile;
mod result;
mod runner;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
        .expect("Logger initialization error");

    runner::run().analyze();
    runner::run_dataset();
}
