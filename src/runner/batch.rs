//! バッチ処理ループ
//!
//! 選択された行を入力順に1件ずつ処理する。行単位の失敗はその行の
//! error 注釈として記録し、ループは継続する。

use super::dataset::Dataset;
use crate::error::RowProcessingFailure;
use crate::generator::AltTextGenerator;
use alt_text_common::{check_alt_quality, AnalysisStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

/// 中断トークン
///
/// cancel() 後は次の行に進まない。処理中の行は完了させる。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// 中断可能な待機。待機し切ったら true
    pub async fn sleep(&self, duration: Duration) -> bool {
        let notified = self.notify.notified();
        if self.is_cancelled() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => !self.is_cancelled(),
            _ = notified => false,
        }
    }
}

/// バッチ設定
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// 行間の待機（1ステップ方式のみ）、2ステップではStep間に使う
    pub delay: Duration,
    /// 処理済み行も再生成する
    pub overwrite: bool,
}

/// バッチ結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 生成を試みた行数
    pub attempted: usize,
    pub succeeded: usize,
    pub decorative: usize,
    pub failed: usize,
    /// 処理済みのため飛ばした行数
    pub skipped: usize,
    pub quality_warnings: usize,
    pub cancelled: bool,
}

/// 対話実行用のプログレスバー
pub fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// 選択行を処理する
///
/// 行の注釈4列は1回の apply で書き換えるため、中断時も行の状態は
/// 「以前のまま」か「完全に書き込み済み」のどちらかになる。
pub async fn run_batch<G>(
    dataset: &mut Dataset,
    rows: &[usize],
    generator: &G,
    options: &BatchOptions,
    cancel: &CancelToken,
    progress: &ProgressBar,
) -> BatchReport
where
    G: AltTextGenerator + ?Sized,
{
    let approach = generator.approach();
    let mut report = BatchReport::default();

    for (i, &row) in rows.iter().enumerate() {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        if !options.overwrite && dataset.is_processed(row) {
            report.skipped += 1;
            progress.inc(1);
            continue;
        }

        let identity = dataset.identity(row);
        progress.set_message(format!("{} ({}/{})", identity, i + 1, rows.len()));
        info!("[{}/{}] {} {}", i + 1, rows.len(), identity, dataset.image_url(row));
        report.attempted += 1;

        let result = match dataset.request(row) {
            Ok(request) => generator
                .generate(&request)
                .await
                .map_err(RowProcessingFailure::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                match outcome.status {
                    AnalysisStatus::Decorative => {
                        info!("装飾画像と判定: {}", identity);
                        report.decorative += 1;
                    }
                    _ => {
                        let issues = check_alt_quality(&outcome.alt_text);
                        for issue in &issues {
                            warn!("alt品質警告（{}行目）: {}", row + 1, issue);
                        }
                        if !issues.is_empty() {
                            report.quality_warnings += 1;
                        }
                        info!("alt: {}", outcome.alt_text);
                        report.succeeded += 1;
                    }
                }
                dataset.apply_outcome(row, approach, outcome);
            }
            Err(failure) => {
                warn!("{}行目の生成に失敗: {}", row + 1, failure);
                dataset.apply_failure(row, approach, &failure);
                report.failed += 1;
            }
        }
        progress.inc(1);

        let is_last = i + 1 == rows.len();
        if approach.paces_between_rows() && !options.delay.is_zero() && !is_last {
            if !cancel.sleep(options.delay).await {
                report.cancelled = true;
                break;
            }
        }
    }

    if report.cancelled {
        warn!("中断されました（{}件処理済み）", report.attempted);
    }
    progress.finish_and_clear();
    report
}
