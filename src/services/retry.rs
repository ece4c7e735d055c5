//! 重试控制器 - 业务能力层
//!
//! 只负责"带线性退避的有限重试"能力，不关心调用的是什么

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::error::{RemoteError, RetryExhausted};

/// 重试策略
///
/// 第 n 次失败后等待 `base_delay * n` 再重试（线性退避，不是指数退避），
/// 累计失败 `max_retries` 次后放弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// 第 `failures` 次失败之后的等待时间，溢出时取 `Duration::MAX`
    pub fn delay_for(&self, failures: u32) -> Duration {
        self.base_delay.saturating_mul(failures)
    }

    /// 调用 `submit` 直到成功或失败次数达到上限
    ///
    /// # 参数
    /// - `item`: 图片文件名（仅用于日志）
    /// - `submit`: 每次调用产生一个新的请求
    ///
    /// # 返回
    /// 成功时返回响应文本；耗尽时返回 [`RetryExhausted`]，调用方应继续处理下一张图片。
    /// 上限为 0 时仍会调用一次。
    pub async fn attempt<F, Fut>(&self, item: &str, mut submit: F) -> Result<String, RetryExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, RemoteError>>,
    {
        let mut retry_count = 0u32;

        loop {
            let err = match submit().await {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            retry_count += 1;
            warn!(
                "⚠️ 图片 {} 调用失败 (尝试 {}/{}): {}",
                item, retry_count, self.max_retries, err
            );

            if retry_count >= self.max_retries {
                error!("❌ 图片 {} 已达到最大重试次数，无法生成内容", item);
                return Err(RetryExhausted {
                    item: item.to_string(),
                    attempts: retry_count,
                    last_error: err,
                });
            }

            let wait = self.delay_for(retry_count);
            info!("⏳ {} 秒后重试...", wait.as_secs_f64());
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tokio::time::Instant;

    /// 前 `failures` 次返回错误，之后成功；记录每次调用的时间
    fn flaky(failures: u32, calls: &RefCell<Vec<Instant>>) -> impl FnMut() -> std::future::Ready<Result<String, RemoteError>> + '_ {
        move || {
            let mut calls = calls.borrow_mut();
            calls.push(Instant::now());
            let n = calls.len() as u32;
            std::future::ready(if n <= failures {
                Err(RemoteError::new(format!("503 第 {} 次", n)))
            } else {
                Ok("left".to_string())
            })
        }
    }

    fn gaps(calls: &[Instant]) -> Vec<Duration> {
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// 暂停时钟按毫秒刻度推进，允许少量误差
    fn assert_gaps(actual: &[Duration], expected: &[Duration]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!(
                *a >= *e && *a < *e + Duration::from_millis(20),
                "{:?} vs {:?}",
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_delay_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
    }

    #[test]
    fn test_huge_base_delay_saturates() {
        let policy = RetryPolicy::new(4, Duration::from_secs(u64::MAX));
        assert_eq!(policy.delay_for(3), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_try_does_not_sleep() {
        let calls = RefCell::new(Vec::new());
        let start = Instant::now();

        let text = RetryPolicy::default()
            .attempt("001.jpg", flaky(0, &calls))
            .await
            .unwrap();

        assert_eq!(text, "left");
        assert_eq!(calls.borrow().len(), 1);
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_k_times_then_succeeds() {
        for k in 1..4u32 {
            let calls = RefCell::new(Vec::new());

            let text = RetryPolicy::default()
                .attempt("002.jpg", flaky(k, &calls))
                .await
                .unwrap();

            assert_eq!(text, "left");
            let calls = calls.into_inner();
            assert_eq!(calls.len() as u32, k + 1);
            let expected: Vec<Duration> = (1..=k).map(|s| Duration::from_secs(s as u64)).collect();
            assert_gaps(&gaps(&calls), &expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_exhausts_after_max_retries() {
        let calls = RefCell::new(Vec::new());

        let err = RetryPolicy::default()
            .attempt("003.png", flaky(u32::MAX, &calls))
            .await
            .unwrap_err();

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 4);
        assert_gaps(
            &gaps(&calls),
            &[
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
            ],
        );
        assert_eq!(err.item, "003.png");
        assert_eq!(err.attempts, 4);
        assert_eq!(err.last_error.message(), "503 第 4 次");
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_base_delay_scales_backoff() {
        let calls = RefCell::new(Vec::new());
        let policy = RetryPolicy::new(3, Duration::from_millis(500));

        let err = policy
            .attempt("004.png", flaky(u32::MAX, &calls))
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_gaps(
            &gaps(&calls.into_inner()),
            &[Duration::from_millis(500), Duration::from_millis(1000)],
        );
    }
}
