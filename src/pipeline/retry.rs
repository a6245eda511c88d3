use std::time::Duration;

/// 拉取失败后的处理策略
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// 第一次失败就停止采集
    #[default]
    FailFast,
    /// 最多容忍 `max_retries` 次连续失败，等待时间从 `initial` 开始翻倍，上限 `max`
    Backoff {
        max_retries: u32,
        initial: Duration,
        max: Duration,
    },
}

impl RetryPolicy {
    /// 连续失败 `consecutive_failures` 次（从 1 计）后下一次尝试前的等待；
    /// 策略用尽时返回 `None`
    pub fn delay_after(&self, consecutive_failures: u32) -> Option<Duration> {
        match *self {
            RetryPolicy::FailFast => None,
            RetryPolicy::Backoff { max_retries, initial, max } => {
                if consecutive_failures == 0 || consecutive_failures > max_retries {
                    return None;
                }
                let shift = (consecutive_failures - 1).min(31);
                let delay = initial.saturating_mul(1u32 << shift);
                Some(delay.min(max))
            }
        }
    }
}
