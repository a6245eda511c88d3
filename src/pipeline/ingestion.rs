use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{error, info, trace, warn};

use crate::client::{FetchError, OpenIrisClient};
use crate::types::EyesSample;

use super::coordinator::{RedrawRequest, TraceCoordinator};
use super::retry::RetryPolicy;

/// 退避等待时检查关闭信号的间隔
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// 帧来源，真实实现是 [`OpenIrisClient`]
pub trait FrameSource {
    fn fetch_typed(&mut self) -> Result<EyesSample, FetchError>;

    fn close(self)
    where
        Self: Sized;
}

impl FrameSource for OpenIrisClient {
    fn fetch_typed(&mut self) -> Result<EyesSample, FetchError> {
        OpenIrisClient::fetch_typed(self)
    }

    fn close(self) {
        OpenIrisClient::close(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestionSummary {
    pub frames: u64,
    pub no_data_frames: u64,
    pub failed_attempts: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("giving up after {attempts} consecutive failed fetches: {source}")]
    RetriesExhausted { attempts: u32, source: FetchError },
}

/// 采集线程结束时发给界面的消息
#[derive(Debug, Clone, PartialEq)]
pub enum IngestionExit {
    Stopped(IngestionSummary),
    Failed(String),
}

/// 采集循环：拉取 → 解码 → 追加 → 标记 Dirty → 请求重绘
///
/// 在独立线程运行，从不等待界面。每次拉取后检查关闭信号，
/// 阻塞中的拉取最多让退出推迟一个 socket 超时。
pub struct IngestionWorker<S: FrameSource, R: RedrawRequest> {
    source: S,
    coordinator: Arc<TraceCoordinator>,
    redraw: R,
    policy: RetryPolicy,
    shutdown: Arc<AtomicBool>,
    exit_sender: Option<Sender<IngestionExit>>,
}

impl<S: FrameSource, R: RedrawRequest> IngestionWorker<S, R> {
    pub fn new(
        source: S,
        coordinator: Arc<TraceCoordinator>,
        redraw: R,
        policy: RetryPolicy,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            coordinator,
            redraw,
            policy,
            shutdown,
            exit_sender: None,
        }
    }

    /// 循环结束时把结果发到 `sender`
    pub fn with_exit_sender(mut self, sender: Sender<IngestionExit>) -> Self {
        self.exit_sender = Some(sender);
        self
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn run(mut self) -> Result<IngestionSummary, IngestionError> {
        info!(
            "Ingestion started, tracking {} eye, policy {:?}",
            self.coordinator.eye(),
            self.policy
        );

        let result = self.poll_loop();

        let exit = match &result {
            Ok(summary) => {
                info!(
                    "Ingestion stopped: {} frames, {} empty, {} failed attempts",
                    summary.frames, summary.no_data_frames, summary.failed_attempts
                );
                IngestionExit::Stopped(*summary)
            }
            Err(e) => {
                error!("Ingestion failed: {}", e);
                IngestionExit::Failed(e.to_string())
            }
        };

        let IngestionWorker {
            source,
            redraw,
            exit_sender,
            ..
        } = self;
        source.close();

        if let Some(sender) = exit_sender {
            if sender.send(exit).is_err() {
                // 界面已关闭
                info!("Ingestion exit channel disconnected");
            }
        }
        redraw.request_redraw();

        result
    }

    fn poll_loop(&mut self) -> Result<IngestionSummary, IngestionError> {
        let mut summary = IngestionSummary::default();
        let mut consecutive_failures: u32 = 0;

        loop {
            let fetched = self.source.fetch_typed();

            if self.is_shutdown() {
                info!("Ingestion received shutdown signal, exiting gracefully");
                return Ok(summary);
            }

            match fetched {
                Ok(sample) => {
                    consecutive_failures = 0;
                    if sample.has_data() {
                        summary.frames += 1;
                        trace!("Frame {}", sample.eye(self.coordinator.eye()).frame_number);
                    } else {
                        summary.no_data_frames += 1;
                    }
                    self.coordinator.record(sample);
                    self.redraw.request_redraw();
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    summary.failed_attempts += 1;

                    match self.policy.delay_after(consecutive_failures) {
                        Some(delay) => {
                            warn!(
                                "Fetch failed ({} in a row), retrying in {:?}: {}",
                                consecutive_failures, delay, e
                            );
                            if !self.sleep_unless_shutdown(delay) {
                                info!("Ingestion received shutdown signal during backoff");
                                return Ok(summary);
                            }
                        }
                        None => {
                            return Err(IngestionError::RetriesExhausted {
                                attempts: consecutive_failures,
                                source: e,
                            });
                        }
                    }
                }
            }
        }
    }

    /// 分段睡眠；收到关闭信号时返回 `false`
    fn sleep_unless_shutdown(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        loop {
            if self.is_shutdown() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(SHUTDOWN_POLL));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportError;
    use crate::config::PlotConfig;
    use crate::types::{EyeSample, Point};
    use crossbeam_channel::bounded;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    /// 按脚本返回结果；脚本耗尽后设置关闭信号
    struct ScriptedSource {
        script: VecDeque<Result<EyesSample, FetchError>>,
        shutdown: Arc<AtomicBool>,
        closed: Arc<AtomicBool>,
        calls: Arc<AtomicUsize>,
    }

    impl FrameSource for ScriptedSource {
        fn fetch_typed(&mut self) -> Result<EyesSample, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.pop_front() {
                Some(result) => result,
                None => {
                    self.shutdown.store(true, Ordering::SeqCst);
                    Err(timeout())
                }
            }
        }

        fn close(self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingRedraw(AtomicUsize);

    impl RedrawRequest for Arc<CountingRedraw> {
        fn request_redraw(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn timeout() -> FetchError {
        FetchError::Transport(TransportError::Timeout { timeout_ms: 1000 })
    }

    fn frame(n: i64) -> EyesSample {
        let left = EyeSample {
            frame_number: n,
            pupil_center: Point::new(n as f64 * 10.0, n as f64 * 20.0),
            ..Default::default()
        };
        EyesSample::new(left, EyeSample::default())
    }

    struct Harness {
        coordinator: Arc<TraceCoordinator>,
        redraw: Arc<CountingRedraw>,
        shutdown: Arc<AtomicBool>,
        closed: Arc<AtomicBool>,
        calls: Arc<AtomicUsize>,
    }

    fn run_script(
        script: Vec<Result<EyesSample, FetchError>>,
        policy: RetryPolicy,
    ) -> (Harness, Result<IngestionSummary, IngestionError>, Option<IngestionExit>) {
        let harness = Harness {
            coordinator: Arc::new(TraceCoordinator::new(&PlotConfig {
                buffer_capacity: 3,
                ..Default::default()
            })),
            redraw: Arc::new(CountingRedraw::default()),
            shutdown: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let source = ScriptedSource {
            script: script.into(),
            shutdown: Arc::clone(&harness.shutdown),
            closed: Arc::clone(&harness.closed),
            calls: Arc::clone(&harness.calls),
        };
        let (tx, rx) = bounded(1);
        let result = IngestionWorker::new(
            source,
            Arc::clone(&harness.coordinator),
            Arc::clone(&harness.redraw),
            policy,
            Arc::clone(&harness.shutdown),
        )
        .with_exit_sender(tx)
        .run();
        (harness, result, rx.try_recv().ok())
    }

    #[test]
    fn test_frames_are_appended_until_shutdown() {
        let (h, result, exit) = run_script(
            vec![Ok(frame(1)), Ok(frame(2)), Ok(frame(3)), Ok(frame(4))],
            RetryPolicy::FailFast,
        );

        let summary = result.unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(exit, Some(IngestionExit::Stopped(summary)));
        assert!(h.closed.load(Ordering::SeqCst));

        let snap = h.coordinator.take_if_dirty().unwrap();
        assert_eq!(snap.index, vec![2, 3, 4]);
        assert_eq!(snap.x, vec![20.0, 30.0, 40.0]);
        assert_eq!(snap.y, vec![40.0, 60.0, 80.0]);
        // 每帧一次重绘请求，退出时再一次
        assert_eq!(h.redraw.0.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_fail_fast_stops_on_first_error() {
        let (h, result, exit) = run_script(
            vec![Ok(frame(1)), Err(timeout()), Ok(frame(2))],
            RetryPolicy::FailFast,
        );

        match result {
            Err(IngestionError::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 1);
                assert!(matches!(source, FetchError::Transport(TransportError::Timeout { .. })));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(exit, Some(IngestionExit::Failed(_))));
        assert!(h.closed.load(Ordering::SeqCst));
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
        // 最后一帧保留
        assert_eq!(h.coordinator.snapshot().index, vec![1]);
    }

    #[test]
    fn test_backoff_recovers_and_resets_counter() {
        let policy = RetryPolicy::Backoff {
            max_retries: 2,
            initial: Duration::from_millis(1),
            max: Duration::from_millis(2),
        };
        let (h, result, _) = run_script(
            vec![
                Err(timeout()),
                Err(timeout()),
                Ok(frame(1)),
                Err(timeout()),
                Err(timeout()),
                Ok(frame(2)),
            ],
            policy,
        );

        let summary = result.unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.failed_attempts, 4);
        assert_eq!(h.coordinator.snapshot().index, vec![1, 2]);
    }

    #[test]
    fn test_backoff_exhausts() {
        let policy = RetryPolicy::Backoff {
            max_retries: 2,
            initial: Duration::from_millis(1),
            max: Duration::from_millis(1),
        };
        let (h, result, _) = run_script(vec![Err(timeout()), Err(timeout()), Err(timeout())], policy);

        assert!(matches!(result, Err(IngestionError::RetriesExhausted { attempts: 3, .. })));
        assert_eq!(h.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_fetch_leaves_state_untouched() {
        let (h, result, _) = run_script(vec![Err(timeout())], RetryPolicy::FailFast);
        assert!(result.is_err());
        assert!(!h.coordinator.is_dirty());
        assert!(h.coordinator.snapshot().is_empty());
        // 只有退出时的那一次
        assert_eq!(h.redraw.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_data_frames_are_counted_not_plotted() {
        let (h, result, _) = run_script(
            vec![Ok(frame(1)), Ok(EyesSample::no_data()), Ok(frame(2))],
            RetryPolicy::FailFast,
        );
        let summary = result.unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.no_data_frames, 1);
        assert_eq!(h.coordinator.snapshot().index, vec![1, 2]);
    }

    #[test]
    fn test_shutdown_interrupts_backoff() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let coordinator = Arc::new(TraceCoordinator::new(&PlotConfig::default()));
        let source = ScriptedSource {
            script: VecDeque::from(vec![Err(timeout())]),
            shutdown: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let worker = IngestionWorker::new(
            source,
            coordinator,
            Arc::new(CountingRedraw::default()),
            RetryPolicy::Backoff {
                max_retries: 10,
                initial: Duration::from_secs(30),
                max: Duration::from_secs(30),
            },
            Arc::clone(&shutdown),
        );

        let started = Instant::now();
        let handle = thread::spawn(move || worker.run());
        thread::sleep(Duration::from_millis(100));
        shutdown.store(true, Ordering::SeqCst);

        let result = handle.join().unwrap();
        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_real_client_against_fake_server() {
        use crate::config::ServerConfig;
        use std::net::UdpSocket;

        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();
        // 服务线程回复两次后退出；这里留一个句柄让端口保持打开但不再回复，
        // 否则第三次请求会收到 ICMP 端口不可达而不是超时
        let silent = server.try_clone().unwrap();
        let replies = vec![
            r#"{"Left":{"FrameNumber":1,"Pupil":{"Center":{"X":300,"Y":200},"Size":{"Width":5,"Height":5}},"CRs":[]},"Right":{"FrameNumber":1,"Pupil":{"Center":{"X":0,"Y":0},"Size":{"Width":0,"Height":0}},"CRs":[]}}"#,
            r#"{"Left":{"FrameNumber":2,"Pupil":{"Center":{"X":310,"Y":210},"Size":{"Width":5,"Height":5}},"CRs":[]},"Right":{"FrameNumber":2,"Pupil":{"Center":{"X":0,"Y":0},"Size":{"Width":0,"Height":0}},"CRs":[]}}"#,
        ];
        let server_thread = thread::spawn(move || {
            let mut buf = [0u8; 64];
            for reply in replies {
                let (_, peer) = server.recv_from(&mut buf).unwrap();
                server.send_to(reply.as_bytes(), peer).unwrap();
            }
        });

        let client = OpenIrisClient::connect(&ServerConfig {
            host: "127.0.0.1".to_string(),
            port: addr.port(),
            timeout_seconds: 0.2,
            ..Default::default()
        })
        .unwrap();
        let coordinator = Arc::new(TraceCoordinator::new(&PlotConfig::default()));

        // 第三次请求超时 → FailFast 结束
        let result = IngestionWorker::new(
            client,
            Arc::clone(&coordinator),
            Arc::new(CountingRedraw::default()),
            RetryPolicy::FailFast,
            Arc::new(AtomicBool::new(false)),
        )
        .run();
        server_thread.join().unwrap();

        assert_eq!(coordinator.snapshot().index, vec![1, 2]);
        assert_eq!(coordinator.snapshot().x, vec![300.0, 310.0]);
        match result {
            Err(IngestionError::RetriesExhausted { source: FetchError::Transport(t), .. }) => {
                assert!(t.is_timeout())
            }
            other => panic!("unexpected {:?}", other),
        }
        drop(silent);
    }

    #[test]
    fn test_refused_server_fails_fast_without_waiting_for_timeout() {
        use crate::config::ServerConfig;
        use std::net::UdpSocket;

        let port = {
            let gone = UdpSocket::bind("127.0.0.1:0").unwrap();
            gone.local_addr().unwrap().port()
        };
        let client = OpenIrisClient::connect(&ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout_seconds: 5.0,
            ..Default::default()
        })
        .unwrap();

        let started = Instant::now();
        let (tx, rx) = bounded(1);
        let result = IngestionWorker::new(
            client,
            Arc::new(TraceCoordinator::new(&PlotConfig::default())),
            Arc::new(CountingRedraw::default()),
            RetryPolicy::FailFast,
            Arc::new(AtomicBool::new(false)),
        )
        .with_exit_sender(tx)
        .run();

        assert!(started.elapsed() < Duration::from_secs(4));
        match result {
            Err(IngestionError::RetriesExhausted { source: FetchError::Transport(t), .. }) => {
                assert!(t.is_refused(), "unexpected error: {}", t)
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(rx.try_recv(), Ok(IngestionExit::Failed(_))));
    }
}
