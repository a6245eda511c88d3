use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use log::trace;

use crate::config::PlotConfig;
use crate::ring::RingBuffer;
use crate::types::{Eye, EyesSample};

/// 让渲染端尽快重绘的通知接口
///
/// 实现不能阻塞，采集线程每追加一帧就调用一次。
pub trait RedrawRequest: Send + Sync {
    fn request_redraw(&self);
}

impl RedrawRequest for egui::Context {
    fn request_redraw(&self) {
        self.request_repaint();
    }
}

/// 界面上下文创建后才绑定的重绘目标（此时采集线程已经在跑）。
/// 绑定前的请求直接丢弃，由界面的定时重绘补上。
#[derive(Debug, Clone, Default)]
pub struct DeferredRedraw {
    ctx: Arc<OnceLock<egui::Context>>,
}

impl DeferredRedraw {
    pub fn attach(&self, ctx: egui::Context) {
        let _ = self.ctx.set(ctx);
    }

    pub fn is_attached(&self) -> bool {
        self.ctx.get().is_some()
    }
}

impl RedrawRequest for DeferredRedraw {
    fn request_redraw(&self) {
        if let Some(ctx) = self.ctx.get() {
            ctx.request_repaint();
        }
    }
}

/// 一次重绘所需的全部数据，取出后不再需要加锁
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSnapshot {
    pub index: Vec<i64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// `[first_index, first_index + capacity)`
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl TraceSnapshot {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn last_index(&self) -> Option<i64> {
        self.index.last().copied()
    }
}

#[derive(Debug)]
struct TraceState {
    // 三个通道按同一顺序写入，长度与头尾始终一致
    index: RingBuffer<i64>,
    x: RingBuffer<f64>,
    y: RingBuffer<f64>,
    dirty: bool,
    latest: Option<EyesSample>,
    frames: u64,
}

impl TraceState {
    fn append(&mut self, index: i64, x: f64, y: f64) {
        self.index.append(index);
        self.x.append(x);
        self.y.append(y);
        debug_assert!(self.index.len() == self.x.len() && self.x.len() == self.y.len());
    }
}

/// 采集线程与界面线程共享的状态
///
/// 三个曲线通道和 dirty 标记由同一把锁保护：追加 + 标记 Dirty 是一个临界区，
/// 取快照 + 标记 Clean 是另一个，所以界面不会看到追加了一半的帧或错位的通道。
/// 重绘前的多次追加合并成一次快照，内容为最新数据。
#[derive(Debug)]
pub struct TraceCoordinator {
    state: Mutex<TraceState>,
    eye: Eye,
    capacity: usize,
    y_range: (f64, f64),
}

impl TraceCoordinator {
    pub fn new(config: &PlotConfig) -> Self {
        let capacity = config.buffer_capacity.max(1);
        Self {
            state: Mutex::new(TraceState {
                index: RingBuffer::new(capacity),
                x: RingBuffer::new(capacity),
                y: RingBuffer::new(capacity),
                dirty: false,
                latest: None,
                frames: 0,
            }),
            eye: config.plotted_eye,
            capacity,
            y_range: (config.y_min, config.y_max),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TraceState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn eye(&self) -> Eye {
        self.eye
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 追加一个点并标记为 Dirty
    pub fn append(&self, index: i64, x: f64, y: f64) {
        let mut state = self.lock();
        state.append(index, x, y);
        state.dirty = true;
    }

    /// 记录一帧解码结果：总是成为最新帧；有数据的帧还会把跟踪眼的帧号和
    /// 瞳孔中心追加到曲线。返回曲线是否变化。
    pub fn record(&self, sample: EyesSample) -> bool {
        let mut state = self.lock();
        let appended = if sample.has_data() {
            let eye = sample.eye(self.eye);
            state.append(eye.frame_number, eye.pupil_center.x, eye.pupil_center.y);
            state.frames += 1;
            true
        } else {
            false
        };
        state.latest = Some(sample);
        state.dirty = true;
        appended
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// 有新数据时取出快照并回到 Clean；Clean 时返回 None
    pub fn take_if_dirty(&self) -> Option<TraceSnapshot> {
        let mut state = self.lock();
        if !state.dirty {
            return None;
        }
        let snapshot = self.snapshot_locked(&state);
        state.dirty = false;
        trace!("Trace snapshot taken: {} points", snapshot.len());
        Some(snapshot)
    }

    /// 取快照，不改动 dirty 标记
    pub fn snapshot(&self) -> TraceSnapshot {
        let state = self.lock();
        self.snapshot_locked(&state)
    }

    fn snapshot_locked(&self, state: &TraceState) -> TraceSnapshot {
        let index = state.index.snapshot();
        let first = index.first().copied().unwrap_or(0) as f64;
        TraceSnapshot {
            x: state.x.snapshot(),
            y: state.y.snapshot(),
            index,
            x_range: (first, first + self.capacity as f64),
            y_range: self.y_range,
        }
    }

    pub fn latest_sample(&self) -> Option<EyesSample> {
        self.lock().latest.clone()
    }

    pub fn frames_recorded(&self) -> u64 {
        self.lock().frames
    }
}
