//! 有界交接队列
//!
//! 采集任务与分发任务之间唯一的共享状态。锁只在内存操作期间持有。

use daq_telemetry::record_queue_dropped;
use domain::ReadingSet;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::warn;

/// 队列满时的处理策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// 丢弃最旧的集合并入队新集合，从不等待
    DropOldest,
    /// 最多等待 `timeout`，仍无空位则丢弃新集合
    Block { timeout: Duration },
}

/// 入队结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Enqueued,
    /// 入队成功，但挤掉了最旧的一个集合
    DroppedOldest,
    /// 等待超时，新集合被丢弃
    DroppedNew,
    Closed,
}

struct QueueState {
    items: VecDeque<ReadingSet>,
    closed: bool,
}

pub struct HandoffQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    policy: OverflowPolicy,
    items_ready: Notify,
    space_ready: Notify,
}

impl HandoffQueue {
    /// `capacity` 小于 1 时按 1 处理。
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            capacity,
            policy,
            items_ready: Notify::new(),
            space_ready: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub async fn push(&self, set: ReadingSet) -> PushOutcome {
        match self.policy {
            OverflowPolicy::DropOldest => self.push_drop_oldest(set).await,
            OverflowPolicy::Block { timeout } => self.push_blocking(set, timeout).await,
        }
    }

    async fn push_drop_oldest(&self, set: ReadingSet) -> PushOutcome {
        let mut state = self.state.lock().await;
        if state.closed {
            return PushOutcome::Closed;
        }
        let mut outcome = PushOutcome::Enqueued;
        while state.items.len() >= self.capacity {
            if let Some(evicted) = state.items.pop_front() {
                record_queue_dropped();
                warn!(
                    target: "daq.pipeline",
                    dropped_cycle_id = %evicted.cycle_id(),
                    incoming_cycle_id = %set.cycle_id(),
                    capacity = self.capacity,
                    "queue_full_dropped_oldest"
                );
                outcome = PushOutcome::DroppedOldest;
            }
        }
        state.items.push_back(set);
        drop(state);
        self.items_ready.notify_one();
        outcome
    }

    async fn push_blocking(&self, set: ReadingSet, timeout: Duration) -> PushOutcome {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.space_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.state.lock().await;
                if state.closed {
                    return PushOutcome::Closed;
                }
                if state.items.len() < self.capacity {
                    state.items.push_back(set);
                    drop(state);
                    self.items_ready.notify_one();
                    return PushOutcome::Enqueued;
                }
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                record_queue_dropped();
                warn!(
                    target: "daq.pipeline",
                    dropped_cycle_id = %set.cycle_id(),
                    waited_ms = timeout.as_millis() as u64,
                    "queue_full_dropped_new"
                );
                return PushOutcome::DroppedNew;
            }
        }
    }

    /// 取出一个集合；队列为空时挂起。队列关闭且为空时返回 `None`。
    pub async fn pop(&self) -> Option<ReadingSet> {
        loop {
            let notified = self.items_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.state.lock().await;
                if let Some(set) = state.items.pop_front() {
                    drop(state);
                    self.space_ready.notify_one();
                    return Some(set);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    pub async fn try_pop(&self) -> Option<ReadingSet> {
        let set = self.state.lock().await.items.pop_front();
        if set.is_some() {
            self.space_ready.notify_one();
        }
        set
    }

    /// 关闭队列：之后的 push 返回 `Closed`，pop 取完剩余集合后返回 `None`。
    pub async fn close(&self) {
        self.state.lock().await.closed = true;
        self.items_ready.notify_waiters();
        self.space_ready.notify_waiters();
    }

    /// 丢弃全部剩余集合，返回丢弃数量。
    pub async fn discard_all(&self) -> usize {
        let mut state = self.state.lock().await;
        let discarded = state.items.len();
        state.items.clear();
        drop(state);
        if discarded > 0 {
            self.space_ready.notify_waiters();
        }
        discarded
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
