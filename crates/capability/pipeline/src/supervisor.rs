//! 流水线监管
//!
//! 状态：`Idle → Acquiring → Queued → Draining → Idle`，任意状态收到取消后进入 `Shutdown`。
//! 采集任务上报 `Idle/Acquiring/Queued/Shutdown`，分发任务上报 `Idle/Draining/Shutdown`。

use crate::{CycleOrchestrator, CycleOutcome, HandoffQueue, OverflowPolicy, Recorder};
use daq_dispatch::DispatchFanout;
use daq_telemetry::record_sets_discarded;
use domain::ReadingSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 监管状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Acquiring,
    Queued,
    Draining,
    Shutdown,
}

/// 监管参数。
#[derive(Debug, Clone, Copy)]
pub struct SupervisorSettings {
    pub poll_interval: Duration,
    pub queue_capacity: usize,
    pub overflow: OverflowPolicy,
    /// 取消后继续处理已入队集合的最长时间
    pub shutdown_grace: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            queue_capacity: 1,
            overflow: OverflowPolicy::DropOldest,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// 流水线监管者：持有两个执行上下文所需的全部组件。
pub struct Supervisor {
    orchestrator: CycleOrchestrator,
    recorder: Recorder,
    fanout: Arc<DispatchFanout>,
    settings: SupervisorSettings,
}

impl Supervisor {
    pub fn new(
        orchestrator: CycleOrchestrator,
        recorder: Recorder,
        fanout: Arc<DispatchFanout>,
        settings: SupervisorSettings,
    ) -> Self {
        Self {
            orchestrator,
            recorder,
            fanout,
            settings,
        }
    }

    /// 启动采集任务与分发任务。
    pub fn spawn(self) -> SupervisorHandle {
        let cancel = CancellationToken::new();
        let queue = Arc::new(HandoffQueue::new(
            self.settings.queue_capacity,
            self.settings.overflow,
        ));
        let (acquisition_tx, acquisition_rx) = watch::channel(SupervisorState::Idle);
        let (dispatch_tx, dispatch_rx) = watch::channel(SupervisorState::Idle);

        info!(
            target: "daq.pipeline",
            channels = self.orchestrator.channels().len(),
            poll_interval_ms = self.settings.poll_interval.as_millis() as u64,
            queue_capacity = queue.capacity(),
            overflow = ?queue.policy(),
            "supervisor_started"
        );

        let acquisition = tokio::spawn(acquisition_loop(
            self.orchestrator,
            queue.clone(),
            self.settings.poll_interval,
            cancel.clone(),
            acquisition_tx,
        ));
        let dispatch = tokio::spawn(dispatch_loop(
            self.recorder,
            self.fanout,
            queue.clone(),
            self.settings.shutdown_grace,
            cancel.clone(),
            dispatch_tx,
        ));

        let task_queue = queue.clone();
        let task = tokio::spawn(async move {
            if let Err(err) = acquisition.await {
                warn!(target: "daq.pipeline", error = %err, "acquisition_task_failed");
            }
            task_queue.close().await;
            if let Err(err) = dispatch.await {
                warn!(target: "daq.pipeline", error = %err, "dispatch_task_failed");
            }
            let discarded = task_queue.discard_all().await;
            if discarded > 0 {
                record_sets_discarded(discarded as u64);
                warn!(
                    target: "daq.pipeline",
                    discarded = discarded,
                    "queued_sets_discarded"
                );
            }
            info!(target: "daq.pipeline", "supervisor_stopped");
        });

        SupervisorHandle {
            cancel,
            queue,
            acquisition_state: acquisition_rx,
            dispatch_state: dispatch_rx,
            task,
        }
    }
}

/// 运行中流水线的句柄。
pub struct SupervisorHandle {
    cancel: CancellationToken,
    queue: Arc<HandoffQueue>,
    acquisition_state: watch::Receiver<SupervisorState>,
    dispatch_state: watch::Receiver<SupervisorState>,
    task: JoinHandle<()>,
}

impl SupervisorHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn queue(&self) -> &Arc<HandoffQueue> {
        &self.queue
    }

    pub fn acquisition_state(&self) -> SupervisorState {
        *self.acquisition_state.borrow()
    }

    pub fn dispatch_state(&self) -> SupervisorState {
        *self.dispatch_state.borrow()
    }

    pub fn subscribe_acquisition(&self) -> watch::Receiver<SupervisorState> {
        self.acquisition_state.clone()
    }

    pub fn subscribe_dispatch(&self) -> watch::Receiver<SupervisorState> {
        self.dispatch_state.clone()
    }

    /// 发出取消信号并等待两个任务退出。
    pub async fn shutdown(self) {
        info!(target: "daq.pipeline", "supervisor_shutdown_requested");
        self.cancel.cancel();
        self.join().await;
    }

    pub async fn join(self) {
        if let Err(err) = self.task.await {
            warn!(target: "daq.pipeline", error = %err, "supervisor_task_failed");
        }
    }
}

async fn acquisition_loop(
    orchestrator: CycleOrchestrator,
    queue: Arc<HandoffQueue>,
    poll_interval: Duration,
    cancel: CancellationToken,
    state: watch::Sender<SupervisorState>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        transition(&state, SupervisorState::Idle);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        transition(&state, SupervisorState::Acquiring);
        match orchestrator.run_cycle_until(&cancel).await {
            CycleOutcome::Complete(set) => {
                transition(&state, SupervisorState::Queued);
                queue.push(set).await;
            }
            CycleOutcome::Cancelled { .. } => break,
        }
    }
    transition(&state, SupervisorState::Shutdown);
}

async fn dispatch_loop(
    recorder: Recorder,
    fanout: Arc<DispatchFanout>,
    queue: Arc<HandoffQueue>,
    grace: Duration,
    cancel: CancellationToken,
    state: watch::Sender<SupervisorState>,
) {
    let deadline = loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Instant::now() + grace,
            next = queue.pop() => next,
        };
        let Some(set) = next else {
            break Instant::now() + grace;
        };

        transition(&state, SupervisorState::Draining);
        let work = process(&recorder, &fanout, &set);
        tokio::pin!(work);
        let interrupted = tokio::select! {
            _ = &mut work => false,
            _ = cancel.cancelled() => true,
        };
        if interrupted {
            // 正在处理的集合同样受宽限期约束
            let deadline = Instant::now() + grace;
            if tokio::time::timeout_at(deadline, work).await.is_err() {
                warn!(
                    target: "daq.pipeline",
                    cycle_id = %set.cycle_id(),
                    grace_ms = grace.as_millis() as u64,
                    "drain_grace_expired"
                );
                stop(&state, 0);
                return;
            }
            break deadline;
        }
        transition(&state, SupervisorState::Idle);
    };

    let mut drained = 0usize;
    loop {
        let next = match tokio::time::timeout_at(deadline, queue.pop()).await {
            Ok(Some(set)) => set,
            Ok(None) => break,
            Err(_) => {
                warn!(target: "daq.pipeline", grace_ms = grace.as_millis() as u64, "drain_grace_expired");
                break;
            }
        };
        transition(&state, SupervisorState::Draining);
        if tokio::time::timeout_at(deadline, process(&recorder, &fanout, &next))
            .await
            .is_err()
        {
            warn!(
                target: "daq.pipeline",
                cycle_id = %next.cycle_id(),
                grace_ms = grace.as_millis() as u64,
                "drain_grace_expired"
            );
            break;
        }
        drained += 1;
        transition(&state, SupervisorState::Idle);
    }
    stop(&state, drained);
}

fn stop(state: &watch::Sender<SupervisorState>, drained: usize) {
    info!(target: "daq.pipeline", drained = drained, "dispatch_drained");
    transition(state, SupervisorState::Shutdown);
}

/// 仅在状态真正变化时通知订阅者。
fn transition(state: &watch::Sender<SupervisorState>, next: SupervisorState) {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}

/// 先落库再分发；落库失败已由 [`Recorder`] 记录，不阻断分发。
async fn process(recorder: &Recorder, fanout: &DispatchFanout, set: &ReadingSet) {
    let _ = recorder.record(set).await;
    fanout.dispatch(set).await;
}
