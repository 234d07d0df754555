use std::collections::VecDeque;

use crate::backend::GpuBackend;
use crate::key::ContentKey;
use crate::task::{ResourceTask, TaskContext, TaskState};

use super::RenderTask;

/// Where the manager is in its per-frame cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawingState {
    /// Tasks have been queued since the last flush.
    Accepting,
    /// A flush is walking the queues.
    Flushing,
    /// Nothing queued.
    Idle,
}

/// Counts from one flush.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FlushReport {
    pub resource_tasks_executed: usize,
    /// Tasks whose prepare step produced nothing.
    pub resource_tasks_skipped: usize,
    pub resource_tasks_failed: usize,
    pub render_tasks_executed: usize,
    pub render_tasks_failed: usize,
}

impl FlushReport {
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn record_execution(&mut self, state: TaskState) {
        match state {
            TaskState::Executed => self.resource_tasks_executed += 1,
            _ => self.resource_tasks_failed += 1,
        }
    }
}

struct QueuedTask<B: GpuBackend> {
    task: Box<dyn ResourceTask<B>>,
    state: TaskState,
}

/// Orders and flushes resource and render tasks.
pub struct DrawingManager<B: GpuBackend> {
    resource_tasks: VecDeque<QueuedTask<B>>,
    render_tasks: VecDeque<Box<dyn RenderTask<B>>>,
    state: DrawingState,
}

impl<B: GpuBackend> DrawingManager<B> {
    pub fn new() -> Self {
        Self {
            resource_tasks: VecDeque::new(),
            render_tasks: VecDeque::new(),
            state: DrawingState::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn add_resource_task(&mut self, task: Box<dyn ResourceTask<B>>) {
        self.resource_tasks.push_back(QueuedTask {
            task,
            state: TaskState::Pending,
        });
        self.state = DrawingState::Accepting;
    }

    pub fn add_render_task(&mut self, task: Box<dyn RenderTask<B>>) {
        self.render_tasks.push_back(task);
        self.state = DrawingState::Accepting;
    }

    #[inline]
    pub fn pending_resource_tasks(&self) -> usize {
        self.resource_tasks.len()
    }

    #[inline]
    pub fn pending_render_tasks(&self) -> usize {
        self.render_tasks.len()
    }

    /// Number of queued resource tasks producing `key`.
    pub fn count_tasks_for(&self, key: &ContentKey) -> usize {
        self.resource_tasks.iter().filter(|queued| queued.task.key() == key).count()
    }

    /// Runs every queued task to completion.
    pub fn flush(&mut self, ctx: &mut TaskContext<'_, B>) -> FlushReport {
        let mut report = FlushReport::default();
        if self.resource_tasks.is_empty() && self.render_tasks.is_empty() {
            self.state = DrawingState::Idle;
            return report;
        }
        self.state = DrawingState::Flushing;

        let mut tasks = std::mem::take(&mut self.resource_tasks);
        for queued in tasks.iter_mut() {
            if queued.task.prepare() {
                queued.state = TaskState::Prepared;
            } else {
                queued.state = TaskState::Retired;
                report.resource_tasks_skipped += 1;
            }
        }

        for QueuedTask { task, state } in tasks {
            if state != TaskState::Prepared {
                continue;
            }
            let state = if task.execute(ctx) {
                TaskState::Executed
            } else {
                TaskState::Retired
            };
            report.record_execution(state);
        }

        for task in std::mem::take(&mut self.render_tasks) {
            if task.execute(ctx) {
                report.render_tasks_executed += 1;
            } else {
                report.render_tasks_failed += 1;
            }
        }

        log::debug!("flush finished: {report:?}");
        self.state = DrawingState::Idle;
        report
    }

    /// Drops every queued task without running it.
    pub fn abandon(&mut self) {
        let dropped = self.resource_tasks.len() + self.render_tasks.len();
        self.resource_tasks.clear();
        self.render_tasks.clear();
        self.state = DrawingState::Idle;
        if dropped > 0 {
            log::warn!("dropped {dropped} queued tasks");
        }
    }
}

impl<B: GpuBackend> Default for DrawingManager<B> {
    fn default() -> Self {
        Self::new()
    }
}
