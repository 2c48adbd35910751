use super::delay::schedule_for;
use crate::state::MessageId;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Timer signal asking the owning scheduler to reveal segment `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTick {
    pub message_id: MessageId,
    pub generation: u64,
    pub index: usize,
}

/// Snapshot reported after every reveal step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealProgress {
    pub visible: usize,
    pub total: usize,
    /// Set on exactly one progress report per `start`.
    pub completed_now: bool,
}

impl RevealProgress {
    pub fn completion_ratio(&self) -> f32 {
        completion_ratio(self.visible, self.total)
    }
}

fn completion_ratio(visible: usize, total: usize) -> f32 {
    if total == 0 {
        1.0
    } else {
        visible as f32 / total as f32
    }
}

/// Reveals one message's segments on a cancellable timer.
///
/// The timer runs as a tokio task that only ever sends [`RevealTick`]s; all
/// state lives here and is mutated by the owner through [`Self::on_tick`].
/// Ticks from an older `start`, from another message, or arriving after
/// completion are ignored, and dropping the scheduler cancels its timer.
pub struct RevealScheduler {
    message_id: MessageId,
    segments: Vec<String>,
    visible: usize,
    completion_fired: bool,
    generation: u64,
    cancel: CancellationToken,
    tick_tx: mpsc::UnboundedSender<RevealTick>,
}

impl RevealScheduler {
    pub fn new(message_id: MessageId, tick_tx: mpsc::UnboundedSender<RevealTick>) -> Self {
        Self {
            message_id,
            segments: Vec::new(),
            visible: 0,
            completion_fired: false,
            generation: 0,
            cancel: CancellationToken::new(),
            tick_tx,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn visible_segments(&self) -> &[String] {
        &self.segments[..self.visible]
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn total(&self) -> usize {
        self.segments.len()
    }

    pub fn completion_ratio(&self) -> f32 {
        completion_ratio(self.visible, self.segments.len())
    }

    pub fn is_complete(&self) -> bool {
        self.completion_fired
    }

    /// Begin revealing `segments` from zero, cancelling any running timer.
    ///
    /// An empty sequence completes immediately and the completion report is
    /// returned here instead of arriving through a tick.
    pub fn start(&mut self, segments: Vec<String>) -> Option<RevealProgress> {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
        self.segments = segments;
        self.visible = 0;
        self.completion_fired = false;

        if self.segments.is_empty() {
            return Some(self.finish());
        }

        tracing::debug!(
            message_id = %self.message_id,
            segments = self.segments.len(),
            "reveal started"
        );
        spawn_timer(
            schedule_for(&self.segments),
            self.message_id,
            self.generation,
            self.cancel.clone(),
            self.tick_tx.clone(),
        );
        None
    }

    /// Replace the content and show all of it at once, without a timer.
    pub fn show_all(&mut self, segments: Vec<String>) -> RevealProgress {
        self.cancel.cancel();
        self.generation += 1;
        self.segments = segments;
        self.finish()
    }

    pub fn on_tick(&mut self, tick: RevealTick) -> Option<RevealProgress> {
        if tick.message_id != self.message_id
            || tick.generation != self.generation
            || self.completion_fired
            || tick.index != self.visible
        {
            return None;
        }

        self.visible += 1;
        if self.visible >= self.segments.len() {
            return Some(self.finish());
        }
        Some(self.progress(false))
    }

    /// Show everything now. Reports completion once; later calls are no-ops.
    pub fn skip(&mut self) -> Option<RevealProgress> {
        if self.completion_fired {
            return None;
        }
        tracing::debug!(message_id = %self.message_id, "reveal skipped");
        Some(self.finish())
    }

    /// Stop the timer without touching what is already visible.
    pub fn dispose(&mut self) {
        self.cancel.cancel();
    }

    fn finish(&mut self) -> RevealProgress {
        self.cancel.cancel();
        self.visible = self.segments.len();
        self.completion_fired = true;
        self.progress(true)
    }

    fn progress(&self, completed_now: bool) -> RevealProgress {
        RevealProgress {
            visible: self.visible,
            total: self.segments.len(),
            completed_now,
        }
    }
}

impl Drop for RevealScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn spawn_timer(
    delays: Vec<Duration>,
    message_id: MessageId,
    generation: u64,
    cancel: CancellationToken,
    tick_tx: mpsc::UnboundedSender<RevealTick>,
) {
    tokio::spawn(async move {
        for (index, delay) in delays.into_iter().enumerate() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let tick = RevealTick {
                message_id,
                generation,
                index,
            };
            if tick_tx.send(tick).is_err() {
                return;
            }
        }
    });
}
