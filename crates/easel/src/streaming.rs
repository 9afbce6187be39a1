// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Progressive delivery of large row-sets to a rendering surface.
//!
//! Each session moves `Idle -> Streaming -> {Completed | Cancelled}`. Batches
//! of one session are delivered strictly in order from a single task, one
//! per timer tick. Sessions with different ids run independently and may
//! interleave. Starting a session under a live id cancels the old one first.

use crate::config::StreamingConfig;
use crate::dataset::Row;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Slice of rows handed to the batch callback.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBatch {
    pub index: usize,
    pub data: Vec<Row>,
    pub is_last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Completed,
    Cancelled,
}

/// Snapshot of a streaming session.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSession {
    pub id: String,
    pub total_count: usize,
    pub rendered_count: usize,
    pub progress: u8,
    pub is_streaming: bool,
    pub buffered_rows: usize,
    pub state: SessionState,
}

impl RenderSession {
    fn new(id: String, total_count: usize) -> Self {
        Self {
            id,
            total_count,
            rendered_count: 0,
            progress: 0,
            is_streaming: false,
            buffered_rows: 0,
            state: SessionState::Idle,
        }
    }
}

/// How a streaming session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    Cancelled,
    /// A batch callback panicked. The session is dropped without retry.
    Failed,
}

struct SessionEntry {
    generation: u64,
    session: RenderSession,
    abort: Option<AbortHandle>,
}

type SessionTable = Arc<DashMap<String, SessionEntry>>;

/// Removes the session entry when its task ends by any path, unless a newer
/// session has taken the id.
struct SessionGuard {
    sessions: SessionTable,
    id: String,
    generation: u64,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions
            .remove_if(&self.id, |_, entry| entry.generation == self.generation);
    }
}

/// Awaitable handle for a streaming session.
#[derive(Debug)]
pub struct StreamHandle {
    session_id: String,
    join: JoinHandle<SessionOutcome>,
}

impl StreamHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn finished(self) -> SessionOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                warn!(session_id = %self.session_id, "Streaming session callback panicked");
                SessionOutcome::Failed
            }
            Err(_) => SessionOutcome::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Schedule {
    batch_size: usize,
    batch_delay: Duration,
}

/// Feeds large row sets to the renderer in timed batches, one tokio task
/// per session.
pub struct StreamRenderCoordinator {
    schedule: Schedule,
    sessions: SessionTable,
    next_generation: AtomicU64,
}

impl Default for StreamRenderCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamRenderCoordinator {
    pub fn new() -> Self {
        Self::with_config(&StreamingConfig::default())
    }

    pub fn with_config(config: &StreamingConfig) -> Self {
        Self {
            schedule: Schedule {
                batch_size: config.batch_size.max(1),
                batch_delay: config.batch_delay(),
            },
            sessions: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.schedule.batch_size
    }

    pub fn batch_delay(&self) -> Duration {
        self.schedule.batch_delay
    }

    pub fn should_use_streaming(&self, row_count: usize) -> bool {
        row_count > self.schedule.batch_size
    }

    /// Starts delivering `rows` in batches. `on_batch` receives each batch and
    /// the cumulative buffer of every row delivered so far. Must be called
    /// from within a Tokio runtime.
    pub fn stream_data<F>(
        &self,
        session_id: impl Into<String>,
        rows: Vec<Row>,
        mut on_batch: F,
        on_complete: Option<CompletionCallback>,
    ) -> StreamHandle
    where
        F: FnMut(&RenderBatch, &[Row]) + Send + 'static,
    {
        let session_id = session_id.into();
        self.cancel(&session_id);

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let total = rows.len();
        let Schedule {
            batch_size,
            batch_delay,
        } = self.schedule;
        let batch_count = total.div_ceil(batch_size);

        let mut session = RenderSession::new(session_id.clone(), total);
        session.state = SessionState::Streaming;
        session.is_streaming = true;
        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                generation,
                session,
                abort: None,
            },
        );
        info!(
            session_id = %session_id,
            total_rows = total,
            batches = batch_count,
            "Starting streaming session"
        );

        let guard = SessionGuard {
            sessions: Arc::clone(&self.sessions),
            id: session_id.clone(),
            generation,
        };
        let join = tokio::spawn(async move {
            let guard = guard;
            let mut buffer: Vec<Row> = Vec::with_capacity(total);

            for (index, chunk) in rows.chunks(batch_size).enumerate() {
                if index > 0 {
                    tokio::time::sleep(batch_delay).await;
                } else {
                    tokio::task::yield_now().await;
                }
                let is_last = index + 1 == batch_count;
                {
                    let Some(mut entry) = guard.sessions.get_mut(&guard.id) else {
                        return SessionOutcome::Cancelled;
                    };
                    if entry.generation != guard.generation {
                        return SessionOutcome::Cancelled;
                    }
                    let rendered = entry.session.rendered_count + chunk.len();
                    entry.session.rendered_count = rendered;
                    entry.session.buffered_rows = rendered;
                    entry.session.progress = progress_percent(rendered, total);
                    if is_last {
                        entry.session.state = SessionState::Completed;
                        entry.session.is_streaming = false;
                    }
                }

                let batch = RenderBatch {
                    index,
                    data: chunk.to_vec(),
                    is_last,
                };
                buffer.extend_from_slice(&batch.data);
                debug!(
                    session_id = %guard.id,
                    batch = index,
                    accumulated = buffer.len(),
                    is_last,
                    "Delivering batch"
                );
                on_batch(&batch, &buffer);
            }

            // A cancel issued from inside the final callback still suppresses
            // completion.
            let live = guard
                .sessions
                .remove_if(&guard.id, |_, entry| entry.generation == guard.generation)
                .is_some();
            if !live {
                return SessionOutcome::Cancelled;
            }
            drop(buffer);
            info!(session_id = %guard.id, total_rows = total, "Streaming session completed");
            if let Some(on_complete) = on_complete {
                on_complete();
            }
            SessionOutcome::Completed
        });

        if let Some(mut entry) = self.sessions.get_mut(&session_id) {
            if entry.generation == generation {
                entry.abort = Some(join.abort_handle());
            }
        }

        StreamHandle { session_id, join }
    }

    /// Stops a session before its next batch. Unknown or finished ids are a
    /// no-op, so repeated calls are harmless.
    pub fn cancel(&self, session_id: &str) -> bool {
        match self.sessions.remove(session_id) {
            Some((_, entry)) => {
                if let Some(abort) = entry.abort {
                    abort.abort();
                }
                info!(
                    session_id,
                    rendered = entry.session.rendered_count,
                    total = entry.session.total_count,
                    "Streaming session cancelled"
                );
                true
            }
            None => false,
        }
    }

    pub fn session(&self, session_id: &str) -> Option<RenderSession> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.session.clone())
    }

    pub fn progress(&self, session_id: &str) -> Option<u8> {
        self.sessions.get(session_id).map(|entry| entry.session.progress)
    }

    pub fn is_streaming(&self, session_id: &str) -> bool {
        self.sessions
            .get(session_id)
            .is_some_and(|entry| entry.session.is_streaming)
    }

    pub fn active_sessions(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Cancels every live session.
    pub fn cleanup(&self) {
        let ids = self.active_sessions();
        if !ids.is_empty() {
            debug!(count = ids.len(), "Cancelling all streaming sessions");
        }
        for id in ids {
            self.cancel(&id);
        }
    }
}

impl Drop for StreamRenderCoordinator {
    fn drop(&mut self) {
        self.cleanup();
    }
}

pub fn progress_percent(rendered: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((rendered as f64 / total as f64) * 100.0).round().min(100.0) as u8
}
