// src/services/relay.rs
use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use super::{
    completion::CompletionClient,
    metrics_manager::{MetricsManager, op},
    session_context::SessionContext,
    session_manager::SessionManager,
};
use crate::{
    error::RelayError,
    message::{ClientEvent, Message, ServerEvent},
    state::AppState,
};

#[derive(Debug)]
enum TurnJob {
    Complete {
        system_prompt: String,
        history: Vec<Message>,
    },
    /// Payload could not be read; answer with the failure sentinel.
    Rejected,
}

pub struct RelaySession {
    id: String,
    sessions: SessionManager,
    metrics: MetricsManager,
    turns: mpsc::Sender<TurnJob>,
    worker: JoinHandle<()>,
}

impl RelaySession {
    /// Register a new session and start its turn worker. Replies are sent to `replies`.
    pub async fn open(state: &AppState, replies: mpsc::Sender<ServerEvent>) -> Self {
        let id = state.sessions.open_session().await;
        state.metrics.increment_sessions().await;

        let (turns, rx) = mpsc::channel(state.turn_queue_depth);
        let worker = tokio::spawn(run_turns(
            id.clone(),
            Arc::clone(&state.completion),
            state.metrics.clone(),
            rx,
            replies,
        ));

        info!(session_id = %id, "relay session opened");
        Self {
            id,
            sessions: state.sessions.clone(),
            metrics: state.metrics.clone(),
            turns,
            worker,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn handle(&self, event: ClientEvent) -> Result<(), RelayError> {
        match event {
            ClientEvent::Topic(topic) => {
                let topic = topic.unwrap_or_default();
                debug!(session_id = %self.id, topic = %topic, "topic set");
                self.sessions.set_topic(&self.id, &topic).await;
                Ok(())
            }
            ClientEvent::Request(history) => {
                // Snapshot now so a later topic change cannot affect this turn.
                let system_prompt = match self.sessions.context(&self.id).await {
                    Some(ctx) => ctx,
                    None => SessionContext::default().instruction().to_string(),
                };
                self.sessions.record_turn(&self.id).await;
                self.metrics.increment_request(op::TURN).await;
                self.enqueue(TurnJob::Complete { system_prompt, history }).await
            }
        }
    }

    /// Queue a failure reply for a `request` whose payload was unreadable.
    pub async fn reject_turn(&self) -> Result<(), RelayError> {
        self.metrics.increment_request(op::TURN).await;
        self.enqueue(TurnJob::Rejected).await
    }

    async fn enqueue(&self, job: TurnJob) -> Result<(), RelayError> {
        self.turns.send(job).await.map_err(|_| RelayError::Closed)
    }

    /// Tear down immediately; queued turns are dropped.
    pub async fn close(self) {
        self.worker.abort();
        unregister(&self.sessions, &self.id).await;
    }
}

async fn unregister(sessions: &SessionManager, session_id: &str) {
    if let Some(session) = sessions.get_session(session_id).await {
        info!(
            session_id = %session_id,
            turns = session.turns,
            age_secs = session.age().as_secs(),
            "relay session closed"
        );
    }
    sessions.close_session(session_id).await;
}

async fn run_turns(
    session_id: String,
    client: Arc<dyn CompletionClient>,
    metrics: MetricsManager,
    mut turns: mpsc::Receiver<TurnJob>,
    replies: mpsc::Sender<ServerEvent>,
) {
    while let Some(job) = turns.recv().await {
        let reply = match job {
            TurnJob::Complete { system_prompt, history } => {
                match client.complete(&system_prompt, &history).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!(session_id = %session_id, error = %e, "turn completion failed");
                        metrics.increment_failure(op::TURN).await;
                        None
                    }
                }
            }
            TurnJob::Rejected => {
                warn!(session_id = %session_id, "request payload rejected");
                metrics.increment_failure(op::TURN).await;
                None
            }
        };

        if replies.send(ServerEvent::Reply(reply)).await.is_err() {
            debug!(session_id = %session_id, "reply channel closed, stopping worker");
            break;
        }
    }
}
