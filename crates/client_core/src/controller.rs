//! Form Controller: draft state, validation, and single-shot submission.

use std::{sync::Arc, time::Duration};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use shared::{
    domain::{Attachment, AttemptId, Draft, FieldName, SubmissionOutcome},
    protocol::FormPayload,
};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::{
    error::{SubmitError, TransportError},
    transport::{Ack, MessageTransport},
};

type SettleWaker = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Sent { attempt: AttemptId, response: String },
    Failed { attempt: AttemptId, reason: String },
    /// The draft was cleared; widgets bound to it (a file picker) should reset too.
    DraftReset,
}

struct Settlement {
    attempt: AttemptId,
    result: Result<Ack, TransportError>,
}

/// Reports an attempt exactly once. A send task that panics or is dropped by a
/// shutting-down runtime settles as `TransportError::Aborted`.
struct SettleGuard {
    attempt: AttemptId,
    settle_tx: Sender<Settlement>,
    waker: Option<SettleWaker>,
    settled: bool,
}

impl SettleGuard {
    fn settle(mut self, result: Result<Ack, TransportError>) {
        self.report(result);
    }

    fn report(&mut self, result: Result<Ack, TransportError>) {
        self.settled = true;
        let _ = self.settle_tx.send(Settlement {
            attempt: self.attempt,
            result,
        });
        if let Some(waker) = &self.waker {
            waker();
        }
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if !self.settled {
            warn!(attempt = %self.attempt, "send task ended without a result");
            self.report(Err(TransportError::Aborted));
        }
    }
}

pub struct FormController {
    transport: Arc<dyn MessageTransport>,
    runtime: Handle,
    draft: Draft,
    outcome: SubmissionOutcome,
    pending: Option<AttemptId>,
    next_attempt: u64,
    settle_tx: Sender<Settlement>,
    settle_rx: Receiver<Settlement>,
    waker: Option<SettleWaker>,
}

impl FormController {
    pub fn new(transport: Arc<dyn MessageTransport>, runtime: Handle) -> Self {
        let (settle_tx, settle_rx) = unbounded();
        Self {
            transport,
            runtime,
            draft: Draft::default(),
            outcome: SubmissionOutcome::none(),
            pending: None,
            next_attempt: 1,
            settle_tx,
            settle_rx,
            waker: None,
        }
    }

    /// Called from the runtime each time a send settles.
    pub fn with_settle_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn outcome(&self) -> &SubmissionOutcome {
        &self.outcome
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn update_field(&mut self, name: FieldName, value: impl Into<String>) {
        self.draft.set_field(name, value);
    }

    pub fn select_attachment(&mut self, attachment: Option<Attachment>) {
        self.draft.attachment = attachment;
    }

    /// Starts one submission attempt and returns without waiting for the network.
    pub fn submit(&mut self) -> Result<AttemptId, SubmitError> {
        if let Some(attempt) = self.pending {
            debug!(%attempt, "ignoring submit while a submission is in flight");
            return Err(SubmitError::InFlight { attempt });
        }

        self.outcome = SubmissionOutcome::none();

        if let Err(err) = self.draft.validate() {
            debug!(missing = ?err.missing, "contact form incomplete");
            self.outcome = SubmissionOutcome::incomplete();
            return Err(err.into());
        }

        let payload = FormPayload::from_draft(&self.draft);
        let attempt = AttemptId(self.next_attempt);
        self.next_attempt += 1;
        self.pending = Some(attempt);
        info!(
            %attempt,
            has_attachment = payload.attachment.is_some(),
            "submitting contact form"
        );

        let transport = Arc::clone(&self.transport);
        let guard = SettleGuard {
            attempt,
            settle_tx: self.settle_tx.clone(),
            waker: self.waker.clone(),
            settled: false,
        };
        self.runtime.spawn(async move {
            let result = transport.send(payload).await;
            guard.settle(result);
        });

        Ok(attempt)
    }

    /// Applies every settlement that has arrived since the last poll.
    pub fn poll_events(&mut self) -> Vec<FormEvent> {
        let mut events = Vec::new();
        while let Ok(settlement) = self.settle_rx.try_recv() {
            self.apply(settlement, &mut events);
        }
        events
    }

    /// Blocks the calling thread until the pending attempt settles or `timeout` elapses.
    /// Must not be called from inside the runtime.
    pub fn wait_for_settlement(&mut self, timeout: Duration) -> Vec<FormEvent> {
        let mut events = Vec::new();
        if self.pending.is_none() {
            return events;
        }
        match self.settle_rx.recv_timeout(timeout) {
            Ok(settlement) => self.apply(settlement, &mut events),
            Err(RecvTimeoutError::Timeout) => {
                warn!(?timeout, "timed out waiting for contact form submission");
            }
            Err(RecvTimeoutError::Disconnected) => {}
        }
        events.extend(self.poll_events());
        events
    }

    fn apply(&mut self, settlement: Settlement, events: &mut Vec<FormEvent>) {
        let Settlement { attempt, result } = settlement;
        if self.pending != Some(attempt) {
            debug!(%attempt, "dropping settlement for an attempt that is no longer pending");
            return;
        }
        self.pending = None;

        match result {
            Ok(ack) => {
                info!(%attempt, "contact form delivered");
                self.outcome = SubmissionOutcome::sent();
                self.draft = Draft::default();
                events.push(FormEvent::Sent {
                    attempt,
                    response: ack.body().to_string(),
                });
                events.push(FormEvent::DraftReset);
            }
            Err(err) => {
                warn!(%attempt, error = %err, "contact form delivery failed");
                self.outcome = SubmissionOutcome::failed();
                events.push(FormEvent::Failed {
                    attempt,
                    reason: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
