use std::{sync::Arc, time::Duration};

use shared::{
    domain::{DirectoryEntry, ScreenId, SessionState},
    error::{FlowError, ValidationError},
    protocol::DonationPayload,
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info, warn};

pub mod aggregator;
pub mod history;
pub mod search;
pub mod session_store;
pub mod submission;
pub mod view;

pub use aggregator::{Aggregation, ReceiptRow, ReceiptSummary};
pub use history::{HistoryBackend, InMemoryHistory};
pub use search::Directory;
pub use session_store::{Clock, InMemorySlot, SessionSlot, SessionStore, SystemClock};
pub use submission::{HttpSubmitter, NoopSubmitter, SubmissionPhase, Submitter};
pub use view::{FlowView, FormField, TextSlot};

pub const DEFAULT_AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(500);
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";
pub const EMPTY_DONATION_MESSAGE: &str =
    "Please enter at least one donation amount before submitting";
pub const SUBMISSION_FAILED_MESSAGE: &str =
    "There was an error submitting your donation. Please try again.";
pub const SUPPORT_MESSAGE: &str = "Issue reporting functionality would be implemented here. Please contact support at support@bahasha.com";

#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub auto_advance_delay: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            auto_advance_delay: DEFAULT_AUTO_ADVANCE_DELAY,
        }
    }
}

pub struct FlowDependencies {
    pub directory: Directory,
    pub view: Arc<dyn FlowView>,
    pub history: Arc<dyn HistoryBackend>,
    pub store: SessionStore,
    pub submitter: Arc<dyn Submitter>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    External,
}

struct PendingAdvance {
    generation: u64,
    handle: JoinHandle<()>,
}

struct FlowInner {
    state: SessionState,
    active_screen: Option<ScreenId>,
    phase: SubmissionPhase,
    expanded: bool,
    pending_advance: Option<PendingAdvance>,
    timer_generation: u64,
    /// Bumped on every submission start and on restart; an outcome is applied
    /// only while it still matches.
    submission_generation: u64,
    submission_in_flight: bool,
    summary: Option<ReceiptSummary>,
}

impl FlowInner {
    fn cancel_pending_advance(&mut self) {
        if let Some(pending) = self.pending_advance.take() {
            pending.handle.abort();
            debug!(generation = pending.generation, "cancelled pending auto-advance");
        }
    }
}

/// Drives the four-screen donation flow over the injected view, history,
/// session store and submitter.
pub struct DonationFlow {
    inner: Mutex<FlowInner>,
    config: FlowConfig,
    directory: Directory,
    view: Arc<dyn FlowView>,
    history: Arc<dyn HistoryBackend>,
    store: SessionStore,
    submitter: Arc<dyn Submitter>,
    clock: Arc<dyn Clock>,
}

impl DonationFlow {
    pub fn new(config: FlowConfig, deps: FlowDependencies) -> Arc<Self> {
        let state = SessionState::new(deps.clock.now());
        Arc::new(Self {
            inner: Mutex::new(FlowInner {
                state,
                active_screen: None,
                phase: SubmissionPhase::Idle,
                expanded: false,
                pending_advance: None,
                timer_generation: 0,
                submission_generation: 0,
                submission_in_flight: false,
                summary: None,
            }),
            config,
            directory: deps.directory,
            view: deps.view,
            history: deps.history,
            store: deps.store,
            submitter: deps.submitter,
            clock: deps.clock,
        })
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn submitter(&self) -> &dyn Submitter {
        self.submitter.as_ref()
    }

    /// First load: resume a live session record or show the search screen.
    pub async fn start(&self) -> ScreenId {
        let mut inner = self.inner.lock().await;

        let Some(stored) = self.store.load() else {
            self.activate(&mut inner, ScreenId::Search);
            self.history.replace(ScreenId::Search);
            return ScreenId::Search;
        };

        let screen = stored.current_screen;
        if stored.has_selection() {
            self.show_entity_name(&stored.selected_entity);
            self.view
                .set_field_text(TextSlot::SearchInput, &stored.selected_entity);
        }
        if screen == ScreenId::Review {
            let summary = ReceiptSummary::from_fields(&stored.aggregated_fields);
            self.view.render_receipt(&summary);
            inner.summary = Some(summary);
        }
        inner.state = stored;
        self.activate(&mut inner, screen);
        self.rebuild_history(&inner.state.navigation_history, screen);
        info!(%screen, church = %inner.state.selected_entity, "resumed stored session");
        screen
    }

    pub async fn advance(&self, target: ScreenId) {
        let mut inner = self.inner.lock().await;
        inner.cancel_pending_advance();
        self.transition(&mut inner, target, HistoryMode::Push);
    }

    /// Applies a back/forward/hash event without adding history records.
    pub async fn restore_from_external_nav(&self, token: &str) -> Result<ScreenId, FlowError> {
        let target = ScreenId::parse_token(token).map_err(|err| {
            warn!(%token, error = %err, "ignoring navigation token");
            FlowError::from(err)
        })?;

        let mut inner = self.inner.lock().await;
        inner.cancel_pending_advance();
        self.transition(&mut inner, target, HistoryMode::External);
        Ok(target)
    }

    /// Restart: drop all progress and return to the search screen.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.cancel_pending_advance();
        self.store.clear();

        inner.state = SessionState::new(self.clock.now());
        inner.phase = SubmissionPhase::Idle;
        inner.submission_generation += 1;
        inner.summary = None;
        inner.expanded = false;

        self.view.reset_forms();
        self.view.set_field_text(TextSlot::SearchInput, "");
        self.show_entity_name("");
        self.view.hide_results();
        self.view.set_expandable(false);
        self.activate(&mut inner, ScreenId::Search);
        self.history.reset_to(ScreenId::Search);
        info!("flow restarted");
    }

    pub fn search(&self, query: &str) -> Vec<DirectoryEntry> {
        let matches: Vec<DirectoryEntry> =
            self.directory.search(query).into_iter().cloned().collect();
        if matches.is_empty() {
            self.view.hide_results();
        } else {
            self.view.show_results(&matches);
        }
        debug!(%query, matches = matches.len(), "directory search");
        matches
    }

    /// A click landed outside the search region.
    pub fn dismiss_results(&self) {
        self.view.hide_results();
    }

    /// Records the selection and schedules the move to the donation form.
    pub async fn select(self: &Arc<Self>, entry: DirectoryEntry) {
        let mut inner = self.inner.lock().await;
        inner.cancel_pending_advance();
        inner.state.selected_entity = entry.name.clone();

        self.view.set_field_text(TextSlot::SearchInput, &entry.name);
        self.view.hide_results();
        self.show_entity_name(&entry.name);

        inner.timer_generation += 1;
        let generation = inner.timer_generation;
        let delay = self.config.auto_advance_delay;
        let flow = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(flow) = flow.upgrade() {
                flow.complete_auto_advance(generation).await;
            }
        });
        inner.pending_advance = Some(PendingAdvance { generation, handle });
        info!(church = %entry.name, code = %entry.code, "church selected");
    }

    /// Runs the timer's transition unless it was cancelled or superseded.
    async fn complete_auto_advance(&self, generation: u64) {
        let mut inner = self.inner.lock().await;
        let is_current = inner
            .pending_advance
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);
        if !is_current {
            return;
        }
        inner.pending_advance = None;
        self.transition(&mut inner, ScreenId::Form, HistoryMode::Push);
    }

    pub async fn has_pending_advance(&self) -> bool {
        self.inner.lock().await.pending_advance.is_some()
    }

    pub async fn submit(&self) -> Result<(), FlowError> {
        let (generation, payload) = {
            let mut inner = self.inner.lock().await;
            if inner.submission_in_flight {
                return Err(FlowError::SubmissionInProgress);
            }
            inner.phase = SubmissionPhase::Validating;

            let receipt_details =
                match submission::validate_receipt_form(&self.view.read_receipt_form()) {
                    Ok(details) => details,
                    Err(err) => {
                        inner.phase = SubmissionPhase::Idle;
                        self.view.alert(MISSING_FIELDS_MESSAGE);
                        debug!(error = %err, "receipt form rejected");
                        return Err(err.into());
                    }
                };

            if inner.state.aggregated_fields.has_no_donation() {
                inner.phase = SubmissionPhase::Idle;
                self.view.alert(EMPTY_DONATION_MESSAGE);
                inner.cancel_pending_advance();
                self.transition(&mut inner, ScreenId::Form, HistoryMode::Push);
                return Err(ValidationError::EmptyDonation.into());
            }

            inner.phase = SubmissionPhase::Submitting;
            inner.submission_in_flight = true;
            inner.submission_generation += 1;
            self.view.set_submit_loading(true);
            let payload = DonationPayload {
                entity: inner.state.selected_entity.clone(),
                donations: inner.state.aggregated_fields.clone(),
                receipt_details,
                submitted_at: self.clock.now(),
            };
            (inner.submission_generation, payload)
        };

        info!(
            church = %payload.entity,
            total = payload.donations.total.unwrap_or_default(),
            transport = %self.submitter.describe(),
            "submitting donation"
        );
        let outcome = self.submitter.submit(&payload).await;

        let mut inner = self.inner.lock().await;
        inner.submission_in_flight = false;
        self.view.set_submit_loading(false);
        if inner.submission_generation != generation {
            warn!(generation, "submission finished after the flow was restarted; result ignored");
            return outcome.map_err(FlowError::from);
        }

        match outcome {
            Ok(()) => {
                inner.phase = SubmissionPhase::Succeeded;
                self.transition(&mut inner, ScreenId::Confirmation, HistoryMode::Push);
                self.store.clear();
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "error submitting donation");
                inner.phase = SubmissionPhase::Failed;
                self.view.alert(SUBMISSION_FAILED_MESSAGE);
                Err(err.into())
            }
        }
    }

    pub async fn toggle_expandable(&self) -> bool {
        let mut inner = self.inner.lock().await;
        inner.expanded = !inner.expanded;
        self.view.set_expandable(inner.expanded);
        inner.expanded
    }

    pub fn report_issue(&self) {
        self.view.alert(SUPPORT_MESSAGE);
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    pub async fn current_screen(&self) -> ScreenId {
        self.inner.lock().await.state.current_screen
    }

    pub async fn phase(&self) -> SubmissionPhase {
        self.inner.lock().await.phase
    }

    pub async fn receipt_summary(&self) -> Option<ReceiptSummary> {
        self.inner.lock().await.summary.clone()
    }

    fn transition(&self, inner: &mut FlowInner, target: ScreenId, mode: HistoryMode) {
        let previous = inner.state.current_screen;
        if target != previous {
            match mode {
                HistoryMode::Push => {
                    inner.state.navigation_history.push(target);
                    self.history.push(target);
                }
                HistoryMode::External => {
                    rewind_history(&mut inner.state.navigation_history, target)
                }
            }
        }

        self.activate(inner, target);
        inner.state.current_screen = target;

        match target {
            ScreenId::Form => {
                let invalid = aggregator::invalid_amount_fields(&self.view.read_donation_form());
                self.view.highlight_invalid_fields(&invalid);
            }
            ScreenId::Review => {
                let Aggregation { summary, fields } =
                    aggregator::aggregate(&self.view.read_donation_form());
                self.view.render_receipt(&summary);
                debug!(total = summary.total, rows = summary.rows.len(), "receipt generated");
                inner.state.aggregated_fields = fields;
                inner.summary = Some(summary);
            }
            ScreenId::Search | ScreenId::Confirmation => {}
        }

        if let Err(err) = self.store.save(&mut inner.state) {
            warn!(error = %err, "failed to store session state");
        }
        debug!(from = %previous, to = %target, ?mode, "screen transition");
    }

    /// Deactivates whatever screen is showing, if any, and activates `screen`.
    fn activate(&self, inner: &mut FlowInner, screen: ScreenId) {
        if let Some(active) = inner.active_screen.take() {
            self.view.deactivate_screen(active);
        }
        self.view.activate_screen(screen);
        inner.active_screen = Some(screen);
    }

    /// Mirrors a resumed navigation history onto the host history.
    fn rebuild_history(&self, screens: &[ScreenId], current: ScreenId) {
        let Some((first, rest)) = screens.split_first() else {
            self.history.replace(current);
            return;
        };
        self.history.replace(*first);
        for screen in rest {
            self.history.push(*screen);
        }
    }

    fn show_entity_name(&self, name: &str) {
        for slot in TextSlot::ENTITY_DISPLAYS {
            self.view.set_field_text(slot, name);
        }
    }
}

/// Keeps `history.last() == target` after an external navigation event.
fn rewind_history(history: &mut Vec<ScreenId>, target: ScreenId) {
    match history.iter().rposition(|screen| *screen == target) {
        Some(position) => history.truncate(position + 1),
        None => history.push(target),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
