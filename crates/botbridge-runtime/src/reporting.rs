//! Run status reporting toward the host process.

use crate::state::run_state::RunState;
use botbridge_core::{ModelRef, Reporter};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Last model observed per session, captured from user message metadata
/// on the event stream.
#[derive(Default)]
pub struct SessionModelMap {
    models: Mutex<HashMap<String, ModelRef>>,
}

impl SessionModelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the model a session's assistant messages report.
    pub fn record(&self, session_id: &str, model: ModelRef) {
        self.models.lock().insert(session_id.to_string(), model);
    }

    /// The last model seen for a session.
    pub fn get(&self, session_id: &str) -> Option<ModelRef> {
        self.models.lock().get(session_id).cloned()
    }

    /// Drop the entry for a finished session.
    pub fn forget(&self, session_id: &str) {
        self.models.lock().remove(session_id);
    }
}

/// Emits one-line run status updates through the [`Reporter`].
///
/// Deduplicates via the run's lifecycle flags: a thinking line goes out
/// once per label, a done line only when a thinking line preceded it.
pub struct RunReporter {
    reporter: Option<Arc<dyn Reporter>>,
    models: Arc<SessionModelMap>,
}

impl RunReporter {
    pub fn new(reporter: Option<Arc<dyn Reporter>>, models: Arc<SessionModelMap>) -> Self {
        Self { reporter, models }
    }

    /// Model map shared with the event router.
    pub fn models(&self) -> &Arc<SessionModelMap> {
        &self.models
    }

    /// Report that the run is busy. Includes the model once known.
    pub fn report_thinking(&self, run: &RunState) {
        let label = match self.models.get(&run.session_id) {
            Some(model) => format!("Thinking ({model})"),
            None => "Thinking...".to_string(),
        };
        if !run.begin_thinking(&label) {
            return;
        }
        if let Some(reporter) = &self.reporter {
            reporter.on_status(&format!(
                "[{}] {} {}",
                run.channel.label(),
                run.peer_id,
                label
            ));
        }
    }

    /// Report that the run finished. No-op unless a thinking line went
    /// out for this run.
    pub fn report_done(&self, run: &RunState) {
        if !run.end_thinking() {
            return;
        }
        if let Some(reporter) = &self.reporter {
            reporter.on_status(&format!("[{}] {} Done", run.channel.label(), run.peer_id));
        }
    }
}
