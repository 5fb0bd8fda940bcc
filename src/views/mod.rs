pub mod analysis;
pub mod chat;
pub mod dashboard;
pub mod skills;
pub mod timeline;

pub use analysis::{AnalysisState, DocumentAnalysisView, ResultTab};
pub use chat::{ChatState, ChatView};
pub use timeline::{TimelineState, TimelineView};

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::context::AppContext;
use crate::db::Subscription;

/// Lifecycle of a view's primary action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ActionState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl ActionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ActionState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Write-back indicator, independent of the primary action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    #[default]
    Saved,
    Saving,
}

pub const SAMPLE_LEGAL_TEXT: &str = r#"Case Brief: Marbury v. Madison, 5 U.S. 137 (1803)
Parties: William Marbury (Plaintiff), James Madison, Secretary of State (Defendant)
Facts: In the final days of his presidency, John Adams appointed several individuals to judicial positions. These appointments were confirmed by the Senate, and commissions were signed by President Adams and sealed by the Secretary of State, John Marshall (who later became Chief Justice). However, due to the rush of the last days of the administration, some commissions, including Marbury's for a justice of the peace role, were not delivered before Jefferson took office.
Upon assuming office, President Jefferson, through his Secretary of State James Madison, refused to deliver the remaining commissions, believing they were invalid because they hadn't been delivered. Marbury sued Madison directly in the Supreme Court, seeking a writ of mandamus to compel Madison to deliver his commission.
Legal Question:
1.  Did Marbury have a right to the commission?
2.  If he had a right, and that right was violated, did the laws of the United States afford him a remedy?
3.  If they did afford him a remedy, was that remedy a writ of mandamus issuing from the Supreme Court?
Holding:
1.  Yes, Marbury had a right to the commission once it was signed and sealed, as the appointment process was complete.
2.  Yes, where there is a legal right, there must be a legal remedy.
3.  No, the Supreme Court did not have the original jurisdiction to issue the writ of mandamus in this case. The Judiciary Act of 1789, which purported to give the Supreme Court original jurisdiction in such cases, was unconstitutional because it expanded the Court's original jurisdiction beyond what Article III, Section 2, Clause 2 of the Constitution explicitly permitted.
Reasoning (Chief Justice John Marshall):
The Court established the principle of "judicial review," holding that it is "emphatically the province and duty of the judicial department to say what the law is." This means the Supreme Court has the authority to declare an act of Congress unconstitutional if it conflicts with the Constitution. While Marbury had a right to his commission, the specific method he chose to obtain it (original jurisdiction writ of mandamus from the Supreme Court) was unconstitutional. The Court thus denied Marbury's request, but in doing so, asserted its significant power to review the constitutionality of legislative acts.
Impact: Established judicial review, strengthening the Supreme Court's role as an independent branch of government and defining its powers.
"#;

/// State cell, snapshot listener and teardown flag shared by the document views.
pub(crate) struct ViewCore<S> {
    pub(crate) ctx: AppContext,
    state: Arc<watch::Sender<S>>,
    live: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<S> ViewCore<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(ctx: AppContext, initial: S) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            ctx,
            state: Arc::new(tx),
            live: AtomicBool::new(true),
            listener: Mutex::new(None),
        }
    }

    pub(crate) fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Applies `f` unless the view has been unmounted. Returns whether it ran.
    pub(crate) fn update(&self, f: impl FnOnce(&mut S)) -> bool {
        if !self.is_live() {
            return false;
        }
        self.state.send_modify(f);
        true
    }

    /// Applies the current snapshot inline, then keeps applying new ones from
    /// a background task until `detach`. Each snapshot is applied while the
    /// subscription still holds it, so an older snapshot can never land after
    /// a write that superseded it has returned.
    pub(crate) async fn attach<T, F>(&self, mut subscription: Subscription<T>, apply: F)
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&mut S, T) + Send + Sync + 'static,
    {
        if subscription.changed().await {
            subscription.with_latest(|snapshot| {
                self.state.send_modify(|s| apply(s, snapshot.clone()));
            });
        }
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            while subscription.changed().await {
                subscription.with_latest(|snapshot| {
                    state.send_modify(|s| apply(s, snapshot.clone()));
                });
            }
        });
        let previous = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stops the listener, waits for its subscription to be released and
    /// discards any later action results.
    pub(crate) async fn detach(&self) {
        self.live.store(false, Ordering::SeqCst);
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
            debug!("view listener stopped");
        }
    }
}

impl<S> Drop for ViewCore<S> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
