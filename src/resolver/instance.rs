use super::AssetResolver;
use crate::{
    error::{GenerationError, Result},
    models::{AspectRatio, GenerationOutcome, GenerationRequest},
    view::AssetView,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

struct InstanceState {
    request: GenerationRequest,
    /// Token of the only request allowed to commit.
    current: u64,
    live: bool,
    settled: bool,
}

struct Shared {
    state: Mutex<InstanceState>,
    outcome: watch::Sender<GenerationOutcome>,
    /// Mirrors `InstanceState::live` for waiters.
    live: watch::Sender<bool>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, InstanceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Commits a terminal outcome if `token` still owns the instance.
    fn commit(&self, token: u64, outcome: GenerationOutcome) -> bool {
        let mut state = self.lock();
        if !state.live || state.current != token || state.settled {
            log::debug!(
                "Discarding {} result of request #{} (current #{}, live: {})",
                outcome.label(),
                token,
                state.current,
                state.live
            );
            return false;
        }
        state.settled = true;
        self.outcome.send_replace(outcome);
        true
    }
}

fn runtime() -> Result<Handle> {
    Handle::try_current().map_err(|e| {
        GenerationError::ConfigError(format!("resolver requests need a tokio runtime: {}", e))
    })
}

/// One mounted asset slot. Owns at most one live request at a time; results
/// of superseded requests, or of requests still in flight when the instance
/// is destroyed, are dropped without touching its state.
///
/// Requests run on the ambient tokio runtime; mounting, updating or
/// reissuing outside one returns `ConfigError`.
pub struct ResolverInstance {
    resolver: AssetResolver,
    shared: Arc<Shared>,
}

impl ResolverInstance {
    pub fn mount(
        resolver: AssetResolver,
        prompt: impl Into<String>,
        aspect_ratio: AspectRatio,
    ) -> Result<Self> {
        let request = GenerationRequest::new(prompt, aspect_ratio)?;
        let handle = runtime()?;
        let (outcome, _) = watch::channel(GenerationOutcome::Loading);
        let (live, _) = watch::channel(true);
        let instance = Self {
            resolver,
            shared: Arc::new(Shared {
                state: Mutex::new(InstanceState {
                    request,
                    current: 0,
                    live: true,
                    settled: false,
                }),
                outcome,
                live,
            }),
        };
        instance.issue(&handle);
        Ok(instance)
    }

    /// Reissues when the prompt or aspect ratio differs from the current
    /// request. Returns whether a new request went out.
    pub fn update(&self, prompt: impl Into<String>, aspect_ratio: AspectRatio) -> Result<bool> {
        let next = GenerationRequest::new(prompt, aspect_ratio)?;
        let handle = runtime()?;
        {
            let mut state = self.shared.lock();
            if !state.live || state.request == next {
                return Ok(false);
            }
            state.request = next;
        }
        self.issue(&handle);
        Ok(true)
    }

    /// Starts a fresh request for the current inputs, e.g. after a fallback.
    pub fn reissue(&self) -> Result<()> {
        let handle = runtime()?;
        self.issue(&handle);
        Ok(())
    }

    fn issue(&self, handle: &Handle) {
        let (token, request) = {
            let mut state = self.shared.lock();
            if !state.live {
                return;
            }
            state.current += 1;
            state.settled = false;
            self.shared.outcome.send_if_modified(|outcome| {
                if outcome.is_terminal() {
                    *outcome = GenerationOutcome::Loading;
                    true
                } else {
                    false
                }
            });
            (state.current, state.request.clone())
        };

        log::debug!(
            "Issuing request #{} for '{}' ({})",
            token,
            request.prompt(),
            request.aspect_ratio()
        );

        let resolver = self.resolver.clone();
        let shared = Arc::clone(&self.shared);
        handle.spawn(async move {
            let outcome = resolver.settle(&request).await;
            shared.commit(token, outcome);
        });
    }

    /// Marks the instance dead and wakes anyone waiting in `settled`.
    /// In-flight requests run to completion but their results are ignored.
    pub fn destroy(&self) {
        let mut state = self.shared.lock();
        if state.live {
            state.live = false;
            self.shared.live.send_replace(false);
            log::debug!("Resolver instance destroyed at request #{}", state.current);
        }
    }

    pub fn is_live(&self) -> bool {
        self.shared.lock().live
    }

    pub fn prompt(&self) -> String {
        self.shared.lock().request.prompt().to_string()
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.shared.lock().request.aspect_ratio()
    }

    pub fn outcome(&self) -> GenerationOutcome {
        self.shared.outcome.borrow().clone()
    }

    pub fn view(&self) -> AssetView {
        AssetView::from_outcome(&self.outcome(), &self.prompt())
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationOutcome> {
        self.shared.outcome.subscribe()
    }

    /// Current outcome followed by every later change.
    pub fn updates(&self) -> WatchStream<GenerationOutcome> {
        WatchStream::new(self.subscribe())
    }

    /// Waits for the current request's terminal outcome. Returns early with
    /// whatever was last committed once the instance is destroyed, even if
    /// that happens mid-wait.
    pub async fn settled(&self) -> GenerationOutcome {
        let mut outcome_rx = self.subscribe();
        let mut live_rx = self.shared.live.subscribe();

        let terminal = tokio::select! {
            result = outcome_rx.wait_for(GenerationOutcome::is_terminal) => {
                result.ok().map(|outcome| outcome.clone())
            }
            _ = live_rx.wait_for(|live| !*live) => None,
        };

        terminal.unwrap_or_else(|| self.outcome())
    }
}

impl Drop for ResolverInstance {
    fn drop(&mut self) {
        self.destroy();
    }
}
