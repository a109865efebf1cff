//! Sequential multi-term search driver.
//!
//! The engine exposes one global search session, so terms are searched
//! strictly one after another: the next pass starts only after the current
//! one reports document end. Matches are buffered privately per pass and
//! moved into the [`ResultStore`] when the pass ends.
//!
//! The driver is an explicit state machine:
//!
//! ```text
//! Idle --start--> Searching --document end (last term)--> Complete
//!                   |   ^                                   |
//!                   +---+ document end (more terms)         +--start--> Searching
//! ```
//!
//! Events can be pulled without blocking ([`SequentialSearchDriver::pump`])
//! by shells that own an event loop, or awaited ([`SequentialSearchDriver::wait`]).

use super::mode::SearchModeResolver;
use super::quad::normalize;
use super::store::{MatchEntry, ResultStore, TermId, TermResultGroup};
use crate::engine::{DocumentEngine, RawMatch, SearchCallbacks, SearchEvent, TextSearchOptions};
use crate::error::{Error, Result};
use crate::highlight::{Definitions, HighlightDefinition};
use std::collections::{HashSet, VecDeque};
use std::sync::mpsc::{Receiver, TryRecvError};

/// Where the driver is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// No run started, or the last run was abandoned
    Idle,
    /// A pass is in flight
    Searching,
    /// Every term reached document end; results are published
    Complete,
}

struct ActivePass {
    term_id: TermId,
    buffer: TermResultGroup,
    events: Receiver<SearchEvent>,
}

struct ActiveRun {
    current: ActivePass,
    pending: VecDeque<TermId>,
}

enum DriverState {
    Idle,
    Searching(ActiveRun),
    Complete,
}

type CompletionHook = Box<dyn FnMut(&ResultStore)>;

/// Drives the engine through an ordered term list, one pass at a time.
pub struct SequentialSearchDriver {
    resolver: SearchModeResolver,
    options: TextSearchOptions,
    state: DriverState,
    store: ResultStore,
    definitions: Definitions,
    match_errors: Vec<Error>,
    on_complete: Option<CompletionHook>,
}

impl Default for SequentialSearchDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialSearchDriver {
    /// Create a driver issuing full-document passes.
    pub fn new() -> Self {
        Self::with_options(TextSearchOptions::default())
    }

    /// Create a driver with explicit search options.
    pub fn with_options(options: TextSearchOptions) -> Self {
        Self {
            resolver: SearchModeResolver::new(),
            options,
            state: DriverState::Idle,
            store: ResultStore::new(),
            definitions: Definitions::new(),
            match_errors: Vec::new(),
            on_complete: None,
        }
    }

    /// Register a hook called once per run, when its last term is committed.
    pub fn set_completion_hook(&mut self, hook: impl FnMut(&ResultStore) + 'static) {
        self.on_complete = Some(Box::new(hook));
    }

    /// Current state.
    pub fn status(&self) -> RunStatus {
        match self.state {
            DriverState::Idle => RunStatus::Idle,
            DriverState::Searching(_) => RunStatus::Searching,
            DriverState::Complete => RunStatus::Complete,
        }
    }

    /// Whether a run is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Searching(_))
    }

    /// Term whose pass is in flight, if any.
    pub fn current_term(&self) -> Option<&TermId> {
        match &self.state {
            DriverState::Searching(run) => Some(&run.current.term_id),
            _ => None,
        }
    }

    /// The published results of the last completed run.
    pub fn results(&self) -> Result<&ResultStore> {
        match self.state {
            DriverState::Complete => Ok(&self.store),
            _ => Err(Error::RunNotComplete),
        }
    }

    /// Groups committed so far, including mid-run. Never contains a group
    /// whose pass has not ended.
    pub fn committed(&self) -> &ResultStore {
        &self.store
    }

    /// Definitions of the current (or last) run.
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Per-match errors reported during the current (or last) run.
    pub fn match_errors(&self) -> &[Error] {
        &self.match_errors
    }

    /// Start a run without waiting for it.
    ///
    /// Fails with [`Error::RunInProgress`] while another run is in flight and
    /// with [`Error::EngineNotReady`] when the engine has no document.
    pub fn start<E>(
        &mut self,
        engine: &mut E,
        terms: Vec<(TermId, HighlightDefinition)>,
    ) -> Result<RunStatus>
    where
        E: DocumentEngine + ?Sized,
    {
        if self.is_running() {
            return Err(Error::RunInProgress);
        }
        if !engine.is_document_loaded() {
            return Err(Error::EngineNotReady);
        }
        self.resolver.bind(engine.default_search_mode());

        let mut seen = HashSet::new();
        for (term_id, definition) in &terms {
            if !seen.insert(term_id.clone()) {
                return Err(Error::DuplicateTermId(term_id.to_string()));
            }
            definition.validate(term_id)?;
        }

        self.store.clear();
        self.match_errors.clear();
        self.state = DriverState::Idle;

        let mut pending: VecDeque<TermId> = terms.iter().map(|(id, _)| id.clone()).collect();
        self.definitions = terms.into_iter().collect();
        log::info!("starting search run over {} term(s)", pending.len());

        let Some(first) = pending.pop_front() else {
            return Ok(self.complete());
        };
        let current = self.begin_pass(engine, first)?;
        self.state = DriverState::Searching(ActiveRun { current, pending });
        Ok(RunStatus::Searching)
    }

    /// Process every event already delivered, without blocking.
    ///
    /// Returns [`RunStatus::Complete`] from the call that committed the last
    /// term.
    pub fn pump<E>(&mut self, engine: &mut E) -> Result<RunStatus>
    where
        E: DocumentEngine + ?Sized,
    {
        self.drive(engine, false)
    }

    /// Block until the run completes.
    ///
    /// There is no timeout: an engine that never signals document end stalls
    /// this call.
    pub fn wait<E>(&mut self, engine: &mut E) -> Result<RunStatus>
    where
        E: DocumentEngine + ?Sized,
    {
        self.drive(engine, true)
    }

    /// Start a run and block until its results are published.
    pub fn run<E>(
        &mut self,
        engine: &mut E,
        terms: Vec<(TermId, HighlightDefinition)>,
    ) -> Result<&ResultStore>
    where
        E: DocumentEngine + ?Sized,
    {
        self.start(engine, terms)?;
        self.wait(engine)?;
        self.results()
    }

    fn drive<E>(&mut self, engine: &mut E, blocking: bool) -> Result<RunStatus>
    where
        E: DocumentEngine + ?Sized,
    {
        loop {
            let received = match &self.state {
                DriverState::Searching(run) => {
                    let received = if blocking {
                        run.current
                            .events
                            .recv()
                            .map_err(|_| TryRecvError::Disconnected)
                    } else {
                        run.current.events.try_recv()
                    };
                    if matches!(received, Err(TryRecvError::Disconnected)) {
                        let term_id = run.current.term_id.clone();
                        self.abandon(&term_id);
                        return Err(Error::EngineDisconnected {
                            term_id: term_id.to_string(),
                        });
                    }
                    received
                },
                _ => return Ok(self.status()),
            };

            match received {
                Ok(event) => {
                    if self.handle_event(engine, event)? == RunStatus::Complete {
                        return Ok(RunStatus::Complete);
                    }
                },
                Err(_) => return Ok(RunStatus::Searching),
            }
        }
    }

    fn handle_event<E>(&mut self, engine: &mut E, event: SearchEvent) -> Result<RunStatus>
    where
        E: DocumentEngine + ?Sized,
    {
        let DriverState::Searching(run) = &mut self.state else {
            return Ok(self.status());
        };

        match event {
            SearchEvent::Result(raw) => {
                match accept_match(&run.current.term_id, raw) {
                    Ok(entry) => run.current.buffer.push(entry),
                    Err(e) => {
                        log::warn!("{}", e);
                        self.match_errors.push(e);
                    },
                }
                Ok(RunStatus::Searching)
            },
            SearchEvent::Error(reason) => {
                let err = Error::MatchGeometry {
                    term_id: run.current.term_id.to_string(),
                    page_number: 0,
                    reason,
                };
                log::warn!("{}", err);
                self.match_errors.push(err);
                Ok(RunStatus::Searching)
            },
            SearchEvent::DocumentEnd => self.finish_pass(engine),
        }
    }

    fn finish_pass<E>(&mut self, engine: &mut E) -> Result<RunStatus>
    where
        E: DocumentEngine + ?Sized,
    {
        let DriverState::Searching(run) = std::mem::replace(&mut self.state, DriverState::Idle)
        else {
            return Ok(self.status());
        };
        let ActiveRun {
            current,
            mut pending,
        } = run;

        let ActivePass { term_id, buffer, .. } = current;
        log::info!("term '{}' reached document end with {} match(es)", term_id, buffer.len());
        self.store.commit(term_id, buffer);

        match pending.pop_front() {
            Some(next) => {
                let current = self.begin_pass(engine, next)?;
                self.state = DriverState::Searching(ActiveRun { current, pending });
                Ok(RunStatus::Searching)
            },
            None => Ok(self.complete()),
        }
    }

    fn begin_pass<E>(&self, engine: &mut E, term_id: TermId) -> Result<ActivePass>
    where
        E: DocumentEngine + ?Sized,
    {
        let definition = self
            .definitions
            .get(&term_id)
            .ok_or_else(|| Error::InvalidDefinition {
                term_id: term_id.to_string(),
                reason: "no definition for queued term".to_string(),
            })?;
        let mode = self.resolver.resolve(definition)?;

        log::debug!(
            "searching term '{}' ({:?}) with mode {}",
            term_id,
            definition.term,
            mode.bits()
        );
        let (callbacks, events) = SearchCallbacks::channel();
        engine.text_search_init(&definition.term, mode, self.options, callbacks)?;

        Ok(ActivePass {
            term_id,
            buffer: TermResultGroup::new(),
            events,
        })
    }

    fn complete(&mut self) -> RunStatus {
        self.state = DriverState::Complete;
        log::info!(
            "search run complete: {} term(s), {} match(es), {} error(s)",
            self.store.len(),
            self.store.total_matches(),
            self.match_errors.len()
        );
        if let Some(hook) = self.on_complete.as_mut() {
            hook(&self.store);
        }
        RunStatus::Complete
    }

    fn abandon(&mut self, term_id: &TermId) {
        log::warn!("engine stopped reporting for term '{}', abandoning run", term_id);
        self.state = DriverState::Idle;
    }
}

/// Validate and normalize one engine match.
fn accept_match(term_id: &TermId, raw: RawMatch) -> Result<MatchEntry> {
    if raw.page_number == 0 {
        return Err(Error::MatchGeometry {
            term_id: term_id.to_string(),
            page_number: 0,
            reason: "page numbers start at 1".to_string(),
        });
    }
    if let Some(bad) = raw.quads.iter().position(|q| !q.is_finite()) {
        return Err(Error::MatchGeometry {
            term_id: term_id.to_string(),
            page_number: raw.page_number,
            reason: format!("quad {} has a non-finite coordinate", bad),
        });
    }

    Ok(MatchEntry {
        page_number: raw.page_number,
        quads: raw.quads.iter().map(normalize).collect(),
    })
}
