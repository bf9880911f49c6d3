//! The build-session state machine.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use strata_buildinfo::{
    clean_persisted_program, load_snapshot, validate, write_snapshot, LoadRejection,
};
use strata_common::Fingerprint;
use strata_config::{resolution_fingerprint, ProjectConfig, CONFIG_FILE_NAME};
use strata_resolve::{
    FsEventBatch, InvalidationEngine, RankClassifier, ResolutionCache, ResolutionEntry,
    ResolutionKey, SpecifierResolver,
};

use crate::error::SessionError;
use crate::program::ProgramFiles;

/// Version string stamped into persisted artifacts.
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Every resolution is expected to hit the rehydrated cache.
    Reusing,
    /// The persisted artifact was rejected (or absent); the cache
    /// starts empty and fills as resolutions run.
    Rebuilding,
    /// At least one change batch has been absorbed; the session now
    /// alternates invalidation and reconciliation cycles.
    SteadyState,
}

/// One incremental build session owning one project's resolution cache.
///
/// The session is the single writer of its cache. Work arrives as
/// discrete units: resolution requests, change batches, and explicit
/// control operations; no two units overlap. Change processing is a
/// two-phase contract: [`absorb_events`](Self::absorb_events) evicts
/// entries the invalidation engine condemned, and a following
/// [`reconcile`](Self::reconcile) re-resolves them. Keeping the phases
/// separate lets the host coalesce further edits between them: a newer
/// batch simply widens the pending set before reconciliation runs.
pub struct BuildSession<R> {
    resolver: R,
    cache: ResolutionCache,
    program: ProgramFiles,
    engine: InvalidationEngine,
    config_fingerprint: Fingerprint,
    buildinfo_path: PathBuf,
    state: SessionState,
    pending: BTreeSet<ResolutionKey>,
    last_rejection: Option<LoadRejection>,
}

impl<R: SpecifierResolver> BuildSession<R> {
    /// Cold-starts a session: attempts to load and validate the
    /// persisted artifact, seeding the cache on success and starting
    /// empty on any rejection.
    pub fn open(
        project_dir: &Path,
        config: &ProjectConfig,
        program: ProgramFiles,
        resolver: R,
    ) -> Self {
        let config_fingerprint = resolution_fingerprint(config);
        let buildinfo_path = project_dir.join(&config.buildinfo.path);
        let engine = build_engine(project_dir, config);

        let validated = load_snapshot(&buildinfo_path)
            .and_then(|snapshot| validate(snapshot, program.fingerprints(), config_fingerprint));
        let (cache, state, last_rejection) = match validated {
            Ok(cache) => (cache, SessionState::Reusing, None),
            Err(rejection) => (
                ResolutionCache::new(),
                SessionState::Rebuilding,
                Some(rejection),
            ),
        };

        Self {
            resolver,
            cache,
            program,
            engine,
            config_fingerprint,
            buildinfo_path,
            state,
            pending: BTreeSet::new(),
            last_rejection,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Why the persisted artifact was rejected at open, if it was.
    pub fn last_rejection(&self) -> Option<&LoadRejection> {
        self.last_rejection.as_ref()
    }

    /// The cache, for inspection and reporting.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// The program file set.
    pub fn program(&self) -> &ProgramFiles {
        &self.program
    }

    /// Resolves one specifier, reusing the cached entry when live.
    pub fn resolve(&mut self, key: ResolutionKey) -> Result<&ResolutionEntry, SessionError> {
        Ok(self.cache.resolve_or_reuse(key, &self.resolver)?)
    }

    /// Phase 1 of change processing: runs the invalidation engine over
    /// `batch` and evicts condemned entries. The evicted keys stay
    /// pending until [`reconcile`](Self::reconcile) re-resolves them.
    ///
    /// Safe to call repeatedly before reconciling; later batches widen
    /// the pending set.
    pub fn absorb_events(&mut self, batch: &FsEventBatch) {
        let plan = self.engine.plan(&self.cache, batch);
        if plan.invalidate_all {
            self.cache.invalidate_all();
            // Everything re-resolves lazily; nothing specific to queue.
            self.pending.clear();
        } else {
            self.cache.invalidate(&plan.keys);
            self.pending.extend(plan.keys);
        }
        self.state = SessionState::SteadyState;
    }

    /// Phase 2 of change processing: re-resolves every pending key.
    ///
    /// On a resolver failure the failed key (and any not yet retried)
    /// remains pending, nothing is cached for it, and the error is
    /// returned so the host can re-run the cycle.
    pub fn reconcile(&mut self) -> Result<Vec<ResolutionKey>, SessionError> {
        let mut reresolved = Vec::with_capacity(self.pending.len());
        while let Some(key) = self.pending.iter().next().cloned() {
            match self.cache.resolve_or_reuse(key.clone(), &self.resolver) {
                Ok(_) => {
                    self.pending.remove(&key);
                    reresolved.push(key);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(reresolved)
    }

    /// Adds a file to the program or refreshes its fingerprint after an
    /// edit.
    pub fn upsert_file(&mut self, path: &Path, fingerprint: Fingerprint) {
        self.program.upsert(path, fingerprint);
    }

    /// Removes a file from the program, dropping its cached
    /// resolutions.
    pub fn remove_file(&mut self, path: &Path) {
        let normalized = strata_common::path::normalize(path);
        self.program.remove(path);
        self.cache.remove_containing_file(path);
        self.pending.retain(|key| key.containing_file != normalized);
    }

    /// Discards every cached entry. Used when resolution-affecting
    /// configuration changed out from under the session.
    pub fn force_invalidate_all(&mut self) {
        self.cache.invalidate_all();
        self.pending.clear();
    }

    /// Flushes the cache and program fingerprints to the build-info
    /// artifact, atomically.
    pub fn persist_now(&self) -> Result<(), SessionError> {
        write_snapshot(
            &self.buildinfo_path,
            &self.cache,
            self.program.fingerprints().clone(),
            self.config_fingerprint,
            TOOL_VERSION,
        )?;
        Ok(())
    }

    /// Discards the persisted resolution section while keeping the
    /// artifact's other incremental state. The in-memory cache is
    /// untouched.
    pub fn clean_persisted_program(&self) -> Result<bool, SessionError> {
        Ok(clean_persisted_program(&self.buildinfo_path, TOOL_VERSION)?)
    }
}

/// Builds the invalidation engine for a project's configuration.
fn build_engine(project_dir: &Path, config: &ProjectConfig) -> InvalidationEngine {
    let type_roots = config
        .resolution
        .type_roots
        .iter()
        .map(|root| project_dir.join(root))
        .collect();
    let classifier = RankClassifier::new(
        &config.resolution.source_extensions,
        &config.resolution.declaration_extensions,
        type_roots,
    );
    let mut config_files = BTreeSet::new();
    config_files.insert(project_dir.join(CONFIG_FILE_NAME));
    InvalidationEngine::new(classifier, config_files)
}
