//! Fetch generation controller.
//!
//! One controller owns the overlay's fetch state. Each viewport change
//! starts a generation that fans out over every visible region and layer:
//!
//! ```text
//! viewport ──► begin ──► visible regions ──► layer tasks (JoinSet)
//!                │                              │
//!                │ cancels previous             ├─► enumerate ids
//!                ▼                              └─► batch tasks (JoinSet)
//!           GenerationToken                           │
//!                                                     ▼
//!                              settle ◄── layer outputs (catalog order)
//!                                │
//!                                └─► RenderSink::replace (current generation only)
//! ```
//!
//! Starting a generation and rendering one both happen under the controller
//! lock, so a superseded generation can never reach the sink.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::batch::{retrieve_batch, BatchOutput, ClassifiedLineRecord};
use super::enumerate::enumerate_ids;
use super::error::FetchError;
use super::generation::{GenerationId, GenerationToken};
use super::request::LayerRequest;
use super::sink::{FetchStatus, RenderSink};
use crate::access::{visible_regions, AccessPolicy, Caller, RegionSelection};
use crate::catalog::{LayerKey, RegionCatalog, DEFAULT_BATCH_LIMIT};
use crate::geo::Viewport;
use crate::source::FeatureSource;

/// Lowest zoom level at which the overlay fetches.
pub const DEFAULT_MIN_ZOOM: u8 = 12;

/// Records per feature request accepted by typical ArcGIS services.
pub const DEFAULT_PROVIDER_BATCH_CAP: usize = DEFAULT_BATCH_LIMIT;

/// Controller settings, usually built from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Overlay visibility. Viewport changes are ignored while disabled.
    pub enabled: bool,
    pub min_zoom: u8,
    /// Suppress the lowest road class.
    pub hide_streets: bool,
    /// Upper bound on identifiers per feature request.
    pub provider_batch_cap: usize,
    pub caller: Caller,
    pub policy: AccessPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_zoom: DEFAULT_MIN_ZOOM,
            hide_streets: false,
            provider_batch_cap: DEFAULT_PROVIDER_BATCH_CAP,
            caller: Caller::default(),
            policy: AccessPolicy::default(),
        }
    }
}

/// Whether a generation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Running,
}

/// Summary of a settled generation.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub generation: GenerationId,
    pub zoom: u8,
    pub regions: Vec<String>,
    /// Layers fetched.
    pub layers: usize,
    /// Records handed to the sink.
    pub rendered: usize,
    pub unclassified: usize,
    pub hidden: usize,
    pub failures: Vec<FetchError>,
    pub elapsed: Duration,
}

impl FetchReport {
    /// Features that were retrieved but not rendered.
    pub fn dropped(&self) -> usize {
        self.unclassified + self.hidden
    }

    pub fn failed_layers(&self) -> usize {
        self.failures.len()
    }

    /// Status line text for the failures, one per line.
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// How a viewport change was handled.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// Records reached the sink. Some layers may have failed.
    Rendered(FetchReport),
    /// Every layer failed; the display was left unchanged.
    Failed(FetchReport),
    /// Superseded before it settled; nothing reached the sink.
    Cancelled(GenerationId),
    /// Zoomed out below the fetch threshold; the display was cleared.
    Cleared,
    /// The overlay is disabled.
    Disabled,
}

impl GenerationOutcome {
    pub fn report(&self) -> Option<&FetchReport> {
        match self {
            GenerationOutcome::Rendered(report) | GenerationOutcome::Failed(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, GenerationOutcome::Rendered(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationOutcome::Cancelled(_))
    }
}

#[derive(Debug)]
struct ControllerState {
    settings: ControllerSettings,
    current: Option<GenerationToken>,
    last_viewport: Option<Viewport>,
    next_generation: u64,
    /// Generations started but not yet settled, including cancelled ones.
    pending: usize,
    /// Whether the last generation to render or fail had failures.
    last_failed: bool,
}

/// A generation that has been started and must be executed.
struct Planned<R: RenderSink> {
    token: GenerationToken,
    pending: PendingGuard<R>,
    viewport: Viewport,
    settings: ControllerSettings,
}

enum Start<R: RenderSink> {
    Run(Planned<R>),
    Done(GenerationOutcome),
}

fn lock_state(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds a started generation's place in `pending`.
///
/// Settling releases it under the controller lock. If the generation's
/// future is dropped first, the drop releases it instead, cancels the
/// generation and clears the loading status when nothing else is running.
struct PendingGuard<R: RenderSink> {
    state: Arc<Mutex<ControllerState>>,
    sink: Arc<R>,
    token: GenerationToken,
    released: bool,
}

impl<R: RenderSink> PendingGuard<R> {
    /// Gives up the pending slot; `state` must be the locked controller state.
    fn release(&mut self, state: &mut ControllerState) {
        if self.released {
            return;
        }
        self.released = true;
        state.pending = state.pending.saturating_sub(1);
        if state.current.as_ref().map(GenerationToken::id) == Some(self.token.id()) {
            state.current = None;
        }
    }
}

impl<R: RenderSink> Drop for PendingGuard<R> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let state = Arc::clone(&self.state);
        let mut state = lock_state(&state);
        self.release(&mut state);
        self.token.cancel();
        if state.pending == 0 && !state.last_failed {
            self.sink.set_status(FetchStatus::Idle);
        }
        debug!(generation = %self.token.id(), "Generation dropped before settling");
    }
}

/// Output of one layer task.
#[derive(Debug, Default)]
struct LayerOutput {
    records: Vec<ClassifiedLineRecord>,
    unclassified: usize,
    hidden: usize,
}

impl LayerOutput {
    fn absorb(&mut self, batch: BatchOutput) {
        self.records.extend(batch.records);
        self.unclassified += batch.unclassified;
        self.hidden += batch.hidden;
    }
}

/// Layer results of a generation that ran to completion, in catalog order.
struct Collected {
    regions: Vec<String>,
    layers: usize,
    outputs: BTreeMap<usize, LayerOutput>,
    failures: BTreeMap<usize, FetchError>,
}

/// Orchestrates fetch generations for one overlay.
pub struct FetchController<S, R> {
    catalog: Arc<RegionCatalog>,
    source: Arc<S>,
    sink: Arc<R>,
    state: Arc<Mutex<ControllerState>>,
}

impl<S, R> FetchController<S, R>
where
    S: FeatureSource + 'static,
    R: RenderSink + 'static,
{
    pub fn new(catalog: Arc<RegionCatalog>, source: Arc<S>, sink: Arc<R>, settings: ControllerSettings) -> Self {
        Self {
            catalog,
            source,
            sink,
            state: Arc::new(Mutex::new(ControllerState {
                settings,
                current: None,
                last_viewport: None,
                next_generation: 0,
                pending: 0,
                last_failed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        lock_state(&self.state)
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn sink(&self) -> &Arc<R> {
        &self.sink
    }

    pub fn settings(&self) -> ControllerSettings {
        self.lock().settings.clone()
    }

    pub fn phase(&self) -> ControllerPhase {
        if self.lock().pending > 0 {
            ControllerPhase::Running
        } else {
            ControllerPhase::Idle
        }
    }

    /// The generation that may still render, if any.
    pub fn current_generation(&self) -> Option<GenerationId> {
        self.lock().current.as_ref().map(GenerationToken::id)
    }

    /// Runs a generation for `viewport` to completion.
    pub async fn on_viewport_changed(&self, viewport: Viewport) -> GenerationOutcome {
        match self.begin(viewport) {
            Start::Run(planned) => self.execute(planned).await,
            Start::Done(outcome) => outcome,
        }
    }

    /// Starts a generation for `viewport` immediately and executes it on a
    /// separate task.
    ///
    /// The previous generation is cancelled before this returns, so calls
    /// supersede each other in call order.
    pub fn spawn_viewport_change(self: &Arc<Self>, viewport: Viewport) -> JoinHandle<GenerationOutcome> {
        let start = self.begin(viewport);
        let this = Arc::clone(self);
        tokio::spawn(async move {
            match start {
                Start::Run(planned) => this.execute(planned).await,
                Start::Done(outcome) => outcome,
            }
        })
    }

    /// Shows or hides the overlay. Hiding cancels and clears; showing
    /// refetches the last viewport.
    pub async fn set_enabled(&self, enabled: bool) -> Option<GenerationOutcome> {
        {
            let mut state = self.lock();
            if state.settings.enabled == enabled {
                return None;
            }
            state.settings.enabled = enabled;
            if !enabled {
                if let Some(token) = state.current.take() {
                    token.cancel();
                }
                self.sink.clear();
                self.sink.set_status(FetchStatus::Idle);
                info!("Overlay disabled");
                return None;
            }
        }
        info!("Overlay enabled");
        self.refresh().await
    }

    /// Toggles suppression of the lowest road class and refetches.
    pub async fn set_hide_streets(&self, hide: bool) -> Option<GenerationOutcome> {
        self.lock().settings.hide_streets = hide;
        self.refresh().await
    }

    /// Changes the active region selection and refetches.
    pub async fn set_selection(&self, selection: RegionSelection) -> Option<GenerationOutcome> {
        self.lock().settings.policy.selection = selection;
        self.refresh().await
    }

    /// Replaces the caller identity used for region permissions and refetches.
    pub async fn set_caller(&self, caller: Caller) -> Option<GenerationOutcome> {
        self.lock().settings.caller = caller;
        self.refresh().await
    }

    async fn refresh(&self) -> Option<GenerationOutcome> {
        let viewport = self.lock().last_viewport.clone()?;
        Some(self.on_viewport_changed(viewport).await)
    }

    /// Supersedes the current generation and decides whether a new one runs.
    fn begin(&self, viewport: Viewport) -> Start<R> {
        let mut state = self.lock();
        state.last_viewport = Some(viewport.clone());

        if !state.settings.enabled {
            debug!(zoom = viewport.zoom, "Overlay disabled, ignoring viewport change");
            return Start::Done(GenerationOutcome::Disabled);
        }

        if let Some(previous) = state.current.take() {
            previous.cancel();
            debug!(
                generation = %previous.id(),
                outstanding = previous.outstanding(),
                "Superseded generation"
            );
        }

        if viewport.zoom < state.settings.min_zoom {
            debug!(
                zoom = viewport.zoom,
                min_zoom = state.settings.min_zoom,
                "Below minimum zoom, clearing overlay"
            );
            self.sink.clear();
            if state.pending == 0 {
                self.sink.set_status(FetchStatus::Idle);
            }
            return Start::Done(GenerationOutcome::Cleared);
        }

        state.next_generation += 1;
        let token = GenerationToken::new(GenerationId(state.next_generation));
        state.current = Some(token.clone());
        state.pending += 1;
        self.sink.set_status(FetchStatus::Loading);

        Start::Run(Planned {
            pending: PendingGuard {
                state: Arc::clone(&self.state),
                sink: Arc::clone(&self.sink),
                token: token.clone(),
                released: false,
            },
            token,
            viewport,
            settings: state.settings.clone(),
        })
    }

    #[instrument(skip_all, fields(generation = %planned.token.id(), zoom = planned.viewport.zoom))]
    async fn execute(&self, planned: Planned<R>) -> GenerationOutcome {
        let started = Instant::now();
        let Planned {
            token,
            pending,
            viewport,
            settings,
        } = planned;

        let regions = visible_regions(&self.catalog, &viewport, &settings.caller, &settings.policy);
        let requests: Vec<LayerRequest> = regions
            .iter()
            .filter_map(|code| self.catalog.region(code))
            .flat_map(|region| LayerRequest::for_region(region, &viewport))
            .collect();

        info!(regions = ?regions, layers = requests.len(), "Starting fetch generation");

        let collected = self.collect_layers(regions, requests, &token, &settings).await;
        self.settle(&token, pending, viewport.zoom, collected, started.elapsed())
    }

    /// Fans out one task per layer and gathers their results. `None` when
    /// the generation was cancelled first.
    async fn collect_layers(
        &self,
        regions: Vec<String>,
        requests: Vec<LayerRequest>,
        token: &GenerationToken,
        settings: &ControllerSettings,
    ) -> Option<Collected> {
        let layers = requests.len();
        let mut tasks = JoinSet::new();
        let mut task_keys = HashMap::with_capacity(layers);

        for (index, request) in requests.into_iter().enumerate() {
            let key = request.key.clone();
            let source = Arc::clone(&self.source);
            let token = token.clone();
            let cap = settings.provider_batch_cap;
            let hide = settings.hide_streets;
            let handle = tasks.spawn(async move {
                (index, fetch_layer(source, Arc::new(request), cap, hide, token).await)
            });
            task_keys.insert(handle.id(), (index, key));
        }

        let mut outputs = BTreeMap::new();
        let mut failures = BTreeMap::new();

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    tasks.abort_all();
                    debug!("Generation cancelled, abandoning layer tasks");
                    return None;
                }

                joined = tasks.join_next_with_id() => {
                    match joined {
                        None => break,
                        Some(Ok((_, (index, Ok(output))))) => {
                            outputs.insert(index, output);
                        }
                        Some(Ok((_, (index, Err(error))))) => {
                            warn!(region = error.region(), layer = error.layer(), error = %error, "Layer fetch failed");
                            failures.insert(index, error);
                        }
                        Some(Err(join_error)) => {
                            let (index, key) = task_keys
                                .remove(&join_error.id())
                                .unwrap_or_else(|| (usize::MAX, LayerKey::new("?", "?")));
                            warn!(layer = %key, error = %join_error, "Layer task panicked");
                            failures.insert(index, FetchError::TaskFailed {
                                region: key.region,
                                layer: key.layer,
                                message: join_error.to_string(),
                            });
                        }
                    }
                }
            }
        }

        Some(Collected {
            regions,
            layers,
            outputs,
            failures,
        })
    }

    /// Renders or discards a finished generation and updates the status.
    fn settle(
        &self,
        token: &GenerationToken,
        mut pending: PendingGuard<R>,
        zoom: u8,
        collected: Option<Collected>,
        elapsed: Duration,
    ) -> GenerationOutcome {
        let mut state = self.lock();
        pending.release(&mut state);

        let collected = match collected {
            Some(collected) if !token.is_cancelled() => collected,
            _ => {
                debug!(generation = %token.id(), "Discarding cancelled generation");
                if state.pending == 0 && !state.last_failed {
                    self.sink.set_status(FetchStatus::Idle);
                }
                return GenerationOutcome::Cancelled(token.id());
            }
        };

        let mut records = Vec::new();
        let mut unclassified = 0;
        let mut hidden = 0;
        for output in collected.outputs.into_values() {
            records.extend(output.records);
            unclassified += output.unclassified;
            hidden += output.hidden;
        }

        let report = FetchReport {
            generation: token.id(),
            zoom,
            regions: collected.regions,
            layers: collected.layers,
            rendered: records.len(),
            unclassified,
            hidden,
            failures: collected.failures.into_values().collect(),
            elapsed,
        };
        state.last_failed = !report.failures.is_empty();

        if report.layers > 0 && report.failed_layers() == report.layers {
            warn!(
                generation = %report.generation,
                failed_layers = report.failed_layers(),
                "Every layer failed, keeping previous display"
            );
            self.sink.set_status(FetchStatus::Error(report.failure_summary()));
            return GenerationOutcome::Failed(report);
        }

        self.sink.replace(records);
        if state.last_failed {
            self.sink.set_status(FetchStatus::Error(report.failure_summary()));
        } else if state.pending == 0 {
            self.sink.set_status(FetchStatus::Idle);
        }

        info!(
            generation = %report.generation,
            rendered = report.rendered,
            dropped = report.dropped(),
            failed_layers = report.failed_layers(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Generation rendered"
        );
        GenerationOutcome::Rendered(report)
    }
}

/// Enumerates one layer and retrieves all of its batches.
///
/// The layer is all-or-nothing: the first failing batch fails it and
/// abandons the rest.
async fn fetch_layer<S: FeatureSource + 'static>(
    source: Arc<S>,
    request: Arc<LayerRequest>,
    provider_cap: usize,
    hide_streets: bool,
    token: GenerationToken,
) -> Result<LayerOutput, FetchError> {
    let enumeration = enumerate_ids(source.as_ref(), &request, provider_cap, &token).await?;

    let mut output = LayerOutput::default();
    if token.is_cancelled() {
        return Ok(output);
    }

    let id_field: Arc<str> = Arc::from(enumeration.id_field);
    let batch_count = enumeration.ranges.len();
    let mut batches = JoinSet::new();
    for (index, range) in enumeration.ranges.into_iter().enumerate() {
        let source = Arc::clone(&source);
        let request = Arc::clone(&request);
        let id_field = Arc::clone(&id_field);
        let token = token.clone();
        batches.spawn(async move {
            let result = retrieve_batch(source.as_ref(), &request, &id_field, range, hide_streets, &token).await;
            (index, result)
        });
    }

    let mut results: BTreeMap<usize, BatchOutput> = BTreeMap::new();
    while let Some(joined) = batches.join_next().await {
        match joined {
            Ok((index, Ok(batch))) => {
                results.insert(index, batch);
            }
            Ok((_, Err(error))) => {
                batches.abort_all();
                return Err(error);
            }
            Err(join_error) => {
                batches.abort_all();
                return Err(FetchError::TaskFailed {
                    region: request.key.region.clone(),
                    layer: request.key.layer.clone(),
                    message: join_error.to_string(),
                });
            }
        }
    }

    for batch in results.into_values() {
        output.absorb(batch);
    }
    debug!(
        layer = %request.key,
        batches = batch_count,
        records = output.records.len(),
        "Layer complete"
    );
    Ok(output)
}
