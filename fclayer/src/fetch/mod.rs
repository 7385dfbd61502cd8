//! Viewport-scoped fetch pipeline.
//!
//! A viewport change becomes a *generation*: the controller enumerates the
//! identifiers of every visible layer, retrieves them in bounded batches,
//! classifies each feature and hands the flattened result to a render sink.
//! Starting a generation cancels the previous one, and a cancelled
//! generation's results never reach the sink.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fclayer::catalog::RegionCatalog;
//! use fclayer::fetch::{ControllerSettings, FetchController, MemorySink};
//! use fclayer::geo::{Extent, Viewport};
//! use fclayer::source::{ArcGisFeatureSource, AsyncReqwestClient};
//!
//! let controller = FetchController::new(
//!     Arc::new(RegionCatalog::builtin()?),
//!     Arc::new(ArcGisFeatureSource::new(AsyncReqwestClient::new()?)),
//!     Arc::new(MemorySink::new()),
//!     ControllerSettings::default(),
//! );
//! let viewport = Viewport::new(14, Extent::around(-77.03, 38.9, 0.05, 0.03));
//! let outcome = controller.on_viewport_changed(viewport).await;
//! ```

mod batch;
mod controller;
mod enumerate;
mod error;
mod generation;
mod request;
mod sink;

pub use batch::{retrieve_batch, BatchOutput, ClassifiedLineRecord};
pub use controller::{
    ControllerPhase, ControllerSettings, FetchController, FetchReport, GenerationOutcome,
    DEFAULT_MIN_ZOOM, DEFAULT_PROVIDER_BATCH_CAP,
};
pub use enumerate::{effective_batch_size, enumerate_ids, partition_ids, Enumeration, IdRange};
pub use error::FetchError;
pub use generation::{GenerationId, GenerationToken, OperationGuard};
pub use request::LayerRequest;
pub use sink::{FetchStatus, MemorySink, RenderSink};
