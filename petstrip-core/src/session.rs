//! Photo analysis with a single pending-confirmation slot.
//!
//! Every analysis takes a ticket from a monotonically increasing generation
//! counter. Only the completion holding the latest ticket may fill the
//! pending slot; older completions are reported as stale and dropped.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, Utc};

use crate::analysis::{analyze_pixels, AnalysisReport};
use crate::config::AnalysisConfig;
use crate::decode::{screen_input, screen_name, ImageCrateDecoder, ImageDecoder};
use crate::error::{Error, Result};
use crate::history::UpsertOutcome;
use crate::repository::Repository;
use crate::store::PersistenceStore;
use crate::types::{ContextInputs, HistoryPatch, PendingResult};

/// Identifies one analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// How an analysis request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Latest request; the result is now pending
    Ready(PendingResult),
    /// A newer request started first; nothing was applied
    Stale { generation: u64 },
}

pub struct Analyzer {
    config: AnalysisConfig,
    decoder: Arc<dyn ImageDecoder>,
    generation: AtomicU64,
    pending: Mutex<Option<PendingResult>>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_decoder(config, Arc::new(ImageCrateDecoder))
    }

    pub fn with_decoder(config: AnalysisConfig, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            config,
            decoder,
            generation: AtomicU64::new(0),
            pending: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Generation of the most recent request.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a request, superseding any pending result.
    pub fn begin(&self) -> RequestTicket {
        let mut pending = self.pending_slot();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if pending.take().is_some() {
            tracing::debug!(generation, "Pending result superseded");
        }
        RequestTicket { generation }
    }

    /// Analyze image bytes. `name` is the file name, when known.
    ///
    /// Rejected input leaves the pending slot untouched.
    pub async fn analyze_bytes(
        &self,
        bytes: Vec<u8>,
        name: Option<&str>,
        inputs: ContextInputs,
    ) -> Result<AnalysisOutcome> {
        screen_input(&bytes, name)?;
        let ticket = self.begin();
        self.run(ticket, bytes, inputs).await
    }

    /// Read and analyze an image file.
    pub async fn analyze_path(&self, path: &Path, inputs: ContextInputs) -> Result<AnalysisOutcome> {
        let name = path.file_name().and_then(|n| n.to_str());
        screen_name(name)?;

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                // A failed read still replaces whatever was pending
                self.begin();
                tracing::warn!(path = %path.display(), error = %e, "Failed to read image");
                return Err(Error::Read(e));
            }
        };

        self.analyze_bytes(bytes, name, inputs).await
    }

    async fn run(
        &self,
        ticket: RequestTicket,
        bytes: Vec<u8>,
        inputs: ContextInputs,
    ) -> Result<AnalysisOutcome> {
        let decoder = Arc::clone(&self.decoder);
        let config = self.config.clone();

        let report = tokio::task::spawn_blocking(move || -> Result<AnalysisReport> {
            let buffer = decoder.decode(&bytes)?;
            Ok(analyze_pixels(&buffer, &config, &inputs))
        })
        .await
        .map_err(|e| Error::Decode(format!("decode task failed: {}", e)))
        .and_then(|result| result);

        let mut pending = self.pending_slot();
        if self.current_generation() != ticket.generation {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.current_generation(),
                "Discarding stale analysis"
            );
            return Ok(AnalysisOutcome::Stale {
                generation: ticket.generation,
            });
        }

        let report = match report {
            Ok(report) => report,
            Err(e) => {
                *pending = None;
                tracing::warn!(generation = ticket.generation, error = %e, "Analysis failed");
                return Err(e);
            }
        };

        let now = Local::now();
        let result = PendingResult {
            generation: ticket.generation,
            date: now.date_naive(),
            timestamp: now.with_timezone(&Utc),
            sample: report.sample.color,
            hsv: report.hsv,
            glucose: report.glucose,
            ph: report.ph,
            adjusted_blue: report.context.adjusted_blue,
            context_metrics: report.context.metrics(),
        };

        tracing::info!(
            generation = ticket.generation,
            sample = %result.sample.hex(),
            level = result.glucose.level.as_str(),
            ph = ?result.ph.ph,
            "Analysis ready"
        );

        *pending = Some(result.clone());
        Ok(AnalysisOutcome::Ready(result))
    }

    /// The result awaiting confirmation, if any.
    pub fn pending(&self) -> Option<PendingResult> {
        self.pending_slot().clone()
    }

    pub fn discard_pending(&self) {
        self.pending_slot().take();
    }

    /// Record the pending glucose result under its capture date.
    pub fn confirm_glucose<S: PersistenceStore>(
        &self,
        repo: &mut Repository<S>,
    ) -> Result<UpsertOutcome> {
        let pending = self.pending().ok_or(Error::NoPendingResult)?;
        Ok(repo.upsert(HistoryPatch::glucose(
            pending.date,
            pending.timestamp,
            &pending.glucose,
        )))
    }

    /// Record the pending pH result under its capture date.
    pub fn confirm_ph<S: PersistenceStore>(&self, repo: &mut Repository<S>) -> Result<UpsertOutcome> {
        let pending = self.pending().ok_or(Error::NoPendingResult)?;
        Ok(repo.upsert(HistoryPatch::ph(
            pending.date,
            pending.timestamp,
            pending.ph.ph,
        )))
    }

    fn pending_slot(&self) -> MutexGuard<'_, Option<PendingResult>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Blocking wrapper for callers without an async runtime.
pub struct SyncAnalyzer {
    inner: Analyzer,
    runtime: tokio::runtime::Runtime,
}

impl SyncAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Self::from_analyzer(Analyzer::new(config))
    }

    pub fn from_analyzer(inner: Analyzer) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { inner, runtime })
    }

    /// Read and analyze an image file (blocking)
    pub fn analyze_path(&self, path: &Path, inputs: ContextInputs) -> Result<AnalysisOutcome> {
        self.runtime.block_on(self.inner.analyze_path(path, inputs))
    }

    /// Analyze image bytes (blocking)
    pub fn analyze_bytes(
        &self,
        bytes: Vec<u8>,
        name: Option<&str>,
        inputs: ContextInputs,
    ) -> Result<AnalysisOutcome> {
        self.runtime
            .block_on(self.inner.analyze_bytes(bytes, name, inputs))
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.inner
    }
}
