//! Bounded parallel runner for many documents.
//!
//! Each document first gets the cheap pipeline (exact, synonym and fuzzy
//! headings plus content rules). When a semantic model is loaded the full
//! pipeline then runs under a per-document timeout; on timeout the cheap
//! result stands. Work runs on the blocking pool, never on the async workers.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::engine::{Classification, EngineContext};
use crate::errors::EngineError;
use crate::models::{ItemStatement, Section, TimeRangedRecord, UsageReport};

/// One document to classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub sections: Vec<Section>,
    pub categories: Vec<String>,
}

pub struct BatchRunner {
    context: Arc<EngineContext>,
    permits: Arc<Semaphore>,
    workers: usize,
    document_timeout: Duration,
}

impl BatchRunner {
    /// `max_workers = None` sizes the pool to the available parallelism.
    pub fn new(
        context: Arc<EngineContext>,
        max_workers: Option<usize>,
        document_timeout: Duration,
    ) -> Self {
        let workers = max_workers
            .filter(|n| *n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            });
        Self {
            context,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
            document_timeout,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Classifies every document; results keep input order.
    pub async fn classify_all(
        &self,
        documents: Vec<Document>,
    ) -> Result<Vec<Classification>, EngineError> {
        info!(
            "Classifying {} document(s) on {} worker(s)",
            documents.len(),
            self.workers
        );

        let handles: Vec<JoinHandle<Result<Classification, EngineError>>> = documents
            .into_iter()
            .enumerate()
            .map(|(index, document)| {
                let context = self.context.clone();
                let permits = self.permits.clone();
                let timeout = self.document_timeout;
                tokio::spawn(classify_document(
                    context,
                    permits,
                    index,
                    Arc::new(document),
                    timeout,
                ))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await??);
        }
        Ok(results)
    }

    /// Usage analysis with one blocking task per statement; report keeps
    /// input order.
    pub async fn analyze_usage(
        &self,
        statements: Vec<ItemStatement>,
        records: Vec<TimeRangedRecord>,
        current_year: i32,
    ) -> Result<UsageReport, EngineError> {
        let records = Arc::new(records);

        let handles: Vec<_> = statements
            .into_iter()
            .map(|statement| {
                let context = self.context.clone();
                let permits = self.permits.clone();
                let records = records.clone();
                tokio::spawn(async move {
                    let permit = acquire(&permits).await?;
                    let usage = tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        context.analyze_statement(&statement, &records, current_year)
                    })
                    .await?;
                    Ok::<_, EngineError>(usage)
                })
            })
            .collect();

        let mut items = Vec::with_capacity(handles.len());
        for handle in handles {
            items.push(handle.await??);
        }
        Ok(UsageReport { items })
    }
}

/// Permits travel into the blocking closures, so a pass abandoned on
/// timeout still occupies its worker until it returns.
async fn acquire(permits: &Arc<Semaphore>) -> Result<OwnedSemaphorePermit, EngineError> {
    permits
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| EngineError::Worker(e.to_string()))
}

async fn classify_document(
    context: Arc<EngineContext>,
    permits: Arc<Semaphore>,
    index: usize,
    document: Arc<Document>,
    timeout: Duration,
) -> Result<Classification, EngineError> {
    let cheap = {
        let permit = acquire(&permits).await?;
        let context = context.clone();
        let document = document.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            context.classify_with(&document.sections, &document.categories, false)
        })
        .await?
    };

    if !context.has_semantic() {
        return Ok(cheap);
    }

    let permit = acquire(&permits).await?;
    let full = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        context.classify_with(&document.sections, &document.categories, true)
    });
    match tokio::time::timeout(timeout, full).await {
        Ok(Ok(full)) => Ok(full),
        Ok(Err(e)) => {
            warn!("Document {index}: semantic pass failed ({e}); keeping cheap result");
            Ok(cheap)
        }
        Err(_) => {
            warn!(
                "Document {index}: semantic pass exceeded {}ms; keeping cheap result",
                timeout.as_millis()
            );
            Ok(cheap)
        }
    }
}
