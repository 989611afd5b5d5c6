use engine_logging::{engine_debug, engine_info, engine_warn};
use grid_core::{
    lookup_job, read_entity_meta, CompletionEvent, EntityMeta, JobFailure, JobSpec,
    NavigationContext, Period, ProgressEvent, RunReport, RunRequest,
};

use crate::codec::extract_tables;
use crate::config::EngineConfig;
use crate::filters::{select_dataset, set_reporting_period};
use crate::navigate::navigate_to;
use crate::page::Page;
use crate::poll::wait_for_table;
use crate::types::{EngineEvent, JobOutcome, JobRecord, ProgressSink, RunOutcome, Stage};

/// Drives one run: jobs strictly in request order, one at a time.
///
/// A failing job becomes a placeholder section; the run itself always
/// completes and emits exactly one completion event.
pub struct JobRunner<'a> {
    page: &'a dyn Page,
    config: &'a EngineConfig,
    sink: &'a dyn ProgressSink,
}

impl<'a> JobRunner<'a> {
    pub fn new(page: &'a dyn Page, config: &'a EngineConfig, sink: &'a dyn ProgressSink) -> Self {
        Self { page, config, sink }
    }

    pub async fn run(&self, request: &RunRequest) -> RunOutcome {
        let _scope = engine_logging::enter_run(request.correlation_id.as_deref());
        let (ctx, meta) = self.read_page_identity().await;

        let mut skipped = Vec::new();
        let jobs: Vec<&'static JobSpec> = request
            .job_ids
            .iter()
            .filter_map(|id| {
                let job = lookup_job(id);
                if job.is_none() {
                    engine_warn!("unknown job id {:?}, skipping", id);
                    skipped.push(id.clone());
                }
                job
            })
            .collect();
        let total = jobs.len();
        engine_info!(
            "run start period={} jobs={:?} ctx={:?} meta={:?}",
            request.period,
            request.job_ids,
            ctx,
            meta
        );

        let mut report = RunReport::new(&meta, request.period, total, &(self.config.clock)());
        let mut records = Vec::with_capacity(total);
        for (position, job) in jobs.into_iter().enumerate() {
            self.sink.emit(EngineEvent::Progress(ProgressEvent {
                done_count: position + 1,
                total_count: total,
                current_label: job.label.to_string(),
                correlation_id: request.correlation_id.clone(),
            }));

            let outcome = match self.run_job(job, &ctx, request.period).await {
                Ok(body) => {
                    engine_info!("section {} extracted chars={}", job.label, body.chars);
                    report.push_section(job.label, &body.text);
                    JobOutcome::Extracted {
                        tables: body.tables,
                        chars: body.chars,
                    }
                }
                Err(failure) => {
                    engine_warn!("section {} recorded as placeholder: {}", job.label, failure);
                    report.push_failure(job.label, failure);
                    JobOutcome::Failed(failure)
                }
            };
            engine_debug!("job {} stage={:?}", job.id, Stage::Recorded);
            records.push(JobRecord {
                job_id: job.id,
                label: job.label,
                outcome,
            });
        }

        let text = report.finish();
        self.sink.emit(EngineEvent::Completed(CompletionEvent {
            text: text.clone(),
            meta: meta.clone(),
            correlation_id: request.correlation_id.clone(),
        }));
        engine_info!("run end chars={}", text.len());

        if self.config.copy_to_clipboard {
            match self.page.write_clipboard(&text).await {
                Ok(()) => engine_debug!("clipboard written"),
                Err(err) => engine_warn!("clipboard write failed: {}", err),
            }
        }

        RunOutcome {
            text,
            meta,
            jobs: records,
            skipped,
        }
    }

    async fn read_page_identity(&self) -> (NavigationContext, EntityMeta) {
        let address = self.page.current_url().await.unwrap_or_else(|err| {
            engine_warn!("cannot read start address: {}", err);
            String::new()
        });
        let title = self.page.title().await.unwrap_or_else(|err| {
            engine_warn!("cannot read page title: {}", err);
            String::new()
        });
        (
            NavigationContext::from_address(&address, &self.config.default_referral),
            read_entity_meta(&title),
        )
    }

    async fn run_job(
        &self,
        job: &JobSpec,
        ctx: &NavigationContext,
        period: Period,
    ) -> Result<SectionBody, JobFailure> {
        let config = self.config;
        engine_debug!("job {} stage={:?}", job.id, Stage::Navigating);
        if !navigate_to(self.page, job, ctx, config).await {
            return Err(JobFailure::NavigationTimeout);
        }
        tokio::time::sleep(config.post_navigation_settle).await;

        if job.dataset.is_some() || job.section.is_period_sensitive() {
            engine_debug!("job {} stage={:?}", job.id, Stage::AdjustingFilters);
        }
        if let Some(dataset) = job.dataset {
            select_dataset(self.page, dataset, config).await;
        }
        if job.section.is_period_sensitive() {
            set_reporting_period(self.page, period, config).await;
            tokio::time::sleep(config.post_period_settle).await;
        }

        engine_debug!("job {} stage={:?}", job.id, Stage::WaitingForTable);
        wait_for_table(self.page, config.table_poll, config.table_row_threshold)
            .await
            .ok_or(JobFailure::TableTimeout)?;

        engine_debug!("job {} stage={:?}", job.id, Stage::Extracting);
        let html = self.page.snapshot().await.map_err(|err| {
            engine_warn!("extraction snapshot failed: {}", err);
            JobFailure::TableTimeout
        })?;
        let extraction = extract_tables(&html);
        engine_info!(
            "extracted tables={} with_data={}",
            extraction.tables_found,
            extraction.tables_with_data
        );
        Ok(SectionBody {
            chars: extraction.markdown.len(),
            tables: extraction.tables_with_data,
            text: extraction.markdown,
        })
    }
}

struct SectionBody {
    text: String,
    tables: usize,
    chars: usize,
}
