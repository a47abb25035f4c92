use indicatif::ProgressBar;

use crate::error::FetchError;
use crate::fetcher::PageFetcher;
use crate::log::LogSink;
use crate::model::{ResolvedUnit, VoteRecord};
use crate::parser::parse_results;

/// Records of every unit whose page could be read, in target order.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub records: Vec<VoteRecord>,
    pub skipped: usize,
}

/// Fetches result pages one by one and turns them into [`VoteRecord`]s.
///
/// A page that cannot be fetched aborts the run. A fetched page missing one of
/// the counters only drops its own unit.
pub struct Aggregator<'a, F> {
    fetcher: &'a F,
    log: &'a dyn LogSink,
    progress: ProgressBar,
}

impl<'a, F: PageFetcher> Aggregator<'a, F> {
    pub fn new(fetcher: &'a F, log: &'a dyn LogSink) -> Self {
        Aggregator {
            fetcher,
            log,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub async fn collect(&self, units: Vec<ResolvedUnit>) -> Result<Aggregation, FetchError> {
        self.progress.set_length(units.len() as u64);
        let mut out = Aggregation::default();

        for ResolvedUnit { unit, target } in units {
            let url = target.0;
            let html = self.fetcher.fetch(&url).await?;
            self.progress.inc(1);

            let page = match parse_results(&html) {
                Ok(page) => page,
                Err(e) => {
                    self.log.error(
                        "unit_skipped",
                        &[("code", &unit.code), ("url", &url), ("reason", &e)],
                    );
                    out.skipped += 1;
                    continue;
                }
            };

            for row in &page.incomplete_rows {
                self.log.info(
                    "party_row_incomplete",
                    &[("code", &unit.code), ("table", &row.table), ("row", &row.row)],
                );
            }

            let mut record = VoteRecord::new(unit, page.registered, page.envelopes, page.valid_votes);
            for (party, votes) in page.parties {
                record.push_party(party, votes);
            }
            out.records.push(record);
        }

        self.progress.finish_and_clear();
        self.log.info(
            "aggregation_finished",
            &[("records", &out.records.len()), ("skipped", &out.skipped)],
        );
        Ok(out)
    }
}
