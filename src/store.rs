use crate::analyzer;
use crate::analyzer::range::RangeRequest;
use crate::analyzer::report::AggregatedReport;
use crate::dataset::HistoricalReport;
use crate::source::LoadError;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::debug;

/// Distinct ranges kept per snapshot before the oldest is evicted.
pub const SUMMARY_CACHE_CAPACITY: usize = 32;

/// Immutable snapshot of one fetched document plus summaries already
/// computed from it. A new fetch builds a new store, so the cache never
/// outlives its data.
#[derive(Debug)]
pub struct ReportStore {
    raw: HistoricalReport,
    summaries: Mutex<SummaryCache>,
}

#[derive(Debug, Default)]
struct SummaryCache {
    entries: HashMap<RangeRequest, Arc<AggregatedReport>>,
    order: VecDeque<RangeRequest>,
}

impl SummaryCache {
    fn insert(&mut self, request: RangeRequest, summary: Arc<AggregatedReport>) {
        if self.entries.insert(request, summary).is_some() {
            return;
        }

        self.order.push_back(request);
        while self.order.len() > SUMMARY_CACHE_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                debug!(time_frame = %oldest.frame, "summary cache evicted oldest range");
            }
        }
    }
}

impl ReportStore {
    pub fn new(raw: HistoricalReport) -> Self {
        Self {
            raw,
            summaries: Mutex::new(SummaryCache::default()),
        }
    }

    pub fn raw(&self) -> &HistoricalReport {
        &self.raw
    }

    /// Aggregation runs without holding the cache lock; when two callers
    /// race on one range the first insert wins and both get that value.
    pub fn summary(&self, request: &RangeRequest) -> Arc<AggregatedReport> {
        if let Some(summary) = self.cache().entries.get(request) {
            debug!(time_frame = %request.frame, "summary cache hit");
            return Arc::clone(summary);
        }

        debug!(time_frame = %request.frame, "summary cache miss");
        let computed = Arc::new(analyzer::summarize(&self.raw, request));

        let mut cache = self.cache();
        if let Some(existing) = cache.entries.get(request) {
            return Arc::clone(existing);
        }
        cache.insert(*request, Arc::clone(&computed));
        computed
    }

    pub fn cached_summaries(&self) -> usize {
        self.cache().entries.len()
    }

    fn cache(&self) -> MutexGuard<'_, SummaryCache> {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub enum LoadState {
    Loaded(Arc<ReportStore>),
    /// Terminal until an explicit refresh; no partial data is kept.
    Failed { kind: &'static str, message: String },
}

/// The session's current load state, shared between request handlers.
#[derive(Debug)]
pub struct SharedStore {
    state: RwLock<LoadState>,
}

impl SharedStore {
    pub fn new(initial: Result<HistoricalReport, LoadError>) -> Self {
        Self {
            state: RwLock::new(state_from(initial)),
        }
    }

    /// Replaces the snapshot wholesale with the outcome of a fresh fetch.
    pub fn replace(&self, outcome: Result<HistoricalReport, LoadError>) -> LoadState {
        let next = state_from(outcome);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = next.clone();
        next
    }

    pub fn current(&self) -> LoadState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn state_from(outcome: Result<HistoricalReport, LoadError>) -> LoadState {
    match outcome {
        Ok(raw) => LoadState::Loaded(Arc::new(ReportStore::new(raw))),
        Err(error) => LoadState::Failed {
            kind: error.kind(),
            message: error.user_message().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadState, ReportStore, SUMMARY_CACHE_CAPACITY, SharedStore};
    use crate::analyzer::range::{RangeRequest, TimeFrame, parse_date};
    use crate::dataset::{CustomerWin, HistoricalReport};
    use crate::source::parse_document;
    use chrono::{Duration, Weekday};
    use std::sync::Arc;

    fn request(frame: TimeFrame) -> RangeRequest {
        RangeRequest::new(frame, parse_date("2026-10-19").expect("today"), Weekday::Sun)
    }

    fn document_with_win(date: &str) -> HistoricalReport {
        HistoricalReport {
            customer_wins: vec![CustomerWin {
                date: date.to_string(),
                ..CustomerWin::default()
            }],
            ..HistoricalReport::default()
        }
    }

    #[test]
    fn identical_requests_reuse_cached_summary() {
        let store = ReportStore::new(HistoricalReport::default());

        let first = store.summary(&request(TimeFrame::ThisWeek));
        let second = store.summary(&request(TimeFrame::ThisWeek));
        let other = store.summary(&request(TimeFrame::LastWeek));

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(store.cached_summaries(), 2);
    }

    #[test]
    fn cache_evicts_oldest_range_past_capacity() {
        let store = ReportStore::new(HistoricalReport::default());
        let today = parse_date("2026-10-19").expect("today");
        let first_day = parse_date("2025-01-01").expect("first day");
        let custom = |offset: i64| {
            let start = first_day + Duration::days(offset);
            RangeRequest::custom(Some(start), Some(start), today, Weekday::Sun)
        };

        let oldest = store.summary(&custom(0));
        for offset in 1..500 {
            store.summary(&custom(offset));
        }

        assert_eq!(store.cached_summaries(), SUMMARY_CACHE_CAPACITY);

        let newest = store.summary(&custom(499));
        let recomputed = store.summary(&custom(0));
        assert_eq!(store.cached_summaries(), SUMMARY_CACHE_CAPACITY);
        assert!(Arc::ptr_eq(&newest, &store.summary(&custom(499))));
        assert!(!Arc::ptr_eq(&oldest, &recomputed));
        assert_eq!(oldest.period, recomputed.period);
    }

    #[test]
    fn concurrent_callers_share_one_cached_summary() {
        let store = ReportStore::new(document_with_win("2026-10-19"));
        let request = request(TimeFrame::ThisWeek);

        let results = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(|| store.summary(&request)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("worker"))
                .collect::<Vec<_>>()
        });

        let cached = store.summary(&request);
        assert_eq!(store.cached_summaries(), 1);
        assert!(results.iter().all(|summary| Arc::ptr_eq(summary, &cached)));
    }

    #[test]
    fn replacing_snapshot_discards_cached_summaries() {
        let shared = SharedStore::new(Ok(document_with_win("2026-10-19")));
        let LoadState::Loaded(before) = shared.current() else {
            panic!("expected loaded state");
        };
        assert_eq!(before.summary(&request(TimeFrame::ThisWeek)).customer_wins.len(), 1);

        shared.replace(Ok(HistoricalReport::default()));
        let LoadState::Loaded(after) = shared.current() else {
            panic!("expected loaded state");
        };

        assert_eq!(after.cached_summaries(), 0);
        assert!(after.summary(&request(TimeFrame::ThisWeek)).customer_wins.is_empty());
    }

    #[test]
    fn failed_refresh_drops_previous_data() {
        let shared = SharedStore::new(Ok(HistoricalReport::default()));

        let state = shared.replace(parse_document("inline", "<html>"));

        match state {
            LoadState::Failed { kind, message } => {
                assert_eq!(kind, "malformed_input");
                assert_eq!(message, "Failed to load report data");
            }
            LoadState::Loaded(_) => panic!("expected failed state"),
        }
        assert!(matches!(shared.current(), LoadState::Failed { .. }));
    }
}
