//! Customer roster retrieval.
//!
//! The roster is fetched fresh for every request by following the remote
//! cursor page by page. [`CustomerRepository::stream`] is the only way to
//! walk it, and it enforces the `max_total` ceiling itself, so a source that
//! never reports its last page still terminates. The ceiling counts every
//! node the source sent, including ones later dropped as duplicates or for
//! lacking an email, and page requests are capped at
//! `max_total.div_ceil(page_size)` so empty pages cannot spin forever.
//!
//! A failed page aborts the whole roster: [`CustomerRepository::fetch_all`]
//! never returns the pages that arrived before the failure.

mod assignment;

pub use assignment::{AssignmentResolver, search};

use std::collections::HashSet;
use std::future::Future;

use futures::{Stream, TryStreamExt};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use rep_portal_core::CustomerRecord;

use crate::config::{DEFAULT_MAX_TOTAL, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, RosterConfig};

/// Errors that abort a roster fetch.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The remote source failed to deliver a page.
    #[error("Roster page {page} failed: {source}")]
    Source {
        /// 1-based page number.
        page: usize,
        /// Underlying source error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A page arrived without usable pagination metadata.
    #[error("Roster page {page} is malformed: {reason}")]
    MalformedPage {
        /// 1-based page number.
        page: usize,
        /// What was wrong with the page.
        reason: String,
    },

    /// Page size or ceiling out of range.
    #[error("Invalid roster limits: page_size={page_size}, max_total={max_total}")]
    InvalidLimits {
        /// Requested page size.
        page_size: u32,
        /// Requested ceiling.
        max_total: usize,
    },
}

/// Opaque continuation token issued by the remote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(String);

impl PageCursor {
    /// Wrap a server-issued cursor.
    #[must_use]
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    /// Cursor as sent back to the source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pagination metadata reported with every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether the source has more records after this page.
    pub has_next_page: bool,
    /// Cursor of the last record on this page.
    pub end_cursor: Option<PageCursor>,
}

/// One page of customers from the remote source.
#[derive(Debug, Clone, Default)]
pub struct CustomerPage {
    /// Records in source order.
    pub customers: Vec<CustomerRecord>,
    /// Nodes the source sent, before any were dropped during conversion.
    pub received: usize,
    /// Pagination metadata.
    pub page_info: PageInfo,
}

impl CustomerPage {
    /// Page whose every node converted to a record.
    #[must_use]
    pub fn new(customers: Vec<CustomerRecord>, page_info: PageInfo) -> Self {
        Self {
            received: customers.len(),
            customers,
            page_info,
        }
    }

    /// Cursor to request the following page with, or `None` on the last page.
    fn next_cursor(&self) -> Result<Option<PageCursor>, String> {
        if !self.page_info.has_next_page {
            return Ok(None);
        }
        match &self.page_info.end_cursor {
            Some(cursor) if !cursor.as_str().is_empty() => Ok(Some(cursor.clone())),
            _ => Err("hasNextPage is true but endCursor is missing".to_string()),
        }
    }
}

/// A remote, cursor-paginated customer source.
pub trait CustomerPageSource: Send + Sync {
    /// Error returned when a page cannot be fetched.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch up to `first` customers after `after` (`None` = start of roster).
    fn fetch_page(
        &self,
        first: u32,
        after: Option<&PageCursor>,
    ) -> impl Future<Output = Result<CustomerPage, Self::Error>> + Send;
}

/// Validated page size and ceiling for a roster fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterLimits {
    page_size: u32,
    max_total: usize,
}

impl RosterLimits {
    /// Build limits, rejecting a page size outside `1..=250` or a zero ceiling.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::InvalidLimits` if either value is out of range.
    pub const fn new(page_size: u32, max_total: usize) -> Result<Self, RosterError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE || max_total == 0 {
            return Err(RosterError::InvalidLimits {
                page_size,
                max_total,
            });
        }
        Ok(Self {
            page_size,
            max_total,
        })
    }

    /// Customers requested per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Maximum customers yielded, and maximum nodes accepted from the source.
    #[must_use]
    pub const fn max_total(&self) -> usize {
        self.max_total
    }

    /// Most page requests a single fetch may issue.
    #[must_use]
    pub const fn max_pages(&self) -> usize {
        self.max_total.div_ceil(self.page_size as usize)
    }
}

impl Default for RosterLimits {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_total: DEFAULT_MAX_TOTAL,
        }
    }
}

impl TryFrom<&RosterConfig> for RosterLimits {
    type Error = RosterError;

    fn try_from(config: &RosterConfig) -> Result<Self, Self::Error> {
        Self::new(config.page_size, config.max_total)
    }
}

/// Fetches the complete customer roster from a paginated source.
#[derive(Debug, Clone)]
pub struct CustomerRepository<S> {
    source: S,
    limits: RosterLimits,
}

impl<S: CustomerPageSource> CustomerRepository<S> {
    /// Create a repository over `source`.
    pub const fn new(source: S, limits: RosterLimits) -> Self {
        Self { source, limits }
    }

    /// Limits applied to every fetch.
    pub const fn limits(&self) -> RosterLimits {
        self.limits
    }

    /// Lazily walk the roster, one page request at a time.
    ///
    /// Yields customers in source order. Stops when the source reports no
    /// further pages, `max_total` nodes have been received, or
    /// [`RosterLimits::max_pages`] requests have been made, whichever comes
    /// first; the output is truncated to `max_total`. A customer whose email
    /// already appeared is skipped. The first error ends the stream.
    pub fn stream(&self) -> impl Stream<Item = Result<CustomerRecord, RosterError>> + Send + '_ {
        let limits = self.limits;

        async_stream::try_stream! {
            let mut cursor: Option<PageCursor> = None;
            let mut seen = HashSet::new();
            let mut yielded = 0_usize;
            let mut received = 0_usize;
            let mut page = 0_usize;

            loop {
                page += 1;
                let batch = self
                    .source
                    .fetch_page(limits.page_size, cursor.as_ref())
                    .await
                    .map_err(|e| RosterError::Source {
                        page,
                        source: Box::new(e),
                    })?;
                let next = batch
                    .next_cursor()
                    .map_err(|reason| RosterError::MalformedPage { page, reason })?;

                received = received.saturating_add(batch.received.max(batch.customers.len()));
                debug!(page, received = batch.received, kept = batch.customers.len(), "Roster page fetched");

                for customer in batch.customers {
                    if yielded >= limits.max_total {
                        break;
                    }
                    if !seen.insert(customer.email.normalized()) {
                        warn!(page, "Skipping duplicate customer email in roster");
                        continue;
                    }
                    yielded += 1;
                    yield customer;
                }

                match next {
                    Some(next)
                        if yielded < limits.max_total
                            && received < limits.max_total
                            && page < limits.max_pages() =>
                    {
                        cursor = Some(next);
                    }
                    Some(_) => {
                        warn!(
                            max_total = limits.max_total,
                            received,
                            pages = page,
                            "Roster ceiling reached before last page"
                        );
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    /// Fetch the whole roster.
    ///
    /// # Errors
    ///
    /// Returns the first `RosterError` hit while paging; customers fetched
    /// before the failure are discarded.
    #[instrument(skip(self), fields(page_size = self.limits.page_size, max_total = self.limits.max_total))]
    pub async fn fetch_all(&self) -> Result<Vec<CustomerRecord>, RosterError> {
        let customers: Vec<CustomerRecord> = self.stream().try_collect().await?;
        info!(count = customers.len(), "Roster fetched");
        Ok(customers)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rep_portal_core::Email;

    use super::*;

    #[derive(Debug, Error)]
    #[error("upstream unavailable")]
    struct FakeError;

    /// Serves fixed pages, with cursors `"page-N"`.
    struct FakeSource {
        pages: Vec<Vec<CustomerRecord>>,
        fail_on_page: Option<usize>,
        omit_cursor: bool,
        endless: bool,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_page_sizes(sizes: &[usize]) -> Self {
            let mut n = 0;
            let pages = sizes
                .iter()
                .map(|&size| {
                    (0..size)
                        .map(|_| {
                            n += 1;
                            customer(&format!("customer{n}@shop.example"))
                        })
                        .collect()
                })
                .collect();
            Self {
                pages,
                fail_on_page: None,
                omit_cursor: false,
                endless: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CustomerPageSource for FakeSource {
        type Error = FakeError;

        async fn fetch_page(
            &self,
            first: u32,
            after: Option<&PageCursor>,
        ) -> Result<CustomerPage, FakeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let index = after.map_or(0, |c| {
                c.as_str().trim_start_matches("page-").parse::<usize>().unwrap()
            });
            if self.fail_on_page == Some(index + 1) {
                return Err(FakeError);
            }

            let page_index = if self.endless { 0 } else { index };
            let customers: Vec<_> = self.pages[page_index]
                .iter()
                .take(first as usize)
                .cloned()
                .map(|c| {
                    if self.endless {
                        customer(&format!("p{index}-{}", c.email))
                    } else {
                        c
                    }
                })
                .collect();
            let has_next_page = self.endless || index + 1 < self.pages.len();

            Ok(CustomerPage::new(
                customers,
                PageInfo {
                    has_next_page,
                    end_cursor: if self.omit_cursor {
                        None
                    } else {
                        Some(PageCursor::new(format!("page-{}", index + 1)))
                    },
                },
            ))
        }
    }

    /// Always reports another page, serving the same `customers` each time.
    struct RepeatingSource {
        customers: Vec<CustomerRecord>,
        calls: AtomicUsize,
    }

    impl RepeatingSource {
        fn new(customers: Vec<CustomerRecord>) -> Self {
            Self {
                customers,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CustomerPageSource for RepeatingSource {
        type Error = FakeError;

        async fn fetch_page(
            &self,
            _first: u32,
            _after: Option<&PageCursor>,
        ) -> Result<CustomerPage, FakeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CustomerPage::new(
                self.customers.clone(),
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(PageCursor::new(format!("page-{call}"))),
                },
            ))
        }
    }

    async fn fetch_bounded<S: CustomerPageSource>(
        repo: &CustomerRepository<S>,
    ) -> Vec<CustomerRecord> {
        tokio::time::timeout(std::time::Duration::from_secs(2), repo.fetch_all())
            .await
            .expect("roster fetch must terminate")
            .unwrap()
    }

    fn customer(email: &str) -> CustomerRecord {
        CustomerRecord::new(Email::parse(email).unwrap())
    }

    fn limits(page_size: u32, max_total: usize) -> RosterLimits {
        RosterLimits::new(page_size, max_total).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_all_follows_every_page_in_order() {
        let repo = CustomerRepository::new(FakeSource::with_page_sizes(&[100, 100, 37]), limits(100, 1000));
        let customers = repo.fetch_all().await.unwrap();

        assert_eq!(customers.len(), 237);
        assert_eq!(customers[0].email.as_str(), "customer1@shop.example");
        assert_eq!(customers[236].email.as_str(), "customer237@shop.example");
        assert_eq!(repo.source.calls(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_stops_at_ceiling() {
        let repo = CustomerRepository::new(FakeSource::with_page_sizes(&[100, 100, 37]), limits(100, 150));
        let customers = repo.fetch_all().await.unwrap();

        assert_eq!(customers.len(), 150);
        assert_eq!(customers[149].email.as_str(), "customer150@shop.example");
        assert_eq!(repo.source.calls(), 2, "third page must not be requested");
    }

    #[tokio::test]
    async fn test_ceiling_on_page_boundary_skips_next_request() {
        let repo = CustomerRepository::new(FakeSource::with_page_sizes(&[100, 100, 37]), limits(100, 100));
        let customers = repo.fetch_all().await.unwrap();

        assert_eq!(customers.len(), 100);
        assert_eq!(repo.source.calls(), 1);
    }

    #[tokio::test]
    async fn test_endless_source_terminates() {
        let mut source = FakeSource::with_page_sizes(&[10]);
        source.endless = true;
        let repo = CustomerRepository::new(source, limits(10, 55));
        let customers = repo.fetch_all().await.unwrap();

        assert_eq!(customers.len(), 55);
        assert_eq!(repo.source.calls(), 6);
    }

    #[tokio::test]
    async fn test_endless_repeated_email_terminates() {
        let repo = CustomerRepository::new(
            RepeatingSource::new(vec![customer("same@shop.example")]),
            limits(100, 10),
        );
        let customers = fetch_bounded(&repo).await;

        assert_eq!(customers.len(), 1);
        assert_eq!(repo.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_endless_duplicate_pages_stop_at_received_ceiling() {
        let page: Vec<_> = (1..=5)
            .map(|n| customer(&format!("customer{n}@shop.example")))
            .collect();
        let repo = CustomerRepository::new(RepeatingSource::new(page), limits(5, 20));
        let customers = fetch_bounded(&repo).await;

        assert_eq!(customers.len(), 5);
        assert_eq!(repo.source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_endless_empty_pages_terminate() {
        let repo = CustomerRepository::new(RepeatingSource::new(Vec::new()), limits(5, 20));
        let customers = fetch_bounded(&repo).await;

        assert!(customers.is_empty());
        assert_eq!(repo.source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_error_on_second_page_fails_whole_roster() {
        let mut source = FakeSource::with_page_sizes(&[100, 100, 37]);
        source.fail_on_page = Some(2);
        let repo = CustomerRepository::new(source, limits(100, 1000));

        let err = repo.fetch_all().await.unwrap_err();
        assert!(matches!(err, RosterError::Source { page: 2, .. }));
        assert_eq!(repo.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_cursor_is_malformed() {
        let mut source = FakeSource::with_page_sizes(&[5, 5]);
        source.omit_cursor = true;
        let repo = CustomerRepository::new(source, limits(5, 1000));

        let err = repo.fetch_all().await.unwrap_err();
        assert!(matches!(err, RosterError::MalformedPage { page: 1, .. }));
    }

    #[tokio::test]
    async fn test_last_page_without_cursor_is_fine() {
        let mut source = FakeSource::with_page_sizes(&[3]);
        source.omit_cursor = true;
        let repo = CustomerRepository::new(source, limits(5, 1000));

        assert_eq!(repo.fetch_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_emails_are_skipped() {
        let mut source = FakeSource::with_page_sizes(&[2, 1]);
        source.pages[1] = vec![customer("CUSTOMER1@shop.example")];
        let repo = CustomerRepository::new(source, limits(2, 1000));

        let customers = repo.fetch_all().await.unwrap();
        assert_eq!(customers.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_roster() {
        let repo = CustomerRepository::new(FakeSource::with_page_sizes(&[0]), RosterLimits::default());
        assert!(repo.fetch_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_limits_validation() {
        assert!(RosterLimits::new(0, 10).is_err());
        assert!(RosterLimits::new(251, 10).is_err());
        assert!(RosterLimits::new(100, 0).is_err());
        assert!(RosterLimits::new(250, 1).is_ok());

        let defaults = RosterLimits::default();
        assert_eq!(defaults.page_size(), 100);
        assert_eq!(defaults.max_total(), 1000);
        assert_eq!(defaults.max_pages(), 10);
        assert_eq!(limits(100, 150).max_pages(), 2);
        assert_eq!(limits(250, 1).max_pages(), 1);
    }

    #[test]
    fn test_roster_error_display() {
        let err = RosterError::MalformedPage {
            page: 3,
            reason: "no cursor".to_string(),
        };
        assert_eq!(err.to_string(), "Roster page 3 is malformed: no cursor");
    }
}
