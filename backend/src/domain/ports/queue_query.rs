//! Driving port for truck queue views.

use async_trait::async_trait;

use chrono::NaiveDate;

use crate::domain::{
    Error, HistoryQuery, HistoryReport, LineType, PublicLine, PublicLines, QueueCode, SiteCode,
    TodayQueue, Truck,
};

/// Reads over the truck queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueQuery: Send + Sync {
    /// Staff list of today's trucks.
    async fn today_queue(&self, site: &SiteCode) -> Result<TodayQueue, Error>;

    /// Public view of one line today.
    async fn public_line(&self, site: &SiteCode, line: LineType) -> Result<PublicLine, Error>;

    /// Public view of both lines today.
    async fn public_lines(&self, site: &SiteCode) -> Result<PublicLines, Error>;

    /// Historical rows and averages.
    async fn history(&self, site: &SiteCode, query: HistoryQuery) -> Result<HistoryReport, Error>;

    /// Latest truck quoting `code` at the scale, on `date` or today.
    async fn verify_code(
        &self,
        site: &SiteCode,
        code: &QueueCode,
        date: Option<NaiveDate>,
    ) -> Result<Truck, Error>;
}

/// Fixture where every site is empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureQueueQuery;

#[async_trait]
impl QueueQuery for FixtureQueueQuery {
    async fn today_queue(&self, site: &SiteCode) -> Result<TodayQueue, Error> {
        Ok(TodayQueue {
            site: site.clone(),
            count: 0,
            trucks: Vec::new(),
        })
    }

    async fn public_line(&self, site: &SiteCode, line: LineType) -> Result<PublicLine, Error> {
        Ok(PublicLine {
            site: site.clone(),
            line_type: line,
            line: crate::domain::LineView::build(&[], line),
        })
    }

    async fn public_lines(&self, site: &SiteCode) -> Result<PublicLines, Error> {
        Ok(PublicLines::build(site.clone(), &[]))
    }

    async fn history(&self, site: &SiteCode, query: HistoryQuery) -> Result<HistoryReport, Error> {
        Ok(HistoryReport::build(site.clone(), query, Vec::new()))
    }

    async fn verify_code(
        &self,
        site: &SiteCode,
        code: &QueueCode,
        _date: Option<NaiveDate>,
    ) -> Result<Truck, Error> {
        Err(Error::not_found(format!("no truck with code {code} at {site}")))
    }
}
