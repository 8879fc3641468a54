//! Read models for the truck queue: public lines, staff lists, and history.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::site::SiteCode;
use super::truck::{LineType, ParseTruckFieldError, Truck, TruckId, TruckStatus, average};

/// A truck waiting in the physical line, phone masked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEntry {
    /// Truck identifier.
    pub id: TruckId,
    /// Masked phone.
    pub phone: String,
    /// Product carried.
    pub product: Option<String>,
    /// Load number.
    pub load_number: Option<String>,
    /// Bill of lading.
    pub bol: Option<String>,
    /// Arrival instant.
    pub arrived_at: Option<DateTime<Utc>>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// A truck still on the road, phone masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnRouteEntry {
    /// Truck identifier.
    pub id: TruckId,
    /// Masked phone.
    pub phone: String,
    /// Promised minutes.
    pub eta_minutes: Option<u32>,
    /// Promised instant.
    pub eta_at: Option<DateTime<Utc>>,
}

/// Public view of one line at a site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    /// Trucks on site ordered by arrival (creation time when not arrived).
    pub queued: Vec<QueuedEntry>,
    /// Number of trucks en route.
    pub en_route_count: usize,
    /// Trucks en route ordered by ETA, unknown ETAs last.
    pub en_route_eta: Vec<EnRouteEntry>,
}

impl LineView {
    /// Project today's trucks onto one line.
    #[must_use]
    pub fn build(trucks: &[Truck], line: LineType) -> Self {
        let mut waiting: Vec<&Truck> = trucks
            .iter()
            .filter(|t| t.line_type == line && t.status.is_in_line())
            .collect();
        waiting.sort_by(|a, b| {
            a.queue_anchor()
                .cmp(&b.queue_anchor())
                .then(a.id.cmp(&b.id))
        });

        let mut en_route: Vec<&Truck> = trucks
            .iter()
            .filter(|t| t.line_type == line && t.status == TruckStatus::EnRoute)
            .collect();
        en_route.sort_by(|a, b| eta_order(a.eta_at, b.eta_at).then(a.id.cmp(&b.id)));

        Self {
            queued: waiting
                .into_iter()
                .map(|t| QueuedEntry {
                    id: t.id,
                    phone: t.phone.masked(),
                    product: t.product.clone(),
                    load_number: t.load_number.clone(),
                    bol: t.bill_of_lading.clone(),
                    arrived_at: t.arrived_at,
                    created_at: t.created_at,
                })
                .collect(),
            en_route_count: en_route.len(),
            en_route_eta: en_route
                .into_iter()
                .map(|t| EnRouteEntry {
                    id: t.id,
                    phone: t.phone.masked(),
                    eta_minutes: t.eta_minutes,
                    eta_at: t.eta_at,
                })
                .collect(),
        }
    }
}

fn eta_order(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Public view of one line, tagged with the site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicLine {
    /// Site code.
    pub site: SiteCode,
    /// Line shown.
    pub line_type: LineType,
    /// Line contents.
    #[serde(flatten)]
    pub line: LineView,
}

/// Both lines at a site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicLines {
    /// Site code.
    pub site: SiteCode,
    /// Loading line.
    pub load: LineView,
    /// Delivery line.
    pub deliver: LineView,
    /// En-route trucks across both lines.
    pub total_en_route: usize,
}

impl PublicLines {
    /// Project today's trucks onto both lines.
    #[must_use]
    pub fn build(site: SiteCode, trucks: &[Truck]) -> Self {
        let load = LineView::build(trucks, LineType::Load);
        let deliver = LineView::build(trucks, LineType::Deliver);
        let total_en_route = load.en_route_count + deliver.en_route_count;
        Self {
            site,
            load,
            deliver,
            total_en_route,
        }
    }
}

/// Staff view of today's trucks at a site, unmasked, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayQueue {
    /// Site code.
    pub site: SiteCode,
    /// Number of trucks.
    pub count: usize,
    /// Trucks.
    pub trucks: Vec<Truck>,
}

/// Line filter for history queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    /// Every line.
    #[default]
    All,
    /// One line only.
    Line(LineType),
}

impl HistoryFilter {
    /// Line to filter by, if any.
    #[must_use]
    pub const fn line_type(self) -> Option<LineType> {
        match self {
            Self::All => None,
            Self::Line(line) => Some(line),
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Line(line) => line.fmt(f),
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = ParseTruckFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Line)
    }
}

/// Inclusive date range for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    /// First date included.
    pub start: NaiveDate,
    /// Last date included.
    pub end: NaiveDate,
    /// Line filter.
    pub filter: HistoryFilter,
}

/// One historical truck row with derived durations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    /// Truck identifier.
    pub id: TruckId,
    /// Operating date.
    pub checkin_date: NaiveDate,
    /// Driver phone.
    pub phone: String,
    /// Final status.
    pub status: TruckStatus,
    /// Line joined.
    pub line_type: LineType,
    /// Product carried.
    pub product: Option<String>,
    /// Load number.
    pub load_number: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Arrival instant.
    pub arrived_at: Option<DateTime<Utc>>,
    /// Loading start.
    pub loading_at: Option<DateTime<Utc>>,
    /// Departure instant.
    pub departed_at: Option<DateTime<Utc>>,
    /// Arrival to loading.
    pub wait_minutes: Option<f64>,
    /// Arrival to departure.
    pub total_minutes: Option<f64>,
}

/// Aggregates across history rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryAnalytics {
    /// Mean wait in minutes.
    pub avg_wait_min: Option<f64>,
    /// Mean total in minutes.
    pub avg_total_min: Option<f64>,
    /// Rows with a wait.
    pub n_waits: usize,
    /// Rows with a total.
    pub n_totals: usize,
}

/// History for a site and date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryReport {
    /// Site code.
    pub site: SiteCode,
    /// First date included.
    pub start: NaiveDate,
    /// Last date included.
    pub end: NaiveDate,
    /// Aggregates.
    pub analytics: HistoryAnalytics,
    /// Number of rows.
    pub count: usize,
    /// Rows ordered by date then id.
    pub rows: Vec<HistoryRow>,
}

impl HistoryReport {
    /// Derive durations and aggregates from stored trucks.
    #[must_use]
    pub fn build(site: SiteCode, query: HistoryQuery, mut trucks: Vec<Truck>) -> Self {
        trucks.sort_by(|a, b| a.checkin_date.cmp(&b.checkin_date).then(a.id.cmp(&b.id)));
        let rows: Vec<HistoryRow> = trucks
            .into_iter()
            .map(|t| HistoryRow {
                wait_minutes: t.wait_minutes(),
                total_minutes: t.total_minutes(),
                id: t.id,
                checkin_date: t.checkin_date,
                phone: t.phone.as_str().to_owned(),
                status: t.status,
                line_type: t.line_type,
                product: t.product,
                load_number: t.load_number,
                created_at: t.created_at,
                arrived_at: t.arrived_at,
                loading_at: t.loading_at,
                departed_at: t.departed_at,
            })
            .collect();
        let waits: Vec<f64> = rows.iter().filter_map(|r| r.wait_minutes).collect();
        let totals: Vec<f64> = rows.iter().filter_map(|r| r.total_minutes).collect();
        Self {
            site,
            start: query.start,
            end: query.end,
            analytics: HistoryAnalytics {
                avg_wait_min: average(&waits),
                avg_total_min: average(&totals),
                n_waits: waits.len(),
                n_totals: totals.len(),
            },
            count: rows.len(),
            rows,
        }
    }
}

#[cfg(test)]
#[path = "queue_view_tests.rs"]
mod tests;
