//! End-of-day summary across sites.

use std::fmt::Write as _;

use chrono::NaiveDate;

use super::site::Site;
use super::truck::{Truck, TruckStatus, average};

/// Longest SMS digest body.
pub const DIGEST_SMS_LIMIT: usize = 1500;

/// Figures for one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteDigest {
    /// Site code.
    pub code: String,
    /// Site name.
    pub name: String,
    /// Trucks currently en route.
    pub en_route: usize,
    /// Trucks currently arrived.
    pub arrived: usize,
    /// Trucks currently loading.
    pub loading: usize,
    /// Trucks departed.
    pub departed: usize,
    /// Mean arrival-to-loading minutes.
    pub avg_wait: Option<f64>,
    /// Mean arrival-to-departure minutes.
    pub avg_total: Option<f64>,
}

impl SiteDigest {
    /// Summarise one site's trucks for the day.
    #[must_use]
    pub fn build(site: &Site, trucks: &[Truck]) -> Self {
        let count = |status: TruckStatus| trucks.iter().filter(|t| t.status == status).count();
        let waits: Vec<f64> = trucks.iter().filter_map(Truck::wait_minutes).collect();
        let totals: Vec<f64> = trucks.iter().filter_map(Truck::total_minutes).collect();
        Self {
            code: site.code.to_string(),
            name: site.name.clone(),
            en_route: count(TruckStatus::EnRoute),
            arrived: count(TruckStatus::Arrived),
            loading: count(TruckStatus::Loading),
            departed: count(TruckStatus::Departed),
            avg_wait: average(&waits),
            avg_total: average(&totals),
        }
    }
}

fn format_average(value: Option<f64>) -> String {
    value.map_or_else(|| "\u{2014}".to_owned(), |minutes| format!("{minutes:.1}"))
}

/// The digest for one local date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyDigest {
    /// Local date summarised.
    pub date: NaiveDate,
    /// Per-site figures, ordered by site id.
    pub sites: Vec<SiteDigest>,
}

impl DailyDigest {
    /// Email subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("Daily Digest \u{2014} {}", self.date)
    }

    /// HTML body for email.
    #[must_use]
    pub fn html(&self) -> String {
        let mut html = format!("<div><h2>{}</h2>", self.subject());
        for site in &self.sites {
            // Writing into a String cannot fail.
            let _ = write!(
                html,
                "<h3>{code} \u{2014} {name}</h3><ul>\
                 <li>En Route: {en_route}</li>\
                 <li>Arrived: {arrived}</li>\
                 <li>Loading: {loading}</li>\
                 <li>Departed: {departed}</li>\
                 <li>Avg Wait (Arrived\u{2192}Loading): {wait} min</li>\
                 <li>Avg Total (Arrived\u{2192}Departed): {total} min</li>\
                 </ul>",
                code = site.code,
                name = site.name,
                en_route = site.en_route,
                arrived = site.arrived,
                loading = site.loading,
                departed = site.departed,
                wait = format_average(site.avg_wait),
                total = format_average(site.avg_total),
            );
        }
        html.push_str("</div>");
        html
    }

    /// Plain-text SMS body, capped at [`DIGEST_SMS_LIMIT`] characters.
    #[must_use]
    pub fn sms_text(&self) -> String {
        let text = strip_tags(&self.html());
        format!("Daily Digest {}: {text}", self.date)
            .chars()
            .take(DIGEST_SMS_LIMIT)
            .collect()
    }
}

/// Replace tags with spaces and collapse whitespace runs.
fn strip_tags(html: &str) -> String {
    let mut spaced = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                spaced.push(' ');
            }
            _ if in_tag => {}
            other => spaced.push(other),
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::phone::PhoneNumber;
    use crate::domain::site::{SiteCode, SiteId};
    use crate::domain::truck::{LineType, NewTruck, QueueCode, TruckId};
    use chrono::{Duration, TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn site() -> Site {
        Site {
            id: SiteId::new(100),
            code: SiteCode::new("CIF").expect("valid code"),
            name: "Cargill Iowa Falls".to_owned(),
            min_interval_minutes: 5,
        }
    }

    fn truck(id: i64, status: TruckStatus) -> Truck {
        let created_at = Utc
            .with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
            .single()
            .expect("valid time");
        Truck::from_new(
            TruckId::new(id),
            NewTruck {
                site_id: SiteId::new(100),
                checkin_date: created_at.date_naive(),
                phone: PhoneNumber::from_stored("+15155550142"),
                line_type: LineType::Load,
                status,
                queue_code: QueueCode::parse("0421").expect("valid code"),
                created_at,
            },
        )
    }

    #[rstest]
    fn site_digest_counts_current_statuses(site: Site) {
        let mut served = truck(1, TruckStatus::Arrived);
        let arrived = served.created_at;
        served.transition_to(TruckStatus::Loading, arrived + Duration::minutes(12));
        served.transition_to(TruckStatus::Departed, arrived + Duration::minutes(47));
        let trucks = [
            served,
            truck(2, TruckStatus::EnRoute),
            truck(3, TruckStatus::Arrived),
        ];

        let digest = SiteDigest::build(&site, &trucks);

        assert_eq!(
            (digest.en_route, digest.arrived, digest.loading, digest.departed),
            (1, 1, 0, 1)
        );
        assert_eq!(digest.avg_wait, Some(12.0));
        assert_eq!(digest.avg_total, Some(47.0));
    }

    #[rstest]
    fn empty_day_renders_dashes(site: Site) {
        let digest = DailyDigest {
            date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
            sites: vec![SiteDigest::build(&site, &[])],
        };
        let text = digest.sms_text();
        assert!(text.starts_with("Daily Digest 2026-03-02: Daily Digest \u{2014} 2026-03-02 CIF"));
        assert!(text.contains("Avg Wait (Arrived\u{2192}Loading): \u{2014} min"));
        assert!(!text.contains('<'));
        assert_eq!(digest.subject(), "Daily Digest \u{2014} 2026-03-02");
    }

    #[rstest]
    fn sms_text_is_capped(site: Site) {
        let digest = DailyDigest {
            date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
            sites: vec![SiteDigest::build(&site, &[]); 40],
        };
        assert_eq!(digest.sms_text().chars().count(), DIGEST_SMS_LIMIT);
    }
}
