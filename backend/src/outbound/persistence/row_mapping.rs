//! Conversions between Diesel rows and domain values.
//!
//! Failures are returned as plain messages; each repository wraps them in its
//! own `Query` variant.

use crate::domain::{
    BookingDetails, DaySettings, LineType, ManageToken, PhoneNumber, QueueCode, Reservation,
    ReservationId, Site, SiteCode, SiteId, Slot, SlotColumns, SlotKey, SlotState, SlotTime, Truck,
    TruckId, TruckStatus,
};

use super::models::{
    NewTruckRow, ReservationRow, SiteRow, SiteSettingsRow, SlotOccupancyUpdate, TimeSlotRow,
    TruckRow, TruckUpdate,
};

/// Minutes-after-midnight column value.
pub(crate) fn minute_column(time: SlotTime) -> i32 {
    time.minutes() as i32
}

pub(crate) fn slot_time_from_column(value: i32) -> Result<SlotTime, String> {
    u32::try_from(value)
        .map_err(|_| format!("negative slot time {value}"))
        .and_then(|minutes| SlotTime::from_minutes(minutes).map_err(|err| err.to_string()))
}

fn unsigned(value: i32, column: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("negative {column} {value}"))
}

pub(crate) fn site_from_row(row: SiteRow) -> Result<Site, String> {
    Ok(Site {
        id: SiteId::new(row.id),
        code: SiteCode::new(&row.code).map_err(|err| err.to_string())?,
        name: row.name,
        min_interval_minutes: unsigned(row.min_interval_minutes, "min_interval_minutes")?,
    })
}

pub(crate) fn site_to_row(site: &Site) -> SiteRow {
    SiteRow {
        id: site.id.get(),
        code: site.code.as_str().to_owned(),
        name: site.name.clone(),
        min_interval_minutes: site.min_interval_minutes as i32,
    }
}

pub(crate) fn day_settings_from_row(row: SiteSettingsRow) -> Result<DaySettings, String> {
    Ok(DaySettings {
        site_id: SiteId::new(row.site_id),
        date: row.date,
        loads_target: unsigned(row.loads_target, "loads_target")?,
        open_time: slot_time_from_column(row.open_time)?,
        close_time: slot_time_from_column(row.close_time)?,
        workins_per_hour: unsigned(row.workins_per_hour, "workins_per_hour")?,
        paused: row.paused,
    })
}

pub(crate) fn day_settings_to_row(settings: &DaySettings) -> SiteSettingsRow {
    SiteSettingsRow {
        site_id: settings.site_id.get(),
        date: settings.date,
        loads_target: settings.loads_target as i32,
        open_time: minute_column(settings.open_time),
        close_time: minute_column(settings.close_time),
        workins_per_hour: settings.workins_per_hour as i32,
        paused: settings.paused,
    }
}

pub(crate) fn slot_state_from_row(row: &TimeSlotRow) -> Result<SlotState, String> {
    SlotState::from_columns(SlotColumns {
        reservation_id: row.reserved_truck_id,
        reserved_at: row.reserved_at,
        hold_token: row.hold_token,
        hold_expires_at: row.hold_expires_at,
    })
    .map_err(|err| format!("slot {}: {err}", row.id))
}

/// Changeset writing every occupancy column of `state`.
pub(crate) fn occupancy_update(state: SlotState) -> SlotOccupancyUpdate {
    let columns = state.to_columns();
    SlotOccupancyUpdate {
        reserved_truck_id: columns.reservation_id,
        reserved_at: columns.reserved_at,
        hold_token: columns.hold_token,
        hold_expires_at: columns.hold_expires_at,
    }
}

pub(crate) fn slot_from_row(row: TimeSlotRow) -> Result<Slot, String> {
    let state = slot_state_from_row(&row)?;
    Ok(Slot {
        key: SlotKey {
            site_id: SiteId::new(row.site_id),
            date: row.date,
            time: slot_time_from_column(row.slot_time)?,
        },
        is_workin: row.is_workin,
        state,
    })
}

pub(crate) fn reservation_from_row(row: ReservationRow) -> Result<Reservation, String> {
    Ok(Reservation {
        id: ReservationId::new(row.id),
        site_id: SiteId::new(row.site_id),
        date: row.date,
        slot_time: slot_time_from_column(row.slot_time)?,
        details: BookingDetails {
            license_plate: row.license_plate,
            driver_name: row.driver_name,
            driver_phone: row.driver_phone.map(PhoneNumber::from_stored),
            vendor_name: row.vendor_name,
            farm_or_ticket: row.farm_or_ticket,
            est_amount: row.est_amount,
            est_unit: row.est_unit,
        },
        manage_token: ManageToken::from_uuid(row.manage_token),
        created_at: row.created_at,
    })
}

pub(crate) fn truck_from_row(row: TruckRow) -> Result<Truck, String> {
    let status: TruckStatus = row.status.parse().map_err(|err| format!("{err}"))?;
    let line_type: LineType = row.line_type.parse().map_err(|err| format!("{err}"))?;
    let eta_minutes = row
        .eta_minutes
        .map(|minutes| unsigned(minutes, "eta_minutes"))
        .transpose()?;
    let queue_code = row
        .queue_code
        .as_deref()
        .map(QueueCode::parse)
        .transpose()
        .map_err(|err| err.to_string())?;
    Ok(Truck {
        id: TruckId::new(row.id),
        site_id: SiteId::new(row.site_id),
        checkin_date: row.checkin_date,
        phone: PhoneNumber::from_stored(row.phone),
        status,
        line_type,
        queue_code,
        created_at: row.created_at,
        enroute_at: row.enroute_at,
        arrived_at: row.arrived_at,
        loading_at: row.loading_at,
        departed_at: row.departed_at,
        eta_minutes,
        eta_at: row.eta_at,
        eta_prompted_at: row.eta_prompted_at,
        product: row.product,
        load_number: row.load_number,
        bill_of_lading: row.bill_of_lading,
    })
}

pub(crate) fn new_truck_row(truck: &Truck) -> NewTruckRow<'_> {
    NewTruckRow {
        site_id: truck.site_id.get(),
        checkin_date: truck.checkin_date,
        phone: truck.phone.as_str(),
        status: truck.status.as_str(),
        line_type: truck.line_type.as_str(),
        queue_code: truck.queue_code.as_ref().map(QueueCode::as_str),
        created_at: truck.created_at,
        enroute_at: truck.enroute_at,
        arrived_at: truck.arrived_at,
        loading_at: truck.loading_at,
        departed_at: truck.departed_at,
    }
}

pub(crate) fn truck_update(truck: &Truck) -> TruckUpdate<'static> {
    TruckUpdate {
        status: truck.status.as_str(),
        enroute_at: truck.enroute_at,
        arrived_at: truck.arrived_at,
        loading_at: truck.loading_at,
        departed_at: truck.departed_at,
        eta_minutes: truck.eta_minutes.map(|minutes| minutes as i32),
        eta_at: truck.eta_at,
        eta_prompted_at: truck.eta_prompted_at,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversions.
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn slot_row() -> TimeSlotRow {
        TimeSlotRow {
            id: 1,
            site_id: 100,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("date"),
            slot_time: 420,
            is_workin: false,
            reserved_truck_id: None,
            reserved_at: None,
            hold_token: None,
            hold_expires_at: None,
        }
    }

    #[rstest]
    #[case(0, "00:00")]
    #[case(1439, "23:59")]
    fn slot_minutes_round_trip(#[case] column: i32, #[case] display: &str) {
        let time = slot_time_from_column(column).expect("valid");
        assert_eq!(time.to_string(), display);
        assert_eq!(minute_column(time), column);
    }

    #[rstest]
    #[case(-1)]
    #[case(1440)]
    fn invalid_slot_minutes_are_rejected(#[case] column: i32) {
        assert!(slot_time_from_column(column).is_err());
    }

    #[rstest]
    fn slot_row_with_hold_and_reservation_is_rejected() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).single().expect("time");
        let row = TimeSlotRow {
            reserved_truck_id: Some(5),
            reserved_at: Some(at),
            hold_token: Some(Uuid::new_v4()),
            hold_expires_at: Some(at),
            ..slot_row()
        };
        assert!(slot_from_row(row).is_err());
    }

    #[rstest]
    fn open_slot_row_maps_to_open_state() {
        let slot = slot_from_row(slot_row()).expect("valid row");
        assert_eq!(slot.state, SlotState::Open);
        assert_eq!(slot.key.time.to_string(), "07:00");
    }

    fn truck_row(status: &str, queue_code: Option<&str>) -> TruckRow {
        TruckRow {
            id: 1,
            site_id: 100,
            checkin_date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("date"),
            phone: "+15155550142".to_owned(),
            status: status.to_owned(),
            line_type: "LOAD".to_owned(),
            queue_code: queue_code.map(str::to_owned),
            created_at: Utc::now(),
            enroute_at: None,
            arrived_at: None,
            loading_at: None,
            departed_at: None,
            eta_minutes: None,
            eta_at: None,
            eta_prompted_at: None,
            product: None,
            load_number: None,
            bill_of_lading: None,
        }
    }

    #[rstest]
    fn unknown_truck_status_is_rejected() {
        assert!(truck_from_row(truck_row("PARKED", None)).is_err());
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("0042"), Some("0042"))]
    fn queue_code_column_is_optional(#[case] column: Option<&str>, #[case] expected: Option<&str>) {
        let truck = truck_from_row(truck_row("EN_ROUTE", column)).expect("valid row");
        assert_eq!(truck.queue_code.as_ref().map(QueueCode::as_str), expected);
    }

    #[rstest]
    fn malformed_queue_code_is_rejected() {
        assert!(truck_from_row(truck_row("EN_ROUTE", Some("42"))).is_err());
    }
}
