//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Receiving and shipping sites.
    sites (id) {
        id -> Int4,
        /// External code such as `CIF`.
        code -> Varchar,
        name -> Text,
        /// Floor for the regular slot interval.
        min_interval_minutes -> Int4,
    }
}

diesel::table! {
    /// Schedule inputs per site and date. Times are minutes after midnight.
    site_settings (site_id, date) {
        site_id -> Int4,
        date -> Date,
        loads_target -> Int4,
        open_time -> Int4,
        close_time -> Int4,
        workins_per_hour -> Int4,
        paused -> Bool,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookable slots. A row is open, held, or reserved, never both of the
    /// last two (enforced by `time_slots_single_state`).
    time_slots (id) {
        id -> Int8,
        site_id -> Int4,
        date -> Date,
        slot_time -> Int4,
        is_workin -> Bool,
        /// Owning reservation.
        reserved_truck_id -> Nullable<Int8>,
        reserved_at -> Nullable<Timestamptz>,
        hold_token -> Nullable<Uuid>,
        hold_expires_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Confirmed bookings. Deleted on cancellation.
    slot_reservations (id) {
        id -> Int8,
        site_id -> Int4,
        date -> Date,
        slot_time -> Int4,
        license_plate -> Nullable<Text>,
        driver_name -> Nullable<Text>,
        driver_phone -> Nullable<Text>,
        vendor_name -> Nullable<Text>,
        farm_or_ticket -> Nullable<Text>,
        est_amount -> Nullable<Float8>,
        est_unit -> Nullable<Text>,
        manage_token -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Queue entries. History accumulates; see `current_queue_entries`.
    trucks (id) {
        id -> Int8,
        site_id -> Int4,
        checkin_date -> Date,
        phone -> Text,
        status -> Text,
        line_type -> Text,
        queue_code -> Nullable<Text>,
        created_at -> Timestamptz,
        enroute_at -> Nullable<Timestamptz>,
        arrived_at -> Nullable<Timestamptz>,
        loading_at -> Nullable<Timestamptz>,
        departed_at -> Nullable<Timestamptz>,
        eta_minutes -> Nullable<Int4>,
        eta_at -> Nullable<Timestamptz>,
        eta_prompted_at -> Nullable<Timestamptz>,
        product -> Nullable<Text>,
        load_number -> Nullable<Text>,
        bill_of_lading -> Nullable<Text>,
    }
}

diesel::table! {
    /// The current truck row per site, date, and phone.
    current_queue_entries (site_id, checkin_date, phone) {
        site_id -> Int4,
        checkin_date -> Date,
        phone -> Text,
        truck_id -> Int8,
    }
}

diesel::table! {
    /// Alert ledger used for de-duplication.
    notifications (id) {
        id -> Int8,
        truck_id -> Int8,
        kind -> Text,
        message -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Dates whose daily digest has been claimed.
    digest_runs (digest_date) {
        digest_date -> Date,
        sent_at -> Timestamptz,
    }
}

diesel::table! {
    /// Phone accounts.
    users (phone) {
        phone -> Text,
        is_banned -> Bool,
        created_at -> Timestamptz,
        last_login_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Phones allowed to use staff endpoints.
    app_admins (phone) {
        phone -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One-time login codes, stored as SHA-256 digests.
    otp_codes (id) {
        id -> Int8,
        phone -> Text,
        code_hash -> Text,
        expires_at -> Timestamptz,
        attempts_left -> Int4,
        consumed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single-row facility contact record.
    facility_info (id) {
        id -> Int4,
        facility_phone -> Nullable<Text>,
        support_phone -> Nullable<Text>,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(site_settings -> sites (site_id));
diesel::joinable!(time_slots -> sites (site_id));
diesel::joinable!(slot_reservations -> sites (site_id));
diesel::joinable!(trucks -> sites (site_id));
diesel::joinable!(notifications -> trucks (truck_id));
diesel::joinable!(current_queue_entries -> trucks (truck_id));

diesel::allow_tables_to_appear_in_same_query!(
    sites,
    site_settings,
    time_slots,
    slot_reservations,
    trucks,
    current_queue_entries,
    notifications,
    digest_runs,
    users,
    app_admins,
    otp_codes,
    facility_info,
);
