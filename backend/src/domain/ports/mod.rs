//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`PhoneLogin`]) are what inbound
//! adapters call. Driven ports (`*Repository`, [`DigestLedger`], the
//! senders) are what outbound adapters implement. Each driven port exposes a
//! typed error so adapters map failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_repository;
mod digest_ledger;
mod email_sender;
mod facility_info_repository;
mod phone_login;
mod queue_command;
mod queue_query;
mod schedule_command;
mod schedule_query;
mod schedule_repository;
mod site_repository;
mod sms_sender;
mod truck_repository;

#[cfg(test)]
pub use auth_repository::MockAuthRepository;
pub use auth_repository::{AuthRepository, AuthRepositoryError};
#[cfg(test)]
pub use digest_ledger::MockDigestLedger;
pub use digest_ledger::{DigestLedger, DigestLedgerError, FixtureDigestLedger};
#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailMessage, EmailSender, EmailSenderError};
#[cfg(test)]
pub use facility_info_repository::MockFacilityInfoRepository;
pub use facility_info_repository::{
    FacilityInfoRepository, FacilityInfoRepositoryError, FixtureFacilityInfoRepository,
};
#[cfg(test)]
pub use phone_login::MockPhoneLogin;
pub use phone_login::{FixturePhoneLogin, PhoneLogin};
#[cfg(test)]
pub use queue_command::MockQueueCommand;
pub use queue_command::{EnRouteRequest, FixtureQueueCommand, InboundSms, QueueCommand};
#[cfg(test)]
pub use queue_query::MockQueueQuery;
pub use queue_query::{FixtureQueueQuery, QueueQuery};
#[cfg(test)]
pub use schedule_command::MockScheduleCommand;
pub use schedule_command::{
    ConfigureDayRequest, DayConfigured, FixtureScheduleCommand, MassCancelOutcome,
    ScheduleCommand,
};
#[cfg(test)]
pub use schedule_query::MockScheduleQuery;
pub use schedule_query::{FixtureScheduleQuery, OpenSlot, OpenSlots, ScheduleQuery};
#[cfg(test)]
pub use schedule_repository::MockScheduleRepository;
pub use schedule_repository::{ScheduleRepository, ScheduleRepositoryError};
#[cfg(test)]
pub use site_repository::MockSiteRepository;
pub use site_repository::{FixtureSiteRepository, SiteRepository, SiteRepositoryError};
#[cfg(test)]
pub use sms_sender::MockSmsSender;
pub use sms_sender::{Delivery, SmsSender, SmsSenderError};
#[cfg(test)]
pub use truck_repository::MockTruckRepository;
pub use truck_repository::{TruckRepository, TruckRepositoryError};

#[cfg(test)]
mod tests;
