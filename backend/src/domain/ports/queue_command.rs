//! Driving port for truck queue changes.

use async_trait::async_trait;

use crate::domain::{Error, EtaMinutes, SiteCode, SmsReply, Truck, TruckId, TruckStatus};

/// Driver self-service "on my way" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnRouteRequest {
    /// Raw phone as entered.
    pub phone: String,
    /// Destination site.
    pub site: SiteCode,
    /// Optional promised arrival.
    pub eta: Option<EtaMinutes>,
}

/// An inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundSms {
    /// Raw sender number.
    pub from: String,
    /// Message body.
    pub body: String,
}

/// Mutations of the truck queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueCommand: Send + Sync {
    /// Staff sets a status directly.
    async fn update_status(&self, truck_id: TruckId, status: TruckStatus) -> Result<Truck, Error>;

    /// Staff records an ETA on behalf of the driver.
    async fn set_eta(&self, truck_id: TruckId, eta: EtaMinutes) -> Result<Truck, Error>;

    /// Driver reports being on the way, creating today's entry if needed.
    async fn mark_en_route(&self, request: EnRouteRequest) -> Result<Truck, Error>;

    /// Apply a driver text command and produce the reply.
    async fn handle_sms(&self, message: InboundSms) -> Result<SmsReply, Error>;
}

/// Fixture that rejects every truck lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureQueueCommand;

#[async_trait]
impl QueueCommand for FixtureQueueCommand {
    async fn update_status(
        &self,
        truck_id: TruckId,
        _status: TruckStatus,
    ) -> Result<Truck, Error> {
        Err(Error::not_found(format!("truck {truck_id} not found")))
    }

    async fn set_eta(&self, truck_id: TruckId, _eta: EtaMinutes) -> Result<Truck, Error> {
        Err(Error::not_found(format!("truck {truck_id} not found")))
    }

    async fn mark_en_route(&self, request: EnRouteRequest) -> Result<Truck, Error> {
        Err(Error::not_found(format!("unknown site {}", request.site)))
    }

    async fn handle_sms(&self, _message: InboundSms) -> Result<SmsReply, Error> {
        Ok(SmsReply::Help)
    }
}
