//! Application services.

pub mod delivery;

pub use delivery::NotificationDeliveryEngine;
