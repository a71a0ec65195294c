pub mod ids;
pub mod money;

pub use ids::{BookingId, OwnerId, ServiceId};
pub use money::Money;
