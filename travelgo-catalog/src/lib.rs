pub mod directory;
pub mod inventory;
pub mod pricing;

pub use directory::ServiceDirectory;
pub use inventory::InventoryManager;
pub use pricing::{PricingEngine, Quote};
