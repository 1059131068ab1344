//! Database implementations

mod columns;

pub mod booking_repository;
pub mod manager;
pub mod policy_repository;
pub mod pool;
pub mod property_repository;
pub mod reservation_repository;
pub mod sync_status_repository;
pub mod token_repository;

pub use booking_repository::*;
pub use manager::*;
pub use policy_repository::*;
pub use pool::*;
pub use property_repository::*;
pub use reservation_repository::*;
pub use sync_status_repository::*;
pub use token_repository::*;
