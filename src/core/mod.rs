pub mod auth;
pub mod backup;
pub mod clock;
pub mod log;
pub mod tracker;
pub mod vehicles;
