pub mod identity;
pub mod vehicle;
pub mod work_session;
