pub mod notify;
pub mod server;
pub mod session;
pub mod slots;
pub mod steam;
