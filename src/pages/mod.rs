pub mod forbidden;
pub mod home;
pub mod profile;
pub mod slots;
pub mod steam_callback;
pub mod transfer;

pub use forbidden::*;
pub use home::*;
pub use profile::*;
pub use slots::*;
pub use steam_callback::*;
pub use transfer::*;
