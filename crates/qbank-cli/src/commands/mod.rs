pub mod dispatch;
pub mod question;
pub mod shared;
pub mod variant;
