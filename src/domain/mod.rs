pub mod coupon;
pub mod history;
pub mod interest;
pub mod listing;
pub mod status;
pub mod support;
pub mod user;
pub mod wallet;
