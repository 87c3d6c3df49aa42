mod auth_tests;
mod listing_tests;
mod support_tests;
mod wallet_tests;
