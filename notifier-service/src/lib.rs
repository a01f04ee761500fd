//! Push notification relay for warehouse announcements and stock alerts.
//!
//! Two endpoints resolve recipients from the profiles table and hand a
//! notification to the push vendor:
//!
//! - `POST /send_announcement` broadcasts to everyone or to one role and
//!   stamps the announcement row as sent.
//! - `POST /trigger_stock_alert` notifies a business owner and their staff
//!   about a product running low or out of stock.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
