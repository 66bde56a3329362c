//! Shared test harness modules for the Chargewise CLI.

mod helpers;
mod unit;
