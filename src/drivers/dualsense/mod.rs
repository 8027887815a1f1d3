pub mod driver;
pub mod effect;
pub mod generator;
pub mod hid_report;

#[cfg(test)]
mod hid_report_test;
