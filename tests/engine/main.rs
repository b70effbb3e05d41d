#![allow(clippy::float_cmp)]

mod cancellation;
mod isolation;
mod reports;
mod single_run;
mod sweep;
