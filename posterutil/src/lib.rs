//! Small utilities shared by every crate: OSM-style tags, a hierarchical timer that reports
//! progress, logging setup, and a bounded worker pool.

#[macro_use]
extern crate log;

pub mod logger;
mod parallel;
mod tags;
mod time;
mod utils;

pub use crate::parallel::{Cancellation, Parallelism};
pub use crate::tags::Tags;
pub use crate::time::{
    elapsed_seconds, prettyprint_time, ProgressEvent, ProgressSink, Timer,
};
pub use crate::utils::{plain_list_names, prettyprint_usize, slugify};

const PROGRESS_FREQUENCY_SECONDS: f64 = 0.2;
