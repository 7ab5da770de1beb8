//! Operators, as inherent methods on [`Observable`](crate::observable::Observable),
//! plus the free functions combining several sources.

pub mod as_observable;
pub mod catch_error;
pub mod collect;
pub mod combine_latest;
pub mod count;
pub mod debounce;
pub mod default_if_empty;
pub mod delay;
pub mod filter;
pub mod first;
pub mod flat_map;
pub mod fork_join;
pub mod ignore_elements;
pub mod last;
pub mod map;
pub mod materialize;
pub mod merge;
pub mod reduce;
pub mod repeat;
pub mod retry;
pub mod scan;
mod sequence;
pub mod skip;
pub mod skip_last;
pub mod start_with;
pub mod take;
pub mod take_last;
pub mod tap;
pub mod window_with_count;
pub mod window_with_time;
pub mod window_with_time_or_count;

pub use combine_latest::combine_latest;
pub use fork_join::fork_join;
pub use merge::merge;
pub use sequence::concat;
