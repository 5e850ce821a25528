//! The distributed frame and the operations it exposes.
//!
//! Every operation runs as one or two rounds of partition tasks on the frame's executor,
//! followed by a reduction on the calling thread.

mod dataframe;
mod missing;
mod sampling;
mod stats;

pub use dataframe::DistributedDataFrame;
pub use missing::{Axis, DropNaOptions, How};
pub use sampling::SampleSpec;
