pub mod accumulator;
pub mod interval;
pub mod router;
pub mod sink;
pub mod store;
pub mod window;

pub use accumulator::WindowAccumulator;
pub use interval::interval_label;
pub use router::StreamRouter;
pub use sink::{CandleSink, CompositeSink, VecSink};
pub use store::WindowStore;
