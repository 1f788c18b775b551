//! The scheduling policies and the queue structures they share.

mod queue_set;
pub use queue_set::QueueSet;

mod io_pool;
pub use io_pool::IoPool;

mod mlfq;
pub use mlfq::MlfqScheduler;

mod round_robin;
pub use round_robin::RoundRobinScheduler;

mod fcfs;
pub use fcfs::FcfsScheduler;
