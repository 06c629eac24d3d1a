pub mod blocking;
pub mod fifo;
pub mod mpsc;

pub use blocking::BlockingQueue;
pub use fifo::FifoQueue;
pub use mpsc::MpscQueue;
