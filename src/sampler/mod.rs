mod bank;
mod channel;
mod looping;

pub use bank::SampleBank;
pub use channel::Channel;
pub use looping::LoopingSampler;
