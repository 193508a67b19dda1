mod policy;

pub use policy::{Policies, Policy};

/// Our election IDs are integers, allocated in insertion order.
pub type ElectionId = u32;
/// Our candidate IDs are integers, allocated in insertion order.
pub type CandidateId = u32;
