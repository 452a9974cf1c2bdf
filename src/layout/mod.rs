//! Layout and clustering algorithms.
//!
//! Two independent stages run over the same ingested [`GraphStore`]:
//! the 3-D force simulation ([`force`]) assigns spatial positions, and the
//! community detector ([`community`]) partitions the topology into
//! clusters. Neither depends on the other's output; attribute assignment
//! combines both.
//!
//! [`GraphStore`]: crate::graph::GraphStore

pub mod community;
pub mod force;

pub use community::{ClusterAssignment, ClusterId, LouvainConfig};
pub use force::{ForceConfig, ForceLayout, Point3};
