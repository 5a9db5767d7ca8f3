#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Arena storage for overflow chain nodes.
///
/// Every [`StringSet`] owns one [`NodePool`], handed to it at construction,
/// and allocates and frees all of its chain nodes through it.
pub mod node_pool;

pub mod string_set;

pub use node_pool::NodePool;
pub use string_set::Position;
pub use string_set::StringSet;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        compile_error!("enable the `foldhash` or `std` feature to select a default hasher");
    }
}
