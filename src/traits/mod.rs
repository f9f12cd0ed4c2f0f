//! Trait definitions at the seams where implementations are swapped:
//! the cache backend and the task repository.

pub mod cache;
pub mod repository;
