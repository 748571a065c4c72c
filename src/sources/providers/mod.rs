// src/sources/providers/mod.rs
pub mod bootdev;
pub mod devto;
pub mod freecodecamp;
pub mod graphql;
pub mod hackernews;
pub mod hashnode;
pub mod lobsters;
