//! Procedural 2D city generation library
//!
//! Partitions a plane into land-use zones, synthesizes a hierarchical road
//! network over them, packs buildings into the remaining space, and exports
//! the result as structured data, an OBJ mesh, or a preview image.

pub mod buildings;
pub mod city;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod preview;
pub mod roads;
pub mod seeds;
pub mod zones;
