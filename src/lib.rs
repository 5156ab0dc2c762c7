#![forbid(unsafe_code)]

//! Flat asset container used by the device firmware: a 12-byte header, a
//! fixed-width name table and a framed payload region, memory-mapped and
//! indexed by name on the target. See [`assets::LAYOUT_V1`] for the layout.

pub mod assets;
