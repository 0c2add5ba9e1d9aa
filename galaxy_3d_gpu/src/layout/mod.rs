//! Flat buffer layouts: named, typed fields packed in declaration order

pub mod buffer_layout;

pub use buffer_layout::{BufferLayout, FieldDesc, FieldType};
