//! Tensor descriptors exchanged with the host.
//!
//! Inputs arrive as borrowed [`TensorView`]s, outputs leave as owned
//! [`Tensor`]s grouped in [`NodeOutputs`]. [`TensorInfo`] describes the static
//! schema a node reports before any request is made.

pub mod buffer;
pub mod info;
pub mod precision;
pub mod string_array;
pub mod view;

pub use buffer::{NodeOutputs, Tensor};
pub use info::{TensorInfo, DYNAMIC_DIM};
pub use precision::Precision;
pub use string_array::{pack_string_rows, read_string_rows};
pub use view::TensorView;
