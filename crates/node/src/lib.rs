//! Bpenode-node - tokenization and detokenization processing nodes
//!
//! The host drives a node through a fixed lifecycle: `initialize` once,
//! `execute` per request, `release` for every output set, `deinitialize`
//! at the end. Tensors cross the boundary as borrowed views on the way in
//! and owned buffers on the way out.
//!
//! # Example
//!
//! ```rust,no_run
//! use bpenode_core::{NodeParam, Precision, TensorView};
//! use bpenode_node::{NodeHandle, TokenizerNode};
//!
//! let node = NodeHandle::<TokenizerNode>::initialize(&[NodeParam::new("model_path", "models/clip")])
//!     .expect("model loads");
//!
//! let data = b"a photo of a cat\0";
//! let dims = [1u64, data.len() as u64];
//! let inputs = [TensorView::new("texts", Precision::U8, &dims, data)];
//! let outputs = node
//!     .execute(&inputs, &[NodeParam::new("max_ids_arr_length", "77")])
//!     .expect("tokenized");
//! node.release(outputs);
//! node.deinitialize();
//! ```

pub mod decode;
pub mod detokenizer_node;
pub mod node;
pub mod status;
pub mod tokenizer_node;

pub use decode::{argmax, locate_context_end, ContextEnd, DecodeBatch};
pub use detokenizer_node::{DetokenizeConfig, DetokenizerNode};
pub use node::CustomNode;
pub use status::{into_status, NodeHandle, STATUS_OK};
pub use tokenizer_node::TokenizerNode;
