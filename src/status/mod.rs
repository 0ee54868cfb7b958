//! Status history: normalization of chat messages into page-ready data.

pub mod normalize;
pub mod reader;
pub mod types;

pub use normalize::{assemble_page, normalize, strip_marker, SUCCESS_FLAG, SUCCESS_MARKER};
pub use reader::StatusHistoryReader;
pub use types::{PageModel, StatusMessage};
