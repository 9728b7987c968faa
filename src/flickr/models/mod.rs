pub mod page;
pub mod photo;

pub use page::{ParseError, ResultPage};
pub use photo::PhotoRecord;
