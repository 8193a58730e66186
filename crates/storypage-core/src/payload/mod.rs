pub mod page;
pub mod template;

pub use page::{build_page_record, PageRecord, TextElement, DEFAULT_MAX_TEXT_ELEMENTS};
pub use template::TemplateRecord;
