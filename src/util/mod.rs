mod text;

pub use text::{build_keyword_query, extract_keywords, slugify};
