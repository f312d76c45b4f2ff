//! Index schema and analyzer setup.

use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

use sened_core::token::stop_word_union;

pub const TOKENIZER_NAME: &str = "text_multilingual";

/// Document ids are u64 terms so deletes address exactly one document.
/// `title`, `content` and `tags` share one analyzer; `category` is an
/// untokenized keyword and `created_ts` backs recency ordering.
pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    schema_builder.add_u64_field("id", INDEXED | STORED | FAST);
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(TOKENIZER_NAME)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let text_options = TextOptions::default()
        .set_indexing_options(text_field_indexing)
        .set_stored();
    schema_builder.add_text_field("title", text_options.clone());
    schema_builder.add_text_field("content", text_options.clone());
    schema_builder.add_text_field("tags", text_options);
    schema_builder.add_text_field("category", STRING | STORED);
    schema_builder.add_i64_field("created_ts", STORED | FAST);
    schema_builder.build()
}

/// One analyzer covers all three languages: the Ge'ez script has no case
/// to fold, and the stop-word union keeps the filter language-agnostic.
pub fn register_tokenizer(index: &Index) {
    let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            stop_word_union().map(|s| s.to_string()),
        ))
        .build();
    index.tokenizers().register(TOKENIZER_NAME, tokenizer);
}
