pub mod categories;
pub mod tokenizer;
