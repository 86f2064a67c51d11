//! Text analysis stages between extraction and output.
//!
//! | Stage | Module | Input | Output |
//! |-------|--------|-------|--------|
//! | Tokenize | [`tokenizer`] | headline text | noun [`tokenizer::Token`]s |
//! | Filter | [`filter`] | terms | terms minus stopwords and excluded keywords |
//! | Aggregate | [`frequency`] | terms | [`crate::models::FrequencyTable`] |

pub mod filter;
pub mod frequency;
pub mod tokenizer;
