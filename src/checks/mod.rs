pub mod evaluator;
pub mod keywords;
pub mod types;

pub use evaluator::{
    check_no_errors, check_required_texts, check_success_message, check_table_rows, check_title,
    evaluate, evaluate_one,
};
pub use keywords::{DEFAULT_ERROR_KEYWORDS, DEFAULT_SUCCESS_KEYWORDS};
pub use types::{CheckKind, CheckOutcome, CheckSpec, TextRequirement};
