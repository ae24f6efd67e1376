//! Output formatters (human and JSONL)

pub mod domain_list;
pub mod human;
pub mod jsonl;

pub use domain_list::{DomainInfo, DomainListHumanFormatter, DomainListJsonlFormatter, DomainSource};
pub use human::HumanFormatter;
pub use jsonl::JsonlFormatter;
