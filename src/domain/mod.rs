pub mod account;
pub mod category;
pub mod common;
pub mod setting;
pub mod transaction;

pub use account::Account;
pub use category::Category;
pub use common::Keyed;
pub use setting::StartDay;
pub use transaction::TransactionDraft;
