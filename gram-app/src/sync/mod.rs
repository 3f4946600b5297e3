//! Синхронизация состояния представления: debounce ввода, клиентская
//! фильтрация и явное состояние асинхронной загрузки.

pub mod debounce;
pub mod fetch;
pub mod filter;

pub use debounce::Debouncer;
pub use fetch::FetchState;
pub use filter::filter_users;
