pub mod retry_policy;

pub use retry_policy::{retry, RetryPolicy, Retryable};
