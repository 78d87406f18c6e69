pub mod concurrent_joins;
