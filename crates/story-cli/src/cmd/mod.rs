pub mod lint;
pub mod new;
