pub mod patterns;

pub use patterns::PatternSet;
