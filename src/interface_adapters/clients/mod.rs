// Hit resolver implementations: remote service client and local fallback.

pub mod lanes;

pub use hit_test::HttpHitResolver;
pub use lanes::LaneResolver;
