pub mod cancellation;
pub mod one_shot;
