pub mod evaluate;
pub mod hash;
