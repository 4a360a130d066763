pub mod c32;
pub mod hash;
