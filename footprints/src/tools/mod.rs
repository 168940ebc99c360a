pub mod lookup;
pub mod serve;
pub mod tile;
