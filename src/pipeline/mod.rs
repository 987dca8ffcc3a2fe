pub mod chaos;
pub mod digest;
pub mod fingerprint;
pub mod rle;
pub mod seed;

pub use chaos::*;
pub use digest::*;
pub use fingerprint::*;
pub use rle::*;
pub use seed::*;
