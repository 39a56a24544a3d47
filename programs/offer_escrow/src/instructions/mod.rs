pub mod close_offer;
pub mod make_offer;
pub mod take_offer;

pub use close_offer::*;
pub use make_offer::*;
pub use take_offer::*;
