pub use matrix::Matrix;
pub use rectangle::{IntRect, Rectangle};

mod matrix;
mod rectangle;
