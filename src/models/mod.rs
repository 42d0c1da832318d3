pub mod gemini;
pub mod image;
pub mod outcome;

pub use gemini::*;
pub use image::*;
pub use outcome::*;
