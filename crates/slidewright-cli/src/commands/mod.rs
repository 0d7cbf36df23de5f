pub mod add_slide;
pub mod build;
pub mod extract;
pub mod runtime;
pub mod tools;
