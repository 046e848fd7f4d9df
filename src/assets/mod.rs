pub mod decode;
pub mod frame;
