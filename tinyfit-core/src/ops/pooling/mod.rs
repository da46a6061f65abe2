pub mod avg_pool2d;

pub use avg_pool2d::avg_pool2d_op;
