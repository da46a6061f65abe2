pub mod conv2d;
pub mod dropout;
pub mod flatten;
pub mod lambda;
pub mod linear;
pub mod pooling;
pub mod relu;

pub use conv2d::Conv2d;
pub use dropout::Dropout;
pub use flatten::Flatten;
pub use lambda::Lambda;
pub use linear::Linear;
pub use pooling::AvgPool2d;
pub use relu::ReLU;
