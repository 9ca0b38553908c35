pub mod input_adapter;

pub use input_adapter::PointerAdapter;
