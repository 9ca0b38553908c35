pub mod camera;
pub mod cli;
pub mod core;
pub mod frame;
pub mod loaders;
pub mod math;
pub mod overlay;
pub mod renderer;
pub mod scene;
pub mod types;
pub mod window;
