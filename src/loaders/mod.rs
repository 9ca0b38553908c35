pub mod gltf;

pub use gltf::{load_model, load_model_file, MaterialData, MeshData, ModelData, TextureData};
