use model_carousel::loaders::{load_model, load_model_file};
use model_carousel::scene::pivot::{Model, MODEL_SCALE};
use std::fs;
use std::path::Path;

// Three little-endian f32 positions: (0,0,0) (2,0,0) (0,4,0)
const TRIANGLE_BUFFER: &str = "AAAAAAAAAAAAAAAAAAAAQAAAAAAAAAAAAAAAAAAAgEAAAAAA";

fn triangle_gltf(translation: [f32; 3], double_sided: bool, blend: bool) -> String {
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "translation": [{}, {}, {}] }}],
  "meshes": [{{ "name": "tri", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "material": 0 }}] }}],
  "materials": [{{
    "pbrMetallicRoughness": {{ "baseColorFactor": [0.5, 0.25, 1.0, 0.75] }},
    "doubleSided": {},
    "alphaMode": "{}"
  }}],
  "accessors": [{{
    "bufferView": 0,
    "componentType": 5126,
    "count": 3,
    "type": "VEC3",
    "min": [0.0, 0.0, 0.0],
    "max": [2.0, 4.0, 0.0]
  }}],
  "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
  "buffers": [{{
    "byteLength": 36,
    "uri": "data:application/octet-stream;base64,{}"
  }}]
}}"#,
        translation[0],
        translation[1],
        translation[2],
        double_sided,
        if blend { "BLEND" } else { "OPAQUE" },
        TRIANGLE_BUFFER
    )
}

fn write_fixture(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[cfg(test)]
mod gltf_loading_tests {
    use super::*;

    #[test]
    fn test_loads_triangle_from_dir_and_file() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "scene.gltf", &triangle_gltf([0.0, 0.0, 0.0], false, false));

        let model = load_model(dir.path(), "scene.gltf").unwrap();

        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.triangle_count(), 1);
        assert_eq!(model.meshes[0].indices, vec![0, 1, 2]);
        assert_eq!(model.meshes[0].name.as_deref(), Some("tri"));
    }

    #[test]
    fn test_missing_normals_are_generated() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "scene.gltf", &triangle_gltf([0.0, 0.0, 0.0], false, false));

        let model = load_model(dir.path(), "scene.gltf").unwrap();
        for vertex in &model.meshes[0].vertices {
            assert!((vertex.normal[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_material_is_read() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "scene.gltf", &triangle_gltf([0.0, 0.0, 0.0], true, true));

        let model = load_model(dir.path(), "scene.gltf").unwrap();
        let material = &model.meshes[0].material;
        assert_eq!(material.base_color, [0.5, 0.25, 1.0, 0.75]);
        assert!(material.double_sided);
        assert!(material.blend);
        assert_eq!(material.texture, None);
    }

    #[test]
    fn test_node_transform_is_baked() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "moved.gltf", &triangle_gltf([10.0, 0.0, -3.0], false, false));

        let model = load_model_file(dir.path().join("moved.gltf")).unwrap();
        let bounds = model.bounds().unwrap();
        assert!((bounds.min.x - 10.0).abs() < 1e-5);
        assert!((bounds.max.x - 12.0).abs() < 1e-5);
        assert!((bounds.min.z + 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_prepared_model_is_centered_and_scaled() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "moved.gltf", &triangle_gltf([10.0, 5.0, -3.0], false, false));

        let model = Model::prepare(load_model(dir.path(), "moved.gltf").unwrap());
        let bounds = model.bounds().unwrap();

        assert!(bounds.center().length() < 1e-4);
        assert!((bounds.size().x - 2.0 * MODEL_SCALE).abs() < 1e-4);
        assert!((bounds.size().y - 4.0 * MODEL_SCALE).abs() < 1e-4);
        assert_eq!(model.mesh_states.len(), 1);
        assert!(model.mesh_states[0].depth_test && model.mesh_states[0].depth_write);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(dir.path(), "scene.gltf").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load glTF file"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "scene.gltf", "{ not json");
        assert!(load_model(dir.path(), "scene.gltf").is_err());
    }
}
