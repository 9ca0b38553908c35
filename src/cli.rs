// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "model-carousel")]
#[command(about = "glTF model with an orbiting ring of cards", long_about = None)]
pub struct Cli {
    /// Directory the model and its resources are loaded from
    #[arg(long = "model-dir", env = "MODEL_DIR", default_value = "cajaCsgo")]
    pub model_dir: PathBuf,

    /// glTF file inside the model directory
    #[arg(long = "model-file", env = "MODEL_FILE", default_value = "scene.gltf")]
    pub model_file: PathBuf,

    /// Show the FPS overlay
    #[arg(long = "show-fps", default_value = "false")]
    pub show_fps: bool,

    /// Print the card layout at the given time (seconds) as JSON and exit
    #[arg(long = "dump-layout", value_name = "SECONDS")]
    pub dump_layout: Option<f64>,
}

impl Cli {
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }
}
