pub mod alert;
pub mod background_model;
pub mod blur;
pub mod calibration;
pub mod exercise;
pub mod frame;
pub mod mask;
pub mod morphology;
pub mod preprocessor;
pub mod rep_counter;
pub mod silhouette;
pub mod silhouette_extractor;
pub mod smoothing;
pub mod utils;
