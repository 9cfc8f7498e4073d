pub mod image_helper {
    use crate::core_modules::mask::ForegroundMask;
    use crate::error::{Result, TrainerError};
    use image::ImageEncoder;
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    /// Writes a mask as an 8-bit grayscale PNG.
    pub fn save_mask(path: &Path, mask: &ForegroundMask) -> Result<()> {
        let output = File::create(path).map_err(|source| TrainerError::io(path, source))?;
        let encoder = image::codecs::png::PngEncoder::new(BufWriter::new(output));

        encoder.write_image(
            mask.as_image().as_raw(),
            mask.width(),
            mask.height(),
            image::ExtendedColorType::L8,
        )?;

        Ok(())
    }

    /// `mask_000042.png` style name for frame `index`.
    pub fn mask_file_name(index: usize) -> String {
        format!("mask_{index:06}.png")
    }
}
