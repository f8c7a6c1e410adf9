//! Headless capture: PNG screenshots.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::Nes;

/// Save the current framebuffer as a PNG file.
///
/// The framebuffer is ARGB32; the encoder wants RGBA bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot(nes: &Nes, path: &Path) -> Result<(), Box<dyn Error>> {
    let width = nes.framebuffer_width();
    let height = nes.framebuffer_height();
    let fb = nes.framebuffer();

    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for &pixel in fb {
        rgba.push(((pixel >> 16) & 0xFF) as u8);
        rgba.push(((pixel >> 8) & 0xFF) as u8);
        rgba.push((pixel & 0xFF) as u8);
        rgba.push(0xFF);
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Run and dump frames as numbered PNGs.
///
/// # Errors
///
/// Returns an error if emulation fails or a frame cannot be saved.
pub fn record(nes: &mut Nes, dir: &Path, num_frames: u32) -> Result<(), Box<dyn Error>> {
    let frames_dir = dir.join("frames");
    fs::create_dir_all(&frames_dir)?;

    for i in 1..=num_frames {
        nes.run_frame()?;
        let filename = frames_dir.join(format!("{i:06}.png"));
        save_screenshot(nes, &filename)?;
    }

    eprintln!("Captured {num_frames} frames to {}", frames_dir.display());
    Ok(())
}
