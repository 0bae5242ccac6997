use image::{imageops::FilterType, DynamicImage};

pub const INPUT_WIDTH: u32 = 224;
pub const INPUT_HEIGHT: u32 = 224;
pub const INPUT_CHANNELS: u32 = 3;

/// Dense `f32` tensor in `[batch, height, width, channels]` order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub dims: [u64; 4],
    pub data: Vec<f32>,
}

/// Resizes to the classifier's input size and rescales intensities to `[0, 1]`.
///
/// Aspect ratio is not preserved. The caller is expected to have converted
/// the image to RGB already; any other layout is flattened to RGB here.
pub fn normalize(image: &DynamicImage) -> ImageTensor {
    let resized = image
        .resize_exact(INPUT_WIDTH, INPUT_HEIGHT, FilterType::CatmullRom)
        .to_rgb8();

    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    ImageTensor {
        dims: [
            1,
            INPUT_HEIGHT as u64,
            INPUT_WIDTH as u64,
            INPUT_CHANNELS as u64,
        ],
        data,
    }
}
