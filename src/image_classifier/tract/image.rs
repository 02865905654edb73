use crate::image_classifier::interface::InputTensor;
use image::{imageops, DynamicImage, GrayImage, Luma};
use tract_onnx::prelude::*;

/// Pixels of an upload for on-screen preview, shrunk to fit the preview bounds.
#[derive(Clone, PartialEq)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Preview({}x{})", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedUpload {
    pub preview: Preview,
    pub tensor: InputTensor,
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>> {
    if bytes.is_empty() {
        return Err("could not decode image: file is empty".into());
    }

    image::load_from_memory(bytes).map_err(|e| format!("could not decode image: {}", e).into())
}

/// ITU-R 601-2 luma, the same weights the model's training pipeline used.
pub fn grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16;
        Luma([luma as u8])
    })
}

/// Grayscale, stretch to exactly `width` x `height`, scale to [0, 1].
pub fn image_to_tensor(image: &DynamicImage, width: u32, height: u32) -> InputTensor {
    let gray = grayscale(image);
    let resized = imageops::resize(&gray, width, height, imageops::FilterType::Nearest);

    let array = tract_ndarray::Array4::from_shape_fn(
        (1, height as usize, width as usize, 1),
        |(_, y, x, _)| f32::from(resized.get_pixel(x as u32, y as u32)[0]) / 255.0,
    );

    InputTensor::new(array)
}

/// `input_shape` is (height, width), `preview_bounds` is (max width, max height).
pub fn prepare_upload(
    bytes: &[u8],
    input_shape: (u32, u32),
    preview_bounds: (u32, u32),
) -> Result<PreparedUpload, Box<dyn std::error::Error + Send + Sync>> {
    let image = decode_image(bytes)?;

    let tensor = image_to_tensor(&image, input_shape.1, input_shape.0);

    let (max_width, max_height) = preview_bounds;
    let rgba = if image.width() > max_width || image.height() > max_height {
        image
            .resize(max_width, max_height, imageops::FilterType::Triangle)
            .to_rgba8()
    } else {
        image.to_rgba8()
    };
    let preview = Preview {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    };

    Ok(PreparedUpload { preview, tensor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb, Rgba};
    use std::io::Cursor;

    const PREVIEW_BOUNDS: (u32, u32) = (300, 1200);

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_tensor_shape_for_any_input_size() {
        for (w, h) in [(1, 1), (640, 480), (300, 300), (120, 900), (301, 299)] {
            let tensor = image_to_tensor(&gradient(w, h), 300, 300);

            assert_eq!(tensor.shape(), &[1, 300, 300, 1]);
            assert!(tensor.values().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_tensor_shape_for_any_color_mode() {
        let images = vec![
            DynamicImage::ImageLuma8(ImageBuffer::from_pixel(50, 40, Luma([200]))),
            DynamicImage::ImageRgba8(ImageBuffer::from_pixel(50, 40, Rgba([10, 20, 30, 0]))),
            DynamicImage::ImageRgb16(ImageBuffer::from_pixel(50, 40, Rgb([65535, 0, 65535]))),
            DynamicImage::ImageRgb32F(ImageBuffer::from_pixel(50, 40, Rgb([0.5, 0.25, 1.0]))),
        ];

        for image in images {
            let tensor = image_to_tensor(&image, 300, 300);

            assert_eq!(tensor.shape(), &[1, 300, 300, 1]);
            assert!(tensor.values().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_tensor_normalization() {
        let white = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(10, 10, Rgb([255, 255, 255])));
        let black = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(10, 10, Rgb([0, 0, 0])));
        let gray = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(10, 10, Luma([128])));

        assert!(image_to_tensor(&white, 300, 300).values().all(|&v| v == 1.0));
        assert!(image_to_tensor(&black, 300, 300).values().all(|&v| v == 0.0));

        let expected = 128.0 / 255.0;
        assert!(image_to_tensor(&gray, 300, 300)
            .values()
            .all(|v| (v - expected).abs() < 0.0001));
    }

    #[test]
    fn test_grayscale_weights() {
        let red = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, Rgb([255, 0, 0])));
        let green = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, Rgb([0, 255, 0])));
        let blue = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, Rgb([0, 0, 255])));

        assert_eq!(grayscale(&red).get_pixel(0, 0)[0], 76);
        assert_eq!(grayscale(&green).get_pixel(0, 0)[0], 150);
        assert_eq!(grayscale(&blue).get_pixel(0, 0)[0], 29);
    }

    #[test]
    fn test_stretches_without_letterboxing() {
        // Left half black, right half white: stretching keeps the split at the middle column.
        let img = ImageBuffer::from_fn(200, 100, |x, _| {
            if x < 100 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });

        let tensor = image_to_tensor(&DynamicImage::ImageRgb8(img), 300, 300).to_tensor();
        let view = tensor.to_array_view::<f32>().unwrap();

        assert_eq!(view[[0, 0, 0, 0]], 0.0);
        assert_eq!(view[[0, 299, 0, 0]], 0.0);
        assert_eq!(view[[0, 0, 299, 0]], 1.0);
        assert_eq!(view[[0, 299, 299, 0]], 1.0);
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let bytes = encode(&gradient(640, 480), ImageFormat::Png);

        let first = prepare_upload(&bytes, (300, 300), PREVIEW_BOUNDS).unwrap();
        let second = prepare_upload(&bytes, (300, 300), PREVIEW_BOUNDS).unwrap();

        let first_bits: Vec<u32> = first.tensor.values().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u32> = second.tensor.values().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
        assert_eq!(first.preview, second.preview);
    }

    #[test]
    fn test_prepare_shrinks_preview_keeping_aspect_ratio() {
        let bytes = encode(&gradient(640, 480), ImageFormat::Png);

        let prepared = prepare_upload(&bytes, (300, 300), PREVIEW_BOUNDS).unwrap();

        assert_eq!(prepared.preview.width, 300);
        assert_eq!(prepared.preview.height, 225);
        assert_eq!(prepared.preview.rgba.len(), 300 * 225 * 4);
        assert_eq!(prepared.tensor.shape(), &[1, 300, 300, 1]);
    }

    #[test]
    fn test_prepare_keeps_small_preview_as_is() {
        let bytes = encode(&gradient(50, 80), ImageFormat::Png);

        let prepared = prepare_upload(&bytes, (300, 300), PREVIEW_BOUNDS).unwrap();

        assert_eq!(prepared.preview.width, 50);
        assert_eq!(prepared.preview.height, 80);
        assert_eq!(prepared.preview.rgba, gradient(50, 80).to_rgba8().into_raw());
    }

    #[test]
    fn test_prepare_bounds_panorama_and_tall_previews() {
        for (w, h) in [(20000, 40), (40, 20000)] {
            let bytes = encode(&gradient(w, h), ImageFormat::Png);

            let prepared = prepare_upload(&bytes, (300, 300), PREVIEW_BOUNDS).unwrap();

            assert!(prepared.preview.width >= 1 && prepared.preview.width <= 300);
            assert!(prepared.preview.height >= 1 && prepared.preview.height <= 1200);
            assert_eq!(
                prepared.preview.rgba.len(),
                (prepared.preview.width * prepared.preview.height * 4) as usize
            );
            assert_eq!(prepared.tensor.shape(), &[1, 300, 300, 1]);
        }
    }

    #[test]
    fn test_prepare_jpeg() {
        let bytes = encode(&gradient(640, 480), ImageFormat::Jpeg);

        let prepared = prepare_upload(&bytes, (300, 300), PREVIEW_BOUNDS).unwrap();

        assert_eq!(prepared.tensor.shape(), &[1, 300, 300, 1]);
    }

    #[test]
    fn test_text_file_is_a_decode_error() {
        let result = prepare_upload(b"just some notes, not a picture\n", (300, 300), PREVIEW_BOUNDS);

        let message = result.unwrap_err().to_string();
        assert!(message.starts_with("could not decode image"), "{}", message);
    }

    #[test]
    fn test_empty_file_is_a_decode_error() {
        assert!(prepare_upload(&[], (300, 300), PREVIEW_BOUNDS).is_err());
    }
}
