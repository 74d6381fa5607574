//! Reads a depth texture back to the CPU and saves it as a greyscale PNG.

use std::{path::Path, sync::mpsc};

use anyhow::Context;
use image::RgbImage;
use wgpu::PollType;

const BYTES_PER_TEXEL: u32 = std::mem::size_of::<f32>() as u32;

/// Row pitch of a copy, rounded up to the alignment wgpu requires.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_TEXEL;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Strips the row padding of a mapped copy buffer.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_bytes_per_row: u32) -> Vec<f32> {
    let row_bytes = (width * BYTES_PER_TEXEL) as usize;

    data.chunks(padded_bytes_per_row as usize)
        .take(height as usize)
        .flat_map(|row| {
            row[..row_bytes]
                .chunks_exact(BYTES_PER_TEXEL as usize)
                .map(|texel| f32::from_le_bytes([texel[0], texel[1], texel[2], texel[3]]))
        })
        .collect()
}

/// Maps depth 0 to black and 1 to white.
pub fn depth_to_rgb(depths: &[f32], width: u32, height: u32) -> anyhow::Result<RgbImage> {
    let pixels = depths
        .iter()
        .flat_map(|depth| {
            let grey = (depth.clamp(0.0, 1.0) * 255.0) as u8;
            [grey, grey, grey]
        })
        .collect::<Vec<u8>>();

    RgbImage::from_raw(width, height, pixels)
        .with_context(|| format!("Depth data does not fill a {}x{} image", width, height))
}

pub fn dump_depth_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let width = texture.width();
    let height = texture.height();
    let bytes_per_row = padded_bytes_per_row(width);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Depth dump buffer"),
        size: (bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Depth dump encoder"),
    });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::DepthOnly,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    queue.submit([encoder.finish()]);

    let (sender, receiver) = mpsc::channel();
    let slice = buffer.slice(..);
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });

    device
        .poll(PollType::Wait)
        .context("Failed to poll device while reading depth")?;

    receiver
        .recv()
        .context("Depth buffer mapping was cancelled")?
        .context("Failed to map depth buffer")?;

    let depths = {
        let data = slice.get_mapped_range();
        unpad_rows(&data, width, height, bytes_per_row)
    };
    buffer.unmap();

    depth_to_rgb(&depths, width, height)?
        .save(path)
        .with_context(|| format!("Failed to save depth map to {}", path.display()))?;

    log::info!("Saved {}x{} depth map to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_alignment() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(2048), 8192);
    }

    #[test]
    fn padding_is_stripped() {
        let width = 3;
        let height = 2;
        let pitch = padded_bytes_per_row(width);

        let mut data = vec![0xAAu8; (pitch * height) as usize];
        for (row, values) in [[0.0f32, 0.5, 1.0], [0.25, 0.75, 0.125]].iter().enumerate() {
            for (column, value) in values.iter().enumerate() {
                let offset = row * pitch as usize + column * 4;
                data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
            }
        }

        let depths = unpad_rows(&data, width, height, pitch);
        assert_eq!(depths, vec![0.0, 0.5, 1.0, 0.25, 0.75, 0.125]);
    }

    #[test]
    fn depth_maps_to_grey() {
        let image = depth_to_rgb(&[0.0, 1.0, 0.5, 2.0], 2, 2).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [127, 127, 127]);
        assert_eq!(image.get_pixel(1, 1).0, [255, 255, 255]);
    }

    #[test]
    fn wrong_sample_count_is_an_error() {
        assert!(depth_to_rgb(&[0.0; 3], 2, 2).is_err());
    }
}
