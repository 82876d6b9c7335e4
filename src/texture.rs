use std::path::{Path, PathBuf};

use glium::{
    texture::{CubeLayer, Cubemap, RawImage2d, SrgbTexture2d, Texture2d},
    Display, Surface,
};
use glutin::surface::WindowSurface;
use image::RgbaImage;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Stable index into a [`TextureTable`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl TextureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The four texture units an exterior material can sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureChannel {
    Diffuse,
    Normal,
    Specular,
    Emissive,
}

impl TextureChannel {
    pub const COUNT: usize = 4;
    pub const ALL: [TextureChannel; Self::COUNT] = [
        TextureChannel::Diffuse,
        TextureChannel::Normal,
        TextureChannel::Specular,
        TextureChannel::Emissive,
    ];

    /// bit set in the `u_channels` uniform when this channel is bound
    pub fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Texture ids per channel; `None` is the "no texture" sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Material {
    pub channels: [Option<TextureId>; TextureChannel::COUNT],
}

impl Material {
    pub fn channel(&self, channel: TextureChannel) -> Option<TextureId> {
        self.channels[channel as usize]
    }
}

/// Arena of textures keyed by [`TextureId`]. A slot is `None` when its file could not be read,
/// decoded or uploaded, which is the per-texture "mapped" flag. Slots whose paths repeat share
/// one stored texture.
pub struct TextureTable<T> {
    textures: Vec<T>,
    slots: Vec<Option<usize>>,
}

/// Textures resolved for one material, ready to hand to the shader.
#[derive(Debug, PartialEq)]
pub struct Bindings<'a, T> {
    pub slots: [Option<&'a T>; TextureChannel::COUNT],
    pub mask: u32,
}

impl<T> TextureTable<T> {
    #[cfg(test)]
    pub fn from_slots(slots: Vec<Option<T>>) -> Self {
        let mut textures = Vec::with_capacity(slots.len());
        let slots = slots
            .into_iter()
            .map(|slot| {
                slot.map(|texture| {
                    textures.push(texture);
                    textures.len() - 1
                })
            })
            .collect();
        Self { textures, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub fn is_mapped(&self, id: TextureId) -> bool {
        self.get(id).is_some()
    }

    pub fn mapped_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn get(&self, id: TextureId) -> Option<&T> {
        let stored = (*self.slots.get(id.index())?)?;
        self.textures.get(stored)
    }

    /// Sentinel ids and unmapped textures both resolve to an unbound channel, so a material is
    /// always drawable.
    pub fn bindings(&self, material: &Material) -> Bindings<'_, T> {
        let mut slots = [None; TextureChannel::COUNT];
        let mut mask = 0;
        for channel in TextureChannel::ALL {
            if let Some(texture) = material.channel(channel).and_then(|id| self.get(id)) {
                slots[channel as usize] = Some(texture);
                mask |= channel.bit();
            }
        }
        Bindings { slots, mask }
    }

    /// Builds a table by decoding every path on the worker pool and uploading the results in
    /// order. Paths that appear more than once are decoded and uploaded once.
    pub fn load<D, U>(paths: &[PathBuf], decode: D, mut upload: U) -> Self
    where
        D: Fn(&Path) -> Result<RgbaImage> + Sync,
        U: FnMut(&RgbaImage) -> Result<T>,
    {
        let mut unique: Vec<&Path> = Vec::new();
        let mut index_of = FxHashMap::<&Path, usize>::default();
        let unique_idx: Vec<usize> = paths
            .iter()
            .map(|path| {
                *index_of.entry(path.as_path()).or_insert_with(|| {
                    unique.push(path.as_path());
                    unique.len() - 1
                })
            })
            .collect();

        let decoded: Vec<Result<RgbaImage>> = unique.par_iter().map(|path| decode(path)).collect();

        let mut textures = Vec::with_capacity(unique.len());
        let stored: Vec<Option<usize>> = decoded
            .into_iter()
            .zip(&unique)
            .map(|(image, path)| match image.and_then(|image| upload(&image)) {
                Ok(texture) => {
                    textures.push(texture);
                    Some(textures.len() - 1)
                }
                Err(e) => {
                    log::warn!("texture {} left unmapped: {e}", path.display());
                    None
                }
            })
            .collect();

        Self {
            textures,
            slots: unique_idx.into_iter().map(|idx| stored[idx]).collect(),
        }
    }
}

pub fn decode_image(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|image| image.to_rgba8())
        .map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Upload as an sRGB texture, flipped so that row 0 is the bottom of the image as GL expects.
pub fn upload_srgb(display: &Display<WindowSurface>, image: &RgbaImage) -> Result<SrgbTexture2d> {
    let raw = RawImage2d::from_raw_rgba_reversed(image.as_raw(), image.dimensions());
    Ok(SrgbTexture2d::new(display, raw)?)
}

/// Decode the six faces (+X, -X, +Y, -Y, +Z, -Z) and blit them into a cubemap.
pub fn load_cubemap(display: &Display<WindowSurface>, faces: &[PathBuf; 6]) -> Result<Cubemap> {
    const LAYERS: [CubeLayer; 6] = [
        CubeLayer::PositiveX,
        CubeLayer::NegativeX,
        CubeLayer::PositiveY,
        CubeLayer::NegativeY,
        CubeLayer::PositiveZ,
        CubeLayer::NegativeZ,
    ];

    let images = faces
        .par_iter()
        .map(|path| decode_image(path))
        .collect::<Result<Vec<_>>>()?;

    let dimension = images[0].width();
    if let Some((path, image)) = faces
        .iter()
        .zip(&images)
        .find(|(_, image)| image.dimensions() != (dimension, dimension))
    {
        return Err(Error::Unsupported(format!(
            "cubemap face {} is {:?}, expected {dimension}x{dimension}",
            path.display(),
            image.dimensions()
        )));
    }

    let cubemap = Cubemap::empty(display, dimension)?;
    let target = glium::BlitTarget {
        left: 0,
        bottom: 0,
        width: dimension as i32,
        height: dimension as i32,
    };
    for (image, layer) in images.iter().zip(LAYERS) {
        // cubemap faces are sampled with the first row on top
        let raw = RawImage2d::from_raw_rgba(image.as_raw().clone(), image.dimensions());
        let face = Texture2d::new(display, raw)?;
        let framebuffer = glium::framebuffer::SimpleFrameBuffer::new(
            display,
            cubemap.main_level().image(layer),
        )?;
        face.as_surface().blit_whole_color_to(
            &framebuffer,
            &target,
            glium::uniforms::MagnifySamplerFilter::Linear,
        );
    }
    Ok(cubemap)
}
