use bevy_ecs::{query::With, world::World};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use wgpu::util::DeviceExt;

use crate::{
    components::{
        location::{Label, Location, Marker, Sprite},
        material::MaterialComponent,
        mesh::SpriteUniform,
        render_pipelines::RenderPipelineComponent,
    },
    Uniform,
};

use super::{material::MaterialSystem, mesh::MeshSystem, pipelines::BillboardRenderPipelineSystem};

/// Where label text is drawn inside its texture. The whole canvas is
/// stretched over the label sprite, transparent where there is no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCanvas {
    pub width: u32,
    pub height: u32,
    pub text_x: u32,
    pub baseline: u32,
    /// 8x8 glyphs are drawn this many pixels per font pixel
    pub glyph_scale: u32,
}

pub const LABEL_CANVAS: LabelCanvas = LabelCanvas {
    width: 300,
    height: 150,
    text_x: 10,
    baseline: 50,
    glyph_scale: 3,
};

const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub struct SpriteDraw {
    pub uniform_bind_group: wgpu::BindGroup,
    pub material_index: usize,
}

pub struct SpriteBatch {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub render_pipeline: RenderPipelineComponent,
    pub materials: Vec<MaterialComponent>,
    pub sprites: Vec<SpriteDraw>,
}

pub struct BillboardSystem {}

impl BillboardSystem {
    pub fn rasterize_label(text: &str, canvas: &LabelCanvas) -> RgbaImage {
        let mut image = RgbaImage::new(canvas.width, canvas.height);
        let glyph_size = 8 * canvas.glyph_scale;
        let top = canvas.baseline.saturating_sub(glyph_size);

        let mut pen_x = canvas.text_x;
        for ch in text.chars() {
            if pen_x >= canvas.width {
                break;
            }
            // unknown characters still take up their advance
            let glyph = BASIC_FONTS
                .get(ch)
                .or_else(|| LATIN_FONTS.get(ch))
                .unwrap_or([0; 8]);
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8u32 {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let x0 = pen_x + col * canvas.glyph_scale;
                    let y0 = top + row as u32 * canvas.glyph_scale;
                    for y in y0..(y0 + canvas.glyph_scale).min(canvas.height) {
                        for x in x0..(x0 + canvas.glyph_scale).min(canvas.width) {
                            image.put_pixel(x, y, TEXT_COLOR);
                        }
                    }
                }
            }
            pen_x += glyph_size;
        }
        image
    }

    /// Uploads the marker icon, one rasterized texture per label and one
    /// uniform per sprite in `world`.
    pub fn create_sprite_batch(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        world: &mut World,
        marker_icon: &RgbaImage,
        camera_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        texture_format: wgpu::TextureFormat,
    ) -> SpriteBatch {
        let sprite_layout = BillboardSystem::create_sprite_bind_group_layout(device);
        let shader =
            device.create_shader_module(wgpu::include_wgsl!("../shaders/billboard_shader.wgsl"));
        let render_pipeline = BillboardRenderPipelineSystem::create(
            device,
            &[camera_layout, texture_layout, &sprite_layout],
            &shader,
            texture_format,
        );

        let (vertices, indices) = MeshSystem::generate_square_mesh();

        let mut materials = vec![MaterialSystem::create_2d_texture(
            device,
            queue,
            texture_layout,
            marker_icon,
            wgpu::AddressMode::ClampToEdge,
        )];
        let mut sprites = Vec::new();

        let mut markers = world.query_filtered::<&Sprite, With<Marker>>();
        for sprite in markers.iter(world) {
            sprites.push(SpriteDraw {
                uniform_bind_group: BillboardSystem::create_sprite_bind_group(
                    device,
                    &sprite_layout,
                    sprite,
                ),
                material_index: 0,
            });
        }

        let mut labels = world.query_filtered::<(&Location, &Sprite), With<Label>>();
        for (location, sprite) in labels.iter(world) {
            let canvas = BillboardSystem::rasterize_label(&location.name, &LABEL_CANVAS);
            materials.push(MaterialSystem::create_2d_texture(
                device,
                queue,
                texture_layout,
                &canvas,
                wgpu::AddressMode::ClampToEdge,
            ));
            sprites.push(SpriteDraw {
                uniform_bind_group: BillboardSystem::create_sprite_bind_group(
                    device,
                    &sprite_layout,
                    sprite,
                ),
                material_index: materials.len() - 1,
            });
        }
        tracing::debug!(sprites = sprites.len(), "created billboards");

        SpriteBatch {
            vertex_buffer: MeshSystem::create_vertex_buffer(device, vertices.as_slice()),
            index_buffer: MeshSystem::create_index_buffer(device, indices.as_slice()),
            num_indices: indices.len() as u32,
            render_pipeline,
            materials,
            sprites,
        }
    }

    fn create_sprite_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("Sprite Uniform Bind Group Layout"),
        })
    }

    fn create_sprite_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sprite: &Sprite,
    ) -> wgpu::BindGroup {
        let uniform = SpriteUniform {
            center: [sprite.position.x, sprite.position.y, sprite.position.z, 1.0],
            scale: [sprite.scale.x, sprite.scale.y, 1.0, 0.0],
        };
        let buffer = BillboardSystem::create_uniform_buffer(device, &uniform);
        BillboardSystem::create_uniform_bind_group(device, &buffer, layout)
    }
}

impl Uniform for BillboardSystem {
    fn create_uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, data: &T) -> wgpu::Buffer {
        // sprites never move, so no COPY_DST
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Uniform Buffer"),
            contents: bytemuck::bytes_of(data),
            usage: wgpu::BufferUsages::UNIFORM,
        })
    }

    fn create_uniform_bind_group(
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Sprite Uniform Bind Group"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_pixels(image: &RgbaImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, pixel)| pixel[3] > 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn label_text_sits_on_the_baseline() {
        let image = BillboardSystem::rasterize_label("New York City", &LABEL_CANVAS);
        assert_eq!(image.dimensions(), (300, 150));

        let lit = lit_pixels(&image);
        assert!(!lit.is_empty());
        for &(x, y) in &lit {
            assert!(x >= 10, "pixel left of the text start at x = {x}");
            assert!((26..50).contains(&y), "pixel off the text line at y = {y}");
            assert_eq!(image.get_pixel(x, y), &TEXT_COLOR);
        }
    }

    #[test]
    fn empty_label_is_fully_transparent() {
        let image = BillboardSystem::rasterize_label("", &LABEL_CANVAS);
        assert!(lit_pixels(&image).is_empty());
    }

    #[test]
    fn long_labels_are_clipped_to_the_canvas() {
        let canvas = LabelCanvas {
            width: 40,
            height: 30,
            ..LABEL_CANVAS
        };
        let image = BillboardSystem::rasterize_label("Bahawalpur Bahawalpur", &canvas);
        assert_eq!(image.dimensions(), (40, 30));
        assert!(!lit_pixels(&image).is_empty());
    }

    #[test]
    fn spaces_advance_without_drawing() {
        let with_space = BillboardSystem::rasterize_label(" T", &LABEL_CANVAS);
        let lit = lit_pixels(&with_space);
        assert!(lit.iter().all(|&(x, _)| x >= 10 + 24));
    }
}
