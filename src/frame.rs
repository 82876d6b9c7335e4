use glam::{Mat4, Vec3};
use glium::{
    index::{NoIndices, PrimitiveType},
    texture::{Cubemap, RawImage2d, SrgbTexture2d},
    uniform,
    uniforms::{AsUniformValue, MagnifySamplerFilter, Sampler, UniformValue, Uniforms},
    Display, DrawParameters, Frame, Program, Surface, VertexBuffer,
};
use glutin::surface::WindowSurface;

use crate::{
    buffer::{line_vertices, ExteriorChunk, LineVertex, MeshSet},
    error::Result,
    geometry,
    load::{Light, MeshId},
    shader::MAX_LIGHTS,
    state::SceneState,
    texture::{TextureChannel, TextureTable},
};

const CLEAR_COLOR: (f32, f32, f32, f32) = (0.2, 0.2, 1.0, 1.0);
const GRID_COLOR: [f32; 3] = [0.5, 0.5, 0.5];
const DEFAULT_LIGHT: Light = Light {
    position: Vec3::new(0.0, 0.0, 10000.0),
    color: Vec3::ONE,
};

/// Lights handed to the exterior shader: the manifest's, capped at [`MAX_LIGHTS`], or a single
/// white light when the manifest has none.
pub fn shading_lights(manifest: &[Light]) -> Vec<Light> {
    if manifest.is_empty() {
        return vec![DEFAULT_LIGHT];
    }
    if manifest.len() > MAX_LIGHTS {
        log::warn!(
            "scene has {} lights, shading with the first {MAX_LIGHTS}",
            manifest.len()
        );
    }
    manifest.iter().take(MAX_LIGHTS).copied().collect()
}

/// Uniforms of one exterior chunk. Written out by hand since the light array has one uniform
/// name per element.
struct ExteriorUniforms<'t> {
    mvp: [[f32; 4]; 4],
    camera_position: [f32; 3],
    channels: u32,
    lights: &'t [Light],
    samplers: [Sampler<'t, SrgbTexture2d>; TextureChannel::COUNT],
}

const SAMPLER_NAMES: [&str; TextureChannel::COUNT] =
    ["u_diffuse", "u_normal_map", "u_specular", "u_emissive"];

impl Uniforms for ExteriorUniforms<'_> {
    fn visit_values<'a, F: FnMut(&str, UniformValue<'a>)>(&'a self, mut visit: F) {
        visit("u_mvp", UniformValue::Mat4(self.mvp));
        visit("u_camera_position", UniformValue::Vec3(self.camera_position));
        visit("u_channels", UniformValue::UnsignedInt(self.channels));
        visit(
            "u_light_count",
            UniformValue::SignedInt(i32::try_from(self.lights.len()).unwrap_or(i32::MAX)),
        );
        for (i, light) in self.lights.iter().enumerate() {
            visit(
                format!("u_light[{i}].position").as_str(),
                UniformValue::Vec3(light.position.to_array()),
            );
            visit(
                format!("u_light[{i}].color").as_str(),
                UniformValue::Vec3(light.color.to_array()),
            );
        }
        for (name, sampler) in SAMPLER_NAMES.iter().zip(&self.samplers) {
            visit(*name, sampler.as_uniform_value());
        }
    }
}

/// One wireframe character or prop, ready to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropDraw {
    pub mesh: MeshId,
    pub model: Mat4,
    pub color: [f32; 3],
    pub frame: usize,
}

/// Characters then props, in drawing order.
pub fn prop_draws(state: &SceneState) -> [PropDraw; 8] {
    let animation = &state.animation;
    let clock = animation.scene_clock;
    let scales = &state.scales;
    let draw = |mesh: MeshId, model: Mat4, color: [f32; 3]| PropDraw {
        mesh,
        model,
        color,
        frame: animation.cursors.get(mesh),
    };
    [
        draw(
            MeshId::Tiger,
            geometry::tiger_body(&animation.patrol),
            [0.951_64, 0.606_48, 0.226_48],
        ),
        draw(MeshId::Wolf, geometry::wolf(clock), [0.3, 0.3, 0.987_8]),
        draw(MeshId::Spider, geometry::spider(clock), [0.2, 0.985, 0.3]),
        draw(MeshId::Optimus, geometry::optimus(scales), [0.987_8, 0.3, 0.3]),
        draw(
            MeshId::Godzilla,
            geometry::godzilla(scales),
            [88.0 / 255.0, 57.0 / 255.0, 39.0 / 255.0],
        ),
        draw(MeshId::Dragon, geometry::dragon(scales), [1.0, 1.0, 0.0]),
        draw(
            MeshId::Ironman,
            geometry::ironman(scales),
            [170.0 / 255.0, 5.0 / 255.0, 5.0 / 255.0],
        ),
        draw(MeshId::Tank, geometry::tank(scales), [0.0, 80.0 / 255.0, 0.0]),
    ]
}

/// GPU side of the scene: programs, buffers and textures, all loaded before the first frame.
pub struct Application {
    flat: Program,
    lit: Program,
    sky: Program,
    meshes: MeshSet,
    exterior: Vec<ExteriorChunk>,
    textures: TextureTable<SrgbTexture2d>,
    // bound to unused sampler slots
    placeholder: SrgbTexture2d,
    skymap: Option<Cubemap>,
    skybox: VertexBuffer<LineVertex>,
    grid: VertexBuffer<LineVertex>,
    axes: VertexBuffer<LineVertex>,
    lights: Vec<Light>,
    filled: DrawParameters<'static>,
    wireframe: DrawParameters<'static>,
}

pub struct SceneAssets {
    pub meshes: MeshSet,
    pub exterior: Vec<ExteriorChunk>,
    pub textures: TextureTable<SrgbTexture2d>,
    pub skymap: Option<Cubemap>,
    pub lights: Vec<Light>,
}

impl Application {
    pub fn new(display: &Display<WindowSurface>, assets: SceneAssets) -> Result<Self> {
        let filled = DrawParameters {
            depth: glium::Depth {
                test: glium::DepthTest::IfLess,
                write: true,
                ..Default::default()
            },
            polygon_mode: glium::PolygonMode::Fill,
            ..Default::default()
        };
        let wireframe = DrawParameters {
            polygon_mode: glium::PolygonMode::Line,
            ..filled.clone()
        };
        let white = RawImage2d::from_raw_rgba(vec![255u8; 4], (1, 1));

        Ok(Self {
            flat: crate::shader::flat_color(display)?,
            lit: crate::shader::exterior(display)?,
            sky: crate::shader::skybox(display)?,
            meshes: assets.meshes,
            exterior: assets.exterior,
            textures: assets.textures,
            placeholder: SrgbTexture2d::new(display, white)?,
            skymap: assets.skymap,
            skybox: VertexBuffer::new(display, &line_vertices(&geometry::skybox_cube()))?,
            grid: VertexBuffer::new(display, &line_vertices(&geometry::grid_lines()))?,
            axes: VertexBuffer::new(display, &line_vertices(&geometry::AXES))?,
            lights: shading_lights(&assets.lights),
            filled,
            wireframe,
        })
    }

    pub fn draw_frame(&self, target: &mut Frame, state: &SceneState) -> Result<()> {
        let view = state.view_matrix();
        let view_projection = state.projection_matrix() * view;
        let eye = view.inverse().w_axis.truncate();

        target.clear_color_and_depth(CLEAR_COLOR, 1.0);

        let lines = NoIndices(PrimitiveType::LinesList);
        let triangles = NoIndices(PrimitiveType::TrianglesList);

        if state.show_grid {
            let mvp = view_projection * Mat4::from_scale(Vec3::splat(geometry::GRID_SCALE));
            target.draw(
                &self.grid,
                lines,
                &self.flat,
                &uniform! {
                    u_mvp: mvp.to_cols_array_2d(),
                    u_color: GRID_COLOR,
                },
                &self.filled,
            )?;
        }

        let mvp = view_projection.to_cols_array_2d();
        for chunk in &self.exterior {
            let bindings = self.textures.bindings(&chunk.material);
            let uniforms = ExteriorUniforms {
                mvp,
                camera_position: eye.to_array(),
                channels: bindings.mask,
                lights: &self.lights,
                samplers: bindings
                    .slots
                    .map(|slot| slot.unwrap_or(&self.placeholder).sampled()),
            };
            target.draw(&chunk.vertices, triangles, &self.lit, &uniforms, &self.filled)?;
        }

        if state.show_grid {
            let mvp = view_projection * Mat4::from_scale(Vec3::splat(geometry::AXES_SCALE));
            for (axis, color) in geometry::AXES_COLORS.iter().enumerate() {
                let Some(segment) = self.axes.slice(axis * 2..axis * 2 + 2) else {
                    continue;
                };
                target.draw(
                    segment,
                    lines,
                    &self.flat,
                    &uniform! {
                        u_mvp: mvp.to_cols_array_2d(),
                        u_color: *color,
                    },
                    &self.filled,
                )?;
            }
        }

        if let Some(skymap) = &self.skymap {
            let mvp = view_projection * geometry::skybox();
            target.draw(
                &self.skybox,
                triangles,
                &self.sky,
                &uniform! {
                    u_mvp: mvp.to_cols_array_2d(),
                    u_skymap: skymap.sampled().magnify_filter(MagnifySamplerFilter::Linear),
                },
                &self.filled,
            )?;
        }

        for prop in prop_draws(state) {
            let Some(vertices) = self.meshes.get(prop.mesh).frame(prop.frame) else {
                continue;
            };
            target.draw(
                vertices,
                triangles,
                &self.flat,
                &uniform! {
                    u_mvp: (view_projection * prop.model).to_cols_array_2d(),
                    u_color: prop.color,
                },
                &self.wireframe,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{camera::CameraBank, config::Config, load::ManifestCamera};

    fn state() -> SceneState {
        let config = Config::default();
        let scene = ManifestCamera {
            eye: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Z,
            n: Vec3::NEG_Y,
            fovy_degrees: 45.0,
        };
        SceneState::new(CameraBank::new(&scene, 1.5, &config.camera), &config)
    }

    fn light(x: f32) -> Light {
        Light {
            position: Vec3::new(x, 0.0, 500.0),
            color: Vec3::ONE,
        }
    }

    #[test]
    fn every_manifest_light_is_used() {
        let lights = [light(0.0), light(1.0), light(2.0)];
        assert_eq!(shading_lights(&lights), lights);
    }

    #[test]
    fn lights_are_capped() {
        let lights: Vec<Light> = (0..MAX_LIGHTS + 3).map(|i| light(i as f32)).collect();
        let used = shading_lights(&lights);
        assert_eq!(used.len(), MAX_LIGHTS);
        assert_eq!(used[..], lights[..MAX_LIGHTS]);
    }

    #[test]
    fn default_light_only_without_manifest_lights() {
        assert_eq!(shading_lights(&[]), vec![DEFAULT_LIGHT]);
    }

    #[test]
    fn props_are_drawn_in_fixed_order() {
        let order: Vec<MeshId> = prop_draws(&state()).iter().map(|d| d.mesh).collect();
        assert_eq!(
            order,
            [
                MeshId::Tiger,
                MeshId::Wolf,
                MeshId::Spider,
                MeshId::Optimus,
                MeshId::Godzilla,
                MeshId::Dragon,
                MeshId::Ironman,
                MeshId::Tank,
            ]
        );
    }

    #[test]
    fn animated_props_follow_frame_cursors() {
        let mut state = state();
        for _ in 0..4 {
            state.tick();
        }
        let draws = prop_draws(&state);
        assert_eq!(draws[0].frame, state.animation.cursors.tiger);
        assert_eq!(draws[1].frame, state.animation.cursors.wolf);
        assert_eq!(draws[2].frame, state.animation.cursors.spider);
        assert!(draws[3..].iter().all(|d| d.frame == 0));
    }

    #[test]
    fn tiger_is_placed_by_its_patrol() {
        let mut state = state();
        state.tick();
        let draws = prop_draws(&state);
        assert_eq!(draws[0].model, geometry::tiger_body(&state.animation.patrol));
    }

    #[test]
    fn prop_scales_reach_the_draws() {
        let mut state = state();
        let before = prop_draws(&state)[4].model;
        state.camera.position = Config::default().proximity.shrink_point;
        state.tick();
        let after = prop_draws(&state)[4].model;
        assert_ne!(before, after);
    }
}
