use glium::{program, Display, Program};
use glutin::surface::WindowSurface;

use crate::error::Result;

/// Flat colour, used for the grid, the axes and the wireframe characters and props
pub fn flat_color(display: &Display<WindowSurface>) -> Result<Program> {
    Ok(program!(display,
        330 => { vertex: "
                    #version 330

                    uniform mat4 u_mvp;

                    in vec3 position;

                    void main() {
                        gl_Position = u_mvp * vec4(position, 1.0);
                    }
                ",

        fragment: "
                    #version 330

                    uniform vec3 u_color;

                    out vec4 f_color;

                    void main() {
                        f_color = vec4(u_color, 1.0);
                    }
                ",
    })?)
}

/// Lights the exterior shader can take at once
pub const MAX_LIGHTS: usize = 8;

/// Textured exterior chunks lit by up to [`MAX_LIGHTS`] point lights in `u_light`.
///
/// `u_channels` holds one bit per bound texture (diffuse, normal, specular, emissive); a channel
/// whose bit is clear is never sampled.
pub fn exterior(display: &Display<WindowSurface>) -> Result<Program> {
    Ok(program!(display,
        330 => { vertex: "
                    #version 330

                    uniform mat4 u_mvp;

                    in vec3 position;
                    in vec3 normal;
                    in vec2 texcoord;

                    out vec3 v_position;
                    out vec3 v_normal;
                    out vec2 v_texcoord;

                    void main() {
                        v_position = position;
                        v_normal = normal;
                        v_texcoord = texcoord;
                        gl_Position = u_mvp * vec4(position, 1.0);
                    }
                ",

        fragment: "
                    #version 330

                    in vec3 v_position;
                    in vec3 v_normal;
                    in vec2 v_texcoord;

                    out vec4 f_color;

                    struct LightSource {
                        vec3 position;
                        vec3 color;
                    };

                    const int MAX_LIGHTS = 8;

                    uniform LightSource u_light[MAX_LIGHTS];
                    uniform int u_light_count;
                    uniform vec3 u_camera_position;
                    uniform uint u_channels;

                    uniform sampler2D u_diffuse;
                    uniform sampler2D u_normal_map;
                    uniform sampler2D u_specular;
                    uniform sampler2D u_emissive;

                    const uint DIFFUSE = 1u;
                    const uint NORMAL = 2u;
                    const uint SPECULAR = 4u;
                    const uint EMISSIVE = 8u;

                    // tangent frame from screen space derivatives, the meshes carry no tangents
                    mat3 cotangent_frame(vec3 n, vec3 p, vec2 uv) {
                        vec3 dp1 = dFdx(p);
                        vec3 dp2 = dFdy(p);
                        vec2 duv1 = dFdx(uv);
                        vec2 duv2 = dFdy(uv);
                        vec3 dp2perp = cross(dp2, n);
                        vec3 dp1perp = cross(n, dp1);
                        vec3 t = dp2perp * duv1.x + dp1perp * duv2.x;
                        vec3 b = dp2perp * duv1.y + dp1perp * duv2.y;
                        float invmax = inversesqrt(max(dot(t, t), dot(b, b)));
                        return mat3(t * invmax, b * invmax, n);
                    }

                    void main() {
                        vec4 albedo = vec4(0.8, 0.8, 0.8, 1.0);
                        if ((u_channels & DIFFUSE) != 0u) {
                            albedo = texture(u_diffuse, v_texcoord);
                            if (albedo.a < 0.5) {
                                discard;
                            }
                        }

                        vec3 n = normalize(v_normal);
                        if ((u_channels & NORMAL) != 0u) {
                            vec3 mapped = texture(u_normal_map, v_texcoord).rgb * 2.0 - 1.0;
                            n = normalize(cotangent_frame(n, v_position, v_texcoord) * mapped);
                        }

                        float shininess = 16.0;
                        vec3 specular_color = vec3(0.2);
                        if ((u_channels & SPECULAR) != 0u) {
                            vec3 s = texture(u_specular, v_texcoord).rgb;
                            specular_color = s;
                            shininess = mix(8.0, 64.0, s.g);
                        }

                        vec3 to_camera = normalize(u_camera_position - v_position);
                        vec3 color = albedo.rgb * 0.15;
                        for (int i = 0; i < min(u_light_count, MAX_LIGHTS); i++) {
                            vec3 to_light = normalize(u_light[i].position - v_position);
                            vec3 half_direction = normalize(to_light + to_camera);
                            float lum = max(dot(n, to_light), 0.0);
                            float specular = pow(max(dot(half_direction, n), 0.0), shininess);
                            color += (albedo.rgb * lum + specular * specular_color) * u_light[i].color;
                        }
                        if ((u_channels & EMISSIVE) != 0u) {
                            color += texture(u_emissive, v_texcoord).rgb;
                        }
                        f_color = vec4(color, 1.0);
                    }
                ",
    })?)
}

/// Cube sampled by its own object space position.
pub fn skybox(display: &Display<WindowSurface>) -> Result<Program> {
    Ok(program!(display,
        330 => { vertex: "
                    #version 330

                    uniform mat4 u_mvp;

                    in vec3 position;

                    out vec3 v_direction;

                    void main() {
                        v_direction = position;
                        gl_Position = u_mvp * vec4(position, 1.0);
                    }
                ",

        fragment: "
                    #version 330

                    in vec3 v_direction;

                    out vec4 f_color;

                    uniform samplerCube u_skymap;

                    void main() {
                        f_color = texture(u_skymap, v_direction);
                    }
                ",
    })?)
}
