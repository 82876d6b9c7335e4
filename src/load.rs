use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use itertools::Itertools;
use rayon::prelude::*;

use crate::{
    config::Config,
    error::{Error, Result},
    texture::{Material, TextureChannel, TextureId},
};

/// One record of a `.geom` file: 3 floats position, 3 floats normal, 2 floats texcoord.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

glium::implement_vertex!(SceneVertex, position, normal, texcoord);

/// Read a count-prefixed triangle soup.
///
/// The leading `i32` is the number of triangles; it is trusted and exactly `3 * n` vertex
/// records are read after it. Records are stored as native little-endian floats.
pub fn read_geometry<R: Read>(mut reader: R) -> io::Result<Vec<SceneVertex>> {
    let mut count = [0u8; 4];
    reader.read_exact(&mut count)?;
    let n_triangles = usize::try_from(i32::from_le_bytes(count)).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidData, "negative triangle count")
    })?;

    let n_vertices = n_triangles * 3;
    let mut vertices = Vec::new();
    vertices.try_reserve_exact(n_vertices).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("cannot allocate {n_triangles} triangles"),
        )
    })?;
    vertices.resize(n_vertices, SceneVertex::zeroed());
    reader.read_exact(bytemuck::cast_slice_mut(&mut vertices))?;
    Ok(vertices)
}

pub fn load_geometry(path: &Path) -> Result<Vec<SceneVertex>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    read_geometry(BufReader::new(file)).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => Error::Geometry {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
        _ => Error::io(path, e),
    })
}

/// The character and prop models placed around the exterior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshId {
    Tiger,
    Wolf,
    Spider,
    Godzilla,
    Optimus,
    Dragon,
    Ironman,
    Tank,
}

impl MeshId {
    pub const ALL: [MeshId; 8] = [
        MeshId::Tiger,
        MeshId::Wolf,
        MeshId::Spider,
        MeshId::Godzilla,
        MeshId::Optimus,
        MeshId::Dragon,
        MeshId::Ironman,
        MeshId::Tank,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn frame_count(self) -> usize {
        match self {
            MeshId::Tiger => 12,
            MeshId::Wolf => 17,
            MeshId::Spider => 16,
            _ => 1,
        }
    }

    /// Path of one animation frame relative to the asset root. Static meshes only have frame 0.
    pub fn frame_path(self, frame: usize) -> String {
        match self {
            MeshId::Tiger => format!("Data/dynamic_objects/tiger/Tiger_{frame:02}_triangles_vnt.geom"),
            MeshId::Wolf => format!("Data/dynamic_objects/wolf/wolf_{frame:02}_vnt.geom"),
            MeshId::Spider => format!("Data/dynamic_objects/spider/spider_vnt_{frame:02}.geom"),
            MeshId::Godzilla => "Data/static_objects/godzilla_vnt.geom".into(),
            MeshId::Optimus => "Data/static_objects/optimus_vnt.geom".into(),
            MeshId::Dragon => "Data/static_objects/dragon_vnt.geom".into(),
            MeshId::Ironman => "Data/static_objects/ironman_vnt.geom".into(),
            MeshId::Tank => "Data/static_objects/tank_vnt.geom".into(),
        }
    }
}

/// Read every frame of `mesh`, in frame order.
pub fn load_frames(config: &Config, mesh: MeshId) -> Result<Vec<Vec<SceneVertex>>> {
    (0..mesh.frame_count())
        .into_par_iter()
        .map(|frame| load_geometry(&config.asset(mesh.frame_path(frame))))
        .collect()
}

/// Camera stored in the exterior manifest, used for the "original view" preset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManifestCamera {
    pub eye: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub n: Vec3,
    pub fovy_degrees: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
}

/// Material chunk of the exterior: where its triangles live and which textures it samples.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialEntry {
    pub geometry: PathBuf,
    pub material: Material,
}

/// The exterior environment description.
///
/// Line oriented; `#` starts a comment. Texture ids are assigned in the order the `texture`
/// records appear, and `-1` or `-` marks a channel without a texture.
///
/// ```text
/// camera ex ey ez  ux uy uz  vx vy vz  nx ny nz  fovy_deg
/// light  px py pz  r g b
/// texture Textures/wall_albedo.png
/// material Geometry/wall.geom 0 1 -1 -
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SceneManifest {
    pub camera: ManifestCamera,
    pub lights: Vec<Light>,
    pub textures: Vec<PathBuf>,
    pub materials: Vec<MaterialEntry>,
}

impl SceneManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text, path)
    }

    /// `origin` is only used for error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let err = |line: usize, reason: String| Error::Manifest {
            path: origin.to_path_buf(),
            line,
            reason,
        };

        let mut camera = None;
        let mut lights = Vec::new();
        let mut textures = Vec::new();
        // texture ids are validated once every texture record has been seen
        let mut materials: Vec<(usize, MaterialEntry)> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or_default().trim();
            let mut tokens = line.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };

            match keyword {
                "camera" => {
                    let parsed = (|| -> std::result::Result<ManifestCamera, String> {
                        let cam = ManifestCamera {
                            eye: vec3(&mut tokens)?,
                            u: vec3(&mut tokens)?,
                            v: vec3(&mut tokens)?,
                            n: vec3(&mut tokens)?,
                            fovy_degrees: float(tokens.next())?,
                        };
                        no_trailing(&mut tokens).map(|()| cam)
                    })();
                    camera = Some(parsed.map_err(|r| err(line_no, r))?);
                }
                "light" => {
                    let light = (|| -> std::result::Result<Light, String> {
                        let light = Light {
                            position: vec3(&mut tokens)?,
                            color: vec3(&mut tokens)?,
                        };
                        no_trailing(&mut tokens).map(|()| light)
                    })()
                    .map_err(|r| err(line_no, r))?;
                    lights.push(light);
                }
                "texture" => {
                    let rest = line[keyword.len()..].trim();
                    if rest.is_empty() {
                        return Err(err(line_no, "texture record without a path".into()));
                    }
                    textures.push(PathBuf::from(rest));
                }
                "material" => {
                    let entry = (|| -> std::result::Result<MaterialEntry, String> {
                        let geometry = tokens
                            .next()
                            .ok_or_else(|| String::from("material record without geometry"))?;
                        let mut channels = [None; TextureChannel::COUNT];
                        for channel in &mut channels {
                            *channel = texture_id(tokens.next())?;
                        }
                        no_trailing(&mut tokens)?;
                        Ok(MaterialEntry {
                            geometry: PathBuf::from(geometry),
                            material: Material { channels },
                        })
                    })()
                    .map_err(|r| err(line_no, r))?;
                    materials.push((line_no, entry));
                }
                other => return Err(err(line_no, format!("unknown record `{other}`"))),
            }
        }

        for (line_no, entry) in &materials {
            if let Some(id) = entry
                .material
                .channels
                .iter()
                .flatten()
                .find(|id| id.index() >= textures.len())
            {
                return Err(err(
                    *line_no,
                    format!("texture id {} out of range ({} textures)", id.index(), textures.len()),
                ));
            }
        }

        let camera = camera.ok_or_else(|| err(text.lines().count(), "no camera record".into()))?;
        Ok(Self {
            camera,
            lights,
            textures,
            materials: materials.into_iter().map(|(_, entry)| entry).collect(),
        })
    }
}

fn float(token: Option<&str>) -> std::result::Result<f32, String> {
    let token = token.ok_or_else(|| String::from("missing number"))?;
    token
        .parse::<f32>()
        .map_err(|e| format!("`{token}` is not a number: {e}"))
}

fn vec3<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> std::result::Result<Vec3, String> {
    let (x, y, z) = tokens
        .next_tuple()
        .ok_or_else(|| String::from("expected three numbers"))?;
    Ok(Vec3::new(float(Some(x))?, float(Some(y))?, float(Some(z))?))
}

fn texture_id(token: Option<&str>) -> std::result::Result<Option<TextureId>, String> {
    match token {
        None => Err("expected four texture ids".into()),
        Some("-" | "-1") => Ok(None),
        Some(token) => token
            .parse::<u32>()
            .map(|id| Some(TextureId(id)))
            .map_err(|_| format!("`{token}` is not a texture id")),
    }
}

fn no_trailing<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> std::result::Result<(), String> {
    match tokens.next() {
        Some(extra) => Err(format!("unexpected trailing `{extra}`")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn vertex(i: f32) -> SceneVertex {
        SceneVertex {
            position: [i, i + 1.0, i + 2.0],
            normal: [0.0, 0.0, 1.0],
            texcoord: [i * 0.5, 1.0 - i * 0.5],
        }
    }

    fn geom_bytes(count: i32, vertices: &[SceneVertex]) -> Vec<u8> {
        let mut bytes = count.to_le_bytes().to_vec();
        bytes.extend_from_slice(bytemuck::cast_slice(vertices));
        bytes
    }

    #[test]
    fn reads_exactly_the_declared_triangles() {
        let vertices: Vec<_> = (0..6).map(|i| vertex(i as f32)).collect();
        // one trailing garbage vertex after the two declared triangles
        let mut bytes = geom_bytes(2, &vertices);
        bytes.extend_from_slice(bytemuck::bytes_of(&vertex(99.0)));

        let read = read_geometry(bytes.as_slice()).unwrap();
        assert_eq!(read, vertices);
    }

    #[test]
    fn empty_mesh_is_allowed() {
        assert!(read_geometry(geom_bytes(0, &[]).as_slice()).unwrap().is_empty());
    }

    #[test]
    fn negative_count_is_invalid_data() {
        let err = read_geometry(geom_bytes(-3, &[]).as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_body_is_reported() {
        let vertices: Vec<_> = (0..3).map(|i| vertex(i as f32)).collect();
        let err = read_geometry(geom_bytes(2, &vertices).as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn load_geometry_from_disk() {
        let vertices: Vec<_> = (0..3).map(|i| vertex(i as f32)).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&geom_bytes(1, &vertices)).unwrap();

        assert_eq!(load_geometry(file.path()).unwrap(), vertices);
    }

    #[test]
    fn missing_geometry_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.geom");
        assert!(matches!(load_geometry(&missing), Err(Error::Io { .. })));
    }

    #[test]
    fn short_file_is_a_geometry_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&geom_bytes(4, &[vertex(0.0)])).unwrap();
        assert!(matches!(load_geometry(file.path()), Err(Error::Geometry { .. })));
    }

    #[test]
    fn frame_paths_are_zero_padded() {
        assert_eq!(
            MeshId::Tiger.frame_path(7),
            "Data/dynamic_objects/tiger/Tiger_07_triangles_vnt.geom"
        );
        assert_eq!(MeshId::Wolf.frame_path(16), "Data/dynamic_objects/wolf/wolf_16_vnt.geom");
        assert_eq!(MeshId::Spider.frame_path(3), "Data/dynamic_objects/spider/spider_vnt_03.geom");
        assert_eq!(MeshId::Tank.frame_count(), 1);
    }

    const MANIFEST: &str = "\
# bistro exterior
camera -1000 0 300  0 -1 0  0 0 1  -1 0 0  40
light 0 0 10000  1 0.9 0.8

texture Textures/wall albedo.png
texture Textures/wall_normal.png
material Geometry/wall.geom 0 1 -1 -   # no specular or emissive
material Geometry/sign.geom - - - 1
";

    #[test]
    fn parses_manifest_records() {
        let manifest = SceneManifest::parse(MANIFEST, Path::new("test.scene")).unwrap();

        assert_eq!(manifest.camera.eye, Vec3::new(-1000.0, 0.0, 300.0));
        assert_eq!(manifest.camera.n, Vec3::NEG_X);
        assert_eq!(manifest.camera.fovy_degrees, 40.0);
        assert_eq!(manifest.lights.len(), 1);
        assert_eq!(
            manifest.textures,
            vec![
                PathBuf::from("Textures/wall albedo.png"),
                PathBuf::from("Textures/wall_normal.png")
            ]
        );
        assert_eq!(manifest.materials.len(), 2);
        assert_eq!(
            manifest.materials[0].material.channels,
            [Some(TextureId(0)), Some(TextureId(1)), None, None]
        );
        assert_eq!(
            manifest.materials[1].material.channels,
            [None, None, None, Some(TextureId(1))]
        );
    }

    #[test]
    fn manifest_errors_carry_the_line() {
        let text = "camera 0 0 0 1 0 0 0 1 0 0 0 1 45\nmaterial a.geom 0 0 0\n";
        match SceneManifest::parse(text, Path::new("bad.scene")) {
            Err(Error::Manifest { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn manifest_rejects_unknown_texture_ids() {
        let text = "camera 0 0 0 1 0 0 0 1 0 0 0 1 45\ntexture a.png\nmaterial a.geom 0 3 - -\n";
        match SceneManifest::parse(text, Path::new("bad.scene")) {
            Err(Error::Manifest { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("out of range"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn manifest_requires_a_camera() {
        assert!(matches!(
            SceneManifest::parse("texture a.png\n", Path::new("x.scene")),
            Err(Error::Manifest { .. })
        ));
    }
}
