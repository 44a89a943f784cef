//! The configuration surface of the renderer.
//!
//! Scene descriptions arrive as property bags: a `type` tag plus named,
//! typed values and already-constructed children. [Registry] maps tags onto
//! concrete component constructors. Registration is explicit: every
//! constructor is handed to the builder at program start, so there is no
//! global registry and no reliance on static initialization order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{UVec2, Vec2, Vec3};

use crate::{
    bsdf::{Bsdf, Dielectric, Diffuse, HenyeyGreenstein, Principled, RoughConductor},
    camera::{Camera, FovAxis, Perspective},
    color::Color,
    emission::{Emission, Lambertian},
    error::Error,
    image::Image,
    integrator::{AovIntegrator, AovVariable, DirectIntegrator, Integrator, PathTracer},
    light::{DirectionalLight, EnvironmentMap, Light, PointLight},
    loader::ply,
    math::{point::Point, transform::Transform},
    postprocess::{BloomMinimal, Postprocess, Tonemap},
    shape::{Mesh, Shape, Sphere, Volume},
    texture::{BorderMode, Checkerboard, ConstantTexture, FilterMode, ImageTexture, Texture},
    Result,
};

/// A typed property value. Children that the parser has already built
/// (textures, shapes, transforms) ride along as shared handles.
#[derive(Clone)]
pub enum Value {
    Float(f32),
    Int(i64),
    Bool(bool),
    String(String),
    Color(Color),
    Vector(Vec3),
    Point(Point),
    Path(PathBuf),
    Texture(Arc<dyn Texture>),
    Shape(Arc<dyn Shape>),
    Transform(Transform),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Float(_) => "float",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Color(_) => "color",
            Value::Vector(_) => "vector",
            Value::Point(_) => "point",
            Value::Path(_) => "path",
            Value::Texture(_) => "texture",
            Value::Shape(_) => "shape",
            Value::Transform(_) => "transform",
        }
    }
}

/// A bag of named properties with a context string used to qualify error
/// messages (usually the tag of the object being built).
#[derive(Clone, Default)]
pub struct Properties {
    context: String,
    values: HashMap<String, Value>,
}

impl Properties {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn missing(&self, name: &str, expected: &str) -> Error {
        Error::invalid_scene(format!(
            "{}: missing required {expected} property '{name}'",
            self.context
        ))
    }

    fn mismatch(&self, name: &str, expected: &str, found: &Value) -> Error {
        Error::invalid_scene(format!(
            "{}: property '{name}' should be a {expected}, found {}",
            self.context,
            found.type_name()
        ))
    }

    pub fn get_float(&self, name: &str) -> Result<f32> {
        match self.values.get(name) {
            Some(Value::Float(v)) => Ok(*v),
            Some(Value::Int(v)) => Ok(*v as f32),
            Some(other) => Err(self.mismatch(name, "float", other)),
            None => Err(self.missing(name, "float")),
        }
    }

    pub fn get_float_or(&self, name: &str, default: f32) -> Result<f32> {
        if self.has(name) {
            self.get_float(name)
        } else {
            Ok(default)
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i64> {
        match self.values.get(name) {
            Some(Value::Int(v)) => Ok(*v),
            Some(other) => Err(self.mismatch(name, "int", other)),
            None => Err(self.missing(name, "int")),
        }
    }

    pub fn get_int_or(&self, name: &str, default: i64) -> Result<i64> {
        if self.has(name) {
            self.get_int(name)
        } else {
            Ok(default)
        }
    }

    pub fn get_bool_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.values.get(name) {
            Some(Value::Bool(v)) => Ok(*v),
            Some(other) => Err(self.mismatch(name, "bool", other)),
            None => Ok(default),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str> {
        match self.values.get(name) {
            Some(Value::String(v)) => Ok(v),
            Some(other) => Err(self.mismatch(name, "string", other)),
            None => Err(self.missing(name, "string")),
        }
    }

    pub fn get_string_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str> {
        if self.has(name) {
            self.get_string(name)
        } else {
            Ok(default)
        }
    }

    pub fn get_color(&self, name: &str) -> Result<Color> {
        match self.values.get(name) {
            Some(Value::Color(v)) => Ok(*v),
            Some(Value::Float(v)) => Ok(Color::splat(*v)),
            Some(other) => Err(self.mismatch(name, "color", other)),
            None => Err(self.missing(name, "color")),
        }
    }

    pub fn get_color_or(&self, name: &str, default: Color) -> Result<Color> {
        if self.has(name) {
            self.get_color(name)
        } else {
            Ok(default)
        }
    }

    pub fn get_vector(&self, name: &str) -> Result<Vec3> {
        match self.values.get(name) {
            Some(Value::Vector(v)) => Ok(*v),
            Some(other) => Err(self.mismatch(name, "vector", other)),
            None => Err(self.missing(name, "vector")),
        }
    }

    pub fn get_vector_or(&self, name: &str, default: Vec3) -> Result<Vec3> {
        if self.has(name) {
            self.get_vector(name)
        } else {
            Ok(default)
        }
    }

    pub fn get_point(&self, name: &str) -> Result<Point> {
        match self.values.get(name) {
            Some(Value::Point(v)) => Ok(*v),
            Some(Value::Vector(v)) => Ok(Point(*v)),
            Some(other) => Err(self.mismatch(name, "point", other)),
            None => Err(self.missing(name, "point")),
        }
    }

    pub fn get_path(&self, name: &str) -> Result<&Path> {
        match self.values.get(name) {
            Some(Value::Path(v)) => Ok(v),
            Some(other) => Err(self.mismatch(name, "path", other)),
            None => Err(self.missing(name, "path")),
        }
    }

    /// Texture lookup with scalar promotion: a color or float property is
    /// wrapped into a constant texture.
    pub fn get_texture(&self, name: &str) -> Result<Arc<dyn Texture>> {
        match self.values.get(name) {
            Some(Value::Texture(v)) => Ok(v.clone()),
            Some(Value::Color(v)) => Ok(Arc::new(ConstantTexture::new(*v))),
            Some(Value::Float(v)) => Ok(Arc::new(ConstantTexture::scalar_value(*v))),
            Some(other) => Err(self.mismatch(name, "texture", other)),
            None => Err(self.missing(name, "texture")),
        }
    }

    pub fn get_shape_opt(&self, name: &str) -> Result<Option<Arc<dyn Shape>>> {
        match self.values.get(name) {
            Some(Value::Shape(v)) => Ok(Some(v.clone())),
            Some(other) => Err(self.mismatch(name, "shape", other)),
            None => Ok(None),
        }
    }

    pub fn get_transform_opt(&self, name: &str) -> Result<Option<Transform>> {
        match self.values.get(name) {
            Some(Value::Transform(v)) => Ok(Some(*v)),
            Some(other) => Err(self.mismatch(name, "transform", other)),
            None => Ok(None),
        }
    }

    fn get_enum<T: Copy>(&self, name: &str, default: T, options: &[(&str, T)]) -> Result<T> {
        let Some(value) = self.values.get(name) else {
            return Ok(default);
        };
        let Value::String(s) = value else {
            return Err(self.mismatch(name, "string", value));
        };
        options
            .iter()
            .find(|(tag, _)| *tag == s.as_str())
            .map(|(_, v)| *v)
            .ok_or_else(|| {
                Error::invalid_scene(format!(
                    "{}: '{s}' is not a valid value for '{name}'",
                    self.context
                ))
            })
    }
}

/// A constructed light: either a finite light that next-event estimation
/// samples, or the scene background.
pub enum LightObject {
    Finite(Arc<dyn Light>),
    Background(Arc<EnvironmentMap>),
}

pub type BsdfFactory = fn(&Properties) -> Result<Arc<dyn Bsdf>>;
pub type CameraFactory = fn(&Properties) -> Result<Arc<dyn Camera>>;
pub type EmissionFactory = fn(&Properties) -> Result<Arc<dyn Emission>>;
pub type IntegratorFactory = fn(&Properties) -> Result<Arc<dyn Integrator>>;
pub type LightFactory = fn(&Properties) -> Result<LightObject>;
pub type PostprocessFactory = fn(&Properties) -> Result<Arc<dyn Postprocess>>;
pub type ShapeFactory = fn(&Properties) -> Result<Arc<dyn Shape>>;
pub type TextureFactory = fn(&Properties) -> Result<Arc<dyn Texture>>;

/// Maps `type` tags onto constructors.
#[derive(Default)]
pub struct Registry {
    bsdfs: HashMap<&'static str, BsdfFactory>,
    cameras: HashMap<&'static str, CameraFactory>,
    emissions: HashMap<&'static str, EmissionFactory>,
    integrators: HashMap<&'static str, IntegratorFactory>,
    lights: HashMap<&'static str, LightFactory>,
    postprocesses: HashMap<&'static str, PostprocessFactory>,
    shapes: HashMap<&'static str, ShapeFactory>,
    textures: HashMap<&'static str, TextureFactory>,
}

fn unknown_tag(kind: &str, tag: &str) -> Error {
    Error::invalid_scene(format!("unknown {kind} type '{tag}'"))
}

macro_rules! accessors {
    ($register:ident, $create:ident, $field:ident, $factory:ty, $output:ty, $kind:literal) => {
        pub fn $register(&mut self, tag: &'static str, factory: $factory) {
            self.$field.insert(tag, factory);
        }

        pub fn $create(&self, tag: &str, properties: &Properties) -> Result<$output> {
            match self.$field.get(tag) {
                Some(factory) => factory(properties),
                None => Err(unknown_tag($kind, tag)),
            }
        }
    };
}

impl Registry {
    accessors!(register_bsdf, create_bsdf, bsdfs, BsdfFactory, Arc<dyn Bsdf>, "bsdf");
    accessors!(register_camera, create_camera, cameras, CameraFactory, Arc<dyn Camera>, "camera");
    accessors!(
        register_emission,
        create_emission,
        emissions,
        EmissionFactory,
        Arc<dyn Emission>,
        "emission"
    );
    accessors!(
        register_integrator,
        create_integrator,
        integrators,
        IntegratorFactory,
        Arc<dyn Integrator>,
        "integrator"
    );
    accessors!(register_light, create_light, lights, LightFactory, LightObject, "light");
    accessors!(
        register_postprocess,
        create_postprocess,
        postprocesses,
        PostprocessFactory,
        Arc<dyn Postprocess>,
        "postprocess"
    );
    accessors!(register_shape, create_shape, shapes, ShapeFactory, Arc<dyn Shape>, "shape");
    accessors!(
        register_texture,
        create_texture,
        textures,
        TextureFactory,
        Arc<dyn Texture>,
        "texture"
    );

    /// A registry with every built-in component wired up.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();

        registry.register_texture("constant", |p| {
            Ok(Arc::new(ConstantTexture::new(p.get_color("value")?)))
        });
        registry.register_texture("checkerboard", |p| {
            let scale = p.get_vector_or("scale", Vec3::ONE)?;
            Ok(Arc::new(Checkerboard::new(
                p.get_color_or("color0", Color::BLACK)?,
                p.get_color_or("color1", Color::WHITE)?,
                Vec2::new(scale.x, scale.y),
            )))
        });
        registry.register_texture("image", |p| {
            let image = Image::load(p.get_path("filename")?, p.get_bool_or("linear", false)?)?;
            let border = p.get_enum(
                "border",
                BorderMode::Repeat,
                &[("clamp", BorderMode::Clamp), ("repeat", BorderMode::Repeat)],
            )?;
            let filter = p.get_enum(
                "filter",
                FilterMode::Bilinear,
                &[
                    ("nearest", FilterMode::Nearest),
                    ("bilinear", FilterMode::Bilinear),
                ],
            )?;
            Ok(Arc::new(ImageTexture::new(
                Arc::new(image),
                p.get_float_or("exposure", 1.0)?,
                border,
                filter,
            )))
        });

        registry.register_bsdf("diffuse", |p| {
            Ok(Arc::new(Diffuse::new(p.get_texture("albedo")?)))
        });
        registry.register_bsdf("roughconductor", |p| {
            Ok(Arc::new(RoughConductor::new(
                p.get_texture("reflectance")?,
                p.get_texture("roughness")?,
            )))
        });
        registry.register_bsdf("dielectric", |p| {
            Ok(Arc::new(Dielectric::new(
                p.get_texture("ior")?,
                p.get_texture("reflectance")?,
                p.get_texture("transmittance")?,
            )))
        });
        registry.register_bsdf("principled", |p| {
            Ok(Arc::new(Principled::new(
                p.get_texture("baseColor")?,
                p.get_texture("roughness")?,
                p.get_texture("metallic")?,
                p.get_texture("specular")?,
            )))
        });
        registry.register_bsdf("hg", |p| {
            Ok(Arc::new(HenyeyGreenstein::new(
                p.get_float("g")?,
                p.get_color("albedo")?,
            )))
        });

        registry.register_emission("lambertian", |p| {
            Ok(Arc::new(Lambertian::new(p.get_texture("emission")?)))
        });

        registry.register_light("point", |p| {
            Ok(LightObject::Finite(Arc::new(PointLight::new(
                p.get_point("position")?,
                p.get_color("power")?,
            ))))
        });
        registry.register_light("directional", |p| {
            Ok(LightObject::Finite(Arc::new(DirectionalLight::new(
                p.get_vector("direction")?,
                p.get_color("intensity")?,
            ))))
        });
        registry.register_light("envmap", |p| {
            Ok(LightObject::Background(Arc::new(EnvironmentMap::new(
                p.get_texture("texture")?,
                p.get_transform_opt("transform")?,
            ))))
        });

        registry.register_shape("sphere", |_| Ok(Arc::new(Sphere)));
        registry.register_shape("mesh", |p| {
            let mesh = ply::read_ply(p.get_path("filename")?)?;
            Ok(Arc::new(Mesh::new(
                mesh.vertices,
                mesh.triangles,
                p.get_bool_or("smooth", true)?,
            )))
        });
        registry.register_shape("volume", |p| {
            Ok(Arc::new(Volume::new(
                p.get_float("density")?,
                p.get_shape_opt("boundary")?,
            )))
        });

        registry.register_camera("perspective", |p| {
            let fov_axis = p.get_enum("fovAxis", FovAxis::Y, &[("x", FovAxis::X), ("y", FovAxis::Y)])?;
            Ok(Arc::new(Perspective::new(
                UVec2::new(
                    p.get_int_or("width", 640)? as u32,
                    p.get_int_or("height", 480)? as u32,
                ),
                p.get_transform_opt("transform")?.unwrap_or_default(),
                p.get_float("fov")?,
                fov_axis,
            )))
        });

        registry.register_integrator("direct", |_| Ok(Arc::new(DirectIntegrator)));
        registry.register_integrator("pathtracer", |p| {
            Ok(Arc::new(PathTracer::new(
                p.get_int_or("depth", 2)? as u32,
                p.get_bool_or("nee", true)?,
            )))
        });
        registry.register_integrator("aov", |p| {
            let variable = match p.get_string("variable")? {
                "normals" => AovVariable::Normals,
                "bvh" => AovVariable::BvhHeatmap,
                other => {
                    return Err(Error::invalid_scene(format!(
                        "aov: unknown variable '{other}'"
                    )))
                }
            };
            Ok(Arc::new(AovIntegrator::new(
                variable,
                p.get_int_or("scale", 1)? as f32,
            )))
        });

        registry.register_postprocess("tonemap", |_| Ok(Arc::new(Tonemap)));
        registry.register_postprocess("bloom_minimal", |p| {
            Ok(Arc::new(BloomMinimal::new(
                p.get_float_or("threshold", 1.0)?,
                p.get_float_or("intensity", 0.08)?,
                p.get_int_or("radius", 7)? as i32,
                p.get_float_or("sigma", 4.0)?,
            )))
        });

        registry
    }
}
