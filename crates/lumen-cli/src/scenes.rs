//! Built-in demonstration scenes, assembled through the component registry
//! the same way a scene-file front-end would.

use std::sync::Arc;

use anyhow::Result;
use glam::{UVec2, Vec2, Vec3};

use lumen::{
    camera::Camera,
    color::Color,
    instance::Instance,
    light::Light,
    math::{point::Point, transform::Transform},
    registry::{LightObject, Properties, Registry, Value},
    scene::Scene,
    shape::{Mesh, Vertex},
};

use crate::cli::AvailableScene;

pub fn build(
    choice: AvailableScene,
    registry: &Registry,
    resolution: UVec2,
) -> Result<Scene> {
    match choice {
        AvailableScene::Spheres => spheres(registry, resolution),
        AvailableScene::Cornell => cornell(registry, resolution),
        AvailableScene::Dielectric => dielectric(registry, resolution),
        AvailableScene::Volume => volume(registry, resolution),
    }
}

fn camera(
    registry: &Registry,
    resolution: UVec2,
    origin: Point,
    target: Point,
    fov: f32,
) -> Result<Arc<dyn Camera>> {
    let properties = Properties::new("perspective")
        .with("width", Value::Int(resolution.x as i64))
        .with("height", Value::Int(resolution.y as i64))
        .with("fov", Value::Float(fov))
        .with(
            "transform",
            Value::Transform(Transform::look_at(origin, target, Vec3::Y)),
        );
    Ok(registry.create_camera("perspective", &properties)?)
}

/// An axis-aligned quad as two triangles. `right` and `up` span the quad
/// from `origin`; uv runs [0,1]² across it.
fn quad(origin: Point, right: Vec3, up: Vec3) -> Mesh {
    let normal = right.cross(up).normalize();
    let vertices = vec![
        Vertex { position: origin, normal, uv: Vec2::new(0.0, 0.0) },
        Vertex { position: origin + right, normal, uv: Vec2::new(1.0, 0.0) },
        Vertex { position: origin + right + up, normal, uv: Vec2::new(1.0, 1.0) },
        Vertex { position: origin + up, normal, uv: Vec2::new(0.0, 1.0) },
    ];
    Mesh::new(vertices, vec![[0, 1, 2], [0, 2, 3]], false)
}

/// The unit cube [-1,1]³ as a triangle mesh with outward normals, used as
/// a volume boundary.
fn cube() -> Mesh {
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    for (normal, right, up) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in [
            (normal - right - up, Vec2::new(0.0, 0.0)),
            (normal + right - up, Vec2::new(1.0, 0.0)),
            (normal + right + up, Vec2::new(1.0, 1.0)),
            (normal - right + up, Vec2::new(0.0, 1.0)),
        ] {
            vertices.push(Vertex {
                position: Point(corner),
                normal,
                uv,
            });
        }
        triangles.push([base, base + 1, base + 2]);
        triangles.push([base, base + 2, base + 3]);
    }
    Mesh::new(vertices, triangles, false)
}

fn checker_texture(registry: &Registry, scale: f32) -> Result<Value> {
    let properties = Properties::new("checkerboard")
        .with("color0", Value::Color(Color::splat(0.2)))
        .with("color1", Value::Color(Color::splat(0.8)))
        .with("scale", Value::Vector(Vec3::new(scale, scale, 0.0)));
    Ok(Value::Texture(
        registry.create_texture("checkerboard", &properties)?,
    ))
}

fn white_sky(registry: &Registry, radiance: f32) -> Result<LightObject> {
    let properties = Properties::new("envmap")
        .with("texture", Value::Color(Color::splat(radiance)));
    Ok(registry.create_light("envmap", &properties)?)
}

fn spheres(registry: &Registry, resolution: UVec2) -> Result<Scene> {
    let ground_bsdf = registry.create_bsdf(
        "diffuse",
        &Properties::new("diffuse").with("albedo", checker_texture(registry, 16.0)?),
    )?;
    let ground = Instance::new(Arc::new(quad(
        Point::new(-20.0, 0.0, -20.0),
        Vec3::X * 40.0,
        Vec3::Z * 40.0,
    )))
    .with_bsdf(ground_bsdf);

    let sphere = registry.create_shape("sphere", &Properties::new("sphere"))?;

    let diffuse = registry.create_bsdf(
        "diffuse",
        &Properties::new("diffuse").with("albedo", Value::Color(Color::new(0.8, 0.3, 0.3))),
    )?;
    let metal = registry.create_bsdf(
        "roughconductor",
        &Properties::new("roughconductor")
            .with("reflectance", Value::Color(Color::new(0.9, 0.7, 0.4)))
            .with("roughness", Value::Float(0.3)),
    )?;
    let plastic = registry.create_bsdf(
        "principled",
        &Properties::new("principled")
            .with("baseColor", Value::Color(Color::new(0.2, 0.4, 0.8)))
            .with("roughness", Value::Float(0.5))
            .with("metallic", Value::Float(0.0))
            .with("specular", Value::Float(0.5)),
    )?;

    let instances = vec![
        ground,
        Instance::new(sphere.clone())
            .with_bsdf(diffuse)
            .with_transform(Transform::translation(Vec3::new(-2.2, 1.0, 0.0))),
        Instance::new(sphere.clone())
            .with_bsdf(metal)
            .with_transform(Transform::translation(Vec3::new(0.0, 1.0, 0.0))),
        Instance::new(sphere)
            .with_bsdf(plastic)
            .with_transform(Transform::translation(Vec3::new(2.2, 1.0, 0.0))),
    ];

    let point = registry.create_light(
        "point",
        &Properties::new("point")
            .with("position", Value::Point(Point::new(4.0, 6.0, -4.0)))
            .with("power", Value::Color(Color::splat(600.0))),
    )?;
    let mut lights: Vec<Arc<dyn Light>> = Vec::new();
    let LightObject::Finite(point) = point else {
        anyhow::bail!("point light registered as background");
    };
    lights.push(point);

    let LightObject::Background(sky) = white_sky(registry, 0.4)? else {
        anyhow::bail!("envmap registered as finite light");
    };

    Ok(Scene::new(
        instances,
        lights,
        Some(sky),
        camera(registry, resolution, Point::new(0.0, 2.5, -7.0), Point::new(0.0, 1.0, 0.0), 50.0)?,
    ))
}

fn cornell(registry: &Registry, resolution: UVec2) -> Result<Scene> {
    let wall = |color: Color| -> Result<_> {
        Ok(registry.create_bsdf(
            "principled",
            &Properties::new("principled")
                .with("baseColor", Value::Color(color))
                .with("roughness", Value::Float(1.0))
                .with("metallic", Value::Float(0.0))
                .with("specular", Value::Float(0.5)),
        )?)
    };
    let white = wall(Color::splat(0.7))?;
    let red = wall(Color::new(0.7, 0.1, 0.1))?;
    let green = wall(Color::new(0.1, 0.7, 0.1))?;

    let emission = registry.create_emission(
        "lambertian",
        &Properties::new("lambertian").with("emission", Value::Color(Color::splat(10.0))),
    )?;

    // a 2x2x2 box around the origin, open toward the camera at -z
    let s = 1.0;
    let instances = vec![
        // floor, ceiling, back wall in white
        Instance::new(Arc::new(quad(
            Point::new(-s, -s, -s),
            Vec3::Z * 2.0 * s,
            Vec3::X * 2.0 * s,
        )))
        .with_bsdf(white.clone()),
        Instance::new(Arc::new(quad(
            Point::new(-s, s, -s),
            Vec3::X * 2.0 * s,
            Vec3::Z * 2.0 * s,
        )))
        .with_bsdf(white.clone()),
        Instance::new(Arc::new(quad(
            Point::new(-s, -s, s),
            Vec3::Y * 2.0 * s,
            Vec3::X * 2.0 * s,
        )))
        .with_bsdf(white.clone()),
        // colored side walls
        Instance::new(Arc::new(quad(
            Point::new(-s, -s, -s),
            Vec3::Y * 2.0 * s,
            Vec3::Z * 2.0 * s,
        )))
        .with_bsdf(red),
        Instance::new(Arc::new(quad(
            Point::new(s, -s, -s),
            Vec3::Z * 2.0 * s,
            Vec3::Y * 2.0 * s,
        )))
        .with_bsdf(green),
        // emissive panel just below the ceiling, facing down
        Instance::new(Arc::new(quad(
            Point::new(-0.4, s - 0.01, -0.4),
            Vec3::X * 0.8,
            Vec3::Z * 0.8,
        )))
        .with_emission(emission)
        .with_bsdf(white),
    ];

    Ok(Scene::new(
        instances,
        Vec::new(),
        None,
        camera(registry, resolution, Point::new(0.0, 0.0, -3.6), Point::ORIGIN, 40.0)?,
    ))
}

fn dielectric(registry: &Registry, resolution: UVec2) -> Result<Scene> {
    let ground_bsdf = registry.create_bsdf(
        "diffuse",
        &Properties::new("diffuse").with("albedo", checker_texture(registry, 12.0)?),
    )?;
    let glass = registry.create_bsdf(
        "dielectric",
        &Properties::new("dielectric")
            .with("ior", Value::Float(1.5))
            .with("reflectance", Value::Color(Color::WHITE))
            .with("transmittance", Value::Color(Color::WHITE)),
    )?;

    let sphere = registry.create_shape("sphere", &Properties::new("sphere"))?;
    let instances = vec![
        Instance::new(Arc::new(quad(
            Point::new(-20.0, 0.0, -20.0),
            Vec3::X * 40.0,
            Vec3::Z * 40.0,
        )))
        .with_bsdf(ground_bsdf),
        Instance::new(sphere)
            .with_bsdf(glass)
            .with_transform(Transform::translation(Vec3::Y * 1.2)),
    ];

    let LightObject::Background(sky) = white_sky(registry, 1.0)? else {
        anyhow::bail!("envmap registered as finite light");
    };

    Ok(Scene::new(
        instances,
        Vec::new(),
        Some(sky),
        camera(registry, resolution, Point::new(0.0, 2.0, -5.0), Point::new(0.0, 1.0, 0.0), 45.0)?,
    ))
}

fn volume(registry: &Registry, resolution: UVec2) -> Result<Scene> {
    let boundary = Arc::new(cube());
    let fog_shape = registry.create_shape(
        "volume",
        &Properties::new("volume")
            .with("density", Value::Float(1.0))
            .with("boundary", Value::Shape(boundary)),
    )?;
    let phase = registry.create_bsdf(
        "hg",
        &Properties::new("hg")
            .with("g", Value::Float(0.2))
            .with("albedo", Value::Color(Color::WHITE)),
    )?;

    let instances = vec![Instance::new(fog_shape).with_bsdf(phase)];

    let LightObject::Background(sky) = white_sky(registry, 1.0)? else {
        anyhow::bail!("envmap registered as finite light");
    };

    Ok(Scene::new(
        instances,
        Vec::new(),
        Some(sky),
        camera(registry, resolution, Point::new(0.0, 0.0, -4.0), Point::ORIGIN, 50.0)?,
    ))
}
