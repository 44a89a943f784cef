//! A compact PLY reader covering the files meshes actually ship in: ascii
//! and binary-little-endian, vertex positions with optional normals and
//! texture coordinates, and triangle or quad faces (quads are fanned).
//!
//! Missing normals are reconstructed from the face geometry; missing uv
//! coordinates are zero, which downgrades tangent computation to the
//! arbitrary-orthogonal fallback.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::{
    error::Error,
    math::point::Point,
    shape::mesh::Vertex,
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Ascii,
    BinaryLittleEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl Scalar {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => Scalar::I8,
            "uchar" | "uint8" => Scalar::U8,
            "short" | "int16" => Scalar::I16,
            "ushort" | "uint16" => Scalar::U16,
            "int" | "int32" => Scalar::I32,
            "uint" | "uint32" => Scalar::U32,
            "float" | "float32" => Scalar::F32,
            "double" | "float64" => Scalar::F64,
            _ => return None,
        })
    }

    fn size(self) -> usize {
        match self {
            Scalar::I8 | Scalar::U8 => 1,
            Scalar::I16 | Scalar::U16 => 2,
            Scalar::I32 | Scalar::U32 | Scalar::F32 => 4,
            Scalar::F64 => 8,
        }
    }

    fn read_binary(self, reader: &mut impl Read) -> Result<f64> {
        let mut buffer = [0u8; 8];
        reader.read_exact(&mut buffer[..self.size()])?;
        Ok(match self {
            Scalar::I8 => buffer[0] as i8 as f64,
            Scalar::U8 => buffer[0] as f64,
            Scalar::I16 => i16::from_le_bytes([buffer[0], buffer[1]]) as f64,
            Scalar::U16 => u16::from_le_bytes([buffer[0], buffer[1]]) as f64,
            Scalar::I32 => {
                i32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as f64
            }
            Scalar::U32 => {
                u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as f64
            }
            Scalar::F32 => {
                f32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as f64
            }
            Scalar::F64 => f64::from_le_bytes(buffer),
        })
    }
}

#[derive(Debug)]
enum Property {
    Scalar { name: String, kind: Scalar },
    List { name: String, count: Scalar, item: Scalar },
}

#[derive(Debug)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

struct Header {
    format: Format,
    elements: Vec<Element>,
}

pub struct PlyMesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
}

/// Read a PLY mesh from disk.
pub fn read_ply(path: &Path) -> Result<PlyMesh> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);

    let header = read_header(path, &mut reader)?;
    let mut mesh = PlyMesh {
        vertices: Vec::new(),
        triangles: Vec::new(),
    };
    let mut has_normals = false;

    for element in &header.elements {
        match element.name.as_str() {
            "vertex" => has_normals = read_vertices(&mut reader, &header, element, &mut mesh)?,
            "face" => read_faces(path, &mut reader, &header, element, &mut mesh)?,
            _ => skip_element(&mut reader, &header, element)?,
        }
    }

    if !has_normals {
        reconstruct_normals(&mut mesh);
    }

    log::info!(
        "loaded {} with {} triangles, {} vertices",
        path.display(),
        mesh.triangles.len(),
        mesh.vertices.len()
    );
    Ok(mesh)
}

fn decode_error(path: &Path, reason: impl Into<String>) -> Error {
    Error::Decode {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn read_header(path: &Path, reader: &mut impl BufRead) -> Result<Header> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim_end() != "ply" {
        return Err(decode_error(path, "missing ply magic"));
    }

    let mut format = None;
    let mut elements: Vec<Element> = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(decode_error(path, "unterminated header"));
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] | ["comment", ..] => continue,
            ["end_header"] => break,
            ["format", "ascii", _] => format = Some(Format::Ascii),
            ["format", "binary_little_endian", _] => format = Some(Format::BinaryLittleEndian),
            ["format", other, _] => {
                return Err(decode_error(path, format!("unsupported format {other}")))
            }
            ["element", name, count] => {
                let count = count
                    .parse()
                    .map_err(|_| decode_error(path, "bad element count"))?;
                elements.push(Element {
                    name: (*name).to_owned(),
                    count,
                    properties: Vec::new(),
                });
            }
            ["property", "list", count, item, name] => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| decode_error(path, "property before element"))?;
                let count = Scalar::parse(count)
                    .ok_or_else(|| decode_error(path, "unknown list count type"))?;
                let item = Scalar::parse(item)
                    .ok_or_else(|| decode_error(path, "unknown list item type"))?;
                element.properties.push(Property::List {
                    name: (*name).to_owned(),
                    count,
                    item,
                });
            }
            ["property", kind, name] => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| decode_error(path, "property before element"))?;
                let kind = Scalar::parse(kind)
                    .ok_or_else(|| decode_error(path, format!("unknown property type {kind}")))?;
                element.properties.push(Property::Scalar {
                    name: (*name).to_owned(),
                    kind,
                });
            }
            _ => return Err(decode_error(path, format!("bad header line: {}", line.trim()))),
        }
    }

    Ok(Header {
        format: format.ok_or_else(|| decode_error(path, "missing format line"))?,
        elements,
    })
}

/// One element row as named scalar values and index lists.
fn read_row(
    reader: &mut BufReader<std::fs::File>,
    format: Format,
    properties: &[Property],
    scalars: &mut Vec<f64>,
    list: &mut Vec<u32>,
) -> Result<()> {
    scalars.clear();
    list.clear();

    match format {
        Format::Ascii => {
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line)? == 0 {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "truncated ply body",
                    )));
                }
                if !line.trim().is_empty() {
                    break;
                }
            }
            let mut tokens = line.split_whitespace();
            let mut take = |what: &str| -> Result<f64> {
                tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(|| {
                        Error::Io(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            format!("bad ply value for {what}"),
                        ))
                    })
            };
            for property in properties {
                match property {
                    Property::Scalar { name, .. } => scalars.push(take(name)?),
                    Property::List { name, .. } => {
                        let count = take(name)? as usize;
                        for _ in 0..count {
                            list.push(take(name)? as u32);
                        }
                    }
                }
            }
        }
        Format::BinaryLittleEndian => {
            for property in properties {
                match property {
                    Property::Scalar { kind, .. } => scalars.push(kind.read_binary(reader)?),
                    Property::List { count, item, .. } => {
                        let n = count.read_binary(reader)? as usize;
                        for _ in 0..n {
                            list.push(item.read_binary(reader)? as u32);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Returns whether the file carried vertex normals.
fn read_vertices(
    reader: &mut BufReader<std::fs::File>,
    header: &Header,
    element: &Element,
    mesh: &mut PlyMesh,
) -> Result<bool> {
    // map property names to slots in the scalar row
    let mut slot = std::collections::HashMap::new();
    let mut index = 0usize;
    for property in &element.properties {
        if let Property::Scalar { name, .. } = property {
            slot.insert(name.as_str().to_owned(), index);
            index += 1;
        }
    }

    let fetch = |scalars: &[f64], names: &[&str]| -> Option<f32> {
        names
            .iter()
            .find_map(|n| slot.get(*n))
            .map(|&i| scalars[i] as f32)
    };
    let has_normals = slot.contains_key("nx");

    mesh.vertices.reserve(element.count);
    let mut scalars = Vec::new();
    let mut list = Vec::new();
    for _ in 0..element.count {
        read_row(reader, header.format, &element.properties, &mut scalars, &mut list)?;

        let position = Point::new(
            fetch(&scalars, &["x"]).unwrap_or(0.0),
            fetch(&scalars, &["y"]).unwrap_or(0.0),
            fetch(&scalars, &["z"]).unwrap_or(0.0),
        );
        let normal = Vec3::new(
            fetch(&scalars, &["nx"]).unwrap_or(0.0),
            fetch(&scalars, &["ny"]).unwrap_or(0.0),
            fetch(&scalars, &["nz"]).unwrap_or(0.0),
        );
        let uv = Vec2::new(
            fetch(&scalars, &["u", "s", "texture_u"]).unwrap_or(0.0),
            fetch(&scalars, &["v", "t", "texture_v"]).unwrap_or(0.0),
        );

        mesh.vertices.push(Vertex {
            position,
            normal: normal.normalize_or_zero(),
            uv,
        });
    }
    Ok(has_normals)
}

fn read_faces(
    path: &Path,
    reader: &mut BufReader<std::fs::File>,
    header: &Header,
    element: &Element,
    mesh: &mut PlyMesh,
) -> Result<()> {
    let vertex_count = mesh.vertices.len() as u32;
    let mut scalars = Vec::new();
    let mut list = Vec::new();

    mesh.triangles.reserve(element.count);
    for _ in 0..element.count {
        read_row(reader, header.format, &element.properties, &mut scalars, &mut list)?;

        if list.len() < 3 {
            return Err(decode_error(path, "face with fewer than 3 vertices"));
        }
        if list.iter().any(|&i| i >= vertex_count) {
            return Err(decode_error(path, "face index out of range"));
        }

        // fan larger polygons around the first vertex
        for i in 1..list.len() - 1 {
            mesh.triangles.push([list[0], list[i], list[i + 1]]);
        }
    }
    Ok(())
}

fn skip_element(
    reader: &mut BufReader<std::fs::File>,
    header: &Header,
    element: &Element,
) -> Result<()> {
    let mut scalars = Vec::new();
    let mut list = Vec::new();
    for _ in 0..element.count {
        read_row(reader, header.format, &element.properties, &mut scalars, &mut list)?;
    }
    Ok(())
}

/// Area-weighted vertex normals from the face geometry.
fn reconstruct_normals(mesh: &mut PlyMesh) {
    let mut accumulated = vec![Vec3::ZERO; mesh.vertices.len()];
    for triangle in &mesh.triangles {
        let [a, b, c] = *triangle;
        let v0 = mesh.vertices[a as usize].position;
        let v1 = mesh.vertices[b as usize].position;
        let v2 = mesh.vertices[c as usize].position;
        // cross product length is twice the area, weighting large faces more
        let normal = (v1 - v0).cross(v2 - v0);
        accumulated[a as usize] += normal;
        accumulated[b as usize] += normal;
        accumulated[c as usize] += normal;
    }
    for (vertex, normal) in mesh.vertices.iter_mut().zip(accumulated) {
        vertex.normal = normal.normalize_or_zero();
        if vertex.normal == Vec3::ZERO {
            vertex.normal = Vec3::Z;
        }
    }
}
